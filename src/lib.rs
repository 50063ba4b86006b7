//! Translate host functions into GLSL shader source.
//!
//! A front end lowers a function into a [`Function`] (an instruction stream). The compiler
//! infers types over the built-in [`Registry`], rebuilds `if`/`else` blocks from branches and
//! emits a [`CompiledShader`] whose text includes every shader it was bound to.

pub use shadermake_core::*;
pub use shadermake_glsl::{CompileError, CompiledShader, Compiler, CompilerOptions, Location, codegen, compile};
