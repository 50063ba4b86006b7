mod compiler;
mod error;
mod shader;

pub use compiler::{Compiler, CompilerOptions, codegen};
pub use error::{CompileError, Location, Result};
pub use shader::CompiledShader;

use shadermake_core::{Function, ShaderOptions, Type};
use std::sync::Arc;

/// Compile `function` with the built-in GLSL registry and default options.
///
/// See [`Compiler::compile`].
pub fn compile(
    function: &Function,
    argument_types: &[Type],
    bound_shaders: &[Arc<CompiledShader>],
    interface: Option<&ShaderOptions>,
) -> Result<Arc<CompiledShader>> {
    Compiler::new(CompilerOptions::default()).compile(function, argument_types, bound_shaders, interface)
}
