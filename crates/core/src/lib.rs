mod instr;
mod interface;
mod overload;
mod registry;
pub mod types;

pub use instr::{Function, FunctionBuilder, FunctionError, Instruction, Label, Literal};
pub use interface::{InterfaceKind, InterfaceVariable, ShaderOptions, ShaderStage};
pub use overload::{Callable, Overload, OverloadRegistry, Variant};
pub use registry::{Primitives, Registry, glsl};
pub use types::{Operator, Type, TypeError, TypeLattice};
