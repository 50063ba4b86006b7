use std::fmt::{self, Display};
use thiserror::Error;

/// Where a compilation failed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Location {
    /// The shader declaration itself (parameter types, bound shaders).
    Declaration,
    /// The instruction at this index of the body.
    Instruction(usize),
    /// Past the last instruction.
    End,
}

/// A fatal compilation error. There is no partial output: the shader failed to build.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CompileError {
    #[error("unsupported instruction at {location}: {message}")]
    UnsupportedInstruction { location: Location, message: String },

    #[error("unknown identifier `{name}` at {location}: {message}")]
    UnknownIdentifier {
        location: Location,
        name: String,
        message: String,
    },

    #[error("type mismatch at {location}: {message}")]
    TypeMismatch { location: Location, message: String },

    #[error("arity mismatch at {location}: expected {expected}, found {found}")]
    ArityMismatch {
        location: Location,
        expected: String,
        found: usize,
    },

    #[error("malformed control flow at {location}: {message}")]
    MalformedControlFlow { location: Location, message: String },
}

pub type Result<T> = std::result::Result<T, CompileError>;

impl CompileError {
    pub fn location(&self) -> Location {
        match self {
            Self::UnsupportedInstruction { location, .. }
            | Self::UnknownIdentifier { location, .. }
            | Self::TypeMismatch { location, .. }
            | Self::ArityMismatch { location, .. }
            | Self::MalformedControlFlow { location, .. } => *location,
        }
    }
}

impl Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Declaration => write!(f, "declaration"),
            Self::Instruction(at) => write!(f, "instruction #{}", at),
            Self::End => write!(f, "end of function"),
        }
    }
}

macro_rules! bail {
    ($kind:ident, $location:expr, $($arg:tt)*) => {
        return Err($crate::error::CompileError::$kind {
            location: $location,
            message: format!($($arg)*),
        })
    };
}

pub(crate) use bail;
