//! Error handling for the IR toolkit
//!
//! Every failure that can abort a parse, a transform or a query is one of
//! the variants below. None of them is recoverable for the module being
//! processed; the caller decides whether to skip, log or re-raise.

use crate::source_loc::SourceLocation;
use thiserror::Error;

/// Result alias used across the workspace
pub type IrResult<T> = Result<T, IrError>;

/// Main error type shared by the parser, the model queries and the driver
#[derive(Error, Debug, Clone, PartialEq)]
pub enum IrError {
    #[error("Parse error at {location}: {message} (in `{text}`)")]
    Parse {
        location: SourceLocation,
        text: String,
        message: String,
    },

    #[error("Unresolved reference in function @{function}: no block labelled %{label}")]
    UnresolvedReference {
        function: String,
        label: String,
    },

    #[error("Unsupported opcode `{opcode}` at {location}")]
    UnsupportedOpcode {
        location: SourceLocation,
        opcode: String,
    },

    #[error("Invalid function @{function}: {message}")]
    Invalid {
        function: String,
        message: String,
    },

    #[error("IO error: {message}")]
    Io { message: String },
}

impl IrError {
    /// Create a parse error for the given line
    pub fn parse_error(message: String, location: SourceLocation, text: &str) -> Self {
        IrError::Parse {
            location,
            text: text.to_string(),
            message,
        }
    }

    /// Create an unresolved block reference error
    pub fn unresolved(function: &str, label: &str) -> Self {
        IrError::UnresolvedReference {
            function: function.to_string(),
            label: label.to_string(),
        }
    }

    /// Create a verifier error
    pub fn invalid(function: &str, message: String) -> Self {
        IrError::Invalid {
            function: function.to_string(),
            message,
        }
    }

    /// Line number the error refers to, if it came from the parser
    pub fn line(&self) -> Option<u32> {
        match self {
            IrError::Parse { location, .. } | IrError::UnsupportedOpcode { location, .. } => {
                Some(location.line)
            }
            _ => None,
        }
    }
}

/// Convert from std::io::Error
impl From<std::io::Error> for IrError {
    fn from(err: std::io::Error) -> Self {
        IrError::Io {
            message: err.to_string(),
        }
    }
}
