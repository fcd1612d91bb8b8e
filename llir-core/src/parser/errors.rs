//! Parse error types for the IR parser
//!
//! Sub-grammars report what went wrong without knowing where; the line
//! loop attaches the location and the raw line when converting to
//! [`IrError`].

use llir_common::{IrError, SourceLocation};
use thiserror::Error;

/// Parse error types specific to the parser
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("malformed function header: {0}")]
    MalformedDefinition(String),

    #[error("unknown argument syntax `{0}`")]
    UnknownArgumentSyntax(String),

    #[error("unsupported attribute `{0}`")]
    UnsupportedAttribute(String),

    #[error("unbalanced brackets in `{0}`")]
    UnbalancedBrackets(String),

    #[error("missing operand: {0}")]
    MissingOperand(String),

    #[error("unknown comparison predicate `{0}`")]
    UnknownPredicate(String),

    #[error("invalid integer `{0}`")]
    InvalidInteger(String),

    #[error("malformed global: {0}")]
    MalformedGlobal(String),

    #[error("unexpected {0}")]
    UnexpectedConstruct(String),

    #[error("duplicate block label %{0}")]
    DuplicateLabel(String),

    #[error("end of input inside function @{0}")]
    UnterminatedFunction(String),

    #[error("unsupported opcode `{0}`")]
    UnsupportedOpcode(String),
}

impl ParseError {
    /// Attach the offending line
    pub fn at(self, location: SourceLocation, text: &str) -> IrError {
        match self {
            ParseError::UnsupportedOpcode(opcode) => IrError::UnsupportedOpcode { location, opcode },
            other => IrError::parse_error(other.to_string(), location, text),
        }
    }
}

pub(crate) type PResult<T> = Result<T, ParseError>;
