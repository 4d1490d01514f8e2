//! Error types for the calculator core

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Malformed syntax, reported at the offending token.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{message} at position {position}")]
pub struct ParseError {
    pub message: String,
    /// Character offset of the offending token
    pub position: usize,
}

impl ParseError {
    pub fn new(message: impl Into<String>, position: usize) -> Self {
        Self {
            message: message.into(),
            position,
        }
    }
}

/// Failures while evaluating a well-formed expression
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EvalError {
    #[error("division by zero")]
    DivisionByZero,

    #[error("undefined variable '{0}'")]
    UndefinedVariable(String),

    #[error("incompatible units: {0}")]
    IncompatibleUnits(String),

    #[error("unknown unit '{0}'")]
    UnknownUnit(String),

    #[error("unknown currency '{0}'")]
    UnknownCurrency(String),

    #[error("{0}")]
    PreviousReferenceOutOfRange(String),

    #[error("circular reference at line {0}")]
    CircularReference(u64),

    #[error("unknown function '{0}'")]
    UnknownFunction(String),

    #[error("{0}")]
    InvalidArguments(String),

    #[error("{0}")]
    InvalidOperation(String),
}

impl From<tally_units::Error> for EvalError {
    fn from(err: tally_units::Error) -> Self {
        match err {
            tally_units::Error::UnknownUnit(name) => EvalError::UnknownUnit(name),
            tally_units::Error::Incompatible { from, to } => {
                EvalError::IncompatibleUnits(format!("'{from}' vs '{to}'"))
            }
            other => EvalError::InvalidOperation(other.to_string()),
        }
    }
}

/// Any failure produced while handling a line
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Eval(#[from] EvalError),
}

impl Error {
    pub fn is_parse(&self) -> bool {
        matches!(self, Error::Parse(_))
    }
}
