use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    #[error("unknown unit '{0}'")]
    UnknownUnit(String),

    #[error("incompatible units: '{from}' vs '{to}'")]
    Incompatible { from: String, to: String },

    #[error("invalid compound unit '{spec}': {message}")]
    InvalidCompound { spec: String, message: &'static str },

    #[error("custom unit scale must be a positive finite number, got {0}")]
    InvalidScale(f64),

    #[error("unit name '{0}' is already defined")]
    DuplicateUnit(String),

    #[error("cannot derive a unit from affine unit '{0}'")]
    AffineBase(String),
}
