use std::path::PathBuf;
use thiserror::Error;

/// Per-row validation failure. Carries the offending field and the
/// zero-based row index within the coerced table.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("row {row}: missing required field '{field}'")]
    MissingField { field: &'static str, row: usize },

    #[error("row {row}: field '{field}' must not be empty")]
    EmptyField { field: &'static str, row: usize },

    #[error("row {row}: field '{field}' must be greater than 0")]
    OutOfRange { field: &'static str, row: usize },
}

impl ValidationError {
    pub fn field(&self) -> &'static str {
        match self {
            ValidationError::MissingField { field, .. }
            | ValidationError::EmptyField { field, .. }
            | ValidationError::OutOfRange { field, .. } => field,
        }
    }

    pub fn row(&self) -> usize {
        match self {
            ValidationError::MissingField { row, .. }
            | ValidationError::EmptyField { row, .. }
            | ValidationError::OutOfRange { row, .. } => *row,
        }
    }
}

#[derive(Error, Debug)]
pub enum EtlError {
    #[error("input source not found: {}", .0.display())]
    MissingSource(PathBuf),

    #[error("schema error: {0}")]
    Schema(String),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("failed to persist output: {0}")]
    Persistence(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("TOML deserialization failed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, EtlError>;
