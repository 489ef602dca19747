//! Error types for the Extended JSON form.

use thiserror::Error;

/// Errors raised while decoding Extended JSON into a [`Document`].
///
/// [`Document`]: crate::Document
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DocumentError {
    #[error("Invalid JSON at line {line}, column {column}")]
    InvalidJson { line: usize, column: usize },
    #[error("Invalid Int32 format")]
    InvalidInt32,
    #[error("Invalid Int64 format")]
    InvalidInt64,
    #[error("Invalid Double format")]
    InvalidDouble,
    #[error("Invalid Binary format")]
    InvalidBinary,
    #[error("Invalid Date format")]
    InvalidDate,
    #[error("Invalid {0} format: extra keys not allowed")]
    ExtraKeys(&'static str),
}

impl From<serde_json::Error> for DocumentError {
    fn from(err: serde_json::Error) -> Self {
        DocumentError::InvalidJson {
            line: err.line(),
            column: err.column(),
        }
    }
}
