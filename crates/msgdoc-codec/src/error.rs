use msgdoc_schema::SchemaError;
use thiserror::Error;

/// Errors raised by [`to_document`](crate::to_document) and
/// [`parse`](crate::parse).
///
/// Paths are JSON Pointers into the document (`""` is the root).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CodecError {
    #[error("type mismatch at `{path}`: expected {expected}, found {found}")]
    TypeMismatch {
        path: String,
        expected: &'static str,
        found: &'static str,
    },
    #[error("timestamp at `{path}` ({seconds}s {nanos}ns) is out of the date/time range")]
    TimestampOutOfRange {
        path: String,
        seconds: i64,
        nanos: i32,
    },
    #[error(transparent)]
    Schema(#[from] SchemaError),
}
