use msgdoc_codec::CodecError;
use thiserror::Error;

use crate::id::DocumentId;

/// Errors raised by collections and [`MessageStore`](crate::MessageStore).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error(transparent)]
    Codec(#[from] CodecError),
    #[error("invalid document id `{0}`: expected 24 hex characters")]
    InvalidDocumentId(String),
    #[error("duplicate `_id` {0}")]
    DuplicateId(DocumentId),
    #[error("the `_id` field cannot be changed")]
    ImmutableId,
    #[error("stored documents must be maps, got {0}")]
    NotAMap(&'static str),
    #[error("store holds `{expected}` messages, got `{found}`")]
    DescriptorMismatch { expected: String, found: String },
    #[error("cannot increment {kind} field `{field}`")]
    NotNumeric { field: String, kind: &'static str },
    #[error("incrementing `{field}` overflows")]
    IncrementOverflow { field: String },
    #[error("index `{name}` is invalid: {reason}")]
    InvalidIndex { name: String, reason: &'static str },
    #[error("index `{0}` already exists with different keys")]
    IndexConflict(String),
    #[error("index `{0}` not found")]
    IndexNotFound(String),
    #[error("the `_id_` index cannot be dropped")]
    CannotDropIdIndex,
    #[error("auto id counter `{0}` is missing")]
    MissingCounter(String),
    #[error("document written by upsert could not be read back")]
    UpsertNotVisible,
}
