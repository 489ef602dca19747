//! Twelve-byte document identifiers.

use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use msgdoc_document::Document;

use crate::error::StoreError;

/// Identifier stored under `_id`, laid out like a MongoDB ObjectId: four
/// bytes of creation time in seconds, five random per-process bytes and a
/// three-byte counter, all big-endian.
///
/// Stored in documents as its 24-character lowercase hex form.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DocumentId([u8; 12]);

struct ProcessState {
    unique: [u8; 5],
    counter: AtomicU32,
}

fn process_state() -> &'static ProcessState {
    static STATE: OnceLock<ProcessState> = OnceLock::new();
    STATE.get_or_init(|| ProcessState {
        unique: rand::random(),
        counter: AtomicU32::new(rand::random::<u32>() & 0x00ff_ffff),
    })
}

impl DocumentId {
    /// Generates a new identifier.
    pub fn new() -> Self {
        let state = process_state();
        let seconds = Utc::now().timestamp() as u32;
        let count = state.counter.fetch_add(1, Ordering::Relaxed) & 0x00ff_ffff;

        let mut bytes = [0_u8; 12];
        bytes[..4].copy_from_slice(&seconds.to_be_bytes());
        bytes[4..9].copy_from_slice(&state.unique);
        bytes[9..].copy_from_slice(&count.to_be_bytes()[1..]);
        Self(bytes)
    }

    pub const fn from_bytes(bytes: [u8; 12]) -> Self {
        Self(bytes)
    }

    pub const fn bytes(&self) -> [u8; 12] {
        self.0
    }

    /// Creation time encoded in the first four bytes.
    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        let seconds = u32::from_be_bytes([self.0[0], self.0[1], self.0[2], self.0[3]]);
        DateTime::from_timestamp(i64::from(seconds), 0)
    }

    /// Reads the identifier out of a stored `_id` value.
    pub fn from_document(value: &Document) -> Result<Self, StoreError> {
        match value {
            Document::String(hex) => hex.parse(),
            other => Err(StoreError::InvalidDocumentId(other.to_string())),
        }
    }
}

impl Default for DocumentId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for b in self.0 {
            write!(f, "{b:02x}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DocumentId({self})")
    }
}

impl FromStr for DocumentId {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || StoreError::InvalidDocumentId(s.to_owned());
        if s.len() != 24 || !s.is_ascii() {
            return Err(invalid());
        }
        let mut bytes = [0_u8; 12];
        for (i, byte) in bytes.iter_mut().enumerate() {
            *byte = u8::from_str_radix(&s[i * 2..i * 2 + 2], 16).map_err(|_| invalid())?;
        }
        Ok(Self(bytes))
    }
}

impl From<DocumentId> for Document {
    fn from(id: DocumentId) -> Self {
        Document::String(id.to_string())
    }
}
