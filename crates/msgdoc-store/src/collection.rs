//! Collection and database contracts.
//!
//! [`MessageStore`](crate::MessageStore) only talks to storage through these
//! traits, so any document database that can answer equality filters,
//! upserts and atomic increments can back it. [`crate::memory`] provides an
//! in-process implementation.

use std::fmt;
use std::sync::Arc;

use msgdoc_document::{Document, DocumentMap};

use crate::error::StoreError;
use crate::id::DocumentId;

/// Result type for storage operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Equality filter on top-level fields. Numbers compare by value across
/// widths; a `Null` value also matches a missing field. The empty filter
/// matches every document.
pub type Filter = DocumentMap;

/// Name of the field holding a document's identifier.
pub const ID_FIELD: &str = "_id";

/// Name of the index every collection keeps on `_id`.
pub const ID_INDEX_NAME: &str = "_id_";

/// Modification applied by [`Collection::update_one`].
#[derive(Debug, Clone, PartialEq)]
pub enum Update {
    /// Overwrites the given fields of the matched document (`$set`).
    Set(DocumentMap),
    /// Writes the given fields only when the update inserts a new document
    /// (`$setOnInsert`).
    SetOnInsert(DocumentMap),
}

impl Update {
    fn fields(&self) -> &DocumentMap {
        match self {
            Update::Set(fields) | Update::SetOnInsert(fields) => fields,
        }
    }

    /// Document inserted by an upsert: the filter's equality fields, then
    /// the update's fields.
    pub fn upsert_document(&self, filter: &Filter) -> DocumentMap {
        let mut doc = filter.clone();
        for (k, v) in self.fields() {
            doc.insert(k.clone(), v.clone());
        }
        doc
    }
}

/// Result of [`Collection::update_one`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct UpdateOutcome {
    pub matched: u64,
    pub modified: u64,
    pub upserted_id: Option<DocumentId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum IndexDirection {
    Ascending,
    Descending,
}

impl IndexDirection {
    /// The `1` / `-1` form used in index key documents.
    pub fn as_i32(self) -> i32 {
        match self {
            IndexDirection::Ascending => 1,
            IndexDirection::Descending => -1,
        }
    }
}

/// A named index over one or more fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexSpec {
    name: String,
    keys: Vec<(String, IndexDirection)>,
}

impl IndexSpec {
    pub fn new<K, I>(name: impl Into<String>, keys: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, IndexDirection)>,
    {
        Self {
            name: name.into(),
            keys: keys.into_iter().map(|(k, d)| (k.into(), d)).collect(),
        }
    }

    /// Single-field ascending index.
    pub fn ascending(name: impl Into<String>, field: impl Into<String>) -> Self {
        let field: String = field.into();
        Self::new(name, [(field, IndexDirection::Ascending)])
    }

    /// The index every collection starts with.
    pub fn id_index() -> Self {
        Self::ascending(ID_INDEX_NAME, ID_FIELD)
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn keys(&self) -> &[(String, IndexDirection)] {
        &self.keys
    }

    /// Whether both indexes cover the same fields with the same directions,
    /// ignoring key order.
    pub fn same_keys(&self, other: &IndexSpec) -> bool {
        let mut a = self.keys.clone();
        let mut b = other.keys.clone();
        a.sort();
        b.sort();
        a == b
    }

    /// Key document, e.g. `{"name": 1, "created": -1}`.
    pub fn key_document(&self) -> Document {
        Document::from_pairs(
            self.keys
                .iter()
                .map(|(k, d)| (k.as_str(), Document::Int32(d.as_i32()))),
        )
    }
}

impl fmt::Display for IndexSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.name, self.key_document())
    }
}

/// A collection of map documents.
///
/// Implementations must be thread-safe; every method is a single atomic
/// operation on the collection.
pub trait Collection: Send + Sync {
    fn name(&self) -> &str;

    /// First document matching `filter`, in insertion order.
    fn find_one(&self, filter: &Filter) -> Result<Option<DocumentMap>>;

    /// All documents matching `filter`, in insertion order.
    fn find(&self, filter: &Filter) -> Result<Vec<DocumentMap>>;

    /// Stores `doc` and returns its identifier, generating one when the
    /// document has no `_id`.
    fn insert_one(&self, doc: DocumentMap) -> Result<DocumentId>;

    /// Applies `update` to the first document matching `filter`. With
    /// `upsert`, inserts [`Update::upsert_document`] when nothing matches.
    fn update_one(&self, filter: &Filter, update: Update, upsert: bool) -> Result<UpdateOutcome>;

    /// Atomically adds `by` to the integer `field` of the first document
    /// matching `filter` and returns that document as it was before. A
    /// missing field counts as zero.
    fn find_one_and_increment(&self, filter: &Filter, field: &str, by: i64) -> Result<Option<DocumentMap>>;

    fn list_indexes(&self) -> Result<Vec<IndexSpec>>;

    /// Creates `index`; a no-op when an identical index exists.
    fn create_index(&self, index: IndexSpec) -> Result<()>;

    fn drop_index(&self, name: &str) -> Result<()>;
}

/// A named set of collections.
pub trait Database: Send + Sync {
    fn name(&self) -> &str;

    /// The collection called `name`, created empty on first use.
    fn collection(&self, name: &str) -> Arc<dyn Collection>;
}
