//! Auto-incrementing integer identifiers.

use std::sync::Arc;

use log::debug;
use msgdoc_document::{Document, DocumentMap};

use crate::collection::{Collection, Database, Filter, Result, Update};
use crate::error::StoreError;

/// Collection holding one counter document per name.
pub const AUTO_ID_COLLECTION: &str = "__ID__";

const NAME_FIELD: &str = "name";
const NEXT_ID_FIELD: &str = "next_id";

/// A named counter stored as `{name, next_id}` in the
/// [`AUTO_ID_COLLECTION`] collection of a database.
///
/// Counters are shared by every `AutoId` with the same name in the same
/// database, including across processes when the database is shared.
pub struct AutoId {
    name: String,
    collection: Arc<dyn Collection>,
}

impl AutoId {
    /// Opens the counter called `name`, creating it at zero if it does not
    /// exist yet. An existing counter keeps its value.
    pub fn new(name: impl Into<String>, database: &dyn Database) -> Result<Self> {
        let name = name.into();
        let collection = database.collection(AUTO_ID_COLLECTION);
        let counter = Self { name, collection };

        let initial = DocumentMap::from_iter([
            (NAME_FIELD.to_owned(), Document::from(counter.name.as_str())),
            (NEXT_ID_FIELD.to_owned(), Document::Int64(0)),
        ]);
        counter
            .collection
            .update_one(&counter.filter(), Update::SetOnInsert(initial), true)?;
        Ok(counter)
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    fn filter(&self) -> Filter {
        Filter::from_iter([(NAME_FIELD.to_owned(), Document::from(self.name.as_str()))])
    }

    /// Returns the current value and advances the counter by one: `0`, `1`,
    /// `2`, ...
    pub fn next_id(&self) -> Result<i64> {
        let before = self
            .collection
            .find_one_and_increment(&self.filter(), NEXT_ID_FIELD, 1)?
            .ok_or_else(|| StoreError::MissingCounter(self.name.clone()))?;
        let id = match before.get(NEXT_ID_FIELD) {
            None => 0,
            Some(value) => value
                .as_integer()
                .and_then(|n| i64::try_from(n).ok())
                .ok_or_else(|| StoreError::NotNumeric {
                    field: NEXT_ID_FIELD.to_owned(),
                    kind: value.kind(),
                })?,
        };
        debug!("[{AUTO_ID_COLLECTION}] allocated {} #{id}", self.name);
        Ok(id)
    }
}

impl std::fmt::Debug for AutoId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AutoId")
            .field("name", &self.name)
            .field("collection", &self.collection.name())
            .finish()
    }
}
