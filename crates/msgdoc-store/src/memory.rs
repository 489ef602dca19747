//! In-process [`Database`] and [`Collection`] implementations.

use std::collections::HashMap;
use std::sync::Arc;

use log::debug;
use msgdoc_document::{Document, DocumentMap};
use parking_lot::Mutex;

use crate::collection::{
    Collection, Database, Filter, IndexSpec, Result, Update, UpdateOutcome, ID_FIELD,
    ID_INDEX_NAME,
};
use crate::error::StoreError;
use crate::id::DocumentId;

// ---------------------------------------------------------------------------
// MemoryDatabase

/// Database whose collections live in memory for the life of the value.
pub struct MemoryDatabase {
    name: String,
    collections: Mutex<HashMap<String, Arc<MemoryCollection>>>,
}

impl MemoryDatabase {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            collections: Mutex::new(HashMap::new()),
        }
    }

    /// Like [`Database::collection`], keeping the concrete type.
    pub fn memory_collection(&self, name: &str) -> Arc<MemoryCollection> {
        let mut collections = self.collections.lock();
        let collection = collections
            .entry(name.to_owned())
            .or_insert_with(|| Arc::new(MemoryCollection::new(name)));
        Arc::clone(collection)
    }

    /// Names of the collections created so far, sorted.
    pub fn collection_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.collections.lock().keys().cloned().collect();
        names.sort();
        names
    }
}

impl Database for MemoryDatabase {
    fn name(&self) -> &str {
        &self.name
    }

    fn collection(&self, name: &str) -> Arc<dyn Collection> {
        self.memory_collection(name)
    }
}

// ---------------------------------------------------------------------------
// MemoryCollection

struct CollectionState {
    documents: Vec<DocumentMap>,
    indexes: Vec<IndexSpec>,
}

impl CollectionState {
    fn position(&self, filter: &Filter) -> Option<usize> {
        self.documents.iter().position(|doc| matches(doc, filter))
    }

    fn contains_id(&self, id: &DocumentId) -> Result<bool> {
        for doc in &self.documents {
            if let Some(existing) = doc.get(ID_FIELD) {
                if DocumentId::from_document(existing)? == *id {
                    return Ok(true);
                }
            }
        }
        Ok(false)
    }

    /// Assigns or validates `_id`, keeping it as the first key.
    fn insert(&mut self, mut doc: DocumentMap) -> Result<DocumentId> {
        let id = match doc.get(ID_FIELD) {
            Some(value) => DocumentId::from_document(value)?,
            None => DocumentId::new(),
        };
        if self.contains_id(&id)? {
            return Err(StoreError::DuplicateId(id));
        }
        doc.shift_remove(ID_FIELD);
        doc.shift_insert(0, ID_FIELD.to_owned(), Document::from(id));
        self.documents.push(doc);
        Ok(id)
    }
}

/// Collection holding its documents in insertion order behind a mutex.
///
/// Indexes are bookkeeping only; lookups always scan.
pub struct MemoryCollection {
    name: String,
    state: Mutex<CollectionState>,
}

fn matches(doc: &DocumentMap, filter: &Filter) -> bool {
    filter.iter().all(|(key, expected)| match doc.get(key) {
        Some(value) => value.loose_eq(expected),
        None => expected.is_null(),
    })
}

fn increment(field: &str, current: Option<&Document>, by: i64) -> Result<Document> {
    let overflow = || StoreError::IncrementOverflow {
        field: field.to_owned(),
    };
    let next = match current {
        None | Some(Document::Null) => Document::Int64(by),
        Some(Document::Int32(v)) => match i32::try_from(by).ok().and_then(|b| v.checked_add(b)) {
            Some(n) => Document::Int32(n),
            None => Document::Int64(i64::from(*v).checked_add(by).ok_or_else(overflow)?),
        },
        Some(Document::Int64(v)) => Document::Int64(v.checked_add(by).ok_or_else(overflow)?),
        Some(Document::UInt32(v)) => {
            let n = i64::from(*v).checked_add(by).ok_or_else(overflow)?;
            u32::try_from(n).map_or(Document::Int64(n), Document::UInt32)
        }
        Some(Document::UInt64(v)) => {
            let n = i128::from(*v) + i128::from(by);
            Document::UInt64(u64::try_from(n).map_err(|_| overflow())?)
        }
        Some(Document::Double(v)) => Document::Double(v + by as f64),
        Some(Document::Float(v)) => Document::Float(v + by as f32),
        Some(other) => {
            return Err(StoreError::NotNumeric {
                field: field.to_owned(),
                kind: other.kind(),
            })
        }
    };
    Ok(next)
}

impl MemoryCollection {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            state: Mutex::new(CollectionState {
                documents: Vec::new(),
                indexes: vec![IndexSpec::id_index()],
            }),
        }
    }

    /// Number of stored documents.
    pub fn len(&self) -> usize {
        self.state.lock().documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Collection for MemoryCollection {
    fn name(&self) -> &str {
        &self.name
    }

    fn find_one(&self, filter: &Filter) -> Result<Option<DocumentMap>> {
        let state = self.state.lock();
        Ok(state.position(filter).map(|i| state.documents[i].clone()))
    }

    fn find(&self, filter: &Filter) -> Result<Vec<DocumentMap>> {
        let state = self.state.lock();
        Ok(state
            .documents
            .iter()
            .filter(|doc| matches(doc, filter))
            .cloned()
            .collect())
    }

    fn insert_one(&self, doc: DocumentMap) -> Result<DocumentId> {
        let id = self.state.lock().insert(doc)?;
        debug!("[{}] inserted {id}", self.name);
        Ok(id)
    }

    fn update_one(&self, filter: &Filter, update: Update, upsert: bool) -> Result<UpdateOutcome> {
        let mut state = self.state.lock();
        let Some(i) = state.position(filter) else {
            if !upsert {
                return Ok(UpdateOutcome::default());
            }
            let id = state.insert(update.upsert_document(filter))?;
            debug!("[{}] upserted {id}", self.name);
            return Ok(UpdateOutcome {
                upserted_id: Some(id),
                ..UpdateOutcome::default()
            });
        };

        let fields = match update {
            Update::Set(fields) => fields,
            Update::SetOnInsert(_) => {
                return Ok(UpdateOutcome {
                    matched: 1,
                    ..UpdateOutcome::default()
                })
            }
        };
        let doc = &mut state.documents[i];
        if let Some(new_id) = fields.get(ID_FIELD) {
            if doc.get(ID_FIELD) != Some(new_id) {
                return Err(StoreError::ImmutableId);
            }
        }
        let mut modified = false;
        for (k, v) in fields {
            if doc.get(&k) != Some(&v) {
                doc.insert(k, v);
                modified = true;
            }
        }
        Ok(UpdateOutcome {
            matched: 1,
            modified: u64::from(modified),
            upserted_id: None,
        })
    }

    fn find_one_and_increment(&self, filter: &Filter, field: &str, by: i64) -> Result<Option<DocumentMap>> {
        let mut state = self.state.lock();
        let Some(i) = state.position(filter) else {
            return Ok(None);
        };
        let doc = &mut state.documents[i];
        let before = doc.clone();
        let next = increment(field, doc.get(field), by)?;
        doc.insert(field.to_owned(), next);
        Ok(Some(before))
    }

    fn list_indexes(&self) -> Result<Vec<IndexSpec>> {
        Ok(self.state.lock().indexes.clone())
    }

    fn create_index(&self, index: IndexSpec) -> Result<()> {
        if index.name().is_empty() {
            return Err(StoreError::InvalidIndex {
                name: String::new(),
                reason: "name must not be empty",
            });
        }
        if index.keys().is_empty() {
            return Err(StoreError::InvalidIndex {
                name: index.name().to_owned(),
                reason: "at least one key is required",
            });
        }
        let mut state = self.state.lock();
        match state.indexes.iter().find(|i| i.name() == index.name()) {
            Some(existing) if existing.same_keys(&index) => Ok(()),
            Some(_) => Err(StoreError::IndexConflict(index.name().to_owned())),
            None => {
                debug!("[{}] created index {index}", self.name);
                state.indexes.push(index);
                Ok(())
            }
        }
    }

    fn drop_index(&self, name: &str) -> Result<()> {
        if name == ID_INDEX_NAME {
            return Err(StoreError::CannotDropIdIndex);
        }
        let mut state = self.state.lock();
        let before = state.indexes.len();
        state.indexes.retain(|i| i.name() != name);
        if state.indexes.len() == before {
            return Err(StoreError::IndexNotFound(name.to_owned()));
        }
        debug!("[{}] dropped index {name}", self.name);
        Ok(())
    }
}
