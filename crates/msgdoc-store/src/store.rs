//! Typed message persistence on top of a [`Collection`].

use std::sync::Arc;

use log::info;
use msgdoc_codec::{parse, to_document};
use msgdoc_document::{Document, DocumentMap};
use msgdoc_schema::{DynamicMessage, MessageDescriptor};
use parking_lot::Mutex;

use crate::auto_id::AutoId;
use crate::collection::{
    Collection, Database, Filter, IndexSpec, Result, Update, ID_FIELD, ID_INDEX_NAME,
};
use crate::error::StoreError;
use crate::id::DocumentId;

/// Options for [`MessageStore`].
#[derive(Debug, Clone, Default)]
pub struct StoreOptions {
    /// Field that receives the next [`AutoId`] value when
    /// [`MessageStore::find_or_create`] inserts a document.
    pub auto_id_field: Option<String>,
    /// Indexes [`MessageStore::create_indexes`] maintains.
    pub indexes: Vec<IndexSpec>,
}

impl StoreOptions {
    pub fn with_auto_id_field(mut self, field: impl Into<String>) -> Self {
        self.auto_id_field = Some(field.into());
        self
    }

    pub fn with_index(mut self, index: IndexSpec) -> Self {
        self.indexes.push(index);
        self
    }
}

/// Counts reported by [`MessageStore::create_indexes`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct IndexReport {
    pub created: usize,
    pub updated: usize,
    pub removed: usize,
}

/// Stores messages of one type in one collection.
///
/// Messages are converted with [`to_document`] before every write and with
/// [`parse`] after every read. Stored documents carry an `_id` the message
/// type usually does not declare; it is ignored when parsing.
pub struct MessageStore {
    database: Arc<dyn Database>,
    collection: Arc<dyn Collection>,
    descriptor: Arc<MessageDescriptor>,
    options: StoreOptions,
    auto_id: Mutex<Option<Arc<AutoId>>>,
}

impl MessageStore {
    pub fn new(
        database: Arc<dyn Database>,
        collection: &str,
        descriptor: Arc<MessageDescriptor>,
        options: StoreOptions,
    ) -> Self {
        let collection = database.collection(collection);
        Self {
            database,
            collection,
            descriptor,
            options,
            auto_id: Mutex::new(None),
        }
    }

    /// Name of the underlying collection.
    pub fn name(&self) -> &str {
        self.collection.name()
    }

    pub fn collection(&self) -> &Arc<dyn Collection> {
        &self.collection
    }

    pub fn descriptor(&self) -> &Arc<MessageDescriptor> {
        &self.descriptor
    }

    pub fn options(&self) -> &StoreOptions {
        &self.options
    }

    /// The counter named after the collection, opened on first use.
    pub fn auto_id(&self) -> Result<Arc<AutoId>> {
        let mut slot = self.auto_id.lock();
        if let Some(auto_id) = slot.as_ref() {
            return Ok(Arc::clone(auto_id));
        }
        let auto_id = Arc::new(AutoId::new(self.name(), self.database.as_ref())?);
        *slot = Some(Arc::clone(&auto_id));
        Ok(auto_id)
    }

    /// Brings the collection's indexes in line with [`StoreOptions::indexes`].
    ///
    /// Missing indexes are created and indexes whose keys changed are
    /// recreated. Indexes that are no longer declared are dropped, except
    /// `_id_`.
    pub fn create_indexes(&self) -> Result<IndexReport> {
        let existing = self.collection.list_indexes()?;
        let mut report = IndexReport::default();

        for declared in &self.options.indexes {
            match existing.iter().find(|i| i.name() == declared.name()) {
                Some(current) if current.same_keys(declared) => {}
                Some(_) => {
                    self.collection.drop_index(declared.name())?;
                    self.collection.create_index(declared.clone())?;
                    report.updated += 1;
                }
                None => {
                    self.collection.create_index(declared.clone())?;
                    report.created += 1;
                }
            }
        }

        for current in &existing {
            let declared = self
                .options
                .indexes
                .iter()
                .any(|i| i.name() == current.name());
            if !declared && current.name() != ID_INDEX_NAME {
                self.collection.drop_index(current.name())?;
                report.removed += 1;
            }
        }

        info!(
            "[{}.{}] Created {} indexes, updated {} indexes, removed {} indexes.",
            self.database.name(),
            self.name(),
            report.created,
            report.updated,
            report.removed
        );
        Ok(report)
    }

    fn check_type(&self, message: &DynamicMessage) -> Result<()> {
        let found = message.descriptor();
        if Arc::ptr_eq(found, &self.descriptor) || **found == *self.descriptor {
            return Ok(());
        }
        Err(StoreError::DescriptorMismatch {
            expected: self.descriptor.full_name().to_owned(),
            found: found.full_name().to_owned(),
        })
    }

    fn to_map(message: &DynamicMessage) -> Result<DocumentMap> {
        match to_document(message)? {
            Document::Map(map) => Ok(map),
            other => Err(StoreError::NotAMap(other.kind())),
        }
    }

    fn decode(&self, doc: DocumentMap) -> Result<DynamicMessage> {
        let mut message = DynamicMessage::new(Arc::clone(&self.descriptor));
        parse(&Document::Map(doc), &mut message)?;
        Ok(message)
    }

    pub fn find_one(&self, filter: &Filter) -> Result<Option<DynamicMessage>> {
        self.collection
            .find_one(filter)?
            .map(|doc| self.decode(doc))
            .transpose()
    }

    pub fn find(&self, filter: &Filter) -> Result<Vec<DynamicMessage>> {
        self.collection
            .find(filter)?
            .into_iter()
            .map(|doc| self.decode(doc))
            .collect()
    }

    /// The message stored under `id`.
    pub fn get(&self, id: &DocumentId) -> Result<Option<DynamicMessage>> {
        let filter = Filter::from_iter([(ID_FIELD.to_owned(), Document::from(*id))]);
        self.find_one(&filter)
    }

    /// Loads the document matching `filter` into `message`, first storing
    /// `message` when nothing matches.
    ///
    /// A newly stored document gets the next [`auto_id`](Self::auto_id)
    /// value in [`StoreOptions::auto_id_field`], if configured. Either way
    /// `message` ends up holding what the collection holds.
    pub fn find_or_create<'m>(
        &self,
        filter: &Filter,
        message: &'m mut DynamicMessage,
    ) -> Result<&'m mut DynamicMessage> {
        self.check_type(message)?;
        let stored = match self.collection.find_one(filter)? {
            Some(doc) => doc,
            None => {
                let mut doc = Self::to_map(message)?;
                if let Some(field) = &self.options.auto_id_field {
                    let id = self.auto_id()?.next_id()?;
                    doc.insert(field.clone(), Document::Int64(id));
                }
                self.collection
                    .update_one(filter, Update::SetOnInsert(doc), true)?;
                self.collection
                    .find_one(filter)?
                    .ok_or(StoreError::UpsertNotVisible)?
            }
        };
        parse(&Document::Map(stored), message)?;
        Ok(message)
    }

    /// Writes `message` and returns the stored document's id.
    ///
    /// With a filter the matching document is updated field by field, or
    /// created when nothing matches; without one a new document is inserted.
    pub fn save(&self, message: &DynamicMessage, filter: Option<&Filter>) -> Result<DocumentId> {
        self.check_type(message)?;
        let doc = Self::to_map(message)?;
        let Some(filter) = filter else {
            return self.collection.insert_one(doc);
        };
        self.collection.update_one(filter, Update::Set(doc), true)?;
        let stored = self
            .collection
            .find_one(filter)?
            .ok_or(StoreError::UpsertNotVisible)?;
        match stored.get(ID_FIELD) {
            Some(id) => DocumentId::from_document(id),
            None => Err(StoreError::UpsertNotVisible),
        }
    }
}

impl std::fmt::Debug for MessageStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MessageStore")
            .field("database", &self.database.name())
            .field("collection", &self.name())
            .field("descriptor", &self.descriptor.full_name())
            .field("options", &self.options)
            .finish()
    }
}
