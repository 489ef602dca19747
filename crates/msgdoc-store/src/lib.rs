//! Persisting typed messages in a document store.
//!
//! [`MessageStore`] binds a message type to a collection and converts with
//! `msgdoc-codec` on every read and write. Storage is reached through the
//! [`Collection`] and [`Database`] traits; [`memory`] implements them in
//! process. [`AutoId`] hands out sequential integer ids kept in the
//! database itself.

mod auto_id;
mod collection;
mod error;
mod id;
pub mod memory;
mod store;

pub use auto_id::{AutoId, AUTO_ID_COLLECTION};
pub use collection::{
    Collection, Database, Filter, IndexDirection, IndexSpec, Result, Update, UpdateOutcome,
    ID_FIELD, ID_INDEX_NAME,
};
pub use error::StoreError;
pub use id::DocumentId;
pub use memory::{MemoryCollection, MemoryDatabase};
pub use store::{IndexReport, MessageStore, StoreOptions};
