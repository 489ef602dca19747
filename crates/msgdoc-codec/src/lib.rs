//! Schema-driven conversion between typed messages and documents.
//!
//! [`to_document`] walks a [`DynamicMessage`](msgdoc_schema::DynamicMessage)
//! field by field and builds a sparse [`Document`](msgdoc_document::Document)
//! map; [`parse`] goes the other way, clearing the target and populating it
//! from a document. Both recurse into nested messages and both treat
//! `google.protobuf.Timestamp` as a native date/time value.

mod classify;
mod de;
mod error;
mod path;
mod scalar;
mod ser;

pub use classify::{classify, FieldClass, PRIMITIVE_TYPES};
pub use de::parse;
pub use error::CodecError;
pub use ser::to_document;
