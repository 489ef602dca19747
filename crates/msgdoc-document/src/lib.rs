//! Dynamically-typed documents.
//!
//! [`Document`] is the schema-less side of the message/document mapping: a
//! tree of maps, arrays and scalars including native date/time and binary
//! values. The [`json`] module converts documents to and from MongoDB
//! Extended JSON so they can cross plain JSON transports.

mod error;
pub mod json;
mod value;

pub use error::DocumentError;
pub use json::{
    from_extended_json, parse_extended_json, to_extended_json, to_extended_json_string,
    ExtendedJsonOptions,
};
pub use value::{Document, DocumentMap};
