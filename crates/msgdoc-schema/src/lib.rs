//! Message schema descriptors and dynamic message instances.
//!
//! A [`MessageDescriptor`] lists the fields of a message type in declaration
//! order; a [`DynamicMessage`] is an instance of such a type whose fields are
//! read and written through the descriptor's [`FieldDescriptor`]s. The
//! [`Timestamp`] well-known type lives here too, since codecs treat it as a
//! scalar rather than as a nested message.

mod dynamic;
mod error;
mod field;
mod message;
mod scalar;
mod timestamp;

pub use dynamic::DynamicMessage;
pub use error::SchemaError;
pub use field::{FieldDescriptor, FieldType, Label};
pub use message::{MessageDescriptor, MessageDescriptorBuilder};
pub use scalar::{Scalar, ScalarKind};
pub use timestamp::{Timestamp, TIMESTAMP_TYPE_NAME};
