//! Message to document conversion.

use msgdoc_document::{Document, DocumentMap};
use msgdoc_schema::{DynamicMessage, FieldDescriptor, Timestamp};

use crate::classify::{classify, FieldClass};
use crate::error::CodecError;
use crate::path::Path;
use crate::scalar::scalar_to_document;

/// Converts a message into a document.
///
/// The result is a map keyed by field name, in declaration order. Singular
/// primitive fields are always present, default values included. Singular
/// message fields are present only when set, and repeated fields only when
/// non-empty. Timestamp messages become [`Document::DateTime`] values, both
/// at the top level and when nested.
///
/// Fails only when a timestamp lies outside the range a date/time value can
/// hold.
pub fn to_document(message: &DynamicMessage) -> Result<Document, CodecError> {
    let mut path = Path::default();
    serialize_message(message, &mut path)
}

fn serialize_message(message: &DynamicMessage, path: &mut Path) -> Result<Document, CodecError> {
    let descriptor = message.descriptor();
    if Timestamp::is_timestamp(descriptor) {
        return serialize_timestamp(message, path);
    }

    let mut map = DocumentMap::with_capacity(descriptor.field_len());
    for field in descriptor.fields() {
        path.push(field.name());
        if let Some(value) = serialize_field(message, field, path)? {
            map.insert(field.name().to_owned(), value);
        }
        path.pop();
    }
    Ok(Document::Map(map))
}

fn serialize_field(
    message: &DynamicMessage,
    field: &FieldDescriptor,
    path: &mut Path,
) -> Result<Option<Document>, CodecError> {
    let value = match (classify(field), field.is_repeated()) {
        (FieldClass::Primitive(_), true) => {
            let items = message.scalars(field)?;
            if items.is_empty() {
                return Ok(None);
            }
            Document::Array(items.iter().map(scalar_to_document).collect())
        }
        (FieldClass::NestedMessage, true) => {
            let children = message.messages(field)?;
            if children.is_empty() {
                return Ok(None);
            }
            let mut items = Vec::with_capacity(children.len());
            for (i, child) in children.iter().enumerate() {
                path.push_index(i);
                items.push(serialize_message(child, path)?);
                path.pop();
            }
            Document::Array(items)
        }
        (FieldClass::Primitive(_), false) => scalar_to_document(message.scalar(field)?),
        (FieldClass::NestedMessage, false) => match message.message(field)? {
            Some(child) => serialize_message(child, path)?,
            None => return Ok(None),
        },
    };
    Ok(Some(value))
}

fn serialize_timestamp(message: &DynamicMessage, path: &Path) -> Result<Document, CodecError> {
    let timestamp = Timestamp::from_message(message)?;
    timestamp
        .to_datetime()
        .map(Document::DateTime)
        .ok_or_else(|| CodecError::TimestampOutOfRange {
            path: path.pointer(),
            seconds: timestamp.seconds,
            nanos: timestamp.nanos,
        })
}
