//! Document to message conversion.

use std::sync::Arc;

use log::{log_enabled, trace, Level};
use msgdoc_document::{Document, DocumentMap};
use msgdoc_schema::{DynamicMessage, FieldDescriptor, MessageDescriptor, Timestamp};

use crate::classify::{classify, FieldClass};
use crate::error::CodecError;
use crate::path::Path;
use crate::scalar::assignable;

/// Populates `message` from `doc` and returns it.
///
/// The target is cleared first, so fields the document does not mention end
/// up at their defaults. Keys with no matching field are ignored. Values are
/// converted with the same rules the message setters apply: integers of any
/// width fit integer fields when in range and convert to float fields,
/// floats convert between widths, and everything else must match exactly.
///
/// On error the target is left partially populated.
///
/// ```
/// use msgdoc_codec::parse;
/// use msgdoc_document::Document;
/// use msgdoc_schema::{DynamicMessage, FieldType, MessageDescriptor, Scalar};
///
/// let descriptor = MessageDescriptor::builder("test.Test")
///     .field("id", FieldType::Int32)
///     .repeated("tags", FieldType::String)
///     .build()
///     .unwrap();
/// let doc = Document::from_pairs([
///     ("id", Document::Int64(123)),
///     ("extra", Document::Bool(true)),
/// ]);
///
/// let mut msg = DynamicMessage::new(descriptor);
/// parse(&doc, &mut msg).unwrap();
/// assert_eq!(msg.get("id").unwrap(), &Scalar::Int32(123));
/// assert!(msg.get_list("tags").unwrap().is_empty());
/// ```
pub fn parse<'m>(
    doc: &Document,
    message: &'m mut DynamicMessage,
) -> Result<&'m mut DynamicMessage, CodecError> {
    let mut path = Path::default();
    parse_message(doc, message, &mut path)?;
    Ok(message)
}

fn mismatch(path: &Path, expected: &'static str, found: &Document) -> CodecError {
    CodecError::TypeMismatch {
        path: path.pointer(),
        expected,
        found: found.kind(),
    }
}

fn parse_message(doc: &Document, message: &mut DynamicMessage, path: &mut Path) -> Result<(), CodecError> {
    message.clear();
    let descriptor = Arc::clone(message.descriptor());

    if Timestamp::is_timestamp(&descriptor) {
        let Document::DateTime(dt) = doc else {
            return Err(mismatch(path, "datetime", doc));
        };
        Timestamp::from_datetime(dt).write_to(message)?;
        return Ok(());
    }

    let Document::Map(map) = doc else {
        return Err(mismatch(path, "map", doc));
    };
    for field in descriptor.fields() {
        let Some(value) = map.get(field.name()) else {
            continue;
        };
        path.push(field.name());
        parse_field(value, message, field, path)?;
        path.pop();
    }

    if log_enabled!(Level::Trace) {
        trace_unknown_keys(map, &descriptor, path);
    }
    Ok(())
}

fn parse_field(
    value: &Document,
    message: &mut DynamicMessage,
    field: &FieldDescriptor,
    path: &mut Path,
) -> Result<(), CodecError> {
    match (classify(field), field.is_repeated()) {
        (FieldClass::Primitive(kind), true) => {
            let Document::Array(items) = value else {
                return Err(mismatch(path, "array", value));
            };
            for (i, item) in items.iter().enumerate() {
                path.push_index(i);
                let scalar = assignable(item, kind, path)?;
                message.push_scalar(field, scalar)?;
                path.pop();
            }
        }
        (FieldClass::NestedMessage, true) => {
            let Document::Array(items) = value else {
                return Err(mismatch(path, "array", value));
            };
            for (i, item) in items.iter().enumerate() {
                path.push_index(i);
                let child = message.add_message(field)?;
                parse_message(item, child, path)?;
                path.pop();
            }
        }
        (FieldClass::Primitive(kind), false) => {
            let scalar = assignable(value, kind, path)?;
            message.set_scalar(field, scalar)?;
        }
        (FieldClass::NestedMessage, false) => {
            let child = message.message_mut(field)?;
            parse_message(value, child, path)?;
        }
    }
    Ok(())
}

fn trace_unknown_keys(map: &DocumentMap, descriptor: &MessageDescriptor, path: &Path) {
    for key in map.keys() {
        if descriptor.field(key).is_none() {
            trace!(
                "ignoring key `{key}` at `{}`: not a field of {}",
                path.pointer(),
                descriptor.full_name()
            );
        }
    }
}
