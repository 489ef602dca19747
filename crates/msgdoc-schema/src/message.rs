//! Message descriptors and their builder.

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::SchemaError;
use crate::field::{FieldDescriptor, FieldType, Label};
use crate::timestamp::TIMESTAMP_TYPE_NAME;

/// Static description of a message type: its full name and ordered fields.
///
/// Nested message types are referenced through `Arc`, so a descriptor can
/// only point at types that already exist and the type graph is acyclic.
///
/// ```
/// use msgdoc_schema::{FieldType, MessageDescriptor};
///
/// let sub = MessageDescriptor::builder("test.SubTest")
///     .field("value", FieldType::Int32)
///     .build()
///     .unwrap();
/// let test = MessageDescriptor::builder("test.Test")
///     .field("id", FieldType::Int64)
///     .repeated("tags", FieldType::String)
///     .message("sub", &sub)
///     .build()
///     .unwrap();
///
/// assert_eq!(test.field_len(), 3);
/// assert_eq!(test.index_of("tags"), Some(1));
/// ```
#[derive(Debug)]
pub struct MessageDescriptor {
    full_name: String,
    fields: Vec<FieldDescriptor>,
    by_name: HashMap<String, usize>,
}

impl MessageDescriptor {
    pub fn builder(full_name: impl Into<String>) -> MessageDescriptorBuilder {
        MessageDescriptorBuilder::new(full_name)
    }

    /// Assembles a descriptor from already validated fields.
    pub(crate) fn from_parts(full_name: String, fields: Vec<FieldDescriptor>) -> Self {
        let by_name = fields
            .iter()
            .map(|f| (f.name.clone(), f.index))
            .collect();
        Self {
            full_name,
            fields,
            by_name,
        }
    }

    #[inline]
    pub fn full_name(&self) -> &str {
        &self.full_name
    }

    /// Fields in declaration order.
    #[inline]
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.by_name.get(name).map(|&i| &self.fields[i])
    }

    pub fn field_at(&self, index: usize) -> Option<&FieldDescriptor> {
        self.fields.get(index)
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.by_name.get(name).copied()
    }

    #[inline]
    pub fn field_len(&self) -> usize {
        self.fields.len()
    }

    /// Returns `true` when `field` is one of this type's own descriptors.
    pub fn owns(&self, field: &FieldDescriptor) -> bool {
        self.fields
            .get(field.index)
            .is_some_and(|own| own.name == field.name)
    }
}

impl PartialEq for MessageDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.full_name == other.full_name && self.fields == other.fields
    }
}

impl std::fmt::Display for MessageDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.full_name)
    }
}

// -------------------------------------------------------------------------
// MessageDescriptorBuilder

#[derive(Debug, Clone)]
struct PendingField {
    name: String,
    field_type: FieldType,
    label: Label,
    message_type: Option<Arc<MessageDescriptor>>,
}

/// Collects fields in declaration order and validates them on [`build`].
///
/// [`build`]: MessageDescriptorBuilder::build
#[derive(Debug, Clone)]
pub struct MessageDescriptorBuilder {
    full_name: String,
    fields: Vec<PendingField>,
}

impl MessageDescriptorBuilder {
    pub fn new(full_name: impl Into<String>) -> Self {
        Self {
            full_name: full_name.into(),
            fields: Vec::new(),
        }
    }

    fn push(
        mut self,
        name: impl Into<String>,
        field_type: FieldType,
        label: Label,
        message_type: Option<&Arc<MessageDescriptor>>,
    ) -> Self {
        self.fields.push(PendingField {
            name: name.into(),
            field_type,
            label,
            message_type: message_type.cloned(),
        });
        self
    }

    /// Adds a singular field of the given type.
    pub fn field(self, name: impl Into<String>, field_type: FieldType) -> Self {
        self.push(name, field_type, Label::Singular, None)
    }

    /// Adds a repeated field of the given type.
    pub fn repeated(self, name: impl Into<String>, field_type: FieldType) -> Self {
        self.push(name, field_type, Label::Repeated, None)
    }

    /// Adds a singular field nesting `message_type`.
    pub fn message(self, name: impl Into<String>, message_type: &Arc<MessageDescriptor>) -> Self {
        self.push(name, FieldType::Message, Label::Singular, Some(message_type))
    }

    /// Adds a repeated field nesting `message_type`.
    pub fn repeated_message(
        self,
        name: impl Into<String>,
        message_type: &Arc<MessageDescriptor>,
    ) -> Self {
        self.push(name, FieldType::Message, Label::Repeated, Some(message_type))
    }

    pub fn build(self) -> Result<Arc<MessageDescriptor>, SchemaError> {
        if self.full_name == TIMESTAMP_TYPE_NAME {
            return Err(SchemaError::ReservedTypeName(self.full_name));
        }
        if self.full_name.is_empty() {
            return Err(SchemaError::EmptyTypeName);
        }

        let mut fields: Vec<FieldDescriptor> = Vec::with_capacity(self.fields.len());
        for (index, pending) in self.fields.into_iter().enumerate() {
            if pending.name.is_empty() {
                return Err(SchemaError::EmptyFieldName {
                    message: self.full_name,
                });
            }
            if fields.iter().any(|f| f.name == pending.name) {
                return Err(SchemaError::DuplicateField {
                    message: self.full_name,
                    field: pending.name,
                });
            }
            // A nested type is only meaningful on message-typed fields.
            let message_type = match pending.field_type {
                FieldType::Message => match pending.message_type {
                    Some(ty) => Some(ty),
                    None => {
                        return Err(SchemaError::MissingMessageType {
                            message: self.full_name,
                            field: pending.name,
                        })
                    }
                },
                _ => None,
            };
            fields.push(FieldDescriptor {
                name: pending.name,
                index,
                field_type: pending.field_type,
                label: pending.label,
                message_type,
            });
        }

        Ok(Arc::new(MessageDescriptor::from_parts(self.full_name, fields)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sub() -> Arc<MessageDescriptor> {
        MessageDescriptor::builder("test.SubTest")
            .field("value", FieldType::Int32)
            .build()
            .unwrap()
    }

    #[test]
    fn fields_keep_declaration_order() {
        let sub = sub();
        let d = MessageDescriptor::builder("test.Test")
            .field("int_value", FieldType::Int32)
            .field("float_value", FieldType::Float)
            .repeated("int_list", FieldType::Int32)
            .message("sub_test", &sub)
            .repeated_message("sub_test_list", &sub)
            .build()
            .unwrap();

        let names: Vec<&str> = d.fields().iter().map(|f| f.name()).collect();
        assert_eq!(
            names,
            vec![
                "int_value",
                "float_value",
                "int_list",
                "sub_test",
                "sub_test_list"
            ]
        );
        for (i, f) in d.fields().iter().enumerate() {
            assert_eq!(f.index(), i);
            assert!(d.owns(f));
        }
        assert!(d.field("int_list").unwrap().is_repeated());
        assert_eq!(
            d.field("sub_test").unwrap().message_type().unwrap().full_name(),
            "test.SubTest"
        );
        assert!(d.field("float_value").unwrap().message_type().is_none());
        assert!(d.field("missing").is_none());
    }

    #[test]
    fn build_rejects_invalid_descriptors() {
        assert_eq!(
            MessageDescriptor::builder("").build().unwrap_err(),
            SchemaError::EmptyTypeName
        );
        assert_eq!(
            MessageDescriptor::builder("a.B")
                .field("", FieldType::Bool)
                .build()
                .unwrap_err(),
            SchemaError::EmptyFieldName {
                message: "a.B".into()
            }
        );
        assert_eq!(
            MessageDescriptor::builder("a.B")
                .field("x", FieldType::Bool)
                .repeated("x", FieldType::Int32)
                .build()
                .unwrap_err(),
            SchemaError::DuplicateField {
                message: "a.B".into(),
                field: "x".into()
            }
        );
        assert_eq!(
            MessageDescriptor::builder("a.B")
                .field("m", FieldType::Message)
                .build()
                .unwrap_err(),
            SchemaError::MissingMessageType {
                message: "a.B".into(),
                field: "m".into()
            }
        );
        assert_eq!(
            MessageDescriptor::builder(TIMESTAMP_TYPE_NAME)
                .build()
                .unwrap_err(),
            SchemaError::ReservedTypeName(TIMESTAMP_TYPE_NAME.into())
        );
    }

    #[test]
    fn foreign_field_is_not_owned() {
        let a = sub();
        let b = MessageDescriptor::builder("test.Other")
            .field("other", FieldType::Int32)
            .build()
            .unwrap();
        assert!(!a.owns(&b.fields()[0]));
    }

    #[test]
    fn structural_equality() {
        assert_eq!(*sub(), *sub());
        let renamed = MessageDescriptor::builder("test.SubTest2")
            .field("value", FieldType::Int32)
            .build()
            .unwrap();
        assert_ne!(*sub(), *renamed);
    }
}
