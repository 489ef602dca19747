//! Field descriptors.

use std::sync::Arc;

use crate::message::MessageDescriptor;
use crate::scalar::ScalarKind;

/// Declared type of a message field, following the protobuf wire kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldType {
    Double,
    Float,
    Int64,
    UInt64,
    Int32,
    Fixed64,
    Fixed32,
    Bool,
    String,
    Bytes,
    UInt32,
    SFixed32,
    SFixed64,
    SInt32,
    SInt64,
    Message,
}

impl FieldType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Double => "double",
            Self::Float => "float",
            Self::Int64 => "int64",
            Self::UInt64 => "uint64",
            Self::Int32 => "int32",
            Self::Fixed64 => "fixed64",
            Self::Fixed32 => "fixed32",
            Self::Bool => "bool",
            Self::String => "string",
            Self::Bytes => "bytes",
            Self::UInt32 => "uint32",
            Self::SFixed32 => "sfixed32",
            Self::SFixed64 => "sfixed64",
            Self::SInt32 => "sint32",
            Self::SInt64 => "sint64",
            Self::Message => "message",
        }
    }

    /// In-memory representation of values of this type, `None` for messages.
    pub fn scalar_kind(self) -> Option<ScalarKind> {
        let kind = match self {
            Self::Double => ScalarKind::Double,
            Self::Float => ScalarKind::Float,
            Self::Int64 | Self::SInt64 | Self::SFixed64 => ScalarKind::Int64,
            Self::UInt64 | Self::Fixed64 => ScalarKind::UInt64,
            Self::Int32 | Self::SInt32 | Self::SFixed32 => ScalarKind::Int32,
            Self::UInt32 | Self::Fixed32 => ScalarKind::UInt32,
            Self::Bool => ScalarKind::Bool,
            Self::String => ScalarKind::String,
            Self::Bytes => ScalarKind::Bytes,
            Self::Message => return None,
        };
        Some(kind)
    }
}

impl std::fmt::Display for FieldType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Cardinality of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Label {
    #[default]
    Singular,
    Repeated,
}

/// Static metadata of one named field of a message type.
///
/// Obtained from [`MessageDescriptor::fields`]; never constructed directly.
#[derive(Debug, Clone)]
pub struct FieldDescriptor {
    pub(crate) name: String,
    pub(crate) index: usize,
    pub(crate) field_type: FieldType,
    pub(crate) label: Label,
    pub(crate) message_type: Option<Arc<MessageDescriptor>>,
}

impl FieldDescriptor {
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Position of the field in its message's declaration order.
    #[inline]
    pub fn index(&self) -> usize {
        self.index
    }

    #[inline]
    pub fn field_type(&self) -> FieldType {
        self.field_type
    }

    #[inline]
    pub fn label(&self) -> Label {
        self.label
    }

    #[inline]
    pub fn is_repeated(&self) -> bool {
        self.label == Label::Repeated
    }

    /// Descriptor of the nested type for [`FieldType::Message`] fields.
    #[inline]
    pub fn message_type(&self) -> Option<&Arc<MessageDescriptor>> {
        self.message_type.as_ref()
    }

    #[inline]
    pub fn scalar_kind(&self) -> Option<ScalarKind> {
        self.field_type.scalar_kind()
    }
}

impl PartialEq for FieldDescriptor {
    fn eq(&self, other: &Self) -> bool {
        let same_message_type = match (&self.message_type, &other.message_type) {
            (None, None) => true,
            (Some(a), Some(b)) => Arc::ptr_eq(a, b) || a == b,
            _ => false,
        };
        self.name == other.name
            && self.index == other.index
            && self.field_type == other.field_type
            && self.label == other.label
            && same_message_type
    }
}
