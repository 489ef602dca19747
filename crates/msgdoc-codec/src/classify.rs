//! Field classification.

use msgdoc_schema::{FieldDescriptor, FieldType, ScalarKind};

/// The fifteen field types the codec copies as plain values.
pub const PRIMITIVE_TYPES: [FieldType; 15] = [
    FieldType::Double,
    FieldType::Float,
    FieldType::Int64,
    FieldType::UInt64,
    FieldType::Int32,
    FieldType::UInt32,
    FieldType::Fixed64,
    FieldType::Fixed32,
    FieldType::Bool,
    FieldType::String,
    FieldType::SFixed32,
    FieldType::SFixed64,
    FieldType::SInt32,
    FieldType::SInt64,
    FieldType::Bytes,
];

/// How the codec treats a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldClass {
    /// Copied verbatim, held in memory as the given kind.
    Primitive(ScalarKind),
    /// Walked recursively, or handled as a date/time for timestamps.
    NestedMessage,
}

/// Classifies `field` by its declared type.
pub fn classify(field: &FieldDescriptor) -> FieldClass {
    let ty = field.field_type();
    match ty.scalar_kind() {
        Some(kind) if PRIMITIVE_TYPES.contains(&ty) => FieldClass::Primitive(kind),
        _ => FieldClass::NestedMessage,
    }
}
