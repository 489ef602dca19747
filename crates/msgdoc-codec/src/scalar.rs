//! Conversions between primitive field values and document scalars.

use msgdoc_document::Document;
use msgdoc_schema::{Scalar, ScalarKind};

use crate::error::CodecError;
use crate::path::Path;

pub(crate) fn scalar_to_document(value: &Scalar) -> Document {
    match value {
        Scalar::Double(v) => Document::Double(*v),
        Scalar::Float(v) => Document::Float(*v),
        Scalar::Int32(v) => Document::Int32(*v),
        Scalar::Int64(v) => Document::Int64(*v),
        Scalar::UInt32(v) => Document::UInt32(*v),
        Scalar::UInt64(v) => Document::UInt64(*v),
        Scalar::Bool(v) => Document::Bool(*v),
        Scalar::String(v) => Document::String(v.clone()),
        Scalar::Bytes(v) => Document::Bytes(v.clone()),
    }
}

fn document_to_scalar(value: &Document) -> Option<Scalar> {
    let scalar = match value {
        Document::Double(v) => Scalar::Double(*v),
        Document::Float(v) => Scalar::Float(*v),
        Document::Int32(v) => Scalar::Int32(*v),
        Document::Int64(v) => Scalar::Int64(*v),
        Document::UInt32(v) => Scalar::UInt32(*v),
        Document::UInt64(v) => Scalar::UInt64(*v),
        Document::Bool(v) => Scalar::Bool(*v),
        Document::String(v) => Scalar::String(v.clone()),
        Document::Bytes(v) => Scalar::Bytes(v.clone()),
        Document::Null | Document::DateTime(_) | Document::Array(_) | Document::Map(_) => {
            return None
        }
    };
    Some(scalar)
}

/// Converts a document value for assignment to a field of `kind`.
pub(crate) fn assignable(value: &Document, kind: ScalarKind, path: &Path) -> Result<Scalar, CodecError> {
    document_to_scalar(value)
        .and_then(|scalar| scalar.coerce(kind))
        .ok_or_else(|| CodecError::TypeMismatch {
            path: path.pointer(),
            expected: kind.as_str(),
            found: value.kind(),
        })
}
