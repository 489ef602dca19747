//! The [`Document`] value tree.

use std::fmt;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;

use crate::json::{to_extended_json, ExtendedJsonOptions};

/// String-keyed map of a document. Keeps insertion order; equality does not
/// depend on it.
pub type DocumentMap = IndexMap<String, Document>;

/// A dynamically-typed document value, as stored by schema-less databases.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Document {
    #[default]
    Null,
    Bool(bool),
    Int32(i32),
    Int64(i64),
    UInt32(u32),
    UInt64(u64),
    Float(f32),
    Double(f64),
    String(String),
    Bytes(Vec<u8>),
    DateTime(DateTime<Utc>),
    Array(Vec<Document>),
    Map(DocumentMap),
}

impl Document {
    /// An empty map document.
    pub fn map() -> Self {
        Document::Map(DocumentMap::new())
    }

    /// Builds a map document from key/value pairs, later keys overwriting
    /// earlier ones.
    pub fn from_pairs<K, I>(pairs: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Document)>,
    {
        Document::Map(pairs.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Short name of the variant, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Document::Null => "null",
            Document::Bool(_) => "bool",
            Document::Int32(_) => "int32",
            Document::Int64(_) => "int64",
            Document::UInt32(_) => "uint32",
            Document::UInt64(_) => "uint64",
            Document::Float(_) => "float",
            Document::Double(_) => "double",
            Document::String(_) => "string",
            Document::Bytes(_) => "bytes",
            Document::DateTime(_) => "datetime",
            Document::Array(_) => "array",
            Document::Map(_) => "map",
        }
    }

    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, Document::Null)
    }

    pub fn as_map(&self) -> Option<&DocumentMap> {
        match self {
            Document::Map(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_map_mut(&mut self) -> Option<&mut DocumentMap> {
        match self {
            Document::Map(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Document]> {
        match self {
            Document::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Document::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Document::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_datetime(&self) -> Option<&DateTime<Utc>> {
        match self {
            Document::DateTime(dt) => Some(dt),
            _ => None,
        }
    }

    /// Value of any integer variant, widened.
    pub fn as_integer(&self) -> Option<i128> {
        match *self {
            Document::Int32(v) => Some(i128::from(v)),
            Document::Int64(v) => Some(i128::from(v)),
            Document::UInt32(v) => Some(i128::from(v)),
            Document::UInt64(v) => Some(i128::from(v)),
            _ => None,
        }
    }

    /// Value of any numeric variant as a double.
    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            Document::Float(v) => Some(f64::from(v)),
            Document::Double(v) => Some(v),
            _ => self.as_integer().map(|n| n as f64),
        }
    }

    /// Looks up `key` when this is a map.
    pub fn get(&self, key: &str) -> Option<&Document> {
        self.as_map().and_then(|m| m.get(key))
    }

    /// Equality that compares numbers by value across widths, recursively.
    ///
    /// `Int32(1)`, `Int64(1)` and `Double(1.0)` are all equal under this
    /// relation; everything else compares as `==` does.
    pub fn loose_eq(&self, other: &Document) -> bool {
        match (self, other) {
            (Document::Array(a), Document::Array(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.loose_eq(y))
            }
            (Document::Map(a), Document::Map(b)) => {
                a.len() == b.len()
                    && a.iter()
                        .all(|(k, v)| b.get(k).is_some_and(|w| v.loose_eq(w)))
            }
            _ => match (self.as_integer(), other.as_integer()) {
                (Some(x), Some(y)) => x == y,
                _ => match (self.as_f64(), other.as_f64()) {
                    (Some(x), Some(y)) => x == y,
                    _ => self == other,
                },
            },
        }
    }
}

impl fmt::Display for Document {
    /// Relaxed Extended JSON.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let json = to_extended_json(self, &ExtendedJsonOptions::default());
        write!(f, "{json}")
    }
}

// -------------------------------------------------------------------------
// Conversions

macro_rules! impl_from_for_document {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Document {
                fn from(value: $ty) -> Self {
                    Document::$variant(value)
                }
            }
        )*
    };
}

impl_from_for_document! {
    bool => Bool,
    i32 => Int32,
    i64 => Int64,
    u32 => UInt32,
    u64 => UInt64,
    f32 => Float,
    f64 => Double,
    String => String,
    Vec<u8> => Bytes,
    DateTime<Utc> => DateTime,
    Vec<Document> => Array,
    DocumentMap => Map,
}

impl From<&str> for Document {
    fn from(value: &str) -> Self {
        Document::String(value.to_owned())
    }
}

impl<K: Into<String>> FromIterator<(K, Document)> for Document {
    fn from_iter<I: IntoIterator<Item = (K, Document)>>(iter: I) -> Self {
        Document::from_pairs(iter)
    }
}
