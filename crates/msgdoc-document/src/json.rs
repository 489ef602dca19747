//! MongoDB Extended JSON (v2) form of documents.
//!
//! Relaxed mode keeps numbers as plain JSON numbers and dates as ISO-8601
//! strings; canonical mode wraps every number and date so the exact variant
//! survives the trip. Bytes are always `$binary` and non-finite doubles are
//! always `$numberDouble`, since plain JSON has no form for them.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::{DateTime, Datelike, SecondsFormat, Utc};
use serde_json::{Map, Number, Value};

use crate::error::DocumentError;
use crate::value::{Document, DocumentMap};

/// Options for [`to_extended_json`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ExtendedJsonOptions {
    /// Emit canonical instead of relaxed Extended JSON.
    pub canonical: bool,
}

impl ExtendedJsonOptions {
    pub fn canonical() -> Self {
        Self { canonical: true }
    }

    pub fn relaxed() -> Self {
        Self { canonical: false }
    }
}

const BINARY_SUBTYPE_GENERIC: &str = "00";

// -------------------------------------------------------------------------
// Encoding

/// Converts a document into its Extended JSON value.
pub fn to_extended_json(doc: &Document, options: &ExtendedJsonOptions) -> Value {
    let canonical = options.canonical;
    match doc {
        Document::Null => Value::Null,
        Document::Bool(b) => Value::Bool(*b),
        Document::Int32(v) if canonical => wrap("$numberInt", Value::String(v.to_string())),
        Document::Int32(v) => Value::from(*v),
        Document::Int64(v) if canonical => wrap("$numberLong", Value::String(v.to_string())),
        Document::Int64(v) => Value::from(*v),
        Document::UInt32(v) if canonical => wrap("$numberLong", Value::String(v.to_string())),
        Document::UInt32(v) => Value::from(*v),
        Document::UInt64(v) if canonical => wrap("$numberLong", Value::String(v.to_string())),
        Document::UInt64(v) => Value::from(*v),
        Document::Float(v) => encode_double(f64::from(*v), canonical),
        Document::Double(v) => encode_double(*v, canonical),
        Document::String(s) => Value::String(s.clone()),
        Document::Bytes(bytes) => {
            let mut binary = Map::new();
            binary.insert("base64".into(), Value::String(STANDARD.encode(bytes)));
            binary.insert(
                "subType".into(),
                Value::String(BINARY_SUBTYPE_GENERIC.into()),
            );
            wrap("$binary", Value::Object(binary))
        }
        Document::DateTime(dt) => encode_date(dt, canonical),
        Document::Array(items) => {
            Value::Array(items.iter().map(|d| to_extended_json(d, options)).collect())
        }
        Document::Map(map) => Value::Object(
            map.iter()
                .map(|(k, v)| (k.clone(), to_extended_json(v, options)))
                .collect(),
        ),
    }
}

/// Converts a document into an Extended JSON string.
pub fn to_extended_json_string(doc: &Document, options: &ExtendedJsonOptions) -> String {
    to_extended_json(doc, options).to_string()
}

fn wrap(key: &str, value: Value) -> Value {
    let mut map = Map::new();
    map.insert(key.to_owned(), value);
    Value::Object(map)
}

fn encode_double(v: f64, canonical: bool) -> Value {
    if v.is_nan() {
        return wrap("$numberDouble", Value::String("NaN".into()));
    }
    if v.is_infinite() {
        let text = if v > 0.0 { "Infinity" } else { "-Infinity" };
        return wrap("$numberDouble", Value::String(text.into()));
    }
    if canonical {
        return wrap("$numberDouble", Value::String(format!("{v:?}")));
    }
    // Finite values always have a JSON number form.
    Number::from_f64(v).map_or(Value::Null, Value::Number)
}

fn encode_date(dt: &DateTime<Utc>, canonical: bool) -> Value {
    let year = dt.year();
    if !canonical && (1970..=9999).contains(&year) {
        return wrap(
            "$date",
            Value::String(dt.to_rfc3339_opts(SecondsFormat::AutoSi, true)),
        );
    }
    let millis = wrap("$numberLong", Value::String(dt.timestamp_millis().to_string()));
    wrap("$date", millis)
}

// -------------------------------------------------------------------------
// Decoding

/// Converts an Extended JSON value (relaxed or canonical) into a document.
///
/// Plain integers become the narrowest of `Int32`, `Int64` and `UInt64` that
/// holds them; other numbers become `Double`. Objects whose single key is a
/// recognised `$` wrapper decode to the wrapped type; any other object is a
/// plain map.
pub fn from_extended_json(value: &Value) -> Result<Document, DocumentError> {
    match value {
        Value::Null => Ok(Document::Null),
        Value::Bool(b) => Ok(Document::Bool(*b)),
        Value::Number(n) => Ok(decode_number(n)),
        Value::String(s) => Ok(Document::String(s.clone())),
        Value::Array(items) => items
            .iter()
            .map(from_extended_json)
            .collect::<Result<Vec<_>, _>>()
            .map(Document::Array),
        Value::Object(map) => decode_object(map),
    }
}

/// Parses an Extended JSON string into a document.
pub fn parse_extended_json(text: &str) -> Result<Document, DocumentError> {
    let value: Value = serde_json::from_str(text)?;
    from_extended_json(&value)
}

fn decode_number(n: &Number) -> Document {
    if let Some(v) = n.as_i64() {
        return match i32::try_from(v) {
            Ok(small) => Document::Int32(small),
            Err(_) => Document::Int64(v),
        };
    }
    if let Some(v) = n.as_u64() {
        return Document::UInt64(v);
    }
    Document::Double(n.as_f64().unwrap_or(f64::NAN))
}

const WRAPPERS: [&str; 5] = [
    "$numberInt",
    "$numberLong",
    "$numberDouble",
    "$binary",
    "$date",
];

fn decode_object(map: &Map<String, Value>) -> Result<Document, DocumentError> {
    if let Some(&key) = WRAPPERS.iter().find(|k| map.contains_key(**k)) {
        if map.len() != 1 {
            return Err(DocumentError::ExtraKeys(key));
        }
        let inner = &map[key];
        return match key {
            "$numberInt" => decode_int32(inner),
            "$numberLong" => decode_int64(inner),
            "$numberDouble" => decode_double(inner),
            "$binary" => decode_binary(inner),
            _ => decode_date(inner),
        };
    }
    let mut out = DocumentMap::with_capacity(map.len());
    for (k, v) in map {
        out.insert(k.clone(), from_extended_json(v)?);
    }
    Ok(Document::Map(out))
}

fn decode_int32(inner: &Value) -> Result<Document, DocumentError> {
    inner
        .as_str()
        .and_then(|s| s.parse::<i32>().ok())
        .map(Document::Int32)
        .ok_or(DocumentError::InvalidInt32)
}

fn decode_int64(inner: &Value) -> Result<Document, DocumentError> {
    let text = inner.as_str().ok_or(DocumentError::InvalidInt64)?;
    if let Ok(v) = text.parse::<i64>() {
        return Ok(Document::Int64(v));
    }
    text.parse::<u64>()
        .map(Document::UInt64)
        .map_err(|_| DocumentError::InvalidInt64)
}

fn decode_double(inner: &Value) -> Result<Document, DocumentError> {
    let text = inner.as_str().ok_or(DocumentError::InvalidDouble)?;
    let v = match text {
        "NaN" => f64::NAN,
        "Infinity" => f64::INFINITY,
        "-Infinity" => f64::NEG_INFINITY,
        _ => text.parse::<f64>().map_err(|_| DocumentError::InvalidDouble)?,
    };
    Ok(Document::Double(v))
}

fn decode_binary(inner: &Value) -> Result<Document, DocumentError> {
    let fields = inner.as_object().ok_or(DocumentError::InvalidBinary)?;
    if fields.len() != 2 {
        return Err(DocumentError::InvalidBinary);
    }
    let payload = fields
        .get("base64")
        .and_then(Value::as_str)
        .ok_or(DocumentError::InvalidBinary)?;
    let sub_type = fields
        .get("subType")
        .and_then(Value::as_str)
        .ok_or(DocumentError::InvalidBinary)?;
    if sub_type.is_empty() || sub_type.len() > 2 || u8::from_str_radix(sub_type, 16).is_err() {
        return Err(DocumentError::InvalidBinary);
    }
    STANDARD
        .decode(payload)
        .map(Document::Bytes)
        .map_err(|_| DocumentError::InvalidBinary)
}

fn decode_date(inner: &Value) -> Result<Document, DocumentError> {
    let dt = match inner {
        Value::String(iso) => DateTime::parse_from_rfc3339(iso)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|_| DocumentError::InvalidDate)?,
        Value::Number(n) => n
            .as_i64()
            .and_then(DateTime::from_timestamp_millis)
            .ok_or(DocumentError::InvalidDate)?,
        Value::Object(fields) => {
            if fields.len() != 1 {
                return Err(DocumentError::InvalidDate);
            }
            fields
                .get("$numberLong")
                .and_then(Value::as_str)
                .and_then(|s| s.parse::<i64>().ok())
                .and_then(DateTime::from_timestamp_millis)
                .ok_or(DocumentError::InvalidDate)?
        }
        _ => return Err(DocumentError::InvalidDate),
    };
    Ok(Document::DateTime(dt))
}
