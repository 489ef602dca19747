//! Primitive field values.

/// In-memory representation class of a primitive field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarKind {
    Double,
    Float,
    Int32,
    Int64,
    UInt32,
    UInt64,
    Bool,
    String,
    Bytes,
}

impl ScalarKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Double => "double",
            Self::Float => "float",
            Self::Int32 => "int32",
            Self::Int64 => "int64",
            Self::UInt32 => "uint32",
            Self::UInt64 => "uint64",
            Self::Bool => "bool",
            Self::String => "string",
            Self::Bytes => "bytes",
        }
    }

    /// The value an unset field of this kind reads as.
    pub fn default_value(self) -> Scalar {
        match self {
            Self::Double => Scalar::Double(0.0),
            Self::Float => Scalar::Float(0.0),
            Self::Int32 => Scalar::Int32(0),
            Self::Int64 => Scalar::Int64(0),
            Self::UInt32 => Scalar::UInt32(0),
            Self::UInt64 => Scalar::UInt64(0),
            Self::Bool => Scalar::Bool(false),
            Self::String => Scalar::String(String::new()),
            Self::Bytes => Scalar::Bytes(Vec::new()),
        }
    }
}

impl std::fmt::Display for ScalarKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A primitive field value.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Double(f64),
    Float(f32),
    Int32(i32),
    Int64(i64),
    UInt32(u32),
    UInt64(u64),
    Bool(bool),
    String(String),
    Bytes(Vec<u8>),
}

impl Scalar {
    pub fn kind(&self) -> ScalarKind {
        match self {
            Self::Double(_) => ScalarKind::Double,
            Self::Float(_) => ScalarKind::Float,
            Self::Int32(_) => ScalarKind::Int32,
            Self::Int64(_) => ScalarKind::Int64,
            Self::UInt32(_) => ScalarKind::UInt32,
            Self::UInt64(_) => ScalarKind::UInt64,
            Self::Bool(_) => ScalarKind::Bool,
            Self::String(_) => ScalarKind::String,
            Self::Bytes(_) => ScalarKind::Bytes,
        }
    }

    fn as_integer(&self) -> Option<i128> {
        match *self {
            Self::Int32(v) => Some(i128::from(v)),
            Self::Int64(v) => Some(i128::from(v)),
            Self::UInt32(v) => Some(i128::from(v)),
            Self::UInt64(v) => Some(i128::from(v)),
            _ => None,
        }
    }

    /// Converts the value for assignment to a field of `kind`.
    ///
    /// Integers convert to any integer kind that can hold them and to both
    /// float kinds; floats convert between widths. Bool, string and bytes
    /// only accept themselves. Returns `None` when no conversion applies.
    pub fn coerce(self, kind: ScalarKind) -> Option<Scalar> {
        if self.kind() == kind {
            return Some(self);
        }
        if let Some(n) = self.as_integer() {
            return match kind {
                ScalarKind::Int32 => i32::try_from(n).ok().map(Scalar::Int32),
                ScalarKind::Int64 => i64::try_from(n).ok().map(Scalar::Int64),
                ScalarKind::UInt32 => u32::try_from(n).ok().map(Scalar::UInt32),
                ScalarKind::UInt64 => u64::try_from(n).ok().map(Scalar::UInt64),
                ScalarKind::Float => Some(Scalar::Float(n as f32)),
                ScalarKind::Double => Some(Scalar::Double(n as f64)),
                ScalarKind::Bool | ScalarKind::String | ScalarKind::Bytes => None,
            };
        }
        match (self, kind) {
            (Self::Float(v), ScalarKind::Double) => Some(Scalar::Double(f64::from(v))),
            (Self::Double(v), ScalarKind::Float) => Some(Scalar::Float(v as f32)),
            _ => None,
        }
    }
}

macro_rules! impl_from_for_scalar {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Scalar {
                fn from(value: $ty) -> Self {
                    Scalar::$variant(value)
                }
            }
        )*
    };
}

impl_from_for_scalar! {
    f64 => Double,
    f32 => Float,
    i32 => Int32,
    i64 => Int64,
    u32 => UInt32,
    u64 => UInt64,
    bool => Bool,
    String => String,
    Vec<u8> => Bytes,
}

impl From<&str> for Scalar {
    fn from(value: &str) -> Self {
        Scalar::String(value.to_owned())
    }
}

impl From<&[u8]> for Scalar {
    fn from(value: &[u8]) -> Self {
        Scalar::Bytes(value.to_vec())
    }
}
