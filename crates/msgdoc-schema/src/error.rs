use thiserror::Error;

/// Errors raised while building descriptors or accessing message fields.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SchemaError {
    #[error("message type name must not be empty")]
    EmptyTypeName,
    #[error("field name must not be empty in `{message}`")]
    EmptyFieldName { message: String },
    #[error("duplicate field `{field}` in `{message}`")]
    DuplicateField { message: String, field: String },
    #[error("field `{field}` in `{message}` is message-typed but has no message descriptor")]
    MissingMessageType { message: String, field: String },
    #[error("type name `{0}` is reserved")]
    ReservedTypeName(String),
    #[error("`{message}` has no field `{field}`")]
    UnknownField { message: String, field: String },
    #[error("field `{field}` in `{message}` is not a {expected} field")]
    WrongFieldShape {
        message: String,
        field: String,
        expected: &'static str,
    },
    #[error("cannot assign {found} to {expected} field `{field}`")]
    TypeMismatch {
        field: String,
        expected: &'static str,
        found: &'static str,
    },
    #[error("field `{field}` expects message `{expected}`, got `{found}`")]
    MessageTypeMismatch {
        field: String,
        expected: String,
        found: String,
    },
}
