use crate::schema::ScalarKind;

/// Errors raised while building a table schema.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchemaError {
    #[error("table has no columns")]
    NoColumns,

    #[error("table has no column types")]
    NoColumnTypes,

    #[error("columns size ({names}) does not match column types size ({types})")]
    ColumnCountMismatch { names: usize, types: usize },

    #[error("field name is empty")]
    EmptyFieldName,

    #[error("duplicate field name (case-insensitive): {name}")]
    DuplicateField { name: String },

    #[error("map key must be string, found {found}")]
    NonTextMapKey { found: String },

    #[error("invalid type descriptor at offset {offset}: {message}")]
    InvalidTypeString { offset: usize, message: String },
}

/// Errors raised while decoding one document.
///
/// Every variant that concerns a schema position carries the dotted path
/// of that position from the document root (`""` for the root itself).
/// The first error aborts the whole document.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    #[error("{field} field is missing{}", column(.path))]
    MissingField { path: String, field: String },

    #[error("expected {expected}, found {found}{}", column(.path))]
    TypeMismatch {
        path: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error("cannot deserialize to {kind} type{}", column(.path))]
    UnsupportedType { path: String, kind: ScalarKind },

    #[error("case-insensitive map already contains key: {key}{}", column(.path))]
    DuplicateKey { path: String, key: String },

    #[error("invalid timestamp: {raw}")]
    InvalidTimestamp { raw: String },

    #[error("error parsing JSON: {0}")]
    MalformedDocument(String),

    #[error("no field name index for record{}", column(.path))]
    UnindexedRecord { path: String },
}

fn column(path: &str) -> String {
    if path.is_empty() {
        String::new()
    } else {
        format!(" for column {path}")
    }
}

impl DecodeError {
    pub fn missing_field(path: impl ToString, field: impl Into<String>) -> Self {
        DecodeError::MissingField {
            path: path.to_string(),
            field: field.into(),
        }
    }

    pub fn type_mismatch(path: impl ToString, expected: &'static str, found: &'static str) -> Self {
        DecodeError::TypeMismatch {
            path: path.to_string(),
            expected,
            found,
        }
    }

    /// Dotted path of the failing position, if the error has one.
    pub fn path(&self) -> Option<&str> {
        match self {
            DecodeError::MissingField { path, .. }
            | DecodeError::TypeMismatch { path, .. }
            | DecodeError::UnsupportedType { path, .. }
            | DecodeError::DuplicateKey { path, .. }
            | DecodeError::UnindexedRecord { path } => Some(path),
            DecodeError::InvalidTimestamp { .. } | DecodeError::MalformedDocument(_) => None,
        }
    }

    /// `true` when the schema itself can never be satisfied; every
    /// document will fail the same way, so skipping it is pointless.
    pub fn is_schema_error(&self) -> bool {
        matches!(
            self,
            DecodeError::UnsupportedType { .. } | DecodeError::UnindexedRecord { .. }
        )
    }
}

impl From<serde_json::Error> for DecodeError {
    fn from(e: serde_json::Error) -> Self {
        DecodeError::MalformedDocument(e.to_string())
    }
}
