use std::collections::HashSet;
use std::fmt;

use crate::error::SchemaError;

// ════════════════════════════════════════════════════════════════
//  Scalar Kind
// ════════════════════════════════════════════════════════════════

/// Primitive column kinds.
///
/// `Void` and `Unknown` can appear in a schema but have no runtime
/// representation: decoding into them always fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarKind {
    Bool,
    Int8,
    Int16,
    Int32,
    Int64,
    Float32,
    Float64,
    Text,
    Void,
    Unknown,
}

impl ScalarKind {
    /// Name used in error messages (`int32`, `text`, ...).
    pub fn name(self) -> &'static str {
        match self {
            ScalarKind::Bool => "bool",
            ScalarKind::Int8 => "int8",
            ScalarKind::Int16 => "int16",
            ScalarKind::Int32 => "int32",
            ScalarKind::Int64 => "int64",
            ScalarKind::Float32 => "float32",
            ScalarKind::Float64 => "float64",
            ScalarKind::Text => "text",
            ScalarKind::Void => "void",
            ScalarKind::Unknown => "unknown",
        }
    }

    /// Keyword used in type descriptor strings (`tinyint`, `string`, ...).
    pub fn type_name(self) -> &'static str {
        match self {
            ScalarKind::Bool => "boolean",
            ScalarKind::Int8 => "tinyint",
            ScalarKind::Int16 => "smallint",
            ScalarKind::Int32 => "int",
            ScalarKind::Int64 => "bigint",
            ScalarKind::Float32 => "float",
            ScalarKind::Float64 => "double",
            ScalarKind::Text => "string",
            ScalarKind::Void => "void",
            ScalarKind::Unknown => "unknown",
        }
    }

    /// `false` for kinds that can never hold a decoded value.
    pub fn is_decodable(self) -> bool {
        !matches!(self, ScalarKind::Void | ScalarKind::Unknown)
    }
}

impl fmt::Display for ScalarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ════════════════════════════════════════════════════════════════
//  Type Node
// ════════════════════════════════════════════════════════════════

/// Column type: a scalar or one of the three container categories.
///
/// Built once when a table schema is established and never mutated
/// afterwards, so a schema can be shared across decoding threads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeNode {
    Scalar(ScalarKind),
    List(Box<TypeNode>),
    Map(MapType),
    Record(RecordType),
}

impl TypeNode {
    pub fn scalar(kind: ScalarKind) -> Self {
        TypeNode::Scalar(kind)
    }

    pub fn list(element: TypeNode) -> Self {
        TypeNode::List(Box::new(element))
    }

    /// Map type. Keys must be `Scalar(Text)`.
    pub fn map(key: TypeNode, value: TypeNode) -> Result<Self, SchemaError> {
        MapType::new(key, value).map(TypeNode::Map)
    }

    pub fn record(fields: impl IntoIterator<Item = Field>) -> Result<Self, SchemaError> {
        RecordType::new(fields).map(TypeNode::Record)
    }

    /// Category name used in error messages.
    pub fn category(&self) -> &'static str {
        match self {
            TypeNode::Scalar(_) => "scalar",
            TypeNode::List(_) => "list",
            TypeNode::Map(_) => "map",
            TypeNode::Record(_) => "struct",
        }
    }
}

impl From<ScalarKind> for TypeNode {
    fn from(kind: ScalarKind) -> Self {
        TypeNode::Scalar(kind)
    }
}

impl fmt::Display for TypeNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeNode::Scalar(kind) => f.write_str(kind.type_name()),
            TypeNode::List(element) => write!(f, "array<{element}>"),
            TypeNode::Map(map) => write!(f, "map<string,{}>", map.value()),
            TypeNode::Record(record) => write!(f, "{record}"),
        }
    }
}

// ════════════════════════════════════════════════════════════════
//  Map Type
// ════════════════════════════════════════════════════════════════

/// Map with text keys. The key type is checked here, at construction,
/// so decoding never has to look at it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapType {
    value: Box<TypeNode>,
}

impl MapType {
    pub fn new(key: TypeNode, value: TypeNode) -> Result<Self, SchemaError> {
        match key {
            TypeNode::Scalar(ScalarKind::Text) => Ok(Self {
                value: Box::new(value),
            }),
            other => Err(SchemaError::NonTextMapKey {
                found: other.to_string(),
            }),
        }
    }

    pub fn key(&self) -> ScalarKind {
        ScalarKind::Text
    }

    pub fn value(&self) -> &TypeNode {
        &self.value
    }
}

// ════════════════════════════════════════════════════════════════
//  Field & RecordType
// ════════════════════════════════════════════════════════════════

/// A named slot in a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub name: String,
    pub ty: TypeNode,
}

impl Field {
    pub fn new(name: impl Into<String>, ty: impl Into<TypeNode>) -> Self {
        Self {
            name: name.into(),
            ty: ty.into(),
        }
    }
}

/// Ordered record shape.
///
/// Field position is the slot index in the decoded `Row`. Names and
/// types are stored side by side so the ordered name list can serve as
/// the structural signature of the record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordType {
    names: Vec<String>,
    types: Vec<TypeNode>,
}

impl RecordType {
    /// Names must be non-empty and unique ignoring case: lookups by name
    /// are case-insensitive, so `Id` and `id` would share a slot.
    pub fn new(fields: impl IntoIterator<Item = Field>) -> Result<Self, SchemaError> {
        let mut names = Vec::new();
        let mut types = Vec::new();
        let mut seen = HashSet::new();

        for field in fields {
            if field.name.is_empty() {
                return Err(SchemaError::EmptyFieldName);
            }
            if !seen.insert(field.name.to_lowercase()) {
                return Err(SchemaError::DuplicateField { name: field.name });
            }
            names.push(field.name);
            types.push(field.ty);
        }

        Ok(Self { names, types })
    }

    /// Build the root record from a comma-separated column list and a
    /// type descriptor list (`"id,tags"`, `"bigint,array<string>"`).
    pub fn from_columns(names: &str, types: &str) -> Result<Self, SchemaError> {
        crate::type_string::parse_columns(names, types)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Field names in slot order.
    pub fn field_names(&self) -> &[String] {
        &self.names
    }

    pub fn field_name(&self, slot: usize) -> Option<&str> {
        self.names.get(slot).map(String::as_str)
    }

    pub fn field_type(&self, slot: usize) -> Option<&TypeNode> {
        self.types.get(slot)
    }

    /// `(name, type)` pairs in slot order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &TypeNode)> {
        self.names.iter().map(String::as_str).zip(self.types.iter())
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("struct<")?;
        for (i, (name, ty)) in self.fields().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{name}:{ty}")?;
        }
        f.write_str(">")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn map_rejects_non_text_key() {
        let err = TypeNode::map(ScalarKind::Int32.into(), ScalarKind::Text.into()).unwrap_err();
        assert_eq!(err, SchemaError::NonTextMapKey { found: "int".into() });
    }

    #[test]
    fn record_rejects_case_insensitive_duplicates() {
        let err = RecordType::new([
            Field::new("Id", ScalarKind::Int64),
            Field::new("id", ScalarKind::Text),
        ])
        .unwrap_err();
        assert_eq!(err, SchemaError::DuplicateField { name: "id".into() });
    }

    #[test]
    fn record_rejects_empty_name() {
        let err = RecordType::new([Field::new("", ScalarKind::Bool)]).unwrap_err();
        assert_eq!(err, SchemaError::EmptyFieldName);
    }

    #[test]
    fn void_columns_are_accepted_at_construction() {
        let record = RecordType::new([Field::new("nothing", ScalarKind::Void)]).unwrap();
        assert_eq!(record.field_type(0), Some(&TypeNode::Scalar(ScalarKind::Void)));
        assert!(!ScalarKind::Void.is_decodable());
    }

    #[test]
    fn display_uses_descriptor_syntax() {
        let inner = TypeNode::record([
            Field::new("a", ScalarKind::Int32),
            Field::new("b", TypeNode::list(ScalarKind::Text.into())),
        ])
        .unwrap();
        let ty = TypeNode::map(ScalarKind::Text.into(), inner).unwrap();
        assert_eq!(ty.to_string(), "map<string,struct<a:int,b:array<string>>>");
    }
}
