use serde_json::Value as JsonValue;

use row_api::{CaseInsensitiveMap, DecodeError, MapType, RecordType, Row, TypeNode, Value};

use crate::coerce::{coerce, json_kind};
use crate::names::NameIndex;
use crate::path::FieldPath;

/// Schema-directed decoder core.
///
/// Walks a JSON tree and a `TypeNode` tree in lock-step. Holds only the
/// schema and its name index, both immutable, so one instance serves any
/// number of threads.
#[derive(Debug, Clone)]
pub struct RecordDecoder {
    schema: RecordType,
    index: NameIndex,
}

impl RecordDecoder {
    pub fn new(schema: RecordType) -> Self {
        let index = NameIndex::build(&schema);
        Self { schema, index }
    }

    pub fn schema(&self) -> &RecordType {
        &self.schema
    }

    pub fn index(&self) -> &NameIndex {
        &self.index
    }

    /// Decode `node` as the root record.
    pub fn decode_root(&self, node: &JsonValue, path: &FieldPath<'_>) -> Result<Row, DecodeError> {
        self.decode_record(node, &self.schema, path)
    }

    /// Decode `node` against `ty`. `null` decodes to `Value::Null` for
    /// every type without further checks.
    pub fn decode(&self, node: &JsonValue, ty: &TypeNode, path: &FieldPath<'_>) -> Result<Value, DecodeError> {
        if node.is_null() {
            return Ok(Value::Null);
        }
        match ty {
            TypeNode::Scalar(kind) => coerce(node, *kind, path),
            TypeNode::List(element) => self.decode_list(node, element, path),
            TypeNode::Map(map) => self.decode_map(node, map, path),
            TypeNode::Record(record) => self.decode_record(node, record, path).map(Value::Row),
        }
    }

    /// Elements keep the list's own path.
    fn decode_list(&self, node: &JsonValue, element: &TypeNode, path: &FieldPath<'_>) -> Result<Value, DecodeError> {
        let JsonValue::Array(items) = node else {
            return Err(DecodeError::type_mismatch(path, "list", json_kind(node)));
        };
        items
            .iter()
            .map(|item| self.decode(item, element, path))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::List)
    }

    /// Keys keep their spelling and document order; the later of two keys
    /// equal ignoring case is rejected.
    fn decode_map(&self, node: &JsonValue, map: &MapType, path: &FieldPath<'_>) -> Result<Value, DecodeError> {
        let JsonValue::Object(entries) = node else {
            return Err(DecodeError::type_mismatch(path, "map", json_kind(node)));
        };

        let mut decoded = CaseInsensitiveMap::with_capacity(entries.len());
        for (key, value) in entries {
            let value = self.decode(value, map.value(), &path.child(key))?;
            decoded
                .try_insert(key.as_str(), value)
                .map_err(|(key, _)| DecodeError::DuplicateKey {
                    path: path.to_string(),
                    key,
                })?;
        }
        Ok(Value::Map(decoded))
    }

    /// Keys are visited in document order, so the first bad field in the
    /// document is the one reported. Unknown keys are skipped; fields
    /// without a key stay null.
    fn decode_record(&self, node: &JsonValue, record: &RecordType, path: &FieldPath<'_>) -> Result<Row, DecodeError> {
        let JsonValue::Object(entries) = node else {
            return Err(DecodeError::type_mismatch(path, "struct", json_kind(node)));
        };
        let unindexed = || DecodeError::UnindexedRecord {
            path: path.to_string(),
        };
        let fields = self.index.fields(record).ok_or_else(unindexed)?;

        let mut row = Row::nulls(record.len());
        for (key, value) in entries {
            let Some(slot) = fields.get(&key.to_lowercase()) else {
                continue;
            };
            let (Some(name), Some(ty)) = (record.field_name(slot), record.field_type(slot)) else {
                return Err(unindexed());
            };
            let value = self.decode(value, ty, &path.child(name))?;
            if !row.set(slot, value) {
                return Err(unindexed());
            }
        }
        Ok(row)
    }
}
