use serde_json::{Map, Value as JsonValue};

use row_api::{DecodeError, RecordType, Row, ScalarKind, TypeNode, Value};

use crate::coerce::json_kind;
use crate::config::{ConfigError, ReservedColumn, ReservedKind};
use crate::timestamp;

/// Служебная колонка, найденная в схеме, с её позицией.
#[derive(Debug, Clone, PartialEq, Eq)]
struct ActiveColumn {
    kind: ReservedKind,
    slot: usize,
    source: String,
}

/// Шаг после декодирования payload: перезаписывает служебные колонки
/// значениями из корня документа (не из payload).
///
/// Активны только колонки, присутствующие в схеме. Активная колонка
/// обязательна: отсутствующий или не строковый ключ в корне отклоняет документ.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetadataOverlay {
    columns: Vec<ActiveColumn>,
}

impl MetadataOverlay {
    /// Сопоставить служебные колонки со схемой (имена без учёта регистра).
    /// Найденная колонка должна иметь тип `string`.
    pub fn resolve(schema: &RecordType, reserved: &[ReservedColumn]) -> Result<Self, ConfigError> {
        let mut columns = Vec::new();
        for r in reserved {
            let column = r.column.to_lowercase();
            let Some(slot) = schema
                .field_names()
                .iter()
                .position(|name| name.to_lowercase() == column)
            else {
                continue;
            };
            match schema.field_type(slot) {
                Some(TypeNode::Scalar(ScalarKind::Text)) => {}
                other => {
                    return Err(ConfigError::ReservedColumnNotText {
                        column: schema.field_name(slot).unwrap_or(&r.column).to_string(),
                        found: other.map(ToString::to_string).unwrap_or_default(),
                    });
                }
            }
            columns.push(ActiveColumn {
                kind: r.kind,
                slot,
                source: r.source.clone(),
            });
        }
        Ok(Self { columns })
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Активные колонки и их позиции, в порядке применения.
    pub fn active(&self) -> impl Iterator<Item = (ReservedKind, usize)> + '_ {
        self.columns.iter().map(|c| (c.kind, c.slot))
    }

    /// `row` должен быть декодирован по той же схеме, что и `resolve`.
    pub fn apply(&self, root: &Map<String, JsonValue>, row: &mut Row) -> Result<(), DecodeError> {
        for column in &self.columns {
            let text = text_field(root, &column.source)?;
            let value = match column.kind {
                ReservedKind::Id | ReservedKind::Host => text.to_owned(),
                ReservedKind::Timestamp => timestamp::reformat(text)?,
            };
            if !row.set(column.slot, Value::Text(value)) {
                return Err(DecodeError::UnindexedRecord { path: String::new() });
            }
        }
        Ok(())
    }
}

fn text_field<'a>(root: &'a Map<String, JsonValue>, key: &str) -> Result<&'a str, DecodeError> {
    let node = root
        .get(key)
        .ok_or_else(|| DecodeError::missing_field("", key))?;
    node.as_str()
        .ok_or_else(|| DecodeError::type_mismatch(key, "text", json_kind(node)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use row_api::type_string::parse_columns;
    use serde_json::json;

    fn root(value: JsonValue) -> Map<String, JsonValue> {
        match value {
            JsonValue::Object(map) => map,
            _ => panic!("test document must be an object"),
        }
    }

    fn defaults() -> Vec<ReservedColumn> {
        crate::config::JsonEventConfig::default().reserved
    }

    #[test]
    fn resolves_only_columns_in_schema() {
        let schema = parse_columns("count,TS", "int,string").unwrap();
        let overlay = MetadataOverlay::resolve(&schema, &defaults()).unwrap();
        assert_eq!(overlay.active().collect::<Vec<_>>(), vec![(ReservedKind::Timestamp, 1)]);

        let schema = parse_columns("count", "int").unwrap();
        assert!(MetadataOverlay::resolve(&schema, &defaults()).unwrap().is_empty());
    }

    #[test]
    fn reserved_column_must_be_declared_text() {
        let schema = parse_columns("UUID,count", "bigint,int").unwrap();
        let err = MetadataOverlay::resolve(&schema, &defaults()).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::ReservedColumnNotText { ref column, ref found }
                if column == "UUID" && found == "bigint"
        ));

        let schema = parse_columns("ts", "array<string>").unwrap();
        assert!(matches!(
            MetadataOverlay::resolve(&schema, &defaults()),
            Err(ConfigError::ReservedColumnNotText { .. })
        ));
    }

    #[test]
    fn row_shorter_than_schema_is_rejected() {
        let schema = parse_columns("count,host", "int,string").unwrap();
        let overlay = MetadataOverlay::resolve(&schema, &defaults()).unwrap();
        let err = overlay
            .apply(&root(json!({"host": "h1"})), &mut Row::nulls(1))
            .unwrap_err();
        assert_eq!(err, DecodeError::UnindexedRecord { path: String::new() });
    }

    #[test]
    fn overwrites_reserved_slots() {
        let schema = parse_columns("uuid,host,ts", "string,string,string").unwrap();
        let overlay = MetadataOverlay::resolve(&schema, &defaults()).unwrap();
        let mut row = Row(vec![Value::from("payload"), Value::Null, Value::Null]);

        overlay
            .apply(
                &root(json!({
                    "uuid": "abc",
                    "host": "h1",
                    "timestamp": "2021-03-04T05:06:07.890+01:00"
                })),
                &mut row,
            )
            .unwrap();

        assert_eq!(
            row,
            Row(vec![Value::from("abc"), Value::from("h1"), Value::from("2021-03-04 04:06:07")])
        );
    }

    #[test]
    fn source_keys_are_case_sensitive() {
        let schema = parse_columns("host", "string").unwrap();
        let overlay = MetadataOverlay::resolve(&schema, &defaults()).unwrap();
        let err = overlay
            .apply(&root(json!({"HOST": "h1"})), &mut Row::nulls(1))
            .unwrap_err();
        assert_eq!(err, DecodeError::missing_field("", "host"));
    }

    #[test]
    fn non_text_source_is_a_mismatch() {
        let schema = parse_columns("uuid", "string").unwrap();
        let overlay = MetadataOverlay::resolve(&schema, &defaults()).unwrap();
        let err = overlay
            .apply(&root(json!({"uuid": 42})), &mut Row::nulls(1))
            .unwrap_err();
        assert_eq!(err, DecodeError::type_mismatch("uuid", "text", "number"));
    }

    #[test]
    fn bad_timestamp_is_reported_raw() {
        let schema = parse_columns("ts", "string").unwrap();
        let overlay = MetadataOverlay::resolve(&schema, &defaults()).unwrap();
        let err = overlay
            .apply(&root(json!({"timestamp": "01/02/2021"})), &mut Row::nulls(1))
            .unwrap_err();
        assert_eq!(err, DecodeError::InvalidTimestamp { raw: "01/02/2021".into() });
    }
}
