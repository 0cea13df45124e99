//! JSON scalar → typed value.
//!
//! Integer narrowing wraps instead of failing: a 32-bit read of a 64-bit
//! number keeps the low bits, and `tinyint`/`smallint` keep the low bits
//! of that. Existing tables depend on this, so it is kept; every wrap is
//! reported through `tracing::warn!` so it can be found in logs.

use serde_json::{Number, Value as JsonValue};

use row_api::{DecodeError, ScalarKind, Value};

use crate::path::FieldPath;

/// Kind name of a JSON node, as reported in `TypeMismatch::found`.
pub(crate) fn json_kind(node: &JsonValue) -> &'static str {
    match node {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "boolean",
        JsonValue::Number(_) => "number",
        JsonValue::String(_) => "string",
        JsonValue::Array(_) => "array",
        JsonValue::Object(_) => "object",
    }
}

/// Convert a leaf node to the representation of `kind`.
///
/// JSON `null` is handled by the caller and never reaches here in normal
/// decoding; passed directly it is a mismatch like any other wrong kind.
pub fn coerce(node: &JsonValue, kind: ScalarKind, path: &FieldPath<'_>) -> Result<Value, DecodeError> {
    if matches!(node, JsonValue::Array(_) | JsonValue::Object(_)) {
        return Err(DecodeError::type_mismatch(path, kind.name(), "container"));
    }

    match kind {
        ScalarKind::Void | ScalarKind::Unknown => Err(DecodeError::UnsupportedType {
            path: path.to_string(),
            kind,
        }),
        ScalarKind::Bool => node
            .as_bool()
            .map(Value::Bool)
            .ok_or_else(|| mismatch(node, kind, path)),
        ScalarKind::Int8 => integer(node, kind, path, |n| Value::Int8(read_int(n) as i8)),
        ScalarKind::Int16 => integer(node, kind, path, |n| Value::Int16(read_int(n) as i16)),
        ScalarKind::Int32 => integer(node, kind, path, |n| Value::Int32(read_int(n))),
        ScalarKind::Int64 => integer(node, kind, path, |n| Value::Int64(read_long(n))),
        ScalarKind::Float32 => double(node, kind, path).map(|v| Value::Float32(v as f32)),
        ScalarKind::Float64 => double(node, kind, path).map(Value::Float64),
        ScalarKind::Text => node
            .as_str()
            .map(|s| Value::Text(s.to_owned()))
            .ok_or_else(|| mismatch(node, kind, path)),
    }
}

fn mismatch(node: &JsonValue, kind: ScalarKind, path: &FieldPath<'_>) -> DecodeError {
    DecodeError::type_mismatch(path, kind.name(), json_kind(node))
}

fn number<'n>(
    node: &'n JsonValue,
    kind: ScalarKind,
    path: &FieldPath<'_>,
) -> Result<&'n Number, DecodeError> {
    match node {
        JsonValue::Number(n) => Ok(n),
        other => Err(mismatch(other, kind, path)),
    }
}

fn integer(
    node: &JsonValue,
    kind: ScalarKind,
    path: &FieldPath<'_>,
    narrow: impl FnOnce(&Number) -> Value,
) -> Result<Value, DecodeError> {
    let n = number(node, kind, path)?;
    let value = narrow(n);
    if value.as_i64().is_some_and(|decoded| wrapped(n, decoded)) {
        tracing::warn!(
            path = %path,
            kind = %kind,
            number = %n,
            decoded = ?value,
            "integer does not fit declared width, wrapped"
        );
    }
    Ok(value)
}

fn double(node: &JsonValue, kind: ScalarKind, path: &FieldPath<'_>) -> Result<f64, DecodeError> {
    let n = number(node, kind, path)?;
    Ok(n.as_f64().unwrap_or_default())
}

/// 64-bit read: integers as-is (`u64` above `i64::MAX` wraps), floats
/// truncated toward zero and saturated.
fn read_long(n: &Number) -> i64 {
    if let Some(v) = n.as_i64() {
        v
    } else if let Some(v) = n.as_u64() {
        v as i64
    } else {
        n.as_f64().map_or(0, |f| f as i64)
    }
}

/// 32-bit read: integers keep their low 32 bits, floats are truncated
/// and saturated to the `i32` range.
fn read_int(n: &Number) -> i32 {
    if n.is_f64() {
        n.as_f64().map_or(0, |f| f as i32)
    } else {
        read_long(n) as i32
    }
}

/// Whether the decoded integer lost range information (fraction
/// truncation alone is not counted).
fn wrapped(n: &Number, decoded: i64) -> bool {
    if let Some(v) = n.as_i64() {
        v != decoded
    } else if n.as_u64().is_some() {
        true
    } else {
        n.as_f64().is_some_and(|f| f.trunc() != decoded as f64)
    }
}
