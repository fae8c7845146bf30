//! Source → destination coercion rules (§4.A).

use chrono::{DateTime, Utc};
use serde_json::Value;

/// The outcome of a successful coercion — kept generic so callers can match on the
/// shape they actually need without this crate guessing their destination type.
#[derive(Debug, Clone, PartialEq)]
pub enum Coerced {
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Timestamp(DateTime<Utc>),
    Bytes(Vec<u8>),
    Null,
}

/// Best-effort description of `value`'s JSON type, used in [`crate::FieldError::got`].
fn describe(value: &Value) -> String {
    match value {
        Value::Null => "null".into(),
        Value::Bool(_) => "bool".into(),
        Value::Number(_) => "number".into(),
        Value::String(_) => "string".into(),
        Value::Array(_) => "array".into(),
        Value::Object(_) => "object".into(),
    }
}

/// Coerce `value` into whichever [`Coerced`] variant fits its JSON shape most
/// directly — used by fill targets that don't know their destination type ahead
/// of time. Returns `Err(description)` for types requiring a call into one of the
/// narrower `coerce_*` helpers below.
pub fn coerce(value: &Value) -> Result<Coerced, String> {
    match value {
        Value::Null => Ok(Coerced::Null),
        Value::Bool(b) => Ok(Coerced::Bool(*b)),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(Coerced::Int(i))
            } else if let Some(f) = n.as_f64() {
                Ok(Coerced::Float(f))
            } else {
                Err(describe(value))
            }
        }
        Value::String(s) => Ok(Coerced::String(s.clone())),
        _ => Err(describe(value)),
    }
}

/// string↔bool recognizes `"true"/"false"` case-insensitive; a JSON bool passes through.
pub fn coerce_bool(value: &Value) -> Result<bool, String> {
    match value {
        Value::Bool(b) => Ok(*b),
        Value::String(s) => match s.to_lowercase().as_str() {
            "true" => Ok(true),
            "false" => Ok(false),
            _ => Err(describe(value)),
        },
        _ => Err(describe(value)),
    }
}

/// string→int uses a base-10 parse; a JSON integer passes through; floats are
/// rejected (narrowing is not permitted).
pub fn coerce_int(value: &Value) -> Result<i64, String> {
    match value {
        Value::Number(n) => n.as_i64().ok_or_else(|| describe(value)),
        Value::String(s) => s.parse::<i64>().map_err(|_| describe(value)),
        _ => Err(describe(value)),
    }
}

/// numeric→wider-numeric is widening only: any JSON number becomes an `f64`.
pub fn coerce_float(value: &Value) -> Result<f64, String> {
    match value {
        Value::Number(n) => n.as_f64().ok_or_else(|| describe(value)),
        Value::String(s) => s.parse::<f64>().map_err(|_| describe(value)),
        _ => Err(describe(value)),
    }
}

pub fn coerce_string(value: &Value) -> Result<String, String> {
    match value {
        Value::String(s) => Ok(s.clone()),
        _ => Err(describe(value)),
    }
}

/// string→timestamp uses RFC-3339.
pub fn coerce_timestamp(value: &Value) -> Result<DateTime<Utc>, String> {
    match value {
        Value::String(s) => DateTime::parse_from_rfc3339(s)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|_| describe(value)),
        _ => Err(describe(value)),
    }
}

/// Byte sequence accepts either a string (treated as opaque UTF-8 bytes) or an
/// explicit array of small integers.
pub fn coerce_bytes(value: &Value) -> Result<Vec<u8>, String> {
    match value {
        Value::String(s) => Ok(s.clone().into_bytes()),
        Value::Array(items) => items
            .iter()
            .map(|item| {
                item.as_u64()
                    .filter(|b| *b <= u8::MAX as u64)
                    .map(|b| b as u8)
                    .ok_or_else(|| describe(value))
            })
            .collect(),
        _ => Err(describe(value)),
    }
}
