//! Body content and schema inference (§4.D, supplemented per §10: CSV and
//! JSON top-level shapes).

use serde_json::{Map, Value};

/// The parsed shape of a loaded body: either a sequence of records or a
/// single keyed map, mirroring the top-level JSON type (§4.D).
#[derive(Debug, Clone, PartialEq)]
pub enum BodyShape {
    Array(Vec<Value>),
    Object(Map<String, Value>),
    /// A format this core doesn't structurally decompose (`cbor`, `xlsx` —
    /// schema inference is scoped to CSV/JSON only, §10). Comparison still
    /// works; per-entry access does not.
    Opaque(Vec<u8>),
}

impl BodyShape {
    pub fn to_value(&self) -> Value {
        match self {
            BodyShape::Array(items) => Value::Array(items.clone()),
            BodyShape::Object(map) => Value::Object(map.clone()),
            BodyShape::Opaque(bytes) => Value::String(hex(bytes)),
        }
    }

    pub fn entry_count(&self) -> u64 {
        match self {
            BodyShape::Array(items) => items.len() as u64,
            BodyShape::Object(map) => map.len() as u64,
            BodyShape::Opaque(_) => 0,
        }
    }
}

fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

/// Minimal JSON-Schema-shaped inference result: enough for `structure.schema`
/// to be non-empty after inference without a full schema validator (§10).
pub fn infer_json_schema(value: &Value) -> Value {
    match value {
        Value::Array(items) => serde_json::json!({
            "type": "array",
            "items": items.first().map(infer_json_schema).unwrap_or(serde_json::json!({})),
        }),
        Value::Object(_) => serde_json::json!({ "type": "object" }),
        Value::String(_) => serde_json::json!({ "type": "string" }),
        Value::Number(n) if n.is_i64() || n.is_u64() => serde_json::json!({ "type": "integer" }),
        Value::Number(_) => serde_json::json!({ "type": "number" }),
        Value::Bool(_) => serde_json::json!({ "type": "boolean" }),
        Value::Null => serde_json::json!({ "type": "null" }),
    }
}

/// Infers a schema for a CSV body from its header row plus a sample of typed
/// column values drawn from the first row, falling back to `string` for any
/// column that can't be parsed narrower (§10).
pub fn infer_csv_schema(bytes: &[u8]) -> Result<(Value, BodyShape), csv::Error> {
    let mut reader = csv::ReaderBuilder::new().has_headers(true).from_reader(bytes);
    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        let row: Vec<Value> = record.iter().map(infer_csv_cell).collect();
        rows.push(Value::Array(row));
    }

    let properties: Map<String, Value> = headers
        .iter()
        .enumerate()
        .map(|(i, name)| {
            let kind = rows
                .first()
                .and_then(|row| row.as_array())
                .and_then(|row| row.get(i))
                .map(infer_json_schema)
                .unwrap_or_else(|| serde_json::json!({ "type": "string" }));
            (name.clone(), kind)
        })
        .collect();

    let schema = serde_json::json!({
        "type": "array",
        "items": { "type": "array", "properties": Value::Object(properties) },
    });

    Ok((schema, BodyShape::Array(rows)))
}

fn infer_csv_cell(raw: &str) -> Value {
    if let Ok(i) = raw.parse::<i64>() {
        Value::Number(i.into())
    } else if let Ok(f) = raw.parse::<f64>() {
        serde_json::Number::from_f64(f)
            .map(Value::Number)
            .unwrap_or_else(|| Value::String(raw.to_string()))
    } else {
        Value::String(raw.to_string())
    }
}
