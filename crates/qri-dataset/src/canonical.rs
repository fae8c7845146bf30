//! Canonical JSON encoding used for structural comparison (§4.D `compare`):
//! object keys are sorted so two values that differ only in key insertion
//! order still compare byte-equal.

use serde_json::Value;
use std::collections::BTreeMap;

fn sorted(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let sorted: BTreeMap<String, Value> =
                map.iter().map(|(k, v)| (k.clone(), sorted(v))).collect();
            serde_json::to_value(sorted).expect("BTreeMap<String, Value> always serializes")
        }
        Value::Array(items) => Value::Array(items.iter().map(sorted).collect()),
        other => other.clone(),
    }
}

/// Byte-for-byte canonical encoding of `value`, keys sorted recursively.
pub fn canonical_bytes(value: &Value) -> Vec<u8> {
    serde_json::to_vec(&sorted(value)).expect("canonicalized JSON always serializes")
}
