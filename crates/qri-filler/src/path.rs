//! Dot-delimited addressing into a [`serde_json::Value`] tree, with numeric
//! segments indexing sequences (§4.A).

use serde_json::{Map, Value};

#[derive(Debug, Clone, thiserror::Error, PartialEq)]
pub enum PathError {
    #[error("path segment {0:?} not found")]
    NotFound(String),
    #[error("index {0} out of bounds for array of length {1}")]
    IndexOutOfBounds(usize, usize),
    #[error("cannot index into a {0} with segment {1:?}")]
    NotIndexable(&'static str, String),
}

struct Segment<'a> {
    raw: &'a str,
    index: Option<usize>,
}

fn segments(path: &str) -> Vec<Segment<'_>> {
    path.split('.')
        .map(|raw| Segment {
            raw,
            index: raw.parse::<usize>().ok(),
        })
        .collect()
}

fn describe_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Read the value addressed by `path` (e.g. `"structure.schema.0"`) out of `target`.
/// Case-insensitive at each object-key segment. Missing keys are reported as
/// [`PathError::NotFound`]; they are never auto-materialized (that only happens on
/// [`set_path`]).
pub fn get_path<'a>(path: &str, target: &'a Value) -> Result<&'a Value, PathError> {
    let mut current = target;
    for seg in segments(path) {
        current = match current {
            Value::Object(map) => find_case_insensitive(map, seg.raw)
                .ok_or_else(|| PathError::NotFound(seg.raw.to_string()))?,
            Value::Array(items) => {
                let idx = seg
                    .index
                    .ok_or_else(|| PathError::NotIndexable("array", seg.raw.to_string()))?;
                items
                    .get(idx)
                    .ok_or(PathError::IndexOutOfBounds(idx, items.len()))?
            }
            other => return Err(PathError::NotIndexable(describe_kind(other), seg.raw.to_string())),
        };
    }
    Ok(current)
}

fn find_case_insensitive<'a>(map: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    map.get(key).or_else(|| {
        map.iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v)
    })
}

fn find_case_insensitive_key(map: &Map<String, Value>, key: &str) -> Option<String> {
    if map.contains_key(key) {
        return Some(key.to_string());
    }
    map.keys().find(|k| k.eq_ignore_ascii_case(key)).cloned()
}

/// Write `value` at the dot-path `path` within `target`, auto-materializing any
/// missing intermediate object keys as empty objects (never arrays — numeric
/// segments must already exist as array indices).
pub fn set_path(path: &str, value: Value, target: &mut Value) -> Result<(), PathError> {
    let segs = segments(path);
    set_recursive(&segs, value, target)
}

fn set_recursive(segs: &[Segment<'_>], value: Value, target: &mut Value) -> Result<(), PathError> {
    let Some((seg, rest)) = segs.split_first() else {
        *target = value;
        return Ok(());
    };

    if !target.is_object() && !target.is_array() {
        *target = Value::Object(Map::new());
    }

    match target {
        Value::Object(map) => {
            let key = find_case_insensitive_key(map, seg.raw).unwrap_or_else(|| seg.raw.to_string());
            let slot = map.entry(key).or_insert(Value::Null);
            if rest.is_empty() {
                *slot = value;
            } else {
                set_recursive(rest, value, slot)?;
            }
            Ok(())
        }
        Value::Array(items) => {
            let idx = seg
                .index
                .ok_or_else(|| PathError::NotIndexable("array", seg.raw.to_string()))?;
            let len = items.len();
            let slot = items
                .get_mut(idx)
                .ok_or(PathError::IndexOutOfBounds(idx, len))?;
            if rest.is_empty() {
                *slot = value;
                Ok(())
            } else {
                set_recursive(rest, value, slot)
            }
        }
        _ => unreachable!("materialized to object above"),
    }
}
