//! Typed component values filled from a parsed JSON/YAML tree via
//! `qri_filler::fill` (§4.A, §4.D). Fields not recognized by name fall
//! through to each value's `extra` map via [`qri_filler::SetArbitrary`],
//! mirroring how the reference codebase's generated `Fill` impls handle
//! forwards-compatible metadata fields.

use qri_filler::{coerce_string, set_path, FieldError, Fill, IgnoreFillField, SetArbitrary};
use serde::{Deserialize, Serialize};
use serde_json::Value;

fn arbitrary_error(key: &str, reason: String) -> FieldError {
    FieldError {
        want: "any".into(),
        got: reason,
        value: Value::String(key.to_string()),
    }
}

/// Free-form human-facing metadata (§3's `meta` field). Real-world `meta`
/// documents carry many optional, loosely-typed fields; only the handful
/// with special handling are named here, everything else lands in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetaValue {
    pub title: Option<String>,
    pub description: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

impl IgnoreFillField for MetaValue {}

impl SetArbitrary for MetaValue {
    fn set_arbitrary(&mut self, key: &str, value: Value) -> Result<(), String> {
        self.extra.insert(key.to_string(), value);
        Ok(())
    }
}

impl Fill for MetaValue {
    fn fill_field(&mut self, path: &[&str], value: &Value) -> Result<(), FieldError> {
        match path {
            ["title"] => {
                self.title = Some(coerce_string(value).map_err(|got| FieldError {
                    want: "string".into(),
                    got,
                    value: value.clone(),
                })?);
                Ok(())
            }
            ["description"] => {
                self.description = Some(coerce_string(value).map_err(|got| FieldError {
                    want: "string".into(),
                    got,
                    value: value.clone(),
                })?);
                Ok(())
            }
            [first, ..] => self
                .set_arbitrary(first, value.clone())
                .map_err(|reason| arbitrary_error(first, reason)),
            [] => Ok(()),
        }
    }
}

/// A single version's commit message and authorship (§3's `commit` field).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CommitValue {
    pub title: Option<String>,
    pub message: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

impl IgnoreFillField for CommitValue {}

impl SetArbitrary for CommitValue {
    fn set_arbitrary(&mut self, key: &str, value: Value) -> Result<(), String> {
        self.extra.insert(key.to_string(), value);
        Ok(())
    }
}

impl Fill for CommitValue {
    fn fill_field(&mut self, path: &[&str], value: &Value) -> Result<(), FieldError> {
        match path {
            ["title"] => {
                self.title = Some(coerce_string(value).map_err(|got| FieldError {
                    want: "string".into(),
                    got,
                    value: value.clone(),
                })?);
                Ok(())
            }
            ["message"] => {
                self.message = Some(coerce_string(value).map_err(|got| FieldError {
                    want: "string".into(),
                    got,
                    value: value.clone(),
                })?);
                Ok(())
            }
            [first, ..] => self
                .set_arbitrary(first, value.clone())
                .map_err(|reason| arbitrary_error(first, reason)),
            [] => Ok(()),
        }
    }
}

/// The `structure` component (§3): `format`/`format_config`/`schema`/`depth`.
/// `schema` and `format_config` are themselves arbitrary nested JSON, so deep
/// leaf assignments under those prefixes are re-materialized with
/// [`set_path`] rather than matched field-by-field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StructureValue {
    pub format: Option<String>,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub format_config: Value,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub schema: Value,
    /// Derived from the body at load time; stripped by `drop_derived` (§4.D).
    pub depth: Option<i64>,
}

impl IgnoreFillField for StructureValue {}

impl Fill for StructureValue {
    fn fill_field(&mut self, path: &[&str], value: &Value) -> Result<(), FieldError> {
        match path {
            ["format"] => {
                self.format = Some(coerce_string(value).map_err(|got| FieldError {
                    want: "string".into(),
                    got,
                    value: value.clone(),
                })?);
                Ok(())
            }
            ["depth"] => {
                self.depth = Some(qri_filler::coerce_int(value).map_err(|got| FieldError {
                    want: "int".into(),
                    got,
                    value: value.clone(),
                })?);
                Ok(())
            }
            ["schema", rest @ ..] => {
                let sub = rest.join(".");
                set_path(&sub, value.clone(), &mut self.schema).map_err(|err| FieldError {
                    want: "addressable schema path".into(),
                    got: err.to_string(),
                    value: value.clone(),
                })
            }
            ["format_config" | "formatconfig", rest @ ..] => {
                let sub = rest.join(".");
                set_path(&sub, value.clone(), &mut self.format_config).map_err(|err| FieldError {
                    want: "addressable format_config path".into(),
                    got: err.to_string(),
                    value: value.clone(),
                })
            }
            [] => Ok(()),
            [other, ..] => Err(FieldError {
                want: "known structure field".into(),
                got: "not found".into(),
                value: Value::String(other.to_string()),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn fills_known_meta_fields_and_captures_extras() {
        let mut meta = MetaValue::default();
        qri_filler::fill(&json!({"Title": "t", "keywords": ["a", "b"]}), &mut meta).unwrap();
        assert_eq!(meta.title.as_deref(), Some("t"));
        assert_eq!(meta.extra.get("keywords"), Some(&json!(["a", "b"])));
    }

    #[test]
    fn structure_schema_reassembles_nested_object() {
        let mut structure = StructureValue::default();
        qri_filler::fill(
            &json!({"format": "csv", "schema": {"type": "array", "items": {"type": "object"}}}),
            &mut structure,
        )
        .unwrap();
        assert_eq!(structure.format.as_deref(), Some("csv"));
        assert_eq!(
            structure.schema,
            json!({"type": "array", "items": {"type": "object"}})
        );
    }
}
