//! Fills a typed [`serde_json::Value`]-shaped target from a nested key/value tree.
//!
//! The filler walks every leaf of the input tree and assigns it into the target at
//! the matching dot-path, using case-insensitive name matching at each path segment
//! and a small set of coercion rules (§4.A). Unlike a plain `serde_json::from_value`,
//! every field error encountered across the whole tree is accumulated and returned
//! together, rather than aborting on the first mismatch.

mod coerce;
mod error;
mod path;

pub use coerce::{
    coerce, coerce_bool, coerce_bytes, coerce_float, coerce_int, coerce_string, coerce_timestamp,
    Coerced,
};
pub use error::{FieldError, FillError};
pub use path::{get_path, set_path, PathError};

use serde_json::Value;

/// Implemented by fill targets that want to accept keys which don't map to any
/// known field, instead of having them reported as errors.
pub trait SetArbitrary {
    /// Store `value` under `key`. Returning `Err` re-surfaces as a normal field error.
    fn set_arbitrary(&mut self, key: &str, value: Value) -> Result<(), String>;
}

/// Implemented by fill targets that want to silently refuse specific fields.
pub trait IgnoreFillField {
    /// Return `true` if `field` (already lower-cased) should be skipped entirely.
    fn ignore_fill_field(&self, field: &str) -> bool {
        let _ = field;
        false
    }
}

/// A fill target: anything that can be populated, field by field, from a tree of
/// decoded JSON values. Generated by `#[derive(Fill)]` in real usage; implemented
/// by hand here for the handful of dataset component records this crate's sibling
/// crates need to fill.
pub trait Fill: IgnoreFillField {
    /// Assign `value` at the case-insensitive dot-path `path` (lower-cased, leaf to
    /// root order preserved). `path` is never empty when called from [`fill`].
    fn fill_field(&mut self, path: &[&str], value: &Value) -> Result<(), FieldError>;
}

/// Fill `target` from every leaf of `tree`, accumulating every error found along
/// the way instead of stopping at the first one (§8: fill error accumulation).
pub fn fill<T: Fill>(tree: &Value, target: &mut T) -> Result<(), FillError> {
    let mut errors = Vec::new();
    walk(&[], tree, target, &mut errors);
    if errors.is_empty() {
        Ok(())
    } else {
        Err(FillError::new(errors))
    }
}

fn walk<T: Fill>(prefix: &[String], node: &Value, target: &mut T, errors: &mut Vec<FieldError>) {
    match node {
        Value::Object(map) => {
            for (key, value) in map {
                let lower = key.to_lowercase();
                if target.ignore_fill_field(&lower) {
                    continue;
                }
                let mut path = prefix.to_vec();
                path.push(lower);

                match value {
                    Value::Object(_) => walk(&path, value, target, errors),
                    _ => {
                        let refs: Vec<&str> = path.iter().map(String::as_str).collect();
                        if let Err(err) = target.fill_field(&refs, value) {
                            tracing::debug!(path = %refs.join("."), ?err, "fill field error");
                            errors.push(err);
                        }
                    }
                }
            }
        }
        other => {
            let refs: Vec<&str> = prefix.iter().map(String::as_str).collect();
            if let Err(err) = target.fill_field(&refs, other) {
                errors.push(err);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::BTreeMap;

    #[derive(Default, Debug, PartialEq)]
    struct Demo {
        title: String,
        count: i64,
        extra: BTreeMap<String, Value>,
    }

    impl IgnoreFillField for Demo {}

    impl Fill for Demo {
        fn fill_field(&mut self, path: &[&str], value: &Value) -> Result<(), FieldError> {
            match path {
                ["title"] => {
                    self.title = coerce::coerce_string(value).map_err(|got| FieldError {
                        want: "string".into(),
                        got,
                        value: value.clone(),
                    })?;
                    Ok(())
                }
                ["count"] => {
                    self.count = coerce::coerce_int(value).map_err(|got| FieldError {
                        want: "int".into(),
                        got,
                        value: value.clone(),
                    })?;
                    Ok(())
                }
                [first, ..] => {
                    self.extra
                        .insert(first.to_string(), value.clone());
                    Ok(())
                }
                [] => Ok(()),
            }
        }
    }

    #[test]
    fn fills_known_fields_case_insensitively() {
        let mut demo = Demo::default();
        fill(&json!({"Title": "hello", "COUNT": 3}), &mut demo).unwrap();
        assert_eq!(demo.title, "hello");
        assert_eq!(demo.count, 3);
    }

    #[test]
    fn unknown_keys_fall_through_to_extra() {
        let mut demo = Demo::default();
        fill(&json!({"title": "x", "count": 1, "nickname": "y"}), &mut demo).unwrap();
        assert_eq!(demo.extra.get("nickname"), Some(&json!("y")));
    }

    #[test]
    fn accumulates_every_field_error() {
        let mut demo = Demo::default();
        let err = fill(&json!({"title": 5, "count": "not a number"}), &mut demo).unwrap_err();
        assert_eq!(err.errors().len(), 2);
        assert_eq!(err.to_string().lines().count(), 2);
    }
}
