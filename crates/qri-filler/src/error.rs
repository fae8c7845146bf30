use serde_json::Value;
use std::fmt;

/// A single field that failed to coerce from its source JSON representation into
/// the type the target expected.
#[derive(Debug, Clone, thiserror::Error, PartialEq)]
#[error("want {want}, got {got}: {value}")]
pub struct FieldError {
    pub want: String,
    pub got: String,
    pub value: Value,
}

/// The accumulated set of [`FieldError`]s found during a single [`crate::fill`] pass.
/// `Display` joins every message with a newline, so callers that only want the
/// combined text (e.g. to print to a user) can just call `.to_string()`.
#[derive(Debug, Clone, PartialEq)]
pub struct FillError(Vec<FieldError>);

impl FillError {
    pub(crate) fn new(errors: Vec<FieldError>) -> Self {
        Self(errors)
    }

    pub fn errors(&self) -> &[FieldError] {
        &self.0
    }

    pub fn not_found(type_name: &str, key: &str) -> FieldError {
        FieldError {
            want: format!("field on struct {type_name}"),
            got: "not found".into(),
            value: Value::String(key.to_string()),
        }
    }
}

impl fmt::Display for FillError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, err) in self.0.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{err}")?;
        }
        Ok(())
    }
}

impl std::error::Error for FillError {}
