//! Aggregated Dataset View (§4.E): expand a `dataset`-file into its children
//! and wire up lazy schema inference from body to structure.

use crate::body::{self, BodyShape};
use crate::catalog::ComponentName;
use crate::component::{BodyData, Component, ComponentBody};
use crate::error::ComponentError;
use crate::format::Format;
use crate::scanner::ScannedContainer;
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Fields a `dataset`-file aggregate may promote into standalone components
/// (§4.E; note `viz` is deliberately excluded — the source spec only
/// promotes these six).
const PROMOTABLE: [ComponentName; 6] = [
    ComponentName::Commit,
    ComponentName::Meta,
    ComponentName::Structure,
    ComponentName::Readme,
    ComponentName::Transform,
    ComponentName::Body,
];

/// A capability (not a closure over mutable state, §9) that computes the
/// schema for a structure component whose body hasn't been inferred yet.
pub trait SchemaInferrer {
    fn infer(&self) -> Result<Value, ComponentError>;
}

/// Infers a structure's schema by loading and parsing its sibling body file.
pub struct BodyFileSchemaInferrer {
    pub body_path: PathBuf,
    pub format: Format,
}

impl SchemaInferrer for BodyFileSchemaInferrer {
    fn infer(&self) -> Result<Value, ComponentError> {
        let bytes = std::fs::read(&self.body_path)?;
        match self.format {
            Format::Csv => {
                let (schema, _) = body::infer_csv_schema(&bytes).map_err(|err| ComponentError::Parse { path: self.body_path.display().to_string(), reason: err.to_string() })?;
                Ok(schema)
            }
            Format::Json => {
                let parsed: Value = serde_json::from_slice(&bytes).map_err(|err| ComponentError::Parse { path: self.body_path.display().to_string(), reason: err.to_string() })?;
                Ok(body::infer_json_schema(&parsed))
            }
            other => Err(ComponentError::FormatUnsupported(other.to_string())),
        }
    }
}

/// The promoted, fully expanded view of a scanned directory (§4.E).
pub struct AggregatedView {
    pub components: BTreeMap<ComponentName, Component>,
    /// Set when a body exists but structure has no schema yet; the status
    /// engine or caller may invoke this to populate one lazily.
    pub pending_schema_inference: Option<Box<dyn SchemaInferrer>>,
}

fn case_insensitive_get<'a>(map: &'a serde_json::Map<String, Value>, key: &str) -> Option<&'a Value> {
    map.get(key)
        .or_else(|| map.iter().find(|(k, _)| k.eq_ignore_ascii_case(key)).map(|(_, v)| v))
}

/// Expand `scanned`'s `dataset` component (if present and loaded) into its
/// children, synthesizing any promotable component absent from the scanner
/// output (§4.E).
pub fn expand(mut scanned: ScannedContainer) -> Result<AggregatedView, ComponentError> {
    let dataset_entry = scanned.components.get(&ComponentName::Dataset).cloned();

    if let Some(dataset) = dataset_entry {
        let Some(tree) = dataset_tree(&dataset) else {
            return Ok(AggregatedView {
                components: scanned.components,
                pending_schema_inference: None,
            });
        };

        if let Value::Object(map) = &tree {
            for name in PROMOTABLE {
                let Some(sub_value) = case_insensitive_get(map, name.as_str()) else {
                    continue;
                };
                if sub_value.is_null() {
                    continue;
                }

                if let Some(existing) = scanned.components.get_mut(&name) {
                    let existing_basename = existing
                        .source_file
                        .as_ref()
                        .and_then(|p| p.file_name())
                        .map(|n| n.to_string_lossy().to_string())
                        .unwrap_or_default();
                    let dataset_basename = dataset
                        .source_file
                        .as_ref()
                        .and_then(|p| p.file_name())
                        .map(|n| n.to_string_lossy().to_string())
                        .unwrap_or_default();
                    existing.mark_conflict(&[existing_basename, dataset_basename]);
                    continue;
                }

                let synthesized = synthesize(name, &dataset, sub_value.clone());
                scanned.components.insert(name, synthesized);
            }
        }
    }

    let pending_schema_inference = pending_inference(&scanned.components);

    Ok(AggregatedView {
        components: scanned.components,
        pending_schema_inference,
    })
}

fn dataset_tree(dataset: &Component) -> Option<Value> {
    match &dataset.body {
        ComponentBody::Value(v) => Some(v.clone()),
        _ => None,
    }
}

fn synthesize(name: ComponentName, dataset: &Component, value: Value) -> Component {
    let mut component = Component::new(name, dataset.source_file.clone(), dataset.format);
    component.is_loaded = true;
    component.body = match (name, &value) {
        (ComponentName::Readme | ComponentName::Transform, Value::String(s)) => {
            ComponentBody::Script(s.clone())
        }
        (ComponentName::Body, Value::Array(items)) => ComponentBody::Body(BodyData {
            shape: BodyShape::Array(items.clone()),
            inferred_schema: None,
        }),
        (ComponentName::Body, Value::Object(map)) => ComponentBody::Body(BodyData {
            shape: BodyShape::Object(map.clone()),
            inferred_schema: None,
        }),
        _ => ComponentBody::Value(value),
    };
    component
}

fn pending_inference(components: &BTreeMap<ComponentName, Component>) -> Option<Box<dyn SchemaInferrer>> {
    let body = components.get(&ComponentName::Body)?;
    let structure = components.get(&ComponentName::Structure)?;

    let has_schema = matches!(
        &structure.body,
        ComponentBody::Value(Value::Object(map)) if map.get("schema").map(|s| !s.is_null()).unwrap_or(false)
    );
    if has_schema {
        return None;
    }

    let body_path = body.source_file.clone()?;
    Some(Box::new(BodyFileSchemaInferrer {
        body_path,
        format: body.format,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanner::scan_dir;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn promotes_dataset_fields_into_missing_components() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join("dataset.json"),
            r#"{"meta": {"title": "t"}, "commit": {"title": "c"}}"#,
        )
        .unwrap();

        let mut scanned = scan_dir(dir.path()).unwrap();
        scanned
            .components
            .get_mut(&ComponentName::Dataset)
            .unwrap()
            .load_and_fill()
            .unwrap();

        let view = expand(scanned).unwrap();
        assert!(view.components.contains_key(&ComponentName::Meta));
        assert!(view.components.contains_key(&ComponentName::Commit));
    }

    #[test]
    fn conflicting_dedicated_file_marks_existing_component() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("dataset.json"), r#"{"meta": {"title": "t"}}"#).unwrap();
        fs::write(dir.path().join("meta.json"), r#"{"title": "other"}"#).unwrap();

        let mut scanned = scan_dir(dir.path()).unwrap();
        scanned
            .components
            .get_mut(&ComponentName::Dataset)
            .unwrap()
            .load_and_fill()
            .unwrap();

        let view = expand(scanned).unwrap();
        let meta = &view.components[&ComponentName::Meta];
        assert_eq!(
            meta.problem_message.as_deref(),
            Some("dataset.json meta.json")
        );
    }
}
