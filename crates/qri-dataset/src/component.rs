//! The per-component typed wrapper and its operations (§4.D).

use crate::body::{self, BodyShape};
use crate::canonical::canonical_bytes;
use crate::catalog::ComponentName;
use crate::error::ComponentError;
use crate::format::Format;
use crate::values::{CommitValue, MetaValue, StructureValue};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProblemKind {
    Conflict,
    FileOpen,
    Parse,
    UnknownFormat,
}

impl ProblemKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProblemKind::Conflict => "conflict",
            ProblemKind::FileOpen => "file-open",
            ProblemKind::Parse => "parse",
            ProblemKind::UnknownFormat => "unknown-format",
        }
    }
}

/// The body's parsed content plus the schema inferred from it, if the format
/// is one this core decomposes (§4.D, §10).
#[derive(Debug, Clone, PartialEq)]
pub struct BodyData {
    pub shape: BodyShape,
    pub inferred_schema: Option<Value>,
}

/// What a component is currently holding (§3, §4.D).
#[derive(Debug, Clone, PartialEq)]
pub enum ComponentBody {
    Empty,
    /// Structured (JSON/YAML) content: `meta`, `commit`, `structure`, `dataset`.
    Value(Value),
    /// Raw script/text content: `readme`, `transform`, `viz`.
    Script(String),
    Body(BodyData),
}

impl ComponentBody {
    pub fn is_empty(&self) -> bool {
        match self {
            ComponentBody::Empty => true,
            ComponentBody::Value(v) => v.is_null() || (v.is_object() && v.as_object().unwrap().is_empty()),
            ComponentBody::Script(s) => s.is_empty(),
            ComponentBody::Body(_) => false,
        }
    }
}

/// A single dataset component: one file on disk (or a synthesized entry from
/// the aggregated view, §4.E), its load state, and any recorded problem.
#[derive(Debug, Clone, PartialEq)]
pub struct Component {
    pub name: ComponentName,
    pub source_file: Option<PathBuf>,
    pub format: Format,
    pub mod_time: Option<SystemTime>,
    pub is_loaded: bool,
    pub problem_kind: Option<ProblemKind>,
    pub problem_message: Option<String>,
    pub body: ComponentBody,
}

impl Component {
    pub fn new(name: ComponentName, source_file: Option<PathBuf>, format: Format) -> Component {
        Component {
            name,
            source_file,
            format,
            mod_time: None,
            is_loaded: false,
            problem_kind: None,
            problem_message: None,
            body: ComponentBody::Empty,
        }
    }

    /// Record a conflict against this component: the incumbent's `source_file`
    /// is never replaced, only its problem fields (§4.C invariant iii).
    pub fn mark_conflict(&mut self, conflicting_basenames: &[String]) {
        let mut names = conflicting_basenames.to_vec();
        names.sort();
        names.dedup();
        self.problem_kind = Some(ProblemKind::Conflict);
        self.problem_message = Some(names.join(" "));
    }

    /// Idempotent load: returns immediately if already loaded or if a value
    /// was pre-assigned (e.g. by the aggregated view, §4.E). Otherwise reads
    /// `source_file` and parses it by `format` (§4.D).
    pub fn load_and_fill(&mut self) -> Result<(), ComponentError> {
        if self.is_loaded || !self.body.is_empty() {
            return Ok(());
        }

        let Some(path) = self.source_file.clone() else {
            return Err(ComponentError::NoSourceFile(self.name.as_str().to_string()));
        };

        tracing::debug!(component = self.name.as_str(), path = %path.display(), "loading component");

        if self.name == ComponentName::Body {
            return self.load_body(&path);
        }

        if self.format.is_script() {
            let text = fs::read_to_string(&path).map_err(|err| {
                self.problem_kind = Some(ProblemKind::FileOpen);
                ComponentError::Io(err)
            })?;
            self.body = ComponentBody::Script(text);
            self.is_loaded = true;
            return Ok(());
        }

        let tree = parse_tree(&path, self.format)?;
        let value = fill_value(self.name, &tree).map_err(|err| {
            self.problem_kind = Some(ProblemKind::Parse);
            err
        })?;
        self.body = ComponentBody::Value(value);
        self.is_loaded = true;
        Ok(())
    }

    fn load_body(&mut self, path: &Path) -> Result<(), ComponentError> {
        let bytes = fs::read(path).map_err(|err| {
            self.problem_kind = Some(ProblemKind::FileOpen);
            ComponentError::Io(err)
        })?;

        let (shape, inferred_schema) = match self.format {
            Format::Csv => {
                let (schema, shape) = body::infer_csv_schema(&bytes).map_err(|err| {
                    self.problem_kind = Some(ProblemKind::Parse);
                    ComponentError::Parse { path: path.display().to_string(), reason: err.to_string() }
                })?;
                (shape, Some(schema))
            }
            Format::Json => {
                let parsed: Value = serde_json::from_slice(&bytes).map_err(|err| {
                    self.problem_kind = Some(ProblemKind::Parse);
                    ComponentError::Parse { path: path.display().to_string(), reason: err.to_string() }
                })?;
                let schema = body::infer_json_schema(&parsed);
                let shape = match parsed {
                    Value::Array(items) => BodyShape::Array(items),
                    Value::Object(map) => BodyShape::Object(map),
                    other => BodyShape::Array(vec![other]),
                };
                (shape, Some(schema))
            }
            Format::Cbor | Format::Xlsx => (BodyShape::Opaque(bytes), None),
            other => {
                self.problem_kind = Some(ProblemKind::UnknownFormat);
                return Err(ComponentError::FormatUnsupported(other.to_string()));
            }
        };

        self.body = ComponentBody::Body(BodyData {
            shape,
            inferred_schema,
        });
        self.is_loaded = true;
        Ok(())
    }

    /// JSON-normalized structural view, used for comparison and diffing
    /// (§4.D). `structure`'s derived `depth` field is stripped first.
    pub fn structured_view(&self) -> Value {
        match &self.body {
            ComponentBody::Empty => Value::Null,
            ComponentBody::Value(v) => {
                if self.name == ComponentName::Structure {
                    let mut v = v.clone();
                    if let Value::Object(ref mut map) = v {
                        map.remove("depth");
                    }
                    v
                } else {
                    v.clone()
                }
            }
            ComponentBody::Script(s) => Value::String(s.clone()),
            ComponentBody::Body(b) => b.shape.to_value(),
        }
    }

    /// True iff the canonical JSON encodings of both loaded values are
    /// byte-equal (§4.D).
    pub fn compare(&self, other: &Component) -> bool {
        canonical_bytes(&self.structured_view()) == canonical_bytes(&other.structured_view())
    }

    /// Clears computed/cached fields while retaining author-provided content
    /// (§4.D). Only `structure.depth` is derived in this core.
    pub fn drop_derived(&mut self) {
        if self.name == ComponentName::Structure {
            if let ComponentBody::Value(Value::Object(map)) = &mut self.body {
                map.remove("depth");
            }
        }
    }

    fn canonical_filename(&self) -> String {
        match self.name {
            ComponentName::Body => format!("body.{}", self.format.extension()),
            ComponentName::Readme => format!("readme.{}", self.format.extension()),
            _ => format!("{}.json", self.name.as_str()),
        }
    }

    /// Serializes the component to its canonical filename under `dir` (§4.D).
    /// Writing an empty `meta`/`structure`/`commit` is a no-op; use
    /// [`Component::force_write_to`] for callers (like `qri init`) that want
    /// an empty file written anyway.
    pub fn write_to(&self, dir: &Path) -> Result<(), ComponentError> {
        if self.body.is_empty()
            && matches!(
                self.name,
                ComponentName::Meta | ComponentName::Structure | ComponentName::Commit
            )
        {
            return Ok(());
        }
        self.force_write_to(dir)
    }

    pub fn force_write_to(&self, dir: &Path) -> Result<(), ComponentError> {
        let path = dir.join(self.canonical_filename());
        match &self.body {
            ComponentBody::Empty => fs::write(path, b"{}\n")?,
            ComponentBody::Value(v) => {
                let mut bytes = serde_json::to_vec_pretty(v).expect("Value always serializes");
                bytes.push(b'\n');
                fs::write(path, bytes)?;
            }
            ComponentBody::Script(s) => fs::write(path, s.as_bytes())?,
            ComponentBody::Body(b) => match &b.shape {
                BodyShape::Opaque(bytes) => fs::write(path, bytes)?,
                _ => {
                    let mut bytes =
                        serde_json::to_vec_pretty(&b.shape.to_value()).expect("Value always serializes");
                    bytes.push(b'\n');
                    fs::write(path, bytes)?;
                }
            },
        }
        tracing::info!(component = self.name.as_str(), dir = %dir.display(), "wrote component");
        Ok(())
    }

    /// Deletes the canonical filename under `dir`; missing file is not an
    /// error (§4.D).
    pub fn remove_from(&self, dir: &Path) -> Result<(), ComponentError> {
        let path = dir.join(self.canonical_filename());
        match fs::remove_file(path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}

fn parse_tree(path: &Path, format: Format) -> Result<Value, ComponentError> {
    let bytes = fs::read(path)?;
    match format {
        Format::Json => serde_json::from_slice(&bytes).map_err(|err| ComponentError::Parse { path: path.display().to_string(), reason: err.to_string() }),
        Format::Yaml => serde_yaml::from_slice(&bytes).map_err(|err| ComponentError::Parse { path: path.display().to_string(), reason: err.to_string() }),
        other => Err(ComponentError::FormatUnsupported(other.to_string())),
    }
}

fn fill_value(name: ComponentName, tree: &Value) -> Result<Value, ComponentError> {
    match name {
        ComponentName::Meta => {
            let mut target = MetaValue::default();
            qri_filler::fill(tree, &mut target)?;
            Ok(serde_json::to_value(target).expect("MetaValue always serializes"))
        }
        ComponentName::Commit => {
            let mut target = CommitValue::default();
            qri_filler::fill(tree, &mut target)?;
            Ok(serde_json::to_value(target).expect("CommitValue always serializes"))
        }
        ComponentName::Structure => {
            let mut target = StructureValue::default();
            qri_filler::fill(tree, &mut target)?;
            Ok(serde_json::to_value(target).expect("StructureValue always serializes"))
        }
        // dataset/viz: stored as-is, the aggregated view is responsible for
        // expanding a `dataset` tree into its typed children (§4.E).
        _ => Ok(tree.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn load_and_fill_is_idempotent() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("meta.json");
        fs::write(&path, br#"{"title": "hello"}"#).unwrap();

        let mut c = Component::new(ComponentName::Meta, Some(path), Format::Json);
        c.load_and_fill().unwrap();
        assert!(c.is_loaded);
        let first = c.body.clone();
        c.load_and_fill().unwrap();
        assert_eq!(c.body, first);
    }

    #[test]
    fn load_and_fill_sets_parse_problem_on_bad_json() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("meta.json");
        fs::write(&path, b"not json").unwrap();

        let mut c = Component::new(ComponentName::Meta, Some(path), Format::Json);
        let err = c.load_and_fill().unwrap_err();
        assert!(matches!(err, ComponentError::Parse { .. }));
        assert_eq!(c.problem_kind, Some(ProblemKind::Parse));
    }

    #[test]
    fn write_to_is_noop_for_empty_meta() {
        let dir = tempdir().unwrap();
        let c = Component::new(ComponentName::Meta, None, Format::Json);
        c.write_to(dir.path()).unwrap();
        assert!(!dir.path().join("meta.json").exists());
    }

    #[test]
    fn force_write_to_writes_empty_meta_anyway() {
        let dir = tempdir().unwrap();
        let c = Component::new(ComponentName::Meta, None, Format::Json);
        c.force_write_to(dir.path()).unwrap();
        assert!(dir.path().join("meta.json").exists());
    }

    #[test]
    fn remove_from_missing_file_is_not_an_error() {
        let dir = tempdir().unwrap();
        let c = Component::new(ComponentName::Meta, None, Format::Json);
        c.remove_from(dir.path()).unwrap();
    }

    #[test]
    fn drop_derived_strips_structure_depth() {
        let mut c = Component::new(ComponentName::Structure, None, Format::Json);
        c.body = ComponentBody::Value(serde_json::json!({"format": "csv", "depth": 3}));
        c.drop_derived();
        assert_eq!(c.body, ComponentBody::Value(serde_json::json!({"format": "csv"})));
    }

    #[test]
    fn compare_ignores_structure_depth() {
        let mut a = Component::new(ComponentName::Structure, None, Format::Json);
        a.body = ComponentBody::Value(serde_json::json!({"format": "csv", "depth": 1}));
        let mut b = Component::new(ComponentName::Structure, None, Format::Json);
        b.body = ComponentBody::Value(serde_json::json!({"format": "csv", "depth": 99}));
        assert!(a.compare(&b));
    }

    #[test]
    fn csv_body_loads_rows_and_infers_schema() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("body.csv");
        fs::write(&path, "a,b\n1,2\n3,4").unwrap();

        let mut c = Component::new(ComponentName::Body, Some(path), Format::Csv);
        c.load_and_fill().unwrap();
        match &c.body {
            ComponentBody::Body(data) => {
                assert!(data.inferred_schema.is_some());
                assert_eq!(data.shape.entry_count(), 2);
            }
            other => panic!("expected body data, got {other:?}"),
        }
    }
}
