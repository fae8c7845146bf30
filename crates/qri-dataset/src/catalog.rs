//! The component catalog (§4.B): which file names map to which components,
//! and which extensions are valid for each.

use crate::format::{normalize_extension, Format};
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentName {
    Dataset,
    Commit,
    Meta,
    Structure,
    Readme,
    Transform,
    Viz,
    Body,
}

impl ComponentName {
    pub fn as_str(&self) -> &'static str {
        match self {
            ComponentName::Dataset => "dataset",
            ComponentName::Commit => "commit",
            ComponentName::Meta => "meta",
            ComponentName::Structure => "structure",
            ComponentName::Readme => "readme",
            ComponentName::Transform => "transform",
            ComponentName::Viz => "viz",
            ComponentName::Body => "body",
        }
    }

    pub fn from_str(s: &str) -> Option<ComponentName> {
        Some(match s {
            "dataset" => ComponentName::Dataset,
            "commit" => ComponentName::Commit,
            "meta" => ComponentName::Meta,
            "structure" => ComponentName::Structure,
            "readme" => ComponentName::Readme,
            "transform" => ComponentName::Transform,
            "viz" => ComponentName::Viz,
            "body" => ComponentName::Body,
            _ => return None,
        })
    }

    /// Extensions this component may be stored under (§4.B).
    pub fn allowed_formats(&self) -> &'static [Format] {
        match self {
            ComponentName::Dataset | ComponentName::Commit | ComponentName::Meta | ComponentName::Structure => {
                &[Format::Json, Format::Yaml]
            }
            ComponentName::Readme => &[Format::Md, Format::Html],
            ComponentName::Transform => &[Format::Star],
            ComponentName::Viz => &[Format::Html],
            ComponentName::Body => &[Format::Csv, Format::Json, Format::Cbor, Format::Xlsx],
        }
    }
}

/// Whether `basename` (the file stem, without the final extension) begins
/// with a character that marks it as a temp/swap/hidden file and therefore
/// never a dataset component, regardless of what follows (§4.B).
fn looks_like_temp_file(file_name: &str) -> bool {
    file_name.starts_with('.')
        || file_name.starts_with('#')
        || file_name.ends_with('~')
        || file_name.ends_with(".swp")
        || file_name.ends_with(".tmp")
}

/// Classify `path` against the catalog. Returns `None` for any file that
/// isn't a recognized dataset component, including temp/swap/dot-prefixed
/// files, which must never match regardless of stem (§4.B).
pub fn is_known_filename(path: &Path) -> Option<(ComponentName, Format)> {
    let file_name = path.file_name()?.to_str()?;
    if looks_like_temp_file(file_name) {
        return None;
    }

    let (stem, ext) = file_name.split_once('.')?;
    let name = ComponentName::from_str(&stem.to_lowercase())?;
    let format = Format::from_normalized_extension(&normalize_extension(ext))?;

    if name.allowed_formats().contains(&format) {
        Some((name, format))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn recognizes_known_component_files() {
        assert_eq!(
            is_known_filename(&PathBuf::from("meta.json")),
            Some((ComponentName::Meta, Format::Json))
        );
        assert_eq!(
            is_known_filename(&PathBuf::from("body.csv")),
            Some((ComponentName::Body, Format::Csv))
        );
        assert_eq!(
            is_known_filename(&PathBuf::from("README.MD")),
            Some((ComponentName::Readme, Format::Md))
        );
    }

    #[test]
    fn yml_extension_normalizes() {
        assert_eq!(
            is_known_filename(&PathBuf::from("meta.yml")),
            Some((ComponentName::Meta, Format::Yaml))
        );
    }

    #[test]
    fn rejects_disallowed_extension_for_component() {
        assert_eq!(is_known_filename(&PathBuf::from("meta.csv")), None);
    }

    #[test]
    fn rejects_temp_and_hidden_files() {
        assert_eq!(is_known_filename(&PathBuf::from(".meta.json")), None);
        assert_eq!(is_known_filename(&PathBuf::from("meta.json~")), None);
        assert_eq!(is_known_filename(&PathBuf::from("meta.json.swp")), None);
        assert_eq!(is_known_filename(&PathBuf::from("#meta.json#")), None);
    }

    #[test]
    fn rejects_unknown_stem() {
        assert_eq!(is_known_filename(&PathBuf::from("notes.json")), None);
    }
}
