//! Directory Scanner (§4.C): classify a directory's files into components
//! without reading their contents.

use crate::catalog::{is_known_filename, ComponentName};
use crate::component::Component;
use crate::error::ComponentError;
use std::collections::BTreeMap;
use std::path::Path;

/// One subcomponent per recognized file in a directory (§4.C).
#[derive(Debug)]
pub struct ScannedContainer {
    pub components: BTreeMap<ComponentName, Component>,
}

/// Non-recursively list `dir`, classify each entry via the catalog, and
/// group same-named files into a single conflicted component (§4.C).
/// Fails with [`ComponentError::NoDatasetFiles`] if nothing in `dir` matches.
pub fn scan_dir(dir: &Path) -> Result<ScannedContainer, ComponentError> {
    let mut matches = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        if let Some((name, format)) = is_known_filename(&entry.path()) {
            let mod_time = entry.metadata().ok().and_then(|m| m.modified().ok());
            matches.push((name, format, entry.path(), mod_time));
        }
    }

    if matches.is_empty() {
        return Err(ComponentError::NoDatasetFiles);
    }

    // Sort for scanner determinism (§8): the resulting component set must not
    // depend on filesystem iteration order, and the first-seen file (in
    // sorted order) is the one that keeps its `source_file` on conflict.
    matches.sort_by(|a, b| a.2.cmp(&b.2));

    let mut components: BTreeMap<ComponentName, Component> = BTreeMap::new();
    let mut basenames_by_name: BTreeMap<ComponentName, Vec<String>> = BTreeMap::new();

    for (name, format, path, mod_time) in matches {
        let basename = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        basenames_by_name.entry(name).or_default().push(basename);

        components
            .entry(name)
            .and_modify(|incumbent| {
                let names = basenames_by_name.get(&name).unwrap();
                tracing::debug!(component = name.as_str(), ?names, "conflicting component files");
                incumbent.mark_conflict(names);
            })
            .or_insert_with(|| {
                let mut c = Component::new(name, Some(path), format);
                c.mod_time = mod_time;
                c
            });
    }

    Ok(ScannedContainer { components })
}
