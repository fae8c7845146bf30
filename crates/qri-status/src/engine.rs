//! Status Engine (§4.F): compares a working directory's components against a
//! stored dataset snapshot.

use crate::item::{StatusItem, StatusKind};
use crate::StatusError;
use qri_collab::{ReferenceStore, StatsProvider};
use qri_dataset::{canonical_bytes, AggregatedView, Component, ComponentName, ProblemKind};
use qri_statscache::{CacheError, CacheKey, StatsCache};
use std::collections::BTreeMap;
use std::path::Path;

/// Bodies at or above this size delegate to the stats-difference path rather
/// than a full structural byte comparison (§4.F).
const LARGE_BODY_BYTES: u64 = 1024 * 1024;

/// Scan `dir`, resolve its linked reference (if any) against `reference_store`,
/// and compare the two sides component-by-component (§4.F).
pub fn compute_status(
    dir: &Path,
    reference_store: &dyn ReferenceStore,
    stats_cache: &StatsCache,
    stats_provider: &dyn StatsProvider,
) -> Result<Vec<StatusItem>, StatusError> {
    let stored = load_stored_view(dir, reference_store)?;
    let working = scan_and_expand(dir).unwrap_or_else(|_| AggregatedView {
        components: BTreeMap::new(),
        pending_schema_inference: None,
    });

    compare_views(&working, stored.as_ref(), stats_cache, stats_provider)
}

/// Scan `dir`, load and fill every file-backed component found, and expand
/// any `dataset` aggregate into its children (§4.C, §4.D, §4.E). Reused for
/// both the working directory and a resolved stored snapshot, since both are
/// just directories of component files.
fn scan_and_expand(dir: &Path) -> Result<AggregatedView, StatusError> {
    let mut scanned = qri_dataset::scan_dir(dir)?;
    if let Some(dataset) = scanned.components.get_mut(&ComponentName::Dataset) {
        let _ = dataset.load_and_fill();
    }

    let mut view = qri_dataset::expand(scanned)?;
    for component in view.components.values_mut() {
        let _ = component.load_and_fill();
    }
    Ok(view)
}

fn load_stored_view(
    dir: &Path,
    reference_store: &dyn ReferenceStore,
) -> Result<Option<AggregatedView>, StatusError> {
    let Some(reference) = qri_linkreg::read_marker(dir) else {
        tracing::debug!(dir = %dir.display(), "no link marker; treating stored side as empty");
        return Ok(None);
    };

    let path = match reference_store.resolve(&reference) {
        Ok(path) => path,
        Err(_) => {
            tracing::debug!(%reference, "reference not found in store; treating stored side as empty");
            return Ok(None);
        }
    };

    match scan_and_expand(Path::new(&path)) {
        Ok(view) => Ok(Some(view)),
        Err(_) => Ok(None),
    }
}

fn compare_views(
    working: &AggregatedView,
    stored: Option<&AggregatedView>,
    stats_cache: &StatsCache,
    stats_provider: &dyn StatsProvider,
) -> Result<Vec<StatusItem>, StatusError> {
    let mut items = Vec::new();
    let empty = BTreeMap::new();
    let stored_components = stored.map(|s| &s.components).unwrap_or(&empty);

    for (name, component) in &working.components {
        if let Some(ProblemKind::Conflict) = component.problem_kind {
            items.push(StatusItem {
                source_file: component.source_file.clone(),
                name: name.as_str().to_string(),
                kind: StatusKind::Conflict(
                    component.problem_message.clone().unwrap_or_default(),
                ),
            });
            continue;
        }

        let kind = match stored_components.get(name) {
            None => StatusKind::Add,
            Some(stored_component) => {
                let equal = if *name == ComponentName::Body {
                    bodies_equal(component, stored_component, stats_cache, stats_provider)?
                } else {
                    let mut working_clone = component.clone();
                    let mut stored_clone = stored_component.clone();
                    working_clone.drop_derived();
                    stored_clone.drop_derived();
                    working_clone.compare(&stored_clone)
                };
                if equal {
                    StatusKind::Unmodified
                } else {
                    StatusKind::Modified
                }
            }
        };

        items.push(StatusItem {
            source_file: component.source_file.clone(),
            name: name.as_str().to_string(),
            kind,
        });
    }

    for (name, stored_component) in stored_components {
        if !working.components.contains_key(name) {
            items.push(StatusItem {
                source_file: stored_component.source_file.clone(),
                name: name.as_str().to_string(),
                kind: StatusKind::Removed,
            });
        }
    }

    Ok(items)
}

/// Bodies are modified iff either their serialized-structure byte length
/// differs, or their stats summaries differ (§4.F, §9 resolved open question).
fn bodies_equal(
    working: &Component,
    stored: &Component,
    stats_cache: &StatsCache,
    stats_provider: &dyn StatsProvider,
) -> Result<bool, StatusError> {
    let working_bytes = canonical_bytes(&working.structured_view());
    let stored_bytes = canonical_bytes(&stored.structured_view());
    if working_bytes.len() != stored_bytes.len() {
        return Ok(false);
    }

    let is_large = working
        .source_file
        .as_ref()
        .and_then(|p| std::fs::metadata(p).ok())
        .map(|m| m.len() >= LARGE_BODY_BYTES)
        .unwrap_or(false);

    if !is_large {
        return Ok(working_bytes == stored_bytes);
    }

    let working_stats = stats_for(working, stats_cache, stats_provider)?;
    let stored_stats = stats_for(stored, stats_cache, stats_provider)?;
    Ok(working_stats == stored_stats)
}

fn stats_for(
    component: &Component,
    stats_cache: &StatsCache,
    stats_provider: &dyn StatsProvider,
) -> Result<qri_collab::Stats, StatusError> {
    let Some(path) = &component.source_file else {
        return Ok(qri_collab::Stats::default());
    };

    let key = CacheKey::for_body_file(path)?;
    match stats_cache.get_stats(&key) {
        Ok(stats) => Ok(stats),
        Err(CacheError::Miss) => {
            let stats = stats_provider.stats(&path.display().to_string())?;
            stats_cache.put_stats(key, stats.clone())?;
            Ok(stats)
        }
        Err(other) => Err(other.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use qri_collab::fakes::{InMemoryReferenceStore, InMemoryStatsProvider};
    use qri_collab::VersionInfo;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn new_directory_with_no_link_reports_everything_as_add() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("meta.json"), r#"{"title": "hi"}"#).unwrap();

        let refs = InMemoryReferenceStore::default();
        let cache_dir = tempdir().unwrap();
        let cache = StatsCache::open(cache_dir.path().join("cache.bin"), Default::default()).unwrap();
        let stats = InMemoryStatsProvider::default();

        let items = compute_status(dir.path(), &refs, &cache, &stats).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].kind, StatusKind::Add);
    }

    #[test]
    fn conflict_takes_precedence_over_add() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("body.json"), "[]").unwrap();
        fs::write(dir.path().join("body.csv"), "a\n1").unwrap();

        let refs = InMemoryReferenceStore::default();
        let cache_dir = tempdir().unwrap();
        let cache = StatsCache::open(cache_dir.path().join("cache.bin"), Default::default()).unwrap();
        let stats = InMemoryStatsProvider::default();

        let items = compute_status(dir.path(), &refs, &cache, &stats).unwrap();
        assert_eq!(items.len(), 1);
        assert!(matches!(items[0].kind, StatusKind::Conflict(_)));
    }

    #[test]
    fn unchanged_component_against_identical_stored_copy_is_unmodified() {
        let working_dir = tempdir().unwrap();
        let stored_dir = tempdir().unwrap();
        fs::write(working_dir.path().join("meta.json"), r#"{"title": "same"}"#).unwrap();
        fs::write(stored_dir.path().join("meta.json"), r#"{"title": "same"}"#).unwrap();

        let mut refs = InMemoryReferenceStore::default();
        refs.seed(
            "alice/data",
            &stored_dir.path().display().to_string(),
            VersionInfo {
                path: stored_dir.path().display().to_string(),
                commit_time: Utc::now(),
            },
        );
        qri_linkreg::write_marker_for_test(working_dir.path(), "alice/data");

        let cache_dir = tempdir().unwrap();
        let cache = StatsCache::open(cache_dir.path().join("cache.bin"), Default::default()).unwrap();
        let stats = InMemoryStatsProvider::default();

        let items = compute_status(working_dir.path(), &refs, &cache, &stats).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].kind, StatusKind::Unmodified);
    }
}
