//! The per-directory marker file that is the authoritative cross-process signal
//! that a link still exists (§3, §6).

use crate::LinkError;
use std::path::{Path, PathBuf};

const HIDDEN: &str = ".qri-ref";
const VISIBLE: &str = "qri-ref.txt";

fn candidates(dir: &Path) -> [PathBuf; 2] {
    [dir.join(HIDDEN), dir.join(VISIBLE)]
}

/// The reference text currently recorded in `dir`'s marker file, if any. Checks
/// the hidden name first, then the visible one.
pub fn read(dir: &Path) -> Option<String> {
    candidates(dir)
        .into_iter()
        .find_map(|path| std::fs::read_to_string(path).ok())
}

pub fn exists(dir: &Path) -> bool {
    candidates(dir).iter().any(|path| path.exists())
}

/// Write `reference` into `dir`'s marker file, creating the hidden variant
/// unless a visible one already exists (in which case that one is kept in
/// place, preserving whichever style the working directory already used).
pub fn write(dir: &Path, reference: &str) -> Result<(), LinkError> {
    let visible = dir.join(VISIBLE);
    let path = if visible.exists() { visible } else { dir.join(HIDDEN) };
    std::fs::write(path, reference)?;
    Ok(())
}

/// Remove `dir`'s marker file. Returns `Ok(())` if no marker was present.
pub fn remove(dir: &Path) -> Result<(), LinkError> {
    for path in candidates(dir) {
        if path.exists() {
            std::fs::remove_file(path)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn write_then_read_round_trips() {
        let dir = tempdir().unwrap();
        write(dir.path(), "alice/data").unwrap();
        assert_eq!(read(dir.path()), Some("alice/data".to_string()));
        assert!(exists(dir.path()));
    }

    #[test]
    fn write_prefers_existing_visible_marker() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join(VISIBLE), "old").unwrap();
        write(dir.path(), "new").unwrap();
        assert!(!dir.path().join(HIDDEN).exists());
        assert_eq!(
            std::fs::read_to_string(dir.path().join(VISIBLE)).unwrap(),
            "new"
        );
    }

    #[test]
    fn remove_is_not_an_error_when_absent() {
        let dir = tempdir().unwrap();
        remove(dir.path()).unwrap();
    }
}
