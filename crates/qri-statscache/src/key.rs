use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::SystemTime;

/// Opaque cache key. For stored-dataset paths this is just the path string;
/// for working-directory bodies it folds in the file's stat metadata so that
/// any permission or mtime change invalidates the entry (§4.J).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CacheKey(String);

impl CacheKey {
    /// Key for a stored-dataset path, which is itself content-addressed and
    /// therefore already a stable identity.
    pub fn for_stored_path(path: &str) -> CacheKey {
        CacheKey(format!("path:{path}"))
    }

    /// Key for a working-directory body file, folding in length, mtime, and
    /// (on unix) permission bits so the entry invalidates on any of those
    /// changing underneath the cache.
    pub fn for_body_file(path: &Path) -> Result<CacheKey, crate::CacheError> {
        let meta = std::fs::metadata(path)?;
        let len = meta.len();
        let mtime = meta
            .modified()?
            .duration_since(SystemTime::UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or(0);
        #[cfg(unix)]
        let mode = {
            use std::os::unix::fs::PermissionsExt;
            meta.permissions().mode()
        };
        #[cfg(not(unix))]
        let mode = 0u32;

        Ok(CacheKey(format!(
            "file:{}:{len}:{mtime}:{mode}",
            path.display()
        )))
    }
}
