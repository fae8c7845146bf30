//! Contracts for the systems this crate's workspace treats as external
//! collaborators (§6): a dataset reference store, a content-addressed block
//! store, a resource path resolver, and a statistics accumulator. None of these
//! are implemented here beyond small in-memory fakes used across the workspace's
//! own tests — production wiring belongs to the surrounding repository, which is
//! out of scope.

mod error;
mod stats;
mod tracing_init;

#[cfg(any(test, feature = "test-support"))]
pub mod fakes;

pub use error::CollabError;
pub use stats::{BodySummary, ColumnStats, ScalarKind, Stats};
pub use tracing_init::init_test_tracing;

use chrono::{DateTime, Utc};

/// Everything the status engine (§4.F) knows about a previously-saved dataset
/// version, as returned by a [`ReferenceStore`].
#[derive(Debug, Clone, PartialEq)]
pub struct VersionInfo {
    pub path: String,
    pub commit_time: DateTime<Utc>,
}

/// Resolves a dataset reference string to the path of its most recent version.
/// Resolution and canonicalization of the reference string itself are out of
/// scope; implementors receive it already as an opaque string.
pub trait ReferenceStore {
    fn resolve(&self, reference: &str) -> Result<String, CollabError>;
    fn get_version_info(&self, reference: &str) -> Result<VersionInfo, CollabError>;
    fn put_version_info(&mut self, reference: &str, info: VersionInfo) -> Result<(), CollabError>;
}

/// Content-addressed store of manifest-node blocks. `id` is a manifest node
/// identifier (typically a content hash).
pub trait BlockStore {
    fn has(&self, id: &str) -> bool;
    fn put(&mut self, id: &str, bytes: &[u8]) -> Result<(), CollabError>;
    fn get(&self, id: &str) -> Result<Vec<u8>, CollabError>;
}

/// A resource handle opened by a [`PathResolver`] — abstracts over a local file
/// handle vs. a lazily-fetched remote resource.
pub trait ResolvedFile: std::io::Read {
    fn len(&self) -> Option<u64>;
}

/// Resolves a dataset-relative path (e.g. a body file's logical path) to a
/// readable handle, without the component model needing to know whether the
/// underlying resource is local or remote.
pub trait PathResolver {
    fn get(&self, path: &str) -> Result<Box<dyn ResolvedFile>, CollabError>;
}

/// The external statistics accumulator consulted by the status engine's body
/// comparison (§4.F, §9).
pub trait StatsProvider {
    fn stats(&self, dataset_path: &str) -> Result<Stats, CollabError>;
}
