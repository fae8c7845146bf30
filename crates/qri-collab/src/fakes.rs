//! Small in-memory fakes of the collaborator traits, used across this
//! workspace's integration tests. Gated behind the `test-support` feature so
//! that dependent crates can enable it only for their own `[dev-dependencies]`.

use crate::{BlockStore, CollabError, ReferenceStore, Stats, StatsProvider, VersionInfo};
use std::collections::HashMap;

#[derive(Debug, Default)]
pub struct InMemoryReferenceStore {
    versions: HashMap<String, VersionInfo>,
    paths: HashMap<String, String>,
}

impl InMemoryReferenceStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed(&mut self, reference: &str, path: &str, info: VersionInfo) {
        self.paths.insert(reference.to_string(), path.to_string());
        self.versions.insert(reference.to_string(), info);
    }
}

impl ReferenceStore for InMemoryReferenceStore {
    fn resolve(&self, reference: &str) -> Result<String, CollabError> {
        self.paths
            .get(reference)
            .cloned()
            .ok_or_else(|| CollabError::NotFound(reference.to_string()))
    }

    fn get_version_info(&self, reference: &str) -> Result<VersionInfo, CollabError> {
        self.versions
            .get(reference)
            .cloned()
            .ok_or_else(|| CollabError::NotFound(reference.to_string()))
    }

    fn put_version_info(&mut self, reference: &str, info: VersionInfo) -> Result<(), CollabError> {
        self.versions.insert(reference.to_string(), info);
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct InMemoryBlockStore {
    blocks: HashMap<String, Vec<u8>>,
}

impl InMemoryBlockStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }
}

impl BlockStore for InMemoryBlockStore {
    fn has(&self, id: &str) -> bool {
        self.blocks.contains_key(id)
    }

    fn put(&mut self, id: &str, bytes: &[u8]) -> Result<(), CollabError> {
        self.blocks.insert(id.to_string(), bytes.to_vec());
        Ok(())
    }

    fn get(&self, id: &str) -> Result<Vec<u8>, CollabError> {
        self.blocks
            .get(id)
            .cloned()
            .ok_or_else(|| CollabError::NotFound(id.to_string()))
    }
}

#[derive(Debug, Default)]
pub struct InMemoryStatsProvider {
    stats: HashMap<String, Stats>,
}

impl InMemoryStatsProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed(&mut self, dataset_path: &str, stats: Stats) {
        self.stats.insert(dataset_path.to_string(), stats);
    }
}

impl StatsProvider for InMemoryStatsProvider {
    fn stats(&self, dataset_path: &str) -> Result<Stats, CollabError> {
        self.stats
            .get(dataset_path)
            .cloned()
            .ok_or_else(|| CollabError::NotFound(dataset_path.to_string()))
    }
}
