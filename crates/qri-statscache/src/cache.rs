use crate::{CacheError, CacheKey};
use qri_collab::Stats;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;

/// Bounds the cache's total serialized byte count (§4.J). Default matches
/// the reference codebase's other size-bounded caches.
#[derive(Debug, Clone, Copy)]
pub struct CacheConfig {
    pub max_bytes: u64,
}

impl Default for CacheConfig {
    fn default() -> CacheConfig {
        CacheConfig {
            max_bytes: 64 * 1024 * 1024,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Entry {
    stats: Stats,
    size: u64,
    seq: u64,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct Index {
    entries: HashMap<CacheKey, Entry>,
    next_seq: u64,
}

/// On-disk, content-keyed stats cache, bounded by total serialized size. On
/// overflow it evicts least-recently-written entries until back under the
/// limit.
pub struct StatsCache {
    path: PathBuf,
    config: CacheConfig,
    index: Mutex<Index>,
}

impl StatsCache {
    pub fn open(path: impl Into<PathBuf>, config: CacheConfig) -> Result<StatsCache, CacheError> {
        let path = path.into();
        let index = if path.exists() {
            let bytes = std::fs::read(&path)?;
            bincode::deserialize(&bytes)?
        } else {
            Index::default()
        };
        Ok(StatsCache {
            path,
            config,
            index: Mutex::new(index),
        })
    }

    fn save(&self, index: &Index) -> Result<(), CacheError> {
        let bytes = bincode::serialize(index)?;
        std::fs::write(&self.path, bytes)?;
        Ok(())
    }

    fn total_bytes(index: &Index) -> u64 {
        index.entries.values().map(|e| e.size).sum()
    }

    pub fn put_stats(&self, key: CacheKey, stats: Stats) -> Result<(), CacheError> {
        let mut index = self.index.lock().unwrap();
        let size = bincode::serialized_size(&stats)?;
        let seq = index.next_seq;
        index.next_seq += 1;
        index.entries.insert(key, Entry { stats, size, seq });

        while Self::total_bytes(&index) > self.config.max_bytes {
            let oldest = index
                .entries
                .iter()
                .min_by_key(|(_, e)| e.seq)
                .map(|(k, _)| k.clone());
            match oldest {
                Some(key) => {
                    tracing::debug!(?key, "evicting least-recently-written stats entry");
                    index.entries.remove(&key);
                }
                None => break,
            }
        }

        self.save(&index)
    }

    pub fn get_stats(&self, key: &CacheKey) -> Result<Stats, CacheError> {
        let index = self.index.lock().unwrap();
        index
            .entries
            .get(key)
            .map(|e| e.stats.clone())
            .ok_or(CacheError::Miss)
    }
}
