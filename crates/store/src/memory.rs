//! In-memory counter store
//!
//! DashMap-backed generation counters for embedded, development, and test
//! use. The production counter store is expected to live behind a network
//! client implementing [`CounterStore`]; this one implements the identical
//! contract so the layers above cannot tell the difference.
//!
//! # Design
//!
//! - DashMap: sharded by default, lock-free reads
//! - One `u64` per identity; the shard write lock makes `incr` atomic per key
//! - `get_multi` omits keys that were never incremented, exercising the
//!   caller's baseline handling

use dashmap::DashMap;
use gencache_core::{CounterStore, Generation, Identity, StoreResult};

/// In-memory generation counters
///
/// Counters are created lazily by `incr` and never destroyed. Reads that
/// race an increment observe either the old or the new generation, which the
/// invalidation scheme tolerates by design (a stale read serves a stale
/// cache entry, never a wrong one).
#[derive(Debug, Default)]
pub struct MemoryCounterStore {
    counters: DashMap<Identity, u64>,
}

impl MemoryCounterStore {
    /// Create an empty store
    pub fn new() -> Self {
        MemoryCounterStore {
            counters: DashMap::new(),
        }
    }

    /// Current generation of a single counter, if it exists
    pub fn current(&self, key: &Identity) -> Option<Generation> {
        self.counters.get(key).map(|v| Generation::new(*v))
    }

    /// Number of counters that have been created
    pub fn len(&self) -> usize {
        self.counters.len()
    }

    /// Check if no counter has been created yet
    pub fn is_empty(&self) -> bool {
        self.counters.is_empty()
    }
}

impl CounterStore for MemoryCounterStore {
    fn get_multi(&self, keys: &[Identity]) -> StoreResult<Vec<(Identity, Generation)>> {
        let mut out = Vec::with_capacity(keys.len());
        for key in keys {
            if let Some(value) = self.counters.get(key) {
                out.push((key.clone(), Generation::new(*value)));
            }
        }
        Ok(out)
    }

    fn incr(&self, key: &Identity, start: Generation) -> StoreResult<Generation> {
        // The entry guard holds the shard write lock, so the read-modify-write
        // is atomic per key.
        let mut entry = self
            .counters
            .entry(key.clone())
            .or_insert_with(|| start.as_u64());
        *entry = entry.saturating_add(1);
        Ok(Generation::new(*entry))
    }
}
