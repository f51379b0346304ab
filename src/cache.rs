//! Memoized record sets, one per distinct (input, configuration) pair.

use hashbrown::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use tracing::{debug, info};

use crate::config::PipelineConfig;
use crate::error::LoadError;
use crate::loader::{RowSource, Snapshot};
use crate::spatial::FacilitySet;

/// Identity of a built set: hash of the raw bytes plus the config fingerprint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub content_hash: u64,
    pub fingerprint: u64,
}

impl CacheKey {
    pub fn new(snapshot: &Snapshot, config: &PipelineConfig) -> Self {
        Self {
            content_hash: snapshot.content_hash,
            fingerprint: config.fingerprint(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub entries: usize,
}

/// Thread-safe memo of built [`FacilitySet`]s.
///
/// Sets are handed out as `Arc`s and never mutated. Dropping an entry only
/// forgets it; holders keep a valid set.
#[derive(Debug, Default)]
pub struct SnapshotCache {
    entries: RwLock<HashMap<CacheKey, Arc<FacilitySet>>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl SnapshotCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached set for this snapshot and config, building it on first request.
    pub fn get_or_build(&self, snapshot: &Snapshot, config: &PipelineConfig) -> Arc<FacilitySet> {
        let key = CacheKey::new(snapshot, config);

        if let Some(set) = self.get(&key) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            debug!("Cache hit for {:016x}/{:016x}", key.content_hash, key.fingerprint);
            return set;
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        info!(
            "Building record set for snapshot {:016x} ({} rows)",
            key.content_hash,
            snapshot.rows.len()
        );
        // Built without holding the lock; a concurrent builder of the same
        // key loses to whoever inserted first.
        let built = Arc::new(FacilitySet::build(&snapshot.rows, config));

        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries.entry(key).or_insert(built).clone()
    }

    /// Read a source and return its (possibly cached) set
    pub fn load<S: RowSource + ?Sized>(
        &self,
        source: &S,
        config: &PipelineConfig,
    ) -> Result<Arc<FacilitySet>, LoadError> {
        let snapshot = source.snapshot()?;
        Ok(self.get_or_build(&snapshot, config))
    }

    pub fn get(&self, key: &CacheKey) -> Option<Arc<FacilitySet>> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    /// Forget one entry. Returns whether it was present.
    pub fn invalidate(&self, key: &CacheKey) -> bool {
        let removed = self
            .entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key)
            .is_some();
        if removed {
            debug!("Invalidated {:016x}/{:016x}", key.content_hash, key.fingerprint);
        }
        removed
    }

    pub fn clear(&self) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entries: self.len(),
        }
    }
}
