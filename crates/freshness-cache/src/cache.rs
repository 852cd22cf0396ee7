//! Keyed record store with fingerprint checks and access tracking

use crate::fingerprint::fingerprint;
use crate::reaper;
use crate::snapshot::{MemorySnapshot, Snapshot, SnapshotStore};
use crate::types::{CacheConfig, CacheRecord, CacheStats, CacheStatus};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::{Mutex as AsyncMutex, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// State shared between the cache handle and its reaper task
pub(crate) struct Shared {
    pub(crate) records: RwLock<HashMap<String, CacheRecord>>,
    store: Arc<dyn SnapshotStore>,
    /// Keeps snapshot writes in the order their copies were taken
    persist_lock: AsyncMutex<()>,
    hits: AtomicU64,
    misses: AtomicU64,
    pub(crate) evictions: AtomicU64,
}

impl Shared {
    /// Write the current store through the snapshot adapter.
    ///
    /// The copy is taken under a short read lock; the write happens without
    /// holding it. Failures are logged and never returned.
    pub(crate) async fn persist(&self) {
        let _guard = self.persist_lock.lock().await;
        let snapshot: Snapshot = self.records.read().await.clone();

        if let Err(e) = self.store.save(&snapshot).await {
            warn!(
                store = self.store.name(),
                entries = snapshot.len(),
                error = %e,
                "Failed to persist cache snapshot"
            );
        }
    }
}

/// Freshness-checked cache of raw payloads and their derived artifacts.
///
/// `get` counts as an access: a hit refreshes the record's last-access time.
/// Use [`peek`](Self::peek) or [`status`](Self::status) to read without
/// extending a record's life.
pub struct FreshnessCache {
    shared: Arc<Shared>,
    config: CacheConfig,
    reaper: Mutex<Option<JoinHandle<()>>>,
}

impl FreshnessCache {
    /// Empty cache that never leaves the process
    pub fn in_memory(config: CacheConfig) -> Self {
        Self::new(config, Arc::new(MemorySnapshot))
    }

    /// Empty cache over `store`. The store's snapshot is not read, so
    /// callers outside the crate go through [`open`](Self::open).
    pub(crate) fn new(config: CacheConfig, store: Arc<dyn SnapshotStore>) -> Self {
        Self {
            shared: Arc::new(Shared {
                records: RwLock::new(HashMap::new()),
                store,
                persist_lock: AsyncMutex::new(()),
                hits: AtomicU64::new(0),
                misses: AtomicU64::new(0),
                evictions: AtomicU64::new(0),
            }),
            config,
            reaper: Mutex::new(None),
        }
    }

    /// Create a cache and restore the last snapshot from `store`.
    ///
    /// A missing or unreadable snapshot leaves the cache empty.
    pub async fn open(config: CacheConfig, store: Arc<dyn SnapshotStore>) -> Self {
        let cache = Self::new(config, store);
        let store = &cache.shared.store;

        match store.load().await {
            Ok(Some(mut snapshot)) => {
                for (key, record) in snapshot.iter_mut() {
                    if record.repair_fingerprint() {
                        warn!(key = %key, "Snapshot record fingerprint did not match payload");
                    }
                }
                info!(store = store.name(), entries = snapshot.len(), "Cache restored from snapshot");
                *cache.shared.records.write().await = snapshot;
            }
            Ok(None) => {
                info!(store = store.name(), "Cache initialized empty");
            }
            Err(e) => {
                warn!(store = store.name(), error = %e, "Failed to load cache snapshot, starting empty");
            }
        }

        cache
    }

    /// Get a record, marking it as accessed
    pub async fn get(&self, key: &str) -> Option<CacheRecord> {
        let now = Utc::now();
        let mut records = self.shared.records.write().await;

        match records.get_mut(key) {
            Some(record) => {
                record.last_accessed_at = now;
                self.shared.hits.fetch_add(1, Ordering::Relaxed);
                debug!(key = %key, "Cache hit");
                Some(record.clone())
            }
            None => {
                self.shared.misses.fetch_add(1, Ordering::Relaxed);
                debug!(key = %key, "Cache miss");
                None
            }
        }
    }

    /// Get a record without touching it
    pub async fn peek(&self, key: &str) -> Option<CacheRecord> {
        self.shared.records.read().await.get(key).cloned()
    }

    /// Store `raw_data` and its derived artifact under `key`.
    ///
    /// Replaces payload, fingerprint and artifact together. The creation time
    /// of an existing record is kept.
    pub async fn set(
        &self,
        key: &str,
        raw_data: impl Into<String>,
        derived_artifact: Option<String>,
    ) -> CacheRecord {
        let now = Utc::now();
        let mut record = CacheRecord::new(raw_data.into(), derived_artifact, now);

        {
            let mut records = self.shared.records.write().await;
            if let Some(previous) = records.get(key) {
                record.created_at = previous.created_at;
            }
            records.insert(key.to_string(), record.clone());
        }

        debug!(
            key = %key,
            size = record.size(),
            fingerprint = %record.fingerprint,
            has_artifact = record.derived_artifact.is_some(),
            "Cached record"
        );

        self.shared.persist().await;
        record
    }

    /// Mark a record as accessed; no-op when absent
    pub async fn touch(&self, key: &str) {
        let now = Utc::now();
        if let Some(record) = self.shared.records.write().await.get_mut(key) {
            record.last_accessed_at = now;
        }
    }

    /// Whether `candidate` differs from what is cached under `key`.
    ///
    /// True when nothing is cached.
    pub async fn has_changed(&self, key: &str, candidate: &str) -> bool {
        let stored = self
            .shared
            .records
            .read()
            .await
            .get(key)
            .map(|record| record.fingerprint.clone());

        match stored {
            Some(stored) => fingerprint(candidate.as_bytes()) != stored,
            None => true,
        }
    }

    /// Remove a record; no-op when absent
    pub async fn remove(&self, key: &str) {
        let removed = self.shared.records.write().await.remove(key);
        if removed.is_some() {
            debug!(key = %key, "Removed cache record");
            self.shared.persist().await;
        }
    }

    /// Read-only status of the record under `key`
    pub async fn status(&self, key: &str) -> Option<CacheStatus> {
        let now = Utc::now();
        self.shared
            .records
            .read()
            .await
            .get(key)
            .map(|record| record.status_at(now))
    }

    /// Evict records idle for longer than the configured max age.
    ///
    /// Returns the number of evicted records.
    pub async fn clean_old_cache(&self) -> usize {
        self.sweep_at(Utc::now()).await
    }

    /// Evict records idle for longer than the configured max age as of `now`
    pub async fn sweep_at(&self, now: DateTime<Utc>) -> usize {
        reaper::sweep(&self.shared, now, self.config.max_age).await
    }

    /// Start the periodic sweep. Does nothing if it is already running.
    pub fn start_reaper(&self) {
        let Ok(mut slot) = self.reaper.lock() else {
            return;
        };
        if slot.as_ref().is_some_and(|handle| !handle.is_finished()) {
            return;
        }

        let every = self.config.sweep_interval.max(Duration::from_millis(1));
        info!(
            interval_secs = every.as_secs(),
            max_age_secs = self.config.max_age.as_secs(),
            "Starting cache reaper"
        );
        *slot = Some(reaper::spawn(
            Arc::clone(&self.shared),
            every,
            self.config.max_age,
        ));
    }

    /// Cancel the periodic sweep
    pub fn stop(&self) {
        if let Ok(mut slot) = self.reaper.lock() {
            if let Some(handle) = slot.take() {
                handle.abort();
                info!("Cache reaper stopped");
            }
        }
    }

    pub fn is_reaper_running(&self) -> bool {
        self.reaper
            .lock()
            .map(|slot| slot.as_ref().is_some_and(|handle| !handle.is_finished()))
            .unwrap_or(false)
    }

    pub async fn len(&self) -> usize {
        self.shared.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.shared.records.read().await.is_empty()
    }

    /// Get current cache statistics
    pub async fn stats(&self) -> CacheStats {
        let records = self.shared.records.read().await;
        CacheStats {
            entries: records.len(),
            total_size: records.values().map(|r| r.size() as u64).sum(),
            hits: self.shared.hits.load(Ordering::Relaxed),
            misses: self.shared.misses.load(Ordering::Relaxed),
            evictions: self.shared.evictions.load(Ordering::Relaxed),
        }
    }
}

impl Drop for FreshnessCache {
    fn drop(&mut self) {
        if let Ok(mut slot) = self.reaper.lock() {
            if let Some(handle) = slot.take() {
                handle.abort();
            }
        }
    }
}
