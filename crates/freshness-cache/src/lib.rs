//! Freshness-checked content cache
//!
//! Stores a raw payload per resource key together with an optional derived
//! artifact computed from it. Every record carries a SHA-256 fingerprint of its
//! payload so callers can re-fetch upstream data and skip recomputing the
//! artifact when nothing changed.
//!
//! Records idle for longer than the configured max age are evicted by a
//! background reaper. The store can be kept in memory only or snapshotted to a
//! JSON file after every mutation (see [`PersistenceMode`]).
//!
//! # Example
//!
//! ```no_run
//! use freshness_cache::{CacheConfig, FreshnessCache, PersistenceMode};
//!
//! # async fn example() {
//! let cache = FreshnessCache::open(CacheConfig::default(), PersistenceMode::Memory.into_store()).await;
//! cache.start_reaper();
//!
//! let csv = "GBID,Name\n100,Conduit";
//! if cache.has_changed("sheet-1", csv).await {
//!     cache.set("sheet-1", csv, Some("template".to_string())).await;
//! }
//!
//! cache.stop();
//! # }
//! ```

mod cache;
mod error;
mod fingerprint;
mod reaper;
mod snapshot;
mod types;

pub use cache::FreshnessCache;
pub use error::{CacheError, Result};
pub use fingerprint::fingerprint;
pub use snapshot::{FileSnapshot, MemorySnapshot, PersistenceMode, Snapshot, SnapshotStore};
pub use types::{CacheConfig, CacheRecord, CacheStats, CacheStatus};
