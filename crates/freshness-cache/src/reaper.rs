//! Background eviction of idle records

use crate::cache::Shared;
use chrono::{DateTime, Utc};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info};

/// Remove every record idle for longer than `max_age` at `now`.
///
/// Records are judged one by one; the snapshot is written once afterwards if
/// anything was evicted. Returns the number of evicted records.
pub(crate) async fn sweep(shared: &Shared, now: DateTime<Utc>, max_age: Duration) -> usize {
    let evicted = {
        let mut records = shared.records.write().await;
        let expired: Vec<String> = records
            .iter()
            .filter(|(_, record)| record.is_expired(now, max_age))
            .map(|(key, _)| key.clone())
            .collect();

        for key in &expired {
            if let Some(record) = records.remove(key) {
                debug!(
                    key = %key,
                    last_accessed_at = %record.last_accessed_at(),
                    "Evicted idle cache record"
                );
            }
        }
        expired.len()
    };

    if evicted > 0 {
        shared
            .evictions
            .fetch_add(evicted as u64, Ordering::Relaxed);
        shared.persist().await;
    }

    info!(evicted, "Cache cleaned, removed old entries");
    evicted
}

/// Run [`sweep`] every `every` until the returned task is aborted
pub(crate) fn spawn(shared: Arc<Shared>, every: Duration, max_age: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = interval(every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately
        ticker.tick().await;

        loop {
            ticker.tick().await;
            sweep(&shared, Utc::now(), max_age).await;
        }
    })
}
