//! Cache types

use crate::fingerprint::fingerprint;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// A cached payload and the artifact derived from it.
///
/// The fingerprint is only ever computed from the payload it sits next to, so
/// the fields are read-only outside this crate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheRecord {
    pub(crate) raw_data: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) derived_artifact: Option<String>,
    pub(crate) fingerprint: String,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub(crate) created_at: DateTime<Utc>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub(crate) last_accessed_at: DateTime<Utc>,
}

impl CacheRecord {
    pub(crate) fn new(raw_data: String, derived_artifact: Option<String>, now: DateTime<Utc>) -> Self {
        let fingerprint = fingerprint(raw_data.as_bytes());
        Self {
            raw_data,
            derived_artifact,
            fingerprint,
            created_at: now,
            last_accessed_at: now,
        }
    }

    pub fn raw_data(&self) -> &str {
        &self.raw_data
    }

    pub fn derived_artifact(&self) -> Option<&str> {
        self.derived_artifact.as_deref()
    }

    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn last_accessed_at(&self) -> DateTime<Utc> {
        self.last_accessed_at
    }

    /// Payload size in UTF-8 bytes
    pub fn size(&self) -> usize {
        self.raw_data.len()
    }

    /// Whether the record has been idle for longer than `max_age` at `now`
    pub fn is_expired(&self, now: DateTime<Utc>, max_age: Duration) -> bool {
        let idle = now - self.last_accessed_at;
        idle.to_std().map(|idle| idle > max_age).unwrap_or(false)
    }

    /// Re-derive the fingerprint if it no longer matches the payload.
    ///
    /// Returns true when the stored value had to be replaced.
    pub(crate) fn repair_fingerprint(&mut self) -> bool {
        let expected = fingerprint(self.raw_data.as_bytes());
        if expected == self.fingerprint {
            return false;
        }
        self.fingerprint = expected;
        true
    }

    /// Read-only summary of this record as seen at `now`
    pub fn status_at(&self, now: DateTime<Utc>) -> CacheStatus {
        CacheStatus {
            data_size: self.size(),
            fingerprint: self.fingerprint.clone(),
            created_at: self.created_at,
            created_ago_mins: minutes_between(self.created_at, now),
            last_accessed_at: self.last_accessed_at,
            last_accessed_ago_mins: minutes_between(self.last_accessed_at, now),
            has_derived_artifact: self.derived_artifact.is_some(),
        }
    }
}

/// Whole minutes from `then` to `now`, rounded to the nearest minute
fn minutes_between(then: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    let ms = (now - then).num_milliseconds().max(0);
    (ms + 30_000) / 60_000
}

/// Status of one cached record
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CacheStatus {
    pub data_size: usize,
    pub fingerprint: String,
    pub created_at: DateTime<Utc>,
    pub created_ago_mins: i64,
    pub last_accessed_at: DateTime<Utc>,
    pub last_accessed_ago_mins: i64,
    pub has_derived_artifact: bool,
}

/// Statistics about the cache
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CacheStats {
    pub entries: usize,
    pub total_size: u64,
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
}

/// Reaper settings
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Maximum idle time before a record is evicted
    pub max_age: Duration,
    /// Time between reaper sweeps
    pub sweep_interval: Duration,
}

impl CacheConfig {
    pub fn from_secs(max_age_secs: u64, sweep_interval_secs: u64) -> Self {
        Self {
            max_age: Duration::from_secs(max_age_secs),
            sweep_interval: Duration::from_secs(sweep_interval_secs),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_age: Duration::from_secs(24 * 60 * 60), // 24 hours
            sweep_interval: Duration::from_secs(60 * 60), // 1 hour
        }
    }
}
