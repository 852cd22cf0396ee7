//! Fetch-then-cache orchestration for the convert endpoint

use crate::prompt;
use crate::sources::SheetSource;
use freshness_cache::FreshnessCache;
use gsheets_csv::SheetsError;
use serde::Serialize;
use tracing::{info, warn};

/// How the sheet data for a request was obtained
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CacheOutcome {
    /// Upstream matched the cached copy
    Cached,
    /// Upstream changed; the cached copy was replaced
    Updated,
    /// Upstream failed; the cached copy was used
    CachedFallback,
    /// Nothing was cached
    Fresh,
}

/// Sheet data and prompt template ready for rendering
#[derive(Debug, Clone)]
pub struct PreparedSheet {
    pub csv_data: String,
    pub template: String,
    pub outcome: CacheOutcome,
}

/// Load the sheet for `sheet_id`, reusing the cached template while the
/// upstream data is unchanged.
///
/// Only fails when nothing is cached and the upstream fetch fails.
pub async fn prepare_sheet(
    cache: &FreshnessCache,
    sheets: &dyn SheetSource,
    sheet_id: &str,
) -> Result<PreparedSheet, SheetsError> {
    let (csv_data, template, outcome) = match cache.get(sheet_id).await {
        Some(record) => match sheets.fetch_csv(sheet_id).await {
            Ok(fresh) => {
                if cache.has_changed(sheet_id, &fresh).await {
                    info!(sheet_id, "Sheet data changed, updating cache");
                    (fresh, None, CacheOutcome::Updated)
                } else {
                    info!(sheet_id, "Using cached sheet, no changes detected");
                    let template = record.derived_artifact().map(str::to_string);
                    (fresh, template, CacheOutcome::Cached)
                }
            }
            Err(e) => {
                warn!(sheet_id, error = %e, "Sheet fetch failed, using cached data");
                let template = record.derived_artifact().map(str::to_string);
                (record.raw_data().to_string(), template, CacheOutcome::CachedFallback)
            }
        },
        None => {
            info!(sheet_id, "No cached data, fetching sheet");
            (sheets.fetch_csv(sheet_id).await?, None, CacheOutcome::Fresh)
        }
    };

    let template = match template {
        Some(template) => template,
        None => {
            info!(sheet_id, "Generating prompt template");
            let template = prompt::build_template();
            cache
                .set(sheet_id, csv_data.clone(), Some(template.clone()))
                .await;
            template
        }
    };

    info!(sheet_id, csv_len = csv_data.len(), outcome = ?outcome, "Sheet prepared");

    Ok(PreparedSheet {
        csv_data,
        template,
        outcome,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use freshness_cache::CacheConfig;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Serves whatever CSV is currently set, or an error when `None`
    struct StubSheets {
        csv: Mutex<Option<String>>,
        calls: AtomicUsize,
    }

    impl StubSheets {
        fn serving(csv: &str) -> Self {
            Self {
                csv: Mutex::new(Some(csv.to_string())),
                calls: AtomicUsize::new(0),
            }
        }

        fn set(&self, csv: Option<&str>) {
            *self.csv.lock().unwrap() = csv.map(str::to_string);
        }
    }

    #[async_trait]
    impl SheetSource for StubSheets {
        async fn fetch_csv(&self, _sheet_id: &str) -> Result<String, SheetsError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.csv.lock().unwrap().clone().ok_or(SheetsError::NotFound)
        }
    }

    fn cache() -> FreshnessCache {
        FreshnessCache::in_memory(CacheConfig::default())
    }

    #[tokio::test]
    async fn test_fresh_then_cached() {
        let cache = cache();
        let sheets = StubSheets::serving("GBID,Name\n1,Wire");

        let first = prepare_sheet(&cache, &sheets, "s1").await.unwrap();
        assert_eq!(first.outcome, CacheOutcome::Fresh);
        assert_eq!(first.csv_data, "GBID,Name\n1,Wire");
        assert_eq!(first.template, prompt::build_template());

        let record = cache.peek("s1").await.unwrap();
        assert_eq!(record.derived_artifact(), Some(first.template.as_str()));

        let second = prepare_sheet(&cache, &sheets, "s1").await.unwrap();
        assert_eq!(second.outcome, CacheOutcome::Cached);
        assert_eq!(second.csv_data, first.csv_data);
        assert_eq!(sheets.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_updated_when_sheet_changes() {
        let cache = cache();
        let sheets = StubSheets::serving("v1");
        prepare_sheet(&cache, &sheets, "s1").await.unwrap();

        sheets.set(Some("v2"));
        let prepared = prepare_sheet(&cache, &sheets, "s1").await.unwrap();

        assert_eq!(prepared.outcome, CacheOutcome::Updated);
        assert_eq!(prepared.csv_data, "v2");
        assert!(!cache.has_changed("s1", "v2").await);
        assert!(cache.peek("s1").await.unwrap().derived_artifact().is_some());
    }

    #[tokio::test]
    async fn test_fallback_when_upstream_fails() {
        let cache = cache();
        let sheets = StubSheets::serving("v1");
        prepare_sheet(&cache, &sheets, "s1").await.unwrap();

        sheets.set(None);
        let prepared = prepare_sheet(&cache, &sheets, "s1").await.unwrap();

        assert_eq!(prepared.outcome, CacheOutcome::CachedFallback);
        assert_eq!(prepared.csv_data, "v1");
    }

    #[tokio::test]
    async fn test_error_when_nothing_cached() {
        let cache = cache();
        let sheets = StubSheets::serving("v1");
        sheets.set(None);

        let err = prepare_sheet(&cache, &sheets, "s1").await.unwrap_err();
        assert!(matches!(err, SheetsError::NotFound));
        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn test_regenerates_missing_template() {
        let cache = cache();
        cache.set("s1", "v1", None).await;
        let sheets = StubSheets::serving("v1");

        let prepared = prepare_sheet(&cache, &sheets, "s1").await.unwrap();
        assert_eq!(prepared.outcome, CacheOutcome::Cached);
        assert_eq!(
            cache.peek("s1").await.unwrap().derived_artifact(),
            Some(prepared.template.as_str())
        );
    }

    #[test]
    fn test_outcome_serialization() {
        assert_eq!(
            serde_json::to_string(&CacheOutcome::CachedFallback).unwrap(),
            "\"cached_fallback\""
        );
    }
}
