//! Request and response payloads for the GBID API

use crate::convert::CacheOutcome;
use freshness_cache::{CacheStats, CacheStatus};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Body of `POST /api/sheets`. A `range` field is tolerated and ignored;
/// the first tab is always exported whole.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SheetsRequest {
    pub sheet_id: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SheetsResponse {
    pub csv_data: String,
    pub row_count: usize,
    pub message: String,
}

/// Body of `POST /api/claude`. `sheetRange` is tolerated and ignored.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConvertRequest {
    pub sheet_id: Option<String>,
    pub material_input: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConvertResponse {
    pub result: String,
    pub cache_status: CacheOutcome,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheStatusQuery {
    pub sheet_id: Option<String>,
}

/// Record timestamps in epoch ms, ages in whole minutes
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheAge {
    pub created: i64,
    pub created_ago: i64,
    pub last_accessed: i64,
    pub last_accessed_ago: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CachedSheetStatus {
    pub cached: bool,
    pub sheet_id: String,
    pub data_size: usize,
    pub hash: String,
    pub age: CacheAge,
    pub prompt_template: &'static str,
}

impl CachedSheetStatus {
    pub fn new(sheet_id: String, status: CacheStatus) -> Self {
        Self {
            cached: true,
            sheet_id,
            data_size: status.data_size,
            hash: status.fingerprint,
            age: CacheAge {
                created: status.created_at.timestamp_millis(),
                created_ago: status.created_ago_mins,
                last_accessed: status.last_accessed_at.timestamp_millis(),
                last_accessed_ago: status.last_accessed_ago_mins,
            },
            prompt_template: if status.has_derived_artifact {
                "cached"
            } else {
                "not cached"
            },
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UncachedSheetStatus {
    pub cached: bool,
    pub sheet_id: String,
    pub message: String,
}

impl UncachedSheetStatus {
    pub fn new(sheet_id: String) -> Self {
        Self {
            cached: false,
            sheet_id,
            message: "No cached data found for this sheet".to_string(),
        }
    }
}

/// Returned by `GET /api/cache-status` without a sheet id
#[derive(Debug, Serialize)]
pub struct CacheStatusUsage {
    pub message: String,
    pub usage: String,
    pub endpoints: BTreeMap<String, String>,
}

impl Default for CacheStatusUsage {
    fn default() -> Self {
        let mut endpoints = BTreeMap::new();
        endpoints.insert(
            "/api/cache-status".to_string(),
            "Get cache status for all sheets".to_string(),
        );
        endpoints.insert(
            "/api/cache-status?sheetId=YOUR_SHEET_ID".to_string(),
            "Get cache status for specific sheet".to_string(),
        );

        Self {
            message: "Cache status endpoint".to_string(),
            usage: "Add ?sheetId=YOUR_SHEET_ID to get specific cache info".to_string(),
            endpoints,
        }
    }
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub uptime_secs: u64,
    pub cache: CacheStats,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_convert_request_tolerates_missing_fields() {
        let req: ConvertRequest = serde_json::from_str(r#"{"sheetId":"abc"}"#).unwrap();
        assert_eq!(req.sheet_id.as_deref(), Some("abc"));
        assert!(req.material_input.is_none());

        let req: ConvertRequest = serde_json::from_str(
            r#"{"sheetId":"abc","sheetRange":"A1:C10","materialInput":"10 boxes"}"#,
        )
        .unwrap();
        assert_eq!(req.material_input.as_deref(), Some("10 boxes"));
    }

    #[test]
    fn test_sheets_request_ignores_range() {
        let req: SheetsRequest =
            serde_json::from_str(r#"{"sheetId":"abc","range":"Sheet1!A1:B2"}"#).unwrap();
        assert_eq!(req.sheet_id.as_deref(), Some("abc"));
    }

    #[test]
    fn test_convert_response_serialization() {
        let response = ConvertResponse {
            result: "100\t2".to_string(),
            cache_status: CacheOutcome::Fresh,
        };
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["result"], "100\t2");
        assert_eq!(json["cacheStatus"], "fresh");
    }

    #[test]
    fn test_cached_sheet_status_shape() {
        let created = Utc.timestamp_millis_opt(1_700_000_000_000).unwrap();
        let status = CacheStatus {
            data_size: 5,
            fingerprint: "abc123".to_string(),
            created_at: created,
            created_ago_mins: 90,
            last_accessed_at: created,
            last_accessed_ago_mins: 1,
            has_derived_artifact: false,
        };

        let json = serde_json::to_value(CachedSheetStatus::new("s1".to_string(), status)).unwrap();
        assert_eq!(json["cached"], true);
        assert_eq!(json["sheetId"], "s1");
        assert_eq!(json["dataSize"], 5);
        assert_eq!(json["hash"], "abc123");
        assert_eq!(json["age"]["created"], 1_700_000_000_000i64);
        assert_eq!(json["age"]["createdAgo"], 90);
        assert_eq!(json["age"]["lastAccessedAgo"], 1);
        assert_eq!(json["promptTemplate"], "not cached");
    }

    #[test]
    fn test_uncached_and_usage_shapes() {
        let json = serde_json::to_value(UncachedSheetStatus::new("s2".to_string())).unwrap();
        assert_eq!(json["cached"], false);
        assert_eq!(json["message"], "No cached data found for this sheet");

        let json = serde_json::to_value(CacheStatusUsage::default()).unwrap();
        assert_eq!(json["message"], "Cache status endpoint");
        assert!(json["endpoints"]["/api/cache-status"].is_string());
    }

    #[test]
    fn test_health_response_serialization() {
        let response = HealthResponse {
            status: "ok".to_string(),
            uptime_secs: 3600,
            cache: CacheStats {
                entries: 2,
                total_size: 1024,
                hits: 5,
                misses: 1,
                evictions: 0,
            },
        };

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["status"], "ok");
        assert_eq!(json["uptime_secs"], 3600);
        assert_eq!(json["cache"]["hits"], 5);
    }
}
