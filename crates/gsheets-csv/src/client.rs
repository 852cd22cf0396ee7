//! Sheet export HTTP client

use crate::error::{Result, SheetsError};
use std::time::Duration;
use tracing::{debug, warn};

/// Number of rows in a CSV payload, ignoring surrounding whitespace
pub fn row_count(csv: &str) -> usize {
    csv.trim().split('\n').count()
}

/// HTTP client for Google Sheets CSV exports
pub struct SheetsClient {
    http: reqwest::Client,
    base_url: String,
}

impl SheetsClient {
    /// Public Google Docs host
    pub const DEFAULT_BASE_URL: &'static str = "https://docs.google.com";

    /// Create a client against `base_url` (30 second timeout)
    pub fn with_base_url(base_url: &str) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// CSV export URL for the first tab of a sheet
    pub fn export_url(&self, sheet_id: &str) -> String {
        format!(
            "{}/spreadsheets/d/{}/export?format=csv&gid=0",
            self.base_url,
            urlencoding::encode(sheet_id)
        )
    }

    /// Fetch the first tab of a sheet as CSV text
    pub async fn fetch_csv(&self, sheet_id: &str) -> Result<String> {
        let url = self.export_url(sheet_id);
        debug!(sheet_id, url = %url, "Fetching sheet export");

        let response = self.http.get(&url).send().await?;
        let status = response.status();

        if !status.is_success() {
            warn!(sheet_id, status = %status, "Sheet export failed");
            return Err(SheetsError::from_status(status));
        }

        let csv = response.text().await?;
        debug!(sheet_id, size = csv.len(), "Fetched sheet export");
        Ok(csv)
    }
}
