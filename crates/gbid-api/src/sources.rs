//! Upstream seams used by the request handlers

use anthropic_messages::{AnthropicError, MessagesClient};
use async_trait::async_trait;
use gsheets_csv::{SheetsClient, SheetsError};

/// Where raw sheet data comes from
#[async_trait]
pub trait SheetSource: Send + Sync {
    async fn fetch_csv(&self, sheet_id: &str) -> Result<String, SheetsError>;
}

/// Text generation backend
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, AnthropicError>;
}

#[async_trait]
impl SheetSource for SheetsClient {
    async fn fetch_csv(&self, sheet_id: &str) -> Result<String, SheetsError> {
        SheetsClient::fetch_csv(self, sheet_id).await
    }
}

#[async_trait]
impl TextGenerator for MessagesClient {
    async fn generate(&self, prompt: &str) -> Result<String, AnthropicError> {
        self.complete(prompt).await
    }
}
