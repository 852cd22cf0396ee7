//! Messages API HTTP client

use crate::error::{AnthropicError, Result};
use crate::types::{Message, MessagesRequest, MessagesResponse};
use std::time::Duration;
use tracing::{debug, error};

/// Client for the Anthropic Messages API
pub struct MessagesClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
    max_tokens: u32,
}

impl MessagesClient {
    /// Production API host
    pub const DEFAULT_BASE_URL: &'static str = "https://api.anthropic.com";
    pub const DEFAULT_MODEL: &'static str = "claude-sonnet-4-20250514";
    pub const DEFAULT_MAX_TOKENS: u32 = 4000;
    pub const API_VERSION: &'static str = "2023-06-01";

    /// Create a client with default settings (120 second timeout)
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_timeout(api_key, Duration::from_secs(120))
    }

    fn with_timeout(api_key: impl Into<String>, timeout: Duration) -> Self {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            http,
            api_key: api_key.into(),
            base_url: Self::DEFAULT_BASE_URL.to_string(),
            model: Self::DEFAULT_MODEL.to_string(),
            max_tokens: Self::DEFAULT_MAX_TOKENS,
        }
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Send `prompt` as a single user message and return the full response
    pub async fn send(&self, prompt: &str) -> Result<MessagesResponse> {
        let url = format!("{}/v1/messages", self.base_url);
        let request = MessagesRequest {
            model: self.model.clone(),
            max_tokens: self.max_tokens,
            messages: vec![Message::user(prompt)],
        };

        debug!(model = %self.model, prompt_len = prompt.len(), "Calling Messages API");

        let response = self
            .http
            .post(&url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", Self::API_VERSION)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            error!(status = %status, body = %body, "Messages API error");
            return Err(AnthropicError::Api {
                status: status.as_u16(),
                body,
            });
        }

        Ok(serde_json::from_str(&body)?)
    }

    /// Send `prompt` and return the text of the first text block
    pub async fn complete(&self, prompt: &str) -> Result<String> {
        let response = self.send(prompt).await?;
        let text = response
            .first_text()
            .ok_or(AnthropicError::EmptyResponse)?
            .to_string();

        debug!(response_len = text.len(), "Messages API response received");
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        http::{HeaderMap, StatusCode},
        response::{IntoResponse, Response},
        routing::post,
        Json, Router,
    };
    use serde_json::{json, Value};

    async fn messages(headers: HeaderMap, Json(body): Json<Value>) -> Response {
        if headers.get("x-api-key").and_then(|v| v.to_str().ok()) != Some("good-key") {
            return (StatusCode::UNAUTHORIZED, "invalid x-api-key").into_response();
        }
        if headers.get("anthropic-version").and_then(|v| v.to_str().ok()) != Some("2023-06-01") {
            return StatusCode::BAD_REQUEST.into_response();
        }

        let prompt = body["messages"][0]["content"].as_str().unwrap_or_default();
        if prompt == "silence" {
            return Json(json!({ "content": [] })).into_response();
        }

        Json(json!({
            "id": "msg_test",
            "model": body["model"],
            "content": [{ "type": "text", "text": format!("echo: {}", prompt) }],
            "stop_reason": "end_turn",
            "usage": { "input_tokens": 3, "output_tokens": 2 }
        }))
        .into_response()
    }

    async fn spawn_upstream() -> String {
        let app = Router::new().route("/v1/messages", post(messages));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    #[test]
    fn test_defaults() {
        let client = MessagesClient::new("key");
        assert_eq!(client.model, "claude-sonnet-4-20250514");
        assert_eq!(client.max_tokens, 4000);
        assert_eq!(client.base_url, "https://api.anthropic.com");
    }

    #[tokio::test]
    async fn test_complete() {
        let base = spawn_upstream().await;
        let client = MessagesClient::new("good-key").with_base_url(&base);

        let text = client.complete("hello").await.unwrap();
        assert_eq!(text, "echo: hello");
    }

    #[tokio::test]
    async fn test_send_reports_model() {
        let base = spawn_upstream().await;
        let client = MessagesClient::new("good-key")
            .with_base_url(&base)
            .with_model("claude-test");

        let response = client.send("hi").await.unwrap();
        assert_eq!(response.model.as_deref(), Some("claude-test"));
    }

    #[tokio::test]
    async fn test_api_error() {
        let base = spawn_upstream().await;
        let client = MessagesClient::new("bad-key").with_base_url(&base);

        let err = client.complete("hello").await.unwrap_err();
        assert!(matches!(err, AnthropicError::Api { status: 401, .. }));
        assert_eq!(err.to_string(), "Claude API error: 401 - invalid x-api-key");
    }

    #[tokio::test]
    async fn test_empty_response() {
        let base = spawn_upstream().await;
        let client = MessagesClient::new("good-key").with_base_url(&base);

        let err = client.complete("silence").await.unwrap_err();
        assert!(matches!(err, AnthropicError::EmptyResponse));
    }
}
