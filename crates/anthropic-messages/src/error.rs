//! Error types for the Messages API client

use std::fmt;

/// Errors that can occur when calling the Messages API
#[derive(Debug)]
pub enum AnthropicError {
    /// HTTP request failed
    Http(reqwest::Error),
    /// Failed to parse JSON response
    Json(serde_json::Error),
    /// Non-success status, with the raw response body
    Api { status: u16, body: String },
    /// The response carried no text content
    EmptyResponse,
}

impl fmt::Display for AnthropicError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Http(e) => write!(f, "Claude HTTP error: {}", e),
            Self::Json(e) => write!(f, "Claude JSON parse error: {}", e),
            Self::Api { status, body } => write!(f, "Claude API error: {} - {}", status, body),
            Self::EmptyResponse => write!(f, "Claude API returned no text content"),
        }
    }
}

impl std::error::Error for AnthropicError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Http(e) => Some(e),
            Self::Json(e) => Some(e),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for AnthropicError {
    fn from(e: reqwest::Error) -> Self {
        Self::Http(e)
    }
}

impl From<serde_json::Error> for AnthropicError {
    fn from(e: serde_json::Error) -> Self {
        Self::Json(e)
    }
}

/// Result type for Messages API operations
pub type Result<T> = std::result::Result<T, AnthropicError>;
