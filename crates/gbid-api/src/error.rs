//! Error types for the GBID API

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use std::fmt;

/// Startup and wiring failures
#[derive(Debug)]
pub enum ServerError {
    Io(Box<std::io::Error>),
    Config(String),
}

impl fmt::Display for ServerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServerError::Io(err) => write!(f, "IO error: {}", err),
            ServerError::Config(msg) => write!(f, "Configuration error: {}", msg),
        }
    }
}

impl std::error::Error for ServerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ServerError::Io(err) => Some(err.as_ref()),
            _ => None,
        }
    }
}

impl From<std::io::Error> for ServerError {
    fn from(err: std::io::Error) -> Self {
        ServerError::Io(Box::new(err))
    }
}

impl From<tracing_subscriber::filter::ParseError> for ServerError {
    fn from(err: tracing_subscriber::filter::ParseError) -> Self {
        ServerError::Config(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ServerError>;

/// Request handler error that converts to an HTTP response
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    NotConfigured(String),
    Sheets(gsheets_csv::SheetsError),
    Generation(anthropic_messages::AnthropicError),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::BadRequest(msg) | ApiError::NotConfigured(msg) => write!(f, "{}", msg),
            ApiError::Sheets(err) => write!(f, "{}", err),
            ApiError::Generation(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for ApiError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ApiError::Sheets(err) => Some(err),
            ApiError::Generation(err) => Some(err),
            _ => None,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotConfigured(msg) => {
                tracing::error!(error = %msg, "Service not configured");
                StatusCode::INTERNAL_SERVER_ERROR
            }
            ApiError::Sheets(err) => {
                tracing::error!(error = %err, "Sheet fetch failed");
                StatusCode::INTERNAL_SERVER_ERROR
            }
            ApiError::Generation(err) => {
                tracing::error!(error = %err, "Generation request failed");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        (status, axum::Json(json!({ "error": self.to_string() }))).into_response()
    }
}

impl From<axum::extract::rejection::JsonRejection> for ApiError {
    fn from(rejection: axum::extract::rejection::JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<gsheets_csv::SheetsError> for ApiError {
    fn from(err: gsheets_csv::SheetsError) -> Self {
        ApiError::Sheets(err)
    }
}

impl From<anthropic_messages::AnthropicError> for ApiError {
    fn from(err: anthropic_messages::AnthropicError) -> Self {
        ApiError::Generation(err)
    }
}
