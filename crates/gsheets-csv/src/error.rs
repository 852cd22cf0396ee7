//! Error types for the sheet export client

use std::fmt;

#[derive(Debug)]
pub enum SheetsError {
    /// The export endpoint answered 404
    NotFound,
    /// The export endpoint answered 403
    AccessDenied,
    /// Any other non-success status
    Upstream { status: u16, reason: String },
    Http(Box<reqwest::Error>),
}

impl SheetsError {
    /// Classify a non-success upstream status
    pub fn from_status(status: reqwest::StatusCode) -> Self {
        match status {
            reqwest::StatusCode::NOT_FOUND => SheetsError::NotFound,
            reqwest::StatusCode::FORBIDDEN => SheetsError::AccessDenied,
            other => SheetsError::Upstream {
                status: other.as_u16(),
                reason: other.canonical_reason().unwrap_or_default().to_string(),
            },
        }
    }
}

impl fmt::Display for SheetsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SheetsError::NotFound => write!(
                f,
                "Sheet not found. Make sure the sheet is public and the ID is correct."
            ),
            SheetsError::AccessDenied => write!(
                f,
                "Access denied. Make sure the sheet is set to \"Anyone with the link can view\"."
            ),
            SheetsError::Upstream { status, reason } => {
                write!(f, "Failed to fetch sheet: {} {}", status, reason)
            }
            SheetsError::Http(err) => write!(f, "HTTP error: {}", err),
        }
    }
}

impl std::error::Error for SheetsError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SheetsError::Http(err) => Some(err.as_ref()),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for SheetsError {
    fn from(err: reqwest::Error) -> Self {
        SheetsError::Http(Box::new(err))
    }
}

pub type Result<T> = std::result::Result<T, SheetsError>;
