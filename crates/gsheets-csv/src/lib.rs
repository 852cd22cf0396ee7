//! Google Sheets CSV export client
//!
//! Downloads a publicly shared sheet through the `export?format=csv`
//! endpoint and classifies upstream failures (missing sheet, sharing not
//! enabled, anything else).

pub mod client;
pub mod error;

pub use client::{row_count, SheetsClient};
pub use error::{Result, SheetsError};
