//! Minimal client for the Anthropic Messages API
//!
//! Sends a single user turn and returns the text of the first content block.
//!
//! # Example
//!
//! ```no_run
//! use anthropic_messages::MessagesClient;
//!
//! # async fn example() -> Result<(), anthropic_messages::AnthropicError> {
//! let client = MessagesClient::new("sk-ant-...");
//! let text = client.complete("List three conduit sizes").await?;
//! println!("{}", text);
//! # Ok(())
//! # }
//! ```

mod client;
mod error;
mod types;

pub use client::MessagesClient;
pub use error::{AnthropicError, Result};
pub use types::{ContentBlock, Message, MessagesRequest, MessagesResponse, Usage};
