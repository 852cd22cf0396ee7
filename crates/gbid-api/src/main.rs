//! GBID API - converts material lists to GBIDs
//!
//! Fetches a public Google Sheet as CSV, caches it together with the prompt
//! template built from it, and asks Claude to produce the GBID list.

mod config;
mod convert;
mod error;
mod prompt;
mod server;
mod sources;
mod types;

use crate::config::ServerConfig;
use crate::error::{Result, ServerError};
use crate::server::{start_server, ServerState, SharedState};
use crate::sources::TextGenerator;
use anthropic_messages::MessagesClient;
use freshness_cache::FreshnessCache;
use gsheets_csv::SheetsClient;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let env_filter = EnvFilter::from_default_env().add_directive("gbid_api=info".parse()?);

    // Use JSON format for GCP Cloud Logging when LOG_FORMAT=json
    if std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false)
    {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_stackdriver::layer())
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    };

    info!("Starting GBID API...");

    let config = ServerConfig::from_env()?;
    info!("Port: {}", config.port);
    info!("Cache persistence: {:?}", config.persistence);
    info!(
        "Cache max age: {}s, sweep every {}s",
        config.cache_max_age_secs, config.cache_sweep_interval_secs
    );

    let cache =
        FreshnessCache::open(config.cache_config(), config.persistence.clone().into_store()).await;
    cache.start_reaper();
    info!("Cache loaded with {} sheets", cache.len().await);

    let sheets = Arc::new(SheetsClient::with_base_url(&config.sheets_base_url));

    let generator: Option<Arc<dyn TextGenerator>> = match &config.claude_api_key {
        Some(key) => Some(Arc::new(
            MessagesClient::new(key.clone())
                .with_base_url(&config.anthropic_base_url)
                .with_model(&config.claude_model),
        )),
        None => {
            warn!("CLAUDE_API_KEY is not set, /api/claude will return errors");
            None
        }
    };

    let state: SharedState = Arc::new(ServerState::new(cache, sheets, generator));

    // Runs until ctrl-c
    let served = start_server(state.clone(), config.port)
        .await
        .map_err(ServerError::from);

    state.cache.stop();
    info!("GBID API stopped");

    served
}
