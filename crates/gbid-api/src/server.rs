//! HTTP server for the GBID API
//!
//! Provides /health, /api/sheets, /api/claude and /api/cache-status.

use crate::convert::prepare_sheet;
use crate::error::ApiError;
use crate::prompt;
use crate::sources::{SheetSource, TextGenerator};
use crate::types::{
    CacheStatusQuery, CacheStatusUsage, CachedSheetStatus, ConvertRequest, ConvertResponse,
    HealthResponse, SheetsRequest, SheetsResponse, UncachedSheetStatus,
};
use axum::{
    extract::{rejection::JsonRejection, Query, State},
    http::{header, Method},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use chrono::{DateTime, Utc};
use freshness_cache::FreshnessCache;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};

/// Shared state for the HTTP server
pub struct ServerState {
    pub cache: FreshnessCache,
    pub sheets: Arc<dyn SheetSource>,
    /// `None` when no API key is configured
    pub generator: Option<Arc<dyn TextGenerator>>,
    pub started_at: DateTime<Utc>,
}

impl ServerState {
    pub fn new(
        cache: FreshnessCache,
        sheets: Arc<dyn SheetSource>,
        generator: Option<Arc<dyn TextGenerator>>,
    ) -> Self {
        Self {
            cache,
            sheets,
            generator,
            started_at: Utc::now(),
        }
    }
}

pub type SharedState = Arc<ServerState>;

/// Create the HTTP router
pub fn create_router(state: SharedState) -> Router {
    // Answers every OPTIONS request itself
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .route("/health", get(health))
        .route("/api/sheets", post(fetch_sheet))
        .route("/api/claude", post(convert))
        .route("/api/cache-status", get(cache_status))
        .layer(cors)
        .with_state(state)
}

/// Start the HTTP server and run until ctrl-c
pub async fn start_server(state: SharedState, port: u16) -> std::io::Result<()> {
    let router = create_router(state);
    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));
    info!("Starting HTTP server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutdown signal received"),
        Err(e) => {
            warn!(error = %e, "Failed to listen for ctrl-c, running until killed");
            std::future::pending::<()>().await;
        }
    }
}

/// Health check endpoint
async fn health(State(state): State<SharedState>) -> Json<HealthResponse> {
    let cache_stats = state.cache.stats().await;
    let uptime_secs = (Utc::now() - state.started_at).num_seconds().max(0) as u64;

    Json(HealthResponse {
        status: "ok".to_string(),
        uptime_secs,
        cache: cache_stats,
    })
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Fetch a sheet as CSV without touching the cache
async fn fetch_sheet(
    State(state): State<SharedState>,
    payload: Result<Json<SheetsRequest>, JsonRejection>,
) -> Result<Json<SheetsResponse>, ApiError> {
    let Json(req) = payload?;
    let sheet_id = non_empty(req.sheet_id)
        .ok_or_else(|| ApiError::BadRequest("Sheet ID is required".to_string()))?;

    info!(sheet_id = %sheet_id, "Fetching sheet");
    let csv_data = state.sheets.fetch_csv(&sheet_id).await?;
    let row_count = gsheets_csv::row_count(&csv_data);

    Ok(Json(SheetsResponse {
        csv_data,
        row_count,
        message: "Google Sheets data retrieved successfully".to_string(),
    }))
}

/// Convert a material list to GBIDs using the cached sheet
async fn convert(
    State(state): State<SharedState>,
    payload: Result<Json<ConvertRequest>, JsonRejection>,
) -> Result<Json<ConvertResponse>, ApiError> {
    let Json(req) = payload?;
    let (sheet_id, material_input) =
        match (non_empty(req.sheet_id), non_empty(req.material_input)) {
            (Some(sheet_id), Some(material_input)) => (sheet_id, material_input),
            _ => return Err(ApiError::BadRequest("Missing required fields".to_string())),
        };

    let generator = state
        .generator
        .as_ref()
        .ok_or_else(|| ApiError::NotConfigured("Claude API key not configured".to_string()))?;

    let prepared = prepare_sheet(&state.cache, state.sheets.as_ref(), &sheet_id).await?;
    let prompt = prompt::render(&prepared.template, &prepared.csv_data, &material_input);

    info!(sheet_id = %sheet_id, prompt_len = prompt.len(), "Requesting conversion");
    let result = generator.generate(&prompt).await?;

    Ok(Json(ConvertResponse {
        result,
        cache_status: prepared.outcome,
    }))
}

/// Report what is cached for a sheet
async fn cache_status(
    State(state): State<SharedState>,
    Query(query): Query<CacheStatusQuery>,
) -> Response {
    let Some(sheet_id) = non_empty(query.sheet_id) else {
        return Json(CacheStatusUsage::default()).into_response();
    };

    match state.cache.status(&sheet_id).await {
        Some(status) => Json(CachedSheetStatus::new(sheet_id, status)).into_response(),
        None => Json(UncachedSheetStatus::new(sheet_id)).into_response(),
    }
}
