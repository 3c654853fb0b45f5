//! Health check endpoint

use axum::{extract::State, routing::get, Json, Router};
use chrono::Utc;
use serde::Serialize;

use crate::AppState;

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// "ok", or "degraded" when no classifier model is loaded
    pub status: String,
    pub module: String,
    pub version: String,
    pub uptime_seconds: u64,
    pub model_loaded: bool,
    pub active_sessions: usize,
}

/// GET /health
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let uptime = Utc::now().signed_duration_since(state.startup_time);
    let model_loaded = state.classifier.is_available();

    Json(HealthResponse {
        status: if model_loaded { "ok" } else { "degraded" }.to_string(),
        module: "ecomind-ui".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: uptime.num_seconds().max(0) as u64,
        model_loaded,
        active_sessions: state.sessions.len().await,
    })
}

/// Build health check routes
pub fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
