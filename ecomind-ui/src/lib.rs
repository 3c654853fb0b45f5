//! ecomind-ui library - EcoMind web service
//!
//! Waste classification, energy advisories and the session eco score behind
//! a small JSON API and a single static page.

use axum::extract::DefaultBodyLimit;
use axum::Router;
use chrono::{DateTime, Utc};
use ecomind_common::WasteClassifier;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod error;
pub mod sessions;

pub use crate::error::{ApiError, ApiResult};
pub use crate::sessions::SessionStore;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Classifier adapter over the process-wide model
    pub classifier: WasteClassifier,
    /// Per-session contexts keyed by session cookie
    pub sessions: SessionStore,
    /// Request body cap (uploads)
    pub max_upload_bytes: usize,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(classifier: WasteClassifier, sessions: SessionStore, max_upload_bytes: usize) -> Self {
        Self {
            classifier,
            sessions,
            max_upload_bytes,
            startup_time: Utc::now(),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::{get, post};

    let api = Router::new()
        .route(
            "/api/session",
            get(api::get_session).delete(api::end_session),
        )
        .route("/api/classify", post(api::classify_upload))
        .route("/api/energy", post(api::energy_recommendation))
        .route("/api/buildinfo", get(api::get_build_info));

    let public = Router::new()
        .route("/", get(api::serve_index))
        .route("/static/app.js", get(api::serve_app_js))
        .merge(api::health_routes());

    Router::new()
        .merge(api)
        .merge(public)
        .layer(DefaultBodyLimit::max(state.max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
