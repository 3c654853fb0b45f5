//! Energy usage suggestions
//!
//! POST /api/energy with `{"appliance": "...", "hours": 2.5}`. Suggestions
//! are returned on every valid submission; the +5 is granted only when the
//! (appliance, hours) pair differs from the previous one.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header, HeaderMap},
    response::IntoResponse,
    Json,
};
use ecomind_common::advisory::validate_energy_query;
use serde::Deserialize;
use tracing::info;

use crate::api::session::{session_cookie, session_id_from_headers};
use crate::{ApiResult, AppState};

#[derive(Debug, Deserialize)]
pub struct EnergyRequest {
    pub appliance: String,
    pub hours: f64,
}

/// POST /api/energy
pub async fn energy_recommendation(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<EnergyRequest>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Json(request) = payload?;

    // Rejected input must not start or touch a session
    validate_energy_query(&request.appliance, request.hours)?;

    let (id, outcome) = state
        .sessions
        .with_session(session_id_from_headers(&headers), |ctx| {
            ctx.submit_energy_query(&request.appliance, request.hours)
        })
        .await;
    let outcome = outcome?;

    info!(
        session = %id,
        appliance = %request.appliance,
        hours = request.hours,
        applied = outcome.applied,
        suggestions = outcome.suggestions.len(),
        "Energy recommendation"
    );

    Ok(([(header::SET_COOKIE, session_cookie(id))], Json(outcome)))
}
