//! Waste classification upload
//!
//! POST /api/classify with a multipart `file` field (jpg, jpeg or png).
//! The upload's file name is the duplicate-suppression key: resubmitting
//! the same file name is classified again but not scored again.

use std::path::Path;

use axum::{
    extract::{Multipart, State},
    http::{header, HeaderMap},
    response::IntoResponse,
    Json,
};
use ecomind_common::Error;
use tracing::info;

use crate::api::session::{session_cookie, session_id_from_headers};
use crate::{ApiError, ApiResult, AppState};

/// Accepted upload extensions (case-insensitive)
pub const ALLOWED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png"];

/// Multipart field carrying the image
pub const UPLOAD_FIELD: &str = "file";

struct Upload {
    file_name: String,
    bytes: Vec<u8>,
}

pub fn has_allowed_extension(file_name: &str) -> bool {
    Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map_or(false, |ext| {
            ALLOWED_EXTENSIONS
                .iter()
                .any(|allowed| ext.eq_ignore_ascii_case(allowed))
        })
}

async fn read_upload(multipart: &mut Multipart) -> ApiResult<Upload> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }

        let file_name = field
            .file_name()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .ok_or_else(|| Error::Validation("Uploaded file has no name.".to_string()))?;

        if !has_allowed_extension(&file_name) {
            return Err(Error::Validation(format!(
                "Unsupported file type: {} (allowed: {})",
                file_name,
                ALLOWED_EXTENSIONS.join(", ")
            ))
            .into());
        }

        let bytes = field.bytes().await?.to_vec();
        return Ok(Upload { file_name, bytes });
    }

    Err(Error::Validation("Please upload a photo of a waste item.".to_string()).into())
}

/// POST /api/classify
///
/// Classification runs before the session is touched, so a decode or model
/// failure leaves the score and last-seen upload unchanged.
pub async fn classify_upload(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> ApiResult<impl IntoResponse> {
    let Upload { file_name, bytes } = read_upload(&mut multipart).await?;

    let classifier = state.classifier.clone();
    let classification = tokio::task::spawn_blocking(move || classifier.classify_bytes(&bytes))
        .await
        .map_err(|e| ApiError::Internal(format!("classification task failed: {}", e)))??;

    let (id, outcome) = state
        .sessions
        .with_session(session_id_from_headers(&headers), |ctx| {
            ctx.record_classification(&file_name, classification)
        })
        .await;

    info!(
        session = %id,
        file = %file_name,
        label = %outcome.label_text,
        applied = outcome.applied,
        score = outcome.score,
        "Classified upload"
    );

    Ok(([(header::SET_COOKIE, session_cookie(id))], Json(outcome)))
}
