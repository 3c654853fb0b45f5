//! Error types for ecomind-ui
//!
//! Maps library errors onto HTTP status codes. Every error body has the
//! shape `{"error": {"code": ..., "message": ...}}` so the page can show it
//! inline.

use axum::{
    extract::{multipart::MultipartError, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use ecomind_common::Error as CommonError;
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Malformed or oversized multipart upload
    #[error("Upload error: {0}")]
    Upload(#[from] MultipartError),

    /// Request body is not valid JSON or does not match the expected shape
    #[error("Invalid request body: {0}")]
    Json(#[from] JsonRejection),

    /// Internal server error (500)
    #[error("Internal server error: {0}")]
    Internal(String),

    /// ecomind-common error
    #[error(transparent)]
    Common(#[from] CommonError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match self {
            ApiError::Upload(err) => (err.status(), "UPLOAD_ERROR", err.body_text()),
            ApiError::Json(err) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", err.body_text()),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", msg),
            ApiError::Common(err) => {
                let (status, code) = match &err {
                    CommonError::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
                    CommonError::ImageDecode(_) => {
                        (StatusCode::UNPROCESSABLE_ENTITY, "IMAGE_DECODE_ERROR")
                    }
                    CommonError::ModelUnavailable(_) => {
                        (StatusCode::SERVICE_UNAVAILABLE, "MODEL_UNAVAILABLE")
                    }
                    CommonError::Io(_) | CommonError::Config(_) | CommonError::Internal(_) => {
                        (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR")
                    }
                };
                (status, code, err.to_string())
            }
        };

        if status.is_server_error() {
            error!("{}: {}", error_code, message);
        } else {
            warn!("{}: {}", error_code, message);
        }

        let body = Json(json!({
            "error": {
                "code": error_code,
                "message": message,
            }
        }));

        (status, body).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
