// Error types for the API server and their JSON rendering.

use crate::config::RunMode;
use crate::storage::ScratchError;
use axum::{
    Json,
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::any::Any;
use tracing::error;

/// API server error types
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    NotFound(String),
    Conflict(String),
    PayloadTooLarge(String),
    UnsupportedMediaType(String),

    /// Compression or watermarking failed. `details` is already filtered
    /// through the run mode.
    ProcessingFailed { details: String },

    /// Anything else; the message is already filtered through the run mode.
    InternalServerError(String),
}

impl ApiError {
    pub fn from_scratch(err: ScratchError, run_mode: RunMode) -> Self {
        match err {
            ScratchError::InvalidName(name) => {
                Self::BadRequest(format!("Invalid file name: {:?}", name))
            }
            ScratchError::NotFound(_) => Self::NotFound("File not found".to_string()),
            ScratchError::InUse(_) => {
                Self::Conflict("File is already being downloaded".to_string())
            }
            ScratchError::Io(e) => {
                error!("Scratch storage I/O error: {}", e);
                Self::InternalServerError(run_mode.detail(e))
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, json!({ "error": msg })),
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, json!({ "error": msg })),
            Self::Conflict(msg) => (StatusCode::CONFLICT, json!({ "error": msg })),
            Self::PayloadTooLarge(msg) => (StatusCode::PAYLOAD_TOO_LARGE, json!({ "error": msg })),
            Self::UnsupportedMediaType(msg) => {
                (StatusCode::UNSUPPORTED_MEDIA_TYPE, json!({ "error": msg }))
            }
            Self::ProcessingFailed { details } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "error": "Compression failed", "details": details }),
            ),
            Self::InternalServerError(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "error": "Server error", "message": msg }),
            ),
        };

        (status, Json(body)).into_response()
    }
}

impl From<MultipartError> for ApiError {
    fn from(err: MultipartError) -> Self {
        match err.status() {
            StatusCode::PAYLOAD_TOO_LARGE => Self::PayloadTooLarge(err.body_text()),
            _ => Self::BadRequest(format!("Invalid multipart request: {}", err.body_text())),
        }
    }
}

/// Last-resort handler for panics escaping a route.
pub fn panic_response(
    run_mode: RunMode,
) -> impl Fn(Box<dyn Any + Send + 'static>) -> Response + Clone + Send + Sync + 'static {
    move |payload: Box<dyn Any + Send + 'static>| {
        let message = if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else if let Some(s) = payload.downcast_ref::<&str>() {
            s.to_string()
        } else {
            "unknown panic payload".to_string()
        };
        error!("Unhandled panic while serving request: {}", message);

        ApiError::InternalServerError(run_mode.detail(message)).into_response()
    }
}
