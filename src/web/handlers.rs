// API handlers for the web server

use super::{
    AppState,
    error::ApiError,
    extract_request_data::extract_uploaded_pdf,
    headers::AttachmentFilename,
    models::HealthResponse,
};
use axum::{
    Json,
    body::Body,
    extract::{Path, Request, State},
    http::{HeaderValue, header},
    response::{IntoResponse, Response},
};
use axum_extra::TypedHeader;
use tracing::{debug, error, info};
use uuid::Uuid;

const PDF_CONTENT_TYPE: HeaderValue = HeaderValue::from_static("application/pdf");
const OCTET_STREAM_CONTENT_TYPE: HeaderValue =
    HeaderValue::from_static("application/octet-stream");

// --- POST /compress ---
// Compresses and watermarks the uploaded PDF, returning it as an attachment
pub async fn compress_pdf(
    State(state): State<AppState>,
    request: Request,
) -> Result<Response, ApiError> {
    let request_id = Uuid::new_v4();

    let upload = extract_uploaded_pdf(request).await?;
    let output_file_name = upload.output_file_name();
    info!(
        "Compress request: request_id={}, file_name={:?}, content_type={:?}, size={}",
        request_id,
        upload.file_name,
        upload.content_type,
        upload.data.len()
    );

    let pipeline = state.pipeline.clone();
    let data = upload.data;
    let processed = match tokio::task::spawn_blocking(move || pipeline.process(&data)).await {
        Ok(result) => result,
        // Let the panic reach the catch-all layer.
        Err(e) if e.is_panic() => std::panic::resume_unwind(e.into_panic()),
        Err(e) => {
            error!("PDF processing task failed: request_id={}, error={}", request_id, e);
            return Err(ApiError::InternalServerError(state.run_mode.detail(e)));
        }
    }
    .map_err(|e| {
        error!("Compression failed: request_id={}, error={}", request_id, e);
        ApiError::ProcessingFailed {
            details: state.run_mode.detail(&e),
        }
    })?;

    debug!(
        "Compress completed: request_id={}, pages={}, {} -> {} -> {} bytes",
        request_id,
        processed.page_count,
        processed.original_size,
        processed.compressed_size,
        processed.data.len()
    );

    Ok((
        [(header::CONTENT_TYPE, PDF_CONTENT_TYPE)],
        TypedHeader(AttachmentFilename(output_file_name)),
        processed.data,
    )
        .into_response())
}

// --- GET /download/{filename} ---
// Streams a scratch file once; it is deleted shortly after the transfer completes
pub async fn download_file(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> Result<Response, ApiError> {
    let download = state
        .scratch
        .open_download(&filename)
        .await
        .map_err(|e| {
            debug!("Download of {:?} refused: {}", filename, e);
            ApiError::from_scratch(e, state.run_mode)
        })?;

    info!(
        "Download request: file_name={:?}, size={}",
        download.name(),
        download.len()
    );

    let content_length = HeaderValue::from(download.len());
    Ok((
        [
            (header::CONTENT_TYPE, OCTET_STREAM_CONTENT_TYPE),
            (header::CONTENT_LENGTH, content_length),
        ],
        TypedHeader(AttachmentFilename(filename)),
        Body::from_stream(download.into_stream()),
    )
        .into_response())
}

// --- GET /health ---
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}
