// Web server module
// Handles the HTTP API for compressing, watermarking and downloading PDFs

mod app;
mod error;
mod extract_request_data;
mod handlers;
mod headers;
mod listeners;
mod models;

pub use app::create_app;
pub use listeners::create_listener;

use crate::config::RunMode;
use crate::pdf::PdfPipeline;
use crate::storage::ScratchStore;
use std::sync::Arc;

// Maximum allowed size of an uploaded PDF
pub const MAX_UPLOAD_SIZE_BYTES: usize = 10 * 1024 * 1024; // 10MB

// Room for multipart boundaries, part headers and small extra fields
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

pub type SharedPipeline = Arc<PdfPipeline>;

/// State shared by all handlers.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: SharedPipeline,
    pub scratch: ScratchStore,
    pub run_mode: RunMode,
}
