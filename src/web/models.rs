// API-specific data models for the web server

use serde::Serialize;

/// A PDF received through the multipart upload, held in memory for one request.
#[derive(Debug, Clone)]
pub struct UploadedPdf {
    /// Filename as sent by the client, or a fallback when none was given.
    pub file_name: String,
    pub content_type: Option<String>,
    pub data: Vec<u8>,
}

impl UploadedPdf {
    /// Name of the processed file handed back to the client.
    pub fn output_file_name(&self) -> String {
        format!("compressed-{}", self.file_name)
    }
}

/// Response body for GET /health
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct HealthResponse {
    pub status: String,
}

impl HealthResponse {
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
        }
    }
}
