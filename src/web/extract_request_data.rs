use axum::{
    extract::{FromRequest, Multipart, Request},
    http::header,
};
use tracing::{debug, warn};

use super::{MAX_UPLOAD_SIZE_BYTES, error::ApiError, models::UploadedPdf};
use crate::pdf::format_file_size;

/// Multipart field carrying the document.
pub const PDF_FIELD_NAME: &str = "pdf";
/// Used when the client sends the part without a filename.
pub const FALLBACK_FILE_NAME: &str = "document.pdf";

/// Accepts `application/pdf`, ignoring case and MIME parameters.
pub fn is_pdf_content_type(content_type: Option<&str>) -> bool {
    content_type
        .and_then(|value| value.parse::<mime::Mime>().ok())
        .is_some_and(|mime| {
            mime.type_() == "application" && mime.subtype() == "pdf" && mime.suffix().is_none()
        })
}

/// Pulls the `pdf` field out of a multipart upload, enforcing the content
/// type and size limit while the data streams in.
pub async fn extract_uploaded_pdf(request: Request) -> Result<UploadedPdf, ApiError> {
    let request_content_type = request
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();

    let mut multipart = Multipart::from_request(request, &()).await.map_err(|e| {
        debug!(
            "Rejecting non-multipart upload (Content-Type: {:?})",
            request_content_type
        );
        ApiError::BadRequest(format!(
            "Failed to process multipart request: {}",
            e.body_text()
        ))
    })?;

    let mut upload: Option<UploadedPdf> = None;
    let mut ignored_fields = 0;

    while let Some(mut field) = multipart.next_field().await? {
        if field.name() != Some(PDF_FIELD_NAME) {
            let field_name = field.name().unwrap_or("unnamed").to_string();
            debug!("Ignoring multipart field: {}", field_name);
            ignored_fields += 1;
            continue;
        }

        if upload.is_some() {
            warn!(
                "Multiple '{}' fields found in multipart request, using the last one",
                PDF_FIELD_NAME
            );
        }

        let content_type = field.content_type().map(str::to_string);
        if !is_pdf_content_type(content_type.as_deref()) {
            return Err(ApiError::UnsupportedMediaType(format!(
                "Only PDF files are supported (got {})",
                content_type.as_deref().unwrap_or("no content type")
            )));
        }

        let file_name = field
            .file_name()
            .map(str::to_string)
            .unwrap_or_else(|| FALLBACK_FILE_NAME.to_string());

        let mut data = Vec::new();
        while let Some(chunk) = field.chunk().await? {
            if data.len() + chunk.len() > MAX_UPLOAD_SIZE_BYTES {
                return Err(ApiError::PayloadTooLarge(format!(
                    "PDF exceeds the {} upload limit",
                    format_file_size(MAX_UPLOAD_SIZE_BYTES as u64)
                )));
            }
            data.extend_from_slice(&chunk);
        }

        if data.is_empty() {
            return Err(ApiError::BadRequest(format!(
                "Uploaded '{}' field is empty.",
                PDF_FIELD_NAME
            )));
        }

        debug!(
            "Received {:?} ({}) with content type {:?}",
            file_name,
            format_file_size(data.len() as u64),
            content_type
        );

        upload = Some(UploadedPdf {
            file_name,
            content_type,
            data,
        });
    }

    if ignored_fields > 0 {
        debug!(
            "Ignored {} non-file fields in multipart request",
            ignored_fields
        );
    }

    upload.ok_or_else(|| ApiError::BadRequest("No PDF file uploaded".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pdf_content_type_matching() {
        assert!(is_pdf_content_type(Some("application/pdf")));
        assert!(is_pdf_content_type(Some("Application/PDF")));
        assert!(is_pdf_content_type(Some("application/pdf; charset=binary")));

        assert!(!is_pdf_content_type(None));
        assert!(!is_pdf_content_type(Some("")));
        assert!(!is_pdf_content_type(Some("application/octet-stream")));
        assert!(!is_pdf_content_type(Some("image/png")));
        assert!(!is_pdf_content_type(Some("application/pdf+zip")));
    }

    #[test]
    fn test_output_file_name_is_prefixed_verbatim() {
        let upload = UploadedPdf {
            file_name: "Q3 report (final).pdf".to_string(),
            content_type: Some("application/pdf".to_string()),
            data: vec![1],
        };
        assert_eq!(upload.output_file_name(), "compressed-Q3 report (final).pdf");
    }
}
