use thiserror::Error;

/// Failures raised while compressing or watermarking a document.
#[derive(Error, Debug)]
pub enum PdfError {
    #[error("input does not start with a %PDF signature")]
    NotAPdf,

    #[error("encrypted PDF documents are not supported")]
    Encrypted,

    #[error("document has no pages")]
    NoPages,

    #[error("malformed PDF: {0}")]
    Malformed(String),

    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
