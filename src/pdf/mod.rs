// PDF processing: compression and watermark stamping, both backed by lopdf.
// The web layer only sees the `Compressor` / `Watermarker` seams and the
// `PdfPipeline` that chains them.

mod compress;
mod error;
mod pipeline;
mod watermark;

pub use compress::LopdfCompressor;
pub use error::PdfError;
pub use pipeline::{PdfPipeline, ProcessedPdf};
pub use watermark::{LopdfWatermarker, RgbColor, WatermarkConfig};

/// Signature every PDF file starts with.
pub const PDF_SIGNATURE: &[u8] = b"%PDF";

/// Reduces the size of a PDF document.
///
/// Implementations are synchronous and CPU-bound; callers run them on a
/// blocking thread.
pub trait Compressor: Send + Sync {
    fn compress(&self, input: &[u8]) -> Result<Vec<u8>, PdfError>;
}

/// A watermarked document and the number of pages that were stamped.
#[derive(Debug)]
pub struct StampedPdf {
    pub data: Vec<u8>,
    pub page_count: usize,
}

/// Stamps a watermark on every page of a PDF document.
pub trait Watermarker: Send + Sync {
    fn apply(&self, input: &[u8]) -> Result<StampedPdf, PdfError>;
}

pub fn format_file_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];

    let mut size = bytes as f64;
    let mut unit = 0;
    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }

    if unit == 0 {
        format!("{} {}", bytes, UNITS[0])
    } else {
        format!("{:.2} {}", size, UNITS[unit])
    }
}
