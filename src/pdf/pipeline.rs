use super::{Compressor, PdfError, StampedPdf, Watermarker, format_file_size};
use std::sync::Arc;
use tracing::info;

/// Output of a full compress + watermark run.
#[derive(Debug)]
pub struct ProcessedPdf {
    pub data: Vec<u8>,
    pub original_size: usize,
    pub compressed_size: usize,
    pub page_count: usize,
}

/// Compress, then watermark. Each stage either succeeds completely or the
/// whole run fails; no partial output escapes.
#[derive(Clone)]
pub struct PdfPipeline {
    compressor: Arc<dyn Compressor>,
    watermarker: Arc<dyn Watermarker>,
}

impl PdfPipeline {
    pub fn new(compressor: Arc<dyn Compressor>, watermarker: Arc<dyn Watermarker>) -> Self {
        Self {
            compressor,
            watermarker,
        }
    }

    pub fn process(&self, input: &[u8]) -> Result<ProcessedPdf, PdfError> {
        let compressed = self.compressor.compress(input)?;
        let StampedPdf {
            data: stamped,
            page_count,
        } = self.watermarker.apply(&compressed)?;

        let compression_ratio = if input.is_empty() {
            100.0
        } else {
            (compressed.len() as f64 / input.len() as f64) * 100.0
        };
        info!(
            "Processed PDF: {} -> {} compressed (reduced by {:.2}%) -> {} watermarked, {} page(s)",
            format_file_size(input.len() as u64),
            format_file_size(compressed.len() as u64),
            100.0 - compression_ratio,
            format_file_size(stamped.len() as u64),
            page_count
        );

        Ok(ProcessedPdf {
            original_size: input.len(),
            compressed_size: compressed.len(),
            page_count,
            data: stamped,
        })
    }
}
