// Lossless PDF compression using lopdf: drop dead objects, then Flate-compress
// every stream that is not already filtered.

use super::{Compressor, PDF_SIGNATURE, PdfError, format_file_size};
use lopdf::Document;
use tracing::debug;

#[derive(Debug, Clone, Copy, Default)]
pub struct LopdfCompressor;

impl LopdfCompressor {
    pub fn new() -> Self {
        Self
    }
}

impl Compressor for LopdfCompressor {
    fn compress(&self, input: &[u8]) -> Result<Vec<u8>, PdfError> {
        if !input.starts_with(PDF_SIGNATURE) {
            return Err(PdfError::NotAPdf);
        }

        let mut doc = Document::load_mem(input)?;
        if doc.is_encrypted() {
            return Err(PdfError::Encrypted);
        }

        let emptied = doc.delete_zero_length_streams();
        let pruned = doc.prune_objects();
        debug!(
            "Removed {} zero-length stream(s) and {} unreferenced object(s)",
            emptied.len(),
            pruned.len()
        );

        doc.renumber_objects();
        doc.compress();

        let mut output = Vec::with_capacity(input.len());
        doc.save_to(&mut output)?;

        // Rewriting an already optimised file can grow it (e.g. object streams
        // expanded into a plain xref table). Never hand back a bigger file.
        if output.len() >= input.len() {
            debug!(
                "Compression did not reduce size ({} -> {}), keeping original bytes",
                format_file_size(input.len() as u64),
                format_file_size(output.len() as u64)
            );
            return Ok(input.to_vec());
        }

        Ok(output)
    }
}
