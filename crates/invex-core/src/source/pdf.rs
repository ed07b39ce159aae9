//! PDF text layer extraction using lopdf and pdf-extract.

use lopdf::Document;
use tracing::debug;

use super::TextSource;
use crate::error::{Result, SourceError};

/// Reads the embedded text layer of a PDF.
///
/// Scanned PDFs have no text layer; they are reported as
/// [`SourceError::Empty`] so the caller can route them to an OCR engine.
#[derive(Debug, Clone)]
pub struct PdfTextSource {
    min_text_length: usize,
}

impl PdfTextSource {
    pub fn new(min_text_length: usize) -> Self {
        Self { min_text_length }
    }

    /// Load the document, decrypting empty-password PDFs. Returns the bytes
    /// pdf-extract should read.
    fn load(&self, data: &[u8]) -> Result<Vec<u8>> {
        let mut doc = Document::load_mem(data).map_err(|e| SourceError::Parse(e.to_string()))?;

        let bytes = if doc.is_encrypted() {
            if doc.decrypt("").is_err() {
                return Err(SourceError::Encrypted.into());
            }
            debug!("Decrypted PDF with empty password");

            let mut decrypted = Vec::new();
            doc.save_to(&mut decrypted)
                .map_err(|e| SourceError::Parse(format!("Failed to save decrypted PDF: {}", e)))?;
            decrypted
        } else {
            data.to_vec()
        };

        let page_count = doc.get_pages().len();
        if page_count == 0 {
            return Err(SourceError::NoPages.into());
        }

        debug!("Loaded PDF with {} pages", page_count);
        Ok(bytes)
    }
}

impl Default for PdfTextSource {
    fn default() -> Self {
        Self::new(20)
    }
}

impl TextSource for PdfTextSource {
    fn name(&self) -> &'static str {
        "pdf"
    }

    fn extract_text(&self, data: &[u8]) -> Result<String> {
        let bytes = self.load(data)?;
        let text = pdf_extract::extract_text_from_mem(&bytes)
            .map_err(|e| SourceError::TextExtraction(e.to_string()))?;

        let found = text.trim().chars().count();
        if found < self.min_text_length {
            return Err(SourceError::Empty {
                found,
                required: self.min_text_length,
            }
            .into());
        }

        Ok(text)
    }
}
