//! Text sources: the boundary that turns a document into OCR text.
//!
//! Image OCR is an external collaborator. This module only reads text that
//! already exists, either as a plain-text OCR dump or as a PDF text layer.

#[cfg(feature = "pdf")]
mod pdf;

#[cfg(feature = "pdf")]
pub use pdf::PdfTextSource;

use std::path::Path;

use tracing::debug;

use crate::error::{Result, SourceError};
use crate::models::config::SourceConfig;

/// Trait for turning document bytes into text.
pub trait TextSource {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Extract the text content of a document.
    fn extract_text(&self, data: &[u8]) -> Result<String>;
}

/// Plain-text OCR output. Invalid UTF-8 is replaced, never rejected.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainTextSource;

impl TextSource for PlainTextSource {
    fn name(&self) -> &'static str {
        "text"
    }

    fn extract_text(&self, data: &[u8]) -> Result<String> {
        Ok(String::from_utf8_lossy(data).into_owned())
    }
}

/// Pick a text source by file extension.
#[cfg_attr(not(feature = "pdf"), allow(unused_variables))]
pub fn source_for_path(path: &Path, config: &SourceConfig) -> Result<Box<dyn TextSource>> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "txt" | "text" | "ocr" => Ok(Box::new(PlainTextSource)),
        #[cfg(feature = "pdf")]
        "pdf" => Ok(Box::new(PdfTextSource::new(config.min_text_length))),
        "" => Err(SourceError::UnsupportedFormat(path.display().to_string()).into()),
        other => Err(SourceError::UnsupportedFormat(other.to_string()).into()),
    }
}

/// Read a document from disk and extract its text.
pub fn read_text(path: &Path, config: &SourceConfig) -> Result<String> {
    let source = source_for_path(path, config)?;

    let size = std::fs::metadata(path)?.len() as usize;
    if size > config.max_bytes {
        return Err(SourceError::TooLarge {
            size,
            limit: config.max_bytes,
        }
        .into());
    }

    let data = std::fs::read(path)?;
    let text = source.extract_text(&data)?;
    debug!(
        "Read {} chars from {} via {} source",
        text.len(),
        path.display(),
        source.name()
    );
    Ok(text)
}
