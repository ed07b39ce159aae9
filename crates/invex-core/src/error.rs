//! Error types for the invex-core library.
//!
//! Only [`InvexError::InvalidLlmJson`] can come out of the extraction and
//! normalization engine itself. Everything else belongs to the boundary
//! adapters (text sources, generative backend configuration).

use thiserror::Error;

/// Main error type for the invex library.
#[derive(Error, Debug)]
pub enum InvexError {
    /// A generative parser payload was neither a JSON object nor a string
    /// holding one.
    #[error("invalid LLM JSON: {detail}")]
    InvalidLlmJson { detail: String },

    /// The generative backend is not configured or not reachable.
    #[error("generative backend unavailable: {0}")]
    BackendUnavailable(String),

    /// Text source (OCR boundary) error.
    #[error("text source error: {0}")]
    Source(#[from] SourceError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

impl InvexError {
    pub(crate) fn invalid_json(detail: impl Into<String>) -> Self {
        Self::InvalidLlmJson {
            detail: detail.into(),
        }
    }
}

/// Errors raised while turning a document byte buffer into text.
#[derive(Error, Debug)]
pub enum SourceError {
    /// Failed to open/parse the document.
    #[error("failed to parse document: {0}")]
    Parse(String),

    /// Failed to extract text from the document.
    #[error("failed to extract text: {0}")]
    TextExtraction(String),

    /// The PDF is encrypted and cannot be processed.
    #[error("PDF is encrypted")]
    Encrypted,

    /// The PDF has no pages.
    #[error("PDF has no pages")]
    NoPages,

    /// The document has no usable text layer.
    #[error("document has too little text ({found} chars, need {required})")]
    Empty { found: usize, required: usize },

    /// The input exceeds the configured size limit.
    #[error("input is {size} bytes, limit is {limit}")]
    TooLarge { size: usize, limit: usize },

    /// No text source handles this kind of input.
    #[error("unsupported input format: {0}")]
    UnsupportedFormat(String),
}

/// Result type for the invex library.
pub type Result<T> = std::result::Result<T, InvexError>;
