//! Core library for invoice extraction.
//!
//! This crate provides:
//! - Rule-based field extraction from raw OCR text (vendor, number, date, totals)
//! - Line-item reconstruction from flattened table text
//! - Schema normalization of generative parser JSON into the same record
//! - Text sources for plain-text OCR dumps and PDF text layers

pub mod error;
pub mod invoice;
pub mod models;
pub mod source;

pub use error::{InvexError, Result, SourceError};
pub use invoice::{
    classify_llm_payload, extract_fields, normalize_fields, normalize_from_raw_json,
    reconstruct_line_items, ExtractionResult, InvoiceParser, PartialInvoiceFields,
    RuleBasedParser,
};
pub use models::amount::Amount;
pub use models::config::{GenerativeConfig, GenerativeSettings, InvexConfig};
pub use models::invoice::{InvoiceRecord, LineItem, FALLBACK_DESCRIPTION};
pub use source::{read_text, source_for_path, PlainTextSource, TextSource};
#[cfg(feature = "pdf")]
pub use source::PdfTextSource;
