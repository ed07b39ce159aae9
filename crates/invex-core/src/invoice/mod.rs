//! Invoice field extraction and schema normalization.

pub mod fields;
pub mod line_items;
pub mod normalize;
mod parser;
pub mod rules;
pub mod validation;

pub use fields::{extract_fields, text_lines, PartialInvoiceFields};
pub use line_items::{match_rows, parse_row, reconstruct_line_items};
pub use normalize::{normalize_fields, normalize_from_raw_json};
pub use parser::{ExtractionResult, InvoiceParser, RuleBasedParser};
pub use validation::{classify_llm_payload, strip_code_fence};
