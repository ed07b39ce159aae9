//! Rule-based invoice parser: extraction, line-item recovery, normalization.

use std::time::Instant;

use serde::Serialize;
use tracing::{debug, info};

use crate::error::Result;
use crate::models::invoice::InvoiceRecord;

use super::fields::{extract_fields, text_lines};
use super::line_items::reconstruct_line_items;
use super::normalize::normalize_fields;

/// Result of invoice extraction.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionResult {
    /// Normalized invoice record.
    pub record: InvoiceRecord,
    /// Extraction and consistency warnings.
    pub warnings: Vec<String>,
    /// Scalar fields no rule matched, by wire name.
    pub missing_fields: Vec<String>,
    /// Processing time in milliseconds.
    pub processing_time_ms: u64,
}

/// Trait for invoice parsing.
pub trait InvoiceParser {
    /// Parse an invoice from OCR text.
    fn parse(&self, text: &str) -> Result<ExtractionResult>;
}

/// Deterministic parser built on the label rules and the row matcher.
#[derive(Debug, Clone, Default)]
pub struct RuleBasedParser {
    validate_totals: bool,
}

impl RuleBasedParser {
    /// Create a parser with totals validation disabled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Report arithmetic inconsistencies as warnings.
    pub fn with_totals_validation(mut self, validate: bool) -> Self {
        self.validate_totals = validate;
        self
    }

    /// Run the pipeline without timing or warnings.
    pub fn extract(&self, text: &str) -> InvoiceRecord {
        let fields = extract_fields(text);
        let line_items = reconstruct_line_items(&text_lines(text), fields.total);
        normalize_fields(fields.with_line_items(line_items))
    }
}

impl InvoiceParser for RuleBasedParser {
    fn parse(&self, text: &str) -> Result<ExtractionResult> {
        let start = Instant::now();

        info!("Parsing invoice from {} characters of text", text.len());

        let fields = extract_fields(text);
        let missing_fields: Vec<String> = fields
            .missing_fields()
            .into_iter()
            .map(str::to_string)
            .collect();

        let mut warnings: Vec<String> = missing_fields
            .iter()
            .map(|name| format!("Could not extract {}", name))
            .collect();

        let line_items = reconstruct_line_items(&text_lines(text), fields.total);
        let record = normalize_fields(fields.with_line_items(line_items));

        if self.validate_totals {
            warnings.extend(record.validate());
        } else if record.is_fallback_only() {
            warnings.push("No line items recovered, using invoice total".to_string());
        }

        debug!(
            "Extracted invoice {:?} with {} line items and {} warnings",
            record.invoice_number(),
            record.line_items().len(),
            warnings.len()
        );

        Ok(ExtractionResult {
            record,
            warnings,
            missing_fields,
            processing_time_ms: start.elapsed().as_millis() as u64,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::invoice::{LineItem, FALLBACK_DESCRIPTION};
    use pretty_assertions::assert_eq;
    use rust_decimal::Decimal;
    use serde_json::json;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    const ACME: &str = "Acme Supplies\n\
        Invoice Number: INV-1002\n\
        Invoice Date: 03/04/2024\n\
        Widget A    2 x 10.00\n\
        Subtotal 20.00\n\
        Tax 1.60\n\
        Total 21.60\n";

    #[test]
    fn test_parse_basic_invoice() {
        let result = RuleBasedParser::new().parse(ACME).unwrap();
        let record = &result.record;

        assert_eq!(record.vendor(), "Acme Supplies");
        assert_eq!(record.invoice_number(), Some("INV-1002"));
        assert_eq!(record.invoice_date(), Some("2024-03-04"));
        assert_eq!(record.subtotal(), dec("20.00"));
        assert_eq!(record.tax(), dec("1.60"));
        assert_eq!(record.total(), dec("21.60"));
        assert_eq!(
            record.line_items(),
            &[LineItem::with_total("Widget A", dec("2"), dec("10.00"), dec("20.00"))]
        );
        assert!(result.missing_fields.is_empty());
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_wire_output() {
        let record = RuleBasedParser::new().extract(ACME);
        assert_eq!(
            serde_json::to_value(&record).unwrap(),
            json!({
                "vendor": "Acme Supplies",
                "invoiceNumber": "INV-1002",
                "invoiceDate": "2024-03-04",
                "subtotal": 20.0,
                "tax": 1.6,
                "total": 21.6,
                "lineItems": [
                    {"description": "Widget A", "quantity": 2.0, "unitPrice": 10.0, "lineTotal": 20.0}
                ]
            })
        );
    }

    #[test]
    fn test_fallback_line_item() {
        let result = RuleBasedParser::new()
            .parse("Globex Corp\nInvoice # G-77\nTotal: $250")
            .unwrap();
        let record = &result.record;

        assert_eq!(record.total(), dec("250"));
        assert_eq!(
            record.line_items(),
            &[LineItem::with_total(FALLBACK_DESCRIPTION, Decimal::ONE, dec("250"), dec("250"))]
        );
        assert!(record.is_fallback_only());
        assert!(result
            .warnings
            .iter()
            .any(|w| w.contains("No line items recovered")));
    }

    #[test]
    fn test_empty_text_still_produces_record() {
        let result = RuleBasedParser::new().parse("").unwrap();
        assert_eq!(result.record.vendor(), "");
        assert_eq!(result.record.total(), Decimal::ZERO);
        assert_eq!(result.record.line_items().len(), 1);
        assert_eq!(result.missing_fields.len(), 6);
    }

    #[test]
    fn test_totals_validation_reports_mismatch() {
        let text = "Acme Supplies\nInvoice Number: 9\nDate: 1/2/2024\n\
            Widget A    2 x 10.00\nSubtotal 25.00\nTax 0\nTotal 30.00";

        let quiet = RuleBasedParser::new().parse(text).unwrap();
        assert!(quiet.warnings.is_empty());

        let checked = RuleBasedParser::new()
            .with_totals_validation(true)
            .parse(text)
            .unwrap();
        assert!(checked.warnings.iter().any(|w| w.contains("differs from subtotal")));
        assert!(checked.warnings.iter().any(|w| w.contains("30.00")));
    }

    #[test]
    fn test_missing_fields_become_warnings() {
        let result = RuleBasedParser::new().parse("Vendor Only\nTotal 5").unwrap();
        assert_eq!(
            result.missing_fields,
            vec!["invoiceNumber", "invoiceDate", "subtotal", "tax"]
        );
        assert!(result.warnings.contains(&"Could not extract invoiceDate".to_string()));
    }
}
