//! Field extraction from raw OCR text.

use lazy_static::lazy_static;
use tracing::debug;

use crate::models::amount::Amount;
use crate::models::invoice::LineItem;

use super::rules::patterns::{
    AMOUNT_DUE, GENERIC_DATE, INVOICE_DATE, INVOICE_NUMBER, SUBTOTAL, TAX, TOTAL,
};
use super::rules::{non_blank, normalize_date, parse_currency, FieldExtractor, LabelRule, RuleSet};

lazy_static! {
    static ref INVOICE_NUMBER_RULES: RuleSet<String> = RuleSet::new(vec![
        LabelRule::new("invoice_number", &INVOICE_NUMBER, non_blank),
    ]);

    static ref INVOICE_DATE_RULES: RuleSet<String> = RuleSet::new(vec![
        LabelRule::new("invoice_date", &INVOICE_DATE, normalize_date),
        LabelRule::new("date", &GENERIC_DATE, normalize_date),
    ]);

    static ref SUBTOTAL_RULES: RuleSet<Amount> = RuleSet::new(vec![
        LabelRule::new("subtotal", &SUBTOTAL, parse_currency),
    ]);

    static ref TAX_RULES: RuleSet<Amount> = RuleSet::new(vec![
        LabelRule::new("tax", &TAX, parse_currency),
    ]);

    static ref TOTAL_RULES: RuleSet<Amount> = RuleSet::new(vec![
        LabelRule::new("total", &TOTAL, parse_currency),
        LabelRule::new("amount_due", &AMOUNT_DUE, parse_currency),
    ]);
}

/// Fields recovered from text before normalization.
///
/// Everything is optional; the normalizer decides the defaults.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PartialInvoiceFields {
    pub vendor: Option<String>,
    pub invoice_number: Option<String>,
    /// Date as rewritten by [`normalize_date`]; not yet gated.
    pub invoice_date: Option<String>,
    pub subtotal: Option<Amount>,
    pub tax: Option<Amount>,
    pub total: Option<Amount>,
    /// Line items, possibly empty; filled by the line-item reconstructor.
    pub line_items: Vec<LineItem>,
}

impl PartialInvoiceFields {
    /// Names of the scalar fields no rule matched.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let checks = [
            ("vendor", self.vendor.is_none()),
            ("invoiceNumber", self.invoice_number.is_none()),
            ("invoiceDate", self.invoice_date.is_none()),
            ("subtotal", self.subtotal.is_none()),
            ("tax", self.tax.is_none()),
            ("total", self.total.is_none()),
        ];
        checks
            .into_iter()
            .filter_map(|(name, missing)| missing.then_some(name))
            .collect()
    }

    pub fn with_line_items(mut self, line_items: Vec<LineItem>) -> Self {
        self.line_items = line_items;
        self
    }
}

/// Normalize newlines and split into trimmed, non-empty lines.
pub fn text_lines(text: &str) -> Vec<&str> {
    text.split('\n')
        .map(|l| l.trim_end_matches('\r').trim())
        .filter(|l| !l.is_empty())
        .collect()
}

/// Extract the scalar invoice fields from OCR text. Never fails.
///
/// The vendor is taken to be the first non-empty line, where OCR engines put
/// the letterhead; no plausibility check is made.
pub fn extract_fields(text: &str) -> PartialInvoiceFields {
    let lines = text_lines(text);
    let joined = lines.join("\n");

    let fields = PartialInvoiceFields {
        vendor: lines.first().map(|l| l.to_string()),
        invoice_number: first_value(&INVOICE_NUMBER_RULES, &joined),
        invoice_date: first_value(&INVOICE_DATE_RULES, &joined),
        subtotal: first_value(&SUBTOTAL_RULES, &joined),
        tax: first_value(&TAX_RULES, &joined),
        total: first_value(&TOTAL_RULES, &joined),
        line_items: Vec::new(),
    };

    debug!(
        "Extracted fields from {} lines: number={:?} date={:?} subtotal={:?} tax={:?} total={:?}",
        lines.len(),
        fields.invoice_number,
        fields.invoice_date,
        fields.subtotal,
        fields.tax,
        fields.total
    );

    fields
}

fn first_value<T: std::fmt::Debug>(rules: &RuleSet<T>, text: &str) -> Option<T> {
    let m = rules.extract(text)?;
    debug!("Rule '{}' matched {:?} -> {:?}", m.rule, m.source, m.value);
    Some(m.value)
}
