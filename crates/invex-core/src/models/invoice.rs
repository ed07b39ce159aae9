//! Canonical invoice record emitted by both extraction paths.

use chrono::NaiveDate;
use serde::Serialize;

use super::amount::Amount;

/// Description used for the synthetic line item emitted when no rows could be
/// recovered from the source.
pub const FALLBACK_DESCRIPTION: &str = "Invoice Total";

/// A normalized invoice.
///
/// Records are only built by the normalizer, which guarantees that
/// `line_items` is never empty and that every description is non-blank.
/// Serializes to the camelCase wire shape:
///
/// ```json
/// {
///   "vendor": "Acme Supplies",
///   "invoiceNumber": "INV-1002",
///   "invoiceDate": "2024-03-04",
///   "subtotal": 20.0, "tax": 1.6, "total": 21.6,
///   "lineItems": [
///     { "description": "Widget A", "quantity": 2.0, "unitPrice": 10.0, "lineTotal": 20.0 }
///   ]
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceRecord {
    pub(crate) vendor: String,
    pub(crate) invoice_number: Option<String>,
    pub(crate) invoice_date: Option<String>,
    pub(crate) subtotal: Amount,
    pub(crate) tax: Amount,
    pub(crate) total: Amount,
    pub(crate) line_items: Vec<LineItem>,
}

/// A single line item.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    pub(crate) description: String,
    pub(crate) quantity: Amount,
    pub(crate) unit_price: Amount,
    pub(crate) line_total: Amount,
}

impl LineItem {
    /// Build an item from a recovered table row. The line total is
    /// recomputed from quantity and unit price.
    pub fn from_row(
        description: impl Into<String>,
        quantity: impl Into<Amount>,
        unit_price: impl Into<Amount>,
    ) -> Self {
        let quantity = quantity.into();
        let unit_price = unit_price.into();
        Self {
            description: description.into(),
            quantity,
            unit_price,
            line_total: quantity.checked_mul(unit_price).unwrap_or(Amount::ZERO),
        }
    }

    /// Build an item whose line total is taken as given.
    pub fn with_total(
        description: impl Into<String>,
        quantity: impl Into<Amount>,
        unit_price: impl Into<Amount>,
        line_total: impl Into<Amount>,
    ) -> Self {
        Self {
            description: description.into(),
            quantity: quantity.into(),
            unit_price: unit_price.into(),
            line_total: line_total.into(),
        }
    }

    /// The single summary item used when no rows are recoverable.
    pub fn fallback(total: Amount) -> Self {
        Self::with_total(FALLBACK_DESCRIPTION, Amount::ONE, total, total)
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn quantity(&self) -> Amount {
        self.quantity
    }

    pub fn unit_price(&self) -> Amount {
        self.unit_price
    }

    pub fn line_total(&self) -> Amount {
        self.line_total
    }
}

impl InvoiceRecord {
    pub fn vendor(&self) -> &str {
        &self.vendor
    }

    pub fn invoice_number(&self) -> Option<&str> {
        self.invoice_number.as_deref()
    }

    /// Date in `YYYY-MM-DD` form. The shape is guaranteed; the day may not
    /// exist (see [`validate`](Self::validate)).
    pub fn invoice_date(&self) -> Option<&str> {
        self.invoice_date.as_deref()
    }

    pub fn subtotal(&self) -> Amount {
        self.subtotal
    }

    pub fn tax(&self) -> Amount {
        self.tax
    }

    pub fn total(&self) -> Amount {
        self.total
    }

    /// Line items, never empty.
    pub fn line_items(&self) -> &[LineItem] {
        &self.line_items
    }

    /// True when the only line item is the synthetic summary item.
    pub fn is_fallback_only(&self) -> bool {
        matches!(self.line_items.as_slice(), [item]
            if item.description == FALLBACK_DESCRIPTION
                && item.quantity == Amount::ONE
                && item.unit_price == self.total
                && item.line_total == self.total)
    }

    /// Check the record for inconsistencies a reviewer should look at.
    ///
    /// Issues are advisory; the record is always schema-valid.
    pub fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();

        if self.vendor.is_empty() {
            issues.push("Missing vendor".to_string());
        }

        if self.invoice_number.is_none() {
            issues.push("Missing invoice number".to_string());
        }

        match self.invoice_date.as_deref() {
            None => issues.push("Missing invoice date".to_string()),
            Some(date) if NaiveDate::parse_from_str(date, "%Y-%m-%d").is_err() => {
                issues.push(format!("Invoice date {} is not a calendar date", date));
            }
            Some(_) => {}
        }

        if self.total.is_zero() {
            issues.push("Total is zero".to_string());
        }

        if self.is_fallback_only() {
            issues.push("No line items recovered, using invoice total".to_string());
        } else if !self.subtotal.is_zero() {
            let items_sum = self
                .line_items
                .iter()
                .try_fold(Amount::ZERO, |acc, i| acc.checked_add(i.line_total));
            match items_sum {
                Some(sum) if sum.differs_from(&self.subtotal) => {
                    issues.push(format!(
                        "Line item total ({}) differs from subtotal ({})",
                        sum, self.subtotal
                    ));
                }
                Some(_) => {}
                None => issues.push("Line item total overflows".to_string()),
            }
        }

        if !self.subtotal.is_zero() && !self.total.is_zero() {
            if let Some(expected) = self.subtotal.checked_add(self.tax) {
                if expected.differs_from(&self.total) {
                    issues.push(format!(
                        "Subtotal plus tax ({}) differs from total ({})",
                        expected, self.total
                    ));
                }
            }
        }

        issues
    }
}
