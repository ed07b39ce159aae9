//! Common regex patterns for invoice field extraction.
//!
//! Label patterns expose the captured token as the `value` group. A `skip`
//! group, when it participates in a match, marks that match as belonging to a
//! different label (e.g. "Sub Total" for the `total` rule).

use lazy_static::lazy_static;
use regex::Regex;

/// Money token following a label: optional upper-case currency code, then
/// optional sign and currency symbol, digits with thousands separators,
/// optional fraction.
macro_rules! amount_token {
    () => {
        r"(?:(?-i:[A-Z]{3})\s?)?(?P<value>-?[$€£]?\s?-?\d[\d,]*(?:\.\d+)?)"
    };
}

/// Date token accepted after a date label.
macro_rules! date_token {
    () => {
        r"(?P<value>\d{1,2}[/-]\d{1,2}[/-]\d{2,4})\b"
    };
}

lazy_static! {
    // Invoice number
    pub static ref INVOICE_NUMBER: Regex = Regex::new(
        r"(?i)\binvoice\s*(?:number|no\b\.?|#)[\s:#.]*(?P<value>[A-Z0-9][A-Z0-9-]*)"
    ).unwrap();

    // Dates, in label priority order
    pub static ref INVOICE_DATE: Regex = Regex::new(
        concat!(r"(?i)\binvoice\s*date\b[\s:.\-]*", date_token!())
    ).unwrap();

    pub static ref GENERIC_DATE: Regex = Regex::new(
        concat!(r"(?i)\bdate\b[\s:.\-]*", date_token!())
    ).unwrap();

    pub static ref DATE_TOKEN: Regex = Regex::new(
        r"^(\d{1,2})[/-](\d{1,2})[/-](\d{2,4})$"
    ).unwrap();

    pub static ref CANONICAL_DATE: Regex = Regex::new(
        r"^[0-9]{4}-[0-9]{2}-[0-9]{2}$"
    ).unwrap();

    // Amounts
    pub static ref SUBTOTAL: Regex = Regex::new(
        concat!(r"(?i)\bsub[\s-]*total\b[\s:]*", amount_token!())
    ).unwrap();

    pub static ref TAX: Regex = Regex::new(
        concat!(r"(?i)\b(?:sales\s+)?(?:tax|vat|gst)\b[\s:]*", amount_token!())
    ).unwrap();

    pub static ref TOTAL: Regex = Regex::new(
        concat!(r"(?i)(?P<skip>\bsub[\s-]*)?\btotal\b(?:\s+(?:due|amount))?[\s:]*", amount_token!())
    ).unwrap();

    pub static ref AMOUNT_DUE: Regex = Regex::new(
        concat!(r"(?i)\b(?:amount|balance)\s+due\b[\s:]*", amount_token!())
    ).unwrap();

    // Line items: description, 2+ spaces or a tab, then "qty x price"
    pub static ref LINE_ITEM: Regex = Regex::new(
        r"^(?P<description>\S.*?)(?: {2,}|\t)\s*(?P<quantity>\d+(?:\.\d+)?)\s*[xX×*]\s*(?P<unit_price>[$€£]?\s?\d[\d,]*(?:\.\d+)?)"
    ).unwrap();
}
