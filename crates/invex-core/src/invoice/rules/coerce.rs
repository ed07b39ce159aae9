//! Coercion of untrusted JSON values into record primitives.
//!
//! String policy: a string field that is missing, not a string, or blank after
//! trimming is `None`. Record fields that are not optional on the wire
//! (`vendor`) render `None` as `""`; optional ones (`invoiceNumber`) as `null`.
//! Both extraction paths go through [`safe_string`] or [`non_blank`], so the
//! choice cannot drift between them.

use serde_json::Value;

use crate::models::amount::Amount;

use super::amounts::parse_amount;
use super::dates::safe_date;

/// Coerce to a number, falling back to zero. Never fails.
///
/// Any finite JSON number or plain numeric string is kept as is, however
/// large; currency symbols, thousands separators, booleans, nulls, arrays
/// and objects all give zero.
pub fn safe_number_or_zero(v: &Value) -> Amount {
    let parsed = match v {
        Value::Number(n) => Amount::from_json_number(n),
        Value::String(s) => parse_amount(s),
        _ => None,
    };
    parsed.unwrap_or(Amount::ZERO)
}

/// Trimmed string content, or `None` when absent or blank.
pub fn safe_string(v: &Value) -> Option<String> {
    match v {
        Value::String(s) => non_blank(s),
        _ => None,
    }
}

/// Trimmed copy of `s`, or `None` when it is blank.
pub fn non_blank(s: &str) -> Option<String> {
    let trimmed = s.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Date gate for JSON values; see [`safe_date`].
pub fn safe_date_value(v: &Value) -> Option<String> {
    match v {
        Value::String(s) => safe_date(s),
        _ => None,
    }
}
