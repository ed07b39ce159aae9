//! Amount parsing.
//!
//! Tokens are read as exact decimals where possible. Finite values outside the
//! decimal range fall back to `f64`; NaN and infinities never parse.

use rust_decimal::Decimal;
use std::str::FromStr;

use crate::models::amount::Amount;

/// Parse a currency token such as `$1,234.56`.
///
/// Every character other than ASCII digits, `.` and `-` is dropped and the
/// remainder is parsed as a plain decimal. Returns `None` when nothing
/// parseable is left, leaving the zero default to the caller.
pub fn parse_currency(s: &str) -> Option<Amount> {
    let cleaned: String = s
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect();

    if cleaned.is_empty() {
        return None;
    }

    parse_amount(&cleaned)
}

/// Parse a plain numeric string (`"12.5"`, `"-3"`, `"1e3"`).
///
/// No characters are stripped; `"$5"` and `"1,000"` do not parse.
pub fn parse_decimal(s: &str) -> Option<Decimal> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    Decimal::from_str(s)
        .or_else(|_| Decimal::from_scientific(s))
        .ok()
}

/// Parse a plain numeric string into an [`Amount`], widening to `f64` when
/// the value does not fit a decimal.
pub fn parse_amount(s: &str) -> Option<Amount> {
    if let Some(d) = parse_decimal(s) {
        return Some(d.into());
    }
    s.trim().parse::<f64>().ok().and_then(Amount::from_f64)
}
