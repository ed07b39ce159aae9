//! Date canonicalization.
//!
//! Two steps: [`normalize_date`] rewrites a `month/day/year` token from OCR
//! text into `YYYY-MM-DD`, and [`safe_date`] is the gate every date passes
//! through before it reaches a record. The gate checks shape only; whether
//! the day exists is left to [`InvoiceRecord::validate`].
//!
//! [`InvoiceRecord::validate`]: crate::models::invoice::InvoiceRecord::validate
//!
//! Known limitation: tokens are read in US order (month first) and two-digit
//! years are always placed in the 2000s. `03/04/24` is March 4th 2024, never
//! April 3rd.

use super::patterns::{CANONICAL_DATE, DATE_TOKEN};

/// Rewrite `M/D/YY`, `MM-DD-YYYY` and similar tokens as `YYYY-MM-DD`.
///
/// Each component is zero-padded to two digits and a two-digit year gets a
/// `20` prefix. Returns `None` when the token does not have three numeric
/// components; the output is not calendar-checked.
pub fn normalize_date(token: &str) -> Option<String> {
    let caps = DATE_TOKEN.captures(token.trim())?;

    let month = format!("{:0>2}", &caps[1]);
    let day = format!("{:0>2}", &caps[2]);
    let year = match &caps[3] {
        y if y.len() == 2 => format!("20{}", y),
        y => y.to_string(),
    };

    Some(format!("{}-{}-{}", year, month, day))
}

/// Accept only strings of the exact form `YYYY-MM-DD`.
///
/// Differently formatted dates are rejected even when they are unambiguous,
/// so a generative source cannot smuggle in a guessed reading.
pub fn safe_date(s: &str) -> Option<String> {
    CANONICAL_DATE.is_match(s).then(|| s.to_string())
}
