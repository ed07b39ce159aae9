//! Line-item reconstruction from flattened OCR text.
//!
//! Table recovery is approximate. A row is recognized only when it looks like
//! `<description><2+ spaces or tab><quantity> x <unit price>`; any other
//! layout is skipped. Line totals printed on the row are ignored and
//! recomputed, since OCR column artifacts make them unreliable.

use tracing::{debug, trace};

use crate::models::amount::Amount;
use crate::models::invoice::LineItem;

use super::rules::{parse_amount, parse_currency};
use super::rules::patterns::LINE_ITEM;

/// Parse one line as a table row.
pub fn parse_row(line: &str) -> Option<LineItem> {
    let caps = LINE_ITEM.captures(line.trim())?;

    let description = caps["description"].trim();
    let quantity = parse_amount(&caps["quantity"])?;
    let unit_price = parse_currency(&caps["unit_price"])?;

    trace!("Row {:?}: qty={} price={}", description, quantity, unit_price);
    Some(LineItem::from_row(description, quantity, unit_price))
}

/// Every line that parses as a row, in order. May be empty.
pub fn match_rows<S: AsRef<str>>(lines: &[S]) -> Vec<LineItem> {
    lines.iter().filter_map(|l| parse_row(l.as_ref())).collect()
}

/// Rows recovered from `lines`, or the single fallback item built from
/// `fallback_total` when none match. Never empty.
pub fn reconstruct_line_items<S: AsRef<str>>(lines: &[S], fallback_total: Option<Amount>) -> Vec<LineItem> {
    let items = match_rows(lines);
    if !items.is_empty() {
        debug!("Recovered {} line items", items.len());
        return items;
    }

    let total = fallback_total.unwrap_or(Amount::ZERO);
    debug!("No line items recovered, using fallback total {}", total);
    vec![LineItem::fallback(total)]
}
