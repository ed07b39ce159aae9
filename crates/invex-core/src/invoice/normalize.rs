//! Schema normalization: the single place where records are built.
//!
//! Both entry points apply the same defaulting pass:
//! - strings go through the blank-to-`None` policy,
//! - dates through the `YYYY-MM-DD` gate,
//! - missing amounts become zero,
//! - blank item descriptions become `Line Item {n}` (1-based),
//! - an empty item list becomes the single fallback item built from `total`.

use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::error::Result;
use crate::models::amount::Amount;
use crate::models::invoice::{InvoiceRecord, LineItem};

use super::fields::PartialInvoiceFields;
use super::rules::{non_blank, safe_date, safe_date_value, safe_number_or_zero, safe_string};
use super::validation::classify_llm_payload;

static NULL: Value = Value::Null;

/// Build a record from extracted fields. Never fails.
pub fn normalize_fields(fields: PartialInvoiceFields) -> InvoiceRecord {
    let total = fields.total.unwrap_or(Amount::ZERO);

    let line_items = fields
        .line_items
        .into_iter()
        .enumerate()
        .map(|(i, item)| LineItem {
            description: non_blank(&item.description).unwrap_or_else(|| placeholder(i)),
            ..item
        })
        .collect();

    InvoiceRecord {
        vendor: fields.vendor.as_deref().and_then(non_blank).unwrap_or_default(),
        invoice_number: fields.invoice_number.as_deref().and_then(non_blank),
        invoice_date: fields.invoice_date.as_deref().and_then(safe_date),
        subtotal: fields.subtotal.unwrap_or(Amount::ZERO),
        tax: fields.tax.unwrap_or(Amount::ZERO),
        total,
        line_items: ensure_line_items(line_items, total),
    }
}

/// Build a record from a generative parser payload.
///
/// Fails with `InvalidLlmJson` only when `raw` is neither a JSON object nor a
/// string holding one; every field-level problem is absorbed by defaults.
pub fn normalize_from_raw_json(raw: &Value) -> Result<InvoiceRecord> {
    let map = classify_llm_payload(raw)?;
    Ok(normalize_object(&map))
}

fn normalize_object(map: &Map<String, Value>) -> InvoiceRecord {
    let total = safe_number_or_zero(field(map, &["total"]));

    let line_items = match field(map, &["lineItems", "line_items"]) {
        Value::Array(items) => items
            .iter()
            .enumerate()
            .map(|(i, item)| normalize_item(i, item))
            .collect(),
        Value::Null => Vec::new(),
        other => {
            warn!("Ignoring non-array lineItems: {}", other);
            Vec::new()
        }
    };

    let record = InvoiceRecord {
        vendor: safe_string(field(map, &["vendor"])).unwrap_or_default(),
        invoice_number: safe_string(field(map, &["invoiceNumber", "invoice_number"])),
        invoice_date: safe_date_value(field(map, &["invoiceDate", "invoice_date"])),
        subtotal: safe_number_or_zero(field(map, &["subtotal"])),
        tax: safe_number_or_zero(field(map, &["tax"])),
        total,
        line_items: ensure_line_items(line_items, total),
    };

    debug!(
        "Normalized generative payload: {} keys, {} line items",
        map.len(),
        record.line_items.len()
    );
    record
}

fn normalize_item(index: usize, item: &Value) -> LineItem {
    let get = |keys: &[&str]| match item {
        Value::Object(obj) => field(obj, keys),
        _ => &NULL,
    };

    LineItem {
        description: safe_string(get(&["description"])).unwrap_or_else(|| placeholder(index)),
        quantity: safe_number_or_zero(get(&["quantity"])),
        unit_price: safe_number_or_zero(get(&["unitPrice", "unit_price"])),
        line_total: safe_number_or_zero(get(&["lineTotal", "line_total"])),
    }
}

/// First present key wins; camelCase names come first.
fn field<'a>(map: &'a Map<String, Value>, keys: &[&str]) -> &'a Value {
    keys.iter()
        .find_map(|k| map.get(*k))
        .unwrap_or(&NULL)
}

fn placeholder(index: usize) -> String {
    format!("Line Item {}", index + 1)
}

fn ensure_line_items(items: Vec<LineItem>, total: Amount) -> Vec<LineItem> {
    if items.is_empty() {
        vec![LineItem::fallback(total)]
    } else {
        items
    }
}
