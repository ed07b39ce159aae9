//! Property-based tests for invex-core.
//!
//! 1. Extraction is total: any text yields a record
//! 2. Records always carry at least one line item with a description
//! 3. Every amount on the wire is a finite number
//! 4. Dates only survive the gate in canonical form
//! 5. Normalizing a canonical record is a fixed point

use invex_core::invoice::rules::safe_date;
use invex_core::{normalize_from_raw_json, InvexError, InvoiceRecord, RuleBasedParser};
use proptest::prelude::*;
use serde_json::{json, Map, Value};

// ============================================================================
// Strategies
// ============================================================================

/// OCR-like lines: labels, rows, amounts and noise.
fn ocr_line_strategy() -> impl Strategy<Value = String> {
    let amount = "[$]?[0-9]{1,7}(\\.[0-9]{1,2})?";
    prop_oneof![
        "[A-Za-z ]{0,30}",
        amount.prop_map(|a| format!("Total {}", a)),
        amount.prop_map(|a| format!("Subtotal: {}", a)),
        amount.prop_map(|a| format!("Tax {}", a)),
        amount.prop_map(|a| format!("Total: USD {}", a)),
        "[0-9]{1,2}/[0-9]{1,2}/[0-9]{2,4}".prop_map(|d| format!("Invoice Date: {}", d)),
        "[A-Z0-9-]{1,12}".prop_map(|n| format!("Invoice #{}", n)),
        ("[A-Za-z ]{1,20}", 0u32..1000, amount)
            .prop_map(|(d, q, p)| format!("{}    {} x {}", d, q, p)),
        "\\PC{0,40}",
    ]
}

fn ocr_text_strategy() -> impl Strategy<Value = String> {
    (
        prop::collection::vec(ocr_line_strategy(), 0..20),
        prop_oneof![Just("\n"), Just("\r\n")],
    )
        .prop_map(|(lines, sep)| lines.join(sep))
}

/// Arbitrary JSON values, nested a few levels deep.
fn json_strategy() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(Value::from),
        any::<f64>().prop_map(Value::from),
        "\\PC{0,20}".prop_map(Value::String),
    ];
    leaf.prop_recursive(3, 32, 6, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..6).prop_map(Value::Array),
            prop::collection::btree_map("[a-zA-Z_]{1,12}", inner, 0..6)
                .prop_map(|m| Value::Object(m.into_iter().collect())),
        ]
    })
}

/// Objects using the record's own keys, with hostile values.
fn invoice_object_strategy() -> impl Strategy<Value = Value> {
    let keys = prop::sample::select(vec![
        "vendor",
        "invoiceNumber",
        "invoiceDate",
        "subtotal",
        "tax",
        "total",
        "lineItems",
        "line_items",
    ]);
    prop::collection::vec((keys, json_strategy()), 0..8).prop_map(|pairs| {
        let map: Map<String, Value> = pairs.into_iter().map(|(k, v)| (k.to_string(), v)).collect();
        Value::Object(map)
    })
}

fn cents_strategy() -> impl Strategy<Value = Value> {
    (-10_000_000i64..10_000_000).prop_map(|c| json!(c as f64 / 100.0))
}

/// Any finite number, including magnitudes no decimal can hold.
fn finite_number_strategy() -> impl Strategy<Value = Value> {
    (prop::num::f64::NORMAL | prop::num::f64::SUBNORMAL).prop_map(|f| json!(f))
}

fn wide_amount_strategy() -> BoxedStrategy<Value> {
    prop_oneof![cents_strategy(), finite_number_strategy()].boxed()
}

/// Records already in canonical wire shape.
fn canonical_strategy(amount: BoxedStrategy<Value>) -> impl Strategy<Value = Value> {
    let item = ("[A-Za-z][A-Za-z ]{0,15}", amount.clone(), amount.clone(), amount.clone())
        .prop_map(|(d, q, p, t)| json!({"description": d, "quantity": q, "unitPrice": p, "lineTotal": t}));
    let date = prop::option::of((1990i32..2100, 1u32..=12, 1u32..=31))
        .prop_map(|d| d.map(|(y, m, day)| format!("{:04}-{:02}-{:02}", y, m, day)));

    (
        "[A-Za-z][A-Za-z .]{0,20}",
        prop::option::of("[A-Z0-9-]{1,10}"),
        date,
        amount.clone(),
        amount.clone(),
        amount,
        prop::collection::vec(item, 1..5),
    )
        .prop_map(|(vendor, number, date, subtotal, tax, total, items)| {
            json!({
                "vendor": vendor,
                "invoiceNumber": number,
                "invoiceDate": date,
                "subtotal": subtotal,
                "tax": tax,
                "total": total,
                "lineItems": items,
            })
        })
}

// ============================================================================
// Helpers
// ============================================================================

fn assert_well_formed(record: &InvoiceRecord) -> Result<(), TestCaseError> {
    prop_assert!(!record.line_items().is_empty());
    for item in record.line_items() {
        prop_assert!(!item.description().trim().is_empty());
    }

    let wire = serde_json::to_value(record).map_err(|e| TestCaseError::fail(e.to_string()))?;
    for key in ["subtotal", "tax", "total"] {
        prop_assert!(wire[key].as_f64().is_some_and(f64::is_finite), "{} not finite", key);
    }
    for item in wire["lineItems"].as_array().into_iter().flatten() {
        for key in ["quantity", "unitPrice", "lineTotal"] {
            prop_assert!(item[key].as_f64().is_some_and(f64::is_finite), "{} not finite", key);
        }
    }
    if let Some(date) = wire["invoiceDate"].as_str() {
        prop_assert_eq!(safe_date(date), Some(date.to_string()));
    }
    Ok(())
}

// ============================================================================
// Rule-based path
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    #[test]
    fn rule_extraction_is_total(text in ocr_text_strategy()) {
        let record = RuleBasedParser::new().extract(&text);
        assert_well_formed(&record)?;
    }

    #[test]
    fn arbitrary_text_is_total(text in "\\PC*") {
        let record = RuleBasedParser::new().extract(&text);
        assert_well_formed(&record)?;
    }

    #[test]
    fn unmatched_rows_fall_back_to_total(cents in 0i64..100_000_000) {
        let total = format!("{}.{:02}", cents / 100, cents % 100);
        let record = RuleBasedParser::new().extract(&format!("Globex\nTotal {}", total));
        prop_assert!(record.is_fallback_only());
        prop_assert_eq!(record.line_items()[0].line_total(), record.total());
    }
}

// ============================================================================
// Generative path
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    #[test]
    fn any_object_normalizes(raw in invoice_object_strategy()) {
        let record = normalize_from_raw_json(&raw);
        prop_assert!(record.is_ok());
        if let Ok(record) = record {
            assert_well_formed(&record)?;
        }
    }

    #[test]
    fn any_value_classifies(raw in json_strategy()) {
        match normalize_from_raw_json(&raw) {
            Ok(record) => {
                prop_assert!(raw.is_object() || raw.is_string());
                assert_well_formed(&record)?;
            }
            Err(InvexError::InvalidLlmJson { .. }) => prop_assert!(!raw.is_object()),
            Err(other) => prop_assert!(false, "unexpected error: {}", other),
        }
    }

    #[test]
    fn arbitrary_strings_never_panic(raw in "\\PC{0,80}") {
        let result = normalize_from_raw_json(&Value::String(raw));
        prop_assert!(matches!(result, Ok(_) | Err(InvexError::InvalidLlmJson { .. })), "unexpected result: {:?}", result);
    }

    #[test]
    fn canonical_records_are_fixed_points(raw in canonical_strategy(wide_amount_strategy())) {
        let once = normalize_from_raw_json(&raw).map_err(|e| TestCaseError::fail(e.to_string()))?;
        let wire = serde_json::to_value(&once).map_err(|e| TestCaseError::fail(e.to_string()))?;
        let twice = normalize_from_raw_json(&wire).map_err(|e| TestCaseError::fail(e.to_string()))?;

        prop_assert_eq!(&once, &twice);
        prop_assert_eq!(serde_json::to_value(&twice).ok(), Some(wire));
    }

    #[test]
    fn stringified_payload_matches_object(raw in canonical_strategy(cents_strategy().boxed())) {
        let from_object = normalize_from_raw_json(&raw).ok();
        let from_string = normalize_from_raw_json(&Value::String(raw.to_string())).ok();
        prop_assert_eq!(from_object, from_string);
    }
}

// ============================================================================
// Date gate
// ============================================================================

proptest! {
    #[test]
    fn date_gate_accepts_only_canonical(s in "\\PC{0,12}") {
        if let Some(date) = safe_date(&s) {
            prop_assert_eq!(&date, &s);
            prop_assert_eq!(date.len(), 10);
        }
    }

    #[test]
    fn date_gate_accepts_any_canonical_shape(y in 0u32..=9999, m in 0u32..=99, d in 0u32..=99) {
        let s = format!("{:04}-{:02}-{:02}", y, m, d);
        prop_assert_eq!(safe_date(&s), Some(s.clone()));
    }
}

// ============================================================================
// Scenarios
// ============================================================================

#[test]
fn acme_invoice_end_to_end() {
    let text = "Acme Supplies\nInvoice Number: INV-1002\nInvoice Date: 03/04/2024\n\
        Widget A    2 x 10.00\nSubtotal 20.00\nTax 1.60\nTotal 21.60";
    let record = RuleBasedParser::new().extract(text);

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
fn malformed_payload_is_rejected() {
    let err = normalize_from_raw_json(&json!("{\"vendor\": ")).unwrap_err();
    assert!(matches!(err, InvexError::InvalidLlmJson { .. }));
}
