// crates/affinity-codec/tests/classify.rs
// ============================================================================
// Module: Type Classifier Tests
// Description: Kind selection for every value shape and text heuristic.
// Purpose: Pin the classifier's match order and its accepted blind spots.
// ============================================================================

//! Classifier unit tests.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only assertions and helpers are permitted."
)]

use affinity_codec::SemanticKind;
use affinity_codec::StorageValue;
use affinity_codec::Value;
use affinity_codec::classify;
use affinity_codec::classify_storage;
use affinity_codec::classify_text;
use serde_json::json;
use time::macros::datetime;

// ============================================================================
// SECTION: Value Shapes
// ============================================================================

#[test]
fn classify_covers_every_value_variant() {
    assert_eq!(classify(&Value::Blob(vec![1, 2])), SemanticKind::Blob);
    assert_eq!(classify(&Value::Boolean(false)), SemanticKind::Boolean);
    assert_eq!(classify(&Value::Integer(7)), SemanticKind::Number);
    assert_eq!(classify(&Value::Real(1.5)), SemanticKind::Number);
    assert_eq!(classify(&Value::Null), SemanticKind::Null);
    assert_eq!(classify(&Value::Text("plain".into())), SemanticKind::String);
    assert_eq!(classify(&Value::DateTime(datetime!(2024-01-01 0:00 UTC))), SemanticKind::DateTime);
    assert_eq!(classify(&Value::Json(json!({"x": 1}))), SemanticKind::Json);
}

#[test]
fn classify_storage_agrees_with_lifted_values() {
    let samples = vec![
        StorageValue::Null,
        StorageValue::Integer(3),
        StorageValue::Real(2.5),
        StorageValue::Text("2024-01-01T00:00:00.000Z".into()),
        StorageValue::Text("true".into()),
        StorageValue::Text("[1,2]".into()),
        StorageValue::Text("hello".into()),
        StorageValue::Blob(vec![0xff]),
    ];
    for sample in samples {
        assert_eq!(classify_storage(&sample), classify(&Value::from(sample.clone())));
    }
}

// ============================================================================
// SECTION: Text Heuristics
// ============================================================================

#[test]
fn iso_prefix_wins_over_other_text_rules() {
    assert_eq!(classify_text("2024-01-01T00:00:00"), SemanticKind::DateTime);
    assert_eq!(classify_text("2024-01-01T00:00:00.000Z"), SemanticKind::DateTime);
    assert_eq!(classify_text("2024-01-01T00:00:00 and trailing"), SemanticKind::DateTime);
}

#[test]
fn partial_or_spaced_dates_are_strings() {
    assert_eq!(classify_text("2024-01-01"), SemanticKind::String);
    assert_eq!(classify_text("2024-01-01 00:00:00"), SemanticKind::String);
    assert_eq!(classify_text("x2024-01-01T00:00:00"), SemanticKind::String);
}

#[test]
fn boolean_text_is_exact_and_case_sensitive() {
    assert_eq!(classify_text("true"), SemanticKind::Boolean);
    assert_eq!(classify_text("false"), SemanticKind::Boolean);
    assert_eq!(classify_text("True"), SemanticKind::String);
    assert_eq!(classify_text(" true"), SemanticKind::String);
    assert_eq!(classify_text("1"), SemanticKind::String);
}

#[test]
fn only_structured_json_is_json() {
    assert_eq!(classify_text(r#"{"x":1}"#), SemanticKind::Json);
    assert_eq!(classify_text("  [1, 2, 3]"), SemanticKind::Json);
    assert_eq!(classify_text("42"), SemanticKind::String);
    assert_eq!(classify_text(r#""quoted""#), SemanticKind::String);
    assert_eq!(classify_text("null"), SemanticKind::String);
    assert_eq!(classify_text("{bad json"), SemanticKind::String);
}

#[test]
fn json_looking_user_text_is_misclassified_by_design_of_sampling() {
    // A free-text column whose first value is bracketed JSON is typed as JSON.
    assert_eq!(classify_text("[]"), SemanticKind::Json);
}
