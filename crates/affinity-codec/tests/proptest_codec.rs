// crates/affinity-codec/tests/proptest_codec.rs
// ============================================================================
// Module: Codec Property-Based Tests
// Description: Encode/decode agreement across generated values.
// Purpose: Ensure every supported kind survives storage under auto-affinity.
// ============================================================================

//! Property-based tests for codec invariants.

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

use affinity_codec::ConversionStrategy;
use affinity_codec::ErrorHook;
use affinity_codec::ResultSet;
use affinity_codec::SemanticKind;
use affinity_codec::Value;
use affinity_codec::classify_text;
use affinity_codec::decode_rows;
use affinity_codec::encode_parameters;
use proptest::prelude::*;
use time::OffsetDateTime;

/// Stores one value in a single-cell result set and reads it back.
fn store_and_load(value: &Value) -> Value {
    let stored = encode_parameters(std::slice::from_ref(value)).unwrap();
    let set = ResultSet::new(vec!["c".to_string()], vec![stored]);
    let mut rows = decode_rows(set, &ConversionStrategy::AutoAffinity, &ErrorHook::silent());
    rows.remove(0).into_values().remove(0)
}

fn json_strategy() -> impl Strategy<Value = serde_json::Value> {
    let leaf = prop_oneof![
        Just(serde_json::Value::Null),
        any::<bool>().prop_map(serde_json::Value::Bool),
        any::<i64>().prop_map(|v| serde_json::Value::Number(v.into())),
        "[a-z ]{0,8}".prop_map(serde_json::Value::String),
    ];
    let nested = leaf.prop_recursive(3, 32, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0 .. 4).prop_map(serde_json::Value::Array),
            prop::collection::btree_map("[a-z]{1,4}", inner, 0 .. 4)
                .prop_map(|map| serde_json::Value::Object(map.into_iter().collect())),
        ]
    });
    prop_oneof![
        prop::collection::vec(nested.clone(), 0 .. 4).prop_map(serde_json::Value::Array),
        prop::collection::btree_map("[a-z]{1,4}", nested, 0 .. 4)
            .prop_map(|map| serde_json::Value::Object(map.into_iter().collect())),
    ]
}

fn value_strategy() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Boolean),
        any::<i64>().prop_map(Value::Integer),
        any::<f64>().prop_filter("finite", |v| v.is_finite()).prop_map(Value::Real),
        "[A-Za-z ]{0,24}"
            .prop_filter("plain text", |text| classify_text(text) == SemanticKind::String)
            .prop_map(Value::Text),
        prop::collection::vec(any::<u8>(), 0 .. 32).prop_map(Value::Blob),
        (0_i64 .. 253_402_300_799_999).prop_map(|millis| {
            let nanos = i128::from(millis) * 1_000_000;
            Value::DateTime(OffsetDateTime::from_unix_timestamp_nanos(nanos).unwrap())
        }),
        json_strategy().prop_map(Value::Json),
    ]
}

proptest! {
    #[test]
    fn decode_of_encode_is_identity(value in value_strategy()) {
        prop_assert_eq!(store_and_load(&value), value);
    }
}
