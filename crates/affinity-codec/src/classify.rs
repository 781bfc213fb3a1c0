// crates/affinity-codec/src/classify.rs
// ============================================================================
// Module: Type Classifier
// Description: Single-sample mapping from a value to its semantic kind.
// Purpose: Drive auto-affinity column typing without reflection.
// Dependencies: serde_json
// ============================================================================

//! ## Overview
//! [`classify`] is a total, side-effect-free match over the closed value
//! enumeration. Text is inspected in a fixed order: ISO-8601 prefix, exact
//! `"true"`/`"false"`, then JSON object or array.
//!
//! This is a single-sample heuristic. A text column whose sampled value
//! happens to look like a date or JSON is misclassified; declare column-name
//! rules when that matters.

// ============================================================================
// SECTION: Imports
// ============================================================================

use crate::value::SemanticKind;
use crate::value::StorageValue;
use crate::value::Value;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Byte shape of the `YYYY-MM-DDTHH:MM:SS` prefix; `d` marks a digit.
const ISO_PREFIX_SHAPE: &[u8; 19] = b"dddd-dd-ddTdd:dd:dd";

// ============================================================================
// SECTION: Classification
// ============================================================================

/// Classifies one application value.
///
/// `Null` is provisional: callers sampling a column keep looking for the
/// next non-null value.
#[must_use]
pub fn classify(value: &Value) -> SemanticKind {
    match value {
        Value::Blob(_) => SemanticKind::Blob,
        Value::Boolean(_) => SemanticKind::Boolean,
        Value::Integer(_) | Value::Real(_) => SemanticKind::Number,
        Value::Null => SemanticKind::Null,
        Value::Text(text) => classify_text(text),
        Value::DateTime(_) => SemanticKind::DateTime,
        Value::Json(_) => SemanticKind::Json,
    }
}

/// Classifies one raw stored value without lifting it into a [`Value`].
#[must_use]
pub fn classify_storage(value: &StorageValue) -> SemanticKind {
    match value {
        StorageValue::Blob(_) => SemanticKind::Blob,
        StorageValue::Integer(_) | StorageValue::Real(_) => SemanticKind::Number,
        StorageValue::Null => SemanticKind::Null,
        StorageValue::Text(text) => classify_text(text),
    }
}

/// Classifies stored text.
#[must_use]
pub fn classify_text(text: &str) -> SemanticKind {
    if has_iso_datetime_prefix(text) {
        SemanticKind::DateTime
    } else if text == "true" || text == "false" {
        SemanticKind::Boolean
    } else if is_structured_json(text) {
        SemanticKind::Json
    } else {
        SemanticKind::String
    }
}

/// Returns true when `text` starts with `YYYY-MM-DDTHH:MM:SS`.
fn has_iso_datetime_prefix(text: &str) -> bool {
    let Some(prefix) = text.as_bytes().get(.. ISO_PREFIX_SHAPE.len()) else {
        return false;
    };
    prefix.iter().zip(ISO_PREFIX_SHAPE).all(|(byte, shape)| match shape {
        b'd' => byte.is_ascii_digit(),
        literal => byte == literal,
    })
}

/// Returns true when `text` parses as a JSON object or array.
fn is_structured_json(text: &str) -> bool {
    let trimmed = text.trim_start();
    if !(trimmed.starts_with('{') || trimmed.starts_with('[')) {
        return false;
    }
    serde_json::from_str::<serde_json::Value>(trimmed)
        .is_ok_and(|json| json.is_object() || json.is_array())
}
