// crates/affinity-codec/src/serialize.rs
// ============================================================================
// Module: Value Serializer
// Description: Encodes statement parameters into storage primitives.
// Purpose: Guarantee every bound value has a form the classifier can read back.
// Dependencies: serde_json, crate::temporal
// ============================================================================

//! ## Overview
//! Parameters keep their length and order. Booleans are written as the text
//! `"true"` / `"false"` so the classifier can tell them apart from integers;
//! datetimes become canonical ISO-8601 UTC text; JSON objects and arrays
//! become compact JSON text.

// ============================================================================
// SECTION: Imports
// ============================================================================

use crate::error::EncodeError;
use crate::temporal::format_datetime;
use crate::value::StorageValue;
use crate::value::Value;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Stored text for `true`.
pub const TRUE_TEXT: &str = "true";
/// Stored text for `false`.
pub const FALSE_TEXT: &str = "false";

// ============================================================================
// SECTION: Encoding
// ============================================================================

/// Encodes an ordered parameter list.
///
/// # Errors
///
/// Returns the first [`EncodeError`] in parameter order.
pub fn encode_parameters(parameters: &[Value]) -> Result<Vec<StorageValue>, EncodeError> {
    parameters.iter().enumerate().map(|(index, value)| encode_value(index, value)).collect()
}

/// Encodes one parameter at position `index`.
///
/// # Errors
///
/// Returns [`EncodeError`] for non-finite reals, datetimes outside the
/// four-digit year range, and scalar JSON.
pub fn encode_value(index: usize, value: &Value) -> Result<StorageValue, EncodeError> {
    match value {
        Value::Null => Ok(StorageValue::Null),
        Value::Boolean(flag) => {
            Ok(StorageValue::Text(if *flag { TRUE_TEXT } else { FALSE_TEXT }.to_string()))
        }
        Value::Integer(number) => Ok(StorageValue::Integer(*number)),
        Value::Real(number) if number.is_finite() => Ok(StorageValue::Real(*number)),
        Value::Real(_) => Err(EncodeError::NonFiniteReal {
            index,
        }),
        Value::Text(text) => Ok(StorageValue::Text(text.clone())),
        Value::Blob(bytes) => Ok(StorageValue::Blob(bytes.clone())),
        Value::DateTime(instant) => format_datetime(*instant)
            .map(StorageValue::Text)
            .ok_or(EncodeError::DateTimeOutOfRange {
                index,
            }),
        Value::Json(json) if json.is_object() || json.is_array() => serde_json::to_string(json)
            .map(StorageValue::Text)
            .map_err(|err| EncodeError::Json {
                index,
                reason: err.to_string(),
            }),
        Value::Json(_) => Err(EncodeError::ScalarJson {
            index,
        }),
    }
}
