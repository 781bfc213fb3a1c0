// crates/affinity-codec/src/value.rs
// ============================================================================
// Module: Affinity Value Model
// Description: Application values, storage primitives, rows, and result sets.
// Purpose: Give both directions of the codec one closed set of value shapes.
// Dependencies: serde, serde_json, time
// ============================================================================

//! ## Overview
//! Three enumerations carry values across the codec:
//! - [`Value`]: what the application binds and reads back.
//! - [`StorageValue`]: the five primitives SQLite can physically store.
//! - [`SemanticKind`]: the application-level kind a stored column is
//!   reconstructed into.
//!
//! Every [`StorageValue`] lifts losslessly into a [`Value`]; the reverse
//! direction goes through [`crate::serialize`] and may fail.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;

use serde::Deserialize;
use serde::Serialize;
use time::OffsetDateTime;

// ============================================================================
// SECTION: Application Values
// ============================================================================

/// Application-level value bound as a parameter or reconstructed from a row.
///
/// # Invariants
/// - Only `Null`, `Integer`, `Real`, `Text`, and `Blob` have a direct storage
///   form; the remaining variants are encoded into text on write.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// SQL NULL.
    Null,
    /// Boolean value (stored as `"true"` / `"false"` text).
    Boolean(bool),
    /// 64-bit signed integer.
    Integer(i64),
    /// 64-bit float.
    Real(f64),
    /// UTF-8 text.
    Text(String),
    /// Binary buffer.
    Blob(Vec<u8>),
    /// Instant in time (stored as ISO-8601 UTC text).
    DateTime(OffsetDateTime),
    /// Structured JSON object or array (stored as JSON text).
    Json(serde_json::Value),
}

impl Value {
    /// Returns true for [`Value::Null`].
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns the boolean payload, if any.
    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Boolean(flag) => Some(*flag),
            _ => None,
        }
    }

    /// Returns the integer payload, if any.
    #[must_use]
    pub const fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Integer(value) => Some(*value),
            _ => None,
        }
    }

    /// Returns the real payload, if any.
    #[must_use]
    pub const fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Real(value) => Some(*value),
            _ => None,
        }
    }

    /// Returns the text payload, if any.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Returns the blob payload, if any.
    #[must_use]
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Blob(bytes) => Some(bytes),
            _ => None,
        }
    }

    /// Returns the datetime payload, if any.
    #[must_use]
    pub const fn as_datetime(&self) -> Option<OffsetDateTime> {
        match self {
            Self::DateTime(instant) => Some(*instant),
            _ => None,
        }
    }

    /// Returns the JSON payload, if any.
    #[must_use]
    pub const fn as_json(&self) -> Option<&serde_json::Value> {
        match self {
            Self::Json(json) => Some(json),
            _ => None,
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Self::Integer(i64::from(value))
    }
}

impl From<u32> for Value {
    fn from(value: u32) -> Self {
        Self::Integer(i64::from(value))
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Real(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<Vec<u8>> for Value {
    fn from(value: Vec<u8>) -> Self {
        Self::Blob(value)
    }
}

impl From<&[u8]> for Value {
    fn from(value: &[u8]) -> Self {
        Self::Blob(value.to_vec())
    }
}

impl From<OffsetDateTime> for Value {
    fn from(value: OffsetDateTime) -> Self {
        Self::DateTime(value)
    }
}

impl From<serde_json::Value> for Value {
    fn from(value: serde_json::Value) -> Self {
        Self::Json(value)
    }
}

impl<T: Into<Self>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

impl From<StorageValue> for Value {
    fn from(value: StorageValue) -> Self {
        match value {
            StorageValue::Null => Self::Null,
            StorageValue::Integer(value) => Self::Integer(value),
            StorageValue::Real(value) => Self::Real(value),
            StorageValue::Text(text) => Self::Text(text),
            StorageValue::Blob(bytes) => Self::Blob(bytes),
        }
    }
}

// ============================================================================
// SECTION: Storage Primitives
// ============================================================================

/// Physically storable primitive, as bound to and read from the engine.
#[derive(Debug, Clone, PartialEq)]
pub enum StorageValue {
    /// SQL NULL.
    Null,
    /// INTEGER storage class.
    Integer(i64),
    /// REAL storage class.
    Real(f64),
    /// TEXT storage class.
    Text(String),
    /// BLOB storage class.
    Blob(Vec<u8>),
}

impl StorageValue {
    /// Returns true for [`StorageValue::Null`].
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

// ============================================================================
// SECTION: Semantic Kinds
// ============================================================================

/// Application-level kind a stored column is reconstructed into.
///
/// # Invariants
/// - Labels returned by [`SemanticKind::as_str`] are stable and match the
///   serde representation used in configuration files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SemanticKind {
    /// ISO-8601 instant.
    DateTime,
    /// Boolean flag.
    Boolean,
    /// Structured JSON object or array.
    Json,
    /// Integer or real number.
    Number,
    /// Plain text.
    String,
    /// Binary buffer.
    Blob,
    /// Only null values were sampled.
    Null,
}

impl SemanticKind {
    /// Returns the stable label for the kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::DateTime => "datetime",
            Self::Boolean => "boolean",
            Self::Json => "json",
            Self::Number => "number",
            Self::String => "string",
            Self::Blob => "blob",
            Self::Null => "null",
        }
    }
}

impl fmt::Display for SemanticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// SECTION: Result Sets
// ============================================================================

/// Raw rows from one read statement, as produced by the engine binding.
///
/// # Invariants
/// - Each row is positionally aligned with `columns`; extra trailing cells
///   are ignored by the deserializers.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ResultSet {
    /// Column names in statement order (duplicates allowed).
    columns: Vec<String>,
    /// Raw row cells.
    rows: Vec<Vec<StorageValue>>,
}

impl ResultSet {
    /// Builds a result set from column names and raw rows.
    #[must_use]
    pub const fn new(columns: Vec<String>, rows: Vec<Vec<StorageValue>>) -> Self {
        Self {
            columns,
            rows,
        }
    }

    /// Returns the column names.
    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Returns the raw rows.
    #[must_use]
    pub fn rows(&self) -> &[Vec<StorageValue>] {
        &self.rows
    }

    /// Returns the number of rows.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns true when the result set has no rows.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Splits the result set into column names and rows.
    #[must_use]
    pub fn into_parts(self) -> (Vec<String>, Vec<Vec<StorageValue>>) {
        (self.columns, self.rows)
    }
}

// ============================================================================
// SECTION: Rows
// ============================================================================

/// One reconstructed row: column names shared across the result set, plus
/// typed values.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    /// Column names shared by every row of the result set.
    columns: Arc<[String]>,
    /// Typed values aligned with `columns`.
    values: Vec<Value>,
}

impl Row {
    /// Builds a row from shared column names and aligned values.
    #[must_use]
    pub const fn new(columns: Arc<[String]>, values: Vec<Value>) -> Self {
        Self {
            columns,
            values,
        }
    }

    /// Returns the value of the first column named `column`.
    #[must_use]
    pub fn get(&self, column: &str) -> Option<&Value> {
        let index = self.columns.iter().position(|name| name == column)?;
        self.values.get(index)
    }

    /// Returns the value at a column position.
    #[must_use]
    pub fn get_index(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }

    /// Returns the column names.
    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Returns the typed values.
    #[must_use]
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// Iterates over `(column, value)` pairs in statement order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.columns.iter().map(String::as_str).zip(self.values.iter())
    }

    /// Consumes the row and returns its values.
    #[must_use]
    pub fn into_values(self) -> Vec<Value> {
        self.values
    }
}
