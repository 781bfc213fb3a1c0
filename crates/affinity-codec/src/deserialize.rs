// crates/affinity-codec/src/deserialize.rs
// ============================================================================
// Module: Row Deserializers
// Description: Auto-affinity and column-name reconstruction of typed rows.
// Purpose: Turn raw result sets into typed rows without aborting on bad cells.
// Dependencies: serde_json, crate::{classify, rules, temporal}
// ============================================================================

//! ## Overview
//! A [`ColumnKindMap`] is built once per result set, either by sampling the
//! first non-null value of every column ([`ColumnKindMap::infer`]) or by
//! matching column names against declared rules
//! ([`ColumnKindMap::from_rules`]). The map is then applied uniformly to every
//! row through [`convert_cell`].
//!
//! ## Invariants
//! - The map never changes while a result set is being converted.
//! - Cell conversion is total: JSON and datetime parse failures are reported
//!   through the [`ErrorHook`] and the cell keeps its raw stored value.
//! - Null cells stay null under every kind.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;

use crate::classify::classify_storage;
use crate::error::DecodeError;
use crate::rules::ConversionRule;
use crate::rules::first_match;
use crate::serialize::TRUE_TEXT;
use crate::temporal::from_unix_millis;
use crate::temporal::from_unix_millis_f64;
use crate::temporal::parse_datetime;
use crate::value::ResultSet;
use crate::value::Row;
use crate::value::SemanticKind;
use crate::value::StorageValue;
use crate::value::Value;

// ============================================================================
// SECTION: Error Hook
// ============================================================================

/// Callback receiving `(message, cause)` for every soft decoding failure.
pub type ErrorCallback = dyn Fn(&str, &DecodeError) + Send + Sync;

/// Shared handle to a soft-failure callback.
#[derive(Clone)]
pub struct ErrorHook {
    /// Installed callback.
    callback: Arc<ErrorCallback>,
}

impl ErrorHook {
    /// Wraps a callback.
    pub fn new(callback: impl Fn(&str, &DecodeError) + Send + Sync + 'static) -> Self {
        Self {
            callback: Arc::new(callback),
        }
    }

    /// Returns a hook that discards every report.
    #[must_use]
    pub fn silent() -> Self {
        Self::new(|_, _| {})
    }

    /// Delivers one soft failure.
    pub fn report(&self, message: &str, cause: &DecodeError) {
        (self.callback)(message, cause);
    }
}

impl Default for ErrorHook {
    fn default() -> Self {
        Self::silent()
    }
}

impl fmt::Debug for ErrorHook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ErrorHook").finish_non_exhaustive()
    }
}

// ============================================================================
// SECTION: Strategy
// ============================================================================

/// How a result set's columns are typed.
#[derive(Debug, Clone, Default)]
pub enum ConversionStrategy {
    /// Rows are returned exactly as stored.
    #[default]
    Passthrough,
    /// Columns are typed by sampling their first non-null value.
    AutoAffinity,
    /// Columns are typed by the first matching name rule.
    ColumnName(Vec<ConversionRule>),
}

// ============================================================================
// SECTION: Column Kind Map
// ============================================================================

/// Per-result-set column typing, aligned positionally with the columns.
///
/// # Invariants
/// - `kinds.len() == columns.len()`.
/// - `None` marks an unclassified column whose cells pass through raw.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ColumnKindMap {
    /// Column names in statement order.
    columns: Vec<String>,
    /// Kind per column position.
    kinds: Vec<Option<SemanticKind>>,
}

impl ColumnKindMap {
    /// Samples each column until its first non-null value and classifies it.
    ///
    /// Columns that are null in every row stay unclassified.
    #[must_use]
    pub fn infer(result_set: &ResultSet) -> Self {
        let columns = result_set.columns().to_vec();
        let mut kinds = vec![None; columns.len()];
        let mut pending = columns.len();
        for row in result_set.rows() {
            if pending == 0 {
                break;
            }
            for (slot, value) in kinds.iter_mut().zip(row) {
                if slot.is_none() && !value.is_null() {
                    *slot = Some(classify_storage(value));
                    pending -= 1;
                }
            }
        }
        Self {
            columns,
            kinds,
        }
    }

    /// Assigns each column the kind of the first rule matching its name.
    #[must_use]
    pub fn from_rules(result_set: &ResultSet, rules: &[ConversionRule]) -> Self {
        let columns = result_set.columns().to_vec();
        let kinds = columns.iter().map(|column| first_match(rules, column)).collect();
        Self {
            columns,
            kinds,
        }
    }

    /// Returns the kind at a column position.
    #[must_use]
    pub fn kind_at(&self, index: usize) -> Option<SemanticKind> {
        self.kinds.get(index).copied().flatten()
    }

    /// Returns the kind of the first column named `column`.
    #[must_use]
    pub fn kind_of(&self, column: &str) -> Option<SemanticKind> {
        let index = self.columns.iter().position(|name| name == column)?;
        self.kind_at(index)
    }

    /// Returns the number of columns.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.columns.len()
    }

    /// Returns true when the result set had no columns.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Returns true when no column received a kind.
    #[must_use]
    pub fn is_unclassified(&self) -> bool {
        self.kinds.iter().all(Option::is_none)
    }
}

// ============================================================================
// SECTION: Row Conversion
// ============================================================================

/// Converts a whole result set into typed rows.
#[must_use]
pub fn decode_rows(
    result_set: ResultSet,
    strategy: &ConversionStrategy,
    hook: &ErrorHook,
) -> Vec<Row> {
    let kinds = match strategy {
        ConversionStrategy::Passthrough => None,
        ConversionStrategy::AutoAffinity => Some(ColumnKindMap::infer(&result_set)),
        ConversionStrategy::ColumnName(rules) => {
            Some(ColumnKindMap::from_rules(&result_set, rules))
        }
    }
    .filter(|map| !map.is_unclassified());
    let (columns, rows) = result_set.into_parts();
    let shared: Arc<[String]> = Arc::from(columns);
    rows.into_iter()
        .map(|cells| {
            let values = cells
                .into_iter()
                .zip(shared.iter())
                .enumerate()
                .map(|(index, (cell, column))| {
                    match kinds.as_ref().and_then(|map| map.kind_at(index)) {
                        Some(kind) => convert_cell(kind, cell, column, hook),
                        None => Value::from(cell),
                    }
                })
                .collect();
            Row::new(Arc::clone(&shared), values)
        })
        .collect()
}

/// Converts one stored cell into `kind`.
///
/// Total: every branch yields a value, and parse failures fall back to the
/// raw cell after reporting through `hook`.
#[must_use]
pub fn convert_cell(
    kind: SemanticKind,
    cell: StorageValue,
    column: &str,
    hook: &ErrorHook,
) -> Value {
    if cell.is_null() {
        return Value::Null;
    }
    match kind {
        SemanticKind::Blob | SemanticKind::Null => Value::from(cell),
        SemanticKind::Number => coerce_number(cell),
        SemanticKind::String => coerce_string(cell),
        SemanticKind::Boolean => Value::Boolean(is_stored_true(&cell)),
        SemanticKind::DateTime => decode_datetime(cell, column, hook),
        SemanticKind::Json => decode_json(cell, column, hook),
    }
}

/// Numeric text becomes a number; anything else passes through.
fn coerce_number(cell: StorageValue) -> Value {
    match cell {
        StorageValue::Text(text) => {
            let trimmed = text.trim();
            if let Ok(integer) = trimmed.parse::<i64>() {
                Value::Integer(integer)
            } else if let Some(real) = trimmed.parse::<f64>().ok().filter(|real| real.is_finite()) {
                Value::Real(real)
            } else {
                Value::Text(text)
            }
        }
        other => Value::from(other),
    }
}

/// Numbers become their text rendering; blobs pass through.
fn coerce_string(cell: StorageValue) -> Value {
    match cell {
        StorageValue::Integer(integer) => Value::Text(integer.to_string()),
        StorageValue::Real(real) => Value::Text(real.to_string()),
        other => Value::from(other),
    }
}

/// `"true"`, `"1"`, and integer 1 are true; everything else is false.
fn is_stored_true(cell: &StorageValue) -> bool {
    match cell {
        StorageValue::Text(text) => text == TRUE_TEXT || text == "1",
        StorageValue::Integer(integer) => *integer == 1,
        StorageValue::Null | StorageValue::Real(_) | StorageValue::Blob(_) => false,
    }
}

/// Parses datetime text; integers and reals are unix epoch milliseconds.
fn decode_datetime(cell: StorageValue, column: &str, hook: &ErrorHook) -> Value {
    match cell {
        StorageValue::Text(text) => {
            if let Some(instant) = parse_datetime(&text) {
                return Value::DateTime(instant);
            }
            report(hook, column, SemanticKind::DateTime, &text, "not an ISO-8601 datetime");
            Value::Text(text)
        }
        StorageValue::Integer(millis) => {
            if let Some(instant) = from_unix_millis(millis) {
                return Value::DateTime(instant);
            }
            report(
                hook,
                column,
                SemanticKind::DateTime,
                &millis.to_string(),
                "epoch milliseconds out of range",
            );
            Value::Integer(millis)
        }
        StorageValue::Real(millis) => {
            if let Some(instant) = from_unix_millis_f64(millis) {
                return Value::DateTime(instant);
            }
            report(
                hook,
                column,
                SemanticKind::DateTime,
                &millis.to_string(),
                "epoch milliseconds out of range",
            );
            Value::Real(millis)
        }
        other => Value::from(other),
    }
}

/// Parses JSON text; non-text cells pass through.
fn decode_json(cell: StorageValue, column: &str, hook: &ErrorHook) -> Value {
    match cell {
        StorageValue::Text(text) => match serde_json::from_str(&text) {
            Ok(json) => Value::Json(json),
            Err(err) => {
                report(hook, column, SemanticKind::Json, &text, &err.to_string());
                Value::Text(text)
            }
        },
        other => Value::from(other),
    }
}

/// Builds a [`DecodeError`] and hands it to the hook.
fn report(hook: &ErrorHook, column: &str, kind: SemanticKind, raw: &str, reason: &str) {
    let cause = DecodeError {
        column: column.to_string(),
        kind,
        raw: raw.to_string(),
        reason: reason.to_string(),
    };
    let message = format!("failed to decode column `{column}` as {kind}");
    hook.report(&message, &cause);
}
