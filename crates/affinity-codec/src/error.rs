// crates/affinity-codec/src/error.rs
// ============================================================================
// Module: Affinity Codec Errors
// Description: Encoding failures and soft per-field decoding failures.
// Purpose: Separate fatal parameter errors from recoverable cell errors.
// Dependencies: thiserror
// ============================================================================

//! ## Overview
//! [`EncodeError`] aborts a statement before it reaches the engine.
//! [`DecodeError`] never aborts a result set: it is handed to the caller's
//! error hook while the affected cell keeps its raw stored value.

// ============================================================================
// SECTION: Imports
// ============================================================================

use thiserror::Error;

use crate::value::SemanticKind;

// ============================================================================
// SECTION: Encoding
// ============================================================================

/// Parameter values with no storage form.
///
/// # Invariants
/// - `index` is the zero-based position in the statement's parameter list.
/// - Messages never embed the parameter payload.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EncodeError {
    /// NaN and infinities would be stored as NULL by the engine.
    #[error("parameter {index}: non-finite real numbers have no storage form")]
    NonFiniteReal {
        /// Parameter position.
        index: usize,
    },
    /// The instant cannot be written with a four-digit year.
    #[error("parameter {index}: datetime is outside the storable year range 0000-9999")]
    DateTimeOutOfRange {
        /// Parameter position.
        index: usize,
    },
    /// Scalar JSON could never be reclassified as JSON on read.
    #[error("parameter {index}: json parameters must be an object or an array")]
    ScalarJson {
        /// Parameter position.
        index: usize,
    },
    /// JSON text rendering failed.
    #[error("parameter {index}: json encoding failed: {reason}")]
    Json {
        /// Parameter position.
        index: usize,
        /// Serializer failure description.
        reason: String,
    },
}

// ============================================================================
// SECTION: Decoding
// ============================================================================

/// A single cell that could not be converted to its column's kind.
///
/// # Invariants
/// - The row containing the cell is still returned, with the raw value.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("column `{column}` could not be decoded as {kind}: {reason}")]
pub struct DecodeError {
    /// Column name.
    pub column: String,
    /// Kind the column was classified as.
    pub kind: SemanticKind,
    /// Raw stored text that failed to convert.
    pub raw: String,
    /// Parser failure description.
    pub reason: String,
}
