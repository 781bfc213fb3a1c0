// crates/affinity-sqlite/src/error.rs
// ============================================================================
// Module: SQLite Dialect Errors
// Description: Error taxonomy surfaced by the dialect.
// Purpose: Keep engine errors unwrapped and usage errors distinguishable.
// Dependencies: affinity-codec, rusqlite, thiserror
// ============================================================================

//! ## Overview
//! Engine failures such as constraint violations or type mismatches
//! are carried as the unmodified [`rusqlite::Error`] so callers can match on
//! them directly. Soft decoding failures never appear here; they go to the
//! configured error hook.

// ============================================================================
// SECTION: Imports
// ============================================================================

use affinity_codec::EncodeError;
use thiserror::Error;

use crate::config::ConfigError;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// SQLite dialect errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
/// - `Engine` preserves the native error unchanged.
#[derive(Debug, Error)]
pub enum DialectError {
    /// Invalid or conflicting configuration, raised before any statement.
    #[error(transparent)]
    Configuration(#[from] ConfigError),
    /// A parameter has no storage form.
    #[error(transparent)]
    Encoding(#[from] EncodeError),
    /// The engine rejected a statement.
    #[error(transparent)]
    Engine(#[from] rusqlite::Error),
    /// The operation is not supported by this dialect.
    #[error("sqlite dialect unsupported operation: {0}")]
    Unsupported(String),
    /// The connection has been closed.
    #[error("sqlite dialect connection is closed")]
    Closed,
}

impl DialectError {
    /// Returns the native engine error, if this is one.
    #[must_use]
    pub const fn as_engine(&self) -> Option<&rusqlite::Error> {
        match self {
            Self::Engine(err) => Some(err),
            _ => None,
        }
    }

    /// Returns the `SQLite` error code for engine failures.
    #[must_use]
    pub fn sqlite_error_code(&self) -> Option<rusqlite::ErrorCode> {
        self.as_engine().and_then(rusqlite::Error::sqlite_error_code)
    }
}
