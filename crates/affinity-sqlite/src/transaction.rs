// crates/affinity-sqlite/src/transaction.rs
// ============================================================================
// Module: Transaction Emulation State
// Description: Single-level transaction state machine.
// Purpose: Reject nesting and unmatched commit/rollback before they run.
// Dependencies: crate::error
// ============================================================================

//! ## Overview
//! `Idle -> InTransaction -> Idle`. Transitions are checked before the
//! passthrough statement runs, so a rejected transition leaves the state
//! untouched. There is no savepoint support.

// ============================================================================
// SECTION: Imports
// ============================================================================

use crate::error::DialectError;

// ============================================================================
// SECTION: Statements
// ============================================================================

/// Passthrough text opening a transaction.
pub const BEGIN_SQL: &str = "begin transaction";
/// Passthrough text committing a transaction.
pub const COMMIT_SQL: &str = "commit";
/// Passthrough text rolling back a transaction.
pub const ROLLBACK_SQL: &str = "rollback";

// ============================================================================
// SECTION: State
// ============================================================================

/// Transaction state of the logical connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransactionState {
    /// Autocommit; no transaction open.
    #[default]
    Idle,
    /// A transaction has begun and is not yet committed or rolled back.
    InTransaction,
}

impl TransactionState {
    /// Checks that a transaction may begin.
    ///
    /// # Errors
    ///
    /// Returns [`DialectError::Unsupported`] when a transaction is open.
    pub fn check_begin(self) -> Result<(), DialectError> {
        match self {
            Self::Idle => Ok(()),
            Self::InTransaction => {
                Err(DialectError::Unsupported("nested transactions are not supported".to_string()))
            }
        }
    }

    /// Checks that the open transaction may end with `operation`.
    ///
    /// # Errors
    ///
    /// Returns [`DialectError::Unsupported`] when no transaction is open.
    pub fn check_end(self, operation: &str) -> Result<(), DialectError> {
        match self {
            Self::InTransaction => Ok(()),
            Self::Idle => Err(DialectError::Unsupported(format!(
                "{operation} issued without a matching begin"
            ))),
        }
    }

    /// Returns the state implied by the engine's autocommit flag.
    #[must_use]
    pub const fn from_autocommit(autocommit: bool) -> Self {
        if autocommit { Self::Idle } else { Self::InTransaction }
    }
}
