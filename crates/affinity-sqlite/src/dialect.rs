// crates/affinity-sqlite/src/dialect.rs
// ============================================================================
// Module: SQLite Dialect
// Description: Statement dispatch and transaction emulation over one lock.
// Purpose: Serialize every statement through the single connection and type
//          its rows according to configuration.
// Dependencies: affinity-codec, rusqlite, tracing, crate::{lock, native}
// ============================================================================

//! ## Overview
//! [`SqliteDialect`] is the logical database handle. It owns one
//! [`ConnectionLock`] around the physical connection and its transaction
//! state. [`SqliteDialect::acquire`] yields a [`DialectConnection`] lease;
//! every statement, including `begin`/`commit`/`rollback`, runs while that
//! lease is held, so another caller's statement can never land inside an
//! open transaction.
//!
//! Per statement: encode parameters, optionally log, route by
//! [`StatementKind`] to the rows or mutation path, decode rows with the
//! configured [`ConversionStrategy`].
//!
//! ## Invariants
//! - The lock is released when the lease drops, on every exit path.
//! - A lease dropped inside an open transaction rolls it back first.
//! - Failed statements inside a transaction do not roll back on their own.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::borrow::Cow;
use std::convert::Infallible;
use std::sync::Arc;

use affinity_codec::ConversionStrategy;
use affinity_codec::ErrorHook;
use affinity_codec::ResultSet;
use affinity_codec::Row;
use affinity_codec::decode_rows;
use affinity_codec::encode_parameters;
use rusqlite::Connection;
use tracing::debug;
use tracing::warn;

use crate::config::DialectConfig;
use crate::error::DialectError;
use crate::lock::ConnectionLease;
use crate::lock::ConnectionLock;
use crate::native::NativeConnection;
use crate::statement::CompiledStatement;
use crate::statement::QueryResult;
use crate::statement::StatementKind;
use crate::statement::with_strict_option;
use crate::transaction::BEGIN_SQL;
use crate::transaction::COMMIT_SQL;
use crate::transaction::ROLLBACK_SQL;
use crate::transaction::TransactionState;

// ============================================================================
// SECTION: Shared State
// ============================================================================

/// Physical connection plus transaction state; only reachable via the lock.
struct ConnectionSlot {
    /// Open connection; `None` after [`SqliteDialect::close`].
    native: Option<NativeConnection>,
    /// Transaction state of the connection.
    transaction: TransactionState,
}

/// Settings fixed at construction and shared by every lease.
struct DialectSettings {
    /// Log statements before execution.
    debug: bool,
    /// Append `STRICT` to create-table statements.
    strict_create_table: bool,
    /// Row typing strategy.
    strategy: ConversionStrategy,
    /// Soft decoding failure sink.
    hook: ErrorHook,
}

impl DialectSettings {
    /// Captures the statement-time settings of a validated config.
    fn from_config(config: &DialectConfig) -> Self {
        Self {
            debug: config.debug,
            strict_create_table: !config.disable_strict_mode_create_table,
            strategy: config.conversion_strategy(),
            hook: config.on_error.clone().unwrap_or_else(log_decode_failures),
        }
    }

    /// Returns the SQL text to execute for `statement`.
    fn statement_sql<'a>(&self, statement: &'a CompiledStatement) -> Cow<'a, str> {
        if self.strict_create_table && statement.kind == StatementKind::CreateTable {
            with_strict_option(&statement.sql)
        } else {
            Cow::Borrowed(&statement.sql)
        }
    }

    /// Types a raw result set.
    fn decode(&self, result_set: ResultSet) -> Vec<Row> {
        decode_rows(result_set, &self.strategy, &self.hook)
    }
}

/// Hook used when the caller installs none.
fn log_decode_failures() -> ErrorHook {
    ErrorHook::new(|message, cause| {
        warn!(
            column = %cause.column,
            kind = %cause.kind,
            reason = %cause.reason,
            "{message}"
        );
    })
}

// ============================================================================
// SECTION: Dialect
// ============================================================================

/// Logical database handle over one serialized `SQLite` connection.
///
/// Cloning shares the same connection and lock.
///
/// Only waiting for the lock suspends. Engine calls are blocking and run
/// inline on the calling task's thread while the lock is held, so a slow
/// statement also stalls other tasks scheduled on that thread. Use a
/// multi-threaded runtime, or wrap long statements in
/// `tokio::task::spawn_blocking` with an acquired [`DialectConnection`].
#[derive(Clone)]
pub struct SqliteDialect {
    /// FIFO lock owning the connection.
    lock: ConnectionLock<ConnectionSlot>,
    /// Statement-time settings.
    settings: Arc<DialectSettings>,
}

impl SqliteDialect {
    /// Validates `config` and opens the configured database.
    ///
    /// # Errors
    ///
    /// Returns [`DialectError::Configuration`] for invalid or conflicting
    /// options, before anything is opened, and [`DialectError::Engine`] when
    /// the database cannot be opened.
    pub fn connect(config: DialectConfig) -> Result<Self, DialectError> {
        config.validate()?;
        let native = NativeConnection::open(&config)?;
        Ok(Self::assemble(native, &config))
    }

    /// Validates `config` and adopts a pre-opened connection.
    ///
    /// `config.database` is ignored.
    ///
    /// # Errors
    ///
    /// Returns [`DialectError::Configuration`] for invalid or conflicting
    /// options and [`DialectError::Engine`] when a pragma fails.
    pub fn with_connection(
        connection: Connection,
        config: DialectConfig,
    ) -> Result<Self, DialectError> {
        config.validate()?;
        let native = NativeConnection::adopt(connection, &config)?;
        Ok(Self::assemble(native, &config))
    }

    /// Wraps an open connection in the lock.
    fn assemble(native: NativeConnection, config: &DialectConfig) -> Self {
        Self {
            lock: ConnectionLock::new(ConnectionSlot {
                native: Some(native),
                transaction: TransactionState::Idle,
            }),
            settings: Arc::new(DialectSettings::from_config(config)),
        }
    }

    /// Waits for exclusive use of the connection.
    pub async fn acquire(&self) -> DialectConnection {
        DialectConnection {
            lease: self.lock.acquire().await,
            settings: Arc::clone(&self.settings),
        }
    }

    /// Runs one statement as its own unit of work.
    ///
    /// # Errors
    ///
    /// See [`DialectConnection::execute`].
    pub async fn execute(&self, statement: &CompiledStatement) -> Result<QueryResult, DialectError> {
        self.acquire().await.execute(statement)
    }

    /// Acquires the connection and begins a transaction on it.
    ///
    /// The transaction ends with [`DialectConnection::commit`] or
    /// [`DialectConnection::rollback`]; dropping the lease first rolls back.
    ///
    /// # Errors
    ///
    /// Returns the engine error when `begin` fails; the lease is released.
    pub async fn begin_transaction(&self) -> Result<DialectConnection, DialectError> {
        let mut connection = self.acquire().await;
        connection.begin()?;
        Ok(connection)
    }

    /// Streaming row iteration; never supported.
    ///
    /// # Errors
    ///
    /// Always returns [`DialectError::Unsupported`].
    #[allow(clippy::unused_self, reason = "Kept on the handle so callers see the rejection.")]
    pub fn stream(&self, statement: &CompiledStatement) -> Result<Infallible, DialectError> {
        Err(DialectError::Unsupported(format!(
            "streaming {} statements is not supported",
            statement.kind.as_str()
        )))
    }

    /// Returns the engine library version.
    ///
    /// # Errors
    ///
    /// Returns [`DialectError::Closed`] after close, or the engine error.
    pub async fn runtime_version(&self) -> Result<String, DialectError> {
        let connection = self.acquire().await;
        Ok(connection.native()?.runtime_version()?)
    }

    /// Returns true while some caller holds the connection.
    #[must_use]
    pub fn is_locked(&self) -> bool {
        self.lock.is_held()
    }

    /// Rolls back any open transaction and closes the connection.
    ///
    /// Closing twice is a no-op.
    ///
    /// # Errors
    ///
    /// Returns the engine error when the rollback or close fails.
    pub async fn close(&self) -> Result<(), DialectError> {
        let mut connection = self.acquire().await;
        if connection.transaction_state() == TransactionState::InTransaction {
            connection.rollback()?;
        }
        let Some(native) = connection.lease.native.take() else {
            return Ok(());
        };
        connection.lease.transaction = TransactionState::Idle;
        native.close()?;
        Ok(())
    }
}

// ============================================================================
// SECTION: Connection Lease
// ============================================================================

/// Exclusive use of the dialect's connection.
///
/// Dropping the value releases the lock.
pub struct DialectConnection {
    /// Held lock over the connection slot.
    lease: ConnectionLease<ConnectionSlot>,
    /// Statement-time settings.
    settings: Arc<DialectSettings>,
}

impl DialectConnection {
    /// Encodes, executes, and decodes one compiled statement.
    ///
    /// `Select` and `Raw` statements run on the rows path; `Mutation` and
    /// `CreateTable` statements report affected rows and the inserted row id.
    ///
    /// # Errors
    ///
    /// Returns [`DialectError::Encoding`] before execution for unstorable
    /// parameters, [`DialectError::Engine`] unchanged when the engine rejects
    /// the statement, and [`DialectError::Closed`] after close.
    pub fn execute(&mut self, statement: &CompiledStatement) -> Result<QueryResult, DialectError> {
        let parameters = encode_parameters(&statement.parameters)?;
        let sql = self.settings.statement_sql(statement);
        if self.settings.debug {
            debug!(
                kind = statement.kind.as_str(),
                parameters = parameters.len(),
                sql = %sql,
                "executing statement"
            );
        }
        let native = self.native()?;
        let result = match statement.kind {
            StatementKind::Select | StatementKind::Raw => {
                native.query_rows(&sql, &parameters).map(|result_set| QueryResult {
                    rows: self.settings.decode(result_set),
                    affected_rows: 0,
                    insert_id: None,
                })
            }
            StatementKind::Mutation | StatementKind::CreateTable => {
                native.execute_mutation(&sql, &parameters).map(|outcome| QueryResult {
                    rows: outcome
                        .returning
                        .map(|result_set| self.settings.decode(result_set))
                        .unwrap_or_default(),
                    affected_rows: outcome.affected_rows,
                    insert_id: outcome.insert_id,
                })
            }
        };
        self.sync_transaction_state();
        result.map_err(DialectError::from)
    }

    /// Executes statement text verbatim, bypassing encoding and decoding.
    ///
    /// # Errors
    ///
    /// Returns the engine error unchanged, or [`DialectError::Closed`].
    pub fn execute_direct(&mut self, sql: &str) -> Result<(), DialectError> {
        if self.settings.debug {
            debug!(kind = "direct", sql, "executing statement");
        }
        let outcome = self.native()?.execute_raw(sql);
        self.sync_transaction_state();
        outcome.map_err(DialectError::from)
    }

    /// Opens a transaction.
    ///
    /// # Errors
    ///
    /// Returns [`DialectError::Unsupported`] when a transaction is already
    /// open (state unchanged), or the engine error.
    pub fn begin(&mut self) -> Result<(), DialectError> {
        self.lease.transaction.check_begin()?;
        self.execute_direct(BEGIN_SQL)
    }

    /// Commits the open transaction.
    ///
    /// # Errors
    ///
    /// Returns [`DialectError::Unsupported`] without a matching begin, or the
    /// engine error; a failed commit leaves the transaction open when the
    /// engine keeps it open.
    pub fn commit(&mut self) -> Result<(), DialectError> {
        self.lease.transaction.check_end("commit")?;
        self.execute_direct(COMMIT_SQL)
    }

    /// Rolls back the open transaction.
    ///
    /// # Errors
    ///
    /// Returns [`DialectError::Unsupported`] without a matching begin, or the
    /// engine error.
    pub fn rollback(&mut self) -> Result<(), DialectError> {
        self.lease.transaction.check_end("rollback")?;
        self.execute_direct(ROLLBACK_SQL)
    }

    /// Returns the connection's transaction state.
    #[must_use]
    pub fn transaction_state(&self) -> TransactionState {
        self.lease.transaction
    }

    /// Returns the open native connection.
    fn native(&self) -> Result<&NativeConnection, DialectError> {
        self.lease.native.as_ref().ok_or(DialectError::Closed)
    }

    /// Re-reads the transaction state from the engine's autocommit flag.
    fn sync_transaction_state(&mut self) {
        if let Some(native) = &self.lease.native {
            self.lease.transaction = TransactionState::from_autocommit(native.is_autocommit());
        }
    }
}

impl Drop for DialectConnection {
    fn drop(&mut self) {
        if self.lease.transaction != TransactionState::InTransaction {
            return;
        }
        warn!("connection released inside an open transaction; rolling back");
        if let Err(err) = self.execute_direct(ROLLBACK_SQL) {
            warn!(error = %err, "rollback on release failed");
        }
    }
}
