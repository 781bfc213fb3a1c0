// crates/affinity-sqlite/src/lib.rs
// ============================================================================
// Module: SQLite Dialect Library
// Description: SQLite backend for compiled statements over one connection.
// Purpose: Expose the dialect handle, its config, and its connection lease.
// Dependencies: affinity-codec, rusqlite, tokio, tracing
// ============================================================================

//! ## Overview
//! `affinity-sqlite` runs statements produced by a query compiler against a
//! single `SQLite` connection. All access is serialized through a FIFO lock,
//! transactions are emulated with `begin`/`commit`/`rollback` passthrough
//! while the lock is held, and rows are typed through `affinity-codec`.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;
pub mod dialect;
pub mod error;
pub mod lock;
pub mod native;
pub mod statement;
pub mod transaction;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use affinity_codec;
pub use config::ConfigError;
pub use config::DatabaseSource;
pub use config::DialectConfig;
pub use dialect::DialectConnection;
pub use dialect::SqliteDialect;
pub use error::DialectError;
pub use lock::ConnectionLease;
pub use lock::ConnectionLock;
pub use native::MutationOutcome;
pub use native::NativeConnection;
pub use statement::CompiledStatement;
pub use statement::QueryResult;
pub use statement::StatementKind;
pub use transaction::TransactionState;
