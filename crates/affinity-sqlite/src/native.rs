// crates/affinity-sqlite/src/native.rs
// ============================================================================
// Module: Native Engine Binding
// Description: The three execution primitives over one rusqlite connection.
// Purpose: Be the only code that touches the physical connection.
// Dependencies: affinity-codec, rusqlite
// ============================================================================

//! ## Overview
//! [`NativeConnection`] exposes execute-for-rows, execute-for-mutation, and
//! raw passthrough. It binds and returns [`StorageValue`]s only; typing is
//! the caller's concern. Errors are returned as [`rusqlite::Error`] without
//! translation.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::time::Duration;

use affinity_codec::ResultSet;
use affinity_codec::StorageValue;
use rusqlite::Connection;
use rusqlite::OpenFlags;
use rusqlite::params_from_iter;
use rusqlite::types::Value as SqlValue;
use rusqlite::types::ValueRef;

use crate::config::DatabaseSource;
use crate::config::DialectConfig;

// ============================================================================
// SECTION: Outcomes
// ============================================================================

/// Result of a mutation statement.
#[derive(Debug, Clone, PartialEq)]
pub struct MutationOutcome {
    /// Rows inserted, updated, or deleted.
    pub affected_rows: u64,
    /// Last inserted rowid, when the statement changed rows.
    pub insert_id: Option<i64>,
    /// Rows produced by a `RETURNING` clause.
    pub returning: Option<ResultSet>,
}

// ============================================================================
// SECTION: Connection
// ============================================================================

/// The single physical connection.
pub struct NativeConnection {
    /// Underlying rusqlite handle.
    connection: Connection,
}

impl NativeConnection {
    /// Opens the configured database and applies connection pragmas.
    ///
    /// # Errors
    ///
    /// Returns [`rusqlite::Error`] when the database cannot be opened or
    /// configured.
    pub fn open(config: &DialectConfig) -> Result<Self, rusqlite::Error> {
        let connection = match &config.database {
            DatabaseSource::Memory => Connection::open_in_memory()?,
            DatabaseSource::File(path) => {
                let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
                    | OpenFlags::SQLITE_OPEN_CREATE
                    | OpenFlags::SQLITE_OPEN_NO_MUTEX;
                Connection::open_with_flags(path, flags)?
            }
        };
        Self::adopt(connection, config)
    }

    /// Takes ownership of a pre-opened handle and applies connection pragmas.
    ///
    /// # Errors
    ///
    /// Returns [`rusqlite::Error`] when a pragma fails.
    pub fn adopt(connection: Connection, config: &DialectConfig) -> Result<Self, rusqlite::Error> {
        apply_pragmas(&connection, config)?;
        Ok(Self {
            connection,
        })
    }

    /// Runs a statement and collects every row.
    ///
    /// # Errors
    ///
    /// Returns the engine error unchanged.
    pub fn query_rows(
        &self,
        sql: &str,
        parameters: &[StorageValue],
    ) -> Result<ResultSet, rusqlite::Error> {
        let mut statement = self.connection.prepare(sql)?;
        collect_rows(&mut statement, parameters)
    }

    /// Runs a mutation and reports its effect.
    ///
    /// Statements with a `RETURNING` clause also yield their rows, and their
    /// affected count is the number of rows returned.
    ///
    /// The insert id is the engine's last inserted rowid and is reported
    /// whenever the statement changed rows. For updates and deletes that is
    /// the rowid of the most recent insert on this connection.
    ///
    /// # Errors
    ///
    /// Returns the engine error unchanged.
    pub fn execute_mutation(
        &self,
        sql: &str,
        parameters: &[StorageValue],
    ) -> Result<MutationOutcome, rusqlite::Error> {
        let mut statement = self.connection.prepare(sql)?;
        let (affected_rows, returning) = if statement.column_count() == 0 {
            let changed = statement.execute(params_from_iter(bind_values(parameters)))?;
            (u64::try_from(changed).unwrap_or(u64::MAX), None)
        } else {
            let rows = collect_rows(&mut statement, parameters)?;
            (u64::try_from(rows.len()).unwrap_or(u64::MAX), Some(rows))
        };
        drop(statement);
        let rowid = self.connection.last_insert_rowid();
        Ok(MutationOutcome {
            affected_rows,
            insert_id: (affected_rows > 0 && rowid != 0).then_some(rowid),
            returning,
        })
    }

    /// Executes statement text verbatim, without parameters or rows.
    ///
    /// # Errors
    ///
    /// Returns the engine error unchanged.
    pub fn execute_raw(&self, sql: &str) -> Result<(), rusqlite::Error> {
        self.connection.execute_batch(sql)
    }

    /// Returns true when no transaction is open on the connection.
    #[must_use]
    pub fn is_autocommit(&self) -> bool {
        self.connection.is_autocommit()
    }

    /// Returns the engine library version.
    ///
    /// # Errors
    ///
    /// Returns the engine error unchanged.
    pub fn runtime_version(&self) -> Result<String, rusqlite::Error> {
        self.connection.query_row("select sqlite_version()", [], |row| row.get(0))
    }

    /// Closes the connection.
    ///
    /// # Errors
    ///
    /// Returns the engine error when outstanding statements prevent closing.
    pub fn close(self) -> Result<(), rusqlite::Error> {
        self.connection.close().map_err(|(_, err)| err)
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Applies the connection pragmas selected by `config`.
fn apply_pragmas(connection: &Connection, config: &DialectConfig) -> Result<(), rusqlite::Error> {
    if !config.disable_foreign_keys {
        connection.execute_batch("PRAGMA foreign_keys = ON;")?;
    }
    if !config.disable_wal && matches!(config.database, DatabaseSource::File(_)) {
        connection.query_row("PRAGMA journal_mode = WAL;", [], |_| Ok(()))?;
    }
    connection.busy_timeout(Duration::from_millis(config.busy_timeout_ms))
}

/// Steps a prepared statement to completion, collecting rows.
fn collect_rows(
    statement: &mut rusqlite::Statement<'_>,
    parameters: &[StorageValue],
) -> Result<ResultSet, rusqlite::Error> {
    let columns: Vec<String> =
        statement.column_names().into_iter().map(str::to_string).collect();
    let width = columns.len();
    let mut rows = statement.query(params_from_iter(bind_values(parameters)))?;
    let mut collected = Vec::new();
    while let Some(row) = rows.next()? {
        let mut cells = Vec::with_capacity(width);
        for index in 0 .. width {
            cells.push(storage_from_ref(row.get_ref(index)?));
        }
        collected.push(cells);
    }
    Ok(ResultSet::new(columns, collected))
}

/// Converts encoded parameters into rusqlite bind values.
fn bind_values(parameters: &[StorageValue]) -> impl Iterator<Item = SqlValue> + '_ {
    parameters.iter().map(|parameter| match parameter {
        StorageValue::Null => SqlValue::Null,
        StorageValue::Integer(value) => SqlValue::Integer(*value),
        StorageValue::Real(value) => SqlValue::Real(*value),
        StorageValue::Text(text) => SqlValue::Text(text.clone()),
        StorageValue::Blob(bytes) => SqlValue::Blob(bytes.clone()),
    })
}

/// Copies one engine cell into a storage value.
fn storage_from_ref(cell: ValueRef<'_>) -> StorageValue {
    match cell {
        ValueRef::Null => StorageValue::Null,
        ValueRef::Integer(value) => StorageValue::Integer(value),
        ValueRef::Real(value) => StorageValue::Real(value),
        ValueRef::Text(bytes) => StorageValue::Text(String::from_utf8_lossy(bytes).into_owned()),
        ValueRef::Blob(bytes) => StorageValue::Blob(bytes.to_vec()),
    }
}
