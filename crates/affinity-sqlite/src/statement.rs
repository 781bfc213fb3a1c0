// crates/affinity-sqlite/src/statement.rs
// ============================================================================
// Module: Compiled Statements
// Description: Statement input from the query compiler and dialect output.
// Purpose: Carry the operation-kind tag used to route execution.
// Dependencies: affinity-codec
// ============================================================================

//! ## Overview
//! The dialect never inspects SQL to decide how a statement runs; the
//! compiler's [`StatementKind`] tag decides. The only text rewrite is the
//! `STRICT` table option appended to [`StatementKind::CreateTable`]
//! statements.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::borrow::Cow;

use affinity_codec::Row;
use affinity_codec::Value;

// ============================================================================
// SECTION: Statements
// ============================================================================

/// Operation-kind tag assigned by the query compiler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementKind {
    /// Read statement; rows are decoded.
    Select,
    /// Insert, update, or delete; affected rows and insert id are reported.
    Mutation,
    /// Hand-written SQL; executed on the rows path.
    Raw,
    /// Table creation; executed on the mutation path.
    CreateTable,
}

impl StatementKind {
    /// Returns a stable label for logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Select => "select",
            Self::Mutation => "mutation",
            Self::Raw => "raw",
            Self::CreateTable => "create_table",
        }
    }
}

/// Statement text, ordered parameters, and operation kind.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledStatement {
    /// SQL text with positional placeholders.
    pub sql: String,
    /// Parameters in placeholder order.
    pub parameters: Vec<Value>,
    /// Operation kind.
    pub kind: StatementKind,
}

impl CompiledStatement {
    /// Builds a statement.
    #[must_use]
    pub fn new(kind: StatementKind, sql: impl Into<String>, parameters: Vec<Value>) -> Self {
        Self {
            sql: sql.into(),
            parameters,
            kind,
        }
    }

    /// Builds a read statement.
    #[must_use]
    pub fn select(sql: impl Into<String>, parameters: Vec<Value>) -> Self {
        Self::new(StatementKind::Select, sql, parameters)
    }

    /// Builds a mutation statement.
    #[must_use]
    pub fn mutation(sql: impl Into<String>, parameters: Vec<Value>) -> Self {
        Self::new(StatementKind::Mutation, sql, parameters)
    }

    /// Builds a raw statement.
    #[must_use]
    pub fn raw(sql: impl Into<String>, parameters: Vec<Value>) -> Self {
        Self::new(StatementKind::Raw, sql, parameters)
    }

    /// Builds a create-table statement.
    #[must_use]
    pub fn create_table(sql: impl Into<String>) -> Self {
        Self::new(StatementKind::CreateTable, sql, Vec::new())
    }
}

// ============================================================================
// SECTION: Results
// ============================================================================

/// Outcome of one executed statement.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct QueryResult {
    /// Decoded rows (reads, raw statements, and `RETURNING` clauses).
    pub rows: Vec<Row>,
    /// Rows changed by a mutation; zero for reads.
    pub affected_rows: u64,
    /// Row id assigned by an insert.
    pub insert_id: Option<i64>,
}

impl QueryResult {
    /// Returns the first row, if any.
    #[must_use]
    pub fn first(&self) -> Option<&Row> {
        self.rows.first()
    }

    /// Consumes the result and returns its first row, if any.
    #[must_use]
    pub fn into_first(self) -> Option<Row> {
        self.rows.into_iter().next()
    }
}

// ============================================================================
// SECTION: Strict Tables
// ============================================================================

/// Appends the `STRICT` table option unless it is already present.
#[must_use]
pub fn with_strict_option(sql: &str) -> Cow<'_, str> {
    let body = sql.trim_end().trim_end_matches(';').trim_end();
    if ends_with_ignore_case(body, "STRICT") {
        Cow::Borrowed(sql)
    } else if ends_with_ignore_case(body, "WITHOUT ROWID") {
        Cow::Owned(format!("{body}, STRICT"))
    } else {
        Cow::Owned(format!("{body} STRICT"))
    }
}

/// ASCII case-insensitive suffix test that never splits a UTF-8 character.
fn ends_with_ignore_case(text: &str, suffix: &str) -> bool {
    text.len()
        .checked_sub(suffix.len())
        .and_then(|start| text.get(start ..))
        .is_some_and(|tail| tail.eq_ignore_ascii_case(suffix))
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strict_is_appended_after_trailing_semicolons() {
        assert_eq!(
            with_strict_option("create table t (id integer);  "),
            "create table t (id integer) STRICT"
        );
    }

    #[test]
    fn strict_joins_existing_table_options() {
        assert_eq!(
            with_strict_option("create table t (id integer primary key) without rowid"),
            "create table t (id integer primary key) without rowid, STRICT"
        );
    }

    #[test]
    fn strict_is_not_duplicated() {
        let sql = "create table t (id integer) strict;";
        assert!(matches!(with_strict_option(sql), Cow::Borrowed(text) if text == sql));
    }

    #[test]
    fn suffix_check_tolerates_multibyte_text() {
        assert!(!ends_with_ignore_case("é", "STRICT"));
        assert!(!ends_with_ignore_case("ééééé", "STRICT"));
    }
}
