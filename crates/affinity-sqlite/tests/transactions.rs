// crates/affinity-sqlite/tests/transactions.rs
// ============================================================================
// Module: Transaction Emulation Tests
// Description: Begin/commit/rollback passthrough under the connection lease.
// Purpose: Validate the single-level transaction state machine.
// Dependencies: affinity-sqlite, affinity-codec
// ============================================================================

//! ## Overview
//! Transactions are emulated with passthrough statements while a lease is
//! held. These tests cover nesting rejection, unmatched ends, durability of
//! commits, and rollback when a lease is abandoned.

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only panic-based assertions are permitted."
)]

// ============================================================================
// SECTION: Imports
// ============================================================================

use affinity_codec::Value;
use affinity_sqlite::CompiledStatement;
use affinity_sqlite::DialectConfig;
use affinity_sqlite::DialectError;
use affinity_sqlite::SqliteDialect;
use affinity_sqlite::TransactionState;

// ============================================================================
// SECTION: Fixtures
// ============================================================================

async fn dialect_with_entries() -> SqliteDialect {
    let dialect = SqliteDialect::connect(DialectConfig::default()).unwrap();
    dialect
        .execute(&CompiledStatement::create_table(
            "create table entries (id integer primary key, label text not null)",
        ))
        .await
        .unwrap();
    dialect
}

fn insert(label: Option<&str>) -> CompiledStatement {
    CompiledStatement::mutation("insert into entries (label) values (?1)", vec![Value::from(label)])
}

async fn count_entries(dialect: &SqliteDialect) -> i64 {
    dialect
        .execute(&CompiledStatement::select("select count(*) as total from entries", Vec::new()))
        .await
        .unwrap()
        .into_first()
        .and_then(|row| row.get("total").and_then(Value::as_i64))
        .unwrap()
}

// ============================================================================
// SECTION: State Machine
// ============================================================================

#[tokio::test]
async fn nested_begin_is_rejected_without_changing_state() {
    let dialect = dialect_with_entries().await;
    let mut connection = dialect.acquire().await;
    connection.begin().unwrap();

    let err = connection.begin().unwrap_err();
    assert!(matches!(err, DialectError::Unsupported(_)));
    assert_eq!(connection.transaction_state(), TransactionState::InTransaction);

    connection.rollback().unwrap();
    assert_eq!(connection.transaction_state(), TransactionState::Idle);
}

#[tokio::test]
async fn commit_and_rollback_require_a_begin() {
    let dialect = dialect_with_entries().await;
    let mut connection = dialect.acquire().await;
    assert!(matches!(connection.commit(), Err(DialectError::Unsupported(_))));
    assert!(matches!(connection.rollback(), Err(DialectError::Unsupported(_))));
    assert_eq!(connection.transaction_state(), TransactionState::Idle);
}

#[tokio::test]
async fn passthrough_statements_keep_state_in_sync() {
    let dialect = dialect_with_entries().await;
    let mut connection = dialect.acquire().await;
    connection.execute_direct("begin").unwrap();
    assert_eq!(connection.transaction_state(), TransactionState::InTransaction);
    connection.execute_direct("commit").unwrap();
    assert_eq!(connection.transaction_state(), TransactionState::Idle);
}

// ============================================================================
// SECTION: Outcomes
// ============================================================================

#[tokio::test]
async fn committed_writes_persist() {
    let dialect = dialect_with_entries().await;
    let mut tx = dialect.begin_transaction().await.unwrap();
    tx.execute(&insert(Some("first"))).unwrap();
    tx.execute(&insert(Some("second"))).unwrap();
    tx.commit().unwrap();
    drop(tx);
    assert_eq!(count_entries(&dialect).await, 2);
}

#[tokio::test]
async fn rolled_back_writes_vanish() {
    let dialect = dialect_with_entries().await;
    let mut tx = dialect.begin_transaction().await.unwrap();
    tx.execute(&insert(Some("discarded"))).unwrap();
    tx.rollback().unwrap();
    drop(tx);
    assert_eq!(count_entries(&dialect).await, 0);
}

#[tokio::test]
async fn failed_statement_leaves_transaction_open() {
    let dialect = dialect_with_entries().await;
    let mut tx = dialect.begin_transaction().await.unwrap();
    tx.execute(&insert(Some("kept"))).unwrap();
    let err = tx.execute(&insert(None)).unwrap_err();
    assert!(matches!(err, DialectError::Engine(_)));
    assert_eq!(tx.transaction_state(), TransactionState::InTransaction);
    tx.commit().unwrap();
    drop(tx);
    assert_eq!(count_entries(&dialect).await, 1);
}

#[tokio::test]
async fn abandoned_lease_rolls_back() {
    let dialect = dialect_with_entries().await;
    {
        let mut tx = dialect.begin_transaction().await.unwrap();
        tx.execute(&insert(Some("abandoned"))).unwrap();
    }
    assert!(!dialect.is_locked());
    assert_eq!(count_entries(&dialect).await, 0);
    assert_eq!(dialect.acquire().await.transaction_state(), TransactionState::Idle);
}

#[tokio::test]
async fn early_error_return_inside_transaction_releases_and_rolls_back() {
    async fn transfer(dialect: &SqliteDialect) -> Result<(), DialectError> {
        let mut tx = dialect.begin_transaction().await?;
        tx.execute(&insert(Some("partial")))?;
        tx.execute(&insert(None))?;
        tx.commit()
    }

    let dialect = dialect_with_entries().await;
    assert!(transfer(&dialect).await.is_err());
    assert!(!dialect.is_locked());
    assert_eq!(count_entries(&dialect).await, 0);
}
