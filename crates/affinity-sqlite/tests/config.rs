// crates/affinity-sqlite/tests/config.rs
// ============================================================================
// Module: SQLite Dialect Config Tests
// Description: TOML loading, defaults, and fail-closed validation.
// Purpose: Ensure invalid option combinations never reach a connection.
// Dependencies: affinity-sqlite, tempfile
// ============================================================================

//! ## Overview
//! Validates [`DialectConfig`] parsing from TOML and the checks that run
//! before a dialect opens its connection.

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

use std::fs;
use std::path::PathBuf;

use affinity_codec::ConversionStrategy;
use affinity_codec::SemanticKind;
use affinity_sqlite::ConfigError;
use affinity_sqlite::DatabaseSource;
use affinity_sqlite::DialectConfig;
use tempfile::TempDir;

// ============================================================================
// SECTION: Parsing
// ============================================================================

#[test]
fn empty_document_yields_defaults() {
    let config = DialectConfig::from_toml_str("").unwrap();
    assert_eq!(config.database, DatabaseSource::Memory);
    assert!(!config.disable_foreign_keys);
    assert!(!config.disable_strict_mode_create_table);
    assert!(!config.disable_wal);
    assert!(!config.debug);
    assert_eq!(config.busy_timeout_ms, 5_000);
    assert!(matches!(config.conversion_strategy(), ConversionStrategy::Passthrough));
}

#[test]
fn rules_and_file_database_parse() {
    let config = DialectConfig::from_toml_str(
        r#"
debug = true
busy_timeout_ms = 250
database = { file = "data/app.db" }

[[column_name_based_conversion]]
kind = "boolean"
match = { prefix = "is_" }

[[column_name_based_conversion]]
kind = "json"
match = { suffix = "_json" }

[[column_name_based_conversion]]
kind = "datetime"
match = { exact = "created_at" }
"#,
    )
    .unwrap();

    assert!(config.debug);
    assert_eq!(config.busy_timeout_ms, 250);
    assert_eq!(config.database, DatabaseSource::File(PathBuf::from("data/app.db")));
    let ConversionStrategy::ColumnName(rules) = config.conversion_strategy() else {
        panic!("expected column-name strategy");
    };
    assert_eq!(rules.len(), 3);
    assert_eq!(rules[0].kind, SemanticKind::Boolean);
    assert!(rules[0].matches("is_admin"));
    assert!(rules[1].matches("meta_json"));
    assert!(rules[2].matches("created_at"));
    assert!(!rules[2].matches("created_at_2"));
}

#[test]
fn auto_affinity_selects_sampling_strategy() {
    let config = DialectConfig::from_toml_str("auto_affinity_conversion = true").unwrap();
    assert!(matches!(config.conversion_strategy(), ConversionStrategy::AutoAffinity));
}

#[test]
fn unknown_fields_are_rejected() {
    let err = DialectConfig::from_toml_str("journal = \"wal\"").unwrap_err();
    assert!(matches!(err, ConfigError::Parse(_)));
}

#[test]
fn unknown_semantic_kind_is_rejected() {
    let err = DialectConfig::from_toml_str(
        r#"
[[column_name_based_conversion]]
kind = "decimal"
match = { exact = "price" }
"#,
    )
    .unwrap_err();
    assert!(matches!(err, ConfigError::Parse(_)));
}

// ============================================================================
// SECTION: Validation
// ============================================================================

#[test]
fn both_conversion_strategies_conflict() {
    let err = DialectConfig::from_toml_str(
        r#"
auto_affinity_conversion = true

[[column_name_based_conversion]]
kind = "boolean"
match = { prefix = "is_" }
"#,
    )
    .unwrap_err();
    assert!(matches!(err, ConfigError::Conflict(_)));
}

#[test]
fn zero_busy_timeout_is_invalid() {
    let err = DialectConfig::from_toml_str("busy_timeout_ms = 0").unwrap_err();
    assert!(matches!(err, ConfigError::Invalid(_)));
}

#[test]
fn directory_database_path_is_invalid() {
    let temp = TempDir::new().unwrap();
    let err = DialectConfig::file(temp.path()).validate().unwrap_err();
    assert!(matches!(err, ConfigError::Invalid(_)));
    let err = DialectConfig::file("").validate().unwrap_err();
    assert!(matches!(err, ConfigError::Invalid(_)));
}

// ============================================================================
// SECTION: Loading
// ============================================================================

#[test]
fn load_reads_and_validates_file() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("dialect.toml");
    fs::write(&path, "disable_wal = true\n").unwrap();
    let config = DialectConfig::load(&path).unwrap();
    assert!(config.disable_wal);
}

#[test]
fn load_rejects_missing_and_oversized_files() {
    let temp = TempDir::new().unwrap();
    let missing = DialectConfig::load(&temp.path().join("missing.toml")).unwrap_err();
    assert!(matches!(missing, ConfigError::Io(_)));

    let path = temp.path().join("huge.toml");
    fs::write(&path, format!("# {}\n", "x".repeat(70 * 1024))).unwrap();
    let oversized = DialectConfig::load(&path).unwrap_err();
    assert!(matches!(oversized, ConfigError::Invalid(_)));
}
