// crates/affinity-sqlite/src/config.rs
// ============================================================================
// Module: SQLite Dialect Config
// Description: Recognized dialect options, TOML loading, and validation.
// Purpose: Reject conflicting options before the connection is used.
// Dependencies: affinity-codec, serde, toml, thiserror
// ============================================================================

//! ## Overview
//! [`DialectConfig`] carries every option the dialect recognizes. Values can
//! be built in code or loaded from TOML; the error hook is code-only.
//! Validation is fail-closed and runs inside
//! [`crate::SqliteDialect::connect`] before any statement executes.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::path::Path;
use std::path::PathBuf;

use affinity_codec::ConversionRule;
use affinity_codec::ConversionStrategy;
use affinity_codec::ErrorHook;
use serde::Deserialize;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default busy timeout (ms).
const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;
/// Maximum accepted config file size.
const MAX_CONFIG_FILE_BYTES: usize = 64 * 1024;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Config file could not be read.
    #[error("sqlite dialect config io error: {0}")]
    Io(String),
    /// Config text is not valid TOML for this schema.
    #[error("sqlite dialect config parse error: {0}")]
    Parse(String),
    /// A single option holds an invalid value.
    #[error("sqlite dialect config invalid: {0}")]
    Invalid(String),
    /// Two options cannot be enabled together.
    #[error("sqlite dialect config conflict: {0}")]
    Conflict(String),
}

// ============================================================================
// SECTION: Config
// ============================================================================

/// Where the dialect's single connection points.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DatabaseSource {
    /// Private in-memory database.
    #[default]
    Memory,
    /// Database file, created when missing.
    File(PathBuf),
}

/// Configuration for the `SQLite` dialect.
///
/// # Invariants
/// - `auto_affinity_conversion` and a non-empty
///   `column_name_based_conversion` are mutually exclusive.
/// - `busy_timeout_ms` is interpreted as milliseconds and must be non-zero.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DialectConfig {
    /// Database location.
    #[serde(default)]
    pub database: DatabaseSource,
    /// Skip `PRAGMA foreign_keys = ON`.
    #[serde(default)]
    pub disable_foreign_keys: bool,
    /// Do not append the `STRICT` option to create-table statements.
    #[serde(default)]
    pub disable_strict_mode_create_table: bool,
    /// Keep the default rollback journal instead of WAL for file databases.
    #[serde(default)]
    pub disable_wal: bool,
    /// Log each statement before it executes.
    #[serde(default)]
    pub debug: bool,
    /// Type result columns by sampling.
    #[serde(default)]
    pub auto_affinity_conversion: bool,
    /// Type result columns by name rules, first match wins.
    #[serde(default)]
    pub column_name_based_conversion: Vec<ConversionRule>,
    /// Busy timeout in milliseconds.
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
    /// Receives soft decoding failures; logged at `warn` when absent.
    #[serde(skip)]
    pub on_error: Option<ErrorHook>,
}

/// Returns the default busy timeout for `SQLite` connections.
const fn default_busy_timeout_ms() -> u64 {
    DEFAULT_BUSY_TIMEOUT_MS
}

impl Default for DialectConfig {
    fn default() -> Self {
        Self::new(DatabaseSource::Memory)
    }
}

impl DialectConfig {
    /// Returns a config with every option at its default.
    #[must_use]
    pub const fn new(database: DatabaseSource) -> Self {
        Self {
            database,
            disable_foreign_keys: false,
            disable_strict_mode_create_table: false,
            disable_wal: false,
            debug: false,
            auto_affinity_conversion: false,
            column_name_based_conversion: Vec::new(),
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
            on_error: None,
        }
    }

    /// Returns a default config for a database file.
    #[must_use]
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self::new(DatabaseSource::File(path.into()))
    }

    /// Parses and validates a TOML config.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when parsing or validation fails.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self =
            toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Loads and validates a TOML config file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when reading, parsing, or validation fails.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let bytes = fs::read(path).map_err(|err| ConfigError::Io(err.to_string()))?;
        if bytes.len() > MAX_CONFIG_FILE_BYTES {
            return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
        }
        let content = std::str::from_utf8(&bytes)
            .map_err(|_| ConfigError::Invalid("config file must be utf-8".to_string()))?;
        Self::from_toml_str(content)
    }

    /// Validates option combinations.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Conflict`] when both conversion strategies are
    /// enabled and [`ConfigError::Invalid`] for out-of-range values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.auto_affinity_conversion && !self.column_name_based_conversion.is_empty() {
            return Err(ConfigError::Conflict(
                "auto_affinity_conversion and column_name_based_conversion cannot both be enabled"
                    .to_string(),
            ));
        }
        if self.busy_timeout_ms == 0 {
            return Err(ConfigError::Invalid(
                "busy_timeout_ms must be greater than zero".to_string(),
            ));
        }
        if let DatabaseSource::File(path) = &self.database
            && (path.as_os_str().is_empty() || path.is_dir())
        {
            return Err(ConfigError::Invalid("database path must name a file".to_string()));
        }
        Ok(())
    }

    /// Returns the row conversion strategy selected by this config.
    #[must_use]
    pub fn conversion_strategy(&self) -> ConversionStrategy {
        if self.auto_affinity_conversion {
            ConversionStrategy::AutoAffinity
        } else if self.column_name_based_conversion.is_empty() {
            ConversionStrategy::Passthrough
        } else {
            ConversionStrategy::ColumnName(self.column_name_based_conversion.clone())
        }
    }
}
