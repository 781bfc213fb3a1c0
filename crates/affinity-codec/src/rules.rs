// crates/affinity-codec/src/rules.rs
// ============================================================================
// Module: Column-Name Conversion Rules
// Description: Caller-declared (kind, column-name predicate) pairs.
// Purpose: Type result columns by name when sampling is not precise enough.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! A rule list is evaluated in order per column; the first matching rule
//! decides the column's kind and unmatched columns stay raw. Exact, prefix,
//! and suffix matchers deserialize from configuration files; arbitrary
//! predicates are available through [`ColumnMatcher::Custom`].

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;

use serde::Deserialize;

use crate::value::SemanticKind;

// ============================================================================
// SECTION: Matchers
// ============================================================================

/// Column-name predicate closure.
pub type ColumnPredicate = dyn Fn(&str) -> bool + Send + Sync;

/// Column-name predicate.
#[derive(Clone, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnMatcher {
    /// Name equals the given text.
    Exact(String),
    /// Name starts with the given text.
    Prefix(String),
    /// Name ends with the given text.
    Suffix(String),
    /// Arbitrary predicate; not available from configuration files.
    #[serde(skip)]
    Custom(Arc<ColumnPredicate>),
}

impl ColumnMatcher {
    /// Returns true when `column` satisfies the predicate.
    #[must_use]
    pub fn matches(&self, column: &str) -> bool {
        match self {
            Self::Exact(name) => column == name,
            Self::Prefix(prefix) => column.starts_with(prefix.as_str()),
            Self::Suffix(suffix) => column.ends_with(suffix.as_str()),
            Self::Custom(predicate) => predicate(column),
        }
    }
}

impl fmt::Debug for ColumnMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exact(name) => f.debug_tuple("Exact").field(name).finish(),
            Self::Prefix(prefix) => f.debug_tuple("Prefix").field(prefix).finish(),
            Self::Suffix(suffix) => f.debug_tuple("Suffix").field(suffix).finish(),
            Self::Custom(_) => f.debug_tuple("Custom").finish_non_exhaustive(),
        }
    }
}

// ============================================================================
// SECTION: Rules
// ============================================================================

/// One declared conversion: columns matching `matcher` decode as `kind`.
#[derive(Debug, Clone, Deserialize)]
pub struct ConversionRule {
    /// Kind assigned to matching columns.
    pub kind: SemanticKind,
    /// Column-name predicate.
    #[serde(rename = "match")]
    pub matcher: ColumnMatcher,
}

impl ConversionRule {
    /// Builds a rule from a kind and matcher.
    #[must_use]
    pub const fn new(kind: SemanticKind, matcher: ColumnMatcher) -> Self {
        Self {
            kind,
            matcher,
        }
    }

    /// Matches one exact column name.
    #[must_use]
    pub fn exact(kind: SemanticKind, name: impl Into<String>) -> Self {
        Self::new(kind, ColumnMatcher::Exact(name.into()))
    }

    /// Matches columns starting with `prefix`.
    #[must_use]
    pub fn prefix(kind: SemanticKind, prefix: impl Into<String>) -> Self {
        Self::new(kind, ColumnMatcher::Prefix(prefix.into()))
    }

    /// Matches columns ending with `suffix`.
    #[must_use]
    pub fn suffix(kind: SemanticKind, suffix: impl Into<String>) -> Self {
        Self::new(kind, ColumnMatcher::Suffix(suffix.into()))
    }

    /// Matches columns accepted by an arbitrary predicate.
    #[must_use]
    pub fn custom(
        kind: SemanticKind,
        predicate: impl Fn(&str) -> bool + Send + Sync + 'static,
    ) -> Self {
        Self::new(kind, ColumnMatcher::Custom(Arc::new(predicate)))
    }

    /// Returns true when the rule applies to `column`.
    #[must_use]
    pub fn matches(&self, column: &str) -> bool {
        self.matcher.matches(column)
    }
}

/// Returns the kind of the first rule matching `column`.
#[must_use]
pub fn first_match(rules: &[ConversionRule], column: &str) -> Option<SemanticKind> {
    rules.iter().find(|rule| rule.matches(column)).map(|rule| rule.kind)
}
