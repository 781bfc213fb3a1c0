// crates/affinity-codec/src/lib.rs
// ============================================================================
// Module: Affinity Codec Library
// Description: Public API surface for the affinity value codec.
// Purpose: Expose the value model, classifier, serializer, and deserializers.
// Dependencies: crate::{value, temporal, classify, serialize, rules, deserialize}
// ============================================================================

//! ## Overview
//! `affinity-codec` bridges SQLite's per-row storage affinity and a closed,
//! statically typed application value model. Parameters are encoded into the
//! five storable primitives before a statement runs; result sets are
//! reconstructed into typed rows either by sampling each column once
//! (auto-affinity) or by caller-declared column-name rules.
//!
//! The crate is backend-agnostic: it never touches a connection and performs
//! no I/O.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod classify;
pub mod deserialize;
pub mod error;
pub mod rules;
pub mod serialize;
pub mod temporal;
pub mod value;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use classify::classify;
pub use classify::classify_storage;
pub use classify::classify_text;
pub use deserialize::ColumnKindMap;
pub use deserialize::ConversionStrategy;
pub use deserialize::ErrorHook;
pub use deserialize::convert_cell;
pub use deserialize::decode_rows;
pub use error::DecodeError;
pub use error::EncodeError;
pub use rules::ColumnMatcher;
pub use rules::ConversionRule;
pub use serialize::encode_parameters;
pub use serialize::encode_value;
pub use value::ResultSet;
pub use value::Row;
pub use value::SemanticKind;
pub use value::StorageValue;
pub use value::Value;
