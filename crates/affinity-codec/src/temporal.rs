// crates/affinity-codec/src/temporal.rs
// ============================================================================
// Module: Affinity Datetime Text Form
// Description: ISO-8601 formatting and parsing for stored instants.
// Purpose: Keep datetime text canonical on write and lenient on read.
// Dependencies: time
// ============================================================================

//! ## Overview
//! Instants are written as `YYYY-MM-DDTHH:MM:SS.mmmZ`: UTC, millisecond
//! precision, explicit `Z` offset. Reads accept any RFC 3339 offset and the
//! bare `YYYY-MM-DDTHH:MM:SS[.fff]` form, which is taken as UTC.

// ============================================================================
// SECTION: Imports
// ============================================================================

use time::Duration;
use time::OffsetDateTime;
use time::PrimitiveDateTime;
use time::UtcOffset;
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Largest year representable in the four-digit text form.
const MAX_TEXT_YEAR: i32 = 9999;
/// Nanoseconds per millisecond.
const NANOS_PER_MILLI: i128 = 1_000_000;
/// Milliseconds per second, for fractional epoch values.
const MILLIS_PER_SECOND: f64 = 1_000.0;

// ============================================================================
// SECTION: Formatting
// ============================================================================

/// Formats an instant as canonical UTC text with millisecond precision.
///
/// Returns `None` when the instant falls outside years `0000..=9999`.
#[must_use]
pub fn format_datetime(instant: OffsetDateTime) -> Option<String> {
    let utc = instant.checked_to_offset(UtcOffset::UTC)?;
    if !(0 ..= MAX_TEXT_YEAR).contains(&utc.year()) {
        return None;
    }
    Some(format!(
        "{:04}-{:02}-{:02}T{:02}:{:02}:{:02}.{:03}Z",
        utc.year(),
        u8::from(utc.month()),
        utc.day(),
        utc.hour(),
        utc.minute(),
        utc.second(),
        utc.millisecond()
    ))
}

// ============================================================================
// SECTION: Parsing
// ============================================================================

/// Parses stored datetime text.
#[must_use]
pub fn parse_datetime(text: &str) -> Option<OffsetDateTime> {
    let text = text.trim();
    OffsetDateTime::parse(text, &Rfc3339).ok().or_else(|| parse_bare_utc(text))
}

/// Converts unix epoch milliseconds into an instant.
#[must_use]
pub fn from_unix_millis(millis: i64) -> Option<OffsetDateTime> {
    OffsetDateTime::from_unix_timestamp_nanos(i128::from(millis) * NANOS_PER_MILLI).ok()
}

/// Converts fractional unix epoch milliseconds into an instant.
///
/// Returns `None` for non-finite or out-of-range values.
#[must_use]
pub fn from_unix_millis_f64(millis: f64) -> Option<OffsetDateTime> {
    let offset = Duration::checked_seconds_f64(millis / MILLIS_PER_SECOND)?;
    OffsetDateTime::UNIX_EPOCH.checked_add(offset)
}

/// Parses `YYYY-MM-DDTHH:MM:SS[.fff]` without an offset, as UTC.
fn parse_bare_utc(text: &str) -> Option<OffsetDateTime> {
    let (base, fraction) = match text.split_once('.') {
        Some((base, fraction)) => (base, Some(fraction)),
        None => (text, None),
    };
    let date_time = PrimitiveDateTime::parse(
        base,
        format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]"),
    )
    .ok()?;
    let nanos = match fraction {
        Some(digits) => parse_fraction_nanos(digits)?,
        None => 0,
    };
    date_time.replace_nanosecond(nanos).ok().map(PrimitiveDateTime::assume_utc)
}

/// Parses 1-9 fractional-second digits into nanoseconds.
fn parse_fraction_nanos(digits: &str) -> Option<u32> {
    if digits.is_empty() || digits.len() > 9 || !digits.bytes().all(|byte| byte.is_ascii_digit()) {
        return None;
    }
    let padded = format!("{digits:0<9}");
    padded.parse().ok()
}

// ============================================================================
// SECTION: Tests
// ============================================================================
