//! Event timestamp coercion.
//!
//! Source files disagree on how `ts_event` is written: epoch nanoseconds,
//! ISO-8601 with a `Z` or a numeric offset, or a naive `YYYY-MM-DD HH:MM:SS`
//! string with an optional fractional part. Everything is coerced to a
//! nanosecond-precision UTC instant; naive strings are taken to be UTC.

use chrono::{DateTime, NaiveDateTime, Utc};
use tickbar_types::RawValue;

/// Offset-carrying layouts tried after RFC 3339.
const OFFSET_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f%:z",
    "%Y-%m-%dT%H:%M:%S%.f%:z",
    "%Y-%m-%d %H:%M:%S%.f%z",
    "%Y-%m-%dT%H:%M:%S%.f%z",
];

/// Naive layouts, interpreted as UTC.
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

/// Parses a raw timestamp cell into a UTC instant.
///
/// Integers (and integral floats) are epoch nanoseconds.
#[must_use]
pub fn parse_timestamp(value: &RawValue) -> Option<DateTime<Utc>> {
    match value {
        RawValue::Int(nanos) => Some(DateTime::from_timestamp_nanos(*nanos)),
        RawValue::Float(_) => value.as_integer().map(DateTime::from_timestamp_nanos),
        RawValue::Text(s) => parse_timestamp_str(s),
    }
}

/// Parses a timestamp string into a UTC instant.
#[must_use]
pub fn parse_timestamp_str(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    if is_epoch_nanos(s) {
        return s.parse::<i64>().ok().map(DateTime::from_timestamp_nanos);
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }

    if let Some(dt) = OFFSET_FORMATS
        .iter()
        .find_map(|fmt| DateTime::parse_from_str(s, fmt).ok())
    {
        return Some(dt.with_timezone(&Utc));
    }

    let naive = s
        .strip_suffix(['Z', 'z'])
        .or_else(|| s.strip_suffix(" UTC"))
        .unwrap_or(s);

    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(naive, fmt).ok())
        .map(|dt| dt.and_utc())
}

fn is_epoch_nanos(s: &str) -> bool {
    let digits = s.strip_prefix('-').unwrap_or(s);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}
