//! OHLCV aggregation interval definitions.

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// OHLCV aggregation interval.
///
/// Every interval divides a UTC day evenly, so buckets are aligned to the
/// Unix epoch and to UTC calendar units at the same time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Interval {
    /// 1-minute bars.
    #[default]
    Minute,
    /// 1-hour bars.
    Hour,
    /// Daily bars (UTC calendar day).
    Day,
}

impl Interval {
    /// Returns the bucket width in seconds.
    #[must_use]
    pub const fn seconds(&self) -> i64 {
        match self {
            Self::Minute => 60,
            Self::Hour => 3_600,
            Self::Day => 86_400,
        }
    }

    /// Returns the bucket width as a duration.
    #[must_use]
    pub fn duration(&self) -> TimeDelta {
        TimeDelta::seconds(self.seconds())
    }

    /// Truncates an instant to the start of its bucket.
    ///
    /// The result is the left edge of the half-open bucket
    /// `[start, start + width)` containing `instant`.
    #[must_use]
    pub fn truncate(&self, instant: DateTime<Utc>) -> DateTime<Utc> {
        let into_bucket = instant.timestamp().rem_euclid(self.seconds());
        let subsec = i64::from(instant.timestamp_subsec_nanos());
        instant - TimeDelta::seconds(into_bucket) - TimeDelta::nanoseconds(subsec)
    }

    /// Returns the interval as a string identifier.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Minute => "minute",
            Self::Hour => "hour",
            Self::Day => "day",
        }
    }

    /// Returns all available intervals.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Minute, Self::Hour, Self::Day]
    }
}

impl std::fmt::Display for Interval {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Interval {
    type Err = IntervalParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "minute" | "min" | "m1" | "1m" | "1min" => Ok(Self::Minute),
            "hour" | "h1" | "1h" | "1hour" => Ok(Self::Hour),
            "day" | "d1" | "1d" | "1day" | "daily" => Ok(Self::Day),
            _ => Err(IntervalParseError(s.to_string())),
        }
    }
}

/// Error returned when parsing an invalid interval string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntervalParseError(String);

impl std::fmt::Display for IntervalParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "invalid interval '{}', expected one of: minute, hour, day",
            self.0
        )
    }
}

impl std::error::Error for IntervalParseError {}
