//! Trade record representation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{InstrumentId, Price};

/// A single executed trade in canonical form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeRecord {
    /// Event timestamp (UTC, nanosecond precision).
    pub event_time: DateTime<Utc>,
    /// Trade price (fixed point, always positive).
    pub price: Price,
    /// Number of units traded (always positive).
    pub size: u64,
    /// Instrument the trade belongs to.
    pub instrument_id: InstrumentId,
}

impl TradeRecord {
    /// Creates a new trade record.
    #[must_use]
    pub fn new(
        event_time: DateTime<Utc>,
        price: Price,
        size: u64,
        instrument_id: impl Into<InstrumentId>,
    ) -> Self {
        Self {
            event_time,
            price,
            size,
            instrument_id: instrument_id.into(),
        }
    }
}

/// An untyped cell value as read from a source file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    /// Integer cell.
    Int(i64),
    /// Floating-point cell.
    Float(f64),
    /// Text cell.
    Text(String),
}

impl RawValue {
    /// Interprets the value as an exact integer.
    ///
    /// Floats are accepted only when finite and integral; text is parsed as
    /// an integer first and as an integral float second.
    #[must_use]
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(*v),
            Self::Float(v) => float_to_integer(*v),
            Self::Text(s) => {
                let s = s.trim();
                s.parse::<i64>()
                    .ok()
                    .or_else(|| s.parse::<f64>().ok().and_then(float_to_integer))
            }
        }
    }
}

impl std::fmt::Display for RawValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Int(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Text(s) => write!(f, "{s:?}"),
        }
    }
}

impl From<i64> for RawValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<f64> for RawValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<&str> for RawValue {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<String> for RawValue {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

fn float_to_integer(v: f64) -> Option<i64> {
    // i64::MAX is not representable as f64, so compare against 2^63.
    const LIMIT: f64 = 9_223_372_036_854_775_808.0;
    if v.is_finite() && v.fract() == 0.0 && v >= -LIMIT && v < LIMIT {
        Some(v as i64)
    } else {
        None
    }
}

/// A raw trade row before normalization.
///
/// Fields are optional because source rows may be incomplete; the normalizer
/// decides whether a row is usable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawTrade {
    /// Zero-based row index within the source.
    pub row: usize,
    /// Event timestamp cell (`ts_event`).
    pub ts_event: Option<RawValue>,
    /// Price cell (scaled integer).
    pub price: Option<RawValue>,
    /// Size cell.
    pub size: Option<RawValue>,
    /// Instrument identifier (`instrument_id` or `symbol`).
    pub instrument_id: Option<InstrumentId>,
}

impl RawTrade {
    /// Creates a raw trade with all fields present.
    #[must_use]
    pub fn new(
        row: usize,
        ts_event: impl Into<RawValue>,
        price: impl Into<RawValue>,
        size: impl Into<RawValue>,
        instrument_id: impl Into<InstrumentId>,
    ) -> Self {
        Self {
            row,
            ts_event: Some(ts_event.into()),
            price: Some(price.into()),
            size: Some(size.into()),
            instrument_id: Some(instrument_id.into()),
        }
    }
}
