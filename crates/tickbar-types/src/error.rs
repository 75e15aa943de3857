//! Error types for tickbar.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use thiserror::Error;

/// Result type alias for tickbar operations.
pub type Result<T> = std::result::Result<T, TickbarError>;

/// Errors that can occur while turning trades into bars.
#[derive(Error, Debug)]
pub enum TickbarError {
    /// A trade row could not be normalized.
    #[error(transparent)]
    Record(#[from] RecordError),

    /// The aggregation pass failed.
    #[error(transparent)]
    Aggregate(#[from] AggregateError),

    /// A trading-session window could not be computed.
    #[error(transparent)]
    Session(#[from] SessionError),

    /// Invalid date range.
    #[error(transparent)]
    DateRange(#[from] DateRangeError),

    /// No valid records for the requested date.
    #[error("No valid trade records for {date}")]
    EmptyInput {
        /// The trading date that had no data.
        date: NaiveDate,
    },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Input or output format error.
    #[error("Format error: {0}")]
    Format(String),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Per-row normalization failures.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RecordError {
    /// The event timestamp is missing or matches no recognized format.
    #[error("Malformed timestamp at row {row}: {value}")]
    MalformedTimestamp {
        /// Zero-based source row.
        row: usize,
        /// The offending value, or `<missing>`.
        value: String,
    },

    /// A numeric field is missing, non-numeric, or not positive.
    #[error("Malformed {field} at row {row}: {value}")]
    MalformedValue {
        /// Zero-based source row.
        row: usize,
        /// Field name (`price` or `size`).
        field: &'static str,
        /// The offending value, or `<missing>`.
        value: String,
    },
}

impl RecordError {
    /// Returns the source row of the rejected record.
    #[must_use]
    pub const fn row(&self) -> usize {
        match self {
            Self::MalformedTimestamp { row, .. } | Self::MalformedValue { row, .. } => *row,
        }
    }
}

/// Aggregation failures.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AggregateError {
    /// A record's event time precedes the previous record's.
    #[error("Unordered input at index {index}: {current} precedes {previous}")]
    UnorderedInput {
        /// Position of the offending record in the input sequence.
        index: usize,
        /// Event time of the preceding record.
        previous: DateTime<Utc>,
        /// Event time of the offending record.
        current: DateTime<Utc>,
    },
}

/// Trading-session window failures.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// A session boundary falls into a daylight-saving gap.
    #[error("Session boundary {0} does not exist in {1}")]
    NonexistentLocalTime(NaiveDateTime, &'static str),
}

/// Error for invalid date ranges.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DateRangeError {
    /// Start date is after end date.
    #[error("Invalid date range: {start} > {end}")]
    InvalidRange {
        /// The start date.
        start: NaiveDate,
        /// The end date.
        end: NaiveDate,
    },
}
