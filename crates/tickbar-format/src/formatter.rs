//! Output format abstraction.

use chrono::{DateTime, Utc};
use std::io::Write;
use thiserror::Error;
use tickbar_aggregate::Bar;
use tickbar_types::{TickbarError, TradeRecord};

/// Output format identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum OutputFormat {
    /// Apache Parquet format.
    #[default]
    Parquet,
    /// CSV format.
    Csv,
    /// JSON array format.
    Json,
    /// Newline-delimited JSON format.
    Ndjson,
}

impl OutputFormat {
    /// Returns the file extension for this format.
    #[must_use]
    pub const fn extension(&self) -> &'static str {
        match self {
            Self::Parquet => "parquet",
            Self::Csv => "csv",
            Self::Json => "json",
            Self::Ndjson => "ndjson",
        }
    }

    /// Returns all available formats.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Parquet, Self::Csv, Self::Json, Self::Ndjson]
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.extension())
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = FormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "parquet" | "pq" => Ok(Self::Parquet),
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            "ndjson" | "jsonl" => Ok(Self::Ndjson),
            _ => Err(FormatError::UnknownFormat(s.to_string())),
        }
    }
}

/// Errors that can occur while reading or writing files.
#[derive(Error, Debug)]
pub enum FormatError {
    /// Unknown output format.
    #[error("Unknown format: {0}")]
    UnknownFormat(String),

    /// A required input column is absent.
    #[error("Missing column: {0}")]
    MissingColumn(&'static str),

    /// An input column has a type that cannot be coerced.
    #[error("Unsupported type {data_type} for column {column}")]
    UnsupportedColumnType {
        /// Column name.
        column: &'static str,
        /// Arrow type of the column.
        data_type: String,
    },

    /// A timestamp cannot be represented as epoch nanoseconds.
    #[error("Timestamp out of range: {0}")]
    TimestampOutOfRange(DateTime<Utc>),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Arrow/Parquet error.
    #[error("Parquet error: {0}")]
    Parquet(String),
}

/// Trait for output formatters.
pub trait Formatter: Send + Sync {
    /// Writes canonical trade records to the output.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    fn write_trades<W: Write + Send>(
        &self,
        records: &[TradeRecord],
        writer: W,
    ) -> Result<(), FormatError>;

    /// Writes OHLCV bars to the output.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    fn write_bars<W: Write + Send>(&self, bars: &[Bar], writer: W) -> Result<(), FormatError>;

    /// Returns the file extension for this format.
    fn extension(&self) -> &str;
}

impl From<FormatError> for TickbarError {
    fn from(err: FormatError) -> Self {
        match err {
            FormatError::Io(e) => Self::Io(e),
            FormatError::Json(e) => Self::Json(e),
            other => Self::Format(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_format_parse() {
        assert_eq!("parquet".parse::<OutputFormat>().unwrap(), OutputFormat::Parquet);
        assert_eq!("CSV".parse::<OutputFormat>().unwrap(), OutputFormat::Csv);
        assert_eq!("jsonl".parse::<OutputFormat>().unwrap(), OutputFormat::Ndjson);
        assert!(matches!(
            "xlsx".parse::<OutputFormat>(),
            Err(FormatError::UnknownFormat(_))
        ));
    }

    #[test]
    fn test_into_tickbar_error() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        assert!(matches!(TickbarError::from(FormatError::Io(io)), TickbarError::Io(_)));
        assert!(matches!(
            TickbarError::from(FormatError::MissingColumn("price")),
            TickbarError::Format(msg) if msg.contains("price")
        ));
    }
}
