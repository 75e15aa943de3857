//! Trading date ranges and date-keyed file names.

use chrono::NaiveDate;

use crate::DateRangeError;

/// An inclusive range of trading dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    /// Start date (inclusive).
    pub start: NaiveDate,
    /// End date (inclusive).
    pub end: NaiveDate,
}

impl DateRange {
    /// Creates a new date range, validating that start <= end.
    ///
    /// # Errors
    ///
    /// Returns an error if start > end.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, DateRangeError> {
        if start > end {
            return Err(DateRangeError::InvalidRange { start, end });
        }
        Ok(Self { start, end })
    }

    /// Returns true if the range contains the given date.
    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }
}

impl std::fmt::Display for DateRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} to {}", self.start, self.end)
    }
}

/// Format of the date key used in trade and bar file names.
pub const FILE_DATE_FORMAT: &str = "%Y%m%d";

/// Extracts the trading date from a date-keyed file name.
///
/// Accepts names whose stem starts with `YYYYMMDD`, such as
/// `20240102.parquet` or `20240102_minute.csv`.
#[must_use]
pub fn date_from_file_name(name: &str) -> Option<NaiveDate> {
    let key = name.get(..8)?;
    if !key.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    NaiveDate::parse_from_str(key, FILE_DATE_FORMAT).ok()
}

/// Formats a trading date as a file-name key (`YYYYMMDD`).
#[must_use]
pub fn file_date_key(date: NaiveDate) -> String {
    date.format(FILE_DATE_FORMAT).to_string()
}
