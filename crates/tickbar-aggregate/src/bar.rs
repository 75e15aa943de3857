//! OHLCV bar data structure.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tickbar_types::Price;

/// OHLCV bar for one non-empty bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bar {
    /// Bucket start (left edge of the half-open bucket).
    pub bucket_start: DateTime<Utc>,
    /// Price of the first trade in the bucket.
    pub open: Price,
    /// Highest price in the bucket.
    pub high: Price,
    /// Lowest price in the bucket.
    pub low: Price,
    /// Price of the last trade in the bucket.
    pub close: Price,
    /// Total size traded in the bucket.
    pub volume: u64,
    /// Number of trades in the bucket.
    pub trade_count: u64,
}

impl Bar {
    /// Creates a new bar.
    #[must_use]
    pub const fn new(
        bucket_start: DateTime<Utc>,
        open: Price,
        high: Price,
        low: Price,
        close: Price,
        volume: u64,
        trade_count: u64,
    ) -> Self {
        Self {
            bucket_start,
            open,
            high,
            low,
            close,
            volume,
            trade_count,
        }
    }

    /// Returns true if `low <= open, close <= high`.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        self.low <= self.open.min(self.close) && self.open.max(self.close) <= self.high
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn create_test_bar() -> Bar {
        let start = Utc.with_ymd_and_hms(2024, 1, 2, 10, 0, 0).unwrap();
        Bar::new(
            start,
            Price::from_raw(100),
            Price::from_raw(105),
            Price::from_raw(98),
            Price::from_raw(102),
            10,
            4,
        )
    }

    #[test]
    fn test_consistency() {
        assert!(create_test_bar().is_consistent());
        let mut bar = create_test_bar();
        bar.high = Price::from_raw(101);
        assert!(!bar.is_consistent());
    }
}
