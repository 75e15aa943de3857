//! Single-pass trade-to-OHLCV aggregation.

use chrono::{DateTime, Utc};
use tickbar_types::{AggregateError, Interval, Price, TradeRecord};
use tracing::debug;

use crate::Bar;

/// Streaming bar aggregator.
///
/// Consumes time-ordered trade records and emits one [`Bar`] per non-empty
/// bucket. Only the bucket currently being filled is held; buckets with no
/// trades are never produced.
#[derive(Debug)]
pub struct BarAggregator {
    interval: Interval,
    current: Option<BarBuilder>,
    last_time: Option<DateTime<Utc>>,
    seen: usize,
}

impl BarAggregator {
    /// Creates a new aggregator for the given interval.
    #[must_use]
    pub const fn new(interval: Interval) -> Self {
        Self {
            interval,
            current: None,
            last_time: None,
            seen: 0,
        }
    }

    /// Returns the interval being aggregated to.
    #[must_use]
    pub const fn interval(&self) -> Interval {
        self.interval
    }

    /// Processes a record, potentially emitting a completed bar.
    ///
    /// Returns `Some(bar)` when this record opens a new bucket and thereby
    /// closes the previous one.
    ///
    /// # Errors
    ///
    /// Returns [`AggregateError::UnorderedInput`] if the record is earlier
    /// than the previous one. Equal timestamps are accepted.
    pub fn push(&mut self, record: &TradeRecord) -> Result<Option<Bar>, AggregateError> {
        if let Some(previous) = self.last_time
            && record.event_time < previous
        {
            return Err(AggregateError::UnorderedInput {
                index: self.seen,
                previous,
                current: record.event_time,
            });
        }
        Ok(self.push_unchecked(record))
    }

    fn push_unchecked(&mut self, record: &TradeRecord) -> Option<Bar> {
        self.seen += 1;
        self.last_time = Some(record.event_time);
        let bucket_start = self.interval.truncate(record.event_time);

        match self.current.take() {
            Some(mut builder) if builder.bucket_start == bucket_start => {
                builder.update(record.price, record.size);
                self.current = Some(builder);
                None
            }
            Some(builder) => {
                self.current = Some(BarBuilder::new(bucket_start, record.price, record.size));
                Some(builder.finish())
            }
            None => {
                self.current = Some(BarBuilder::new(bucket_start, record.price, record.size));
                None
            }
        }
    }

    /// Finishes aggregation, returning the last bucket if it had trades.
    ///
    /// The last bucket is emitted as-is even if the data stops before the
    /// bucket's nominal end.
    #[must_use]
    pub fn finish(self) -> Option<Bar> {
        self.current.map(BarBuilder::finish)
    }
}

/// Running reduction state of the bucket being filled.
#[derive(Debug)]
struct BarBuilder {
    bucket_start: DateTime<Utc>,
    open: Price,
    high: Price,
    low: Price,
    close: Price,
    volume: u64,
    trade_count: u64,
}

impl BarBuilder {
    /// Creates a new builder from the bucket's first trade.
    const fn new(bucket_start: DateTime<Utc>, price: Price, size: u64) -> Self {
        Self {
            bucket_start,
            open: price,
            high: price,
            low: price,
            close: price,
            volume: size,
            trade_count: 1,
        }
    }

    /// Folds another trade into the bucket.
    fn update(&mut self, price: Price, size: u64) {
        self.high = self.high.max(price);
        self.low = self.low.min(price);
        self.close = price;
        self.volume = self.volume.saturating_add(size);
        self.trade_count += 1;
    }

    const fn finish(self) -> Bar {
        Bar::new(
            self.bucket_start,
            self.open,
            self.high,
            self.low,
            self.close,
            self.volume,
            self.trade_count,
        )
    }
}

/// Aggregates a time-ordered record sequence into bars.
///
/// # Errors
///
/// Returns [`AggregateError::UnorderedInput`] on the first ordering
/// violation; no bars are returned in that case.
pub fn aggregate(records: &[TradeRecord], interval: Interval) -> Result<Vec<Bar>, AggregateError> {
    let mut aggregator = BarAggregator::new(interval);
    let mut bars = Vec::new();

    for record in records {
        if let Some(bar) = aggregator.push(record)? {
            bars.push(bar);
        }
    }

    bars.extend(aggregator.finish());
    debug_assert!(bars.iter().all(Bar::is_consistent));
    debug!(%interval, records = records.len(), bars = bars.len(), "aggregated bars");
    Ok(bars)
}

/// Stably sorts records by event time, then aggregates them.
///
/// Records with equal timestamps keep their relative order.
#[must_use]
pub fn aggregate_unsorted(mut records: Vec<TradeRecord>, interval: Interval) -> Vec<Bar> {
    records.sort_by_key(|r| r.event_time);

    let mut aggregator = BarAggregator::new(interval);
    let mut bars: Vec<_> = records
        .iter()
        .filter_map(|r| aggregator.push_unchecked(r))
        .collect();
    bars.extend(aggregator.finish());
    bars
}

/// Checks that event times never decrease.
///
/// # Errors
///
/// Returns [`AggregateError::UnorderedInput`] for the first violation.
pub fn check_ordered(records: &[TradeRecord]) -> Result<(), AggregateError> {
    match records
        .windows(2)
        .position(|w| w[1].event_time < w[0].event_time)
    {
        Some(i) => Err(AggregateError::UnorderedInput {
            index: i + 1,
            previous: records[i].event_time,
            current: records[i + 1].event_time,
        }),
        None => Ok(()),
    }
}
