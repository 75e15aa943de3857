//! Per-instrument aggregation.

use std::collections::BTreeMap;
use tickbar_types::{AggregateError, InstrumentId, Interval, TradeRecord};

use crate::{Bar, BarAggregator, check_ordered};

/// Aggregates a time-ordered sequence that mixes instruments, producing an
/// independent bar series per instrument.
///
/// # Errors
///
/// Returns [`AggregateError::UnorderedInput`] if the sequence as a whole is
/// not ordered by event time.
pub fn aggregate_by_instrument(
    records: &[TradeRecord],
    interval: Interval,
) -> Result<BTreeMap<InstrumentId, Vec<Bar>>, AggregateError> {
    check_ordered(records)?;

    let mut series: BTreeMap<&InstrumentId, (BarAggregator, Vec<Bar>)> = BTreeMap::new();
    for record in records {
        let (aggregator, bars) = series
            .entry(&record.instrument_id)
            .or_insert_with(|| (BarAggregator::new(interval), Vec::new()));
        if let Some(bar) = aggregator.push(record)? {
            bars.push(bar);
        }
    }

    Ok(series
        .into_iter()
        .map(|(id, (aggregator, mut bars))| {
            bars.extend(aggregator.finish());
            (id.clone(), bars)
        })
        .collect())
}
