//! Per-date pipeline: normalize, filter, aggregate.

use chrono::NaiveDate;
use std::collections::BTreeMap;
use tickbar_aggregate::{Bar, aggregate_by_instrument};
use tickbar_normalize::{InstrumentSelection, Normalizer, RejectPolicy, Session};
use tickbar_types::{
    InstrumentId, Interval, RawTrade, RecordError, Result, TickbarError, TradeRecord,
};
use tracing::debug;

/// Options for one run of [`process_date`] or [`canonical_date`].
///
/// None of the options change how buckets are formed; they only decide
/// which records reach the aggregator.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Bar width.
    pub interval: Interval,
    /// Trading-session window applied on the date.
    pub session: Session,
    /// Instruments kept before aggregation.
    pub selection: InstrumentSelection,
    /// How malformed rows are treated.
    pub policy: RejectPolicy,
    /// Whether a date with no valid records yields an empty bar set
    /// rather than [`TickbarError::EmptyInput`].
    pub allow_empty: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self::new(Interval::default())
    }
}

impl PipelineConfig {
    /// Creates a configuration for the given interval with every filter off.
    #[must_use]
    pub const fn new(interval: Interval) -> Self {
        Self {
            interval,
            session: Session::All,
            selection: InstrumentSelection::All,
            policy: RejectPolicy::Skip,
            allow_empty: true,
        }
    }

    /// Sets the bar interval.
    #[must_use]
    pub const fn with_interval(mut self, interval: Interval) -> Self {
        self.interval = interval;
        self
    }

    /// Sets the trading session.
    #[must_use]
    pub const fn with_session(mut self, session: Session) -> Self {
        self.session = session;
        self
    }

    /// Sets the instrument selection.
    #[must_use]
    pub fn with_selection(mut self, selection: InstrumentSelection) -> Self {
        self.selection = selection;
        self
    }

    /// Sets the reject policy.
    #[must_use]
    pub const fn with_policy(mut self, policy: RejectPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Sets whether an empty date is acceptable.
    #[must_use]
    pub const fn with_allow_empty(mut self, allow: bool) -> Self {
        self.allow_empty = allow;
        self
    }
}

/// One date's canonical trade sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalDate {
    /// Trading date.
    pub date: NaiveDate,
    /// Valid records inside the session and selection, ascending by event time.
    pub records: Vec<TradeRecord>,
    /// Rows dropped by the normalizer, in input order.
    pub rejected: Vec<RecordError>,
    /// Number of raw rows received.
    pub input_rows: usize,
}

/// Outcome of processing one trading date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateReport {
    /// Trading date.
    pub date: NaiveDate,
    /// One bar series per instrument, each in ascending bucket order.
    ///
    /// Instruments are never mixed within a series. A date restricted to a
    /// single instrument has exactly one entry; an empty date has none.
    pub series: BTreeMap<InstrumentId, Vec<Bar>>,
    /// Rows dropped by the normalizer, in input order.
    pub rejected: Vec<RecordError>,
    /// Number of raw rows received.
    pub input_rows: usize,
    /// Number of records that reached the aggregator.
    pub records: usize,
    /// Total size of the records that reached the aggregator.
    pub volume: u64,
}

impl DateReport {
    /// Returns the number of bars over every series.
    #[must_use]
    pub fn bar_count(&self) -> usize {
        self.series.values().map(Vec::len).sum()
    }

    /// Returns the summed volume of the emitted bars.
    #[must_use]
    pub fn bar_volume(&self) -> u64 {
        self.series.values().flatten().map(|b| b.volume).sum()
    }
}

/// Normalizes one date's raw rows and applies the session and instrument
/// filters.
///
/// # Errors
///
/// Returns an error if a row is malformed under [`RejectPolicy::Abort`], if
/// the session window cannot be computed, or if no records remain and empty
/// dates are not allowed.
pub fn canonical_date(
    date: NaiveDate,
    rows: Vec<RawTrade>,
    config: &PipelineConfig,
) -> Result<CanonicalDate> {
    let input_rows = rows.len();
    let normalized = Normalizer::new()
        .with_policy(config.policy)
        .normalize(rows)?;

    let records = config.session.filter(date, normalized.records)?;
    let records = config.selection.apply(records);

    if records.is_empty() && !config.allow_empty {
        return Err(TickbarError::EmptyInput { date });
    }

    Ok(CanonicalDate {
        date,
        records,
        rejected: normalized.rejected,
        input_rows,
    })
}

/// Turns one date's raw rows into bars.
///
/// Rows go through [`canonical_date`] and are then aggregated with one
/// independent series per instrument, so a date that mixes contracts never
/// produces a bar combining them. The function has no side effects beyond
/// logging, so dates can be processed in parallel.
///
/// # Errors
///
/// Returns an error if [`canonical_date`] fails or if aggregation fails.
pub fn process_date(
    date: NaiveDate,
    rows: Vec<RawTrade>,
    config: &PipelineConfig,
) -> Result<DateReport> {
    let canonical = canonical_date(date, rows, config)?;
    let series = aggregate_by_instrument(&canonical.records, config.interval)?;
    let volume = canonical.records.iter().map(|r| r.size).sum();

    let report = DateReport {
        date,
        series,
        rejected: canonical.rejected,
        input_rows: canonical.input_rows,
        records: canonical.records.len(),
        volume,
    };

    debug!(
        %date,
        interval = %config.interval,
        input_rows = report.input_rows,
        rejected = report.rejected.len(),
        records = report.records,
        instruments = report.series.len(),
        bars = report.bar_count(),
        "processed date"
    );

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tickbar_types::Price;

    const P: i64 = Price::SCALE;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 2).unwrap()
    }

    fn rows() -> Vec<RawTrade> {
        vec![
            RawTrade::new(0, "2024-01-02T10:01:05Z", 98 * P, 3_i64, "ESH4"),
            RawTrade::new(1, "2024-01-02T10:00:10Z", 100 * P, 1_i64, "ESH4"),
            RawTrade::new(2, "2024-01-02T10:00:50Z", 105 * P, 2_i64, "ESH4"),
            RawTrade::new(3, "2024-01-02T10:00:20Z", 100 * P, -1_i64, "ESH4"),
            RawTrade::new(4, "not a time", 100 * P, 1_i64, "ESH4"),
        ]
    }

    fn rows_with_second_contract() -> Vec<RawTrade> {
        let mut input = rows();
        input.push(RawTrade::new(5, "2024-01-02T10:00:30Z", 200 * P, 50_i64, "ESM4"));
        input
    }

    fn bars<'a>(report: &'a DateReport, id: &str) -> &'a [Bar] {
        &report.series[&InstrumentId::from(id)]
    }

    #[test]
    fn test_process_date() {
        let report = process_date(date(), rows(), &PipelineConfig::default()).unwrap();

        assert_eq!(report.input_rows, 5);
        assert_eq!(report.records, 3);
        assert_eq!(report.rejected.len(), 2);
        assert_eq!(report.rejected[0].row(), 3);
        assert!(matches!(
            report.rejected[1],
            RecordError::MalformedTimestamp { row: 4, .. }
        ));

        assert_eq!(report.series.len(), 1);
        let series = bars(&report, "ESH4");
        assert_eq!(series.len(), 2);
        assert_eq!(series[0].open, Price::from_raw(100 * P));
        assert_eq!(series[0].high, Price::from_raw(105 * P));
        assert_eq!(series[0].close, Price::from_raw(105 * P));
        assert_eq!(series[0].volume, 3);
        assert_eq!(series[1].volume, 3);
    }

    #[test]
    fn test_mixed_instruments_get_separate_series() {
        let input = vec![
            RawTrade::new(0, "2024-01-02T10:00:10Z", 100 * P, 1_i64, "ESH4"),
            RawTrade::new(1, "2024-01-02T10:00:20Z", 200 * P, 1_i64, "ESM4"),
            RawTrade::new(2, "2024-01-02T10:00:30Z", 101 * P, 1_i64, "ESH4"),
        ];
        let report = process_date(date(), input, &PipelineConfig::default()).unwrap();

        assert_eq!(report.series.len(), 2);

        let h4 = bars(&report, "ESH4");
        assert_eq!(h4.len(), 1);
        assert_eq!(h4[0].open, Price::from_raw(100 * P));
        assert_eq!(h4[0].high, Price::from_raw(101 * P));
        assert_eq!(h4[0].close, Price::from_raw(101 * P));
        assert_eq!(h4[0].volume, 2);

        let m4 = bars(&report, "ESM4");
        assert_eq!(m4.len(), 1);
        assert_eq!(m4[0].low, Price::from_raw(200 * P));
        assert_eq!(m4[0].volume, 1);

        assert_eq!(report.bar_volume(), report.volume);
    }

    #[test]
    fn test_volume_is_conserved() {
        let config = PipelineConfig::new(Interval::Hour);
        let report = process_date(date(), rows_with_second_contract(), &config).unwrap();
        assert_eq!(report.bar_volume(), report.volume);
        assert_eq!(report.volume, 56);
        assert_eq!(report.bar_count(), 2);
    }

    #[test]
    fn test_runs_are_deterministic() {
        let config = PipelineConfig::default();
        let a = process_date(date(), rows_with_second_contract(), &config).unwrap();
        let b = process_date(date(), rows_with_second_contract(), &config).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_abort_policy() {
        let config = PipelineConfig::default().with_policy(RejectPolicy::Abort);
        let err = process_date(date(), rows(), &config).unwrap_err();
        assert!(matches!(err, TickbarError::Record(RecordError::MalformedValue { row: 3, .. })));
    }

    #[test]
    fn test_empty_date() {
        let report = process_date(date(), Vec::new(), &PipelineConfig::default()).unwrap();
        assert!(report.series.is_empty());
        assert_eq!(report.bar_count(), 0);

        let config = PipelineConfig::default().with_allow_empty(false);
        let err = process_date(date(), Vec::new(), &config).unwrap_err();
        assert!(matches!(err, TickbarError::EmptyInput { .. }));
    }

    #[test]
    fn test_session_and_selection() {
        let mut input = rows_with_second_contract();
        input.push(RawTrade::new(6, "2024-01-02T22:00:00Z", 101 * P, 1_i64, "ESH4"));

        let config = PipelineConfig::default()
            .with_session(Session::Electronic)
            .with_selection(InstrumentSelection::Only(InstrumentId::from("ESH4")));
        let report = process_date(date(), input, &config).unwrap();

        // 22:00Z is 17:00 in New York, after the electronic close.
        assert_eq!(report.records, 3);
        assert_eq!(report.volume, 6);
        assert_eq!(report.series.len(), 1);

        let config = PipelineConfig::default().with_selection(InstrumentSelection::Dominant);
        let report = process_date(date(), rows_with_second_contract(), &config).unwrap();
        assert_eq!(report.records, 1);
        assert_eq!(bars(&report, "ESM4")[0].open, Price::from_raw(200 * P));
    }

    #[test]
    fn test_canonical_date() {
        let canonical =
            canonical_date(date(), rows_with_second_contract(), &PipelineConfig::default())
                .unwrap();

        assert_eq!(canonical.input_rows, 6);
        assert_eq!(canonical.rejected.len(), 2);
        let times: Vec<_> = canonical
            .records
            .iter()
            .map(|r| r.event_time.format("%H:%M:%S").to_string())
            .collect();
        assert_eq!(times, ["10:00:10", "10:00:30", "10:00:50", "10:01:05"]);
    }
}
