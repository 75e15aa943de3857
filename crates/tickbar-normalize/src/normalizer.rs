//! Raw row validation and canonical ordering.

use tickbar_types::{Price, RawTrade, RawValue, RecordError, TradeRecord};
use tracing::{debug, warn};

use crate::timestamp::parse_timestamp;

/// What to do with rows that fail validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RejectPolicy {
    /// Drop bad rows and report them alongside the output.
    #[default]
    Skip,
    /// Fail on the first bad row.
    Abort,
}

/// Output of a normalization pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Normalized {
    /// Valid records, sorted ascending by event time (stable).
    pub records: Vec<TradeRecord>,
    /// Rejected rows, in input order.
    pub rejected: Vec<RecordError>,
}

/// Turns raw trade rows into the canonical record sequence.
#[derive(Debug, Clone, Copy, Default)]
pub struct Normalizer {
    policy: RejectPolicy,
}

impl Normalizer {
    /// Creates a normalizer that skips bad rows.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            policy: RejectPolicy::Skip,
        }
    }

    /// Sets the reject policy.
    #[must_use]
    pub const fn with_policy(mut self, policy: RejectPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Returns the reject policy.
    #[must_use]
    pub const fn policy(&self) -> RejectPolicy {
        self.policy
    }

    /// Validates rows and returns them sorted by event time.
    ///
    /// Rows with equal timestamps keep their input order.
    ///
    /// # Errors
    ///
    /// Under [`RejectPolicy::Abort`], returns the first row's error.
    pub fn normalize<I>(&self, rows: I) -> Result<Normalized, RecordError>
    where
        I: IntoIterator<Item = RawTrade>,
    {
        let mut out = Normalized::default();

        for raw in rows {
            match normalize_row(raw) {
                Ok(record) => out.records.push(record),
                Err(err) => match self.policy {
                    RejectPolicy::Abort => return Err(err),
                    RejectPolicy::Skip => {
                        warn!(row = err.row(), error = %err, "rejected trade row");
                        out.rejected.push(err);
                    }
                },
            }
        }

        out.records.sort_by_key(|r| r.event_time);

        debug!(
            records = out.records.len(),
            rejected = out.rejected.len(),
            "normalized trade rows"
        );
        Ok(out)
    }
}

/// Validates a single raw row.
///
/// Fields are checked in the order timestamp, price, size; the first failure
/// is reported.
///
/// # Errors
///
/// Returns [`RecordError::MalformedTimestamp`] for a missing or unparsable
/// timestamp and [`RecordError::MalformedValue`] for a missing, non-integral,
/// or non-positive price or size.
pub fn normalize_row(raw: RawTrade) -> Result<TradeRecord, RecordError> {
    let row = raw.row;

    let event_time = raw
        .ts_event
        .as_ref()
        .and_then(parse_timestamp)
        .ok_or_else(|| RecordError::MalformedTimestamp {
            row,
            value: describe(raw.ts_event.as_ref()),
        })?;

    let price = raw
        .price
        .as_ref()
        .and_then(RawValue::as_integer)
        .map(Price::from_raw)
        .filter(Price::is_positive)
        .ok_or_else(|| malformed(row, "price", raw.price.as_ref()))?;

    let size = positive_integer(raw.size.as_ref())
        .map(i64::unsigned_abs)
        .ok_or_else(|| malformed(row, "size", raw.size.as_ref()))?;

    Ok(TradeRecord {
        event_time,
        price,
        size,
        instrument_id: raw.instrument_id.unwrap_or_default(),
    })
}

fn positive_integer(value: Option<&RawValue>) -> Option<i64> {
    value.and_then(RawValue::as_integer).filter(|v| *v > 0)
}

fn malformed(row: usize, field: &'static str, value: Option<&RawValue>) -> RecordError {
    RecordError::MalformedValue {
        row,
        field,
        value: describe(value),
    }
}

fn describe(value: Option<&RawValue>) -> String {
    value.map_or_else(|| "<missing>".to_string(), ToString::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn raw(row: usize, ts: &str, price: i64, size: i64) -> RawTrade {
        RawTrade::new(row, ts, price, size, "ESM4")
    }

    #[test]
    fn test_sorts_by_event_time() {
        let rows = vec![
            raw(0, "2024-01-02T10:00:30Z", 101, 1),
            raw(1, "2024-01-02T10:00:10Z", 100, 2),
        ];
        let out = Normalizer::new().normalize(rows).unwrap();

        assert_eq!(out.records.len(), 2);
        assert_eq!(out.records[0].price, Price::from_raw(100));
        assert_eq!(out.records[1].price, Price::from_raw(101));
        assert!(out.rejected.is_empty());
    }

    #[test]
    fn test_ties_keep_input_order() {
        let rows = vec![
            raw(0, "2024-01-02T10:00:00.000000001Z", 105, 1),
            raw(1, "2024-01-02T10:00:00.000000001Z", 99, 1),
            raw(2, "2024-01-02T10:00:00.000000001Z", 102, 1),
        ];
        let out = Normalizer::new().normalize(rows).unwrap();
        let prices: Vec<_> = out.records.iter().map(|r| r.price.raw()).collect();
        assert_eq!(prices, vec![105, 99, 102]);
    }

    #[test]
    fn test_rejects_negative_size() {
        let rows = vec![
            raw(0, "2024-01-02T10:00:00Z", 100, -1),
            raw(1, "2024-01-02T10:00:01Z", 100, 4),
        ];
        let out = Normalizer::new().normalize(rows).unwrap();

        assert_eq!(out.records.len(), 1);
        assert_eq!(out.records[0].size, 4);
        assert_eq!(
            out.rejected,
            vec![RecordError::MalformedValue {
                row: 0,
                field: "size",
                value: "-1".to_string(),
            }]
        );
    }

    #[test]
    fn test_rejects_bad_timestamp() {
        let rows = vec![raw(7, "yesterday", 100, 1)];
        let out = Normalizer::new().normalize(rows).unwrap();

        assert!(out.records.is_empty());
        assert!(matches!(
            out.rejected[0],
            RecordError::MalformedTimestamp { row: 7, .. }
        ));
    }

    #[test]
    fn test_rejects_non_positive_price() {
        let err = normalize_row(raw(0, "2024-01-02T10:00:00Z", 0, 1)).unwrap_err();
        assert!(matches!(
            err,
            RecordError::MalformedValue { field: "price", .. }
        ));
    }

    #[test]
    fn test_rejects_missing_fields() {
        let row = RawTrade {
            row: 3,
            ts_event: Some("2024-01-02T10:00:00Z".into()),
            ..RawTrade::default()
        };
        let err = normalize_row(row).unwrap_err();
        assert_eq!(
            err,
            RecordError::MalformedValue {
                row: 3,
                field: "price",
                value: "<missing>".to_string(),
            }
        );
    }

    #[test]
    fn test_timestamp_checked_first() {
        let err = normalize_row(raw(0, "bad", -5, -5)).unwrap_err();
        assert!(matches!(err, RecordError::MalformedTimestamp { .. }));
    }

    #[test]
    fn test_abort_policy() {
        let rows = vec![
            raw(0, "2024-01-02T10:00:00Z", 100, 1),
            raw(1, "2024-01-02T10:00:00Z", 100, 0),
        ];
        let err = Normalizer::new()
            .with_policy(RejectPolicy::Abort)
            .normalize(rows)
            .unwrap_err();
        assert_eq!(err.row(), 1);
    }

    #[test]
    fn test_coerces_text_and_float_values() {
        let row = RawTrade {
            row: 0,
            ts_event: Some("2024-01-02 10:00:00.5".into()),
            price: Some("4512250000000".into()),
            size: Some(RawValue::Float(3.0)),
            instrument_id: None,
        };
        let record = normalize_row(row).unwrap();

        assert_eq!(record.price, Price::from_raw(4_512_250_000_000));
        assert_eq!(record.size, 3);
        assert!(record.instrument_id.is_unspecified());
        assert_eq!(
            record.event_time,
            Utc.with_ymd_and_hms(2024, 1, 2, 10, 0, 0).unwrap()
                + chrono::TimeDelta::milliseconds(500)
        );
    }
}
