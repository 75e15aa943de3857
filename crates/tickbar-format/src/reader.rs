//! Columnar trade input.

use arrow::array::{ArrayRef, AsArray};
use arrow::compute::cast;
use arrow::datatypes::{DataType, Float64Type, Int64Type, TimeUnit, TimestampNanosecondType};
use arrow::record_batch::RecordBatch;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use std::fs::File;
use std::path::Path;
use tickbar_types::{InstrumentId, RawTrade, RawValue};
use tracing::debug;

use crate::FormatError;

/// Reads trade rows from Parquet files into untyped [`RawTrade`]s.
///
/// Required columns are `ts_event`, `price` and `size`. The instrument is
/// taken from `instrument_id`, or from `symbol` when that column is absent.
/// Other columns are ignored. Cell values keep their source type; the
/// normalizer decides what is valid.
#[derive(Debug, Clone)]
pub struct ParquetTradeReader {
    batch_size: usize,
}

impl Default for ParquetTradeReader {
    fn default() -> Self {
        Self::new()
    }
}

impl ParquetTradeReader {
    /// Creates a reader with the default batch size.
    #[must_use]
    pub const fn new() -> Self {
        Self { batch_size: 8192 }
    }

    /// Sets the number of rows decoded per record batch.
    #[must_use]
    pub const fn with_batch_size(mut self, size: usize) -> Self {
        self.batch_size = size;
        self
    }

    /// Reads every trade row in the file at `path`.
    ///
    /// Rows are numbered from zero in file order.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or decoded, if a
    /// required column is missing, or if a column has an unsupported type.
    pub fn read_path(&self, path: &Path) -> Result<Vec<RawTrade>, FormatError> {
        let file = File::open(path)?;
        let trades = self.read_file(file)?;
        debug!(path = %path.display(), rows = trades.len(), "read trade file");
        Ok(trades)
    }

    /// Reads every trade row from an open Parquet file.
    ///
    /// # Errors
    ///
    /// See [`ParquetTradeReader::read_path`].
    pub fn read_file(&self, file: File) -> Result<Vec<RawTrade>, FormatError> {
        let reader = ParquetRecordBatchReaderBuilder::try_new(file)
            .map_err(|e| FormatError::Parquet(e.to_string()))?
            .with_batch_size(self.batch_size.max(1))
            .build()
            .map_err(|e| FormatError::Parquet(e.to_string()))?;

        let mut trades = Vec::new();
        for batch in reader {
            let batch = batch.map_err(|e| FormatError::Parquet(e.to_string()))?;
            let offset = trades.len();
            trades.extend(batch_to_trades(&batch, offset)?);
        }
        Ok(trades)
    }
}

fn batch_to_trades(batch: &RecordBatch, offset: usize) -> Result<Vec<RawTrade>, FormatError> {
    let ts_event = required(batch, "ts_event")?;
    let price = required(batch, "price")?;
    let size = required(batch, "size")?;
    let instrument = match batch.column_by_name("instrument_id") {
        Some(column) => Some(column_values(column, "instrument_id")?),
        None => batch
            .column_by_name("symbol")
            .map(|column| column_values(column, "symbol"))
            .transpose()?,
    };

    let mut instrument = instrument.map(Vec::into_iter);
    let trades = ts_event
        .into_iter()
        .zip(price)
        .zip(size)
        .enumerate()
        .map(|(i, ((ts_event, price), size))| RawTrade {
            row: offset + i,
            ts_event,
            price,
            size,
            instrument_id: instrument
                .as_mut()
                .and_then(|values| values.next())
                .flatten()
                .map(instrument_from_value),
        })
        .collect();
    Ok(trades)
}

fn required(batch: &RecordBatch, name: &'static str) -> Result<Vec<Option<RawValue>>, FormatError> {
    let column = batch
        .column_by_name(name)
        .ok_or(FormatError::MissingColumn(name))?;
    column_values(column, name)
}

/// Coerces one column into per-row cell values; nulls become `None`.
fn column_values(
    column: &ArrayRef,
    name: &'static str,
) -> Result<Vec<Option<RawValue>>, FormatError> {
    let cast_to = |to: &DataType| cast(column, to).map_err(|e| FormatError::Parquet(e.to_string()));

    match column.data_type() {
        DataType::Int8
        | DataType::Int16
        | DataType::Int32
        | DataType::Int64
        | DataType::UInt8
        | DataType::UInt16
        | DataType::UInt32
        | DataType::UInt64 => {
            let values = cast_to(&DataType::Int64)?;
            Ok(values
                .as_primitive::<Int64Type>()
                .iter()
                .map(|v| v.map(RawValue::Int))
                .collect())
        }
        DataType::Float16 | DataType::Float32 | DataType::Float64 => {
            let values = cast_to(&DataType::Float64)?;
            Ok(values
                .as_primitive::<Float64Type>()
                .iter()
                .map(|v| v.map(RawValue::Float))
                .collect())
        }
        DataType::Timestamp(_, _) => {
            let values = cast_to(&DataType::Timestamp(TimeUnit::Nanosecond, None))?;
            Ok(values
                .as_primitive::<TimestampNanosecondType>()
                .iter()
                .map(|v| v.map(RawValue::Int))
                .collect())
        }
        DataType::Utf8 | DataType::LargeUtf8 | DataType::Utf8View | DataType::Dictionary(_, _)
            if is_textual(column.data_type()) =>
        {
            let values = cast_to(&DataType::Utf8)?;
            Ok(values
                .as_string::<i32>()
                .iter()
                .map(|v| v.map(RawValue::from))
                .collect())
        }
        other => Err(FormatError::UnsupportedColumnType {
            column: name,
            data_type: other.to_string(),
        }),
    }
}

fn is_textual(data_type: &DataType) -> bool {
    match data_type {
        DataType::Utf8 | DataType::LargeUtf8 | DataType::Utf8View => true,
        DataType::Dictionary(_, value) => is_textual(value),
        _ => false,
    }
}

fn instrument_from_value(value: RawValue) -> InstrumentId {
    match value {
        RawValue::Int(v) => InstrumentId::from(v),
        RawValue::Float(v) => RawValue::Float(v)
            .as_integer()
            .map_or_else(|| InstrumentId::new(v.to_string()), InstrumentId::from),
        RawValue::Text(s) => InstrumentId::new(s),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::{
        BooleanArray, Float64Array, Int32Array, Int64Array, StringArray, TimestampMillisecondArray,
    };
    use chrono::{TimeZone, Utc};
    use parquet::arrow::ArrowWriter;
    use std::sync::Arc;
    use tickbar_types::{Price, TradeRecord};

    use crate::{Formatter, ParquetFormatter};

    fn write_batch(dir: &Path, columns: Vec<(&str, ArrayRef)>) -> std::path::PathBuf {
        let path = dir.join("20240102.parquet");
        let batch = RecordBatch::try_from_iter(columns).unwrap();
        let file = File::create(&path).unwrap();
        let mut writer = ArrowWriter::try_new(file, batch.schema(), None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();
        path
    }

    #[test]
    fn test_reads_integer_columns() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_batch(
            dir.path(),
            vec![
                ("ts_event", Arc::new(Int64Array::from(vec![1_i64, 2])) as ArrayRef),
                ("price", Arc::new(Int64Array::from(vec![100_i64, 101]))),
                ("size", Arc::new(Int32Array::from(vec![Some(5), None]))),
                ("instrument_id", Arc::new(Int32Array::from(vec![42, 42]))),
                ("publisher_id", Arc::new(Int32Array::from(vec![1, 1]))),
            ],
        );

        let trades = ParquetTradeReader::new().read_path(&path).unwrap();

        assert_eq!(trades.len(), 2);
        assert_eq!(trades[0].row, 0);
        assert_eq!(trades[1].row, 1);
        assert_eq!(trades[0].ts_event, Some(RawValue::Int(1)));
        assert_eq!(trades[1].price, Some(RawValue::Int(101)));
        assert_eq!(trades[0].size, Some(RawValue::Int(5)));
        assert_eq!(trades[1].size, None);
        assert_eq!(trades[0].instrument_id, Some(InstrumentId::from("42")));
    }

    #[test]
    fn test_reads_text_and_float_columns() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_batch(
            dir.path(),
            vec![
                ("ts_event", Arc::new(StringArray::from(vec!["2024-01-02T10:00:00Z"])) as ArrayRef),
                ("price", Arc::new(Float64Array::from(vec![4.5e12]))),
                ("size", Arc::new(StringArray::from(vec!["3"]))),
                ("symbol", Arc::new(StringArray::from(vec!["ESH4"]))),
            ],
        );

        let trades = ParquetTradeReader::new().read_path(&path).unwrap();

        assert_eq!(trades[0].ts_event, Some(RawValue::from("2024-01-02T10:00:00Z")));
        assert_eq!(trades[0].price, Some(RawValue::Float(4.5e12)));
        assert_eq!(trades[0].size, Some(RawValue::from("3")));
        assert_eq!(trades[0].instrument_id, Some(InstrumentId::from("ESH4")));
    }

    #[test]
    fn test_timestamp_units_become_nanoseconds() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_batch(
            dir.path(),
            vec![
                (
                    "ts_event",
                    Arc::new(TimestampMillisecondArray::from(vec![1_500_i64])) as ArrayRef,
                ),
                ("price", Arc::new(Int64Array::from(vec![1_i64]))),
                ("size", Arc::new(Int64Array::from(vec![1_i64]))),
            ],
        );

        let trades = ParquetTradeReader::new().read_path(&path).unwrap();

        assert_eq!(trades[0].ts_event, Some(RawValue::Int(1_500_000_000)));
        assert_eq!(trades[0].instrument_id, None);
    }

    #[test]
    fn test_missing_required_column() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_batch(
            dir.path(),
            vec![
                ("ts_event", Arc::new(Int64Array::from(vec![1_i64])) as ArrayRef),
                ("price", Arc::new(Int64Array::from(vec![1_i64]))),
            ],
        );

        let err = ParquetTradeReader::new().read_path(&path).unwrap_err();
        assert!(matches!(err, FormatError::MissingColumn("size")));
    }

    #[test]
    fn test_unsupported_column_type() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_batch(
            dir.path(),
            vec![
                ("ts_event", Arc::new(Int64Array::from(vec![1_i64])) as ArrayRef),
                ("price", Arc::new(Int64Array::from(vec![1_i64]))),
                ("size", Arc::new(BooleanArray::from(vec![true]))),
            ],
        );

        let err = ParquetTradeReader::new().read_path(&path).unwrap_err();
        assert!(matches!(
            err,
            FormatError::UnsupportedColumnType { column: "size", .. }
        ));
    }

    #[test]
    fn test_row_numbers_span_batches() {
        let dir = tempfile::tempdir().unwrap();
        let n = 5_i64;
        let path = write_batch(
            dir.path(),
            vec![
                ("ts_event", Arc::new(Int64Array::from_iter_values(0..n)) as ArrayRef),
                ("price", Arc::new(Int64Array::from_iter_values(0..n))),
                ("size", Arc::new(Int64Array::from_iter_values(0..n))),
            ],
        );

        let trades = ParquetTradeReader::new()
            .with_batch_size(2)
            .read_path(&path)
            .unwrap();

        let rows: Vec<_> = trades.iter().map(|t| t.row).collect();
        assert_eq!(rows, [0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_reads_written_trades() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("trades.parquet");
        let t = Utc.with_ymd_and_hms(2024, 1, 2, 10, 0, 0).unwrap();
        let records = vec![TradeRecord::new(t, Price::from_raw(4_512_250_000_000), 2, "ESH4")];
        ParquetFormatter::new()
            .write_trades(&records, File::create(&path).unwrap())
            .unwrap();

        let trades = ParquetTradeReader::new().read_path(&path).unwrap();

        assert_eq!(
            trades[0].ts_event,
            Some(RawValue::Int(t.timestamp_nanos_opt().unwrap()))
        );
        assert_eq!(trades[0].price, Some(RawValue::Int(4_512_250_000_000)));
        assert_eq!(trades[0].size, Some(RawValue::Int(2)));
        assert_eq!(trades[0].instrument_id, Some(InstrumentId::from("ESH4")));
    }
}
