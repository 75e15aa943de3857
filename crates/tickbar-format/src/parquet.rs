//! Apache Parquet output format.

use arrow::array::{
    ArrayRef, Decimal128Array, Int64Array, StringArray, TimestampNanosecondArray, UInt64Array,
};
use arrow::datatypes::{DataType, Field, Schema, TimeUnit};
use arrow::record_batch::RecordBatch;
use chrono::{DateTime, Utc};
use parquet::arrow::ArrowWriter;
use parquet::basic::Compression;
use parquet::file::properties::WriterProperties;
use std::io::Write;
use std::sync::Arc;
use tickbar_aggregate::Bar;
use tickbar_types::{Price, TradeRecord};

use crate::{FormatError, Formatter};

/// Decimal precision of bar price columns.
pub const PRICE_PRECISION: u8 = 19;

/// Decimal scale of bar price columns; matches [`Price::DECIMALS`].
pub const PRICE_SCALE: i8 = Price::DECIMALS;

/// Parquet formatter.
///
/// Bar files carry exactly `time, open, high, low, close, volume`. Prices are
/// stored as `Decimal128(19, 9)` so the fixed-point value is preserved bit
/// for bit.
#[derive(Debug, Clone)]
pub struct ParquetFormatter {
    /// Row group size (number of rows per group).
    row_group_size: usize,
    /// Compression codec.
    compression: Compression,
}

impl Default for ParquetFormatter {
    fn default() -> Self {
        Self {
            row_group_size: 100_000,
            compression: Compression::SNAPPY,
        }
    }
}

impl ParquetFormatter {
    /// Creates a new Parquet formatter with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the row group size.
    #[must_use]
    pub const fn with_row_group_size(mut self, size: usize) -> Self {
        self.row_group_size = size;
        self
    }

    /// Sets the compression codec.
    #[must_use]
    pub const fn with_compression(mut self, compression: Compression) -> Self {
        self.compression = compression;
        self
    }

    /// Creates the Arrow schema for canonical trade records.
    #[must_use]
    pub fn trade_schema() -> Schema {
        Schema::new(vec![
            Field::new(
                "ts_event",
                DataType::Timestamp(TimeUnit::Nanosecond, Some("UTC".into())),
                false,
            ),
            Field::new("price", DataType::Int64, false),
            Field::new("size", DataType::UInt64, false),
            Field::new("instrument_id", DataType::Utf8, false),
        ])
    }

    /// Creates the Arrow schema for OHLCV bars.
    #[must_use]
    pub fn bar_schema() -> Schema {
        let price = DataType::Decimal128(PRICE_PRECISION, PRICE_SCALE);
        Schema::new(vec![
            Field::new(
                "time",
                DataType::Timestamp(TimeUnit::Nanosecond, Some("UTC".into())),
                false,
            ),
            Field::new("open", price.clone(), false),
            Field::new("high", price.clone(), false),
            Field::new("low", price.clone(), false),
            Field::new("close", price, false),
            Field::new("volume", DataType::UInt64, false),
        ])
    }

    fn properties(&self) -> WriterProperties {
        WriterProperties::builder()
            .set_compression(self.compression)
            .set_max_row_group_size(self.row_group_size)
            .build()
    }

    /// Converts trade records to an Arrow RecordBatch.
    fn trades_to_batch(records: &[TradeRecord]) -> Result<RecordBatch, FormatError> {
        let timestamps = records
            .iter()
            .map(|r| nanos(r.event_time))
            .collect::<Result<Vec<_>, _>>()?;
        let prices: Vec<_> = records.iter().map(|r| r.price.raw()).collect();
        let sizes: Vec<_> = records.iter().map(|r| r.size).collect();
        let ids: Vec<_> = records.iter().map(|r| r.instrument_id.as_str()).collect();

        RecordBatch::try_new(
            Arc::new(Self::trade_schema()),
            vec![
                Arc::new(TimestampNanosecondArray::from(timestamps).with_timezone("UTC")),
                Arc::new(Int64Array::from(prices)),
                Arc::new(UInt64Array::from(sizes)),
                Arc::new(StringArray::from(ids)),
            ],
        )
        .map_err(|e| FormatError::Parquet(e.to_string()))
    }

    /// Converts OHLCV bars to an Arrow RecordBatch.
    fn bars_to_batch(bars: &[Bar]) -> Result<RecordBatch, FormatError> {
        let timestamps = bars
            .iter()
            .map(|b| nanos(b.bucket_start))
            .collect::<Result<Vec<_>, _>>()?;
        let volumes: Vec<_> = bars.iter().map(|b| b.volume).collect();

        RecordBatch::try_new(
            Arc::new(Self::bar_schema()),
            vec![
                Arc::new(TimestampNanosecondArray::from(timestamps).with_timezone("UTC")),
                decimal_column(bars.iter().map(|b| b.open))?,
                decimal_column(bars.iter().map(|b| b.high))?,
                decimal_column(bars.iter().map(|b| b.low))?,
                decimal_column(bars.iter().map(|b| b.close))?,
                Arc::new(UInt64Array::from(volumes)),
            ],
        )
        .map_err(|e| FormatError::Parquet(e.to_string()))
    }

    fn write_batches<W, T, F>(
        &self,
        schema: Schema,
        items: &[T],
        to_batch: F,
        writer: W,
    ) -> Result<(), FormatError>
    where
        W: Write + Send,
        F: Fn(&[T]) -> Result<RecordBatch, FormatError>,
    {
        let mut arrow_writer =
            ArrowWriter::try_new(writer, Arc::new(schema), Some(self.properties()))
                .map_err(|e| FormatError::Parquet(e.to_string()))?;

        for chunk in items.chunks(self.row_group_size.max(1)) {
            let batch = to_batch(chunk)?;
            arrow_writer
                .write(&batch)
                .map_err(|e| FormatError::Parquet(e.to_string()))?;
        }

        arrow_writer
            .close()
            .map_err(|e| FormatError::Parquet(e.to_string()))?;

        Ok(())
    }
}

fn nanos(time: DateTime<Utc>) -> Result<i64, FormatError> {
    time.timestamp_nanos_opt()
        .ok_or(FormatError::TimestampOutOfRange(time))
}

fn decimal_column(prices: impl Iterator<Item = Price>) -> Result<ArrayRef, FormatError> {
    let values: Vec<i128> = prices.map(|p| i128::from(p.raw())).collect();
    let array = Decimal128Array::from(values)
        .with_precision_and_scale(PRICE_PRECISION, PRICE_SCALE)
        .map_err(|e| FormatError::Parquet(e.to_string()))?;
    Ok(Arc::new(array))
}

impl Formatter for ParquetFormatter {
    fn write_trades<W: Write + Send>(
        &self,
        records: &[TradeRecord],
        writer: W,
    ) -> Result<(), FormatError> {
        self.write_batches(Self::trade_schema(), records, Self::trades_to_batch, writer)
    }

    fn write_bars<W: Write + Send>(&self, bars: &[Bar], writer: W) -> Result<(), FormatError> {
        self.write_batches(Self::bar_schema(), bars, Self::bars_to_batch, writer)
    }

    fn extension(&self) -> &str {
        "parquet"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::{Array, AsArray};
    use arrow::datatypes::{Decimal128Type, TimestampNanosecondType, UInt64Type};
    use chrono::{TimeDelta, TimeZone};
    use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
    use std::io::Cursor;

    fn create_test_bars() -> Vec<Bar> {
        let start = Utc.with_ymd_and_hms(2024, 1, 2, 10, 0, 0).unwrap();
        let (a, b, c) = (
            Price::from_raw(100_000_000_000),
            Price::from_raw(105_250_000_000),
            Price::from_raw(98_000_000_001),
        );
        vec![
            Bar::new(start, a, b, a, b, 3, 2),
            Bar::new(start + TimeDelta::minutes(1), c, c, c, c, 3, 1),
        ]
    }

    fn render(bars: &[Bar]) -> Vec<u8> {
        let mut output = Cursor::new(Vec::new());
        ParquetFormatter::new().write_bars(bars, &mut output).unwrap();
        output.into_inner()
    }

    #[test]
    fn test_parquet_bars() {
        let data = render(&create_test_bars());

        // Parquet files start with "PAR1" magic bytes
        assert!(data.len() > 4);
        assert_eq!(&data[0..4], b"PAR1");
    }

    #[test]
    fn test_bar_schema() {
        let schema = ParquetFormatter::bar_schema();
        let names: Vec<_> = schema.fields().iter().map(|f| f.name().as_str()).collect();
        assert_eq!(names, ["time", "open", "high", "low", "close", "volume"]);
        assert_eq!(
            schema.field_with_name("close").unwrap().data_type(),
            &DataType::Decimal128(19, 9)
        );
        assert_eq!(
            schema.field_with_name("time").unwrap().data_type(),
            &DataType::Timestamp(TimeUnit::Nanosecond, Some("UTC".into()))
        );
    }

    #[test]
    fn test_trade_schema() {
        let schema = ParquetFormatter::trade_schema();
        assert_eq!(schema.fields().len(), 4);
        assert!(schema.field_with_name("ts_event").is_ok());
        assert!(schema.field_with_name("instrument_id").is_ok());
    }

    #[test]
    fn test_parquet_is_deterministic() {
        let bars = create_test_bars();
        assert_eq!(render(&bars), render(&bars));
    }

    #[test]
    fn test_bars_read_back_exactly() {
        let bars = create_test_bars();
        let data = bytes_file(&render(&bars));

        let reader = ParquetRecordBatchReaderBuilder::try_new(data)
            .unwrap()
            .build()
            .unwrap();
        let batches: Vec<_> = reader.collect::<Result<_, _>>().unwrap();
        assert_eq!(batches.len(), 1);
        let batch = &batches[0];
        assert_eq!(batch.num_rows(), 2);

        let time = batch.column(0).as_primitive::<TimestampNanosecondType>();
        assert_eq!(time.value(1), bars[1].bucket_start.timestamp_nanos_opt().unwrap());

        let high = batch.column(2).as_primitive::<Decimal128Type>();
        assert_eq!(high.value(0), 105_250_000_000);
        assert_eq!(high.value_as_string(0), "105.250000000");

        let volume = batch.column(5).as_primitive::<UInt64Type>();
        assert_eq!(volume.len(), 2);
        assert_eq!(volume.value(0), 3);
    }

    #[test]
    fn test_empty_bars() {
        let data = render(&[]);
        assert_eq!(&data[0..4], b"PAR1");
    }

    fn bytes_file(data: &[u8]) -> std::fs::File {
        let mut file = tempfile::tempfile().unwrap();
        file.write_all(data).unwrap();
        file
    }
}
