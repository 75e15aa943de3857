//! CSV output format.

use std::io::Write;
use tickbar_aggregate::Bar;
use tickbar_types::TradeRecord;

use crate::{FormatError, Formatter};

/// CSV formatter.
///
/// Bar prices are written as decimals; trade prices keep their raw
/// fixed-point integer form so the file reads back as source data.
#[derive(Debug, Clone)]
pub struct CsvFormatter {
    /// Field delimiter (default: comma).
    delimiter: char,
    /// Whether to include header row.
    include_header: bool,
}

impl Default for CsvFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl CsvFormatter {
    /// Creates a new CSV formatter with default settings.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            delimiter: ',',
            include_header: true,
        }
    }

    /// Sets the field delimiter.
    #[must_use]
    pub const fn with_delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Sets whether to include a header row.
    #[must_use]
    pub const fn with_header(mut self, include: bool) -> Self {
        self.include_header = include;
        self
    }

    /// Creates a tab-separated values (TSV) formatter.
    #[must_use]
    pub const fn tsv() -> Self {
        Self {
            delimiter: '\t',
            include_header: true,
        }
    }
}

impl Formatter for CsvFormatter {
    fn write_trades<W: Write + Send>(
        &self,
        records: &[TradeRecord],
        mut writer: W,
    ) -> Result<(), FormatError> {
        let d = self.delimiter;

        if self.include_header {
            writeln!(writer, "ts_event{d}price{d}size{d}instrument_id")?;
        }

        for record in records {
            writeln!(
                writer,
                "{}{d}{}{d}{}{d}{}",
                record.event_time.format("%Y-%m-%dT%H:%M:%S%.9fZ"),
                record.price.raw(),
                record.size,
                record.instrument_id
            )?;
        }

        writer.flush()?;
        Ok(())
    }

    fn write_bars<W: Write + Send>(&self, bars: &[Bar], mut writer: W) -> Result<(), FormatError> {
        let d = self.delimiter;

        if self.include_header {
            writeln!(writer, "time{d}open{d}high{d}low{d}close{d}volume")?;
        }

        for bar in bars {
            writeln!(
                writer,
                "{}{d}{}{d}{}{d}{}{d}{}{d}{}",
                bar.bucket_start.format("%Y-%m-%dT%H:%M:%SZ"),
                bar.open,
                bar.high,
                bar.low,
                bar.close,
                bar.volume
            )?;
        }

        writer.flush()?;
        Ok(())
    }

    fn extension(&self) -> &str {
        "csv"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeDelta, TimeZone, Utc};
    use std::io::Cursor;
    use tickbar_types::Price;

    fn create_test_bars() -> Vec<Bar> {
        let start = Utc.with_ymd_and_hms(2024, 1, 2, 10, 0, 0).unwrap();
        let p = |units| Price::from_raw(units * Price::SCALE);
        vec![
            Bar::new(start, p(100), p(105), p(100), p(105), 3, 2),
            Bar::new(start + TimeDelta::minutes(1), p(98), p(98), p(98), p(98), 3, 1),
        ]
    }

    fn render(formatter: &CsvFormatter, bars: &[Bar]) -> String {
        let mut output = Cursor::new(Vec::new());
        formatter.write_bars(bars, &mut output).unwrap();
        String::from_utf8(output.into_inner()).unwrap()
    }

    #[test]
    fn test_csv_bars() {
        let result = render(&CsvFormatter::new(), &create_test_bars());
        assert_eq!(
            result,
            "time,open,high,low,close,volume\n\
             2024-01-02T10:00:00Z,100,105,100,105,3\n\
             2024-01-02T10:01:00Z,98,98,98,98,3\n"
        );
    }

    #[test]
    fn test_csv_is_deterministic() {
        let bars = create_test_bars();
        let formatter = CsvFormatter::new();
        assert_eq!(render(&formatter, &bars), render(&formatter, &bars));
    }

    #[test]
    fn test_csv_no_header() {
        let result = render(&CsvFormatter::new().with_header(false), &create_test_bars());
        assert!(!result.contains("time,open"));
        assert_eq!(result.lines().count(), 2);
    }

    #[test]
    fn test_tsv() {
        let result = render(&CsvFormatter::tsv(), &create_test_bars());
        assert!(result.starts_with("time\topen\thigh"));
    }

    #[test]
    fn test_csv_trades() {
        let t = Utc.with_ymd_and_hms(2024, 1, 2, 10, 0, 0).unwrap() + TimeDelta::nanoseconds(5);
        let records = vec![TradeRecord::new(t, Price::from_raw(4_512_250_000_000), 7, "ESH4")];
        let mut output = Cursor::new(Vec::new());

        CsvFormatter::new().write_trades(&records, &mut output).unwrap();

        let result = String::from_utf8(output.into_inner()).unwrap();
        assert!(result.contains("ts_event,price,size,instrument_id"));
        assert!(result.contains("2024-01-02T10:00:00.000000005Z,4512250000000,7,ESH4"));
    }
}
