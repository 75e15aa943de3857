//! Display utilities and output formatting for the tickbar CLI.

use anyhow::{Context, Result, anyhow};
use chrono::NaiveDate;
use clap::ValueEnum;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use tickbar_lib::prelude::*;
use tickbar_lib::file_date_key;

use crate::{FilterArgs, PipelineArgs};

/// Output format for bar and trade files.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub(crate) enum Format {
    Parquet,
    Csv,
    Json,
    Ndjson,
}

impl Format {
    /// Returns the file extension for this format.
    pub(crate) const fn extension(&self) -> &'static str {
        match self {
            Self::Parquet => "parquet",
            Self::Csv => "csv",
            Self::Json => "json",
            Self::Ndjson => "ndjson",
        }
    }
}

impl std::fmt::Display for Format {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.extension())
    }
}

impl FilterArgs {
    /// Builds a pipeline configuration at `interval` from the filter options.
    pub(crate) fn to_config(&self, interval: Interval) -> Result<PipelineConfig> {
        let session = self
            .session
            .parse::<Session>()
            .map_err(|e| anyhow!("{e}"))?;
        let selection = self
            .instrument
            .parse::<InstrumentSelection>()
            .map_err(|e| anyhow!("{e}"))?;
        let policy = if self.strict {
            RejectPolicy::Abort
        } else {
            RejectPolicy::Skip
        };

        Ok(PipelineConfig::new(interval)
            .with_session(session)
            .with_selection(selection)
            .with_policy(policy)
            .with_allow_empty(!self.require_data))
    }
}

impl PipelineArgs {
    /// Builds the pipeline configuration from the command-line options.
    pub(crate) fn to_config(&self) -> Result<PipelineConfig> {
        let interval = self
            .interval
            .parse::<Interval>()
            .map_err(|e| anyhow!("{e}"))?;
        self.filters.to_config(interval)
    }
}

/// Parses a `YYYY-MM-DD` command-line date.
pub(crate) fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").with_context(|| format!("Invalid date: {s}"))
}

/// Returns an instrument id usable inside a file name.
///
/// Characters other than ASCII letters, digits, `-` and `.` become `_`.
pub(crate) fn instrument_label(id: &InstrumentId) -> String {
    if id.is_unspecified() {
        return "unspecified".to_string();
    }
    id.as_str()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '.' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

fn label_part(instrument: Option<&InstrumentId>) -> String {
    instrument
        .map(|id| format!("_{}", instrument_label(id)))
        .unwrap_or_default()
}

/// Returns the bar file name for one date, `<YYYYMMDD>[_<instrument>]_<interval>.<ext>`.
pub(crate) fn date_output_name(
    date: NaiveDate,
    instrument: Option<&InstrumentId>,
    interval: Interval,
    format: Format,
) -> String {
    format!(
        "{}{}_{interval}.{}",
        file_date_key(date),
        label_part(instrument),
        format.extension()
    )
}

/// Returns the combined bar file name, `<first>-<last>[_<instrument>]_<interval>.<ext>`.
pub(crate) fn combined_output_name(
    first: NaiveDate,
    last: NaiveDate,
    instrument: Option<&InstrumentId>,
    interval: Interval,
    format: Format,
) -> String {
    format!(
        "{}-{}{}_{interval}.{}",
        file_date_key(first),
        file_date_key(last),
        label_part(instrument),
        format.extension()
    )
}

/// Returns the canonical trade file name for one date, `<YYYYMMDD>_trades.<ext>`.
pub(crate) fn trades_output_name(date: NaiveDate, format: Format) -> String {
    format!("{}_trades.{}", file_date_key(date), format.extension())
}

/// Reads one date's raw trade rows.
pub(crate) fn read_trades(path: &Path) -> Result<Vec<RawTrade>> {
    #[cfg(feature = "parquet")]
    {
        ParquetTradeReader::new()
            .read_path(path)
            .with_context(|| format!("Failed to read {}", path.display()))
    }
    #[cfg(not(feature = "parquet"))]
    {
        anyhow::bail!("Parquet support not compiled in; cannot read {}", path.display());
    }
}

/// Write bars to a file in the specified format.
pub(crate) fn write_bars(bars: &[Bar], output: &Path, format: Format) -> Result<()> {
    let file = File::create(output)
        .with_context(|| format!("Failed to create {}", output.display()))?;
    let writer = BufWriter::new(file);

    match format {
        Format::Csv => {
            let formatter = CsvFormatter::new();
            formatter.write_bars(bars, writer)?;
        }
        Format::Json => {
            let formatter = JsonFormatter::new();
            formatter.write_bars(bars, writer)?;
        }
        Format::Ndjson => {
            let formatter = JsonFormatter::ndjson();
            formatter.write_bars(bars, writer)?;
        }
        Format::Parquet => {
            #[cfg(feature = "parquet")]
            {
                let formatter = ParquetFormatter::new();
                formatter.write_bars(bars, writer)?;
            }
            #[cfg(not(feature = "parquet"))]
            {
                anyhow::bail!("Parquet support not compiled in");
            }
        }
    }

    Ok(())
}

/// Writes each instrument's bar series into `dir`.
///
/// A single series (or none) goes to one unlabeled file; several series go
/// to one file per instrument. `name` maps an optional instrument to a file
/// name. Returns the paths written.
pub(crate) fn write_series(
    series: &BTreeMap<InstrumentId, Vec<Bar>>,
    dir: &Path,
    name: impl Fn(Option<&InstrumentId>) -> String,
    format: Format,
) -> Result<Vec<PathBuf>> {
    if series.len() <= 1 {
        let bars = series.values().next().map_or(&[][..], Vec::as_slice);
        let output = dir.join(name(None));
        write_bars(bars, &output, format)?;
        return Ok(vec![output]);
    }

    let mut written = Vec::with_capacity(series.len());
    for (id, bars) in series {
        let output = dir.join(name(Some(id)));
        write_bars(bars, &output, format)?;
        written.push(output);
    }
    Ok(written)
}

/// Write canonical trade records to a file in the specified format.
pub(crate) fn write_trades(records: &[TradeRecord], output: &Path, format: Format) -> Result<()> {
    let file = File::create(output)
        .with_context(|| format!("Failed to create {}", output.display()))?;
    let writer = BufWriter::new(file);

    match format {
        Format::Csv => {
            let formatter = CsvFormatter::new();
            formatter.write_trades(records, writer)?;
        }
        Format::Json => {
            let formatter = JsonFormatter::new();
            formatter.write_trades(records, writer)?;
        }
        Format::Ndjson => {
            let formatter = JsonFormatter::ndjson();
            formatter.write_trades(records, writer)?;
        }
        Format::Parquet => {
            #[cfg(feature = "parquet")]
            {
                let formatter = ParquetFormatter::new();
                formatter.write_trades(records, writer)?;
            }
            #[cfg(not(feature = "parquet"))]
            {
                anyhow::bail!("Parquet support not compiled in");
            }
        }
    }

    Ok(())
}
