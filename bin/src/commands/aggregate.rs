//! Aggregate command implementation.
//!
//! This module turns one date's trade file into bar files, one per
//! instrument when the date holds several.

use crate::display::{Format, date_output_name, parse_date, read_trades, write_bars, write_series};
use anyhow::{Context, Result, bail};
use chrono::NaiveDate;
use std::path::{Path, PathBuf};
use tickbar_lib::date_from_file_name;
use tickbar_lib::prelude::*;
use tracing::info;

/// Aggregate a single date file.
pub(crate) fn aggregate(
    input: &Path,
    date: Option<&str>,
    output: Option<PathBuf>,
    format: Format,
    config: &PipelineConfig,
    quiet: bool,
) -> Result<()> {
    let date = match date {
        Some(s) => parse_date(s)?,
        None => trading_date(input)?,
    };

    let rows = read_trades(input)?;
    let report =
        process_date(date, rows, config).with_context(|| format!("Failed to process {date}"))?;

    let written = match output {
        Some(output) => {
            if report.series.len() > 1 {
                bail!(
                    "{date} holds {} instruments; pass --instrument or omit --output to write one file each",
                    report.series.len()
                );
            }
            let bars = report.series.values().next().map_or(&[][..], Vec::as_slice);
            write_bars(bars, &output, format)?;
            vec![output]
        }
        None => write_series(
            &report.series,
            Path::new("."),
            |id| date_output_name(date, id, config.interval, format),
            format,
        )?,
    };

    info!(
        %date,
        instruments = report.series.len(),
        bars = report.bar_count(),
        rejected = report.rejected.len(),
        files = written.len(),
        "wrote bars"
    );

    if !quiet {
        println!(
            "{date}: {} bars from {} trades ({} rows rejected)",
            report.bar_count(),
            report.records,
            report.rejected.len()
        );
        for path in &written {
            println!("Output written to: {}", path.display());
        }
    }

    Ok(())
}

/// Infers the trading date from a `YYYYMMDD`-prefixed file name.
pub(crate) fn trading_date(path: &Path) -> Result<NaiveDate> {
    path.file_name()
        .and_then(|name| name.to_str())
        .and_then(date_from_file_name)
        .with_context(|| {
            format!(
                "Cannot infer a trading date from {}; pass --date",
                path.display()
            )
        })
}
