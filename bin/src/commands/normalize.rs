//! Normalize command implementation.
//!
//! This module writes one date's canonical trade sequence, the records that
//! survive validation and the session and instrument filters, in event order.

use crate::commands::aggregate::trading_date;
use crate::display::{Format, parse_date, read_trades, trades_output_name, write_trades};
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tickbar_lib::prelude::*;
use tracing::info;

/// Normalize a single date file.
pub(crate) fn normalize(
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
    let canonical =
        canonical_date(date, rows, config).with_context(|| format!("Failed to normalize {date}"))?;

    let output = output.unwrap_or_else(|| PathBuf::from(trades_output_name(date, format)));
    write_trades(&canonical.records, &output, format)?;

    info!(
        %date,
        records = canonical.records.len(),
        rejected = canonical.rejected.len(),
        output = %output.display(),
        "wrote trades"
    );

    if !quiet {
        println!(
            "{date}: {} trades kept from {} rows ({} rejected)",
            canonical.records.len(),
            canonical.input_rows,
            canonical.rejected.len()
        );
        println!("Output written to: {}", output.display());
    }

    Ok(())
}
