//! Batch command implementation.
//!
//! This module processes a directory of date files in parallel, writing the
//! bar files of each date and optionally combined files spanning every date.

use crate::display::{
    Format, combined_output_name, date_output_name, parse_date, read_trades, write_series,
};
use anyhow::{Context, Result, bail};
use chrono::NaiveDate;
use futures::stream::{self, StreamExt};
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tickbar_lib::date_from_file_name;
use tickbar_lib::prelude::*;
use tracing::{info, warn};

/// Execute the batch command.
#[allow(clippy::too_many_arguments)]
pub(crate) async fn batch(
    input_dir: PathBuf,
    output_dir: PathBuf,
    start_str: Option<&str>,
    end_str: Option<&str>,
    format: Format,
    config: PipelineConfig,
    jobs: usize,
    combine: bool,
    quiet: bool,
) -> Result<()> {
    let mut files = discover_date_files(&input_dir)?;
    let (Some(first), Some(last)) = (files.first(), files.last()) else {
        bail!("No YYYYMMDD.parquet files found in {}", input_dir.display());
    };

    let start = start_str.map(parse_date).transpose()?.unwrap_or(first.0);
    let end = end_str.map(parse_date).transpose()?.unwrap_or(last.0);
    let range = DateRange::new(start, end)?;

    files.retain(|(date, _)| range.contains(*date));
    if files.is_empty() {
        bail!("No date files between {range}");
    }

    std::fs::create_dir_all(&output_dir)
        .with_context(|| format!("Failed to create {}", output_dir.display()))?;

    info!(dates = files.len(), %range, interval = %config.interval, jobs, "starting batch");

    let progress = progress_bar(files.len() as u64, quiet)?;
    progress.set_message(format!("{range} ({})", config.interval));

    // Each date is independent; the blocking pool runs read, process and write.
    let config = Arc::new(config);
    let mut results: Vec<(NaiveDate, Result<DateReport>)> = stream::iter(files)
        .map(|(date, path)| {
            let config = Arc::clone(&config);
            let output_dir = output_dir.clone();
            let progress = progress.clone();
            async move {
                let result = tokio::task::spawn_blocking(move || {
                    process_file(date, &path, &output_dir, format, &config)
                })
                .await
                .context("Date task panicked")
                .and_then(|result| result);
                progress.inc(1);
                (date, result)
            }
        })
        .buffer_unordered(jobs.max(1))
        .collect()
        .await;

    progress.finish_with_message("done");
    results.sort_by_key(|(date, _)| *date);

    let mut reports = Vec::new();
    let mut failures = Vec::new();
    for (date, result) in results {
        match result {
            Ok(report) => reports.push(report),
            Err(e) => {
                warn!(%date, error = %format!("{e:#}"), "date failed");
                failures.push((date, e));
            }
        }
    }

    if combine {
        write_combined(&reports, &output_dir, config.interval, format, quiet)?;
    }

    if !quiet {
        let bars: usize = reports.iter().map(DateReport::bar_count).sum();
        let rejected: usize = reports.iter().map(|r| r.rejected.len()).sum();
        println!("\nBatch complete:");
        println!("  Dates: {}", reports.len());
        println!("  Bars: {bars}");
        println!("  Rejected rows: {rejected}");
        if !failures.is_empty() {
            println!("  Failed: {}", failures.len());
            for (date, e) in &failures {
                println!("    {date}: {e:#}");
            }
        }
    }

    if !failures.is_empty() {
        bail!(
            "{} out of {} dates failed",
            failures.len(),
            reports.len() + failures.len()
        );
    }

    Ok(())
}

/// Lists `YYYYMMDD*.parquet` files in a directory, ascending by date.
pub(crate) fn discover_date_files(dir: &Path) -> Result<Vec<(NaiveDate, PathBuf)>> {
    let entries =
        std::fs::read_dir(dir).with_context(|| format!("Failed to read {}", dir.display()))?;

    let mut files = Vec::new();
    for entry in entries {
        let path = entry?.path();
        if path.extension().and_then(|e| e.to_str()) != Some("parquet") {
            continue;
        }
        let Some(date) = path
            .file_name()
            .and_then(|name| name.to_str())
            .and_then(date_from_file_name)
        else {
            continue;
        };
        files.push((date, path));
    }

    files.sort();
    Ok(files)
}

fn process_file(
    date: NaiveDate,
    input: &Path,
    output_dir: &Path,
    format: Format,
    config: &PipelineConfig,
) -> Result<DateReport> {
    let rows = read_trades(input)?;
    let report =
        process_date(date, rows, config).with_context(|| format!("Failed to process {date}"))?;
    let written = write_series(
        &report.series,
        output_dir,
        |id| date_output_name(date, id, config.interval, format),
        format,
    )?;

    info!(
        %date,
        instruments = report.series.len(),
        bars = report.bar_count(),
        rejected = report.rejected.len(),
        files = written.len(),
        "wrote bars"
    );
    Ok(report)
}

/// Writes every date's bars, in date order, one file per instrument.
fn write_combined(
    reports: &[DateReport],
    output_dir: &Path,
    interval: Interval,
    format: Format,
    quiet: bool,
) -> Result<()> {
    let (Some(first), Some(last)) = (reports.first(), reports.last()) else {
        warn!("no successful dates; skipping combined output");
        return Ok(());
    };

    let series = combine_series(reports);
    let written = write_series(
        &series,
        output_dir,
        |id| combined_output_name(first.date, last.date, id, interval, format),
        format,
    )?;

    if !quiet {
        for path in &written {
            println!("Combined output written to: {}", path.display());
        }
    }
    Ok(())
}

/// Concatenates each instrument's bars across date-ordered reports.
fn combine_series(reports: &[DateReport]) -> BTreeMap<InstrumentId, Vec<Bar>> {
    let mut combined: BTreeMap<InstrumentId, Vec<Bar>> = BTreeMap::new();
    for report in reports {
        for (id, bars) in &report.series {
            combined.entry(id.clone()).or_default().extend_from_slice(bars);
        }
    }
    combined
}

fn progress_bar(len: u64, quiet: bool) -> Result<ProgressBar> {
    if quiet {
        return Ok(ProgressBar::hidden());
    }

    let pb = ProgressBar::new(len);
    pb.set_style(
        ProgressStyle::default_bar()
            .template(
                "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} dates ({percent}%) {msg}",
            )?
            .progress_chars("=>-"),
    );
    Ok(pb)
}
