//! tickbar CLI - turn per-date trade files into OHLCV bars.

use anyhow::Result;
use clap::{Args, CommandFactory, Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;
mod display;

use display::Format;
use tickbar_lib::Interval;

#[derive(Parser)]
#[command(name = "tickbar")]
#[command(about = "Aggregate per-date trade files into OHLCV bars", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Quiet mode (suppress progress output)
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Aggregate a single date file
    Aggregate {
        /// Input trade file (Parquet)
        input: PathBuf,

        /// Trading date (YYYY-MM-DD). Defaults to the YYYYMMDD prefix of the file name.
        #[arg(short, long)]
        date: Option<String>,

        /// Output file path. Defaults to <YYYYMMDD>_<interval>.<format>, or one
        /// <YYYYMMDD>_<instrument>_<interval>.<format> file per instrument
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[command(flatten)]
        options: PipelineArgs,
    },

    /// Write one date's canonical trade records
    Normalize {
        /// Input trade file (Parquet)
        input: PathBuf,

        /// Trading date (YYYY-MM-DD). Defaults to the YYYYMMDD prefix of the file name.
        #[arg(short, long)]
        date: Option<String>,

        /// Output file path. Defaults to <YYYYMMDD>_trades.<format>
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "parquet")]
        format: Format,

        #[command(flatten)]
        filters: FilterArgs,
    },

    /// Aggregate every date file in a directory
    Batch {
        /// Directory of YYYYMMDD.parquet trade files
        input_dir: PathBuf,

        /// Output directory
        #[arg(short, long, default_value = ".")]
        output_dir: PathBuf,

        /// First date to process (YYYY-MM-DD)
        #[arg(short, long)]
        start: Option<String>,

        /// Last date to process (YYYY-MM-DD)
        #[arg(short, long)]
        end: Option<String>,

        /// Maximum dates processed concurrently
        #[arg(short, long, default_value = "4")]
        jobs: usize,

        /// Also write one file with every date's bars, named <first>-<last>_<interval>
        #[arg(long)]
        combine: bool,

        #[command(flatten)]
        options: PipelineArgs,
    },

    /// List supported intervals
    Intervals,
}

/// Options shared by the aggregating commands.
#[derive(Args)]
struct PipelineArgs {
    /// Bar interval (minute, hour, day)
    #[arg(short, long, default_value = "minute")]
    interval: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "parquet")]
    format: Format,

    #[command(flatten)]
    filters: FilterArgs,
}

/// Record filters shared by every command that reads trades.
#[derive(Args)]
struct FilterArgs {
    /// Trading session (all, electronic, regular, extended)
    #[arg(long, default_value = "all")]
    session: String,

    /// Instruments to keep (all, dominant, or an instrument id)
    #[arg(long, default_value = "all")]
    instrument: String,

    /// Fail on the first malformed row instead of skipping it
    #[arg(long)]
    strict: bool,

    /// Treat a date with no valid trades as an error
    #[arg(long)]
    require_data: bool,
}

fn init_tracing(verbose: u8, quiet: bool) {
    let level = match (quiet, verbose) {
        (true, _) => "error",
        (false, 0) => "warn",
        (false, 1) => "info",
        (false, 2) => "debug",
        (false, _) => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    // Show help if no command provided
    let Some(command) = cli.command else {
        Cli::command().print_help()?;
        return Ok(());
    };

    match command {
        Commands::Aggregate {
            input,
            date,
            output,
            options,
        } => {
            let config = options.to_config()?;
            commands::aggregate::aggregate(
                &input,
                date.as_deref(),
                output,
                options.format,
                &config,
                cli.quiet,
            )
        }
        Commands::Normalize {
            input,
            date,
            output,
            format,
            filters,
        } => {
            let config = filters.to_config(Interval::default())?;
            commands::normalize::normalize(
                &input,
                date.as_deref(),
                output,
                format,
                &config,
                cli.quiet,
            )
        }
        Commands::Batch {
            input_dir,
            output_dir,
            start,
            end,
            jobs,
            combine,
            options,
        } => {
            let config = options.to_config()?;
            commands::batch::batch(
                input_dir,
                output_dir,
                start.as_deref(),
                end.as_deref(),
                options.format,
                config,
                jobs,
                combine,
                cli.quiet,
            )
            .await
        }
        Commands::Intervals => {
            commands::intervals::list_intervals();
            Ok(())
        }
    }
}
