//! Turn per-date trade records into calendar-aligned OHLCV bars.
//!
//! This is a facade crate that re-exports functionality from the tickbar
//! workspace crates and adds the per-date pipeline, [`process_date`] and [`canonical_date`].
//!
//! # Quick Start
//!
//! ```
//! use tickbar_lib::prelude::*;
//!
//! let date = chrono::NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
//! let rows = vec![
//!     RawTrade::new(0, "2024-01-02T10:00:10Z", 100_000_000_000_i64, 1_i64, "ESH4"),
//!     RawTrade::new(1, "2024-01-02T10:00:50Z", 105_000_000_000_i64, 2_i64, "ESH4"),
//! ];
//!
//! let report = process_date(date, rows, &PipelineConfig::new(Interval::Minute))?;
//! let bars = &report.series[&InstrumentId::from("ESH4")];
//! assert_eq!(bars.len(), 1);
//! assert_eq!(bars[0].volume, 3);
//! # Ok::<(), TickbarError>(())
//! ```

#![doc(issue_tracker_base_url = "https://github.com/tickbar/tickbar/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod pipeline;

pub use pipeline::{CanonicalDate, DateReport, PipelineConfig, canonical_date, process_date};

// Re-export core types
pub use tickbar_types::*;

// Re-export normalization
pub use tickbar_normalize::{
    InstrumentSelection, Normalized, Normalizer, RejectPolicy, Session, dominant_instrument,
    normalize_row, parse_timestamp, parse_timestamp_str, volume_by_instrument,
};

// Re-export aggregation
pub use tickbar_aggregate::{
    Bar, BarAggregator, aggregate, aggregate_by_instrument, aggregate_unsorted, check_ordered,
};

// Re-export formatters
#[cfg(feature = "format")]
pub use tickbar_format::{
    CsvFormatter, FormatError, Formatter, JsonFormatter, JsonStyle, OutputFormat,
};

#[cfg(all(feature = "format", feature = "parquet"))]
pub use tickbar_format::{ParquetFormatter, ParquetTradeReader};

/// Prelude module for convenient imports.
///
/// ```
/// use tickbar_lib::prelude::*;
/// ```
pub mod prelude {
    pub use crate::pipeline::{
        CanonicalDate, DateReport, PipelineConfig, canonical_date, process_date,
    };

    pub use tickbar_types::{
        DateRange, InstrumentId, Interval, Price, RawTrade, RawValue, Result, TickbarError,
        TradeRecord,
    };

    pub use tickbar_normalize::{InstrumentSelection, Normalizer, RejectPolicy, Session};

    pub use tickbar_aggregate::{Bar, BarAggregator, aggregate};

    #[cfg(feature = "format")]
    pub use tickbar_format::{CsvFormatter, Formatter, JsonFormatter, OutputFormat};

    #[cfg(all(feature = "format", feature = "parquet"))]
    pub use tickbar_format::{ParquetFormatter, ParquetTradeReader};
}
