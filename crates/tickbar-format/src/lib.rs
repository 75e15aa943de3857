//! Input and output formats for tickbar.
//!
//! This crate reads source trade files and writes bar (or normalized
//! trade) data to various output formats:
//!
//! - [`ParquetTradeReader`] - Parquet trade input with column coercion
//! - [`ParquetFormatter`] - Apache Parquet columnar format
//! - [`CsvFormatter`] - CSV format
//! - [`JsonFormatter`] - JSON array or NDJSON format

#![doc(issue_tracker_base_url = "https://github.com/tickbar/tickbar/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod csv;
mod formatter;
mod json;

#[cfg(feature = "parquet")]
mod parquet;
#[cfg(feature = "parquet")]
mod reader;

pub use crate::csv::CsvFormatter;
pub use formatter::{FormatError, Formatter, OutputFormat};
pub use json::{JsonFormatter, JsonStyle};

#[cfg(feature = "parquet")]
pub use crate::parquet::{PRICE_PRECISION, PRICE_SCALE, ParquetFormatter};
#[cfg(feature = "parquet")]
pub use reader::ParquetTradeReader;
