//! Core types for the tickbar trade-to-OHLCV aggregator.
//!
//! This crate provides the fundamental data structures used throughout tickbar:
//!
//! - [`TradeRecord`] - A normalized trade with timestamp, price, size, and instrument
//! - [`RawTrade`] - An untyped trade row as read from a source file
//! - [`Price`] - Fixed-point trade price
//! - [`InstrumentId`] - Opaque instrument identifier
//! - [`Interval`] - OHLCV aggregation interval and bucket truncation
//! - [`DateRange`] - Inclusive range of trading dates

#![doc(issue_tracker_base_url = "https://github.com/tickbar/tickbar/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod date_range;
mod error;
mod instrument;
mod interval;
mod price;
mod trade;

pub use date_range::{DateRange, FILE_DATE_FORMAT, date_from_file_name, file_date_key};
pub use error::{
    AggregateError, DateRangeError, RecordError, Result, SessionError, TickbarError,
};
pub use instrument::InstrumentId;
pub use interval::{Interval, IntervalParseError};
pub use price::Price;
pub use trade::{RawTrade, RawValue, TradeRecord};
