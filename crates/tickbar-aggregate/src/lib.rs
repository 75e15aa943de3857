//! Trade-to-OHLCV bar aggregation for tickbar.
//!
//! This crate reduces a time-ordered trade sequence to sparse,
//! calendar-aligned OHLCV bars:
//!
//! - [`Bar`] - OHLCV bar data structure
//! - [`BarAggregator`] - Single-pass streaming aggregator
//! - [`aggregate`] - Batch aggregation of an ordered sequence
//! - [`aggregate_by_instrument`] - Independent bar series per instrument

#![doc(issue_tracker_base_url = "https://github.com/tickbar/tickbar/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod aggregator;
mod bar;
mod grouped;

pub use aggregator::{BarAggregator, aggregate, aggregate_unsorted, check_ordered};
pub use bar::Bar;
pub use grouped::aggregate_by_instrument;
