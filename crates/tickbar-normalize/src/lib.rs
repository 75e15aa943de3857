//! Trade record normalization for the tickbar OHLCV aggregator.
//!
//! This crate turns raw trade rows into the canonical, time-ordered record
//! sequence consumed by the aggregator:
//!
//! - [`Normalizer`] - Row validation, type coercion, and stable time ordering
//! - [`parse_timestamp`] - Multi-format event timestamp coercion
//! - [`Session`] - Exchange-local trading-session windows
//! - [`InstrumentSelection`] - Per-date instrument filtering

#![doc(issue_tracker_base_url = "https://github.com/tickbar/tickbar/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod normalizer;
mod selection;
mod session;
mod timestamp;

pub use normalizer::{Normalized, Normalizer, RejectPolicy, normalize_row};
pub use selection::{InstrumentSelection, dominant_instrument, volume_by_instrument};
pub use session::Session;
pub use timestamp::{parse_timestamp, parse_timestamp_str};
