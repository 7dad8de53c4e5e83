//! Core types for the barcache OHLCV candle cache.
//!
//! This crate provides the fundamental data structures used throughout barcache:
//!
//! - [`Candle`] - A normalized OHLCV bar with adjusted close
//! - [`RawCandle`] - Provider output before normalization
//! - [`Partition`] - The (symbol, interval) key of one storage unit
//! - [`TimeRange`] - Closed time range for queries and fetches
//! - [`CandleTable`] - Time-indexed query result
//! - [`timestamp`] - Canonical key text and bound parsing

#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/barcache/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod candle;
mod error;
mod partition;
mod range;
mod table;
pub mod timestamp;

pub use candle::{Candle, CandleField, RawCandle, normalize_batch};
pub use error::{IntegrityError, PartitionError, RangeError, TimestampError};
pub use partition::Partition;
pub use range::{TimeRange, WindowIterator};
pub use table::CandleTable;
