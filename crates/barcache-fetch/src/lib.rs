//! Market-data provider adapters for barcache.
//!
//! - [`CandleSource`] - Contract every provider implements
//! - [`HttpClient`] - HTTP client with connection pooling and retries
//! - [`CoinbaseClient`] - Coinbase Exchange candles, paged and fetched concurrently
//! - [`url::candles_url`] - Coinbase URL construction

#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/barcache/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod client;
mod coinbase;
mod source;
pub mod url;

pub use client::{ClientConfig, HttpClient};
pub use coinbase::{CoinbaseClient, Granularity, MAX_CANDLES_PER_REQUEST, PROVIDER_TAG};
pub use source::{CandleSource, FetchError};
