//! Local OHLCV candle cache with idempotent upserts and range queries.
//!
//! This is a facade crate that re-exports functionality from the barcache
//! workspace crates for convenient access.
//!
//! # Quick Start
//!
//! ```ignore
//! use barcache_lib::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let cache = CandleCache::new("${CACHE}", CoinbaseClient::with_defaults()?);
//!     let range = TimeRange::parse("2024-01-01", "2024-01-31")?;
//!
//!     let table = cache.load_or_fetch("BTC-USD", "1h", &range, true).await?;
//!     println!("{} candles, last close {:?}", table.len(), table.last().map(|c| c.close));
//!
//!     Ok(())
//! }
//! ```

#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/barcache/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

#[cfg(feature = "fetch")]
mod cache;

// Re-export core types
pub use barcache_types::*;

// Re-export the store
pub use barcache_store::{
    CACHE_TOKEN, CacheDir, CacheError, CacheLocator, CandleStore, DEFAULT_CACHE_DIR,
    DEFAULT_PROVIDER, StoreConfig, TMP_TOKEN, UNIT_FILE_NAME,
};

// Re-export providers and the fetch-then-cache facade
#[cfg(feature = "fetch")]
pub use barcache_fetch::{
    CandleSource, ClientConfig, CoinbaseClient, FetchError, Granularity, HttpClient,
    PROVIDER_TAG as COINBASE_TAG,
};

#[cfg(feature = "fetch")]
pub use cache::{CandleCache, Error};

// Re-export formatters
#[cfg(feature = "format")]
pub use barcache_format::{
    CsvFormatter, FormatError, Formatter, JsonFormatter, JsonStyle, OutputFormat, write_candles,
};

#[cfg(all(feature = "format", feature = "parquet"))]
pub use barcache_format::ParquetFormatter;

/// Prelude module for convenient imports.
///
/// ```
/// use barcache_lib::prelude::*;
/// ```
pub mod prelude {
    pub use barcache_types::{Candle, CandleTable, Partition, RawCandle, TimeRange};

    pub use barcache_store::{CacheDir, CacheError, CandleStore};

    #[cfg(feature = "fetch")]
    pub use barcache_fetch::{CandleSource, ClientConfig, CoinbaseClient};

    #[cfg(feature = "fetch")]
    pub use crate::cache::CandleCache;

    #[cfg(feature = "format")]
    pub use barcache_format::{Formatter, OutputFormat, write_candles};
}
