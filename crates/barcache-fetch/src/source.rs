//! Provider contract consumed by the cache.

use async_trait::async_trait;
use barcache_types::{RawCandle, TimeRange};
use thiserror::Error;

/// Errors that can occur while fetching candles from a provider.
#[derive(Error, Debug)]
pub enum FetchError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Server kept returning an error status after all retries.
    #[error("Server error: {status}")]
    ServerError {
        /// HTTP status code.
        status: u16,
    },

    /// Response body was not the expected shape.
    #[error("Failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),

    /// The provider has no bucket size matching the interval tag.
    #[error("Interval '{interval}' is not supported by {provider}")]
    UnsupportedInterval {
        /// The requested interval tag.
        interval: String,
        /// The provider that rejected it.
        provider: &'static str,
    },
}

/// A remote source of OHLCV candles.
///
/// Implementations return rows for `symbol` at `interval` within `range`,
/// in ascending timestamp order. Rows may lack fields; the store validates
/// them on upsert.
#[async_trait]
pub trait CandleSource: Send + Sync {
    /// Namespace used for this provider's partitions in the cache.
    fn provider_tag(&self) -> &str;

    /// Fetches candles for a symbol and interval.
    ///
    /// # Errors
    ///
    /// Returns an error if the provider cannot be reached or answers with
    /// something unusable.
    async fn fetch(
        &self,
        symbol: &str,
        interval: &str,
        range: &TimeRange,
    ) -> Result<Vec<RawCandle>, FetchError>;
}
