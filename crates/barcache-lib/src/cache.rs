//! Fetch-then-cache facade over a provider and the candle store.

use barcache_fetch::{CandleSource, FetchError};
use barcache_store::{CacheDir, CacheError, CacheLocator, CandleStore, StoreConfig};
use barcache_types::{CandleTable, Partition, RawCandle, TimeRange};
use thiserror::Error;
use tracing::{debug, info};

/// Errors from the fetch-then-cache facade.
#[derive(Error, Debug)]
pub enum Error {
    /// The store rejected the operation.
    #[error(transparent)]
    Cache(#[from] CacheError),

    /// The provider could not deliver candles.
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// A blocking store task panicked or was cancelled.
    #[error("Store task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl Error {
    /// Returns true if the partition has never been cached.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::Cache(e) if e.is_not_found())
    }
}

/// Result type for facade operations.
pub type Result<T> = std::result::Result<T, Error>;

/// A provider paired with the store namespace it writes to.
///
/// Partitions live under the source's [`CandleSource::provider_tag`], so
/// two providers never overwrite each other's data. Store calls run on the
/// blocking thread pool.
#[derive(Debug, Clone)]
pub struct CandleCache<S> {
    source: S,
    store: CandleStore,
}

impl<S: CandleSource> CandleCache<S> {
    /// Creates a cache rooted at `base` for the given source.
    #[must_use]
    pub fn new(base: impl Into<CacheDir>, source: S) -> Self {
        let locator = CacheLocator::new(base).with_provider(source.provider_tag());
        Self {
            source,
            store: CandleStore::with_locator(locator),
        }
    }

    /// Overrides the store configuration.
    #[must_use]
    pub fn with_store_config(mut self, config: StoreConfig) -> Self {
        self.store = self.store.with_config(config);
        self
    }

    /// Returns the underlying store.
    #[must_use]
    pub const fn store(&self) -> &CandleStore {
        &self.store
    }

    /// Returns the provider.
    #[must_use]
    pub const fn source(&self) -> &S {
        &self.source
    }

    /// Fetches `range` from the provider and upserts it.
    ///
    /// With `clear`, the partition is reset before the write. A fetch
    /// failure leaves the partition untouched. Returns the number of rows
    /// written.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is invalid, the fetch fails, or the store
    /// rejects the batch.
    pub async fn cache_range(
        &self,
        symbol: &str,
        interval: &str,
        range: &TimeRange,
        clear: bool,
    ) -> Result<usize> {
        let partition = Partition::new(symbol, interval).map_err(CacheError::from)?;
        let rows = self.source.fetch(symbol, interval, range).await?;
        debug!(%partition, rows = rows.len(), "fetched rows");
        self.upsert(partition, rows, clear).await
    }

    /// Queries cached candles without touching the provider.
    ///
    /// # Errors
    ///
    /// Returns an error if the bounds are invalid, nothing is cached, or the
    /// storage unit cannot be read.
    pub async fn load(
        &self,
        symbol: &str,
        interval: &str,
        range: &TimeRange,
        strip_fractions: bool,
    ) -> Result<CandleTable> {
        let partition = Partition::new(symbol, interval).map_err(CacheError::from)?;
        self.query(partition, *range, strip_fractions).await
    }

    /// Queries cached candles, fetching and caching `range` first if the
    /// partition has never been written.
    ///
    /// A partition that exists but lacks rows in `range` is returned as-is.
    ///
    /// # Errors
    ///
    /// Returns an error if the fetch, the upsert or the query fails.
    pub async fn load_or_fetch(
        &self,
        symbol: &str,
        interval: &str,
        range: &TimeRange,
        strip_fractions: bool,
    ) -> Result<CandleTable> {
        match self.load(symbol, interval, range, strip_fractions).await {
            Err(e) if e.is_not_found() => {
                info!(symbol, interval, %range, "cache miss, fetching");
                self.cache_range(symbol, interval, range, false).await?;
                self.load(symbol, interval, range, strip_fractions).await
            }
            other => other,
        }
    }

    async fn upsert(&self, partition: Partition, rows: Vec<RawCandle>, clear: bool) -> Result<usize> {
        let store = self.store.clone();
        let written =
            tokio::task::spawn_blocking(move || store.upsert_partition(&partition, &rows, clear))
                .await??;
        Ok(written)
    }

    async fn query(
        &self,
        partition: Partition,
        range: TimeRange,
        strip_fractions: bool,
    ) -> Result<CandleTable> {
        let store = self.store.clone();
        let table = tokio::task::spawn_blocking(move || {
            store.query_range(&partition, &range, strip_fractions)
        })
        .await??;
        Ok(table)
    }
}
