//! Coinbase Exchange candle source.

use async_trait::async_trait;
use barcache_types::{RawCandle, TimeRange};
use chrono::{DateTime, TimeDelta};
use futures::stream::{self, StreamExt, TryStreamExt};
use std::str::FromStr;
use tracing::{debug, info};

use crate::url::{BASE_URL, candles_url};
use crate::{CandleSource, ClientConfig, FetchError, HttpClient};

/// Provider tag used for Coinbase partitions.
pub const PROVIDER_TAG: &str = "cb";

/// Maximum candles Coinbase returns per request.
pub const MAX_CANDLES_PER_REQUEST: i64 = 300;

/// Bucket sizes accepted by the Coinbase candles endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Granularity {
    /// 1-minute buckets.
    Minute1,
    /// 5-minute buckets.
    Minute5,
    /// 15-minute buckets.
    Minute15,
    /// 1-hour buckets.
    Hour1,
    /// 6-hour buckets.
    Hour6,
    /// Daily buckets.
    Day1,
}

impl Granularity {
    /// Returns the bucket size in seconds.
    #[must_use]
    pub const fn seconds(&self) -> u32 {
        match self {
            Self::Minute1 => 60,
            Self::Minute5 => 300,
            Self::Minute15 => 900,
            Self::Hour1 => 3600,
            Self::Hour6 => 21_600,
            Self::Day1 => 86_400,
        }
    }

    /// Returns the widest time span a single request can cover.
    #[must_use]
    pub fn page_span(&self) -> TimeDelta {
        TimeDelta::seconds(i64::from(self.seconds()) * (MAX_CANDLES_PER_REQUEST - 1))
    }

    /// Returns the canonical interval tag.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Minute1 => "1m",
            Self::Minute5 => "5m",
            Self::Minute15 => "15m",
            Self::Hour1 => "1h",
            Self::Hour6 => "6h",
            Self::Day1 => "1d",
        }
    }
}

impl std::fmt::Display for Granularity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Granularity {
    type Err = FetchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "1m" | "m1" | "60" => Ok(Self::Minute1),
            "5m" | "m5" | "300" => Ok(Self::Minute5),
            "15m" | "m15" | "900" => Ok(Self::Minute15),
            "1h" | "h1" | "60m" | "3600" => Ok(Self::Hour1),
            "6h" | "h6" | "21600" => Ok(Self::Hour6),
            "1d" | "d1" | "day" | "daily" | "86400" => Ok(Self::Day1),
            _ => Err(FetchError::UnsupportedInterval {
                interval: s.to_string(),
                provider: "coinbase",
            }),
        }
    }
}

/// One candle as returned by Coinbase: `[time, low, high, open, close, volume]`.
type CoinbaseRow = (i64, f64, f64, f64, f64, f64);

/// Candle source backed by the Coinbase Exchange public API.
///
/// Symbols are Coinbase product ids such as `BTC-USD`. Long ranges are split
/// into pages and fetched concurrently.
#[derive(Debug, Clone)]
pub struct CoinbaseClient {
    http: HttpClient,
    base_url: String,
}

impl CoinbaseClient {
    /// Creates a client against the public endpoint.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(config: ClientConfig) -> Result<Self, FetchError> {
        Ok(Self {
            http: HttpClient::new(config)?,
            base_url: BASE_URL.to_string(),
        })
    }

    /// Creates a client with default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn with_defaults() -> Result<Self, FetchError> {
        Self::new(ClientConfig::default())
    }

    /// Points the client at a different API root.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Returns the API root.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Returns the page URLs needed to cover a range.
    #[must_use]
    pub fn page_urls(&self, symbol: &str, granularity: Granularity, range: &TimeRange) -> Vec<String> {
        range
            .windows(granularity.page_span())
            .map(|window| {
                candles_url(
                    &self.base_url,
                    symbol,
                    granularity.seconds(),
                    window.start,
                    window.end,
                )
            })
            .collect()
    }
}

#[async_trait]
impl CandleSource for CoinbaseClient {
    fn provider_tag(&self) -> &str {
        PROVIDER_TAG
    }

    async fn fetch(
        &self,
        symbol: &str,
        interval: &str,
        range: &TimeRange,
    ) -> Result<Vec<RawCandle>, FetchError> {
        let granularity: Granularity = interval.parse()?;
        let urls = self.page_urls(symbol, granularity, range);
        info!(symbol, %granularity, pages = urls.len(), "fetching candles from coinbase");

        let pages: Vec<Vec<CoinbaseRow>> = stream::iter(urls)
            .map(|url| async move {
                let rows: Vec<CoinbaseRow> = self.http.get_json(&url).await?;
                debug!(%url, rows = rows.len(), "fetched page");
                Ok::<_, FetchError>(rows)
            })
            .buffered(self.http.config().concurrency.max(1))
            .try_collect()
            .await?;

        Ok(merge_pages(pages, range))
    }
}

/// Flattens pages into ascending candles within `range`, one per timestamp.
fn merge_pages(pages: Vec<Vec<CoinbaseRow>>, range: &TimeRange) -> Vec<RawCandle> {
    let mut rows: Vec<CoinbaseRow> = pages.into_iter().flatten().collect();
    rows.sort_by_key(|row| row.0);
    rows.dedup_by_key(|row| row.0);

    rows.into_iter()
        .map(to_raw_candle)
        .filter(|candle| candle.timestamp.is_none_or(|ts| range.contains(ts)))
        .collect()
}

fn to_raw_candle((time, low, high, open, close, volume): CoinbaseRow) -> RawCandle {
    RawCandle {
        timestamp: DateTime::from_timestamp(time, 0),
        open: Some(open),
        high: Some(high),
        low: Some(low),
        close: Some(close),
        adjusted_close: None,
        volume: Some(volume),
    }
}
