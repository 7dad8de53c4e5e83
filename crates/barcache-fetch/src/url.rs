//! Coinbase Exchange URL construction.

use chrono::{DateTime, SecondsFormat, Utc};

/// Base URL for the Coinbase Exchange public API.
pub const BASE_URL: &str = "https://api.exchange.coinbase.com";

/// Builds the URL for one page of candles.
///
/// URL format:
/// `{base}/products/{PRODUCT}/candles?granularity={seconds}&start={rfc3339}&end={rfc3339}`
///
/// # Example
///
/// ```
/// use barcache_fetch::url::{candles_url, BASE_URL};
/// use chrono::{TimeZone, Utc};
///
/// let start = Utc.with_ymd_and_hms(2024, 1, 15, 0, 0, 0).unwrap();
/// let end = Utc.with_ymd_and_hms(2024, 1, 16, 0, 0, 0).unwrap();
/// let url = candles_url(BASE_URL, "btc-usd", 3600, start, end);
/// assert_eq!(
///     url,
///     "https://api.exchange.coinbase.com/products/BTC-USD/candles?granularity=3600&start=2024-01-15T00:00:00Z&end=2024-01-16T00:00:00Z"
/// );
/// ```
#[must_use]
pub fn candles_url(
    base: &str,
    product: &str,
    granularity: u32,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> String {
    format!(
        "{}/products/{}/candles?granularity={}&start={}&end={}",
        base.trim_end_matches('/'),
        product.to_uppercase(),
        granularity,
        start.to_rfc3339_opts(SecondsFormat::Secs, true),
        end.to_rfc3339_opts(SecondsFormat::Secs, true),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_candles_url_uppercases_product() {
        let start = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        let url = candles_url(BASE_URL, "eth-eur", 60, start, start);
        assert!(url.contains("/products/ETH-EUR/candles"));
    }

    #[test]
    fn test_candles_url_trailing_slash() {
        let start = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        let url = candles_url("http://localhost:8080/", "BTC-USD", 86400, start, start);
        assert_eq!(
            url,
            "http://localhost:8080/products/BTC-USD/candles?granularity=86400&start=2024-06-01T00:00:00Z&end=2024-06-01T00:00:00Z"
        );
    }

    #[test]
    fn test_candles_url_drops_subseconds() {
        let start = Utc.with_ymd_and_hms(2024, 6, 1, 12, 30, 0).unwrap()
            + chrono::TimeDelta::milliseconds(250);
        let url = candles_url(BASE_URL, "BTC-USD", 300, start, start);
        assert!(url.contains("start=2024-06-01T12:30:00Z"));
    }
}
