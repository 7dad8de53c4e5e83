//! Fetch command implementation.
//!
//! Pulls candles from Coinbase and upserts them under the `cb` provider
//! namespace.

use anyhow::{Context, Result, ensure};
use barcache_lib::prelude::*;
use barcache_lib::timestamp::{BoundKind, parse_bound};
use chrono::Utc;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Reject a `--provider` the source would not write to.
fn check_provider(provider: &str, source: &impl CandleSource) -> Result<()> {
    ensure!(
        provider == source.provider_tag(),
        "fetch writes under provider '{}', not '{provider}'",
        source.provider_tag()
    );
    Ok(())
}

/// Fetch a range of candles into the cache.
#[allow(clippy::too_many_arguments)]
pub(crate) async fn fetch(
    cache_dir: &str,
    provider: &str,
    symbol: &str,
    interval: &str,
    start: &str,
    end: Option<&str>,
    clear: bool,
    concurrency: usize,
    quiet: bool,
) -> Result<()> {
    let range = match end {
        Some(end) => TimeRange::parse(start, end)?,
        None => TimeRange::new(parse_bound(start, BoundKind::Start)?, Utc::now())?,
    };

    let config = ClientConfig::default().with_concurrency(concurrency);
    let client = CoinbaseClient::new(config).context("Failed to create HTTP client")?;
    check_provider(provider, &client)?;
    let cache = CandleCache::new(cache_dir, client);

    let progress = if quiet {
        ProgressBar::hidden()
    } else {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} [{elapsed_precise}] {msg}")
                .context("Invalid progress template")?,
        );
        pb.set_message(format!("{symbol} {interval} {range}"));
        pb.enable_steady_tick(Duration::from_millis(100));
        pb
    };

    let result = cache.cache_range(symbol, interval, &range, clear).await;
    let written = match result {
        Ok(written) => written,
        Err(e) => {
            progress.abandon_with_message("Fetch failed");
            return Err(e).with_context(|| format!("Failed to cache {symbol}/{interval}"));
        }
    };
    progress.finish_with_message(format!("Cached {written} candles"));

    if !quiet {
        let path = cache.store().locate(symbol, interval)?;
        println!("Cache file: {}", path.display());
    }

    Ok(())
}
