//! Path and existence checks for a single partition.

use anyhow::{Context, Result};
use barcache_lib::CandleStore;

/// Print where a partition's storage unit lives, creating its directories.
pub(crate) fn path(store: &CandleStore, symbol: &str, interval: &str) -> Result<()> {
    let path = store
        .locate(symbol, interval)
        .with_context(|| format!("Failed to locate {symbol}/{interval}"))?;
    println!("{}", path.display());
    Ok(())
}

/// Print whether a partition has a storage unit.
pub(crate) fn exists(store: &CandleStore, symbol: &str, interval: &str) -> Result<()> {
    let exists = store
        .exists(symbol, interval)
        .with_context(|| format!("Failed to check {symbol}/{interval}"))?;
    println!("{exists}");
    Ok(())
}
