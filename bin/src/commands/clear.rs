//! Clear command implementation.

use anyhow::{Context, Result};
use barcache_lib::{CandleStore, Partition};
use inquire::Confirm;

/// Delete a partition's storage unit after confirmation.
pub(crate) fn clear(store: &CandleStore, symbol: &str, interval: &str, yes: bool) -> Result<()> {
    let partition = Partition::new(symbol, interval)?;

    if !yes {
        let confirmed = Confirm::new(&format!("Delete cached data for {partition}?"))
            .with_default(false)
            .prompt()
            .context("Confirmation cancelled")?;
        if !confirmed {
            println!("Aborted.");
            return Ok(());
        }
    }

    if store.clear(&partition)? {
        println!("Cleared {partition}");
    } else {
        println!("Nothing cached for {partition}");
    }
    Ok(())
}
