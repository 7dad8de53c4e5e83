//! List command implementation.

use crate::display::format_instant;
use anyhow::{Context, Result};
use barcache_lib::CandleStore;

/// List cached partitions under the store's provider namespace.
pub(crate) fn list_partitions(store: &CandleStore) -> Result<()> {
    let partitions = store
        .locator()
        .partitions()
        .context("Failed to scan cache directory")?;

    if partitions.is_empty() {
        println!("No cached partitions.");
        return Ok(());
    }

    println!(
        "{:<15} {:<10} {:>10} {:<20} {:<20}",
        "SYMBOL", "INTERVAL", "ROWS", "FIRST", "LAST"
    );
    println!("{}", "-".repeat(79));

    for partition in &partitions {
        let count = store.count(partition)?;
        let (first, last) = store.bounds(partition)?.map_or_else(
            || ("-".to_string(), "-".to_string()),
            |range| (format_instant(range.start), format_instant(range.end)),
        );
        println!(
            "{:<15} {:<10} {:>10} {:<20} {:<20}",
            partition.symbol(),
            partition.interval(),
            count,
            first,
            last
        );
    }

    println!("\nTotal: {} partitions", partitions.len());
    Ok(())
}
