//! Show command implementation.

use crate::display::{Format, write_output};
use anyhow::{Context, Result};
use barcache_lib::CandleStore;
use std::path::PathBuf;

/// Query a partition and write the rows out.
#[allow(clippy::too_many_arguments)]
pub(crate) fn show(
    store: &CandleStore,
    symbol: &str,
    interval: &str,
    start: &str,
    end: &str,
    format: Format,
    output: Option<PathBuf>,
    strip_fractions: bool,
    quiet: bool,
) -> Result<()> {
    let table = store
        .query(symbol, interval, start, end, strip_fractions)
        .with_context(|| format!("Failed to query {symbol}/{interval}"))?;

    write_output(table.as_slice(), output.as_deref(), format)?;

    if let Some(path) = output
        && !quiet
    {
        println!("Wrote {} candles to {}", table.len(), path.display());
    }

    Ok(())
}
