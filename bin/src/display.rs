//! Display utilities and output formatting for the barcache CLI.

use anyhow::{Context, Result, bail};
use barcache_lib::{Candle, OutputFormat, write_candles};
use chrono::{DateTime, Utc};
use clap::ValueEnum;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

/// Output format for query results.
#[derive(Clone, Copy, ValueEnum)]
pub(crate) enum Format {
    Csv,
    Json,
    Ndjson,
    Parquet,
}

impl From<Format> for OutputFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Csv => Self::Csv,
            Format::Json => Self::Json,
            Format::Ndjson => Self::Ndjson,
            Format::Parquet => Self::Parquet,
        }
    }
}

/// Write candles to a file, or to stdout when no path is given.
pub(crate) fn write_output(candles: &[Candle], output: Option<&Path>, format: Format) -> Result<()> {
    let format = OutputFormat::from(format);

    match output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create {}", path.display()))?;
            write_candles(format, candles, BufWriter::new(file))?;
        }
        None if format.is_binary() => {
            bail!("{format} output needs --output");
        }
        None => {
            write_candles(format, candles, BufWriter::new(std::io::stdout()))?;
        }
    }

    Ok(())
}

/// Format an instant for tabular output.
pub(crate) fn format_instant(instant: DateTime<Utc>) -> String {
    instant.format("%Y-%m-%d %H:%M:%S").to_string()
}
