//! barcache CLI - Local OHLCV candle cache.

use anyhow::Result;
use barcache_lib::{COINBASE_TAG, CacheLocator, CandleStore, DEFAULT_CACHE_DIR};
use clap::{CommandFactory, Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;
mod display;

use display::Format;

#[derive(Parser)]
#[command(name = "barcache")]
#[command(about = "Local OHLCV candle cache", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Cache base directory. `${TMP}` and `${CACHE}` are expanded.
    #[arg(long, global = true, env = "BARCACHE_DIR", default_value = DEFAULT_CACHE_DIR)]
    cache_dir: String,

    /// Provider namespace inside the cache. `fetch` only writes to `cb`.
    #[arg(long, global = true, default_value = COINBASE_TAG)]
    provider: String,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Quiet mode (suppress progress output)
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the storage-unit path of a partition
    Path {
        /// Symbol (e.g., AAPL, BTC-USD)
        symbol: String,
        /// Interval tag (e.g., 1d, 1h)
        interval: String,
    },

    /// Report whether a partition has been cached
    Exists {
        /// Symbol
        symbol: String,
        /// Interval tag
        interval: String,
    },

    /// Fetch candles from Coinbase into the cache
    Fetch {
        /// Coinbase product id (e.g., BTC-USD)
        symbol: String,

        /// Interval: 1m, 5m, 15m, 1h, 6h or 1d
        interval: String,

        /// Start (YYYY-MM-DD or YYYY-MM-DD HH:MM:SS)
        #[arg(short, long)]
        start: String,

        /// End (inclusive). Defaults to now.
        #[arg(short, long)]
        end: Option<String>,

        /// Reset the partition before writing
        #[arg(long)]
        clear: bool,

        /// Maximum concurrent requests
        #[arg(long, default_value = "4")]
        concurrency: usize,
    },

    /// Print cached candles for a time range
    Show {
        /// Symbol
        symbol: String,

        /// Interval tag
        interval: String,

        /// Start (inclusive)
        #[arg(short, long)]
        start: String,

        /// End (inclusive). A bare date covers the whole day.
        #[arg(short, long)]
        end: String,

        /// Output format
        #[arg(short, long, value_enum, default_value = "csv")]
        format: Format,

        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Keep sub-second timestamp precision
        #[arg(long)]
        keep_fractions: bool,
    },

    /// List cached partitions
    List,

    /// Delete a cached partition
    Clear {
        /// Symbol
        symbol: String,

        /// Interval tag
        interval: String,

        /// Skip confirmation prompt
        #[arg(long)]
        yes: bool,
    },
}

fn init_tracing(verbose: u8, quiet: bool) {
    let level = match (quiet, verbose) {
        (true, _) => "error",
        (false, 0) => "warn",
        (false, 1) => "info",
        (false, 2) => "debug",
        (false, _) => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    let Some(command) = cli.command else {
        Cli::command().print_help()?;
        return Ok(());
    };

    let store = CandleStore::with_locator(
        CacheLocator::new(cli.cache_dir.as_str()).with_provider(cli.provider.as_str()),
    );

    match command {
        Commands::Path { symbol, interval } => commands::inspect::path(&store, &symbol, &interval),
        Commands::Exists { symbol, interval } => {
            commands::inspect::exists(&store, &symbol, &interval)
        }
        Commands::Fetch {
            symbol,
            interval,
            start,
            end,
            clear,
            concurrency,
        } => {
            commands::fetch::fetch(
                &cli.cache_dir,
                &cli.provider,
                &symbol,
                &interval,
                &start,
                end.as_deref(),
                clear,
                concurrency,
                cli.quiet,
            )
            .await
        }
        Commands::Show {
            symbol,
            interval,
            start,
            end,
            format,
            output,
            keep_fractions,
        } => commands::show::show(
            &store,
            &symbol,
            &interval,
            &start,
            &end,
            format,
            output,
            !keep_fractions,
            cli.quiet,
        ),
        Commands::List => commands::list::list_partitions(&store),
        Commands::Clear {
            symbol,
            interval,
            yes,
        } => commands::clear::clear(&store, &symbol, &interval, yes),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use barcache_lib::{CandleSource, CoinbaseClient};

    #[test]
    fn test_reads_default_to_fetch_namespace() {
        let cli = Cli::try_parse_from(["barcache", "list"]).unwrap();
        let client = CoinbaseClient::with_defaults().unwrap();
        assert_eq!(cli.provider, client.provider_tag());
    }

    #[test]
    fn test_provider_override() {
        let cli =
            Cli::try_parse_from(["barcache", "--provider", "yf", "path", "AAPL", "1d"]).unwrap();
        assert_eq!(cli.provider, "yf");
        assert!(matches!(cli.command, Some(Commands::Path { .. })));
    }
}
