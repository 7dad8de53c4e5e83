//! Candle store: idempotent upserts and ordered range queries.

use barcache_types::timestamp::{parse_stored, strip_fraction, to_canonical};
use barcache_types::{Candle, CandleTable, Partition, RawCandle, TimeRange, normalize_batch};
use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, Row, TransactionBehavior, params};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

use crate::schema::{
    self, DELETE_KEY, RENAME_KEY, SELECT_BOUNDS, SELECT_COUNT, SELECT_NON_CANONICAL, SELECT_RANGE,
    SIDE_FILE_SUFFIXES, UPSERT,
};
use crate::{CacheDir, CacheError, CacheLocator, Result};

/// Configuration for store connections.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// How long a connection waits on a locked storage unit before failing.
    pub busy_timeout: Duration,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            busy_timeout: Duration::from_secs(5),
        }
    }
}

/// Owns one SQLite storage unit per partition.
///
/// Every operation opens its own short-lived connection and drops it before
/// returning. Distinct partitions share nothing; writers to the same
/// partition are serialized by SQLite's file lock.
#[derive(Debug, Clone, Default)]
pub struct CandleStore {
    locator: CacheLocator,
    config: StoreConfig,
}

impl CandleStore {
    /// Creates a store rooted at `base` with the default provider namespace.
    #[must_use]
    pub fn new(base: impl Into<CacheDir>) -> Self {
        Self::with_locator(CacheLocator::new(base))
    }

    /// Creates a store using an existing locator.
    #[must_use]
    pub fn with_locator(locator: CacheLocator) -> Self {
        Self {
            locator,
            config: StoreConfig::default(),
        }
    }

    /// Sets the connection configuration.
    #[must_use]
    pub const fn with_config(mut self, config: StoreConfig) -> Self {
        self.config = config;
        self
    }

    /// Returns the locator.
    #[must_use]
    pub const fn locator(&self) -> &CacheLocator {
        &self.locator
    }

    /// Returns the storage-unit path for `symbol`/`interval`, creating its
    /// directory tree.
    ///
    /// # Errors
    ///
    /// Returns an error if the partition key is invalid or the directories
    /// cannot be created.
    pub fn locate(&self, symbol: &str, interval: &str) -> Result<PathBuf> {
        self.locator.locate(&Partition::new(symbol, interval)?)
    }

    /// Returns true if `symbol`/`interval` has a storage unit.
    ///
    /// # Errors
    ///
    /// Returns an error if the partition cannot be located.
    pub fn exists(&self, symbol: &str, interval: &str) -> Result<bool> {
        self.locator.exists(&Partition::new(symbol, interval)?)
    }

    /// Upserts provider rows into `symbol`/`interval`.
    ///
    /// See [`CandleStore::upsert_partition`].
    ///
    /// # Errors
    ///
    /// Returns an error if the key is invalid, a row is malformed, or storage
    /// fails.
    pub fn upsert(
        &self,
        symbol: &str,
        interval: &str,
        rows: &[RawCandle],
        clear: bool,
    ) -> Result<usize> {
        self.upsert_partition(&Partition::new(symbol, interval)?, rows, clear)
    }

    /// Upserts provider rows into a partition.
    ///
    /// All rows are normalized before storage is touched, so a malformed row
    /// rejects the batch and leaves the partition as it was, even with
    /// `clear` set. With `clear`, the existing storage unit is then deleted.
    /// Rows are written in one transaction with `INSERT OR REPLACE` on the
    /// timestamp key; within a batch the last row for a timestamp wins.
    ///
    /// Keys left in another layout by older writers are rewritten to
    /// canonical text in the same transaction, so a re-upserted instant
    /// replaces its row instead of adding a second one.
    ///
    /// An empty batch still creates the storage unit and its table.
    /// Returns the number of rows written.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::Integrity`] for malformed rows,
    /// [`CacheError::RemoveFile`] if clearing fails and
    /// [`CacheError::Storage`] for SQLite failures.
    pub fn upsert_partition(
        &self,
        partition: &Partition,
        rows: &[RawCandle],
        clear: bool,
    ) -> Result<usize> {
        let candles = normalize_batch(rows)?;
        let path = self.locator.locate(partition)?;

        if clear && remove_unit(&path)? {
            info!(%partition, "cleared partition");
        }

        let mut conn = schema::open_write(&path, self.config.busy_timeout)?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let rewritten = canonicalize_keys(&tx, &path)?;
        if rewritten > 0 {
            info!(%partition, rewritten, "rewrote non-canonical keys");
        }
        {
            let mut stmt = tx.prepare_cached(UPSERT)?;
            for candle in &candles {
                stmt.execute(params![
                    to_canonical(candle.timestamp),
                    candle.open,
                    candle.high,
                    candle.low,
                    candle.close,
                    candle.adjusted_close,
                    candle.volume,
                ])?;
            }
        }
        tx.commit()?;

        info!(%partition, rows = candles.len(), clear, "upserted candles");
        Ok(candles.len())
    }

    /// Queries `symbol`/`interval` for rows between `start` and `end`.
    ///
    /// Bounds accept `YYYY-MM-DD`, `YYYY-MM-DD HH:MM:SS[.ffffff]` or
    /// RFC 3339; a date-only `end` covers its whole day. `start > end` is a
    /// usage error rather than an empty result.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::Range`] for bad bounds,
    /// [`CacheError::NotFound`] if nothing was ever cached, and
    /// [`CacheError::Storage`] if the storage unit cannot be read.
    pub fn query(
        &self,
        symbol: &str,
        interval: &str,
        start: &str,
        end: &str,
        strip_fractions: bool,
    ) -> Result<CandleTable> {
        let partition = Partition::new(symbol, interval)?;
        let range = TimeRange::parse(start, end)?;
        self.query_range(&partition, &range, strip_fractions)
    }

    /// Queries a partition for rows whose timestamp lies in `range`.
    ///
    /// Rows come back in ascending timestamp order. With `strip_fractions`,
    /// each timestamp is truncated to whole seconds before indexing.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::NotFound`] if the partition has no storage unit.
    pub fn query_range(
        &self,
        partition: &Partition,
        range: &TimeRange,
        strip_fractions: bool,
    ) -> Result<CandleTable> {
        let path = self.existing_unit(partition)?;
        let conn = schema::open_read(&path, self.config.busy_timeout)?;

        let mut stmt = conn.prepare(SELECT_RANGE)?;
        let rows = stmt.query_map(
            params![to_canonical(range.start), to_canonical(range.end)],
            StoredRow::from_row,
        )?;

        let mut candles = Vec::new();
        for row in rows {
            let mut candle = row?.into_candle(&path)?;
            // Non-canonical keys bypass the SQL filter
            if !range.contains(candle.timestamp) {
                continue;
            }
            if strip_fractions {
                candle.timestamp = strip_fraction(candle.timestamp);
            }
            candles.push(candle);
        }

        debug!(%partition, %range, rows = candles.len(), "queried candles");
        Ok(CandleTable::new(candles))
    }

    /// Returns the first and last cached timestamps of a partition.
    ///
    /// Returns `None` for a partition that exists but holds no rows.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::NotFound`] if the partition has no storage unit.
    pub fn bounds(&self, partition: &Partition) -> Result<Option<TimeRange>> {
        let path = self.existing_unit(partition)?;
        let conn = schema::open_read(&path, self.config.busy_timeout)?;

        let keys: Option<(String, String)> = conn
            .query_row(SELECT_BOUNDS, [], |row| {
                let min: Option<String> = row.get(0)?;
                let max: Option<String> = row.get(1)?;
                Ok(min.zip(max))
            })
            .optional()?
            .flatten();

        let mut instants = Vec::new();
        if let Some((min, max)) = keys {
            instants.push(stored_timestamp(&min, &path)?);
            instants.push(stored_timestamp(&max, &path)?);
        }
        for key in non_canonical_keys(&conn)? {
            instants.push(stored_timestamp(&key, &path)?);
        }

        let (Some(start), Some(end)) = (instants.iter().min(), instants.iter().max()) else {
            return Ok(None);
        };
        Ok(TimeRange::new(*start, *end).ok())
    }

    /// Returns the number of rows cached for a partition.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::NotFound`] if the partition has no storage unit.
    pub fn count(&self, partition: &Partition) -> Result<usize> {
        let path = self.existing_unit(partition)?;
        let conn = schema::open_read(&path, self.config.busy_timeout)?;
        let count: i64 = conn.query_row(SELECT_COUNT, [], |row| row.get(0))?;
        Ok(usize::try_from(count).unwrap_or_default())
    }

    /// Deletes a partition's storage unit.
    ///
    /// Returns true if there was one to delete.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be removed.
    pub fn clear(&self, partition: &Partition) -> Result<bool> {
        let path = self.locator.locate(partition)?;
        let removed = remove_unit(&path)?;
        if removed {
            info!(%partition, "cleared partition");
        }
        Ok(removed)
    }

    fn existing_unit(&self, partition: &Partition) -> Result<PathBuf> {
        let path = self.locator.locate(partition)?;
        if !path.exists() {
            return Err(CacheError::NotFound {
                partition: partition.clone(),
                path,
            });
        }
        Ok(path)
    }
}

/// One `ticker_data` row as stored.
struct StoredRow {
    date: String,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    adjusted_close: Option<f64>,
    volume: f64,
}

impl StoredRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            date: row.get("Date")?,
            open: row.get("Open")?,
            high: row.get("High")?,
            low: row.get("Low")?,
            close: row.get("Close")?,
            adjusted_close: row.get("Adj Close")?,
            volume: row.get("Volume")?,
        })
    }

    fn into_candle(self, path: &Path) -> Result<Candle> {
        let timestamp = stored_timestamp(&self.date, path)?;
        Ok(Candle::new(
            timestamp,
            self.open,
            self.high,
            self.low,
            self.close,
            self.adjusted_close.unwrap_or(self.close),
            self.volume,
        ))
    }
}

fn non_canonical_keys(conn: &Connection) -> Result<Vec<String>> {
    let mut stmt = conn.prepare(SELECT_NON_CANONICAL)?;
    let keys = stmt
        .query_map([], |row| row.get(0))?
        .collect::<rusqlite::Result<Vec<String>>>()?;
    Ok(keys)
}

/// Rewrites every non-canonical key to canonical text.
///
/// When both layouts exist for one instant the canonical row is kept.
/// Returns the number of keys touched.
fn canonicalize_keys(conn: &Connection, path: &Path) -> Result<usize> {
    let keys = non_canonical_keys(conn)?;
    for key in &keys {
        let canonical = to_canonical(stored_timestamp(key, path)?);
        conn.execute(RENAME_KEY, params![canonical, key])?;
        conn.execute(DELETE_KEY, params![key])?;
    }
    Ok(keys.len())
}

fn stored_timestamp(value: &str, path: &Path) -> Result<DateTime<Utc>> {
    parse_stored(value).map_err(|_| CacheError::CorruptTimestamp {
        value: value.to_string(),
        path: path.to_path_buf(),
    })
}

/// Removes a storage unit and its SQLite side files.
///
/// Returns true if the unit itself existed.
fn remove_unit(path: &Path) -> Result<bool> {
    let removed = remove_if_present(path)?;
    for suffix in SIDE_FILE_SUFFIXES {
        let mut side = path.as_os_str().to_owned();
        side.push(suffix);
        remove_if_present(Path::new(&side))?;
    }
    Ok(removed)
}

fn remove_if_present(path: &Path) -> Result<bool> {
    match fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
        Err(source) => Err(CacheError::RemoveFile {
            path: path.to_path_buf(),
            source,
        }),
    }
}
