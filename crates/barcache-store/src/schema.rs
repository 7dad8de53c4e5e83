//! Physical schema of a partition's storage unit.
//!
//! One SQLite file per partition holding a single table keyed by the
//! canonical timestamp text. Column names are part of the on-disk contract.

use rusqlite::{Connection, OpenFlags};
use std::path::Path;
use std::time::Duration;

pub(crate) const CREATE_TABLE: &str = r#"CREATE TABLE IF NOT EXISTS ticker_data (
    "Date" TEXT PRIMARY KEY,
    "Open" REAL, "High" REAL, "Low" REAL,
    "Close" REAL, "Adj Close" REAL, "Volume" REAL)"#;

pub(crate) const UPSERT: &str = r#"INSERT OR REPLACE INTO ticker_data
    ("Date", "Open", "High", "Low", "Close", "Adj Close", "Volume")
    VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)"#;

/// GLOB pattern matching canonical key text, `YYYY-MM-DD HH:MM:SS.ffffff`.
macro_rules! canonical_glob {
    () => {
        "'[0-9][0-9][0-9][0-9]-[0-9][0-9]-[0-9][0-9] [0-9][0-9]:[0-9][0-9]:[0-9][0-9].[0-9][0-9][0-9][0-9][0-9][0-9]'"
    };
}

/// Canonical keys are filtered by text; any other key is returned so the
/// caller can parse and filter it.
pub(crate) const SELECT_RANGE: &str = concat!(
    r#"SELECT "Date", "Open", "High", "Low", "Close", "Adj Close", "Volume"
    FROM ticker_data
    WHERE ("Date" GLOB "#,
    canonical_glob!(),
    r#" AND "Date" BETWEEN ?1 AND ?2) OR "Date" NOT GLOB "#,
    canonical_glob!(),
    r#"
    ORDER BY "Date" ASC"#
);

pub(crate) const SELECT_BOUNDS: &str = concat!(
    r#"SELECT MIN("Date"), MAX("Date") FROM ticker_data WHERE "Date" GLOB "#,
    canonical_glob!()
);

pub(crate) const SELECT_NON_CANONICAL: &str = concat!(
    r#"SELECT "Date" FROM ticker_data WHERE "Date" NOT GLOB "#,
    canonical_glob!()
);

/// Renames a key unless the target already exists.
pub(crate) const RENAME_KEY: &str = r#"UPDATE OR IGNORE ticker_data SET "Date" = ?1 WHERE "Date" = ?2"#;

pub(crate) const DELETE_KEY: &str = r#"DELETE FROM ticker_data WHERE "Date" = ?1"#;

pub(crate) const SELECT_COUNT: &str = "SELECT COUNT(*) FROM ticker_data";

/// SQLite side files that belong to a storage unit.
pub(crate) const SIDE_FILE_SUFFIXES: &[&str] = &["-journal", "-wal", "-shm"];

/// Opens (creating if needed) a storage unit for writing and ensures the table.
pub(crate) fn open_write(path: &Path, busy_timeout: Duration) -> rusqlite::Result<Connection> {
    let conn = Connection::open(path)?;
    conn.busy_timeout(busy_timeout)?;
    conn.execute_batch(CREATE_TABLE)?;
    Ok(conn)
}

/// Opens an existing storage unit read-only. Never creates the file.
pub(crate) fn open_read(path: &Path, busy_timeout: Duration) -> rusqlite::Result<Connection> {
    let conn = Connection::open_with_flags(
        path,
        OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
    )?;
    conn.busy_timeout(busy_timeout)?;
    Ok(conn)
}
