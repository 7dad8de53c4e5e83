//! Error types for cache operations.

use barcache_types::{IntegrityError, Partition, PartitionError, RangeError};
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while locating, writing or reading a partition.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Failed to create the partition's directory tree.
    #[error("Failed to create cache directory '{path}': {source}")]
    CreateDir {
        /// The path that could not be created.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The `${CACHE}` token could not be resolved on this platform.
    #[error("Failed to determine user cache directory")]
    NoCacheDir,

    /// Symbol or interval is not usable as a partition key.
    #[error(transparent)]
    InvalidPartition(#[from] PartitionError),

    /// The partition has never been written.
    #[error("No cached data for {partition} (expected '{path}')")]
    NotFound {
        /// The partition that was queried.
        partition: Partition,
        /// Where its storage unit would live.
        path: PathBuf,
    },

    /// A row in an upsert batch was malformed; nothing was written.
    #[error("Rejected batch: {0}")]
    Integrity(#[from] IntegrityError),

    /// Query bounds were unparseable or inverted.
    #[error(transparent)]
    Range(#[from] RangeError),

    /// A stored key could not be read back as a timestamp.
    #[error("Corrupt timestamp '{value}' in '{path}'")]
    CorruptTimestamp {
        /// The stored key text.
        value: String,
        /// The storage unit it was read from.
        path: PathBuf,
    },

    /// Failed to delete a storage unit while clearing.
    #[error("Failed to delete file '{path}': {source}")]
    RemoveFile {
        /// The path that could not be deleted.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// SQLite failed to open, read or write the storage unit.
    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),
}

impl CacheError {
    /// Returns true for the recoverable "nothing cached yet" condition.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Returns true if the error came from a rejected input batch.
    #[must_use]
    pub const fn is_integrity(&self) -> bool {
        matches!(self, Self::Integrity(_))
    }
}

/// Result type for cache operations.
pub type Result<T> = std::result::Result<T, CacheError>;
