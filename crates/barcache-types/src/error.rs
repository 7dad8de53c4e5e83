//! Error types shared across barcache crates.

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::CandleField;

/// A provider row that cannot be stored.
///
/// Raised while normalizing a batch; the whole batch is rejected when any
/// row fails.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum IntegrityError {
    /// A required field was absent.
    #[error("Row {index}: missing required field '{field}'")]
    MissingField {
        /// Position of the offending row in the batch.
        index: usize,
        /// The missing field.
        field: CandleField,
    },

    /// A numeric field was NaN or infinite.
    #[error("Row {index}: field '{field}' is not a finite number")]
    NonFinite {
        /// Position of the offending row in the batch.
        index: usize,
        /// The offending field.
        field: CandleField,
    },

    /// Volume was below zero.
    #[error("Row {index}: negative volume {volume}")]
    NegativeVolume {
        /// Position of the offending row in the batch.
        index: usize,
        /// The rejected volume.
        volume: f64,
    },
}

/// Invalid symbol or interval for a cache partition.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PartitionError {
    /// A partition component was empty.
    #[error("Partition {component} must not be empty")]
    Empty {
        /// Which component ("symbol" or "interval").
        component: &'static str,
    },

    /// A partition component cannot be used as a single path segment.
    #[error("Invalid partition {component} '{value}'")]
    InvalidComponent {
        /// Which component ("symbol" or "interval").
        component: &'static str,
        /// The rejected value.
        value: String,
    },
}

/// A timestamp string that could not be parsed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid timestamp '{0}', expected YYYY-MM-DD, YYYY-MM-DD HH:MM:SS[.ffffff] or RFC 3339")]
pub struct TimestampError(pub String);

/// Error for invalid time ranges.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RangeError {
    /// Start is after end.
    #[error("Invalid range: {start} > {end}")]
    Inverted {
        /// The start bound.
        start: DateTime<Utc>,
        /// The end bound.
        end: DateTime<Utc>,
    },

    /// A bound could not be parsed.
    #[error(transparent)]
    Bound(#[from] TimestampError),
}
