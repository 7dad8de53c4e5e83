//! Candle (OHLCV bar) representation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::IntegrityError;

/// A single cached OHLCV bar.
///
/// Volume is stored as `f64` everywhere: crypto venues report fractional
/// base-asset volume, and share counts are exact in `f64` up to 2^53.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    /// Bar open time (UTC). Unique within a partition.
    pub timestamp: DateTime<Utc>,
    /// Opening price.
    pub open: f64,
    /// Highest price during the period.
    pub high: f64,
    /// Lowest price during the period.
    pub low: f64,
    /// Closing price.
    pub close: f64,
    /// Split/dividend adjusted close. Equals `close` when the provider has
    /// no distinct adjusted value.
    pub adjusted_close: f64,
    /// Traded volume.
    pub volume: f64,
}

impl Candle {
    /// Creates a new candle.
    #[must_use]
    pub const fn new(
        timestamp: DateTime<Utc>,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        adjusted_close: f64,
        volume: f64,
    ) -> Self {
        Self {
            timestamp,
            open,
            high,
            low,
            close,
            adjusted_close,
            volume,
        }
    }

    /// Creates a candle whose adjusted close equals its close.
    #[must_use]
    pub const fn unadjusted(
        timestamp: DateTime<Utc>,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: f64,
    ) -> Self {
        Self::new(timestamp, open, high, low, close, close, volume)
    }
}

/// Names of candle fields, used in integrity errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CandleField {
    /// Bar open time.
    Timestamp,
    /// Opening price.
    Open,
    /// High price.
    High,
    /// Low price.
    Low,
    /// Closing price.
    Close,
    /// Adjusted closing price.
    AdjustedClose,
    /// Volume.
    Volume,
}

impl CandleField {
    /// Returns the field name as a string slice.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Timestamp => "timestamp",
            Self::Open => "open",
            Self::High => "high",
            Self::Low => "low",
            Self::Close => "close",
            Self::AdjustedClose => "adjusted_close",
            Self::Volume => "volume",
        }
    }
}

impl std::fmt::Display for CandleField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A candle as delivered by a provider, before normalization.
///
/// Every field is optional so a provider can say "absent" without a
/// sentinel. Only `adjusted_close` may legitimately be `None`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RawCandle {
    /// Bar open time.
    pub timestamp: Option<DateTime<Utc>>,
    /// Opening price.
    pub open: Option<f64>,
    /// High price.
    pub high: Option<f64>,
    /// Low price.
    pub low: Option<f64>,
    /// Closing price.
    pub close: Option<f64>,
    /// Adjusted closing price, if the provider has a distinct one.
    pub adjusted_close: Option<f64>,
    /// Volume.
    pub volume: Option<f64>,
}

impl RawCandle {
    /// Creates a complete raw candle without an adjusted close.
    #[must_use]
    pub const fn new(
        timestamp: DateTime<Utc>,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: f64,
    ) -> Self {
        Self {
            timestamp: Some(timestamp),
            open: Some(open),
            high: Some(high),
            low: Some(low),
            close: Some(close),
            adjusted_close: None,
            volume: Some(volume),
        }
    }

    /// Sets the adjusted close.
    #[must_use]
    pub const fn with_adjusted_close(mut self, adjusted_close: f64) -> Self {
        self.adjusted_close = Some(adjusted_close);
        self
    }

    /// Normalizes this row into a [`Candle`].
    ///
    /// `index` is the row's position in its batch and only feeds error
    /// reporting. A missing adjusted close falls back to the close.
    ///
    /// # Errors
    ///
    /// Returns an error if a required field is missing, a number is not
    /// finite, or the volume is negative.
    pub fn normalize(&self, index: usize) -> Result<Candle, IntegrityError> {
        let timestamp = self.timestamp.ok_or(IntegrityError::MissingField {
            index,
            field: CandleField::Timestamp,
        })?;
        let open = required(self.open, index, CandleField::Open)?;
        let high = required(self.high, index, CandleField::High)?;
        let low = required(self.low, index, CandleField::Low)?;
        let close = required(self.close, index, CandleField::Close)?;
        let volume = required(self.volume, index, CandleField::Volume)?;
        let adjusted_close = match self.adjusted_close {
            Some(value) => finite(value, index, CandleField::AdjustedClose)?,
            None => close,
        };

        if volume < 0.0 {
            return Err(IntegrityError::NegativeVolume { index, volume });
        }

        Ok(Candle::new(
            timestamp,
            open,
            high,
            low,
            close,
            adjusted_close,
            volume,
        ))
    }
}

impl From<Candle> for RawCandle {
    fn from(candle: Candle) -> Self {
        Self::new(
            candle.timestamp,
            candle.open,
            candle.high,
            candle.low,
            candle.close,
            candle.volume,
        )
        .with_adjusted_close(candle.adjusted_close)
    }
}

/// Normalizes a whole provider batch, failing on the first bad row.
///
/// # Errors
///
/// Returns the first row's [`IntegrityError`]; no partial result is produced.
pub fn normalize_batch(rows: &[RawCandle]) -> Result<Vec<Candle>, IntegrityError> {
    rows.iter()
        .enumerate()
        .map(|(index, row)| row.normalize(index))
        .collect()
}

fn required(value: Option<f64>, index: usize, field: CandleField) -> Result<f64, IntegrityError> {
    let value = value.ok_or(IntegrityError::MissingField { index, field })?;
    finite(value, index, field)
}

fn finite(value: f64, index: usize, field: CandleField) -> Result<f64, IntegrityError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(IntegrityError::NonFinite { index, field })
    }
}
