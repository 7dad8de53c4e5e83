//! Time-indexed candle table returned by range queries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Candle, TimeRange};

/// Candles ordered by timestamp, indexed by timestamp.
///
/// Ordering is non-decreasing rather than strictly increasing: stripping
/// sub-second fractions can map two stored rows onto the same second, and
/// both are kept.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CandleTable {
    candles: Vec<Candle>,
}

impl CandleTable {
    /// Creates a table, sorting the candles by timestamp.
    ///
    /// The sort is stable, so rows with equal timestamps keep their order.
    #[must_use]
    pub fn new(mut candles: Vec<Candle>) -> Self {
        if !candles.is_sorted_by_key(|c| c.timestamp) {
            candles.sort_by_key(|c| c.timestamp);
        }
        Self { candles }
    }

    /// Returns true if the table has no rows.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.candles.is_empty()
    }

    /// Returns the number of rows.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.candles.len()
    }

    /// Returns the rows as a slice.
    #[must_use]
    pub fn as_slice(&self) -> &[Candle] {
        &self.candles
    }

    /// Consumes the table, returning its rows.
    #[must_use]
    pub fn into_vec(self) -> Vec<Candle> {
        self.candles
    }

    /// Returns an iterator over the rows in timestamp order.
    pub fn iter(&self) -> std::slice::Iter<'_, Candle> {
        self.candles.iter()
    }

    /// Returns the earliest row.
    #[must_use]
    pub fn first(&self) -> Option<&Candle> {
        self.candles.first()
    }

    /// Returns the latest row.
    #[must_use]
    pub fn last(&self) -> Option<&Candle> {
        self.candles.last()
    }

    /// Returns the position of the first row at `timestamp`.
    #[must_use]
    pub fn position(&self, timestamp: DateTime<Utc>) -> Option<usize> {
        let idx = self.candles.partition_point(|c| c.timestamp < timestamp);
        (self.candles.get(idx)?.timestamp == timestamp).then_some(idx)
    }

    /// Looks up the row at `timestamp`.
    #[must_use]
    pub fn get(&self, timestamp: DateTime<Utc>) -> Option<&Candle> {
        self.position(timestamp).map(|idx| &self.candles[idx])
    }

    /// Returns the rows falling inside `range`.
    #[must_use]
    pub fn slice(&self, range: &TimeRange) -> &[Candle] {
        let lo = self.candles.partition_point(|c| c.timestamp < range.start);
        let hi = self.candles.partition_point(|c| c.timestamp <= range.end);
        &self.candles[lo..hi]
    }

    /// Returns the index column.
    #[must_use]
    pub fn timestamps(&self) -> Vec<DateTime<Utc>> {
        self.candles.iter().map(|c| c.timestamp).collect()
    }
}

impl From<Vec<Candle>> for CandleTable {
    fn from(candles: Vec<Candle>) -> Self {
        Self::new(candles)
    }
}

impl IntoIterator for CandleTable {
    type Item = Candle;
    type IntoIter = std::vec::IntoIter<Candle>;

    fn into_iter(self) -> Self::IntoIter {
        self.candles.into_iter()
    }
}

impl<'a> IntoIterator for &'a CandleTable {
    type Item = &'a Candle;
    type IntoIter = std::slice::Iter<'a, Candle>;

    fn into_iter(self) -> Self::IntoIter {
        self.candles.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn candle(day: u32, close: f64) -> Candle {
        let ts = Utc.with_ymd_and_hms(2020, 1, day, 0, 0, 0).unwrap();
        Candle::unadjusted(ts, close, close, close, close, 100.0)
    }

    #[test]
    fn test_new_sorts_rows() {
        let table = CandleTable::new(vec![candle(3, 3.0), candle(1, 1.0), candle(2, 2.0)]);
        let closes: Vec<_> = table.iter().map(|c| c.close).collect();
        assert_eq!(closes, vec![1.0, 2.0, 3.0]);
        assert!(table.timestamps().is_sorted());
    }

    #[test]
    fn test_lookup_by_timestamp() {
        let table = CandleTable::new(vec![candle(1, 1.0), candle(2, 2.0), candle(5, 5.0)]);
        let day2 = Utc.with_ymd_and_hms(2020, 1, 2, 0, 0, 0).unwrap();
        let day3 = Utc.with_ymd_and_hms(2020, 1, 3, 0, 0, 0).unwrap();

        assert_eq!(table.position(day2), Some(1));
        assert!((table.get(day2).unwrap().close - 2.0).abs() < 1e-10);
        assert!(table.get(day3).is_none());
    }

    #[test]
    fn test_slice() {
        let table: CandleTable = (1..=10).map(|d| candle(d, f64::from(d))).collect::<Vec<_>>().into();
        let range = TimeRange::parse("2020-01-03", "2020-01-05").unwrap();
        let closes: Vec<_> = table.slice(&range).iter().map(|c| c.close).collect();

        assert_eq!(closes, vec![3.0, 4.0, 5.0]);
    }

    #[test]
    fn test_empty_table() {
        let table = CandleTable::default();
        assert!(table.is_empty());
        assert_eq!(table.len(), 0);
        assert!(table.first().is_none());
    }
}
