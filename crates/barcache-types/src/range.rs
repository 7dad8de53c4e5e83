//! Closed time ranges and window iteration.

use chrono::{DateTime, NaiveDate, NaiveTime, TimeDelta, TimeZone, Utc};

use crate::timestamp::{BoundKind, parse_bound};
use crate::RangeError;

/// A closed interval `[start, end]` of instants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeRange {
    /// Start (inclusive).
    pub start: DateTime<Utc>,
    /// End (inclusive).
    pub end: DateTime<Utc>,
}

impl TimeRange {
    /// Creates a new range, validating that start <= end.
    ///
    /// # Errors
    ///
    /// Returns an error if start > end.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self, RangeError> {
        if start > end {
            return Err(RangeError::Inverted { start, end });
        }
        Ok(Self { start, end })
    }

    /// Parses a range from caller-supplied bound strings.
    ///
    /// Accepts `YYYY-MM-DD`, `YYYY-MM-DD HH:MM:SS[.ffffff]` or RFC 3339.
    /// A date-only end covers its whole day.
    ///
    /// # Errors
    ///
    /// Returns an error if a bound cannot be parsed or start > end.
    pub fn parse(start: &str, end: &str) -> Result<Self, RangeError> {
        let start = parse_bound(start, BoundKind::Start)?;
        let end = parse_bound(end, BoundKind::End)?;
        Self::new(start, end)
    }

    /// Creates a range covering whole days from `start` through `end`.
    ///
    /// # Errors
    ///
    /// Returns an error if start > end.
    pub fn from_dates(start: NaiveDate, end: NaiveDate) -> Result<Self, RangeError> {
        let start = Utc.from_utc_datetime(&start.and_time(NaiveTime::MIN));
        let end = Utc.from_utc_datetime(&end.and_time(NaiveTime::MIN))
            + TimeDelta::days(1)
            - TimeDelta::microseconds(1);
        Self::new(start, end)
    }

    /// Returns the span between start and end.
    #[must_use]
    pub fn duration(&self) -> TimeDelta {
        self.end - self.start
    }

    /// Returns true if the range contains the given instant.
    #[must_use]
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        instant >= self.start && instant <= self.end
    }

    /// Splits the range into consecutive windows of at most `step`.
    ///
    /// Windows are half-open except the last one, which ends at `end`.
    /// A non-positive step yields the whole range as one window.
    pub fn windows(&self, step: TimeDelta) -> WindowIterator {
        WindowIterator::new(*self, step)
    }
}

impl std::fmt::Display for TimeRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} to {}", self.start, self.end)
    }
}

/// Iterator over consecutive sub-ranges of a [`TimeRange`].
#[derive(Debug, Clone)]
pub struct WindowIterator {
    current: Option<DateTime<Utc>>,
    end: DateTime<Utc>,
    step: TimeDelta,
}

impl WindowIterator {
    fn new(range: TimeRange, step: TimeDelta) -> Self {
        let step = if step <= TimeDelta::zero() {
            range.duration() + TimeDelta::microseconds(1)
        } else {
            step
        };
        Self {
            current: Some(range.start),
            end: range.end,
            step,
        }
    }
}

impl Iterator for WindowIterator {
    type Item = TimeRange;

    fn next(&mut self) -> Option<Self::Item> {
        let start = self.current?;

        match start.checked_add_signed(self.step) {
            Some(next) if next < self.end => {
                self.current = Some(next);
                Some(TimeRange { start, end: next })
            }
            _ => {
                self.current = None;
                Some(TimeRange {
                    start,
                    end: self.end,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    #[test]
    fn test_range_new() {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2024, 1, 31, 0, 0, 0).unwrap();
        let range = TimeRange::new(start, end).unwrap();

        assert_eq!(range.start, start);
        assert_eq!(range.end, end);
        assert!(TimeRange::new(start, start).is_ok());
    }

    #[test]
    fn test_range_inverted() {
        let start = Utc.with_ymd_and_hms(2024, 1, 31, 0, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        assert!(matches!(
            TimeRange::new(start, end),
            Err(RangeError::Inverted { .. })
        ));
        assert!(matches!(
            TimeRange::parse("2024-01-31", "2024-01-01"),
            Err(RangeError::Inverted { .. })
        ));
    }

    #[test]
    fn test_parse_same_day_covers_whole_day() {
        let range = TimeRange::parse("2024-01-05", "2024-01-05").unwrap();
        let noon = Utc.with_ymd_and_hms(2024, 1, 5, 12, 0, 0).unwrap();
        assert!(range.contains(noon));
        assert_eq!(range.end.hour(), 23);
    }

    #[test]
    fn test_parse_bad_bound() {
        assert!(matches!(
            TimeRange::parse("yesterday", "2024-01-05"),
            Err(RangeError::Bound(_))
        ));
    }

    #[test]
    fn test_from_dates() {
        let range = TimeRange::from_dates(day(1), day(2)).unwrap();
        assert!(range.contains(Utc.with_ymd_and_hms(2024, 1, 2, 23, 59, 59).unwrap()));
        assert!(!range.contains(Utc.with_ymd_and_hms(2024, 1, 3, 0, 0, 0).unwrap()));
    }

    #[test]
    fn test_windows_cover_range() {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap();
        let range = TimeRange::new(start, end).unwrap();
        let windows: Vec<_> = range.windows(TimeDelta::hours(4)).collect();

        assert_eq!(windows.len(), 3);
        assert_eq!(windows[0].start, start);
        assert_eq!(windows[1].start, windows[0].end);
        assert_eq!(windows[2].end, end);
    }

    #[test]
    fn test_windows_non_positive_step() {
        let range = TimeRange::from_dates(day(1), day(3)).unwrap();
        let windows: Vec<_> = range.windows(TimeDelta::zero()).collect();
        assert_eq!(windows, vec![range]);
    }
}
