//! Canonical timestamp text and bound parsing.
//!
//! Cached rows are keyed by a fixed-width UTC string,
//! `YYYY-MM-DD HH:MM:SS.ffffff`. Because every key has the same width,
//! plain text ordering is chronological ordering.

use chrono::{
    DateTime, NaiveDate, NaiveDateTime, NaiveTime, SubsecRound, TimeZone, Utc,
};

use crate::TimestampError;

/// Format of the canonical key text.
pub const CANONICAL_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";

/// Naive date-time layouts accepted when parsing, tried in order.
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
];

/// Which end of a closed range a bound belongs to.
///
/// A date-only start means midnight; a date-only end covers the whole day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundKind {
    /// Inclusive lower bound.
    Start,
    /// Inclusive upper bound.
    End,
}

/// Renders a timestamp as canonical key text (microsecond precision).
#[must_use]
pub fn to_canonical(timestamp: DateTime<Utc>) -> String {
    timestamp.format(CANONICAL_FORMAT).to_string()
}

/// Parses key text read back from a storage unit.
///
/// Accepts the canonical form plus the looser layouts other writers may have
/// used: date-only, no fraction, or an explicit UTC offset.
///
/// # Errors
///
/// Returns an error if the text matches none of the accepted layouts.
pub fn parse_stored(text: &str) -> Result<DateTime<Utc>, TimestampError> {
    parse_bound(text, BoundKind::Start)
}

/// Parses a caller-supplied range bound.
///
/// # Errors
///
/// Returns an error if the text matches none of the accepted layouts.
pub fn parse_bound(text: &str, kind: BoundKind) -> Result<DateTime<Utc>, TimestampError> {
    let trimmed = text.trim();

    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        let time = match kind {
            BoundKind::Start => NaiveTime::MIN,
            BoundKind::End => END_OF_DAY,
        };
        return Ok(Utc.from_utc_datetime(&date.and_time(time)));
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(dt.with_timezone(&Utc));
    }

    // Offset-suffixed text as written by dataframe libraries, e.g. "2024-01-02 09:30:00-05:00".
    for format in ["%Y-%m-%d %H:%M:%S%.f%:z", "%Y-%m-%d %H:%M:%S%:z"] {
        if let Ok(dt) = DateTime::parse_from_str(trimmed, format) {
            return Ok(dt.with_timezone(&Utc));
        }
    }

    NAIVE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(trimmed, format).ok())
        .map(|naive| Utc.from_utc_datetime(&naive))
        .ok_or_else(|| TimestampError(text.to_string()))
}

/// Truncates a timestamp to whole seconds.
#[must_use]
pub fn strip_fraction(timestamp: DateTime<Utc>) -> DateTime<Utc> {
    timestamp.trunc_subsecs(0)
}

/// Last representable instant of a day at key precision.
const END_OF_DAY: NaiveTime = match NaiveTime::from_hms_micro_opt(23, 59, 59, 999_999) {
    Some(time) => time,
    None => panic!("23:59:59.999999 is a valid time"),
};

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeDelta, Timelike};

    #[test]
    fn test_canonical_is_fixed_width() {
        let whole = Utc.with_ymd_and_hms(2020, 1, 2, 0, 0, 0).unwrap();
        let frac = whole + TimeDelta::microseconds(123_456);

        assert_eq!(to_canonical(whole), "2020-01-02 00:00:00.000000");
        assert_eq!(to_canonical(frac), "2020-01-02 00:00:00.123456");
        assert_eq!(to_canonical(whole).len(), to_canonical(frac).len());
    }

    #[test]
    fn test_canonical_sorts_chronologically() {
        let base = Utc.with_ymd_and_hms(2020, 1, 2, 9, 30, 0).unwrap();
        let times = [
            base,
            base + TimeDelta::microseconds(1),
            base + TimeDelta::milliseconds(500),
            base + TimeDelta::seconds(1),
            base + TimeDelta::days(40),
        ];
        let keys: Vec<_> = times.iter().map(|t| to_canonical(*t)).collect();
        let mut sorted = keys.clone();
        sorted.sort();
        assert_eq!(keys, sorted);
    }

    #[test]
    fn test_parse_stored_round_trips_canonical() {
        let ts = Utc.with_ymd_and_hms(2023, 7, 14, 15, 45, 12).unwrap()
            + TimeDelta::microseconds(250_000);
        assert_eq!(parse_stored(&to_canonical(ts)).unwrap(), ts);
    }

    #[test]
    fn test_parse_stored_legacy_layouts() {
        let midnight = Utc.with_ymd_and_hms(2020, 1, 2, 0, 0, 0).unwrap();
        assert_eq!(parse_stored("2020-01-02").unwrap(), midnight);
        assert_eq!(parse_stored("2020-01-02 00:00:00").unwrap(), midnight);

        let offset = parse_stored("2024-01-02 09:30:00-05:00").unwrap();
        assert_eq!(offset, Utc.with_ymd_and_hms(2024, 1, 2, 14, 30, 0).unwrap());
    }

    #[test]
    fn test_parse_bound_date_only() {
        let start = parse_bound("2020-01-15", BoundKind::Start).unwrap();
        let end = parse_bound("2020-01-15", BoundKind::End).unwrap();

        assert_eq!(start, Utc.with_ymd_and_hms(2020, 1, 15, 0, 0, 0).unwrap());
        assert_eq!(end.hour(), 23);
        assert_eq!(end.second(), 59);
        assert_eq!(end.nanosecond(), 999_999_000);
    }

    #[test]
    fn test_parse_bound_datetime_and_rfc3339() {
        let expected = Utc.with_ymd_and_hms(2020, 1, 15, 10, 30, 0).unwrap();
        assert_eq!(parse_bound("2020-01-15 10:30:00", BoundKind::End).unwrap(), expected);
        assert_eq!(parse_bound("2020-01-15T10:30:00Z", BoundKind::End).unwrap(), expected);
        assert_eq!(parse_bound("2020-01-15 10:30", BoundKind::Start).unwrap(), expected);
    }

    #[test]
    fn test_parse_bound_invalid() {
        assert!(parse_bound("15/01/2020", BoundKind::Start).is_err());
        assert!(parse_bound("", BoundKind::End).is_err());
    }

    #[test]
    fn test_strip_fraction() {
        let ts = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 5).unwrap()
            + TimeDelta::microseconds(987_654);
        let stripped = strip_fraction(ts);

        assert_eq!(stripped, Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 5).unwrap());
    }
}
