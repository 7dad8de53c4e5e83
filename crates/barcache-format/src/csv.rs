//! CSV output format.

use barcache_types::Candle;
use std::io::Write;

use crate::{FormatError, Formatter};

/// CSV formatter.
#[derive(Debug, Clone)]
pub struct CsvFormatter {
    delimiter: char,
    include_header: bool,
}

impl Default for CsvFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl CsvFormatter {
    /// Creates a new CSV formatter with a comma delimiter and a header row.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            delimiter: ',',
            include_header: true,
        }
    }

    /// Sets the field delimiter.
    #[must_use]
    pub const fn with_delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Sets whether to include a header row.
    #[must_use]
    pub const fn with_header(mut self, include: bool) -> Self {
        self.include_header = include;
        self
    }

    /// Creates a tab-separated values (TSV) formatter.
    #[must_use]
    pub const fn tsv() -> Self {
        Self::new().with_delimiter('\t')
    }
}

impl Formatter for CsvFormatter {
    fn write_candles<W: Write + Send>(
        &self,
        candles: &[Candle],
        mut writer: W,
    ) -> Result<(), FormatError> {
        let d = self.delimiter;

        if self.include_header {
            writeln!(
                writer,
                "timestamp{d}open{d}high{d}low{d}close{d}adj_close{d}volume"
            )?;
        }

        for candle in candles {
            writeln!(
                writer,
                "{}{d}{}{d}{}{d}{}{d}{}{d}{}{d}{}",
                candle.timestamp.format("%Y-%m-%dT%H:%M:%S%.fZ"),
                candle.open,
                candle.high,
                candle.low,
                candle.close,
                candle.adjusted_close,
                candle.volume
            )?;
        }

        writer.flush()?;
        Ok(())
    }

    fn extension(&self) -> &str {
        if self.delimiter == '\t' { "tsv" } else { "csv" }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeDelta, TimeZone, Utc};
    use std::io::Cursor;

    fn create_test_candle() -> Candle {
        let timestamp = Utc.with_ymd_and_hms(2024, 1, 15, 0, 0, 0).unwrap();
        Candle::new(timestamp, 185.5, 187.25, 184.0, 186.75, 186.1, 52_000_000.0)
    }

    #[test]
    fn test_csv_candles() {
        let formatter = CsvFormatter::new();
        let mut output = Cursor::new(Vec::new());

        formatter
            .write_candles(&[create_test_candle()], &mut output)
            .unwrap();

        let result = String::from_utf8(output.into_inner()).unwrap();
        let lines: Vec<_> = result.lines().collect();
        assert_eq!(lines[0], "timestamp,open,high,low,close,adj_close,volume");
        assert_eq!(lines[1], "2024-01-15T00:00:00Z,185.5,187.25,184,186.75,186.1,52000000");
    }

    #[test]
    fn test_csv_keeps_fraction() {
        let mut candle = create_test_candle();
        candle.timestamp += TimeDelta::microseconds(250_000);
        let mut output = Cursor::new(Vec::new());

        CsvFormatter::new()
            .with_header(false)
            .write_candles(&[candle], &mut output)
            .unwrap();

        let result = String::from_utf8(output.into_inner()).unwrap();
        assert!(result.starts_with("2024-01-15T00:00:00.250Z"));
    }

    #[test]
    fn test_tsv() {
        let formatter = CsvFormatter::tsv();
        let mut output = Cursor::new(Vec::new());

        formatter
            .write_candles(&[create_test_candle()], &mut output)
            .unwrap();

        let result = String::from_utf8(output.into_inner()).unwrap();
        assert!(result.contains("timestamp\topen\thigh"));
        assert_eq!(formatter.extension(), "tsv");
    }
}
