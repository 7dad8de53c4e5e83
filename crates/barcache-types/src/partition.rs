//! Cache partition key.

use serde::{Deserialize, Serialize};

use crate::PartitionError;

/// Identifies one storage unit: a symbol at one interval.
///
/// The interval (e.g. "15m", "1d", "1wk") is opaque here; only the provider
/// gives it meaning. Both parts become single path segments, so separators
/// and relative components are rejected.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Partition {
    symbol: String,
    interval: String,
}

impl Partition {
    /// Creates a partition key.
    ///
    /// # Errors
    ///
    /// Returns an error if either part is empty or not a valid path segment.
    pub fn new(
        symbol: impl Into<String>,
        interval: impl Into<String>,
    ) -> Result<Self, PartitionError> {
        let symbol = symbol.into();
        let interval = interval.into();
        validate_component("symbol", &symbol)?;
        validate_component("interval", &interval)?;
        Ok(Self { symbol, interval })
    }

    /// Returns the symbol.
    #[must_use]
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Returns the interval tag.
    #[must_use]
    pub fn interval(&self) -> &str {
        &self.interval
    }
}

impl std::fmt::Display for Partition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.symbol, self.interval)
    }
}

fn validate_component(component: &'static str, value: &str) -> Result<(), PartitionError> {
    if value.is_empty() {
        return Err(PartitionError::Empty { component });
    }
    let bad = value == "."
        || value == ".."
        || value.chars().any(|c| c == '/' || c == '\\' || c == '\0');
    if bad {
        return Err(PartitionError::InvalidComponent {
            component,
            value: value.to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partition_creation() {
        let partition = Partition::new("AAPL", "1d").unwrap();
        assert_eq!(partition.symbol(), "AAPL");
        assert_eq!(partition.interval(), "1d");
        assert_eq!(partition.to_string(), "AAPL/1d");
    }

    #[test]
    fn test_crypto_symbols_allowed() {
        assert!(Partition::new("BTC-USD", "15m").is_ok());
        assert!(Partition::new("^GSPC", "1wk").is_ok());
    }

    #[test]
    fn test_partition_rejects_path_tricks() {
        assert_eq!(
            Partition::new("", "1d"),
            Err(PartitionError::Empty { component: "symbol" })
        );
        assert!(Partition::new("..", "1d").is_err());
        assert!(Partition::new("AAPL", "1d/../x").is_err());
        assert!(Partition::new("AA\\PL", "1d").is_err());
    }
}
