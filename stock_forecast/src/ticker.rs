//! Ticker symbols

use crate::error::{ForecastError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Symbols offered by the dashboard when no other list is configured
pub const DEFAULT_TICKERS: [&str; 8] = [
    "AAPL", "GOOG", "MSFT", "GME", "AMZN", "TSLA", "BTC-USD", "ETH-USD",
];

/// A provider ticker symbol such as `AAPL` or `BTC-USD`
///
/// Symbols are stored upper-cased. Whether a symbol actually exists is up
/// to the provider; an unknown symbol surfaces as missing data at load time.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Ticker(String);

impl Ticker {
    /// Parse and normalize a ticker symbol
    pub fn new(symbol: &str) -> Result<Self> {
        let symbol = symbol.trim().to_uppercase();
        if symbol.is_empty() {
            return Err(ForecastError::InvalidParameter(
                "Ticker symbol cannot be empty".to_string(),
            ));
        }
        if !symbol
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '.' | '^' | '='))
        {
            return Err(ForecastError::InvalidParameter(format!(
                "Ticker symbol '{}' contains unsupported characters",
                symbol
            )));
        }

        Ok(Self(symbol))
    }

    /// The symbol as sent to providers
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Ticker list used when nothing else is configured
    pub fn defaults() -> Vec<Ticker> {
        DEFAULT_TICKERS
            .iter()
            .map(|s| Ticker(s.to_string()))
            .collect()
    }
}

impl fmt::Display for Ticker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Ticker {
    type Err = ForecastError;

    fn from_str(s: &str) -> Result<Self> {
        Ticker::new(s)
    }
}

impl TryFrom<String> for Ticker {
    type Error = ForecastError;

    fn try_from(value: String) -> Result<Self> {
        Ticker::new(&value)
    }
}

impl From<Ticker> for String {
    fn from(ticker: Ticker) -> Self {
        ticker.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ticker_is_normalized() {
        let ticker = Ticker::new(" btc-usd ").unwrap();
        assert_eq!(ticker.as_str(), "BTC-USD");
        assert_eq!(ticker.to_string(), "BTC-USD");
    }

    #[test]
    fn test_invalid_tickers() {
        assert!(Ticker::new("").is_err());
        assert!(Ticker::new("   ").is_err());
        assert!(Ticker::new("AA PL").is_err());
        assert!(Ticker::new("AAPL;DROP").is_err());
    }

    #[test]
    fn test_defaults_cover_equities_and_crypto() {
        let defaults = Ticker::defaults();
        assert_eq!(defaults.len(), 8);
        assert!(defaults.contains(&Ticker::new("AAPL").unwrap()));
        assert!(defaults.contains(&Ticker::new("ETH-USD").unwrap()));
    }
}
