//! Symbol value object for trading pairs.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A trading pair symbol such as `BTC/DGD`.
///
/// The symbol is normalized to uppercase. The part after the `/` is the
/// quote currency in which prices and fees are denominated.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct Symbol(String);

impl Symbol {
    /// Create a new Symbol.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into().trim().to_uppercase())
    }

    /// Get the symbol string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Base asset (`BTC` for `BTC/DGD`).
    #[must_use]
    pub fn base_asset(&self) -> &str {
        self.0.split_once('/').map_or(self.0.as_str(), |(base, _)| base)
    }

    /// Quote currency (`DGD` for `BTC/DGD`), if the symbol is a pair.
    #[must_use]
    pub fn quote_currency(&self) -> Option<&str> {
        self.0
            .split_once('/')
            .map(|(_, quote)| quote)
            .filter(|quote| !quote.is_empty())
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Symbol {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for Symbol {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl From<Symbol> for String {
    fn from(value: Symbol) -> Self {
        value.0
    }
}
