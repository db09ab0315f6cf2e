//! Market data configuration.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::domain::shared::Symbol;

/// A listed instrument and its seed price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstrumentConfig {
    /// Trading pair, e.g. `BTC/DGD`.
    pub symbol: Symbol,
    /// Initial last price.
    pub price: Decimal,
}

impl InstrumentConfig {
    fn new(symbol: &str, price: Decimal) -> Self {
        Self {
            symbol: Symbol::new(symbol),
            price,
        }
    }
}

/// Market data settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketConfig {
    /// Default order book depth.
    #[serde(default = "default_book_depth")]
    pub book_depth: usize,
    /// Instruments listed at startup.
    #[serde(default = "default_instruments")]
    pub instruments: Vec<InstrumentConfig>,
}

impl Default for MarketConfig {
    fn default() -> Self {
        Self {
            book_depth: default_book_depth(),
            instruments: default_instruments(),
        }
    }
}

const fn default_book_depth() -> usize {
    10
}

fn default_instruments() -> Vec<InstrumentConfig> {
    vec![
        InstrumentConfig::new("BTC/DGD", dec!(358.4)),
        InstrumentConfig::new("ETH/DGD", dec!(22.3)),
        InstrumentConfig::new("ADA/DGD", dec!(0.0036)),
        InstrumentConfig::new("DOT/DGD", dec!(0.052)),
        InstrumentConfig::new("LINK/DGD", dec!(0.113)),
    ]
}
