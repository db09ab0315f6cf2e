//! Market Data Port (Driven Port)
//!
//! Interface for pulling market snapshots. Matching pulls a fresh snapshot
//! on every evaluation.

use thiserror::Error;

use crate::domain::market_data::{MarketSnapshot, OrderBook};
use crate::domain::shared::Symbol;

/// Market data errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MarketDataError {
    /// Symbol is not listed.
    #[error("Unknown symbol: {symbol}")]
    UnknownSymbol {
        /// Requested symbol.
        symbol: String,
    },

    /// Symbol is listed but no usable snapshot is available right now.
    #[error("Market data unavailable for {symbol}: {reason}")]
    Unavailable {
        /// Requested symbol.
        symbol: String,
        /// Why.
        reason: String,
    },
}

impl MarketDataError {
    /// Returns true if retrying later may succeed.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::Unavailable { .. })
    }
}

/// Port for market data.
pub trait MarketDataPort: Send + Sync {
    /// Returns true if the symbol is tradable.
    fn is_listed(&self, symbol: &Symbol) -> bool;

    /// Current snapshot for a symbol.
    ///
    /// # Errors
    ///
    /// Returns `UnknownSymbol` for unlisted symbols and `Unavailable` when
    /// the symbol has no usable quote.
    fn snapshot(&self, symbol: &Symbol) -> Result<MarketSnapshot, MarketDataError>;

    /// All listed symbols.
    fn symbols(&self) -> Vec<Symbol>;

    /// Depth view for a symbol.
    ///
    /// # Errors
    ///
    /// Same as [`MarketDataPort::snapshot`].
    fn order_book(&self, symbol: &Symbol, depth: usize) -> Result<OrderBook, MarketDataError>;
}
