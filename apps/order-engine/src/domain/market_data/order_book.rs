//! Order book depth view.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::shared::Symbol;

/// One price level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderBookLevel {
    /// Level price.
    pub price: Decimal,
    /// Quantity resting at the level.
    pub quantity: Decimal,
}

/// Depth view: bids descending, asks ascending.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderBook {
    /// Symbol.
    pub symbol: Symbol,
    /// Bid levels, best (highest) first.
    pub bids: Vec<OrderBookLevel>,
    /// Ask levels, best (lowest) first.
    pub asks: Vec<OrderBookLevel>,
    /// Build time.
    pub timestamp: DateTime<Utc>,
}

impl OrderBook {
    /// Build a book, sorting each side into canonical order.
    #[must_use]
    pub fn new(
        symbol: Symbol,
        mut bids: Vec<OrderBookLevel>,
        mut asks: Vec<OrderBookLevel>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        bids.sort_by(|a, b| b.price.cmp(&a.price));
        asks.sort_by(|a, b| a.price.cmp(&b.price));
        Self {
            symbol,
            bids,
            asks,
            timestamp,
        }
    }

    /// Highest bid level.
    #[must_use]
    pub fn best_bid(&self) -> Option<&OrderBookLevel> {
        self.bids.first()
    }

    /// Lowest ask level.
    #[must_use]
    pub fn best_ask(&self) -> Option<&OrderBookLevel> {
        self.asks.first()
    }
}
