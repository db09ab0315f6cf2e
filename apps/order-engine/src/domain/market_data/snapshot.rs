//! Market snapshot value object.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::order_execution::value_objects::OrderSide;
use crate::domain::shared::Symbol;

/// Point-in-time market state for one symbol.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketSnapshot {
    /// Symbol.
    pub symbol: Symbol,
    /// Best bid.
    pub bid: Decimal,
    /// Best ask.
    pub ask: Decimal,
    /// Last traded price.
    pub last: Decimal,
    /// Rolling 24h volume.
    pub volume_24h: Decimal,
    /// Rolling 24h change, as a fraction.
    pub change_24h: Decimal,
    /// Quantity available at the bid. `None` means unlimited.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bid_size: Option<Decimal>,
    /// Quantity available at the ask. `None` means unlimited.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ask_size: Option<Decimal>,
    /// Snapshot time.
    pub timestamp: DateTime<Utc>,
}

impl MarketSnapshot {
    /// Snapshot with unlimited top-of-book liquidity.
    #[must_use]
    pub fn new(
        symbol: Symbol,
        bid: Decimal,
        ask: Decimal,
        last: Decimal,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            symbol,
            bid,
            ask,
            last,
            volume_24h: Decimal::ZERO,
            change_24h: Decimal::ZERO,
            bid_size: None,
            ask_size: None,
            timestamp,
        }
    }

    /// Set top-of-book sizes.
    #[must_use]
    pub const fn with_sizes(mut self, bid_size: Decimal, ask_size: Decimal) -> Self {
        self.bid_size = Some(bid_size);
        self.ask_size = Some(ask_size);
        self
    }

    /// Best opposing price for an order on `side` (buy takes ask, sell takes bid).
    #[must_use]
    pub const fn touch(&self, side: OrderSide) -> Decimal {
        match side {
            OrderSide::Buy => self.ask,
            OrderSide::Sell => self.bid,
        }
    }

    /// Liquidity available to an order on `side`, if bounded.
    #[must_use]
    pub const fn available(&self, side: OrderSide) -> Option<Decimal> {
        match side {
            OrderSide::Buy => self.ask_size,
            OrderSide::Sell => self.bid_size,
        }
    }

    /// Mid price.
    #[must_use]
    pub fn mid(&self) -> Decimal {
        (self.bid + self.ask) / Decimal::TWO
    }

    /// Bid/ask spread.
    #[must_use]
    pub fn spread(&self) -> Decimal {
        self.ask - self.bid
    }
}
