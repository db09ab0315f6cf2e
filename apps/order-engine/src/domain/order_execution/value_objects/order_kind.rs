//! Order kind as a tagged variant.
//!
//! `OrderType` is the flat discriminant a caller submits. `OrderKind` is the
//! admitted form: each variant carries only the prices it legally needs, so
//! execution code never inspects optional fields.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::OrderSide;

/// Order type as submitted in an order specification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderType {
    /// Execute at the opposing best price.
    #[serde(alias = "market")]
    Market,
    /// Execute at the limit price or better.
    #[serde(alias = "limit")]
    Limit,
    /// Protective stop. Arms on an adverse cross, then trades at market.
    #[serde(alias = "stop_loss")]
    StopLoss,
    /// Profit target. Arms on a favourable cross, then trades at market.
    #[serde(alias = "take_profit")]
    TakeProfit,
    /// Arms like a stop, then rests as a limit.
    #[serde(alias = "stop_limit")]
    StopLimit,
    /// Stop whose level follows the best favourable price.
    #[serde(alias = "trailing_stop")]
    TrailingStop,
    /// Limit that shows at most a visible peak per evaluation.
    #[serde(alias = "iceberg")]
    Iceberg,
}

impl OrderType {
    /// Returns true if the type requires a limit `price`.
    #[must_use]
    pub const fn requires_price(&self) -> bool {
        matches!(self, Self::Limit | Self::StopLimit | Self::Iceberg)
    }

    /// Returns true if the type requires a `stop_price`.
    #[must_use]
    pub const fn requires_stop_price(&self) -> bool {
        matches!(self, Self::StopLoss | Self::TakeProfit | Self::StopLimit)
    }
}

impl fmt::Display for OrderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Market => write!(f, "MARKET"),
            Self::Limit => write!(f, "LIMIT"),
            Self::StopLoss => write!(f, "STOP_LOSS"),
            Self::TakeProfit => write!(f, "TAKE_PROFIT"),
            Self::StopLimit => write!(f, "STOP_LIMIT"),
            Self::TrailingStop => write!(f, "TRAILING_STOP"),
            Self::Iceberg => write!(f, "ICEBERG"),
        }
    }
}

/// Distance a trailing stop keeps from its reference price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", content = "value", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TrailOffset {
    /// Absolute price distance.
    Amount(Decimal),
    /// Fraction of the reference price (0.05 = 5%).
    Percent(Decimal),
}

impl TrailOffset {
    /// Stop level implied by `reference` for an order on `side`.
    ///
    /// Sell stops trail below the highest bid, buy stops above the lowest ask.
    /// The level saturates at the decimal range.
    #[must_use]
    pub fn stop_level(&self, reference: Decimal, side: OrderSide) -> Decimal {
        let distance = match self {
            Self::Amount(amount) => *amount,
            Self::Percent(pct) => reference.saturating_mul(*pct),
        };
        match side {
            OrderSide::Sell => reference.saturating_sub(distance),
            OrderSide::Buy => reference.saturating_add(distance),
        }
    }
}

/// Admitted order kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderKind {
    /// Market order.
    Market,
    /// Limit order.
    Limit {
        /// Limit price.
        price: Decimal,
    },
    /// Stop-loss order.
    StopLoss {
        /// Trigger price.
        stop_price: Decimal,
    },
    /// Take-profit order.
    TakeProfit {
        /// Trigger price.
        stop_price: Decimal,
    },
    /// Stop-limit order.
    StopLimit {
        /// Trigger price.
        stop_price: Decimal,
        /// Limit price once armed.
        price: Decimal,
    },
    /// Trailing stop order.
    TrailingStop {
        /// Trail distance.
        trail: TrailOffset,
    },
    /// Iceberg (reserve) limit order.
    Iceberg {
        /// Limit price.
        price: Decimal,
        /// Maximum quantity executed per evaluation.
        visible_quantity: Decimal,
    },
}

impl OrderKind {
    /// Flat order type of this kind.
    #[must_use]
    pub const fn order_type(&self) -> OrderType {
        match self {
            Self::Market => OrderType::Market,
            Self::Limit { .. } => OrderType::Limit,
            Self::StopLoss { .. } => OrderType::StopLoss,
            Self::TakeProfit { .. } => OrderType::TakeProfit,
            Self::StopLimit { .. } => OrderType::StopLimit,
            Self::TrailingStop { .. } => OrderType::TrailingStop,
            Self::Iceberg { .. } => OrderType::Iceberg,
        }
    }

    /// Limit price for limit-like kinds.
    #[must_use]
    pub const fn limit_price(&self) -> Option<Decimal> {
        match self {
            Self::Limit { price } | Self::StopLimit { price, .. } | Self::Iceberg { price, .. } => {
                Some(*price)
            }
            _ => None,
        }
    }

    /// Fixed trigger price for stop-like kinds.
    #[must_use]
    pub const fn stop_price(&self) -> Option<Decimal> {
        match self {
            Self::StopLoss { stop_price }
            | Self::TakeProfit { stop_price }
            | Self::StopLimit { stop_price, .. } => Some(*stop_price),
            _ => None,
        }
    }

    /// Visible peak for iceberg orders.
    #[must_use]
    pub const fn visible_quantity(&self) -> Option<Decimal> {
        match self {
            Self::Iceberg {
                visible_quantity, ..
            } => Some(*visible_quantity),
            _ => None,
        }
    }

    /// Trail distance for trailing stops.
    #[must_use]
    pub const fn trail(&self) -> Option<TrailOffset> {
        match self {
            Self::TrailingStop { trail } => Some(*trail),
            _ => None,
        }
    }

    /// Returns true if the kind must be armed by a price cross before it trades.
    #[must_use]
    pub const fn needs_trigger(&self) -> bool {
        matches!(
            self,
            Self::StopLoss { .. }
                | Self::TakeProfit { .. }
                | Self::StopLimit { .. }
                | Self::TrailingStop { .. }
        )
    }
}

impl fmt::Display for OrderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.order_type())
    }
}
