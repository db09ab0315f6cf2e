//! Order side (buy or sell).

use serde::{Deserialize, Serialize};
use std::fmt;

/// Order side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderSide {
    /// Buy order. Executes against the ask.
    #[serde(alias = "buy")]
    Buy,
    /// Sell order. Executes against the bid.
    #[serde(alias = "sell")]
    Sell,
}

impl OrderSide {
    /// Returns the opposite side.
    #[must_use]
    pub const fn opposite(&self) -> Self {
        match self {
            Self::Buy => Self::Sell,
            Self::Sell => Self::Buy,
        }
    }

    /// Signed multiplier for position arithmetic (+1 buy, -1 sell).
    #[must_use]
    pub const fn sign(&self) -> i8 {
        match self {
            Self::Buy => 1,
            Self::Sell => -1,
        }
    }
}

impl fmt::Display for OrderSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Buy => write!(f, "BUY"),
            Self::Sell => write!(f, "SELL"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_side_opposite() {
        assert_eq!(OrderSide::Buy.opposite(), OrderSide::Sell);
        assert_eq!(OrderSide::Sell.opposite(), OrderSide::Buy);
    }

    #[test]
    fn order_side_accepts_lowercase() {
        let side: OrderSide = serde_json::from_str("\"buy\"").unwrap();
        assert_eq!(side, OrderSide::Buy);
        let side: OrderSide = serde_json::from_str("\"SELL\"").unwrap();
        assert_eq!(side, OrderSide::Sell);
    }

    #[test]
    fn order_side_display() {
        assert_eq!(OrderSide::Buy.to_string(), "BUY");
        assert_eq!(OrderSide::Sell.sign(), -1);
    }
}
