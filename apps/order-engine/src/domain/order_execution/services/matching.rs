//! Order Matcher Domain Service
//!
//! Decides whether an order executes against a snapshot, at what price and
//! quantity, and whether the fill is maker or taker.

use rust_decimal::Decimal;

use crate::domain::market_data::MarketSnapshot;
use crate::domain::order_execution::aggregate::Order;
use crate::domain::order_execution::value_objects::{LiquiditySide, OrderSide};

/// When an evaluation happens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvaluationPhase {
    /// The single evaluation made at placement.
    Submission,
    /// A later re-evaluation of a resting order.
    Resting,
}

/// A fill the matcher has decided on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Execution {
    /// Fill quantity.
    pub quantity: Decimal,
    /// Fill price.
    pub price: Decimal,
    /// Maker or taker.
    pub liquidity: LiquiditySide,
}

/// Stateless matcher.
pub struct OrderMatcher;

impl OrderMatcher {
    /// Evaluate `order` against `snapshot`.
    ///
    /// Updates trigger state as a side effect (arming, trailing level), so it
    /// must be called under the order's lock. Limit-like orders always trade
    /// at their limit price; everything else trades at the touch.
    pub fn evaluate(
        order: &mut Order,
        snapshot: &MarketSnapshot,
        phase: EvaluationPhase,
    ) -> Option<Execution> {
        if !order.status().is_open() {
            return None;
        }

        let armed_now = order.observe_market(snapshot.bid, snapshot.ask);
        if !order.is_armed() {
            return None;
        }

        let side = order.side();
        let touch = snapshot.touch(side);
        if touch <= Decimal::ZERO {
            return None;
        }

        let (price, liquidity) = match order.kind().limit_price() {
            None => (touch, LiquiditySide::Taker),
            Some(limit) => {
                let crosses = match side {
                    OrderSide::Buy => touch <= limit,
                    OrderSide::Sell => touch >= limit,
                };
                if !crosses {
                    return None;
                }
                let liquidity = if phase == EvaluationPhase::Submission || armed_now {
                    LiquiditySide::Taker
                } else {
                    LiquiditySide::Maker
                };
                (limit, liquidity)
            }
        };

        let mut quantity = order.remaining_quantity();
        if let Some(visible) = order.kind().visible_quantity() {
            quantity = quantity.min(visible);
        }
        if let Some(available) = snapshot.available(side) {
            quantity = quantity.min(available);
        }
        if quantity <= Decimal::ZERO {
            return None;
        }

        Some(Execution {
            quantity,
            price,
            liquidity,
        })
    }
}
