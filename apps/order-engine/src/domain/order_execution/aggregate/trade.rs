//! Trade entity: one fill of one order.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::order_execution::value_objects::{LiquiditySide, OrderSide};
use crate::domain::shared::{OrderId, OwnerId, Symbol, TradeId};

/// An executed fill. Immutable once appended to the trade log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trade {
    /// Trade ID.
    pub id: TradeId,
    /// Order that produced the fill.
    pub order_id: OrderId,
    /// Owner of the order.
    pub owner: OwnerId,
    /// Trading pair.
    pub symbol: Symbol,
    /// Side of the order.
    pub side: OrderSide,
    /// Filled quantity.
    pub quantity: Decimal,
    /// Execution price.
    pub price: Decimal,
    /// `quantity * price`, checked when the fill is priced.
    pub notional: Decimal,
    /// Fee charged.
    pub fee: Decimal,
    /// Currency the fee is charged in.
    pub fee_currency: String,
    /// Maker or taker.
    pub liquidity: LiquiditySide,
    /// Execution time.
    pub timestamp: DateTime<Utc>,
}
