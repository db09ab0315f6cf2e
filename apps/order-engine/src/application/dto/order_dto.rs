//! Order and trade DTOs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::order_execution::value_objects::{
    LiquiditySide, OrderSide, OrderStatus, OrderType, RejectionCode, TimeInForce, TrailOffset,
};
use crate::domain::order_execution::{Order, RejectedOrder, Trade};
use crate::domain::shared::{LinkGroupId, OrderId, OwnerId, StrategyId, Symbol, TradeId};

/// Result of `place_order`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaceOrderResponse {
    /// Assigned order ID (also assigned to rejections).
    pub order_id: OrderId,
    /// Status after the submission evaluation.
    pub status: OrderStatus,
    /// Filled quantity after the submission evaluation.
    pub filled_quantity: Decimal,
    /// Rejection code, when rejected.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejection_code: Option<RejectionCode>,
    /// Rejection detail, when rejected.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejection_reason: Option<String>,
}

impl PlaceOrderResponse {
    /// Response for an admitted order.
    #[must_use]
    pub fn from_order(order: &Order) -> Self {
        Self {
            order_id: order.id().clone(),
            status: order.status(),
            filled_quantity: order.filled_quantity(),
            rejection_code: None,
            rejection_reason: None,
        }
    }

    /// Response for a rejection record.
    #[must_use]
    pub fn from_rejected(record: &RejectedOrder) -> Self {
        Self {
            order_id: record.id().clone(),
            status: OrderStatus::Rejected,
            filled_quantity: Decimal::ZERO,
            rejection_code: Some(record.rejection().code),
            rejection_reason: Some(record.rejection().message.clone()),
        }
    }

    /// Returns true if the order was admitted.
    #[must_use]
    pub fn is_admitted(&self) -> bool {
        self.status != OrderStatus::Rejected
    }
}

/// Result of `cancel_order`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CancelResponse {
    /// Cancelled order.
    pub order_id: OrderId,
    /// Always `CANCELLED` on success.
    pub status: OrderStatus,
    /// OCO siblings cancelled in the same transition.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub cancelled_siblings: Vec<OrderId>,
}

/// Order view (live order or rejection record).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderView {
    /// Order ID.
    pub order_id: OrderId,
    /// Owner.
    pub owner: OwnerId,
    /// Symbol.
    pub symbol: Symbol,
    /// Side.
    pub side: OrderSide,
    /// Type.
    pub order_type: OrderType,
    /// Quantity.
    pub quantity: Decimal,
    /// Limit price.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<Decimal>,
    /// Stop price, or current trailing stop level.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop_price: Option<Decimal>,
    /// Trailing distance.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trail: Option<TrailOffset>,
    /// Iceberg visible peak.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visible_quantity: Option<Decimal>,
    /// Time in force.
    pub time_in_force: TimeInForce,
    /// Status.
    pub status: OrderStatus,
    /// Filled quantity.
    pub filled_quantity: Decimal,
    /// Remaining quantity.
    pub remaining_quantity: Decimal,
    /// Average fill price (absent when unfilled).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub average_fill_price: Option<Decimal>,
    /// Stop trigger armed.
    pub triggered: bool,
    /// Created at.
    pub created_at: DateTime<Utc>,
    /// Updated at.
    pub updated_at: DateTime<Utc>,
    /// DAY cutoff.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
    /// OCO link group.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link_group: Option<LinkGroupId>,
    /// Parent strategy.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strategy_id: Option<StrategyId>,
    /// TWAP duration for algorithmic children.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub twap_duration_minutes: Option<u32>,
    /// Rejection code.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejection_code: Option<RejectionCode>,
    /// Rejection detail or terminal-state reason.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl OrderView {
    /// Create from domain Order.
    #[must_use]
    pub fn from_order(order: &Order) -> Self {
        let filled = order.filled_quantity();
        Self {
            order_id: order.id().clone(),
            owner: order.owner().clone(),
            symbol: order.symbol().clone(),
            side: order.side(),
            order_type: order.order_type(),
            quantity: order.quantity(),
            price: order.kind().limit_price(),
            stop_price: order.stop_level(),
            trail: order.kind().trail(),
            visible_quantity: order.kind().visible_quantity(),
            time_in_force: order.time_in_force(),
            status: order.status(),
            filled_quantity: filled,
            remaining_quantity: order.remaining_quantity(),
            average_fill_price: (filled > Decimal::ZERO).then(|| order.average_fill_price()),
            triggered: order.kind().needs_trigger() && order.is_armed(),
            created_at: order.created_at(),
            updated_at: order.updated_at(),
            expires_at: order.expires_at(),
            link_group: order.link_group().cloned(),
            strategy_id: order.strategy_id().cloned(),
            twap_duration_minutes: order.twap_duration_minutes(),
            rejection_code: None,
            reason: order.status_reason().map(str::to_string),
        }
    }

    /// Create from a rejection record.
    #[must_use]
    pub fn from_rejected(record: &RejectedOrder) -> Self {
        let spec = record.spec();
        let trail = spec
            .trail_amount
            .map(TrailOffset::Amount)
            .or_else(|| spec.trail_percent.map(TrailOffset::Percent));
        Self {
            order_id: record.id().clone(),
            owner: spec.owner.clone(),
            symbol: spec.symbol.clone(),
            side: spec.side,
            order_type: spec.order_type,
            quantity: spec.quantity,
            price: spec.price,
            stop_price: spec.stop_price,
            trail,
            visible_quantity: spec.visible_quantity,
            time_in_force: spec.time_in_force.unwrap_or_default(),
            status: OrderStatus::Rejected,
            filled_quantity: Decimal::ZERO,
            remaining_quantity: Decimal::ZERO,
            average_fill_price: None,
            triggered: false,
            created_at: record.created_at(),
            updated_at: record.created_at(),
            expires_at: None,
            link_group: None,
            strategy_id: None,
            twap_duration_minutes: spec.twap_duration_minutes,
            rejection_code: Some(record.rejection().code),
            reason: Some(record.rejection().message.clone()),
        }
    }
}

/// Trade view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeView {
    /// Trade ID.
    pub trade_id: TradeId,
    /// Order ID.
    pub order_id: OrderId,
    /// Symbol.
    pub symbol: Symbol,
    /// Side.
    pub side: OrderSide,
    /// Quantity.
    pub quantity: Decimal,
    /// Price.
    pub price: Decimal,
    /// `quantity * price`.
    pub notional: Decimal,
    /// Fee.
    pub fee: Decimal,
    /// Fee currency.
    pub fee_currency: String,
    /// Maker or taker.
    pub liquidity: LiquiditySide,
    /// Execution time.
    pub timestamp: DateTime<Utc>,
}

impl From<&Trade> for TradeView {
    fn from(trade: &Trade) -> Self {
        Self {
            trade_id: trade.id.clone(),
            order_id: trade.order_id.clone(),
            symbol: trade.symbol.clone(),
            side: trade.side,
            quantity: trade.quantity,
            price: trade.price,
            notional: trade.notional,
            fee: trade.fee,
            fee_currency: trade.fee_currency.clone(),
            liquidity: trade.liquidity,
            timestamp: trade.timestamp,
        }
    }
}
