//! Raw order specification as submitted by a caller.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{OrderSide, OrderType, TimeInForce};
use crate::domain::shared::{OwnerId, Symbol};

/// Unvalidated order request.
///
/// Optional fields are interpreted according to `order_type`; the validator
/// turns a spec into an admitted order or a rejection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderSpec {
    /// Owning account.
    pub owner: OwnerId,
    /// Trading pair.
    pub symbol: Symbol,
    /// Buy or sell.
    pub side: OrderSide,
    /// Submitted order type.
    #[serde(rename = "type", alias = "order_type")]
    pub order_type: OrderType,
    /// Requested quantity.
    pub quantity: Decimal,
    /// Limit price.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<Decimal>,
    /// Trigger price.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stop_price: Option<Decimal>,
    /// Trailing distance in price units.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trail_amount: Option<Decimal>,
    /// Trailing distance as a fraction of the reference price: `0.05` is a
    /// 5% trail. Must lie strictly between 0 and 1; a valid `trail_amount`
    /// wins when both are given.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trail_percent: Option<Decimal>,
    /// Time in force (GTC when absent).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_in_force: Option<TimeInForce>,
    /// Iceberg visible peak.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visible_quantity: Option<Decimal>,
    /// TWAP duration recorded on algorithmic child orders.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub twap_duration_minutes: Option<u32>,
}

impl OrderSpec {
    fn base(
        owner: OwnerId,
        symbol: Symbol,
        side: OrderSide,
        order_type: OrderType,
        quantity: Decimal,
    ) -> Self {
        Self {
            owner,
            symbol,
            side,
            order_type,
            quantity,
            price: None,
            stop_price: None,
            trail_amount: None,
            trail_percent: None,
            time_in_force: None,
            visible_quantity: None,
            twap_duration_minutes: None,
        }
    }

    /// Market order spec.
    #[must_use]
    pub fn market(
        owner: impl Into<OwnerId>,
        symbol: impl Into<Symbol>,
        side: OrderSide,
        quantity: Decimal,
    ) -> Self {
        Self::base(owner.into(), symbol.into(), side, OrderType::Market, quantity)
    }

    /// Limit order spec.
    #[must_use]
    pub fn limit(
        owner: impl Into<OwnerId>,
        symbol: impl Into<Symbol>,
        side: OrderSide,
        quantity: Decimal,
        price: Decimal,
    ) -> Self {
        let mut spec = Self::base(owner.into(), symbol.into(), side, OrderType::Limit, quantity);
        spec.price = Some(price);
        spec
    }

    /// Stop-loss order spec.
    #[must_use]
    pub fn stop_loss(
        owner: impl Into<OwnerId>,
        symbol: impl Into<Symbol>,
        side: OrderSide,
        quantity: Decimal,
        stop_price: Decimal,
    ) -> Self {
        let mut spec = Self::base(
            owner.into(),
            symbol.into(),
            side,
            OrderType::StopLoss,
            quantity,
        );
        spec.stop_price = Some(stop_price);
        spec
    }

    /// Set the time in force.
    #[must_use]
    pub const fn with_time_in_force(mut self, tif: TimeInForce) -> Self {
        self.time_in_force = Some(tif);
        self
    }
}
