//! Strategy DTOs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::execution_tactics::{StrategyKind, StrategyStatus, VolumeProfile};
use crate::domain::order_execution::value_objects::OrderSide;
use crate::domain::shared::{LinkGroupId, OrderId, OwnerId, StrategyId, Symbol};

/// Parameters for `execute_algo`.
///
/// `duration_minutes` is required for TWAP; `limit_price` and `stop_price`
/// for OCO. VWAP uses `volume_profile` or the configured default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlgoParams {
    /// Owning account.
    pub owner: OwnerId,
    /// Symbol.
    pub symbol: Symbol,
    /// Side of every child.
    pub side: OrderSide,
    /// Parent quantity.
    pub quantity: Decimal,
    /// TWAP window.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_minutes: Option<u32>,
    /// VWAP profile override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume_profile: Option<VolumeProfile>,
    /// OCO protective limit.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit_price: Option<Decimal>,
    /// OCO protective stop.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stop_price: Option<Decimal>,
}

impl AlgoParams {
    /// Parameters with no strategy-specific fields set.
    #[must_use]
    pub fn new(
        owner: impl Into<OwnerId>,
        symbol: impl Into<Symbol>,
        side: OrderSide,
        quantity: Decimal,
    ) -> Self {
        Self {
            owner: owner.into(),
            symbol: symbol.into(),
            side,
            quantity,
            duration_minutes: None,
            volume_profile: None,
            limit_price: None,
            stop_price: None,
        }
    }

    /// Set the TWAP window.
    #[must_use]
    pub const fn with_duration(mut self, minutes: u32) -> Self {
        self.duration_minutes = Some(minutes);
        self
    }

    /// Set the VWAP profile.
    #[must_use]
    pub fn with_profile(mut self, profile: VolumeProfile) -> Self {
        self.volume_profile = Some(profile);
        self
    }

    /// Set the OCO prices.
    #[must_use]
    pub const fn with_oco_prices(mut self, limit_price: Decimal, stop_price: Decimal) -> Self {
        self.limit_price = Some(limit_price);
        self.stop_price = Some(stop_price);
        self
    }
}

/// Strategy progress and results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrategySummary {
    /// Strategy ID.
    pub strategy_id: StrategyId,
    /// Kind.
    pub kind: StrategyKind,
    /// Status.
    pub status: StrategyStatus,
    /// Owner.
    pub owner: OwnerId,
    /// Symbol.
    pub symbol: Symbol,
    /// Side.
    pub side: OrderSide,
    /// Parent quantity.
    pub requested_quantity: Decimal,
    /// Sum of child fills.
    pub filled_quantity: Decimal,
    /// Weighted average over child fills (absent when unfilled).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub average_price: Option<Decimal>,
    /// Child orders in placement order.
    pub child_order_ids: Vec<OrderId>,
    /// Slices planned.
    pub slices_planned: usize,
    /// Slices placed (admitted).
    pub slices_placed: usize,
    /// Slices that could not be placed.
    pub slices_failed: usize,
    /// OCO link group.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link_group: Option<LinkGroupId>,
    /// Start time.
    pub created_at: DateTime<Utc>,
}
