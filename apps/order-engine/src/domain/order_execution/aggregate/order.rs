//! Order Aggregate Root
//!
//! The Order aggregate owns an admitted order's lifecycle: trigger arming,
//! fills with weighted-average pricing, cancellation and expiry. Every
//! transition is checked against `OrderStateMachine`, so a terminal order can
//! never change again.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::order_execution::errors::OrderError;
use crate::domain::order_execution::services::OrderStateMachine;
use crate::domain::order_execution::value_objects::{
    FillState, OrderKind, OrderSide, OrderStatus, OrderType, TimeInForce,
};
use crate::domain::shared::{DomainError, LinkGroupId, OrderId, OwnerId, StrategyId, Symbol};

/// Fully-populated parameters for a new order.
///
/// Produced by `OrderValidator`; there is no other way to build one from a
/// raw spec.
#[derive(Debug, Clone)]
pub struct NewOrder {
    /// Order identifier.
    pub id: OrderId,
    /// Owning account.
    pub owner: OwnerId,
    /// Symbol being traded.
    pub symbol: Symbol,
    /// Order side.
    pub side: OrderSide,
    /// Admitted kind.
    pub kind: OrderKind,
    /// Total quantity.
    pub quantity: Decimal,
    /// Time in force.
    pub time_in_force: TimeInForce,
    /// DAY cutoff.
    pub expires_at: Option<DateTime<Utc>>,
    /// TWAP duration for algorithmic children.
    pub twap_duration_minutes: Option<u32>,
    /// Admission time.
    pub created_at: DateTime<Utc>,
}

/// Trigger tracking for stop-like kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
struct TriggerState {
    armed: bool,
    trail_reference: Option<Decimal>,
    trailing_stop: Option<Decimal>,
}

/// Order aggregate root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    id: OrderId,
    owner: OwnerId,
    symbol: Symbol,
    side: OrderSide,
    kind: OrderKind,
    time_in_force: TimeInForce,
    status: OrderStatus,
    fill: FillState,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    expires_at: Option<DateTime<Utc>>,
    link_group: Option<LinkGroupId>,
    strategy_id: Option<StrategyId>,
    twap_duration_minutes: Option<u32>,
    trigger: TriggerState,
    status_reason: Option<String>,
}

impl Order {
    /// Create an order in `Pending`.
    #[must_use]
    pub fn new(params: NewOrder) -> Self {
        Self {
            id: params.id,
            owner: params.owner,
            symbol: params.symbol,
            side: params.side,
            kind: params.kind,
            time_in_force: params.time_in_force,
            status: OrderStatus::Pending,
            fill: FillState::new(params.quantity),
            created_at: params.created_at,
            updated_at: params.created_at,
            expires_at: params.expires_at,
            link_group: None,
            strategy_id: None,
            twap_duration_minutes: params.twap_duration_minutes,
            trigger: TriggerState::default(),
            status_reason: None,
        }
    }

    /// Attach an OCO link group.
    #[must_use]
    pub fn with_link_group(mut self, group: LinkGroupId) -> Self {
        self.link_group = Some(group);
        self
    }

    /// Attach the parent strategy.
    #[must_use]
    pub fn with_strategy(mut self, strategy: StrategyId) -> Self {
        self.strategy_id = Some(strategy);
        self
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// Order ID.
    #[must_use]
    pub const fn id(&self) -> &OrderId {
        &self.id
    }

    /// Owning account.
    #[must_use]
    pub const fn owner(&self) -> &OwnerId {
        &self.owner
    }

    /// Symbol.
    #[must_use]
    pub const fn symbol(&self) -> &Symbol {
        &self.symbol
    }

    /// Side.
    #[must_use]
    pub const fn side(&self) -> OrderSide {
        self.side
    }

    /// Admitted kind.
    #[must_use]
    pub const fn kind(&self) -> &OrderKind {
        &self.kind
    }

    /// Flat order type.
    #[must_use]
    pub const fn order_type(&self) -> OrderType {
        self.kind.order_type()
    }

    /// Time in force.
    #[must_use]
    pub const fn time_in_force(&self) -> TimeInForce {
        self.time_in_force
    }

    /// Current status.
    #[must_use]
    pub const fn status(&self) -> OrderStatus {
        self.status
    }

    /// Ordered quantity.
    #[must_use]
    pub const fn quantity(&self) -> Decimal {
        self.fill.quantity()
    }

    /// Filled quantity.
    #[must_use]
    pub const fn filled_quantity(&self) -> Decimal {
        self.fill.filled_quantity()
    }

    /// Open quantity.
    #[must_use]
    pub fn remaining_quantity(&self) -> Decimal {
        self.fill.remaining()
    }

    /// Weighted average fill price.
    #[must_use]
    pub const fn average_fill_price(&self) -> Decimal {
        self.fill.average_fill_price()
    }

    /// Creation time.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Last mutation time.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// DAY cutoff, if any.
    #[must_use]
    pub const fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expires_at
    }

    /// OCO link group.
    #[must_use]
    pub const fn link_group(&self) -> Option<&LinkGroupId> {
        self.link_group.as_ref()
    }

    /// Parent strategy.
    #[must_use]
    pub const fn strategy_id(&self) -> Option<&StrategyId> {
        self.strategy_id.as_ref()
    }

    /// TWAP duration recorded on algorithmic children.
    #[must_use]
    pub const fn twap_duration_minutes(&self) -> Option<u32> {
        self.twap_duration_minutes
    }

    /// Why the order reached its terminal state, when set.
    #[must_use]
    pub fn status_reason(&self) -> Option<&str> {
        self.status_reason.as_deref()
    }

    /// Returns true if the order may trade (non-trigger kind, or triggered).
    #[must_use]
    pub const fn is_armed(&self) -> bool {
        !self.kind.needs_trigger() || self.trigger.armed
    }

    /// Current stop level: fixed stop price, or the trailing level once known.
    #[must_use]
    pub fn stop_level(&self) -> Option<Decimal> {
        self.kind.stop_price().or(self.trigger.trailing_stop)
    }

    /// Returns true if the DAY cutoff has passed for an open order.
    #[must_use]
    pub fn is_due_to_expire(&self, now: DateTime<Utc>) -> bool {
        self.status.is_open() && self.expires_at.is_some_and(|cutoff| now >= cutoff)
    }

    // ========================================================================
    // Triggers
    // ========================================================================

    /// Observe top of book and arm the trigger if the stop level is crossed.
    ///
    /// Trailing stops first ratchet their level from the best favourable
    /// price; the level only ever tightens. Returns true if the order armed
    /// on this observation.
    pub fn observe_market(&mut self, bid: Decimal, ask: Decimal) -> bool {
        if !self.status.is_open() || self.trigger.armed || !self.kind.needs_trigger() {
            return false;
        }

        // The side the order would trade against.
        let touch = match self.side {
            OrderSide::Sell => bid,
            OrderSide::Buy => ask,
        };
        if touch <= Decimal::ZERO {
            return false;
        }

        let crossed = match self.kind {
            OrderKind::StopLoss { stop_price } | OrderKind::StopLimit { stop_price, .. } => {
                match self.side {
                    OrderSide::Sell => touch <= stop_price,
                    OrderSide::Buy => touch >= stop_price,
                }
            }
            OrderKind::TakeProfit { stop_price } => match self.side {
                OrderSide::Sell => touch >= stop_price,
                OrderSide::Buy => touch <= stop_price,
            },
            OrderKind::TrailingStop { trail } => {
                let reference = match (self.side, self.trigger.trail_reference) {
                    (OrderSide::Sell, Some(best)) => best.max(touch),
                    (OrderSide::Buy, Some(best)) => best.min(touch),
                    (_, None) => touch,
                };
                let candidate = trail.stop_level(reference, self.side);
                let level = match (self.side, self.trigger.trailing_stop) {
                    (OrderSide::Sell, Some(current)) => current.max(candidate),
                    (OrderSide::Buy, Some(current)) => current.min(candidate),
                    (_, None) => candidate,
                };
                self.trigger.trail_reference = Some(reference);
                self.trigger.trailing_stop = Some(level);
                match self.side {
                    OrderSide::Sell => touch <= level,
                    OrderSide::Buy => touch >= level,
                }
            }
            OrderKind::Market | OrderKind::Limit { .. } | OrderKind::Iceberg { .. } => false,
        };

        if crossed {
            self.trigger.armed = true;
        }
        crossed
    }

    // ========================================================================
    // State Transitions
    // ========================================================================

    /// Apply a fill and return the resulting status.
    ///
    /// # Errors
    ///
    /// Returns error if the order cannot receive fills, the quantity is
    /// not within `(0, remaining]`, or the new average price overflows.
    /// The order is unchanged on error.
    pub fn apply_fill(
        &mut self,
        quantity: Decimal,
        price: Decimal,
        at: DateTime<Utc>,
    ) -> Result<OrderStatus, OrderError> {
        if !self.status.can_fill() {
            return Err(OrderError::CannotFill {
                status: self.status,
            });
        }

        let remaining = self.fill.remaining();
        self.fill.apply(quantity, price).map_err(|err| match err {
            DomainError::Overflow { context } => OrderError::ArithmeticOverflow { context },
            _ => OrderError::InvalidFill {
                fill_qty: quantity.to_string(),
                remaining_qty: remaining.to_string(),
            },
        })?;

        let target = if self.fill.is_filled() {
            OrderStatus::Filled
        } else {
            OrderStatus::PartiallyFilled
        };
        OrderStateMachine::validate_transition(self.status, target)?;
        self.status = target;
        self.updated_at = at;
        Ok(target)
    }

    /// Cancel the order, keeping any fills.
    ///
    /// # Errors
    ///
    /// Returns error if the order is terminal.
    pub fn cancel(&mut self, reason: impl Into<String>, at: DateTime<Utc>) -> Result<(), OrderError> {
        if !self.status.is_open() {
            return Err(OrderError::CannotCancel {
                status: self.status,
            });
        }
        OrderStateMachine::validate_transition(self.status, OrderStatus::Cancelled)?;
        self.status = OrderStatus::Cancelled;
        self.status_reason = Some(reason.into());
        self.updated_at = at;
        Ok(())
    }

    /// Expire the order, keeping any fills.
    ///
    /// # Errors
    ///
    /// Returns error if the order is terminal.
    pub fn expire(&mut self, reason: impl Into<String>, at: DateTime<Utc>) -> Result<(), OrderError> {
        OrderStateMachine::validate_transition(self.status, OrderStatus::Expired)?;
        self.status = OrderStatus::Expired;
        self.status_reason = Some(reason.into());
        self.updated_at = at;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::order_execution::value_objects::TrailOffset;
    use rust_decimal_macros::dec;

    fn make_order(side: OrderSide, kind: OrderKind, quantity: Decimal) -> Order {
        Order::new(NewOrder {
            id: OrderId::new("ord-1"),
            owner: OwnerId::new("alice"),
            symbol: Symbol::new("BTC/DGD"),
            side,
            kind,
            quantity,
            time_in_force: TimeInForce::Gtc,
            expires_at: None,
            twap_duration_minutes: None,
            created_at: Utc::now(),
        })
    }

    #[test]
    fn order_new_is_pending() {
        let order = make_order(OrderSide::Buy, OrderKind::Market, dec!(1));
        assert_eq!(order.status(), OrderStatus::Pending);
        assert_eq!(order.filled_quantity(), Decimal::ZERO);
        assert!(order.is_armed());
    }

    #[test]
    fn order_apply_fill_partial_then_full() {
        let mut order = make_order(OrderSide::Buy, OrderKind::Limit { price: dec!(10) }, dec!(3));

        let status = order.apply_fill(dec!(1), dec!(10), Utc::now()).unwrap();
        assert_eq!(status, OrderStatus::PartiallyFilled);

        let status = order.apply_fill(dec!(2), dec!(10), Utc::now()).unwrap();
        assert_eq!(status, OrderStatus::Filled);
        assert_eq!(order.average_fill_price(), dec!(10));
    }

    #[test]
    fn order_apply_fill_exceeds_remaining() {
        let mut order = make_order(OrderSide::Buy, OrderKind::Market, dec!(1));
        let err = order.apply_fill(dec!(2), dec!(10), Utc::now()).unwrap_err();
        assert!(matches!(err, OrderError::InvalidFill { .. }));
        assert_eq!(order.status(), OrderStatus::Pending);
    }

    #[test]
    fn order_apply_fill_overflow_is_an_error() {
        let quantity = Decimal::from_i128_with_scale(10_i128.pow(27), 0);
        let mut order = make_order(OrderSide::Buy, OrderKind::Market, quantity);
        let err = order.apply_fill(quantity, dec!(358.4), Utc::now()).unwrap_err();
        assert!(matches!(err, OrderError::ArithmeticOverflow { .. }));
        assert_eq!(order.status(), OrderStatus::Pending);
        assert_eq!(order.filled_quantity(), Decimal::ZERO);
    }

    #[test]
    fn order_cancel_preserves_partial_fill() {
        let mut order = make_order(OrderSide::Sell, OrderKind::Limit { price: dec!(5) }, dec!(4));
        order.apply_fill(dec!(1), dec!(5), Utc::now()).unwrap();
        order.cancel("user request", Utc::now()).unwrap();

        assert_eq!(order.status(), OrderStatus::Cancelled);
        assert_eq!(order.filled_quantity(), dec!(1));
        assert_eq!(order.status_reason(), Some("user request"));
    }

    #[test]
    fn order_cancel_terminal_fails_without_mutation() {
        let mut order = make_order(OrderSide::Buy, OrderKind::Market, dec!(1));
        order.apply_fill(dec!(1), dec!(10), Utc::now()).unwrap();
        let before = order.clone();

        let err = order.cancel("late", Utc::now()).unwrap_err();
        assert!(err.is_terminal_conflict());
        assert_eq!(order, before);
    }

    #[test]
    fn order_fill_after_cancel_fails() {
        let mut order = make_order(OrderSide::Buy, OrderKind::Market, dec!(1));
        order.cancel("user request", Utc::now()).unwrap();
        let err = order.apply_fill(dec!(1), dec!(10), Utc::now()).unwrap_err();
        assert!(matches!(
            err,
            OrderError::CannotFill {
                status: OrderStatus::Cancelled
            }
        ));
    }

    #[test]
    fn order_expire_once() {
        let mut order = make_order(OrderSide::Buy, OrderKind::Limit { price: dec!(1) }, dec!(1));
        order.expire("DAY cutoff", Utc::now()).unwrap();
        assert_eq!(order.status(), OrderStatus::Expired);
        assert!(order.expire("DAY cutoff", Utc::now()).is_err());
    }

    #[test]
    fn sell_stop_arms_on_adverse_cross() {
        let mut order = make_order(
            OrderSide::Sell,
            OrderKind::StopLoss {
                stop_price: dec!(44000),
            },
            dec!(1),
        );
        assert!(!order.is_armed());
        assert!(!order.observe_market(dec!(45000), dec!(45010)));
        assert!(order.observe_market(dec!(44000), dec!(44010)));
        assert!(order.is_armed());
        // Already armed: no second arming.
        assert!(!order.observe_market(dec!(43000), dec!(43010)));
    }

    #[test]
    fn buy_stop_arms_when_ask_rises() {
        let mut order = make_order(
            OrderSide::Buy,
            OrderKind::StopLoss {
                stop_price: dec!(110),
            },
            dec!(1),
        );
        assert!(!order.observe_market(dec!(100), dec!(101)));
        assert!(order.observe_market(dec!(110), dec!(111)));
    }

    #[test]
    fn take_profit_arms_on_favourable_cross() {
        let mut order = make_order(
            OrderSide::Sell,
            OrderKind::TakeProfit {
                stop_price: dec!(120),
            },
            dec!(1),
        );
        assert!(!order.observe_market(dec!(100), dec!(101)));
        assert!(order.observe_market(dec!(121), dec!(122)));
    }

    #[test]
    fn trailing_sell_stop_ratchets_and_never_relaxes() {
        let mut order = make_order(
            OrderSide::Sell,
            OrderKind::TrailingStop {
                trail: TrailOffset::Amount(dec!(5)),
            },
            dec!(1),
        );

        assert!(!order.observe_market(dec!(100), dec!(101)));
        assert_eq!(order.stop_level(), Some(dec!(95)));

        assert!(!order.observe_market(dec!(110), dec!(111)));
        assert_eq!(order.stop_level(), Some(dec!(105)));

        // Price falls back but stays above the level: level unchanged.
        assert!(!order.observe_market(dec!(107), dec!(108)));
        assert_eq!(order.stop_level(), Some(dec!(105)));

        assert!(order.observe_market(dec!(105), dec!(106)));
        assert!(order.is_armed());
    }

    #[test]
    fn trailing_buy_stop_follows_lowest_ask() {
        let mut order = make_order(
            OrderSide::Buy,
            OrderKind::TrailingStop {
                trail: TrailOffset::Percent(dec!(0.1)),
            },
            dec!(1),
        );

        assert!(!order.observe_market(dec!(99), dec!(100)));
        assert_eq!(order.stop_level(), Some(dec!(110.0)));

        assert!(!order.observe_market(dec!(79), dec!(80)));
        assert_eq!(order.stop_level(), Some(dec!(88.0)));

        assert!(order.observe_market(dec!(88), dec!(89)));
    }

    #[test]
    fn day_order_due_to_expire() {
        let now = Utc::now();
        let mut order = Order::new(NewOrder {
            id: OrderId::new("ord-day"),
            owner: OwnerId::new("alice"),
            symbol: Symbol::new("ETH/DGD"),
            side: OrderSide::Buy,
            kind: OrderKind::Limit { price: dec!(20) },
            quantity: dec!(1),
            time_in_force: TimeInForce::Day,
            expires_at: Some(now),
            twap_duration_minutes: None,
            created_at: now - chrono::Duration::hours(1),
        });
        assert!(order.is_due_to_expire(now));
        order.expire("DAY cutoff", now).unwrap();
        assert!(!order.is_due_to_expire(now));
    }
}
