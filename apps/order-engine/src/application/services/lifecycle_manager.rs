//! Order Lifecycle Manager
//!
//! Owns every order state transition: admission, submission evaluation,
//! re-evaluation against fresh snapshots, cancellation and DAY expiry.
//! Each order is mutated only under its own lock; OCO siblings are locked
//! together in order-id order so a fill and the sibling cancel are one step.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::MutexGuard;
use rust_decimal::Decimal;

use crate::application::dto::{CancelResponse, OrderView, PlaceOrderResponse};
use crate::application::ports::{Clock, MarketDataPort};
use crate::domain::market_data::MarketSnapshot;
use crate::domain::order_execution::value_objects::{OrderStatus, TimeInForce};
use crate::domain::order_execution::{
    EvaluationPhase, Execution, FeeCalculator, Order, OrderCell, OrderError, OrderMatcher,
    OrderRepository, OrderSpec, OrderValidator, RejectedOrder, Trade, TradeRepository,
};
use crate::domain::shared::{
    DomainError, LinkGroupId, OrderId, OwnerId, StrategyId, Symbol, TradeId,
};
use crate::error::{EngineError, EngineResult, ErrorCode};

/// Where a new order comes from.
#[derive(Debug, Clone, Default)]
pub struct Placement {
    /// Parent strategy of an algorithmic child.
    pub strategy_id: Option<StrategyId>,
    /// OCO link group.
    pub link_group: Option<LinkGroupId>,
}

impl Placement {
    /// Child of `strategy`.
    #[must_use]
    pub fn child_of(strategy: &StrategyId) -> Self {
        Self {
            strategy_id: Some(strategy.clone()),
            link_group: None,
        }
    }
}

/// Order lifecycle service.
pub struct OrderLifecycleManager {
    orders: Arc<dyn OrderRepository>,
    trades: Arc<dyn TradeRepository>,
    market: Arc<dyn MarketDataPort>,
    clock: Arc<dyn Clock>,
    validator: OrderValidator,
    fees: FeeCalculator,
}

impl OrderLifecycleManager {
    /// Create a new lifecycle manager.
    #[must_use]
    pub fn new(
        orders: Arc<dyn OrderRepository>,
        trades: Arc<dyn TradeRepository>,
        market: Arc<dyn MarketDataPort>,
        clock: Arc<dyn Clock>,
        validator: OrderValidator,
        fees: FeeCalculator,
    ) -> Self {
        Self {
            orders,
            trades,
            market,
            clock,
            validator,
            fees,
        }
    }

    /// Returns true if `symbol` is listed by the market data source.
    pub fn is_listed(&self, symbol: &Symbol) -> bool {
        self.market.is_listed(symbol)
    }

    /// Validate, admit and evaluate a new order.
    ///
    /// Validation failures are stored as rejection records and returned as
    /// `Ok` with status `REJECTED`. Admitted IOC/FOK orders are resolved to a
    /// terminal state before returning.
    ///
    /// # Errors
    ///
    /// Returns `MARKET_DATA_UNAVAILABLE` if no snapshot can be fetched for an
    /// otherwise valid order; nothing is stored in that case.
    pub fn submit(&self, spec: OrderSpec, placement: Placement) -> EngineResult<PlaceOrderResponse> {
        let snapshot = self.market.snapshot(&spec.symbol);
        let order = match self.admit(spec, snapshot.as_ref().ok())? {
            Ok(order) => order,
            Err(response) => return Ok(response),
        };
        let snapshot = snapshot?;

        let order = attach(order, placement);
        let cell = self.orders.insert(order)?;
        let mut guard = cell.lock();
        tracing::info!(
            order_id = %guard.id(),
            owner = %guard.owner(),
            symbol = %guard.symbol(),
            side = %guard.side(),
            order_type = %guard.order_type(),
            quantity = %guard.quantity(),
            "Order accepted"
        );
        self.evaluate_locked(&mut guard, &snapshot, EvaluationPhase::Submission)?;
        self.resolve_time_in_force(&mut guard)?;
        Ok(PlaceOrderResponse::from_order(&guard))
    }

    /// Validate, admit and evaluate an OCO pair.
    ///
    /// Both legs are stored before either is evaluated. If either leg is
    /// rejected its rejection record is stored and the pair is not placed.
    ///
    /// # Errors
    ///
    /// Returns `INVALID_STRATEGY_PARAMS` when a leg is rejected, or
    /// `MARKET_DATA_UNAVAILABLE` when no snapshot is available.
    pub fn submit_oco(
        &self,
        first: OrderSpec,
        second: OrderSpec,
        strategy: &StrategyId,
    ) -> EngineResult<(OrderId, OrderId)> {
        let snapshot = self.market.snapshot(&first.symbol);
        let first = self.admit(first, snapshot.as_ref().ok())?;
        let second = self.admit(second, snapshot.as_ref().ok())?;
        let (first, second) = match (first, second) {
            (Ok(a), Ok(b)) => (a, b),
            (Err(rejected), _) | (_, Err(rejected)) => {
                return Err(EngineError::new(
                    ErrorCode::InvalidStrategyParams,
                    format!(
                        "OCO leg rejected: {}",
                        rejected.rejection_reason.unwrap_or_default()
                    ),
                )
                .with_context("order_id", rejected.order_id.as_str()));
            }
        };
        let snapshot = snapshot?;

        let group = LinkGroupId::generate();
        let placement = Placement {
            strategy_id: Some(strategy.clone()),
            link_group: Some(group.clone()),
        };
        let first = self.orders.insert(attach(first, placement.clone()))?;
        let second = self.orders.insert(attach(second, placement))?;
        let first_id = first.lock().id().clone();
        let second_id = second.lock().id().clone();
        tracing::info!(
            link_group = %group,
            strategy_id = %strategy,
            first = %first_id,
            second = %second_id,
            "OCO pair accepted"
        );

        self.evaluate_cell(&first, &snapshot, EvaluationPhase::Submission)?;
        self.evaluate_cell(&second, &snapshot, EvaluationPhase::Submission)?;
        Ok((first_id, second_id))
    }

    /// Cancel an open order on behalf of `owner`.
    ///
    /// Cancelling an OCO leg also cancels the open sibling.
    ///
    /// # Errors
    ///
    /// `ORDER_NOT_FOUND`, `UNAUTHORIZED` when another owner asks, and
    /// `CONFLICT` when the order is already terminal. The order is never
    /// mutated on error.
    pub fn cancel(&self, order_id: &OrderId, owner: &OwnerId) -> EngineResult<CancelResponse> {
        let Some(cell) = self.orders.get(order_id) else {
            return match self.orders.get_rejected(order_id) {
                Some(record) if &record.spec().owner != owner => {
                    Err(EngineError::unauthorized(order_id.as_str(), owner.as_str()))
                }
                Some(_) => Err(EngineError::conflict(
                    order_id.as_str(),
                    "order is REJECTED and cannot be cancelled",
                )),
                None => Err(EngineError::order_not_found(order_id.as_str())),
            };
        };

        let (link_group, order_owner) = {
            let order = cell.lock();
            (order.link_group().cloned(), order.owner().clone())
        };
        if &order_owner != owner {
            tracing::warn!(order_id = %order_id, owner = %owner, "Cancel refused: wrong owner");
            return Err(EngineError::unauthorized(order_id.as_str(), owner.as_str()));
        }

        let now = self.clock.now();
        let mut cancelled_siblings = Vec::new();
        match link_group {
            None => {
                let mut order = cell.lock();
                order.cancel("cancelled by owner", now)?;
                tracing::info!(order_id = %order_id, filled = %order.filled_quantity(), "Order cancelled");
            }
            Some(group) => {
                let cells = self.orders.find_by_link_group(&group);
                let mut guards = lock_all(&cells);
                let target = position_of(&cells, &cell)?;
                guards[target].cancel("cancelled by owner", now)?;
                tracing::info!(order_id = %order_id, link_group = %group, "OCO leg cancelled");
                for (index, sibling) in guards.iter_mut().enumerate() {
                    if index != target && sibling.status().is_open() {
                        sibling.cancel(format!("OCO sibling {order_id} cancelled"), now)?;
                        tracing::info!(order_id = %sibling.id(), link_group = %group, "OCO sibling cancelled");
                        cancelled_siblings.push(sibling.id().clone());
                    }
                }
            }
        }

        Ok(CancelResponse {
            order_id: order_id.clone(),
            status: OrderStatus::Cancelled,
            cancelled_siblings,
        })
    }

    /// Look up an order or rejection record.
    ///
    /// # Errors
    ///
    /// `ORDER_NOT_FOUND` when the ID is unknown.
    pub fn get_order(&self, order_id: &OrderId) -> EngineResult<OrderView> {
        if let Some(cell) = self.orders.get(order_id) {
            return Ok(OrderView::from_order(&cell.lock()));
        }
        self.orders
            .get_rejected(order_id)
            .map(|record| OrderView::from_rejected(&record))
            .ok_or_else(|| EngineError::order_not_found(order_id.as_str()))
    }

    /// All orders and rejection records of `owner`, oldest first.
    pub fn list_orders(&self, owner: &OwnerId, status: Option<OrderStatus>) -> Vec<OrderView> {
        let mut views: Vec<OrderView> = self
            .orders
            .find_by_owner(owner)
            .iter()
            .map(|cell| OrderView::from_order(&cell.lock()))
            .chain(
                self.orders
                    .find_rejected_by_owner(owner)
                    .iter()
                    .map(OrderView::from_rejected),
            )
            .filter(|view| status.is_none_or(|wanted| view.status == wanted))
            .collect();
        views.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.order_id.cmp(&b.order_id))
        });
        views
    }

    /// Re-evaluate every open order on `symbol` against a fresh snapshot.
    ///
    /// Returns the number of fills produced.
    ///
    /// # Errors
    ///
    /// `MARKET_DATA_UNAVAILABLE` when the snapshot cannot be fetched.
    pub fn reevaluate(&self, symbol: &Symbol) -> EngineResult<usize> {
        let snapshot = self.market.snapshot(symbol)?;
        let mut fills = 0;
        for cell in self.orders.find_by_symbol(symbol) {
            if !cell.lock().status().is_open() {
                continue;
            }
            if self.evaluate_cell(&cell, &snapshot, EvaluationPhase::Resting)? {
                fills += 1;
            }
        }
        if fills > 0 {
            tracing::debug!(symbol = %symbol, fills, "Re-evaluation produced fills");
        }
        Ok(fills)
    }

    /// Re-evaluate every symbol with stored orders.
    ///
    /// Symbols whose snapshot is unavailable are skipped and logged.
    pub fn reevaluate_all(&self) -> usize {
        let mut fills = 0;
        for symbol in self.orders.symbols() {
            match self.reevaluate(&symbol) {
                Ok(count) => fills += count,
                Err(e) => {
                    tracing::warn!(symbol = %symbol, error = %e, "Skipping re-evaluation");
                }
            }
        }
        fills
    }

    /// Expire every open DAY order whose cutoff has passed.
    ///
    /// Returns the number of orders expired.
    pub fn expire_due(&self) -> usize {
        let now = self.clock.now();
        let mut expired = 0;
        for symbol in self.orders.symbols() {
            for cell in self.orders.find_by_symbol(&symbol) {
                let mut order = cell.lock();
                if order.is_due_to_expire(now) && order.expire("DAY order reached cutoff", now).is_ok() {
                    tracing::info!(order_id = %order.id(), "Order expired");
                    expired += 1;
                }
            }
        }
        expired
    }

    /// Validate a spec; rejections are recorded and returned as `Err` inner.
    fn admit(
        &self,
        spec: OrderSpec,
        snapshot: Option<&MarketSnapshot>,
    ) -> EngineResult<Result<Order, PlaceOrderResponse>> {
        let now = self.clock.now();
        let id = OrderId::generate();
        let listed = self.market.is_listed(&spec.symbol);
        let touch = snapshot.map(|snapshot| snapshot.touch(spec.side));
        match self.validator.validate(&spec, listed, touch, id.clone(), now) {
            Ok(new_order) => Ok(Ok(Order::new(new_order))),
            Err(rejection) => {
                tracing::warn!(
                    order_id = %id,
                    owner = %spec.owner,
                    symbol = %spec.symbol,
                    code = %rejection.code,
                    reason = %rejection.message,
                    "Order rejected"
                );
                let record = RejectedOrder::new(id, spec, rejection, now);
                let response = PlaceOrderResponse::from_rejected(&record);
                self.orders.insert_rejected(record)?;
                Ok(Err(response))
            }
        }
    }

    /// Evaluate one stored order, taking its OCO group lock when linked.
    ///
    /// Returns true if a fill was produced.
    fn evaluate_cell(
        &self,
        cell: &OrderCell,
        snapshot: &MarketSnapshot,
        phase: EvaluationPhase,
    ) -> EngineResult<bool> {
        let link_group = cell.lock().link_group().cloned();
        let Some(group) = link_group else {
            let mut order = cell.lock();
            return Ok(self.evaluate_locked(&mut order, snapshot, phase)?.is_some());
        };

        let cells = self.orders.find_by_link_group(&group);
        let mut guards = lock_all(&cells);
        let target = position_of(&cells, cell)?;
        let Some(trade) = self.evaluate_locked(&mut guards[target], snapshot, phase)? else {
            return Ok(false);
        };

        for (index, sibling) in guards.iter_mut().enumerate() {
            if index != target && sibling.status().is_open() {
                sibling.cancel(format!("OCO sibling {} filled", trade.order_id), trade.timestamp)?;
                tracing::info!(
                    order_id = %sibling.id(),
                    filled_sibling = %trade.order_id,
                    link_group = %group,
                    "OCO sibling cancelled"
                );
            }
        }
        Ok(true)
    }

    /// Expiry check, match and fill for a locked order.
    fn evaluate_locked(
        &self,
        order: &mut Order,
        snapshot: &MarketSnapshot,
        phase: EvaluationPhase,
    ) -> EngineResult<Option<Trade>> {
        let now = self.clock.now();
        if order.is_due_to_expire(now) {
            order.expire("DAY order reached cutoff", now)?;
            tracing::info!(order_id = %order.id(), "Order expired");
            return Ok(None);
        }

        let Some(execution) = OrderMatcher::evaluate(order, snapshot, phase) else {
            return Ok(None);
        };
        if order.time_in_force() == TimeInForce::Fok && execution.quantity < order.remaining_quantity() {
            tracing::debug!(
                order_id = %order.id(),
                available = %execution.quantity,
                remaining = %order.remaining_quantity(),
                "FOK order cannot fill completely"
            );
            return Ok(None);
        }

        let applied = self
            .price_fill(order, &execution, now)
            .map_err(|err| OrderError::ArithmeticOverflow {
                context: err.to_string(),
            })
            .and_then(|trade| {
                order
                    .apply_fill(execution.quantity, execution.price, now)
                    .map(|status| (trade, status))
            });
        let (trade, status) = match applied {
            Ok(applied) => applied,
            Err(OrderError::ArithmeticOverflow { context }) => {
                tracing::warn!(
                    order_id = %order.id(),
                    quantity = %execution.quantity,
                    price = %execution.price,
                    error = %context,
                    "Fill skipped: amounts out of range"
                );
                return Ok(None);
            }
            Err(err) => return Err(err.into()),
        };
        tracing::info!(
            order_id = %trade.order_id,
            trade_id = %trade.id,
            quantity = %trade.quantity,
            price = %trade.price,
            fee = %trade.fee,
            liquidity = %trade.liquidity,
            status = %status,
            "Order filled"
        );
        self.trades.append(trade.clone());
        Ok(Some(trade))
    }

    /// Trade record for an execution, with checked notional and fee.
    fn price_fill(
        &self,
        order: &Order,
        execution: &Execution,
        now: DateTime<Utc>,
    ) -> Result<Trade, DomainError> {
        let notional = execution
            .quantity
            .checked_mul(execution.price)
            .ok_or_else(|| DomainError::overflow("fill notional"))?;
        Ok(Trade {
            id: TradeId::generate(),
            order_id: order.id().clone(),
            owner: order.owner().clone(),
            symbol: order.symbol().clone(),
            side: order.side(),
            quantity: execution.quantity,
            price: execution.price,
            notional,
            fee: self.fees.fee(execution.quantity, execution.price, execution.liquidity)?,
            fee_currency: self.fees.currency_for(order.symbol()),
            liquidity: execution.liquidity,
            timestamp: now,
        })
    }

    /// IOC and FOK never rest past their submission evaluation.
    fn resolve_time_in_force(&self, order: &mut Order) -> EngineResult<()> {
        if !order.time_in_force().is_immediate() || !order.status().is_open() {
            return Ok(());
        }
        let now = self.clock.now();
        if order.filled_quantity() > Decimal::ZERO {
            order.cancel("IOC remainder cancelled", now)?;
        } else {
            order.expire(
                format!("{} order found no immediate liquidity", order.time_in_force()),
                now,
            )?;
        }
        tracing::info!(
            order_id = %order.id(),
            status = %order.status(),
            filled = %order.filled_quantity(),
            "Immediate order resolved"
        );
        Ok(())
    }
}

fn attach(order: Order, placement: Placement) -> Order {
    let order = match placement.strategy_id {
        Some(strategy) => order.with_strategy(strategy),
        None => order,
    };
    match placement.link_group {
        Some(group) => order.with_link_group(group),
        None => order,
    }
}

/// Lock a link group. The repository returns siblings in order-id order.
fn lock_all(cells: &[OrderCell]) -> Vec<MutexGuard<'_, Order>> {
    cells.iter().map(|cell| cell.lock()).collect()
}

fn position_of(cells: &[OrderCell], cell: &OrderCell) -> EngineResult<usize> {
    cells
        .iter()
        .position(|candidate| Arc::ptr_eq(candidate, cell))
        .ok_or_else(|| EngineError::internal("order missing from its link group"))
}
