//! Trading Facade
//!
//! Public surface of the engine. Composes the lifecycle manager, the
//! scheduler, statistics and market data behind one object that can be
//! shared across tasks.

use std::sync::Arc;

use chrono::NaiveTime;

use super::algo_scheduler::{AlgorithmicExecutionScheduler, SchedulerSettings};
use super::lifecycle_manager::{OrderLifecycleManager, Placement};
use super::reporting::compute_statistics;
use crate::application::dto::{
    AlgoParams, CancelResponse, OrderView, PlaceOrderResponse, StrategySummary, TradeView,
    TradingStatistics,
};
use crate::application::ports::{Clock, MarketDataPort};
use crate::domain::market_data::{MarketSnapshot, OrderBook};
use crate::domain::order_execution::value_objects::OrderStatus;
use crate::domain::order_execution::{
    FeeCalculator, FeeSchedule, OrderRepository, OrderSpec, OrderValidator, TradeRepository,
};
use crate::domain::shared::{OrderId, OwnerId, StrategyId, Symbol};
use crate::error::EngineResult;

/// Engine tuning assembled from configuration.
#[derive(Debug, Clone)]
pub struct EngineSettings {
    /// Maker/taker fee schedule.
    pub fees: FeeSchedule,
    /// DAY order cutoff (UTC).
    pub day_cutoff: NaiveTime,
    /// Scheduler tuning.
    pub scheduler: SchedulerSettings,
    /// Default order book depth.
    pub book_depth: usize,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            fees: FeeSchedule::default(),
            day_cutoff: OrderValidator::default().day_cutoff(),
            scheduler: SchedulerSettings::default(),
            book_depth: 10,
        }
    }
}

/// Trading facade.
pub struct TradingFacade {
    lifecycle: Arc<OrderLifecycleManager>,
    scheduler: AlgorithmicExecutionScheduler,
    trades: Arc<dyn TradeRepository>,
    market: Arc<dyn MarketDataPort>,
    book_depth: usize,
}

impl TradingFacade {
    /// Wire the engine from its ports.
    #[must_use]
    pub fn new(
        settings: EngineSettings,
        orders: Arc<dyn OrderRepository>,
        trades: Arc<dyn TradeRepository>,
        market: Arc<dyn MarketDataPort>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let lifecycle = Arc::new(OrderLifecycleManager::new(
            orders,
            Arc::clone(&trades),
            Arc::clone(&market),
            Arc::clone(&clock),
            OrderValidator::new(settings.day_cutoff),
            FeeCalculator::new(settings.fees),
        ));
        let scheduler =
            AlgorithmicExecutionScheduler::new(Arc::clone(&lifecycle), clock, settings.scheduler);
        Self {
            lifecycle,
            scheduler,
            trades,
            market,
            book_depth: settings.book_depth,
        }
    }

    /// Validate, store and evaluate an order.
    ///
    /// # Errors
    ///
    /// `MARKET_DATA_UNAVAILABLE` when a valid order cannot be priced.
    pub fn place_order(&self, spec: OrderSpec) -> EngineResult<PlaceOrderResponse> {
        self.lifecycle.submit(spec, Placement::default())
    }

    /// Cancel an order owned by `owner`.
    ///
    /// # Errors
    ///
    /// `ORDER_NOT_FOUND`, `UNAUTHORIZED` or `CONFLICT`.
    pub fn cancel_order(&self, order_id: &OrderId, owner: &OwnerId) -> EngineResult<CancelResponse> {
        self.lifecycle.cancel(order_id, owner)
    }

    /// Order or rejection record by ID.
    ///
    /// # Errors
    ///
    /// `ORDER_NOT_FOUND`.
    pub fn get_order(&self, order_id: &OrderId) -> EngineResult<OrderView> {
        self.lifecycle.get_order(order_id)
    }

    /// Orders of `owner`, optionally filtered by status.
    pub fn list_orders(&self, owner: &OwnerId, status: Option<OrderStatus>) -> Vec<OrderView> {
        self.lifecycle.list_orders(owner, status)
    }

    /// Trades of `owner`, oldest first.
    pub fn list_trades(&self, owner: &OwnerId) -> Vec<TradeView> {
        let mut trades = self.trades.find_by_owner(owner);
        trades.sort_by_key(|trade| trade.timestamp);
        trades.iter().map(TradeView::from).collect()
    }

    /// Start a TWAP, VWAP or OCO parent.
    ///
    /// # Errors
    ///
    /// `INVALID_STRATEGY` or `INVALID_STRATEGY_PARAMS`.
    pub fn execute_algo(&self, strategy: &str, params: AlgoParams) -> EngineResult<StrategySummary> {
        self.scheduler.execute(strategy, params)
    }

    /// Strategy progress.
    ///
    /// # Errors
    ///
    /// `STRATEGY_NOT_FOUND`.
    pub fn strategy_summary(&self, id: &StrategyId) -> EngineResult<StrategySummary> {
        self.scheduler.summary(id)
    }

    /// Wait for a strategy to finish.
    ///
    /// # Errors
    ///
    /// `STRATEGY_NOT_FOUND`.
    pub async fn await_strategy(&self, id: &StrategyId) -> EngineResult<StrategySummary> {
        self.scheduler.await_strategy(id).await
    }

    /// Cancel a strategy and its open children.
    ///
    /// # Errors
    ///
    /// `STRATEGY_NOT_FOUND`, `UNAUTHORIZED` or `CONFLICT`.
    pub fn cancel_strategy(&self, id: &StrategyId, owner: &OwnerId) -> EngineResult<StrategySummary> {
        self.scheduler.cancel(id, owner)
    }

    /// Snapshot for one symbol, or for every listed symbol.
    ///
    /// Unavailable symbols are left out of the full listing.
    ///
    /// # Errors
    ///
    /// `MARKET_DATA_UNAVAILABLE` when a named symbol has no snapshot.
    pub fn get_market_data(&self, symbol: Option<&Symbol>) -> EngineResult<Vec<MarketSnapshot>> {
        match symbol {
            Some(symbol) => Ok(vec![self.market.snapshot(symbol)?]),
            None => Ok(self
                .market
                .symbols()
                .iter()
                .filter_map(|symbol| self.market.snapshot(symbol).ok())
                .collect()),
        }
    }

    /// Order book for `symbol` (configured depth when `depth` is `None`).
    ///
    /// # Errors
    ///
    /// `MARKET_DATA_UNAVAILABLE`.
    pub fn get_order_book(&self, symbol: &Symbol, depth: Option<usize>) -> EngineResult<OrderBook> {
        Ok(self
            .market
            .order_book(symbol, depth.unwrap_or(self.book_depth))?)
    }

    /// Trade counts, volume, fees and P&L for `owner`.
    ///
    /// # Errors
    ///
    /// `INTERNAL_ERROR` when a total cannot be represented.
    pub fn get_trading_statistics(&self, owner: &OwnerId) -> EngineResult<TradingStatistics> {
        let trades = self.trades.find_by_owner(owner);
        let stats = compute_statistics(owner, &trades, |symbol| {
            self.market.snapshot(symbol).ok().map(|snapshot| snapshot.last)
        })?;
        Ok(stats)
    }

    /// Re-evaluate open orders on `symbol`; returns the number of fills.
    ///
    /// # Errors
    ///
    /// `MARKET_DATA_UNAVAILABLE`.
    pub fn reevaluate(&self, symbol: &Symbol) -> EngineResult<usize> {
        self.lifecycle.reevaluate(symbol)
    }

    /// Housekeeping pass: expire due DAY orders, then re-evaluate everything.
    pub fn housekeeping(&self) -> (usize, usize) {
        let expired = self.lifecycle.expire_due();
        let fills = self.lifecycle.reevaluate_all();
        (expired, fills)
    }
}
