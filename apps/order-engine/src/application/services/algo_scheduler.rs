//! Algorithmic Execution Scheduler
//!
//! Runs TWAP and VWAP parents as tokio tasks that place IOC market children
//! on a schedule, and places OCO pairs. Child placement and strategy cancel
//! both take the strategy's state lock, so no child is placed after a cancel
//! has been observed.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use parking_lot::{Mutex, RwLock};
use rust_decimal::Decimal;
use tokio::sync::watch;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use super::lifecycle_manager::{OrderLifecycleManager, Placement};
use crate::application::dto::{AlgoParams, PlaceOrderResponse, StrategySummary};
use crate::application::ports::Clock;
use crate::domain::execution_tactics::{
    SliceRetryPolicy, StrategyKind, StrategyStatus, TwapConfig, TwapExecutor, VolumeProfile,
    VwapExecutor,
};
use crate::domain::order_execution::OrderSpec;
use crate::domain::order_execution::value_objects::{OrderSide, TimeInForce};
use crate::domain::shared::{LinkGroupId, OrderId, OwnerId, StrategyId, Symbol};
use crate::error::{EngineError, EngineResult, ErrorCode};

/// Scheduler tuning.
#[derive(Debug, Clone)]
pub struct SchedulerSettings {
    /// Upper bound on TWAP slices.
    pub twap_max_slices: u32,
    /// Spacing between VWAP buckets.
    pub vwap_bucket_interval: Duration,
    /// VWAP profile when the caller gives none.
    pub default_profile: VolumeProfile,
    /// Retry policy for transient placement failures.
    pub retry: SliceRetryPolicy,
}

impl Default for SchedulerSettings {
    fn default() -> Self {
        Self {
            twap_max_slices: 20,
            vwap_bucket_interval: Duration::from_secs(3600),
            default_profile: VolumeProfile::default(),
            retry: SliceRetryPolicy::default(),
        }
    }
}

#[derive(Debug)]
struct StrategyState {
    status: StrategyStatus,
    cancelled: bool,
    child_order_ids: Vec<OrderId>,
    slices_planned: usize,
    slices_placed: usize,
    slices_failed: usize,
    link_group: Option<LinkGroupId>,
}

/// A registered parent strategy.
struct StrategyHandle {
    id: StrategyId,
    kind: StrategyKind,
    owner: OwnerId,
    symbol: Symbol,
    side: OrderSide,
    requested_quantity: Decimal,
    duration_minutes: Option<u32>,
    created_at: DateTime<Utc>,
    state: Mutex<StrategyState>,
    cancel: CancellationToken,
    status_tx: watch::Sender<StrategyStatus>,
}

impl StrategyHandle {
    fn child_spec(&self, quantity: Decimal) -> OrderSpec {
        let mut spec = OrderSpec::market(self.owner.clone(), self.symbol.clone(), self.side, quantity)
            .with_time_in_force(TimeInForce::Ioc);
        spec.twap_duration_minutes = self.duration_minutes;
        spec
    }

    fn set_status(&self, state: &mut StrategyState, status: StrategyStatus) {
        state.status = status;
        self.status_tx.send_replace(status);
    }

    /// Final status once no more slices will be placed.
    fn finish(&self) {
        let mut state = self.state.lock();
        if state.status.is_finished() {
            return;
        }
        let status = if state.cancelled {
            StrategyStatus::Cancelled
        } else if state.slices_failed > 0 {
            StrategyStatus::Degraded
        } else {
            StrategyStatus::Completed
        };
        self.set_status(&mut state, status);
        tracing::info!(
            strategy_id = %self.id,
            kind = %self.kind,
            status = %status,
            placed = state.slices_placed,
            failed = state.slices_failed,
            "Strategy finished"
        );
    }
}

/// Parent-order scheduler.
pub struct AlgorithmicExecutionScheduler {
    lifecycle: Arc<OrderLifecycleManager>,
    clock: Arc<dyn Clock>,
    settings: SchedulerSettings,
    strategies: RwLock<HashMap<StrategyId, Arc<StrategyHandle>>>,
}

impl AlgorithmicExecutionScheduler {
    /// Create a scheduler placing children through `lifecycle`.
    #[must_use]
    pub fn new(
        lifecycle: Arc<OrderLifecycleManager>,
        clock: Arc<dyn Clock>,
        settings: SchedulerSettings,
    ) -> Self {
        Self {
            lifecycle,
            clock,
            settings,
            strategies: RwLock::new(HashMap::new()),
        }
    }

    /// Start a parent strategy by name (`twap`, `vwap`, `oco`).
    ///
    /// TWAP and VWAP must be started from within a tokio runtime; the
    /// returned summary is `RUNNING`. OCO legs are placed before returning.
    ///
    /// # Errors
    ///
    /// `INVALID_STRATEGY` for an unknown name, `INVALID_STRATEGY_PARAMS` for
    /// missing or invalid parameters.
    pub fn execute(&self, name: &str, params: AlgoParams) -> EngineResult<StrategySummary> {
        let kind: StrategyKind = name.parse()?;
        if params.quantity <= Decimal::ZERO {
            return Err(invalid_params(format!(
                "quantity must be positive, got {}",
                params.quantity
            )));
        }
        if !self.lifecycle.is_listed(&params.symbol) {
            return Err(invalid_params(format!(
                "symbol {} is not listed",
                params.symbol
            )));
        }

        match kind {
            StrategyKind::Twap => self.start_twap(params),
            StrategyKind::Vwap => self.start_vwap(params),
            StrategyKind::Oco => self.start_oco(params),
        }
    }

    /// Current summary of a strategy.
    ///
    /// # Errors
    ///
    /// `STRATEGY_NOT_FOUND`.
    pub fn summary(&self, id: &StrategyId) -> EngineResult<StrategySummary> {
        let handle = self.handle(id)?;
        Ok(self.summarize(&handle))
    }

    /// Wait until the strategy reaches a finished status.
    ///
    /// # Errors
    ///
    /// `STRATEGY_NOT_FOUND`.
    pub async fn await_strategy(&self, id: &StrategyId) -> EngineResult<StrategySummary> {
        let handle = self.handle(id)?;
        let mut rx = handle.status_tx.subscribe();
        if rx.wait_for(StrategyStatus::is_finished).await.is_err() {
            return Err(EngineError::internal("strategy status channel closed"));
        }
        Ok(self.summarize(&handle))
    }

    /// Stop further slice placement and cancel open children.
    ///
    /// # Errors
    ///
    /// `STRATEGY_NOT_FOUND`, `UNAUTHORIZED` for another owner, `CONFLICT`
    /// when already cancelled or finished with nothing left open.
    pub fn cancel(&self, id: &StrategyId, owner: &OwnerId) -> EngineResult<StrategySummary> {
        let handle = self.handle(id)?;
        if &handle.owner != owner {
            return Err(EngineError::unauthorized(id.as_str(), owner.as_str()));
        }

        let open_children: Vec<OrderId> = {
            let mut state = handle.state.lock();
            if state.cancelled {
                return Err(EngineError::new(ErrorCode::Conflict, "strategy already cancelled")
                    .with_context("strategy_id", id.as_str()));
            }
            let open: Vec<OrderId> = state
                .child_order_ids
                .iter()
                .filter(|child| {
                    self.lifecycle
                        .get_order(child)
                        .is_ok_and(|view| view.status.is_open())
                })
                .cloned()
                .collect();
            if state.status.is_finished() && open.is_empty() {
                return Err(EngineError::new(
                    ErrorCode::Conflict,
                    format!("strategy already {}", state.status),
                )
                .with_context("strategy_id", id.as_str()));
            }
            state.cancelled = true;
            handle.set_status(&mut state, StrategyStatus::Cancelled);
            open
        };
        handle.cancel.cancel();
        tracing::info!(strategy_id = %id, open_children = open_children.len(), "Strategy cancelled");

        for child in &open_children {
            // A sibling cancel or a fill may have closed it meanwhile.
            if let Err(e) = self.lifecycle.cancel(child, owner) {
                tracing::debug!(order_id = %child, error = %e, "Child already closed");
            }
        }
        Ok(self.summarize(&handle))
    }

    fn handle(&self, id: &StrategyId) -> EngineResult<Arc<StrategyHandle>> {
        self.strategies
            .read()
            .get(id)
            .cloned()
            .ok_or_else(|| EngineError::strategy_not_found(id.as_str()))
    }

    fn register(
        &self,
        kind: StrategyKind,
        params: &AlgoParams,
        slices_planned: usize,
    ) -> Arc<StrategyHandle> {
        let (status_tx, _) = watch::channel(StrategyStatus::Running);
        let handle = Arc::new(StrategyHandle {
            id: StrategyId::generate(),
            kind,
            owner: params.owner.clone(),
            symbol: params.symbol.clone(),
            side: params.side,
            requested_quantity: params.quantity,
            duration_minutes: params.duration_minutes,
            created_at: self.clock.now(),
            state: Mutex::new(StrategyState {
                status: StrategyStatus::Running,
                cancelled: false,
                child_order_ids: Vec::new(),
                slices_planned,
                slices_placed: 0,
                slices_failed: 0,
                link_group: None,
            }),
            cancel: CancellationToken::new(),
            status_tx,
        });
        self.strategies
            .write()
            .insert(handle.id.clone(), Arc::clone(&handle));
        tracing::info!(
            strategy_id = %handle.id,
            kind = %kind,
            owner = %handle.owner,
            symbol = %handle.symbol,
            quantity = %handle.requested_quantity,
            slices = slices_planned,
            "Strategy started"
        );
        handle
    }

    fn start_twap(&self, params: AlgoParams) -> EngineResult<StrategySummary> {
        let duration = params
            .duration_minutes
            .ok_or_else(|| invalid_params("TWAP requires duration_minutes"))?;
        let config = TwapConfig::new(duration, self.settings.twap_max_slices);
        let executor = TwapExecutor::new(params.quantity, config)?;
        let runtime = runtime()?;

        let handle = self.register(StrategyKind::Twap, &params, executor.slice_count());
        let lifecycle = Arc::clone(&self.lifecycle);
        let retry = self.settings.retry.clone();
        let task_handle = Arc::clone(&handle);
        runtime.spawn(async move {
            run_twap(task_handle, lifecycle, executor, retry).await;
        });
        Ok(self.summarize(&handle))
    }

    fn start_vwap(&self, params: AlgoParams) -> EngineResult<StrategySummary> {
        let profile = params
            .volume_profile
            .clone()
            .unwrap_or_else(|| self.settings.default_profile.clone());
        let executor = VwapExecutor::new(
            params.quantity,
            &profile,
            self.settings.vwap_bucket_interval,
        )?;
        let runtime = runtime()?;

        let handle = self.register(StrategyKind::Vwap, &params, executor.slices().len());
        let lifecycle = Arc::clone(&self.lifecycle);
        let retry = self.settings.retry.clone();
        let task_handle = Arc::clone(&handle);
        runtime.spawn(async move {
            run_vwap(task_handle, lifecycle, executor, retry).await;
        });
        Ok(self.summarize(&handle))
    }

    /// Both legs share the parent's side: a protective limit and stop.
    fn start_oco(&self, params: AlgoParams) -> EngineResult<StrategySummary> {
        let (Some(limit_price), Some(stop_price)) = (params.limit_price, params.stop_price) else {
            return Err(invalid_params("OCO requires limit_price and stop_price"));
        };
        let limit = OrderSpec::limit(
            params.owner.clone(),
            params.symbol.clone(),
            params.side,
            params.quantity,
            limit_price,
        );
        let stop = OrderSpec::stop_loss(
            params.owner.clone(),
            params.symbol.clone(),
            params.side,
            params.quantity,
            stop_price,
        );

        let strategy = StrategyId::generate();
        let (limit_id, stop_id) = self.lifecycle.submit_oco(limit, stop, &strategy)?;
        let link_group = self
            .lifecycle
            .get_order(&limit_id)
            .ok()
            .and_then(|view| view.link_group);

        let (status_tx, _) = watch::channel(StrategyStatus::Completed);
        let handle = Arc::new(StrategyHandle {
            id: strategy,
            kind: StrategyKind::Oco,
            owner: params.owner.clone(),
            symbol: params.symbol.clone(),
            side: params.side,
            requested_quantity: params.quantity,
            duration_minutes: None,
            created_at: self.clock.now(),
            state: Mutex::new(StrategyState {
                status: StrategyStatus::Completed,
                cancelled: false,
                child_order_ids: vec![limit_id, stop_id],
                slices_planned: 2,
                slices_placed: 2,
                slices_failed: 0,
                link_group,
            }),
            cancel: CancellationToken::new(),
            status_tx,
        });
        self.strategies
            .write()
            .insert(handle.id.clone(), Arc::clone(&handle));
        tracing::info!(
            strategy_id = %handle.id,
            owner = %handle.owner,
            symbol = %handle.symbol,
            limit_price = %limit_price,
            stop_price = %stop_price,
            "OCO strategy placed"
        );
        Ok(self.summarize(&handle))
    }

    /// Aggregate child fills into a summary.
    fn summarize(&self, handle: &StrategyHandle) -> StrategySummary {
        let state = handle.state.lock();
        let mut filled = Decimal::ZERO;
        let mut notional = Some(Decimal::ZERO);
        for child in &state.child_order_ids {
            if let Ok(view) = self.lifecycle.get_order(child)
                && let Some(price) = view.average_fill_price
            {
                filled += view.filled_quantity;
                notional = notional
                    .zip(view.filled_quantity.checked_mul(price))
                    .and_then(|(total, fill)| total.checked_add(fill));
            }
        }
        StrategySummary {
            strategy_id: handle.id.clone(),
            kind: handle.kind,
            status: state.status,
            owner: handle.owner.clone(),
            symbol: handle.symbol.clone(),
            side: handle.side,
            requested_quantity: handle.requested_quantity,
            filled_quantity: filled,
            average_price: notional
                .filter(|_| filled > Decimal::ZERO)
                .and_then(|total| total.checked_div(filled)),
            child_order_ids: state.child_order_ids.clone(),
            slices_planned: state.slices_planned,
            slices_placed: state.slices_placed,
            slices_failed: state.slices_failed,
            link_group: state.link_group.clone(),
            created_at: handle.created_at,
        }
    }
}

fn invalid_params(message: impl Into<String>) -> EngineError {
    EngineError::new(ErrorCode::InvalidStrategyParams, message)
}

fn runtime() -> EngineResult<tokio::runtime::Handle> {
    tokio::runtime::Handle::try_current()
        .map_err(|e| EngineError::internal(format!("scheduler needs a tokio runtime: {e}")))
}

/// Sleep until `deadline`; false if the strategy was cancelled first.
async fn wait_until(handle: &StrategyHandle, deadline: Instant) -> bool {
    tokio::select! {
        biased;
        () = handle.cancel.cancelled() => false,
        () = tokio::time::sleep_until(deadline) => true,
    }
}

async fn run_twap(
    handle: Arc<StrategyHandle>,
    lifecycle: Arc<OrderLifecycleManager>,
    mut executor: TwapExecutor,
    retry: SliceRetryPolicy,
) {
    let start = Instant::now();
    while let Some(slice) = executor.next_slice() {
        if !wait_until(&handle, start + slice.offset).await {
            break;
        }
        tracing::debug!(strategy_id = %handle.id, slice = slice.index, quantity = %slice.quantity, "TWAP slice due");
        place_slice(&handle, &lifecycle, slice.quantity, &retry).await;
    }
    handle.finish();
}

async fn run_vwap(
    handle: Arc<StrategyHandle>,
    lifecycle: Arc<OrderLifecycleManager>,
    mut executor: VwapExecutor,
    retry: SliceRetryPolicy,
) {
    let start = Instant::now();
    let slices = executor.slices().to_vec();
    for slice in slices {
        if executor.is_exhausted() {
            break;
        }
        if !wait_until(&handle, start + slice.offset).await {
            break;
        }
        let allocation = executor.allocation_for(slice.weight);
        if allocation <= Decimal::ZERO {
            continue;
        }
        tracing::debug!(strategy_id = %handle.id, bucket = %slice.label, quantity = %allocation, "VWAP slice due");
        let placed = place_slice(&handle, &lifecycle, allocation, &retry).await;
        if placed.is_some_and(|response| response.is_admitted())
            && let Err(e) = executor.record_placed(allocation)
        {
            tracing::error!(strategy_id = %handle.id, error = %e, "VWAP allocation bookkeeping failed");
        }
    }
    handle.finish();
}

/// Place one child, retrying transient market data failures.
///
/// Returns `None` when the slice was abandoned.
async fn place_slice(
    handle: &StrategyHandle,
    lifecycle: &OrderLifecycleManager,
    quantity: Decimal,
    retry: &SliceRetryPolicy,
) -> Option<PlaceOrderResponse> {
    let mut backoff = retry.backoff();
    loop {
        let error = {
            let mut state = handle.state.lock();
            if state.cancelled {
                return None;
            }
            match lifecycle.submit(handle.child_spec(quantity), Placement::child_of(&handle.id)) {
                Ok(response) => {
                    state.child_order_ids.push(response.order_id.clone());
                    if response.is_admitted() {
                        state.slices_placed += 1;
                    } else {
                        state.slices_failed += 1;
                        tracing::warn!(
                            strategy_id = %handle.id,
                            order_id = %response.order_id,
                            reason = ?response.rejection_reason,
                            "Child order rejected"
                        );
                    }
                    return Some(response);
                }
                Err(e) if e.code() == ErrorCode::MarketDataUnavailable => e,
                Err(e) => {
                    state.slices_failed += 1;
                    tracing::error!(strategy_id = %handle.id, error = %e, "Child placement failed");
                    return None;
                }
            }
        };

        let Some(delay) = backoff.next_backoff() else {
            handle.state.lock().slices_failed += 1;
            tracing::error!(
                strategy_id = %handle.id,
                attempts = backoff.current_attempt(),
                error = %error,
                "Slice abandoned after retries"
            );
            return None;
        };
        tracing::warn!(
            strategy_id = %handle.id,
            attempt = backoff.current_attempt(),
            delay_ms = delay.as_millis() as u64,
            error = %error,
            "Slice placement failed, retrying"
        );
        if !wait_until(handle, Instant::now() + delay).await {
            return None;
        }
    }
}
