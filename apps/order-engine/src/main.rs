//! Order Engine Binary
//!
//! Runs the engine against an in-memory market seeded from configuration
//! and serves JSON-line commands on stdin. Each command produces one JSON
//! line on stdout; logs go to stderr.
//!
//! # Usage
//!
//! ```bash
//! echo '{"op":"market_data"}' | cargo run --bin order-engine
//! ```
//!
//! # Environment Variables
//!
//! - `ORDER_ENGINE_CONFIG`: Path to the YAML config (default: `config.yaml`
//!   when present, built-in defaults otherwise)
//! - `RUST_LOG`: Log filter (overrides `observability.logging.level`)

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use chrono::Utc;
use order_engine::application::ports::MarketDataPort;
use order_engine::config::{Config, load_config};
use order_engine::domain::order_execution::value_objects::OrderStatus;
use order_engine::infrastructure::{
    InMemoryMarketData, InMemoryOrderStore, InMemoryTradeStore, SystemClock,
};
use order_engine::telemetry::init_tracing;
use order_engine::{
    AlgoParams, EngineError, OrderId, OrderSpec, OwnerId, StrategyId, Symbol, TradingFacade,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// One stdin command.
#[derive(Debug, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
enum Command {
    PlaceOrder(OrderSpec),
    CancelOrder {
        order_id: OrderId,
        owner: OwnerId,
    },
    GetOrder {
        order_id: OrderId,
    },
    ListOrders {
        owner: OwnerId,
        #[serde(default)]
        status: Option<OrderStatus>,
    },
    ListTrades {
        owner: OwnerId,
    },
    ExecuteAlgo {
        strategy: String,
        params: AlgoParams,
    },
    StrategySummary {
        strategy_id: StrategyId,
    },
    AwaitStrategy {
        strategy_id: StrategyId,
    },
    CancelStrategy {
        strategy_id: StrategyId,
        owner: OwnerId,
    },
    MarketData {
        #[serde(default)]
        symbol: Option<Symbol>,
    },
    OrderBook {
        symbol: Symbol,
        #[serde(default)]
        depth: Option<usize>,
    },
    Statistics {
        owner: OwnerId,
    },
    SetPrice {
        symbol: Symbol,
        price: Decimal,
    },
    SetAvailability {
        symbol: Symbol,
        available: bool,
    },
}

/// One stdout response line.
#[derive(Debug, Serialize)]
struct Reply {
    ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<order_engine::error::ErrorResponse>,
}

impl Reply {
    fn from_result<T: Serialize>(result: Result<T, EngineError>) -> Self {
        match result {
            Ok(value) => match serde_json::to_value(value) {
                Ok(value) => Self {
                    ok: true,
                    result: Some(value),
                    error: None,
                },
                Err(e) => Self::failure(&EngineError::internal(e.to_string())),
            },
            Err(e) => Self::failure(&e),
        }
    }

    fn failure(error: &EngineError) -> Self {
        Self {
            ok: false,
            result: None,
            error: Some(error.to_response()),
        }
    }

    fn emit(&self) {
        match serde_json::to_string(self) {
            Ok(line) => println!("{line}"),
            Err(e) => tracing::error!(error = %e, "Failed to serialize reply"),
        }
    }
}

struct Engine {
    facade: Arc<TradingFacade>,
    market: Arc<InMemoryMarketData>,
}

impl Engine {
    fn handle(&self, command: Command) {
        let facade = &self.facade;
        let reply = match command {
            Command::PlaceOrder(spec) => Reply::from_result(facade.place_order(spec)),
            Command::CancelOrder { order_id, owner } => {
                Reply::from_result(facade.cancel_order(&order_id, &owner))
            }
            Command::GetOrder { order_id } => Reply::from_result(facade.get_order(&order_id)),
            Command::ListOrders { owner, status } => {
                Reply::from_result(Ok(facade.list_orders(&owner, status)))
            }
            Command::ListTrades { owner } => Reply::from_result(Ok(facade.list_trades(&owner))),
            Command::ExecuteAlgo { strategy, params } => {
                Reply::from_result(facade.execute_algo(&strategy, params))
            }
            Command::StrategySummary { strategy_id } => {
                Reply::from_result(facade.strategy_summary(&strategy_id))
            }
            Command::AwaitStrategy { strategy_id } => {
                let facade = Arc::clone(facade);
                tokio::spawn(async move {
                    Reply::from_result(facade.await_strategy(&strategy_id).await).emit();
                });
                return;
            }
            Command::CancelStrategy { strategy_id, owner } => {
                Reply::from_result(facade.cancel_strategy(&strategy_id, &owner))
            }
            Command::MarketData { symbol } => {
                Reply::from_result(facade.get_market_data(symbol.as_ref()))
            }
            Command::OrderBook { symbol, depth } => {
                Reply::from_result(facade.get_order_book(&symbol, depth))
            }
            Command::Statistics { owner } => {
                Reply::from_result(facade.get_trading_statistics(&owner))
            }
            Command::SetPrice { symbol, price } => {
                let result = self
                    .market
                    .reprice(&symbol, price, Utc::now())
                    .map_err(EngineError::from)
                    .and_then(|()| facade.reevaluate(&symbol));
                Reply::from_result(result.map(|fills| serde_json::json!({ "fills": fills })))
            }
            Command::SetAvailability { symbol, available } => {
                self.market.set_unavailable(&symbol, !available);
                Reply::from_result(self.market.snapshot(&symbol).map_err(EngineError::from))
            }
        };
        reply.emit();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = read_config()?;
    init_tracing(&config.observability.logging)?;

    tracing::info!(
        instruments = config.market.instruments.len(),
        maker_rate = %config.fees.maker_rate,
        taker_rate = %config.fees.taker_rate,
        "Starting order engine"
    );

    let market = Arc::new(InMemoryMarketData::seeded(
        config.seed_instruments(),
        Utc::now(),
    ));
    let facade = Arc::new(TradingFacade::new(
        config.engine_settings(),
        Arc::new(InMemoryOrderStore::new()),
        Arc::new(InMemoryTradeStore::new()),
        Arc::clone(&market) as Arc<dyn MarketDataPort>,
        Arc::new(SystemClock),
    ));

    let shutdown = CancellationToken::new();
    let housekeeping = spawn_housekeeping(
        Arc::clone(&facade),
        Duration::from_millis(config.engine.housekeeping_interval_ms),
        shutdown.clone(),
    );

    let engine = Engine { facade, market };
    tokio::select! {
        result = command_loop(&engine) => result?,
        result = tokio::signal::ctrl_c() => {
            result.context("failed to listen for Ctrl+C")?;
            tracing::info!("Received Ctrl+C, shutting down");
        }
    }

    shutdown.cancel();
    if let Err(e) = housekeeping.await {
        tracing::warn!(error = %e, "Housekeeping task ended abnormally");
    }
    tracing::info!("Order engine stopped");
    Ok(())
}

fn read_config() -> anyhow::Result<Config> {
    if let Ok(path) = std::env::var("ORDER_ENGINE_CONFIG") {
        return load_config(Some(&path)).with_context(|| format!("loading {path}"));
    }
    if Path::new("config.yaml").exists() {
        return load_config(None).context("loading config.yaml");
    }
    Ok(Config::default())
}

/// Read commands until EOF.
async fn command_loop(engine: &Engine) -> anyhow::Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("reading stdin")? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match serde_json::from_str::<Command>(line) {
            Ok(command) => engine.handle(command),
            Err(e) => {
                tracing::warn!(error = %e, "Malformed command");
                Reply::failure(&EngineError::new(
                    order_engine::ErrorCode::InvalidRequest,
                    format!("malformed command: {e}"),
                ))
                .emit();
            }
        }
    }
    tracing::info!("stdin closed");
    Ok(())
}

/// Expire due DAY orders and re-evaluate resting orders on an interval.
fn spawn_housekeeping(
    facade: Arc<TradingFacade>,
    interval: Duration,
    shutdown: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            tokio::select! {
                () = shutdown.cancelled() => break,
                _ = ticker.tick() => {
                    let (expired, fills) = facade.housekeeping();
                    if expired > 0 || fills > 0 {
                        tracing::debug!(expired, fills, "Housekeeping pass");
                    }
                }
            }
        }
    })
}
