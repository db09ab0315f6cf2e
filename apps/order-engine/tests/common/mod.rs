//! Shared wiring for integration tests.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, TimeZone, Utc};
use order_engine::application::ports::{Clock, MarketDataPort};
use order_engine::application::services::SchedulerSettings;
use order_engine::domain::execution_tactics::SliceRetryPolicy;
use order_engine::domain::market_data::MarketSnapshot;
use order_engine::infrastructure::{
    InMemoryMarketData, InMemoryOrderStore, InMemoryTradeStore, ManualClock,
};
use order_engine::{EngineSettings, Symbol, TradingFacade};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

pub const ETH: &str = "ETH/DGD";
pub const BTC: &str = "BTC/DGD";

/// A facade over in-memory adapters plus handles to drive them.
pub struct Harness {
    pub facade: Arc<TradingFacade>,
    pub market: Arc<InMemoryMarketData>,
    pub clock: Arc<ManualClock>,
}

pub fn start_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 2, 12, 0, 0).unwrap()
}

/// Scheduler tuned for paused-time tests: one-minute VWAP buckets and
/// jitter-free retries.
pub fn test_settings() -> EngineSettings {
    EngineSettings {
        scheduler: SchedulerSettings {
            vwap_bucket_interval: Duration::from_secs(60),
            retry: SliceRetryPolicy {
                max_attempts: 2,
                initial_backoff_ms: 250,
                max_backoff_ms: 1_000,
                backoff_multiplier: 2.0,
                jitter_factor: 0.0,
            },
            ..SchedulerSettings::default()
        },
        ..EngineSettings::default()
    }
}

pub fn harness() -> Harness {
    harness_with(test_settings())
}

pub fn harness_with(settings: EngineSettings) -> Harness {
    let market = Arc::new(InMemoryMarketData::new());
    let clock = Arc::new(ManualClock::new(start_time()));
    let facade = Arc::new(TradingFacade::new(
        settings,
        Arc::new(InMemoryOrderStore::new()),
        Arc::new(InMemoryTradeStore::new()),
        Arc::clone(&market) as Arc<dyn MarketDataPort>,
        Arc::clone(&clock) as Arc<dyn Clock>,
    ));
    let harness = Harness {
        facade,
        market,
        clock,
    };
    harness.quote(ETH, dec!(22.2), dec!(22.3));
    harness.quote(BTC, dec!(45000), dec!(45010));
    harness
}

impl Harness {
    /// Publish a quote with `last` at the mid.
    pub fn quote(&self, symbol: &str, bid: Decimal, ask: Decimal) {
        self.market.update(MarketSnapshot::new(
            Symbol::new(symbol),
            bid,
            ask,
            (bid + ask) / dec!(2),
            self.clock.now(),
        ));
    }

    /// Publish a quote with top-of-book sizes.
    pub fn quote_sized(&self, symbol: &str, bid: Decimal, ask: Decimal, size: Decimal) {
        self.market.update(
            MarketSnapshot::new(
                Symbol::new(symbol),
                bid,
                ask,
                (bid + ask) / dec!(2),
                self.clock.now(),
            )
            .with_sizes(size, size),
        );
    }

    /// Publish a quote and re-evaluate resting orders on it.
    pub fn move_market(&self, symbol: &str, bid: Decimal, ask: Decimal) -> usize {
        self.quote(symbol, bid, ask);
        self.facade
            .reevaluate(&Symbol::new(symbol))
            .unwrap_or_else(|e| panic!("reevaluate {symbol}: {e}"))
    }
}
