// Allow unwrap/expect in tests - tests should panic on unexpected errors
// Allow test-specific patterns and pedantic lints in test code
#![cfg_attr(
    test,
    allow(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::significant_drop_tightening,
        clippy::too_many_lines,
        clippy::needless_pass_by_value,
        clippy::needless_collect,
        clippy::default_trait_access,
        clippy::items_after_statements
    )
)]

//! Order Engine - Rust Core Library
//!
//! Order lifecycle and algorithmic execution engine for a simulated
//! exchange.
//!
//! # Architecture (Clean Architecture + DDD + Hexagonal)
//!
//! ## Layers (inside → outside)
//!
//! - **Domain**: Core business logic
//!   - `order_execution`: Order aggregate, validation, matching, fees, state machine
//!   - `execution_tactics`: TWAP and VWAP slicing, retry policy
//!   - `market_data`: Snapshots and order books
//!
//! - **Application**: Orchestration
//!   - `ports`: `MarketDataPort`, `Clock`
//!   - `services`: lifecycle manager, algorithmic scheduler, trading facade
//!   - `dto`: Views returned to callers
//!
//! - **Infrastructure**: Adapters
//!   - `persistence`: In-memory order and trade stores
//!   - `market_data`: In-memory snapshot source with synthetic books
//!   - `clock`: System and manual clocks

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]

// =============================================================================
// Clean Architecture Layers
// =============================================================================

/// Domain layer - Core business logic with no external dependencies.
pub mod domain;

/// Application layer - Services and port definitions.
pub mod application;

/// Infrastructure layer - Adapters.
pub mod infrastructure;

/// Configuration loading and validation.
pub mod config;

/// Engine error codes and responses.
pub mod error;

/// Tracing subscriber setup.
pub mod telemetry;

// =============================================================================
// Re-exports
// =============================================================================

pub use application::{
    AlgoParams, EngineSettings, OrderView, PlaceOrderResponse, StrategySummary, TradingFacade,
    TradingStatistics,
};
pub use domain::order_execution::value_objects::{
    OrderSide, OrderSpec, OrderStatus, OrderType, TimeInForce,
};
pub use domain::shared::{OrderId, OwnerId, StrategyId, Symbol};
pub use error::{EngineError, EngineResult, ErrorCode};
