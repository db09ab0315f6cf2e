//! Application Services
//!
//! Lifecycle management, parent-order scheduling, statistics and the
//! facade that composes them.

mod algo_scheduler;
mod lifecycle_manager;
mod reporting;
mod trading_facade;

pub use algo_scheduler::{AlgorithmicExecutionScheduler, SchedulerSettings};
pub use lifecycle_manager::{OrderLifecycleManager, Placement};
pub use reporting::{PositionLedger, compute_statistics};
pub use trading_facade::{EngineSettings, TradingFacade};
