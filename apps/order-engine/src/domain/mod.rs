//! Domain Layer
//!
//! Pure business logic with no infrastructure dependencies.
//!
//! # Bounded Contexts
//!
//! - **Order Execution**: order lifecycle, validation, matching, fees
//! - **Execution Tactics**: TWAP/VWAP slicing and strategy bookkeeping
//! - **Market Data**: snapshots and depth views
//! - **Shared**: identifiers, symbols, common errors

pub mod execution_tactics;
pub mod market_data;
pub mod order_execution;
pub mod shared;
