//! Execution Tactics Domain Services
//!
//! - **TWAP**: equal time-spaced slices, last slice absorbs rounding
//! - **VWAP**: quantity allocated per volume bucket, capped by what is left

mod twap_executor;
mod vwap_executor;

pub use twap_executor::TwapExecutor;
pub use vwap_executor::VwapExecutor;
