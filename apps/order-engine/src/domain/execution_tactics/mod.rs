//! Execution Tactics Bounded Context
//!
//! Slicing plans for algorithmic strategies: TWAP schedules, VWAP volume
//! allocation, strategy bookkeeping types and the slice retry policy.

pub mod errors;
pub mod services;
pub mod value_objects;

pub use errors::TacticError;
pub use services::{TwapExecutor, VwapExecutor};
pub use value_objects::{
    ExponentialBackoffCalculator, SliceRetryPolicy, StrategyKind, StrategyStatus, TwapConfig,
    TwapSlice, VolumeBucket, VolumeProfile, VwapSlice,
};
