//! Execution Tactics Value Objects

mod retry_policy;
mod slices;
mod strategy;
mod twap_config;
mod volume_profile;

pub use retry_policy::{ExponentialBackoffCalculator, SliceRetryPolicy};
pub use slices::{TwapSlice, VwapSlice};
pub use strategy::{StrategyKind, StrategyStatus};
pub use twap_config::TwapConfig;
pub use volume_profile::{VolumeBucket, VolumeProfile};
