//! Algorithmic scheduler configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::application::SchedulerSettings;
use crate::domain::execution_tactics::{SliceRetryPolicy, VolumeProfile};

/// Scheduler settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Upper bound on TWAP slices.
    #[serde(default = "default_twap_max_slices")]
    pub twap_max_slices: u32,
    /// Seconds between VWAP buckets.
    #[serde(default = "default_vwap_bucket_interval_seconds")]
    pub vwap_bucket_interval_seconds: u64,
    /// Default VWAP volume profile.
    #[serde(default)]
    pub volume_profile: VolumeProfile,
    /// Retry policy for transient slice failures.
    #[serde(default)]
    pub retry: SliceRetryPolicy,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            twap_max_slices: default_twap_max_slices(),
            vwap_bucket_interval_seconds: default_vwap_bucket_interval_seconds(),
            volume_profile: VolumeProfile::default(),
            retry: SliceRetryPolicy::default(),
        }
    }
}

impl SchedulerConfig {
    /// Convert to scheduler settings.
    #[must_use]
    pub fn to_settings(&self) -> SchedulerSettings {
        SchedulerSettings {
            twap_max_slices: self.twap_max_slices,
            vwap_bucket_interval: Duration::from_secs(self.vwap_bucket_interval_seconds),
            default_profile: self.volume_profile.clone(),
            retry: self.retry.clone(),
        }
    }
}

const fn default_twap_max_slices() -> u32 {
    20
}

const fn default_vwap_bucket_interval_seconds() -> u64 {
    3600
}
