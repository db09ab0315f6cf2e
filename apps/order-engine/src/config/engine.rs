//! Engine runtime configuration.

use serde::{Deserialize, Serialize};

/// Background task settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Interval between expiry and re-evaluation passes.
    #[serde(default = "default_housekeeping_interval_ms")]
    pub housekeeping_interval_ms: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            housekeeping_interval_ms: default_housekeeping_interval_ms(),
        }
    }
}

const fn default_housekeeping_interval_ms() -> u64 {
    1000
}
