//! Order admission configuration.

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

use crate::domain::order_execution::OrderValidator;

/// Order admission settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrdersConfig {
    /// UTC time at which DAY orders expire.
    #[serde(default = "default_day_cutoff")]
    pub day_cutoff: NaiveTime,
}

impl Default for OrdersConfig {
    fn default() -> Self {
        Self {
            day_cutoff: default_day_cutoff(),
        }
    }
}

fn default_day_cutoff() -> NaiveTime {
    OrderValidator::default().day_cutoff()
}
