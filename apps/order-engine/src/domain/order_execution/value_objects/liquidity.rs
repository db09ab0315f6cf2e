//! Liquidity side of a fill.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Whether a fill added or removed liquidity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LiquiditySide {
    /// Resting order matched later.
    Maker,
    /// Fill produced on submission or by a triggered stop.
    Taker,
}

impl fmt::Display for LiquiditySide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Maker => write!(f, "MAKER"),
            Self::Taker => write!(f, "TAKER"),
        }
    }
}
