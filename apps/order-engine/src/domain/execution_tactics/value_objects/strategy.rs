//! Strategy kind and status.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::execution_tactics::errors::TacticError;

/// Algorithmic strategy kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StrategyKind {
    /// Time-weighted slices.
    Twap,
    /// Volume-weighted slices.
    Vwap,
    /// Linked limit + stop pair.
    Oco,
}

impl FromStr for StrategyKind {
    type Err = TacticError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "twap" => Ok(Self::Twap),
            "vwap" => Ok(Self::Vwap),
            "oco" => Ok(Self::Oco),
            _ => Err(TacticError::UnknownStrategy {
                name: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Twap => write!(f, "TWAP"),
            Self::Vwap => write!(f, "VWAP"),
            Self::Oco => write!(f, "OCO"),
        }
    }
}

/// Strategy run status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StrategyStatus {
    /// Slices still scheduled.
    Running,
    /// Every slice was attempted and placed.
    Completed,
    /// Cancelled by the owner; unfired slices never placed.
    Cancelled,
    /// At least one slice could not be placed after retries.
    Degraded,
}

impl StrategyStatus {
    /// Returns true once no further slices will be placed.
    #[must_use]
    pub const fn is_finished(&self) -> bool {
        !matches!(self, Self::Running)
    }
}

impl fmt::Display for StrategyStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Running => write!(f, "RUNNING"),
            Self::Completed => write!(f, "COMPLETED"),
            Self::Cancelled => write!(f, "CANCELLED"),
            Self::Degraded => write!(f, "DEGRADED"),
        }
    }
}
