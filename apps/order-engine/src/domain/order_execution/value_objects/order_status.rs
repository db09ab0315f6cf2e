//! Order status in the lifecycle.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Order lifecycle status.
///
/// `Filled`, `Cancelled`, `Rejected` and `Expired` are terminal and are
/// retained for audit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    /// Admitted, no fills yet.
    Pending,
    /// At least one fill, quantity remaining.
    PartiallyFilled,
    /// Completely filled.
    Filled,
    /// Cancelled by the owner, an OCO sibling, or an IOC remainder.
    Cancelled,
    /// Failed validation. Only ever a rejection record.
    Rejected,
    /// Reached its DAY cutoff, or an IOC/FOK that could not fill.
    Expired,
}

impl OrderStatus {
    /// Returns true if the order is in a terminal state.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Filled | Self::Cancelled | Self::Rejected | Self::Expired
        )
    }

    /// Returns true if the order is still working (can be filled or cancelled).
    #[must_use]
    pub const fn is_open(&self) -> bool {
        matches!(self, Self::Pending | Self::PartiallyFilled)
    }

    /// Returns true if the order can receive fills.
    #[must_use]
    pub const fn can_fill(&self) -> bool {
        self.is_open()
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "PENDING"),
            Self::PartiallyFilled => write!(f, "PARTIALLY_FILLED"),
            Self::Filled => write!(f, "FILLED"),
            Self::Cancelled => write!(f, "CANCELLED"),
            Self::Rejected => write!(f, "REJECTED"),
            Self::Expired => write!(f, "EXPIRED"),
        }
    }
}
