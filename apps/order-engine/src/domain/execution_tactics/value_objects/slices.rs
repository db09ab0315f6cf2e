//! Execution Slice Value Objects

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// A single TWAP execution slice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TwapSlice {
    /// Slice number (0-indexed).
    pub index: usize,
    /// Quantity for this slice.
    pub quantity: Decimal,
    /// Delay from strategy start.
    pub offset: Duration,
}

impl TwapSlice {
    /// Create a new TWAP slice.
    #[must_use]
    pub const fn new(index: usize, quantity: Decimal, offset: Duration) -> Self {
        Self {
            index,
            quantity,
            offset,
        }
    }
}

/// A single VWAP volume bucket slot.
///
/// The quantity is decided when the slot fires, from the quantity still
/// unplaced at that moment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VwapSlice {
    /// Slice number (0-indexed).
    pub index: usize,
    /// Bucket label, e.g. `09:00-10:00`.
    pub label: String,
    /// Volume weight of the bucket.
    pub weight: Decimal,
    /// Delay from strategy start.
    pub offset: Duration,
}
