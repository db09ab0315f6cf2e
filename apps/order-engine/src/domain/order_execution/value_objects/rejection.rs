//! Rejection taxonomy for order specifications.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Why an order specification was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RejectionCode {
    /// Symbol not listed by the market data source.
    UnknownSymbol,
    /// Quantity (or iceberg visible quantity) out of range.
    InvalidQuantity,
    /// Limit-like order without a positive price.
    MissingPrice,
    /// Stop-like order without a positive stop price.
    MissingStopPrice,
    /// Trailing stop without a usable trail amount or percent.
    MissingTrailParams,
}

impl RejectionCode {
    /// Stable machine-readable reason string.
    #[must_use]
    pub const fn reason(&self) -> &'static str {
        match self {
            Self::UnknownSymbol => "UNKNOWN_SYMBOL",
            Self::InvalidQuantity => "INVALID_QUANTITY",
            Self::MissingPrice => "MISSING_PRICE",
            Self::MissingStopPrice => "MISSING_STOP_PRICE",
            Self::MissingTrailParams => "MISSING_TRAIL_PARAMS",
        }
    }
}

impl fmt::Display for RejectionCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.reason())
    }
}

/// A rejection: taxonomy code plus human-readable detail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rejection {
    /// Taxonomy code.
    pub code: RejectionCode,
    /// Detail message.
    pub message: String,
}

impl Rejection {
    /// Create a new rejection.
    #[must_use]
    pub fn new(code: RejectionCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}
