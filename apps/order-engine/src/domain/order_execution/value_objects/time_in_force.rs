//! Time-in-force policy.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Time-in-force instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TimeInForce {
    /// Good-Till-Cancelled.
    #[default]
    #[serde(alias = "gtc")]
    Gtc,
    /// Immediate-Or-Cancel. Fills what it can on submission, cancels the rest.
    #[serde(alias = "ioc")]
    Ioc,
    /// Fill-Or-Kill. Fills entirely on submission or expires.
    #[serde(alias = "fok")]
    Fok,
    /// Valid until the end-of-day cutoff.
    #[serde(alias = "day")]
    Day,
}

impl TimeInForce {
    /// Returns true if the order resolves on its single submission evaluation.
    #[must_use]
    pub const fn is_immediate(&self) -> bool {
        matches!(self, Self::Ioc | Self::Fok)
    }

    /// Returns true if the order carries an expiry time.
    #[must_use]
    pub const fn has_expiry(&self) -> bool {
        matches!(self, Self::Day)
    }
}

impl fmt::Display for TimeInForce {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Gtc => write!(f, "GTC"),
            Self::Ioc => write!(f, "IOC"),
            Self::Fok => write!(f, "FOK"),
            Self::Day => write!(f, "DAY"),
        }
    }
}
