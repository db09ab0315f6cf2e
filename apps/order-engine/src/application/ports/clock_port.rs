//! Clock Port
//!
//! Wall-clock time source, so tests can drive DAY expiry deterministically.

use chrono::{DateTime, Utc};

/// Source of the current time.
pub trait Clock: Send + Sync {
    /// Current UTC time.
    fn now(&self) -> DateTime<Utc>;
}
