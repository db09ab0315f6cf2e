//! Slice retry policy with exponential backoff.
//!
//! A slice whose placement fails transiently (market data unavailable) is
//! retried after `initial * multiplier^attempt` milliseconds, capped and
//! jittered. When attempts run out the slice is recorded as failed.

use std::time::Duration;

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Retry policy for unplaced slices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SliceRetryPolicy {
    /// Maximum number of retries after the first attempt (default: 3).
    pub max_attempts: u32,
    /// Initial backoff in milliseconds (default: 250).
    pub initial_backoff_ms: u64,
    /// Maximum backoff in milliseconds (default: 10s).
    pub max_backoff_ms: u64,
    /// Backoff multiplier for exponential growth (default: 2.0).
    pub backoff_multiplier: f64,
    /// Jitter factor for randomization (default: 0.2 = ±20%).
    pub jitter_factor: f64,
}

impl Default for SliceRetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff_ms: 250,
            max_backoff_ms: 10_000,
            backoff_multiplier: 2.0,
            jitter_factor: 0.2,
        }
    }
}

impl SliceRetryPolicy {
    /// Policy that never retries.
    #[must_use]
    pub fn no_retry() -> Self {
        Self {
            max_attempts: 0,
            ..Self::default()
        }
    }

    /// Fresh backoff calculator for one slice.
    #[must_use]
    pub fn backoff(&self) -> ExponentialBackoffCalculator {
        ExponentialBackoffCalculator::new(self)
    }
}

/// Calculator for exponential backoff with jitter.
#[derive(Debug)]
pub struct ExponentialBackoffCalculator {
    current_attempt: u32,
    max_attempts: u32,
    initial_backoff_ms: u64,
    max_backoff_ms: u64,
    backoff_multiplier: f64,
    jitter_factor: f64,
}

impl ExponentialBackoffCalculator {
    /// Create a new backoff calculator from a retry policy.
    #[must_use]
    pub const fn new(policy: &SliceRetryPolicy) -> Self {
        Self {
            current_attempt: 0,
            max_attempts: policy.max_attempts,
            initial_backoff_ms: policy.initial_backoff_ms,
            max_backoff_ms: policy.max_backoff_ms,
            backoff_multiplier: policy.backoff_multiplier,
            jitter_factor: policy.jitter_factor,
        }
    }

    /// Get the next backoff duration with jitter.
    ///
    /// Returns `None` if max attempts exceeded.
    pub fn next_backoff(&mut self) -> Option<Duration> {
        if self.current_attempt >= self.max_attempts {
            return None;
        }

        let base_backoff_ms = self.calculate_base_backoff_ms();
        let jittered_ms = self.apply_jitter(base_backoff_ms);
        let capped_ms = jittered_ms.min(self.max_backoff_ms);

        self.current_attempt += 1;

        Some(Duration::from_millis(capped_ms))
    }

    fn calculate_base_backoff_ms(&self) -> u64 {
        let multiplier = self.backoff_multiplier.powi(self.current_attempt as i32);
        let backoff = (self.initial_backoff_ms as f64 * multiplier) as u64;
        backoff.min(self.max_backoff_ms)
    }

    /// Random value in `[backoff * (1 - jitter), backoff * (1 + jitter)]`.
    fn apply_jitter(&self, backoff_ms: u64) -> u64 {
        let jitter_range = backoff_ms as f64 * self.jitter_factor;
        if jitter_range <= 0.0 {
            return backoff_ms;
        }
        let min = (backoff_ms as f64 - jitter_range).max(0.0);
        let max = backoff_ms as f64 + jitter_range;
        rand::rng().random_range(min..=max) as u64
    }

    /// Retries consumed so far.
    #[must_use]
    pub const fn current_attempt(&self) -> u32 {
        self.current_attempt
    }

    /// Check if more retries are available.
    #[must_use]
    pub const fn has_remaining_attempts(&self) -> bool {
        self.current_attempt < self.max_attempts
    }
}
