//! TWAP Tactic Configuration

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::domain::execution_tactics::errors::TacticError;

/// Decimal places for slice quantities.
const SLICE_DP: u32 = 8;

/// Configuration for a TWAP run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TwapConfig {
    /// Total execution window (minutes).
    pub duration_minutes: u32,
    /// Upper bound on the number of slices.
    pub max_slices: u32,
}

impl Default for TwapConfig {
    fn default() -> Self {
        Self {
            duration_minutes: 60,
            max_slices: 20,
        }
    }
}

impl TwapConfig {
    /// Create a new TWAP configuration.
    #[must_use]
    pub const fn new(duration_minutes: u32, max_slices: u32) -> Self {
        Self {
            duration_minutes,
            max_slices,
        }
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns error if the duration or slice cap is zero.
    pub fn validate(&self) -> Result<(), TacticError> {
        if self.duration_minutes == 0 {
            return Err(TacticError::InvalidConfiguration {
                message: "duration_minutes must be positive".to_string(),
            });
        }
        if self.max_slices == 0 {
            return Err(TacticError::InvalidConfiguration {
                message: "max_slices must be positive".to_string(),
            });
        }
        Ok(())
    }

    /// Number of slices: `min(duration_minutes, max_slices)`.
    #[must_use]
    pub fn calculate_slice_count(&self) -> u32 {
        self.duration_minutes.min(self.max_slices)
    }

    /// Time between slices: `duration_minutes / slice_count` minutes.
    #[must_use]
    pub fn slice_interval(&self) -> Duration {
        let count = u64::from(self.calculate_slice_count().max(1));
        Duration::from_millis(u64::from(self.duration_minutes) * 60_000 / count)
    }

    /// Slice quantities summing exactly to `total_quantity`.
    ///
    /// Every slice but the last gets `total / n` truncated to 8 decimal
    /// places; the last slice takes the remainder.
    ///
    /// # Errors
    ///
    /// Returns error if the configuration is invalid or the per-slice
    /// quantity truncates to zero.
    pub fn calculate_slice_quantities(
        &self,
        total_quantity: Decimal,
    ) -> Result<Vec<Decimal>, TacticError> {
        self.validate()?;
        let count = self.calculate_slice_count();
        let base = (total_quantity / Decimal::from(count))
            .round_dp_with_strategy(SLICE_DP, RoundingStrategy::ToZero);
        if base <= Decimal::ZERO {
            return Err(TacticError::InvalidSliceQuantity {
                quantity: base.to_string(),
            });
        }

        let mut quantities = vec![base; count as usize];
        let allocated = base * Decimal::from(count - 1);
        if let Some(last) = quantities.last_mut() {
            *last = total_quantity - allocated;
        }
        Ok(quantities)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    #[test]
    fn twap_config_default() {
        let config = TwapConfig::default();
        assert_eq!(config.duration_minutes, 60);
        assert_eq!(config.max_slices, 20);
        assert_eq!(config.calculate_slice_count(), 20);
        assert_eq!(config.slice_interval(), Duration::from_secs(180));
    }

    #[test]
    fn slice_count_below_cap() {
        let config = TwapConfig::new(10, 20);
        assert_eq!(config.calculate_slice_count(), 10);
        assert_eq!(config.slice_interval(), Duration::from_secs(60));
    }

    #[test]
    fn fractional_interval() {
        let config = TwapConfig::new(30, 20);
        assert_eq!(config.slice_interval(), Duration::from_secs(90));
    }

    #[test]
    fn even_split() {
        let quantities = TwapConfig::new(10, 20)
            .calculate_slice_quantities(dec!(0.5))
            .unwrap();
        assert_eq!(quantities.len(), 10);
        assert!(quantities.iter().all(|q| *q == dec!(0.05)));
    }

    #[test]
    fn last_slice_absorbs_remainder() {
        let quantities = TwapConfig::new(3, 20)
            .calculate_slice_quantities(dec!(1))
            .unwrap();
        assert_eq!(
            quantities,
            vec![dec!(0.33333333), dec!(0.33333333), dec!(0.33333334)]
        );
    }

    #[test]
    fn zero_duration_is_invalid() {
        let err = TwapConfig::new(0, 20)
            .calculate_slice_quantities(dec!(1))
            .unwrap_err();
        assert!(matches!(err, TacticError::InvalidConfiguration { .. }));
    }

    #[test]
    fn dust_quantity_is_invalid() {
        let err = TwapConfig::new(20, 20)
            .calculate_slice_quantities(dec!(0.00000001))
            .unwrap_err();
        assert!(matches!(err, TacticError::InvalidSliceQuantity { .. }));
    }

    proptest! {
        #[test]
        fn slices_sum_to_total(duration in 1u32..500, cap in 1u32..50, units in 1u64..10_000_000_000) {
            let total = Decimal::new(units as i64, 6);
            let config = TwapConfig::new(duration, cap);
            if let Ok(quantities) = config.calculate_slice_quantities(total) {
                prop_assert_eq!(quantities.len() as u32, duration.min(cap));
                prop_assert_eq!(quantities.iter().copied().sum::<Decimal>(), total);
                prop_assert!(quantities.iter().all(|q| *q > Decimal::ZERO));
            }
        }
    }
}
