//! TWAP Executor Domain Service

use rust_decimal::Decimal;

use crate::domain::execution_tactics::errors::TacticError;
use crate::domain::execution_tactics::value_objects::{TwapConfig, TwapSlice};

/// TWAP executor for time-weighted average price execution.
///
/// Splits a parent quantity into `min(duration, cap)` slices spaced evenly
/// across the window. The first slice is due immediately.
#[derive(Debug, Clone)]
pub struct TwapExecutor {
    slices: Vec<TwapSlice>,
    next_index: usize,
}

impl TwapExecutor {
    /// Plan a TWAP run.
    ///
    /// # Errors
    ///
    /// Returns error if the configuration is invalid or the quantity is too
    /// small to slice.
    pub fn new(total_qty: Decimal, config: TwapConfig) -> Result<Self, TacticError> {
        if total_qty <= Decimal::ZERO {
            return Err(TacticError::InvalidSliceQuantity {
                quantity: total_qty.to_string(),
            });
        }
        let interval = config.slice_interval();
        let slices = config
            .calculate_slice_quantities(total_qty)?
            .into_iter()
            .enumerate()
            .map(|(i, quantity)| TwapSlice::new(i, quantity, interval * i as u32))
            .collect();

        Ok(Self {
            slices,
            next_index: 0,
        })
    }

    /// Hand out the next slice, if any remain.
    pub fn next_slice(&mut self) -> Option<TwapSlice> {
        let slice = self.slices.get(self.next_index).cloned()?;
        self.next_index += 1;
        Some(slice)
    }

    /// Number of planned slices.
    #[must_use]
    pub fn slice_count(&self) -> usize {
        self.slices.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::time::Duration;

    fn drain(mut executor: TwapExecutor) -> Vec<TwapSlice> {
        std::iter::from_fn(|| executor.next_slice()).collect()
    }

    #[test]
    fn twap_plan_ten_minutes() {
        let executor = TwapExecutor::new(dec!(0.5), TwapConfig::new(10, 20)).unwrap();
        assert_eq!(executor.slice_count(), 10);
        let slices = drain(executor);
        assert_eq!(slices[0].offset, Duration::ZERO);
        assert_eq!(slices[1].offset, Duration::from_secs(60));
        assert_eq!(slices[9].offset, Duration::from_secs(540));
        let total: Decimal = slices.iter().map(|s| s.quantity).sum();
        assert_eq!(total, dec!(0.5));
    }

    #[test]
    fn twap_plan_is_capped() {
        let executor = TwapExecutor::new(dec!(1), TwapConfig::new(120, 20)).unwrap();
        assert_eq!(executor.slice_count(), 20);
        assert_eq!(drain(executor)[1].offset, Duration::from_secs(360));
    }

    #[test]
    fn twap_next_slice_sequence() {
        let mut executor = TwapExecutor::new(dec!(3), TwapConfig::new(3, 20)).unwrap();
        assert_eq!(executor.next_slice().map(|s| s.index), Some(0));
        assert_eq!(executor.next_slice().map(|s| s.index), Some(1));
        assert_eq!(executor.next_slice().map(|s| s.index), Some(2));
        assert!(executor.next_slice().is_none());
    }

    #[test]
    fn twap_rejects_non_positive_quantity() {
        assert!(TwapExecutor::new(Decimal::ZERO, TwapConfig::default()).is_err());
    }
}
