//! VWAP Executor Domain Service

use rust_decimal::Decimal;
use std::time::Duration;

use crate::domain::execution_tactics::errors::TacticError;
use crate::domain::execution_tactics::value_objects::{VolumeProfile, VwapSlice};

/// VWAP executor for volume-weighted allocation.
///
/// Each bucket is offered `min(total * weight, remaining)`. Only placed
/// quantity reduces `remaining`, so the running sum of placed allocations
/// never exceeds the total and allocation stops once it is exhausted.
#[derive(Debug, Clone)]
pub struct VwapExecutor {
    total_qty: Decimal,
    remaining_qty: Decimal,
    slices: Vec<VwapSlice>,
}

impl VwapExecutor {
    /// Plan a VWAP run with buckets `bucket_interval` apart.
    ///
    /// # Errors
    ///
    /// Returns error if the profile is invalid or the quantity is not positive.
    pub fn new(
        total_qty: Decimal,
        profile: &VolumeProfile,
        bucket_interval: Duration,
    ) -> Result<Self, TacticError> {
        profile.validate()?;
        if total_qty <= Decimal::ZERO {
            return Err(TacticError::InvalidSliceQuantity {
                quantity: total_qty.to_string(),
            });
        }
        let slices = profile
            .buckets()
            .iter()
            .enumerate()
            .map(|(index, bucket)| VwapSlice {
                index,
                label: bucket.label.clone(),
                weight: bucket.weight,
                offset: bucket_interval * index as u32,
            })
            .collect();

        Ok(Self {
            total_qty,
            remaining_qty: total_qty,
            slices,
        })
    }

    /// Planned bucket slots.
    #[must_use]
    pub fn slices(&self) -> &[VwapSlice] {
        &self.slices
    }

    /// Quantity to offer a bucket of `weight` right now.
    ///
    /// Zero when the parent is exhausted or the weight is zero.
    #[must_use]
    pub fn allocation_for(&self, weight: Decimal) -> Decimal {
        self.total_qty
            .saturating_mul(weight)
            .min(self.remaining_qty)
            .max(Decimal::ZERO)
    }

    /// Record a successfully placed allocation.
    ///
    /// # Errors
    ///
    /// Returns error if `quantity` exceeds what remains.
    pub fn record_placed(&mut self, quantity: Decimal) -> Result<(), TacticError> {
        if quantity > self.remaining_qty || quantity < Decimal::ZERO {
            return Err(TacticError::InvalidSliceQuantity {
                quantity: quantity.to_string(),
            });
        }
        self.remaining_qty -= quantity;
        Ok(())
    }

    /// Check if nothing is left to place.
    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.remaining_qty <= Decimal::ZERO
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::execution_tactics::value_objects::VolumeBucket;
    use rust_decimal_macros::dec;

    #[test]
    fn allocates_by_weight() {
        let mut executor =
            VwapExecutor::new(dec!(100), &VolumeProfile::default(), Duration::from_secs(3600))
                .unwrap();
        assert_eq!(executor.slices().len(), 9);
        assert_eq!(executor.slices()[2].offset, Duration::from_secs(7200));

        let mut placed = Decimal::ZERO;
        for slice in executor.slices().to_vec() {
            let alloc = executor.allocation_for(slice.weight);
            executor.record_placed(alloc).unwrap();
            placed += alloc;
        }
        assert_eq!(placed, dec!(100));
        assert!(executor.is_exhausted());
    }

    #[test]
    fn unplaced_allocation_stays_available() {
        let profile = VolumeProfile::new(vec![
            VolumeBucket::new("a", dec!(0.5)),
            VolumeBucket::new("b", dec!(0.5)),
        ])
        .unwrap();
        let mut executor = VwapExecutor::new(dec!(10), &profile, Duration::from_secs(1)).unwrap();

        // Bucket a failed to place: nothing recorded, the full total remains.
        assert_eq!(executor.allocation_for(dec!(0.5)), dec!(5));
        assert_eq!(executor.allocation_for(Decimal::ONE), dec!(10));

        executor.record_placed(dec!(5)).unwrap();
        assert_eq!(executor.allocation_for(dec!(0.5)), dec!(5));
        assert!(!executor.is_exhausted());
    }

    #[test]
    fn allocation_capped_by_remaining() {
        let profile = VolumeProfile::new(vec![
            VolumeBucket::new("a", dec!(0.7)),
            VolumeBucket::new("b", dec!(0.3)),
        ])
        .unwrap();
        let mut executor = VwapExecutor::new(dec!(10), &profile, Duration::from_secs(1)).unwrap();
        executor.record_placed(dec!(8)).unwrap();
        assert_eq!(executor.allocation_for(dec!(0.3)), dec!(2));
        assert!(executor.record_placed(dec!(3)).is_err());
    }

    #[test]
    fn zero_weight_gets_nothing() {
        let profile = VolumeProfile::new(vec![
            VolumeBucket::new("a", dec!(0)),
            VolumeBucket::new("b", dec!(1)),
        ])
        .unwrap();
        let executor = VwapExecutor::new(dec!(10), &profile, Duration::from_secs(1)).unwrap();
        assert_eq!(executor.allocation_for(Decimal::ZERO), Decimal::ZERO);
    }
}
