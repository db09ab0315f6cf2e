//! Cumulative fill tracking for an order.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::shared::DomainError;

/// Cumulative fill state.
///
/// Maintains `quantity = filled_quantity + remaining` with
/// `0 <= filled_quantity <= quantity`, and the volume-weighted average price
/// of all fills applied so far.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FillState {
    quantity: Decimal,
    filled_quantity: Decimal,
    average_fill_price: Decimal,
}

impl FillState {
    /// Create an unfilled state for `quantity`.
    #[must_use]
    pub const fn new(quantity: Decimal) -> Self {
        Self {
            quantity,
            filled_quantity: Decimal::ZERO,
            average_fill_price: Decimal::ZERO,
        }
    }

    /// Ordered quantity.
    #[must_use]
    pub const fn quantity(&self) -> Decimal {
        self.quantity
    }

    /// Cumulative filled quantity.
    #[must_use]
    pub const fn filled_quantity(&self) -> Decimal {
        self.filled_quantity
    }

    /// Quantity still open.
    #[must_use]
    pub fn remaining(&self) -> Decimal {
        self.quantity - self.filled_quantity
    }

    /// Volume-weighted average fill price (zero when unfilled).
    #[must_use]
    pub const fn average_fill_price(&self) -> Decimal {
        self.average_fill_price
    }

    /// Apply one fill. The state is unchanged on error.
    ///
    /// # Errors
    ///
    /// Returns error if the fill quantity is not positive, exceeds the
    /// remaining quantity, or the new average price cannot be represented.
    pub fn apply(&mut self, fill_qty: Decimal, fill_price: Decimal) -> Result<(), DomainError> {
        if fill_qty <= Decimal::ZERO {
            return Err(DomainError::InvalidValue {
                field: "fill_qty".to_string(),
                message: format!("must be positive, got {fill_qty}"),
            });
        }
        if fill_qty > self.remaining() {
            return Err(DomainError::InvariantViolation {
                aggregate: "FillState".to_string(),
                invariant: "fill_qty <= remaining".to_string(),
                state: format!("fill_qty={fill_qty}, remaining={}", self.remaining()),
            });
        }

        // new_avg = (old_avg * old_filled + price * qty) / new_filled
        let new_filled = self.filled_quantity + fill_qty;
        let average = self
            .average_fill_price
            .checked_mul(self.filled_quantity)
            .zip(fill_price.checked_mul(fill_qty))
            .and_then(|(old_value, fill_value)| old_value.checked_add(fill_value))
            .and_then(|value| value.checked_div(new_filled))
            .ok_or_else(|| DomainError::overflow("average fill price"))?;

        self.average_fill_price = average;
        self.filled_quantity = new_filled;
        debug_assert!(self.filled_quantity <= self.quantity);
        Ok(())
    }

    /// Returns true if nothing remains.
    #[must_use]
    pub fn is_filled(&self) -> bool {
        self.remaining() <= Decimal::ZERO
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    #[test]
    fn fill_state_weighted_average() {
        let mut state = FillState::new(dec!(3));
        state.apply(dec!(1), dec!(100)).unwrap();
        state.apply(dec!(2), dec!(103)).unwrap();

        assert_eq!(state.filled_quantity(), dec!(3));
        assert_eq!(state.average_fill_price(), dec!(102));
        assert!(state.is_filled());
    }

    #[test]
    fn fill_state_partial() {
        let mut state = FillState::new(dec!(10));
        state.apply(dec!(4), dec!(50)).unwrap();

        assert!(!state.is_filled());
        assert_eq!(state.remaining(), dec!(6));
        assert_eq!(state.average_fill_price(), dec!(50));
    }

    #[test]
    fn fill_state_rejects_overfill() {
        let mut state = FillState::new(dec!(1));
        let err = state.apply(dec!(1.5), dec!(10)).unwrap_err();
        assert!(matches!(err, DomainError::InvariantViolation { .. }));
        assert_eq!(state.filled_quantity(), Decimal::ZERO);
    }

    #[test]
    fn fill_state_rejects_zero_fill() {
        let mut state = FillState::new(dec!(1));
        assert!(state.apply(Decimal::ZERO, dec!(10)).is_err());
    }

    #[test]
    fn fill_state_overflow_leaves_state_untouched() {
        let quantity = Decimal::from_i128_with_scale(10_i128.pow(27), 0);
        let mut state = FillState::new(quantity);
        let err = state.apply(quantity, dec!(358.4)).unwrap_err();

        assert!(matches!(err, DomainError::Overflow { .. }));
        assert_eq!(state.filled_quantity(), Decimal::ZERO);
        assert_eq!(state.average_fill_price(), Decimal::ZERO);
    }

    proptest! {
        #[test]
        fn filled_never_exceeds_quantity(
            qty in 1u32..1_000,
            fills in proptest::collection::vec((1u32..500, 1u32..10_000), 0..20),
        ) {
            let mut state = FillState::new(Decimal::from(qty));
            for (fill_qty, price) in fills {
                let _ = state.apply(Decimal::from(fill_qty), Decimal::from(price));
                prop_assert!(state.filled_quantity() >= Decimal::ZERO);
                prop_assert!(state.filled_quantity() <= state.quantity());
            }
        }

        #[test]
        fn average_is_weighted_mean(a in 1u32..100, pa in 1u32..1_000, b in 1u32..100, pb in 1u32..1_000) {
            let (a, pa, b, pb) = (Decimal::from(a), Decimal::from(pa), Decimal::from(b), Decimal::from(pb));
            let mut state = FillState::new(a + b);
            state.apply(a, pa).unwrap();
            state.apply(b, pb).unwrap();
            let expected = (a * pa + b * pb) / (a + b);
            prop_assert_eq!(state.average_fill_price(), expected);
        }
    }
}
