//! Order State Machine Service
//!
//! Validates lifecycle transitions.
//!
//! ```text
//! PENDING ──► PARTIALLY_FILLED ──► FILLED
//!    │               │
//!    ├──► FILLED     ├──► CANCELLED
//!    ├──► CANCELLED  └──► EXPIRED
//!    ├──► EXPIRED
//!    └──► REJECTED   (rejection records only)
//! ```

use crate::domain::order_execution::errors::OrderError;
use crate::domain::order_execution::value_objects::OrderStatus;

/// Order State Machine for validating transitions.
pub struct OrderStateMachine;

impl OrderStateMachine {
    /// Check if a state transition is valid.
    #[must_use]
    pub const fn is_valid_transition(from: OrderStatus, to: OrderStatus) -> bool {
        matches!(
            (from, to),
            // From Pending
            (OrderStatus::Pending, OrderStatus::PartiallyFilled)
                | (OrderStatus::Pending, OrderStatus::Filled)
                | (OrderStatus::Pending, OrderStatus::Cancelled)
                | (OrderStatus::Pending, OrderStatus::Rejected)
                | (OrderStatus::Pending, OrderStatus::Expired)
                // From PartiallyFilled
                | (OrderStatus::PartiallyFilled, OrderStatus::PartiallyFilled)
                | (OrderStatus::PartiallyFilled, OrderStatus::Filled)
                | (OrderStatus::PartiallyFilled, OrderStatus::Cancelled)
                | (OrderStatus::PartiallyFilled, OrderStatus::Expired)
        )
    }

    /// Validate a state transition.
    ///
    /// # Errors
    ///
    /// Returns error if the transition is invalid.
    pub fn validate_transition(from: OrderStatus, to: OrderStatus) -> Result<(), OrderError> {
        if Self::is_valid_transition(from, to) {
            Ok(())
        } else {
            Err(OrderError::InvalidStateTransition {
                from,
                to,
                reason: Self::transition_error_reason(from, to),
            })
        }
    }

    /// Get a human-readable reason for an invalid transition.
    #[must_use]
    pub fn transition_error_reason(from: OrderStatus, to: OrderStatus) -> String {
        match from {
            OrderStatus::Filled => format!("Order is already filled, cannot transition to {to}"),
            OrderStatus::Cancelled => format!("Order is cancelled, cannot transition to {to}"),
            OrderStatus::Rejected => format!("Order was rejected, cannot transition to {to}"),
            OrderStatus::Expired => format!("Order has expired, cannot transition to {to}"),
            _ => format!("Invalid transition from {from} to {to}"),
        }
    }

    /// Get all valid next states from a given state.
    #[must_use]
    pub fn valid_next_states(from: OrderStatus) -> Vec<OrderStatus> {
        match from {
            OrderStatus::Pending => vec![
                OrderStatus::PartiallyFilled,
                OrderStatus::Filled,
                OrderStatus::Cancelled,
                OrderStatus::Rejected,
                OrderStatus::Expired,
            ],
            OrderStatus::PartiallyFilled => vec![
                OrderStatus::PartiallyFilled,
                OrderStatus::Filled,
                OrderStatus::Cancelled,
                OrderStatus::Expired,
            ],
            // Terminal states
            OrderStatus::Filled
            | OrderStatus::Cancelled
            | OrderStatus::Rejected
            | OrderStatus::Expired => vec![],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [OrderStatus; 6] = [
        OrderStatus::Pending,
        OrderStatus::PartiallyFilled,
        OrderStatus::Filled,
        OrderStatus::Cancelled,
        OrderStatus::Rejected,
        OrderStatus::Expired,
    ];

    #[test]
    fn pending_transitions() {
        assert!(OrderStateMachine::is_valid_transition(
            OrderStatus::Pending,
            OrderStatus::Filled
        ));
        assert!(OrderStateMachine::is_valid_transition(
            OrderStatus::Pending,
            OrderStatus::Expired
        ));
    }

    #[test]
    fn partial_cannot_be_rejected() {
        assert!(!OrderStateMachine::is_valid_transition(
            OrderStatus::PartiallyFilled,
            OrderStatus::Rejected
        ));
        assert!(!OrderStateMachine::is_valid_transition(
            OrderStatus::PartiallyFilled,
            OrderStatus::Pending
        ));
    }

    #[test]
    fn terminal_states_have_no_exits() {
        for from in ALL.iter().filter(|s| s.is_terminal()) {
            assert!(OrderStateMachine::valid_next_states(*from).is_empty());
            for to in ALL {
                assert!(OrderStateMachine::validate_transition(*from, to).is_err());
            }
        }
    }

    #[test]
    fn next_states_agree_with_table() {
        for from in ALL {
            for to in ALL {
                assert_eq!(
                    OrderStateMachine::valid_next_states(from).contains(&to),
                    OrderStateMachine::is_valid_transition(from, to),
                    "{from} -> {to}"
                );
            }
        }
    }

    #[test]
    fn error_reason_for_filled() {
        let err =
            OrderStateMachine::validate_transition(OrderStatus::Filled, OrderStatus::Cancelled)
                .unwrap_err();
        assert!(err.to_string().contains("already filled"));
    }
}
