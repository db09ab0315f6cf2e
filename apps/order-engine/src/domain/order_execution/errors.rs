//! Order execution errors.

use std::fmt;

use super::value_objects::OrderStatus;

/// Errors that can occur in order execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderError {
    /// Invalid state transition attempted.
    InvalidStateTransition {
        /// Current order status.
        from: OrderStatus,
        /// Attempted status.
        to: OrderStatus,
        /// Reason for failure.
        reason: String,
    },

    /// Order cannot be filled in current state.
    CannotFill {
        /// Current status.
        status: OrderStatus,
    },

    /// Order cannot be cancelled in current state.
    CannotCancel {
        /// Current status.
        status: OrderStatus,
    },

    /// Fill quantity exceeds remaining quantity, or is not positive.
    InvalidFill {
        /// Fill quantity attempted.
        fill_qty: String,
        /// Remaining quantity.
        remaining_qty: String,
    },

    /// Fill amounts left the representable decimal range.
    ArithmeticOverflow {
        /// What was being computed.
        context: String,
    },

    /// Order not found.
    NotFound {
        /// Order ID.
        order_id: String,
    },

    /// Duplicate order ID.
    DuplicateOrderId {
        /// Order ID.
        order_id: String,
    },
}

impl OrderError {
    /// Returns true if the error means the order was already terminal.
    ///
    /// The lifecycle manager reports these to callers as a conflict.
    #[must_use]
    pub const fn is_terminal_conflict(&self) -> bool {
        match self {
            Self::CannotFill { status } | Self::CannotCancel { status } => status.is_terminal(),
            Self::InvalidStateTransition { from, .. } => from.is_terminal(),
            _ => false,
        }
    }
}

impl fmt::Display for OrderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidStateTransition { from, to, reason } => {
                write!(
                    f,
                    "Invalid order state transition: {from} -> {to}: {reason}"
                )
            }
            Self::CannotFill { status } => {
                write!(f, "Cannot fill order in status: {status}")
            }
            Self::CannotCancel { status } => {
                write!(f, "Cannot cancel order in status: {status}")
            }
            Self::InvalidFill {
                fill_qty,
                remaining_qty,
            } => {
                write!(
                    f,
                    "Invalid fill quantity {fill_qty} (remaining {remaining_qty})"
                )
            }
            Self::ArithmeticOverflow { context } => {
                write!(f, "Arithmetic overflow computing {context}")
            }
            Self::NotFound { order_id } => {
                write!(f, "Order not found: {order_id}")
            }
            Self::DuplicateOrderId { order_id } => {
                write!(f, "Duplicate order ID: {order_id}")
            }
        }
    }
}

impl std::error::Error for OrderError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_error_invalid_state_transition_display() {
        let err = OrderError::InvalidStateTransition {
            from: OrderStatus::Filled,
            to: OrderStatus::Cancelled,
            reason: "Order is already filled".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Invalid order state transition: FILLED -> CANCELLED: Order is already filled"
        );
    }

    #[test]
    fn order_error_cannot_cancel_display() {
        let err = OrderError::CannotCancel {
            status: OrderStatus::Expired,
        };
        assert_eq!(err.to_string(), "Cannot cancel order in status: EXPIRED");
    }

    #[test]
    fn terminal_conflict_classification() {
        assert!(
            OrderError::CannotCancel {
                status: OrderStatus::Cancelled
            }
            .is_terminal_conflict()
        );
        assert!(
            !OrderError::NotFound {
                order_id: "x".to_string()
            }
            .is_terminal_conflict()
        );
        assert!(
            !OrderError::InvalidFill {
                fill_qty: "2".to_string(),
                remaining_qty: "1".to_string()
            }
            .is_terminal_conflict()
        );
    }
}
