//! Domain errors shared across bounded contexts.

use thiserror::Error;

/// Domain-level errors that can occur in business logic.
///
/// These errors are independent of infrastructure concerns.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    /// Invalid value for a field.
    #[error("Invalid value for '{field}': {message}")]
    InvalidValue {
        /// Field name.
        field: String,
        /// Error message.
        message: String,
    },

    /// Aggregate invariant violated.
    #[error("Invariant violation in {aggregate}: {invariant} (state: {state})")]
    InvariantViolation {
        /// Aggregate type.
        aggregate: String,
        /// Invariant that was violated.
        invariant: String,
        /// Current state description.
        state: String,
    },

    /// Decimal arithmetic left the representable range.
    #[error("Arithmetic overflow computing {context}")]
    Overflow {
        /// What was being computed.
        context: String,
    },
}

impl DomainError {
    /// Overflow while computing `context`.
    #[must_use]
    pub fn overflow(context: impl Into<String>) -> Self {
        Self::Overflow {
            context: context.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_value_display() {
        let err = DomainError::InvalidValue {
            field: "symbol".to_string(),
            message: "must not be empty".to_string(),
        };
        assert_eq!(err.to_string(), "Invalid value for 'symbol': must not be empty");
    }

    #[test]
    fn invariant_violation_display() {
        let err = DomainError::InvariantViolation {
            aggregate: "FillState".to_string(),
            invariant: "FillQty <= LeavesQty".to_string(),
            state: "fill_qty=2, leaves_qty=1".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("FillState"));
        assert!(msg.contains("leaves_qty=1"));
    }

    #[test]
    fn overflow_display() {
        let err = DomainError::overflow("fill notional");
        assert_eq!(err.to_string(), "Arithmetic overflow computing fill notional");
    }
}
