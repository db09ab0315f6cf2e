//! Execution Tactics Errors

use thiserror::Error;

/// Errors that can occur while planning or running a strategy.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TacticError {
    /// Invalid configuration provided.
    #[error("Invalid tactic configuration: {message}")]
    InvalidConfiguration {
        /// Error details.
        message: String,
    },

    /// Strategy name not recognised.
    #[error("Unknown strategy: {name}")]
    UnknownStrategy {
        /// Name as given.
        name: String,
    },

    /// Invalid quantity for slice.
    #[error("Invalid slice quantity: {quantity}")]
    InvalidSliceQuantity {
        /// The invalid quantity value.
        quantity: String,
    },

    /// No slices remaining to execute.
    #[error("No slices remaining to execute")]
    NoSlicesRemaining,
}
