//! Engine error handling.
//!
//! `EngineError` is what the public operation surface returns: a stable
//! `ErrorCode`, a message and key/value context. Bounded-context errors
//! convert into it at the application boundary.
//!
//! | Code | Raised when |
//! |------|-------------|
//! | `ORDER_NOT_FOUND` | Unknown order id |
//! | `STRATEGY_NOT_FOUND` | Unknown strategy id |
//! | `UNAUTHORIZED` | Caller does not own the order or strategy |
//! | `CONFLICT` | Transition lost a race or target is terminal |
//! | `MARKET_DATA_UNAVAILABLE` | No usable snapshot for the symbol |
//! | `INVALID_STRATEGY` | Unknown strategy name |
//! | `INVALID_STRATEGY_PARAMS` | Bad strategy parameters |
//! | `INVALID_REQUEST` | Malformed command |
//! | `INTERNAL_ERROR` | Invariant breach |

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::application::ports::MarketDataError;
use crate::domain::execution_tactics::TacticError;
use crate::domain::order_execution::OrderError;
use crate::domain::shared::DomainError;

/// Error codes for the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // Not found errors
    /// Order not found.
    OrderNotFound,
    /// Strategy not found.
    StrategyNotFound,

    // Access errors
    /// Caller is not the owner.
    Unauthorized,

    // Concurrency errors
    /// Lost a race, or the target is already terminal.
    Conflict,

    // Collaborator errors
    /// Market data unavailable.
    MarketDataUnavailable,

    // Validation errors
    /// Unknown strategy name.
    InvalidStrategy,
    /// Invalid strategy parameters.
    InvalidStrategyParams,
    /// Malformed request.
    InvalidRequest,

    // Internal errors
    /// Internal error.
    InternalError,
}

impl ErrorCode {
    /// Get the error reason string.
    #[must_use]
    pub const fn reason(&self) -> &'static str {
        match self {
            Self::OrderNotFound => "ORDER_NOT_FOUND",
            Self::StrategyNotFound => "STRATEGY_NOT_FOUND",
            Self::Unauthorized => "UNAUTHORIZED",
            Self::Conflict => "CONFLICT",
            Self::MarketDataUnavailable => "MARKET_DATA_UNAVAILABLE",
            Self::InvalidStrategy => "INVALID_STRATEGY",
            Self::InvalidStrategyParams => "INVALID_STRATEGY_PARAMS",
            Self::InvalidRequest => "INVALID_REQUEST",
            Self::InternalError => "INTERNAL_ERROR",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.reason())
    }
}

/// A rich error with context.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub struct EngineError {
    code: ErrorCode,
    message: String,
    context: Vec<(String, String)>,
}

impl EngineError {
    /// Create a new engine error.
    #[must_use]
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            context: Vec::new(),
        }
    }

    /// Add context to the error.
    #[must_use]
    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context.push((key.into(), value.into()));
        self
    }

    /// Get the error code.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        self.code
    }

    /// Get the message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get the context.
    #[must_use]
    pub fn context(&self) -> &[(String, String)] {
        &self.context
    }

    /// Convert to a serializable response body.
    #[must_use]
    pub fn to_response(&self) -> ErrorResponse {
        ErrorResponse {
            code: self.code.reason().to_string(),
            message: self.message.clone(),
            details: self.context.iter().cloned().collect(),
        }
    }
}

impl std::fmt::Display for EngineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code.reason(), self.message)
    }
}

/// Serializable error body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error code string.
    pub code: String,
    /// Human-readable message.
    pub message: String,
    /// Additional details.
    pub details: std::collections::BTreeMap<String, String>,
}

/// Convenience constructors for common errors.
impl EngineError {
    /// Order not found.
    #[must_use]
    pub fn order_not_found(order_id: &str) -> Self {
        Self::new(ErrorCode::OrderNotFound, format!("Order {order_id} not found"))
            .with_context("order_id", order_id)
    }

    /// Strategy not found.
    #[must_use]
    pub fn strategy_not_found(strategy_id: &str) -> Self {
        Self::new(
            ErrorCode::StrategyNotFound,
            format!("Strategy {strategy_id} not found"),
        )
        .with_context("strategy_id", strategy_id)
    }

    /// Caller does not own the resource.
    #[must_use]
    pub fn unauthorized(resource: &str, owner: &str) -> Self {
        Self::new(
            ErrorCode::Unauthorized,
            format!("{owner} is not the owner of {resource}"),
        )
        .with_context("owner", owner)
    }

    /// Transition conflict.
    #[must_use]
    pub fn conflict(order_id: &str, message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Conflict, message).with_context("order_id", order_id)
    }

    /// Internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }
}

impl From<MarketDataError> for EngineError {
    fn from(err: MarketDataError) -> Self {
        let symbol = match &err {
            MarketDataError::UnknownSymbol { symbol } | MarketDataError::Unavailable { symbol, .. } => {
                symbol.clone()
            }
        };
        Self::new(ErrorCode::MarketDataUnavailable, err.to_string()).with_context("symbol", symbol)
    }
}

impl From<TacticError> for EngineError {
    fn from(err: TacticError) -> Self {
        let code = match err {
            TacticError::UnknownStrategy { .. } => ErrorCode::InvalidStrategy,
            _ => ErrorCode::InvalidStrategyParams,
        };
        Self::new(code, err.to_string())
    }
}

impl From<DomainError> for EngineError {
    fn from(err: DomainError) -> Self {
        Self::internal(err.to_string())
    }
}

impl From<OrderError> for EngineError {
    fn from(err: OrderError) -> Self {
        match &err {
            OrderError::NotFound { order_id } => Self::order_not_found(order_id),
            _ if err.is_terminal_conflict() => Self::new(ErrorCode::Conflict, err.to_string()),
            _ => Self::internal(err.to_string()),
        }
    }
}

/// Result alias for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;
