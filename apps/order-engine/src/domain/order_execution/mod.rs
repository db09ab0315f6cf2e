//! Order Execution Bounded Context
//!
//! Order lifecycle: validation, state transitions, fills and fees.
//!
//! # Components
//!
//! - **Aggregate**: `Order` (live order), `RejectedOrder` (audit record), `Trade`
//! - **Value Objects**: `OrderKind`, `OrderStatus`, `TimeInForce`, `FillState`
//! - **Services**: `OrderValidator`, `FeeCalculator`, `OrderMatcher`, `OrderStateMachine`
//! - **Repository**: `OrderRepository`, `TradeRepository`

pub mod aggregate;
pub mod errors;
pub mod repository;
pub mod services;
pub mod value_objects;

pub use aggregate::{NewOrder, Order, RejectedOrder, Trade};
pub use errors::OrderError;
pub use repository::{OrderCell, OrderRepository, TradeRepository};
pub use services::{
    EvaluationPhase, Execution, FeeCalculator, FeeSchedule, OrderMatcher, OrderStateMachine,
    OrderValidator,
};
pub use value_objects::{
    FillState, LiquiditySide, OrderKind, OrderSide, OrderSpec, OrderStatus, OrderType, Rejection,
    RejectionCode, TimeInForce, TrailOffset,
};
