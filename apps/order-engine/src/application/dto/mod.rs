//! Data Transfer Objects
//!
//! Serializable views returned by the trading facade.

mod order_dto;
mod statistics_dto;
mod strategy_dto;

pub use order_dto::{CancelResponse, OrderView, PlaceOrderResponse, TradeView};
pub use statistics_dto::{PositionView, TradingStatistics};
pub use strategy_dto::{AlgoParams, StrategySummary};
