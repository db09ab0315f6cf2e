//! Market Data Bounded Context
//!
//! Top-of-book snapshots and derived depth views consumed by matching.

mod order_book;
mod snapshot;

pub use order_book::{OrderBook, OrderBookLevel};
pub use snapshot::MarketSnapshot;
