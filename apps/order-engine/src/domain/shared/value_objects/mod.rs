//! Shared value objects.

mod identifiers;
mod symbol;

pub use identifiers::{LinkGroupId, OrderId, OwnerId, StrategyId, TradeId};
pub use symbol::Symbol;
