//! Order execution aggregates and entities.

mod order;
mod rejected;
mod trade;

pub use order::{NewOrder, Order};
pub use rejected::RejectedOrder;
pub use trade::Trade;
