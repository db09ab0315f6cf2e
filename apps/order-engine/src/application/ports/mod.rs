//! Application Ports (Driven Ports)
//!
//! Interfaces the application layer consumes. Implemented by adapters in
//! the infrastructure layer.

mod clock_port;
mod market_data_port;

pub use clock_port::Clock;
pub use market_data_port::{MarketDataError, MarketDataPort};
