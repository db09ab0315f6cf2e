//! Infrastructure Layer
//!
//! Adapters for the ports defined in the application layer and the
//! repository traits of the domain layer:
//!
//! - `persistence/`: In-memory order and trade stores
//! - `market_data/`: In-memory market data source
//! - `clock`: System and manual clocks

pub mod clock;
pub mod market_data;
pub mod persistence;

pub use clock::{ManualClock, SystemClock};
pub use market_data::InMemoryMarketData;
pub use persistence::{InMemoryOrderStore, InMemoryTradeStore};
