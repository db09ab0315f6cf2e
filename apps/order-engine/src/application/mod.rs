//! Application Layer
//!
//! The application layer orchestrates domain logic. It defines:
//!
//! - **Ports**: Interfaces to market data and time
//! - **Services**: Order lifecycle, algorithmic scheduling, statistics
//! - **DTOs**: Views returned by the trading facade

pub mod dto;
pub mod ports;
pub mod services;

pub use dto::*;
pub use ports::*;
pub use services::*;
