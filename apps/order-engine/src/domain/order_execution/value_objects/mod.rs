//! Order Execution Value Objects

mod fill_state;
mod liquidity;
mod order_kind;
mod order_side;
mod order_spec;
mod order_status;
mod rejection;
mod time_in_force;

pub use fill_state::FillState;
pub use liquidity::LiquiditySide;
pub use order_kind::{OrderKind, OrderType, TrailOffset};
pub use order_side::OrderSide;
pub use order_spec::OrderSpec;
pub use order_status::OrderStatus;
pub use rejection::{Rejection, RejectionCode};
pub use time_in_force::TimeInForce;
