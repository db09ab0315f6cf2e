//! Order Execution Domain Services

mod fee_calculator;
mod matching;
mod order_state_machine;
mod validator;

pub use fee_calculator::{FeeCalculator, FeeSchedule};
pub use matching::{EvaluationPhase, Execution, OrderMatcher};
pub use order_state_machine::OrderStateMachine;
pub use validator::OrderValidator;
