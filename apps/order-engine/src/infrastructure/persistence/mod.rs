//! Persistence Adapters
//!
//! In-memory implementations of the order and trade repository traits.

pub mod in_memory;

pub use in_memory::{InMemoryOrderStore, InMemoryTradeStore};
