//! Order and Trade Repository Traits
//!
//! Persistence abstractions for orders and trades. Implemented by adapters
//! in the infrastructure layer.
//!
//! Stores hand out `OrderCell`s: the order's lock is the single-writer
//! guard for every transition. Callers must not hold a store-internal lock
//! while locking a cell; implementations return cloned `Arc`s for that reason.

use std::sync::Arc;

use parking_lot::Mutex;

use super::aggregate::{Order, RejectedOrder, Trade};
use super::errors::OrderError;
use crate::domain::shared::{LinkGroupId, OrderId, OwnerId, Symbol};

/// Shared, lockable handle to a live order.
pub type OrderCell = Arc<Mutex<Order>>;

/// Repository trait for orders and rejection records.
pub trait OrderRepository: Send + Sync {
    /// Insert a newly admitted order.
    ///
    /// # Errors
    ///
    /// Returns `DuplicateOrderId` if the ID is already taken.
    fn insert(&self, order: Order) -> Result<OrderCell, OrderError>;

    /// Record a rejected specification.
    ///
    /// # Errors
    ///
    /// Returns `DuplicateOrderId` if the ID is already taken.
    fn insert_rejected(&self, record: RejectedOrder) -> Result<(), OrderError>;

    /// Look up a live order.
    fn get(&self, id: &OrderId) -> Option<OrderCell>;

    /// Look up a rejection record.
    fn get_rejected(&self, id: &OrderId) -> Option<RejectedOrder>;

    /// All orders of an owner, oldest first.
    fn find_by_owner(&self, owner: &OwnerId) -> Vec<OrderCell>;

    /// All rejection records of an owner, oldest first.
    fn find_rejected_by_owner(&self, owner: &OwnerId) -> Vec<RejectedOrder>;

    /// All orders on a symbol, oldest first.
    fn find_by_symbol(&self, symbol: &Symbol) -> Vec<OrderCell>;

    /// Siblings sharing a link group.
    fn find_by_link_group(&self, group: &LinkGroupId) -> Vec<OrderCell>;

    /// Symbols that have at least one order.
    fn symbols(&self) -> Vec<Symbol>;

    /// Number of live orders (rejection records excluded).
    fn len(&self) -> usize;

    /// Returns true if no live orders are stored.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Append-only trade log, looked up by order and by owner.
pub trait TradeRepository: Send + Sync {
    /// Append a trade.
    fn append(&self, trade: Trade);

    /// Trades of one order, in execution order.
    fn find_by_order(&self, order_id: &OrderId) -> Vec<Trade>;

    /// Trades of one owner, in execution order.
    fn find_by_owner(&self, owner: &OwnerId) -> Vec<Trade>;

    /// Total number of trades.
    fn len(&self) -> usize;

    /// Returns true if no trades have been recorded.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
