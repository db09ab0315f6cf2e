//! In-memory order and trade stores.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};

use crate::domain::order_execution::aggregate::{Order, RejectedOrder, Trade};
use crate::domain::order_execution::errors::OrderError;
use crate::domain::order_execution::repository::{OrderCell, OrderRepository, TradeRepository};
use crate::domain::shared::{LinkGroupId, OrderId, OwnerId, Symbol};

#[derive(Debug, Default)]
struct OrderIndex {
    orders: HashMap<OrderId, OrderCell>,
    rejected: HashMap<OrderId, RejectedOrder>,
    by_owner: HashMap<OwnerId, Vec<OrderId>>,
    rejected_by_owner: HashMap<OwnerId, Vec<OrderId>>,
    by_symbol: HashMap<Symbol, Vec<OrderId>>,
    by_link_group: HashMap<LinkGroupId, BTreeSet<OrderId>>,
}

impl OrderIndex {
    fn contains(&self, id: &OrderId) -> bool {
        self.orders.contains_key(id) || self.rejected.contains_key(id)
    }

    fn cells<'a>(&self, ids: impl IntoIterator<Item = &'a OrderId>) -> Vec<OrderCell> {
        ids.into_iter()
            .filter_map(|id| self.orders.get(id).map(Arc::clone))
            .collect()
    }
}

/// In-memory implementation of `OrderRepository`.
///
/// Secondary indexes are keyed by the immutable order attributes, so they
/// are written once at insert.
#[derive(Debug, Default)]
pub struct InMemoryOrderStore {
    index: RwLock<OrderIndex>,
}

impl InMemoryOrderStore {
    /// Create a new empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl OrderRepository for InMemoryOrderStore {
    fn insert(&self, order: Order) -> Result<OrderCell, OrderError> {
        let mut index = self.index.write();
        let id = order.id().clone();
        if index.contains(&id) {
            return Err(OrderError::DuplicateOrderId {
                order_id: id.to_string(),
            });
        }

        index
            .by_owner
            .entry(order.owner().clone())
            .or_default()
            .push(id.clone());
        index
            .by_symbol
            .entry(order.symbol().clone())
            .or_default()
            .push(id.clone());
        if let Some(group) = order.link_group() {
            index
                .by_link_group
                .entry(group.clone())
                .or_default()
                .insert(id.clone());
        }

        let cell = Arc::new(Mutex::new(order));
        index.orders.insert(id, Arc::clone(&cell));
        Ok(cell)
    }

    fn insert_rejected(&self, record: RejectedOrder) -> Result<(), OrderError> {
        let mut index = self.index.write();
        let id = record.id().clone();
        if index.contains(&id) {
            return Err(OrderError::DuplicateOrderId {
                order_id: id.to_string(),
            });
        }
        index
            .rejected_by_owner
            .entry(record.spec().owner.clone())
            .or_default()
            .push(id.clone());
        index.rejected.insert(id, record);
        Ok(())
    }

    fn get(&self, id: &OrderId) -> Option<OrderCell> {
        self.index.read().orders.get(id).map(Arc::clone)
    }

    fn get_rejected(&self, id: &OrderId) -> Option<RejectedOrder> {
        self.index.read().rejected.get(id).cloned()
    }

    fn find_by_owner(&self, owner: &OwnerId) -> Vec<OrderCell> {
        let index = self.index.read();
        index
            .by_owner
            .get(owner)
            .map(|ids| index.cells(ids))
            .unwrap_or_default()
    }

    fn find_rejected_by_owner(&self, owner: &OwnerId) -> Vec<RejectedOrder> {
        let index = self.index.read();
        index
            .rejected_by_owner
            .get(owner)
            .map(|ids| {
                ids.iter()
                    .filter_map(|id| index.rejected.get(id).cloned())
                    .collect()
            })
            .unwrap_or_default()
    }

    fn find_by_symbol(&self, symbol: &Symbol) -> Vec<OrderCell> {
        let index = self.index.read();
        index
            .by_symbol
            .get(symbol)
            .map(|ids| index.cells(ids))
            .unwrap_or_default()
    }

    fn find_by_link_group(&self, group: &LinkGroupId) -> Vec<OrderCell> {
        let index = self.index.read();
        index
            .by_link_group
            .get(group)
            .map(|ids| index.cells(ids))
            .unwrap_or_default()
    }

    fn symbols(&self) -> Vec<Symbol> {
        let mut symbols: Vec<Symbol> = self.index.read().by_symbol.keys().cloned().collect();
        symbols.sort();
        symbols
    }

    fn len(&self) -> usize {
        self.index.read().orders.len()
    }
}

#[derive(Debug, Default)]
struct TradeLog {
    trades: Vec<Trade>,
    by_order: HashMap<OrderId, Vec<usize>>,
    by_owner: HashMap<OwnerId, Vec<usize>>,
}

impl TradeLog {
    fn collect(&self, positions: Option<&Vec<usize>>) -> Vec<Trade> {
        positions
            .map(|positions| {
                positions
                    .iter()
                    .filter_map(|&position| self.trades.get(position).cloned())
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// Append-only in-memory trade log, indexed by order and owner.
#[derive(Debug, Default)]
pub struct InMemoryTradeStore {
    log: RwLock<TradeLog>,
}

impl InMemoryTradeStore {
    /// Create a new empty trade log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl TradeRepository for InMemoryTradeStore {
    fn append(&self, trade: Trade) {
        let mut log = self.log.write();
        let position = log.trades.len();
        log.by_order
            .entry(trade.order_id.clone())
            .or_default()
            .push(position);
        log.by_owner
            .entry(trade.owner.clone())
            .or_default()
            .push(position);
        log.trades.push(trade);
    }

    fn find_by_order(&self, order_id: &OrderId) -> Vec<Trade> {
        let log = self.log.read();
        log.collect(log.by_order.get(order_id))
    }

    fn find_by_owner(&self, owner: &OwnerId) -> Vec<Trade> {
        let log = self.log.read();
        log.collect(log.by_owner.get(owner))
    }

    fn len(&self) -> usize {
        self.log.read().trades.len()
    }
}
