//! In-memory market data source.
//!
//! Holds the latest snapshot per listed symbol. Snapshots are pushed with
//! `update`; a symbol can be marked unavailable to simulate a feed outage.
//! Order books are synthesized around the touch.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use rand::Rng;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::application::ports::{MarketDataError, MarketDataPort};
use crate::domain::market_data::{MarketSnapshot, OrderBook, OrderBookLevel};
use crate::domain::shared::Symbol;

/// Bid sits this fraction below `last` for seeded and repriced symbols.
const HALF_SPREAD: Decimal = dec!(0.001);

/// Price step between synthetic book levels, as a fraction of the touch.
const LEVEL_STEP: Decimal = dec!(0.001);

#[derive(Debug, Clone)]
struct Entry {
    snapshot: MarketSnapshot,
    unavailable: bool,
}

/// In-memory implementation of `MarketDataPort`.
#[derive(Debug, Default)]
pub struct InMemoryMarketData {
    entries: RwLock<HashMap<Symbol, Entry>>,
}

impl InMemoryMarketData {
    /// Create an empty source with no listed symbols.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// List `instruments` at their seed prices.
    ///
    /// 24h volume and change are randomized.
    #[must_use]
    pub fn seeded(instruments: impl IntoIterator<Item = (Symbol, Decimal)>, now: DateTime<Utc>) -> Self {
        let source = Self::new();
        let mut rng = rand::rng();
        for (symbol, last) in instruments {
            let mut snapshot = quote_around(symbol, last, now);
            snapshot.volume_24h = Decimal::from(rng.random_range(1_000_000u64..10_000_000));
            snapshot.change_24h = Decimal::new(rng.random_range(-5_000i64..=5_000), 5);
            source.update(snapshot);
        }
        source
    }

    /// Publish a snapshot, listing the symbol if new.
    pub fn update(&self, snapshot: MarketSnapshot) {
        tracing::trace!(symbol = %snapshot.symbol, bid = %snapshot.bid, ask = %snapshot.ask, "Snapshot updated");
        self.entries.write().insert(
            snapshot.symbol.clone(),
            Entry {
                snapshot,
                unavailable: false,
            },
        );
    }

    /// Move `symbol` to a new last price with the default spread.
    ///
    /// # Errors
    ///
    /// `UnknownSymbol` when the symbol is not listed.
    pub fn reprice(&self, symbol: &Symbol, last: Decimal, now: DateTime<Utc>) -> Result<(), MarketDataError> {
        let mut entries = self.entries.write();
        let entry = entries
            .get_mut(symbol)
            .ok_or_else(|| MarketDataError::UnknownSymbol {
                symbol: symbol.to_string(),
            })?;
        let previous = entry.snapshot.clone();
        let mut snapshot = quote_around(symbol.clone(), last, now);
        snapshot.volume_24h = previous.volume_24h;
        snapshot.change_24h = previous.change_24h;
        entry.snapshot = snapshot;
        Ok(())
    }

    /// Mark a listed symbol unavailable (or available again).
    pub fn set_unavailable(&self, symbol: &Symbol, unavailable: bool) {
        if let Some(entry) = self.entries.write().get_mut(symbol) {
            entry.unavailable = unavailable;
            tracing::debug!(symbol = %symbol, unavailable, "Market data availability changed");
        }
    }
}

fn quote_around(symbol: Symbol, last: Decimal, now: DateTime<Utc>) -> MarketSnapshot {
    let bid = last.saturating_mul(Decimal::ONE - HALF_SPREAD).round_dp(8);
    let ask = last.saturating_mul(Decimal::ONE + HALF_SPREAD).round_dp(8);
    MarketSnapshot::new(symbol, bid, ask, last, now)
}

impl MarketDataPort for InMemoryMarketData {
    fn is_listed(&self, symbol: &Symbol) -> bool {
        self.entries.read().contains_key(symbol)
    }

    fn snapshot(&self, symbol: &Symbol) -> Result<MarketSnapshot, MarketDataError> {
        let entries = self.entries.read();
        match entries.get(symbol) {
            None => Err(MarketDataError::UnknownSymbol {
                symbol: symbol.to_string(),
            }),
            Some(entry) if entry.unavailable => Err(MarketDataError::Unavailable {
                symbol: symbol.to_string(),
                reason: "feed marked unavailable".to_string(),
            }),
            Some(entry) => Ok(entry.snapshot.clone()),
        }
    }

    fn symbols(&self) -> Vec<Symbol> {
        let mut symbols: Vec<Symbol> = self.entries.read().keys().cloned().collect();
        symbols.sort();
        symbols
    }

    fn order_book(&self, symbol: &Symbol, depth: usize) -> Result<OrderBook, MarketDataError> {
        let snapshot = self.snapshot(symbol)?;
        let mut rng = rand::rng();
        let mut bids = Vec::with_capacity(depth);
        let mut asks = Vec::with_capacity(depth);
        for level in 0..depth {
            let step = LEVEL_STEP * Decimal::from(level + 1);
            bids.push(OrderBookLevel {
                price: snapshot.bid.saturating_mul(Decimal::ONE - step).round_dp(8),
                quantity: Decimal::new(rng.random_range(10i64..=1_000), 2),
            });
            asks.push(OrderBookLevel {
                price: snapshot.ask.saturating_mul(Decimal::ONE + step).round_dp(8),
                quantity: Decimal::new(rng.random_range(10i64..=1_000), 2),
            });
        }
        Ok(OrderBook::new(symbol.clone(), bids, asks, snapshot.timestamp))
    }
}
