//! Trading statistics DTOs

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::shared::{OwnerId, Symbol};

/// Net position in one symbol, average-cost basis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionView {
    /// Symbol.
    pub symbol: Symbol,
    /// Signed quantity (negative = short).
    pub quantity: Decimal,
    /// Average cost of the open quantity.
    pub average_cost: Decimal,
    /// Mark price (snapshot `last`), when available.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mark_price: Option<Decimal>,
    /// P&L realized by closing trades.
    pub realized_pnl: Decimal,
    /// Open quantity marked to market.
    pub unrealized_pnl: Decimal,
}

/// Per-owner trading statistics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradingStatistics {
    /// Owner.
    pub owner: OwnerId,
    /// Number of trades.
    pub total_trades: usize,
    /// Sum of trade notionals.
    pub total_volume: Decimal,
    /// Sum of fees.
    pub total_fees: Decimal,
    /// Buy-side trades.
    pub buy_trades: usize,
    /// Sell-side trades.
    pub sell_trades: usize,
    /// `total_volume / total_trades`.
    pub average_trade_size: Decimal,
    /// Realized P&L before fees.
    pub realized_pnl: Decimal,
    /// Unrealized P&L before fees.
    pub unrealized_pnl: Decimal,
    /// `realized + unrealized - fees`.
    pub net_pnl: Decimal,
    /// Positions by symbol.
    pub positions: Vec<PositionView>,
}
