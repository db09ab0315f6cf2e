//! Trading Statistics
//!
//! Per-owner trade aggregates and average-cost P&L. Realized P&L comes from
//! trades that reduce a position; unrealized P&L marks the open quantity to
//! the snapshot `last` price.

use std::collections::BTreeMap;

use rust_decimal::Decimal;

use crate::application::dto::{PositionView, TradingStatistics};
use crate::domain::order_execution::Trade;
use crate::domain::order_execution::value_objects::OrderSide;
use crate::domain::shared::{DomainError, OwnerId, Symbol};

/// Running average-cost position.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PositionLedger {
    quantity: Decimal,
    average_cost: Decimal,
    realized: Decimal,
}

impl PositionLedger {
    /// Apply one trade. The ledger is unchanged on error.
    ///
    /// # Errors
    ///
    /// Returns error if the new average cost or realized P&L cannot be
    /// represented.
    pub fn apply(
        &mut self,
        side: OrderSide,
        quantity: Decimal,
        price: Decimal,
    ) -> Result<(), DomainError> {
        let sign = Decimal::from(side.sign());
        let signed = quantity * sign;
        let same_direction =
            self.quantity.is_zero() || self.quantity.is_sign_positive() == signed.is_sign_positive();

        if same_direction {
            let open = self.quantity.abs();
            let average_cost = open
                .checked_mul(self.average_cost)
                .zip(quantity.checked_mul(price))
                .and_then(|(held, added)| held.checked_add(added))
                .zip(open.checked_add(quantity))
                .and_then(|(cost, total)| cost.checked_div(total))
                .ok_or_else(|| DomainError::overflow("position average cost"))?;
            let new_quantity = self
                .quantity
                .checked_add(signed)
                .ok_or_else(|| DomainError::overflow("position quantity"))?;
            self.average_cost = average_cost;
            self.quantity = new_quantity;
            return Ok(());
        }

        let closing = quantity.min(self.quantity.abs());
        let direction = if self.quantity.is_sign_positive() {
            Decimal::ONE
        } else {
            Decimal::NEGATIVE_ONE
        };
        self.realized = price
            .checked_sub(self.average_cost)
            .and_then(|move_per_unit| move_per_unit.checked_mul(closing))
            .and_then(|pnl| self.realized.checked_add(pnl * direction))
            .ok_or_else(|| DomainError::overflow("realized P&L"))?;
        self.quantity += closing * sign;

        let reopened = quantity - closing;
        if reopened > Decimal::ZERO {
            self.quantity = reopened * sign;
            self.average_cost = price;
        } else if self.quantity.is_zero() {
            self.average_cost = Decimal::ZERO;
        }
        Ok(())
    }

    /// Signed open quantity.
    #[must_use]
    pub const fn quantity(&self) -> Decimal {
        self.quantity
    }

    /// Average cost of the open quantity.
    #[must_use]
    pub const fn average_cost(&self) -> Decimal {
        self.average_cost
    }

    /// Realized P&L so far.
    #[must_use]
    pub const fn realized(&self) -> Decimal {
        self.realized
    }

    /// Open quantity marked at `mark`.
    ///
    /// # Errors
    ///
    /// Returns error if the marked value cannot be represented.
    pub fn unrealized(&self, mark: Decimal) -> Result<Decimal, DomainError> {
        mark.checked_sub(self.average_cost)
            .and_then(|move_per_unit| self.quantity.checked_mul(move_per_unit))
            .ok_or_else(|| DomainError::overflow("unrealized P&L"))
    }
}

/// Build statistics for `owner` from its trades.
///
/// `mark` returns the mark price for a symbol, or `None` when no snapshot is
/// available (the position then contributes no unrealized P&L).
///
/// # Errors
///
/// Returns error if a total leaves the representable decimal range.
pub fn compute_statistics(
    owner: &OwnerId,
    trades: &[Trade],
    mark: impl Fn(&Symbol) -> Option<Decimal>,
) -> Result<TradingStatistics, DomainError> {
    let mut ledgers: BTreeMap<Symbol, PositionLedger> = BTreeMap::new();
    let mut buy_trades = 0;

    let mut ordered: Vec<&Trade> = trades.iter().collect();
    ordered.sort_by_key(|trade| trade.timestamp);
    for trade in &ordered {
        if trade.side == OrderSide::Buy {
            buy_trades += 1;
        }
        ledgers
            .entry(trade.symbol.clone())
            .or_default()
            .apply(trade.side, trade.quantity, trade.price)?;
    }
    let total_volume = checked_sum(ordered.iter().map(|trade| trade.notional), "total volume")?;
    let total_fees = checked_sum(ordered.iter().map(|trade| trade.fee), "total fees")?;

    let positions = ledgers
        .into_iter()
        .map(|(symbol, ledger)| -> Result<PositionView, DomainError> {
            let mark_price = mark(&symbol);
            let unrealized = match mark_price {
                Some(price) if !ledger.quantity().is_zero() => ledger.unrealized(price)?,
                _ => Decimal::ZERO,
            };
            Ok(PositionView {
                symbol,
                quantity: ledger.quantity(),
                average_cost: ledger.average_cost(),
                mark_price,
                realized_pnl: ledger.realized(),
                unrealized_pnl: unrealized,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let realized_pnl = checked_sum(positions.iter().map(|p| p.realized_pnl), "realized P&L")?;
    let unrealized_pnl = checked_sum(positions.iter().map(|p| p.unrealized_pnl), "unrealized P&L")?;
    let net_pnl = realized_pnl
        .checked_add(unrealized_pnl)
        .and_then(|gross| gross.checked_sub(total_fees))
        .ok_or_else(|| DomainError::overflow("net P&L"))?;
    let total_trades = trades.len();
    let average_trade_size = if total_trades == 0 {
        Decimal::ZERO
    } else {
        total_volume / Decimal::from(total_trades)
    };

    Ok(TradingStatistics {
        owner: owner.clone(),
        total_trades,
        total_volume,
        total_fees,
        buy_trades,
        sell_trades: total_trades - buy_trades,
        average_trade_size,
        realized_pnl,
        unrealized_pnl,
        net_pnl,
        positions,
    })
}

fn checked_sum(
    mut values: impl Iterator<Item = Decimal>,
    context: &str,
) -> Result<Decimal, DomainError> {
    values
        .try_fold(Decimal::ZERO, Decimal::checked_add)
        .ok_or_else(|| DomainError::overflow(context))
}
