//! Fee Calculator Domain Service
//!
//! `fee = quantity * price * rate`, with the rate chosen by liquidity side.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::domain::order_execution::value_objects::LiquiditySide;
use crate::domain::shared::{DomainError, Symbol};

/// Maker/taker fee rates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeeSchedule {
    /// Rate for resting liquidity that gets matched.
    pub maker_rate: Decimal,
    /// Rate for liquidity-removing fills.
    pub taker_rate: Decimal,
    /// Fee currency for symbols without a quote currency.
    pub default_currency: String,
}

impl Default for FeeSchedule {
    fn default() -> Self {
        Self {
            maker_rate: dec!(0.001),
            taker_rate: dec!(0.0015),
            default_currency: "DGD".to_string(),
        }
    }
}

/// Computes the fee for a fill.
#[derive(Debug, Clone, Default)]
pub struct FeeCalculator {
    schedule: FeeSchedule,
}

impl FeeCalculator {
    /// Create a calculator for a fee schedule.
    #[must_use]
    pub const fn new(schedule: FeeSchedule) -> Self {
        Self { schedule }
    }

    /// The fee schedule in use.
    #[must_use]
    pub const fn schedule(&self) -> &FeeSchedule {
        &self.schedule
    }

    /// Rate for a liquidity side.
    #[must_use]
    pub const fn rate(&self, liquidity: LiquiditySide) -> Decimal {
        match liquidity {
            LiquiditySide::Maker => self.schedule.maker_rate,
            LiquiditySide::Taker => self.schedule.taker_rate,
        }
    }

    /// Fee for one fill.
    ///
    /// # Errors
    ///
    /// Returns error if the fill notional cannot be represented.
    pub fn fee(
        &self,
        quantity: Decimal,
        price: Decimal,
        liquidity: LiquiditySide,
    ) -> Result<Decimal, DomainError> {
        quantity
            .checked_mul(price)
            .and_then(|notional| notional.checked_mul(self.rate(liquidity)))
            .ok_or_else(|| DomainError::overflow("fill fee"))
    }

    /// Currency fees on `symbol` are charged in.
    #[must_use]
    pub fn currency_for(&self, symbol: &Symbol) -> String {
        symbol
            .quote_currency()
            .map_or_else(|| self.schedule.default_currency.clone(), str::to_string)
    }
}
