//! Order Validator Domain Service
//!
//! Smart constructor from a raw `OrderSpec` to an admitted `NewOrder`.

use chrono::{DateTime, Duration, NaiveTime, Utc};
use rust_decimal::Decimal;

use crate::domain::order_execution::aggregate::NewOrder;
use crate::domain::order_execution::value_objects::{
    OrderKind, OrderSpec, OrderType, Rejection, RejectionCode, TimeInForce, TrailOffset,
};
use crate::domain::shared::OrderId;

/// Validates order specifications.
///
/// Checks run in a fixed order and the first failure wins:
/// symbol, quantity, price, stop price, trail parameters, iceberg peak,
/// then whether `quantity` times each known price is representable.
#[derive(Debug, Clone, Copy)]
pub struct OrderValidator {
    day_cutoff: NaiveTime,
}

impl Default for OrderValidator {
    fn default() -> Self {
        Self {
            day_cutoff: NaiveTime::from_hms_opt(23, 59, 59).unwrap_or_default(),
        }
    }
}

impl OrderValidator {
    /// Create a validator with a DAY cutoff time (UTC).
    #[must_use]
    pub const fn new(day_cutoff: NaiveTime) -> Self {
        Self { day_cutoff }
    }

    /// DAY cutoff time of day.
    #[must_use]
    pub const fn day_cutoff(&self) -> NaiveTime {
        self.day_cutoff
    }

    /// Expiry for a DAY order submitted at `now`.
    ///
    /// Today's cutoff, or tomorrow's if today's has already passed.
    #[must_use]
    pub fn day_expiry(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        let cutoff = now.date_naive().and_time(self.day_cutoff).and_utc();
        if cutoff > now {
            cutoff
        } else {
            cutoff + Duration::days(1)
        }
    }

    /// Validate `spec` and build the admitted order parameters.
    ///
    /// `symbol_listed` is the market data source's answer for `spec.symbol`;
    /// `touch` is the current price the order would trade against, when a
    /// snapshot is available.
    ///
    /// # Errors
    ///
    /// Returns the first `Rejection` found.
    pub fn validate(
        &self,
        spec: &OrderSpec,
        symbol_listed: bool,
        touch: Option<Decimal>,
        id: OrderId,
        now: DateTime<Utc>,
    ) -> Result<NewOrder, Rejection> {
        if !symbol_listed {
            return Err(Rejection::new(
                RejectionCode::UnknownSymbol,
                format!("symbol {} is not listed", spec.symbol),
            ));
        }

        if spec.quantity <= Decimal::ZERO {
            return Err(Rejection::new(
                RejectionCode::InvalidQuantity,
                format!("quantity must be positive, got {}", spec.quantity),
            ));
        }

        let price = if spec.order_type.requires_price() {
            Some(positive(spec.price).ok_or_else(|| {
                Rejection::new(
                    RejectionCode::MissingPrice,
                    format!("{} orders require a positive price", spec.order_type),
                )
            })?)
        } else {
            None
        };

        let stop_price = if spec.order_type.requires_stop_price() {
            Some(positive(spec.stop_price).ok_or_else(|| {
                Rejection::new(
                    RejectionCode::MissingStopPrice,
                    format!("{} orders require a positive stop price", spec.order_type),
                )
            })?)
        } else {
            None
        };

        let kind = match (spec.order_type, price, stop_price) {
            (OrderType::Market, _, _) => OrderKind::Market,
            (OrderType::Limit, Some(price), _) => OrderKind::Limit { price },
            (OrderType::StopLoss, _, Some(stop_price)) => OrderKind::StopLoss { stop_price },
            (OrderType::TakeProfit, _, Some(stop_price)) => OrderKind::TakeProfit { stop_price },
            (OrderType::StopLimit, Some(price), Some(stop_price)) => {
                OrderKind::StopLimit { stop_price, price }
            }
            (OrderType::TrailingStop, _, _) => OrderKind::TrailingStop {
                trail: Self::trail_offset(spec)?,
            },
            (OrderType::Iceberg, Some(price), _) => OrderKind::Iceberg {
                price,
                visible_quantity: Self::visible_quantity(spec)?,
            },
            // Unreachable: required prices were checked above.
            (order_type, _, _) => {
                return Err(Rejection::new(
                    RejectionCode::MissingPrice,
                    format!("{order_type} orders are missing a required price"),
                ));
            }
        };

        for reference in [price, stop_price, touch].into_iter().flatten() {
            if spec.quantity.checked_mul(reference).is_none() {
                return Err(Rejection::new(
                    RejectionCode::InvalidQuantity,
                    format!(
                        "quantity {} at price {reference} exceeds the representable notional",
                        spec.quantity
                    ),
                ));
            }
        }

        let time_in_force = spec.time_in_force.unwrap_or_default();
        let expires_at = (time_in_force == TimeInForce::Day).then(|| self.day_expiry(now));

        Ok(NewOrder {
            id,
            owner: spec.owner.clone(),
            symbol: spec.symbol.clone(),
            side: spec.side,
            kind,
            quantity: spec.quantity,
            time_in_force,
            expires_at,
            twap_duration_minutes: spec.twap_duration_minutes,
            created_at: now,
        })
    }

    /// A valid trail amount takes precedence over a valid percent.
    fn trail_offset(spec: &OrderSpec) -> Result<TrailOffset, Rejection> {
        let amount = spec.trail_amount.filter(|amount| *amount > Decimal::ZERO);
        let percent = spec
            .trail_percent
            .filter(|pct| *pct > Decimal::ZERO && *pct < Decimal::ONE);
        if let Some(amount) = amount {
            return Ok(TrailOffset::Amount(amount));
        }
        if let Some(pct) = percent {
            return Ok(TrailOffset::Percent(pct));
        }

        let message = match (spec.trail_amount, spec.trail_percent) {
            (None, None) => "trailing stops require trail_amount or trail_percent".to_string(),
            (Some(amount), None) => format!("trail_amount must be positive, got {amount}"),
            (None, Some(pct)) => {
                format!("trail_percent must be a fraction in (0, 1), got {pct}")
            }
            (Some(amount), Some(pct)) => format!(
                "trail_amount must be positive and trail_percent a fraction in (0, 1), got {amount} and {pct}"
            ),
        };
        Err(Rejection::new(RejectionCode::MissingTrailParams, message))
    }

    fn visible_quantity(spec: &OrderSpec) -> Result<Decimal, Rejection> {
        spec.visible_quantity
            .filter(|visible| *visible > Decimal::ZERO && *visible <= spec.quantity)
            .ok_or_else(|| {
                Rejection::new(
                    RejectionCode::InvalidQuantity,
                    "iceberg visible_quantity must satisfy 0 < visible <= quantity",
                )
            })
    }
}

fn positive(value: Option<Decimal>) -> Option<Decimal> {
    value.filter(|v| *v > Decimal::ZERO)
}
