//! Integration tests for the order lifecycle through the trading facade.
//!
//! Every test runs against the in-memory adapters with a manual clock
//! starting at 2024-01-02 12:00 UTC.

mod common;

use std::sync::Arc;

use chrono::Duration;
use common::{BTC, ETH, harness};
use order_engine::domain::order_execution::value_objects::{LiquiditySide, RejectionCode};
use order_engine::{
    AlgoParams, ErrorCode, OrderId, OrderSide, OrderSpec, OrderStatus, OrderType, OwnerId,
    TimeInForce,
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn alice() -> OwnerId {
    OwnerId::new("alice")
}

// ============================================================================
// Placement
// ============================================================================

#[test]
fn market_buy_fills_at_ask_and_pays_taker_fee() {
    let h = harness();
    let response = h
        .facade
        .place_order(OrderSpec::market("alice", ETH, OrderSide::Buy, dec!(2)))
        .unwrap();

    assert_eq!(response.status, OrderStatus::Filled);
    assert_eq!(response.filled_quantity, dec!(2));

    let trades = h.facade.list_trades(&alice());
    assert_eq!(trades.len(), 1);
    assert_eq!(trades[0].price, dec!(22.3));
    assert_eq!(trades[0].notional, dec!(44.6));
    assert_eq!(trades[0].fee, dec!(0.0669));
    assert_eq!(trades[0].fee_currency, "DGD");
    assert_eq!(trades[0].liquidity, LiquiditySide::Taker);

    let view = h.facade.get_order(&response.order_id).unwrap();
    assert_eq!(view.average_fill_price, Some(dec!(22.3)));
    assert_eq!(view.remaining_quantity, dec!(0));
}

#[test]
fn invalid_order_is_kept_as_rejection_record() {
    let h = harness();
    let response = h
        .facade
        .place_order(OrderSpec::market("alice", "XRP/DGD", OrderSide::Buy, dec!(1)))
        .unwrap();

    assert_eq!(response.status, OrderStatus::Rejected);
    assert_eq!(response.rejection_code, Some(RejectionCode::UnknownSymbol));

    let view = h.facade.get_order(&response.order_id).unwrap();
    assert_eq!(view.status, OrderStatus::Rejected);
    assert!(h.facade.list_trades(&alice()).is_empty());

    let rejected = h
        .facade
        .list_orders(&alice(), Some(OrderStatus::Rejected));
    assert_eq!(rejected.len(), 1);
}

#[test]
fn limit_without_price_is_rejected() {
    let h = harness();
    let mut spec = OrderSpec::market("alice", ETH, OrderSide::Buy, dec!(1));
    spec.order_type = OrderType::Limit;
    let response = h.facade.place_order(spec).unwrap();
    assert_eq!(response.rejection_code, Some(RejectionCode::MissingPrice));
}

#[test]
fn quantity_too_large_to_price_is_rejected() {
    let h = harness();
    let quantity = Decimal::from_i128_with_scale(10_i128.pow(27), 0);
    let response = h
        .facade
        .place_order(OrderSpec::market("alice", BTC, OrderSide::Buy, quantity))
        .unwrap();

    assert_eq!(response.status, OrderStatus::Rejected);
    assert_eq!(response.rejection_code, Some(RejectionCode::InvalidQuantity));
    assert!(h.facade.list_trades(&alice()).is_empty());
    assert!(h.facade.list_orders(&alice(), Some(OrderStatus::Pending)).is_empty());
    assert_eq!(h.facade.housekeeping(), (0, 0));
}

#[test]
fn fill_out_of_range_is_skipped_until_it_fits() {
    let h = harness();
    let quantity = Decimal::from_i128_with_scale(5 * 10_i128.pow(25), 0);
    let id = h
        .facade
        .place_order(OrderSpec::stop_loss("alice", ETH, OrderSide::Buy, quantity, dec!(1000)))
        .unwrap()
        .order_id;

    // Arms at 2000, but quantity * 2000 cannot be represented.
    assert_eq!(h.move_market(ETH, dec!(1999), dec!(2000)), 0);
    let view = h.facade.get_order(&id).unwrap();
    assert_eq!(view.status, OrderStatus::Pending);
    assert!(view.triggered);
    assert!(h.facade.list_trades(&alice()).is_empty());
    assert_eq!(h.facade.housekeeping(), (0, 0));

    assert_eq!(h.move_market(ETH, dec!(1000), dec!(1001)), 1);
    let view = h.facade.get_order(&id).unwrap();
    assert_eq!(view.status, OrderStatus::Filled);
    assert_eq!(view.average_fill_price, Some(dec!(1001)));
    assert!(h.facade.get_trading_statistics(&alice()).is_ok());
}

#[test]
fn unavailable_market_data_fails_placement_without_storing() {
    let h = harness();
    h.market.set_unavailable(&ETH.into(), true);

    let err = h
        .facade
        .place_order(OrderSpec::market("alice", ETH, OrderSide::Buy, dec!(1)))
        .unwrap_err();

    assert_eq!(err.code(), ErrorCode::MarketDataUnavailable);
    assert!(h.facade.list_orders(&alice(), None).is_empty());
}

#[test]
fn resting_limit_fills_as_maker_when_market_crosses() {
    let h = harness();
    let response = h
        .facade
        .place_order(OrderSpec::limit("alice", ETH, OrderSide::Buy, dec!(1), dec!(22.0)))
        .unwrap();
    assert_eq!(response.status, OrderStatus::Pending);

    // Still above the limit.
    assert_eq!(h.move_market(ETH, dec!(22.05), dec!(22.1)), 0);

    assert_eq!(h.move_market(ETH, dec!(21.8), dec!(21.9)), 1);
    let view = h.facade.get_order(&response.order_id).unwrap();
    assert_eq!(view.status, OrderStatus::Filled);
    assert_eq!(view.average_fill_price, Some(dec!(22.0)));

    let trades = h.facade.list_trades(&alice());
    assert_eq!(trades[0].liquidity, LiquiditySide::Maker);
    assert_eq!(trades[0].fee, dec!(0.022));
}

#[test]
fn iceberg_fills_one_peak_per_evaluation() {
    let h = harness();
    let mut spec = OrderSpec::limit("alice", ETH, OrderSide::Buy, dec!(1), dec!(21.5));
    spec.order_type = OrderType::Iceberg;
    spec.visible_quantity = Some(dec!(0.4));
    let id = h.facade.place_order(spec).unwrap().order_id;

    h.move_market(ETH, dec!(21.3), dec!(21.4));
    h.move_market(ETH, dec!(21.3), dec!(21.4));
    let view = h.facade.get_order(&id).unwrap();
    assert_eq!(view.status, OrderStatus::PartiallyFilled);
    assert_eq!(view.filled_quantity, dec!(0.8));

    h.move_market(ETH, dec!(21.3), dec!(21.4));
    let view = h.facade.get_order(&id).unwrap();
    assert_eq!(view.status, OrderStatus::Filled);
    assert_eq!(h.facade.list_trades(&alice()).len(), 3);
}

#[test]
fn trailing_sell_stop_ratchets_up_then_fires() {
    let h = harness();
    h.quote(ETH, dec!(100), dec!(100.1));
    let mut spec = OrderSpec::market("alice", ETH, OrderSide::Sell, dec!(1));
    spec.order_type = OrderType::TrailingStop;
    spec.trail_amount = Some(dec!(5));
    let id = h.facade.place_order(spec).unwrap().order_id;

    let view = h.facade.get_order(&id).unwrap();
    assert_eq!(view.status, OrderStatus::Pending);
    assert_eq!(view.stop_price, Some(dec!(95)));

    assert_eq!(h.move_market(ETH, dec!(110), dec!(110.1)), 0);
    assert_eq!(h.facade.get_order(&id).unwrap().stop_price, Some(dec!(105)));

    // A pullback above the level does not loosen the stop.
    assert_eq!(h.move_market(ETH, dec!(106), dec!(106.1)), 0);
    assert_eq!(h.facade.get_order(&id).unwrap().stop_price, Some(dec!(105)));

    assert_eq!(h.move_market(ETH, dec!(104.5), dec!(104.6)), 1);
    let view = h.facade.get_order(&id).unwrap();
    assert_eq!(view.status, OrderStatus::Filled);
    assert_eq!(view.average_fill_price, Some(dec!(104.5)));
}

#[test]
fn stop_loss_waits_for_adverse_cross() {
    let h = harness();
    let id = h
        .facade
        .place_order(OrderSpec::stop_loss("alice", ETH, OrderSide::Sell, dec!(1), dec!(21)))
        .unwrap()
        .order_id;
    assert_eq!(h.move_market(ETH, dec!(21.5), dec!(21.6)), 0);
    assert_eq!(h.move_market(ETH, dec!(20.9), dec!(21.0)), 1);
    let view = h.facade.get_order(&id).unwrap();
    assert!(view.triggered);
    assert_eq!(view.average_fill_price, Some(dec!(20.9)));
}

// ============================================================================
// Time in force
// ============================================================================

#[test]
fn ioc_partial_fill_cancels_remainder() {
    let h = harness();
    h.quote_sized(ETH, dec!(22.2), dec!(22.3), dec!(2));
    let response = h
        .facade
        .place_order(
            OrderSpec::market("alice", ETH, OrderSide::Buy, dec!(5))
                .with_time_in_force(TimeInForce::Ioc),
        )
        .unwrap();
    assert_eq!(response.status, OrderStatus::Cancelled);
    assert_eq!(response.filled_quantity, dec!(2));
}

#[test]
fn ioc_without_fill_expires() {
    let h = harness();
    let response = h
        .facade
        .place_order(
            OrderSpec::limit("alice", ETH, OrderSide::Buy, dec!(1), dec!(20))
                .with_time_in_force(TimeInForce::Ioc),
        )
        .unwrap();
    assert_eq!(response.status, OrderStatus::Expired);
    assert_eq!(response.filled_quantity, dec!(0));
}

#[test]
fn fok_fills_entirely_or_expires() {
    let h = harness();
    h.quote_sized(ETH, dec!(22.2), dec!(22.3), dec!(2));

    let short = h
        .facade
        .place_order(
            OrderSpec::market("alice", ETH, OrderSide::Buy, dec!(5))
                .with_time_in_force(TimeInForce::Fok),
        )
        .unwrap();
    assert_eq!(short.status, OrderStatus::Expired);
    assert!(h.facade.list_trades(&alice()).is_empty());

    let full = h
        .facade
        .place_order(
            OrderSpec::market("alice", ETH, OrderSide::Buy, dec!(2))
                .with_time_in_force(TimeInForce::Fok),
        )
        .unwrap();
    assert_eq!(full.status, OrderStatus::Filled);
}

#[test]
fn day_order_expires_after_cutoff() {
    let h = harness();
    let id = h
        .facade
        .place_order(
            OrderSpec::limit("alice", ETH, OrderSide::Buy, dec!(1), dec!(20))
                .with_time_in_force(TimeInForce::Day),
        )
        .unwrap()
        .order_id;
    let gtc = h
        .facade
        .place_order(OrderSpec::limit("alice", ETH, OrderSide::Buy, dec!(1), dec!(20)))
        .unwrap()
        .order_id;

    let view = h.facade.get_order(&id).unwrap();
    assert!(view.expires_at.is_some());

    h.clock.advance(Duration::hours(1));
    assert_eq!(h.facade.housekeeping(), (0, 0));

    h.clock.advance(Duration::hours(11));
    assert_eq!(h.facade.housekeeping(), (1, 0));
    assert_eq!(h.facade.get_order(&id).unwrap().status, OrderStatus::Expired);
    assert_eq!(h.facade.get_order(&gtc).unwrap().status, OrderStatus::Pending);

    // Expired orders never fill.
    assert_eq!(h.move_market(ETH, dec!(19), dec!(19.1)), 1);
    assert_eq!(h.facade.get_order(&id).unwrap().status, OrderStatus::Expired);
}

// ============================================================================
// Cancellation
// ============================================================================

#[test]
fn cancel_checks_owner_and_state() {
    let h = harness();
    let id = h
        .facade
        .place_order(OrderSpec::limit("alice", ETH, OrderSide::Buy, dec!(1), dec!(20)))
        .unwrap()
        .order_id;

    let err = h.facade.cancel_order(&id, &OwnerId::new("mallory")).unwrap_err();
    assert_eq!(err.code(), ErrorCode::Unauthorized);

    let response = h.facade.cancel_order(&id, &alice()).unwrap();
    assert_eq!(response.status, OrderStatus::Cancelled);

    let err = h.facade.cancel_order(&id, &alice()).unwrap_err();
    assert_eq!(err.code(), ErrorCode::Conflict);

    let err = h
        .facade
        .cancel_order(&OrderId::new("ord-missing"), &alice())
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::OrderNotFound);
}

#[test]
fn concurrent_cancels_succeed_exactly_once() {
    let h = harness();
    let id = h
        .facade
        .place_order(OrderSpec::limit("alice", ETH, OrderSide::Buy, dec!(1), dec!(20)))
        .unwrap()
        .order_id;

    let results: Vec<_> = std::thread::scope(|scope| {
        let workers: Vec<_> = (0..8)
            .map(|_| {
                let facade = Arc::clone(&h.facade);
                let id = id.clone();
                scope.spawn(move || facade.cancel_order(&id, &OwnerId::new("alice")))
            })
            .collect();
        workers.into_iter().map(|w| w.join().unwrap()).collect()
    });

    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    assert!(
        results
            .iter()
            .filter_map(|r| r.as_ref().err())
            .all(|e| e.code() == ErrorCode::Conflict)
    );
}

#[test]
fn concurrent_fill_and_cancel_never_both_win() {
    for _ in 0..20 {
        let h = harness();
        let id = h
            .facade
            .place_order(OrderSpec::limit("alice", ETH, OrderSide::Buy, dec!(1), dec!(22.0)))
            .unwrap()
            .order_id;
        h.quote(ETH, dec!(21.8), dec!(21.9));

        let (fills, cancel) = std::thread::scope(|scope| {
            let reeval = scope.spawn(|| h.facade.reevaluate(&ETH.into()).unwrap());
            let cancel = scope.spawn(|| h.facade.cancel_order(&id, &alice()));
            (reeval.join().unwrap(), cancel.join().unwrap())
        });

        let view = h.facade.get_order(&id).unwrap();
        match view.status {
            OrderStatus::Filled => {
                assert_eq!(fills, 1);
                assert!(cancel.is_err());
            }
            OrderStatus::Cancelled => {
                assert_eq!(fills, 0);
                assert!(cancel.is_ok());
                assert!(h.facade.list_trades(&alice()).is_empty());
            }
            other => panic!("unexpected status {other}"),
        }
    }
}

#[test]
fn racing_oco_legs_and_cancel_leave_at_most_one_fill() {
    for _ in 0..50 {
        let h = harness();
        let summary = h
            .facade
            .execute_algo(
                "oco",
                AlgoParams::new("alice", ETH, OrderSide::Sell, dec!(1))
                    .with_oco_prices(dec!(23), dec!(21)),
            )
            .unwrap();
        let legs = summary.child_order_ids.clone();
        let stop = legs[1].clone();

        let cancel = std::thread::scope(|scope| {
            let rally = scope.spawn(|| {
                h.quote(ETH, dec!(23.1), dec!(23.2));
                h.facade.reevaluate(&ETH.into()).unwrap()
            });
            let selloff = scope.spawn(|| {
                h.quote(ETH, dec!(20.9), dec!(21.0));
                h.facade.reevaluate(&ETH.into()).unwrap()
            });
            let cancel = scope.spawn(|| h.facade.cancel_order(&stop, &alice()));
            rally.join().unwrap();
            selloff.join().unwrap();
            cancel.join().unwrap()
        });

        let statuses: Vec<OrderStatus> = legs
            .iter()
            .map(|id| h.facade.get_order(id).unwrap().status)
            .collect();
        let filled = statuses.iter().filter(|s| **s == OrderStatus::Filled).count();
        assert!(filled <= 1, "both legs filled: {statuses:?}");
        assert!(statuses.iter().all(|s| s.is_terminal()));
        assert_eq!(h.facade.list_trades(&alice()).len(), filled);
        match cancel {
            Ok(_) => assert_eq!(filled, 0),
            Err(e) => {
                assert_eq!(filled, 1);
                assert_eq!(e.code(), ErrorCode::Conflict);
            }
        }
    }
}

// ============================================================================
// OCO
// ============================================================================

#[test]
fn oco_fill_cancels_sibling() {
    let h = harness();
    let summary = h
        .facade
        .execute_algo(
            "oco",
            AlgoParams::new("alice", ETH, OrderSide::Sell, dec!(1)).with_oco_prices(dec!(23), dec!(21)),
        )
        .unwrap();
    assert_eq!(summary.child_order_ids.len(), 2);
    assert!(summary.link_group.is_some());
    let (limit, stop) = (&summary.child_order_ids[0], &summary.child_order_ids[1]);

    assert_eq!(h.move_market(ETH, dec!(23.1), dec!(23.2)), 1);
    assert_eq!(h.facade.get_order(limit).unwrap().status, OrderStatus::Filled);
    assert_eq!(h.facade.get_order(stop).unwrap().status, OrderStatus::Cancelled);

    // The stop no longer fires on a later drop.
    assert_eq!(h.move_market(ETH, dec!(20), dec!(20.1)), 0);
    assert_eq!(h.facade.list_trades(&alice()).len(), 1);
}

#[test]
fn cancelling_one_oco_leg_cancels_both() {
    let h = harness();
    let summary = h
        .facade
        .execute_algo(
            "oco",
            AlgoParams::new("alice", ETH, OrderSide::Sell, dec!(1)).with_oco_prices(dec!(23), dec!(21)),
        )
        .unwrap();
    let stop = summary.child_order_ids[1].clone();

    let response = h.facade.cancel_order(&stop, &alice()).unwrap();
    assert_eq!(response.cancelled_siblings, vec![summary.child_order_ids[0].clone()]);
    assert!(
        h.facade
            .list_orders(&alice(), None)
            .iter()
            .all(|o| o.status == OrderStatus::Cancelled)
    );
}

// ============================================================================
// Queries and statistics
// ============================================================================

#[test]
fn list_orders_filters_by_owner_and_status() {
    let h = harness();
    h.facade
        .place_order(OrderSpec::market("alice", ETH, OrderSide::Buy, dec!(1)))
        .unwrap();
    h.facade
        .place_order(OrderSpec::limit("alice", BTC, OrderSide::Buy, dec!(1), dec!(40000)))
        .unwrap();
    h.facade
        .place_order(OrderSpec::market("bob", ETH, OrderSide::Buy, dec!(1)))
        .unwrap();

    assert_eq!(h.facade.list_orders(&alice(), None).len(), 2);
    let pending = h.facade.list_orders(&alice(), Some(OrderStatus::Pending));
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].symbol.as_str(), BTC);
    assert_eq!(h.facade.list_orders(&OwnerId::new("bob"), None).len(), 1);
}

#[test]
fn statistics_report_volume_fees_and_pnl() {
    let h = harness();
    h.facade
        .place_order(OrderSpec::market("alice", ETH, OrderSide::Buy, dec!(2)))
        .unwrap();
    h.clock.advance(Duration::seconds(1));
    h.quote(ETH, dec!(25), dec!(25.1));
    h.facade
        .place_order(OrderSpec::market("alice", ETH, OrderSide::Sell, dec!(1)))
        .unwrap();

    let stats = h.facade.get_trading_statistics(&alice()).unwrap();
    assert_eq!(stats.total_trades, 2);
    assert_eq!(stats.buy_trades, 1);
    assert_eq!(stats.sell_trades, 1);
    assert_eq!(stats.total_volume, dec!(69.6));
    assert_eq!(stats.total_fees, dec!(0.1044));
    assert_eq!(stats.realized_pnl, dec!(2.7));
    // One unit left, marked at last = 25.05.
    assert_eq!(stats.unrealized_pnl, dec!(2.75));
    assert_eq!(stats.net_pnl, dec!(5.3456));
    assert_eq!(stats.positions[0].quantity, dec!(1));
}

#[test]
fn market_data_and_order_book_views() {
    let h = harness();
    let all = h.facade.get_market_data(None).unwrap();
    assert_eq!(all.len(), 2);

    h.market.set_unavailable(&BTC.into(), true);
    assert_eq!(h.facade.get_market_data(None).unwrap().len(), 1);
    let err = h.facade.get_market_data(Some(&BTC.into())).unwrap_err();
    assert_eq!(err.code(), ErrorCode::MarketDataUnavailable);

    let book = h.facade.get_order_book(&ETH.into(), Some(3)).unwrap();
    assert_eq!(book.bids.len(), 3);
    assert_eq!(book.asks.len(), 3);
    assert!(book.best_bid().unwrap().price < book.best_ask().unwrap().price);
}
