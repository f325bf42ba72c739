mod common;

use common::{Harness, alice, fetch_error};
use portfolio_sync::application::{StockView, keys};
use portfolio_sync::domain::portfolio::Symbol;
use portfolio_sync::domain::query::QueryStatus;
use std::cell::RefCell;
use std::rc::Rc;

#[test]
fn dependents_wait_for_the_metadata() {
    let mut h = Harness::signed_in();
    h.api.hold("fetch_stock_detail");
    let ibm = Symbol::from("ibm");

    let view = StockView::open(&h.ctx, ibm.clone());
    let snapshots = Rc::new(RefCell::new(Vec::new()));
    let log = snapshots.clone();
    let watcher = h.ctx.queries.clone();
    let (detail_key, intraday_key, holding_key) =
        (keys::stock_detail(&ibm), keys::intraday(&ibm), keys::holding(alice().id, &ibm));
    view.on_change(move || {
        log.borrow_mut().push((
            watcher.status(&detail_key),
            watcher.status(&intraday_key),
            watcher.status(&holding_key),
        ))
    });

    h.run();
    assert_eq!(h.api.count("fetch_intraday"), 0);
    assert_eq!(h.api.count("fetch_holding"), 0);
    assert!(view.intraday().is_idle());
    assert!(view.holding().is_idle());
    assert_eq!(view.status(), QueryStatus::Pending);

    h.api.release("fetch_stock_detail");
    h.run();
    assert_eq!(h.api.count("fetch_intraday"), 1);
    assert_eq!(h.api.count("fetch_holding"), 1);
    assert_eq!(view.status(), QueryStatus::Success);

    for (detail, intraday, holding) in snapshots.borrow().iter() {
        if *intraday == Some(QueryStatus::Pending) || *holding == Some(QueryStatus::Pending) {
            assert_eq!(*detail, Some(QueryStatus::Success));
        }
    }
}

#[test]
fn stats_come_from_the_resolved_series() {
    let mut h = Harness::signed_in();
    let view = StockView::open(&h.ctx, Symbol::from("IBM"));
    assert!(view.stats().is_none());
    h.run();

    let stats = view.stats().expect("series loaded").expect("non-empty series");
    assert_eq!((stats.high, stats.low, stats.open, stats.close), (15.0, 5.0, 10.0, 5.0));
    assert_eq!(view.holding().data().map(|h| h.quantity), Some(3.0));
}

#[test]
fn failed_metadata_keeps_dependents_idle_and_notifies_once() {
    let mut h = Harness::signed_in();
    *h.api.detail.borrow_mut() = Err(fetch_error("Stock not found"));

    let view = StockView::open(&h.ctx, Symbol::from("NOPE"));
    h.run();
    assert_eq!(view.status(), QueryStatus::Error);
    assert_eq!(h.api.count("fetch_intraday"), 0);
    assert!(h.messages().contains(&"Stock not found".to_string()));
    let errors = h.messages().iter().filter(|m| *m == "Stock not found").count();
    assert_eq!(errors, 1);

    *h.api.detail.borrow_mut() = Ok(common::detail("NOPE"));
    view.retry();
    h.run();
    assert_eq!(view.status(), QueryStatus::Success);
    assert_eq!(h.api.count("fetch_intraday"), 1);
}

#[test]
fn holding_follows_the_session() {
    let mut h = Harness::new();
    h.ctx.init();
    h.run();

    let view = StockView::open(&h.ctx, Symbol::from("IBM"));
    h.run();
    assert!(view.intraday().is_success());
    assert!(view.holding().is_idle());
    assert_eq!(h.api.count("fetch_holding"), 0);

    h.ctx.session.set_identity(Some(alice())).unwrap();
    h.run();
    assert!(view.holding().is_success());
    // the shared intraday entry survived the swap
    assert_eq!(h.api.count("fetch_intraday"), 1);
}

#[test]
fn closing_the_view_collects_its_entries() {
    let mut h = Harness::signed_in();
    let view = StockView::open(&h.ctx, Symbol::from("IBM"));
    h.run();
    assert_eq!(h.ctx.queries.len(), 3);
    drop(view);
    assert!(h.ctx.queries.is_empty());
}
