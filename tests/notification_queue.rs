use portfolio_sync::domain::notifications::{
    DEFAULT_NOTIFICATION_DURATION, NotificationCenter, NotificationKind,
};
use portfolio_sync::infrastructure::runtime::ManualScheduler;
use quickcheck_macros::quickcheck;
use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

fn center() -> (NotificationCenter, ManualScheduler) {
    let scheduler = ManualScheduler::new();
    let center = NotificationCenter::new(Rc::new(scheduler.clone()), DEFAULT_NOTIFICATION_DURATION);
    (center, scheduler)
}

#[test]
fn expires_after_default_duration() {
    let (center, scheduler) = center();
    center.success("Stock added successfully.");
    center.error("Stock not found");
    assert_eq!(center.len(), 2);

    scheduler.advance(Duration::from_millis(2999));
    assert_eq!(center.len(), 2);
    scheduler.advance(Duration::from_millis(1));
    assert!(center.is_empty());
}

#[test]
fn keeps_insertion_order_and_duplicates() {
    let (center, _scheduler) = center();
    center.info("a");
    center.warning("b");
    center.info("a");
    let snapshot: Vec<_> = center
        .notifications()
        .into_iter()
        .map(|n| (n.kind, n.message))
        .collect();
    assert_eq!(
        snapshot,
        vec![
            (NotificationKind::Info, "a".to_string()),
            (NotificationKind::Warning, "b".to_string()),
            (NotificationKind::Info, "a".to_string()),
        ]
    );
}

#[test]
fn manual_dismiss_cancels_the_timer() {
    let (center, scheduler) = center();
    let id = center.notify(NotificationKind::Info, "hello");
    assert_eq!(scheduler.pending(), 1);

    assert!(center.dismiss(id));
    assert_eq!(scheduler.pending(), 0);
    assert!(!center.dismiss(id));
    assert_eq!(scheduler.advance(Duration::from_secs(10)), 0);
}

#[test]
fn zero_duration_persists_until_dismissed() {
    let (center, scheduler) = center();
    let id = center.notify_for(NotificationKind::Error, "sticky", Duration::ZERO);
    assert_eq!(scheduler.pending(), 0);
    scheduler.advance(Duration::from_secs(60));
    assert_eq!(center.len(), 1);
    assert!(center.dismiss(id));
}

#[test]
fn listeners_see_every_change() {
    let (center, scheduler) = center();
    let lengths = Rc::new(RefCell::new(Vec::new()));
    let log = lengths.clone();
    let listener = center.subscribe(move |queue| log.borrow_mut().push(queue.len()));

    center.info("x");
    center.info("y");
    scheduler.advance(DEFAULT_NOTIFICATION_DURATION);
    assert_eq!(*lengths.borrow(), vec![1, 2, 1, 0]);

    center.unsubscribe(listener);
    center.info("z");
    assert_eq!(lengths.borrow().len(), 4);
}

#[test]
fn dispose_clears_queue_and_timers() {
    let (center, scheduler) = center();
    center.info("a");
    center.info("b");
    center.dispose();
    assert!(center.is_empty());
    assert_eq!(scheduler.pending(), 0);
}

#[derive(Clone, Debug)]
enum Op {
    Notify(u8),
    DismissOldest,
    DismissUnknown,
    Advance(u16),
}

impl quickcheck::Arbitrary for Op {
    fn arbitrary(g: &mut quickcheck::Gen) -> Self {
        match u8::arbitrary(g) % 4 {
            0 => Op::Notify(u8::arbitrary(g)),
            1 => Op::DismissOldest,
            2 => Op::DismissUnknown,
            _ => Op::Advance(u16::arbitrary(g) % 4000),
        }
    }
}

/// Queue length always equals notifies minus removals that took effect.
#[quickcheck]
fn queue_length_tracks_notifies_minus_removals(ops: Vec<Op>) -> bool {
    let (center, scheduler) = center();
    let mut notified = 0usize;
    let mut removed = 0usize;
    let mut stray = None;

    for op in ops {
        match op {
            Op::Notify(duration) => {
                let id = center.notify_for(
                    NotificationKind::Info,
                    "msg",
                    Duration::from_millis(u64::from(duration) * 20),
                );
                notified += 1;
                stray.get_or_insert(id);
            }
            Op::DismissOldest => {
                if let Some(first) = center.notifications().first() {
                    if center.dismiss(first.id) {
                        removed += 1;
                    }
                }
            }
            Op::DismissUnknown => {
                if let Some(id) = stray {
                    if center.dismiss(id) {
                        removed += 1;
                    }
                }
            }
            Op::Advance(ms) => {
                removed += scheduler.advance(Duration::from_millis(u64::from(ms)));
            }
        }
        if center.len() != notified - removed {
            return false;
        }
    }
    true
}
