//! Thread table and dispatcher selection tests.

use std::collections::VecDeque;

use crate::fixed_point::Fixed;

use super::types::{ThreadTable, Tid, PRI_DEFAULT, PRI_MAX, PRI_MIN};

/// Allocate a stackless test thread.
fn spawn(table: &mut ThreadTable, name: &str, priority: i32) -> Tid {
    table
        .allocate(name, priority, 0, Fixed::ZERO, false)
        .expect("table has room")
}

#[test]
fn tids_are_unique_and_monotonic() {
    let mut table = ThreadTable::new();

    let a = spawn(&mut table, "a", PRI_DEFAULT);
    let b = spawn(&mut table, "b", PRI_DEFAULT);
    let c = spawn(&mut table, "c", PRI_DEFAULT);

    assert!(a < b && b < c, "tids must be monotonically increasing");
}

#[test]
fn tids_are_not_reused_after_removal() {
    let mut table = ThreadTable::new();

    let a = spawn(&mut table, "a", PRI_DEFAULT);
    table.remove(a).expect("a exists");

    let b = spawn(&mut table, "b", PRI_DEFAULT);
    assert!(b > a, "slot reuse must not recycle tids");
}

#[test]
fn names_truncate_to_fifteen_bytes() {
    let mut table = ThreadTable::new();

    let tid = spawn(&mut table, "a-very-long-thread-name", PRI_DEFAULT);
    assert_eq!(table.entry(tid).name.as_str(), "a-very-long-thr");

    let short = spawn(&mut table, "idle", PRI_MIN);
    assert_eq!(table.entry(short).name.as_str(), "idle");
}

#[test]
fn table_capacity_is_enforced() {
    let mut table = ThreadTable::new();

    for i in 0..super::types::MAX_THREADS {
        assert!(
            table.allocate("filler", PRI_DEFAULT, 0, Fixed::ZERO, false).is_ok(),
            "allocation {} should fit",
            i
        );
    }

    assert_eq!(
        table.allocate("overflow", PRI_DEFAULT, 0, Fixed::ZERO, false),
        Err("thread table full")
    );
}

#[test]
fn selection_is_highest_priority_first() {
    let mut table = ThreadTable::new();

    let mid = spawn(&mut table, "mid", 31);
    let high = spawn(&mut table, "high", 40);
    let low = spawn(&mut table, "low", 10);

    table.ready_push(mid);
    table.ready_push(high);
    table.ready_push(low);

    assert_eq!(table.next_ready(), Some(high));
    assert_eq!(table.take_next_ready(), Some(high));
    assert_eq!(table.take_next_ready(), Some(mid));
    assert_eq!(table.take_next_ready(), Some(low));
    assert_eq!(table.take_next_ready(), None);
}

#[test]
fn equal_priorities_run_fifo() {
    let mut table = ThreadTable::new();

    let first = spawn(&mut table, "first", PRI_DEFAULT);
    let second = spawn(&mut table, "second", PRI_DEFAULT);
    let third = spawn(&mut table, "third", PRI_DEFAULT);

    table.ready_push(first);
    table.ready_push(second);
    table.ready_push(third);

    assert_eq!(table.take_next_ready(), Some(first));
    assert_eq!(table.take_next_ready(), Some(second));
    assert_eq!(table.take_next_ready(), Some(third));
}

#[test]
#[should_panic(expected = "already on the ready queue")]
fn ready_queue_rejects_double_insert() {
    let mut table = ThreadTable::new();

    let tid = spawn(&mut table, "dup", PRI_DEFAULT);
    table.ready_push(tid);
    table.ready_push(tid);
}

#[test]
fn best_waiter_tracks_current_priority() {
    let mut table = ThreadTable::new();

    let slow = spawn(&mut table, "slow", 20);
    let fast = spawn(&mut table, "fast", 40);

    let mut waiters: VecDeque<Tid> = VecDeque::new();
    waiters.push_back(slow);
    waiters.push_back(fast);

    assert_eq!(table.best_waiter(&waiters), Some(1), "highest priority wins");

    // A donation arriving after the threads queued must re-rank them.
    table.entry_mut(slow).priority = PRI_MAX;
    assert_eq!(table.best_waiter(&waiters), Some(0));
}

#[test]
fn best_waiter_is_fifo_among_equals() {
    let mut table = ThreadTable::new();

    let first = spawn(&mut table, "first", PRI_DEFAULT);
    let second = spawn(&mut table, "second", PRI_DEFAULT);

    let mut waiters: VecDeque<Tid> = VecDeque::new();
    waiters.push_back(first);
    waiters.push_back(second);

    assert_eq!(table.best_waiter(&waiters), Some(0));
}

#[test]
fn priorities_stay_in_range() {
    let mut table = ThreadTable::new();

    let lowest = spawn(&mut table, "lowest", PRI_MIN);
    let highest = spawn(&mut table, "highest", PRI_MAX);

    assert_eq!(table.entry(lowest).priority, PRI_MIN);
    assert_eq!(table.entry(highest).priority, PRI_MAX);
}

#[test]
#[should_panic(expected = "out of range")]
fn out_of_range_priority_is_rejected() {
    let mut table = ThreadTable::new();
    let _ = table.allocate("bad", PRI_MAX + 1, 0, Fixed::ZERO, false);
}
