//! MLFQS accounting tests: the priority formula, the load average
//! recurrence, and the recent-cpu decay.

use crate::fixed_point::Fixed;

use super::mlfqs;
use super::types::{ThreadTable, Tid, PRI_MAX, PRI_MIN};

fn spawn(table: &mut ThreadTable, name: &str, nice: i32, recent_cpu: Fixed) -> Tid {
    table
        .allocate(name, PRI_MAX, nice, recent_cpu, false)
        .expect("table has room")
}

// ============================================================================
// Priority formula
// ============================================================================

#[test]
fn fresh_thread_gets_pri_max() {
    assert_eq!(mlfqs::priority_for(Fixed::ZERO, 0), PRI_MAX);
}

#[test]
fn each_nice_point_costs_two_priority() {
    assert_eq!(mlfqs::priority_for(Fixed::ZERO, 1), PRI_MAX - 2);
    assert_eq!(mlfqs::priority_for(Fixed::ZERO, 5), PRI_MAX - 10);
}

#[test]
fn cpu_usage_lowers_priority() {
    // recent_cpu of 100 ticks costs 100/4 = 25 priority levels.
    assert_eq!(mlfqs::priority_for(Fixed::from_int(100), 0), PRI_MAX - 25);
}

#[test]
fn recent_cpu_quarter_is_truncated() {
    // 7/4 = 1.75 truncates to 1.
    assert_eq!(mlfqs::priority_for(Fixed::from_int(7), 0), PRI_MAX - 1);
}

#[test]
fn priority_clamps_to_range() {
    assert_eq!(mlfqs::priority_for(Fixed::from_int(1000), 20), PRI_MIN);
    assert_eq!(mlfqs::priority_for(Fixed::ZERO, -20), PRI_MAX);
}

#[test]
fn priority_is_monotone_in_cpu_usage() {
    // Holding nice fixed, burning more CPU never raises priority.
    let mut last = PRI_MAX;
    for ticks in 0..400 {
        let priority = mlfqs::priority_for(Fixed::from_int(ticks), 0);
        assert!(
            priority <= last,
            "priority rose from {} to {} at recent_cpu={}",
            last,
            priority,
            ticks
        );
        last = priority;
    }
    assert_eq!(last, PRI_MIN, "enough CPU burn pins the thread to the floor");
}

// ============================================================================
// Load average
// ============================================================================

#[test]
fn load_avg_counts_the_running_thread() {
    let mut table = ThreadTable::new();
    let runner = spawn(&mut table, "runner", 0, Fixed::ZERO);
    table.current = Some(runner);

    mlfqs::update_load_avg_and_recent(&mut table);

    // (59/60) * 0 + (1/60) * 1, exactly.
    assert_eq!(table.load_avg, Fixed::from_int(1).div_int(60));
    assert_eq!(table.load_avg.mul_int(100).round(), 2);
}

#[test]
fn load_avg_excludes_the_idle_thread() {
    let mut table = ThreadTable::new();
    let idle = spawn(&mut table, "idle", 0, Fixed::ZERO);
    table.current = Some(idle);
    table.idle = Some(idle);

    mlfqs::update_load_avg_and_recent(&mut table);

    assert_eq!(table.load_avg, Fixed::ZERO);
}

#[test]
fn load_avg_converges_upward_under_load() {
    let mut table = ThreadTable::new();
    let runner = spawn(&mut table, "runner", 0, Fixed::ZERO);
    table.current = Some(runner);

    let mut last = Fixed::ZERO;
    for _ in 0..120 {
        mlfqs::update_load_avg_and_recent(&mut table);
        assert!(table.load_avg >= last, "load average must not dip under constant load");
        last = table.load_avg;
    }

    // One always-runnable thread pulls the average toward 1 from below.
    assert!(table.load_avg > Fixed::from_int(1).div_int(2));
    assert!(table.load_avg < Fixed::from_int(1));
}

// ============================================================================
// recent_cpu
// ============================================================================

#[test]
fn tick_charges_the_running_thread() {
    let mut table = ThreadTable::new();
    let runner = spawn(&mut table, "runner", 0, Fixed::ZERO);
    let other = spawn(&mut table, "other", 0, Fixed::ZERO);
    table.current = Some(runner);

    mlfqs::bump_recent_cpu(&mut table);

    assert_eq!(table.entry(runner).recent_cpu, Fixed::from_int(1));
    assert_eq!(table.entry(other).recent_cpu, Fixed::ZERO);
}

#[test]
fn tick_never_charges_idle() {
    let mut table = ThreadTable::new();
    let idle = spawn(&mut table, "idle", 0, Fixed::ZERO);
    table.current = Some(idle);
    table.idle = Some(idle);

    mlfqs::bump_recent_cpu(&mut table);

    assert_eq!(table.entry(idle).recent_cpu, Fixed::ZERO);
}

#[test]
fn decay_shrinks_recent_cpu_and_adds_nice() {
    let mut table = ThreadTable::new();
    let runner = spawn(&mut table, "runner", 3, Fixed::from_int(5));
    table.current = Some(runner);

    mlfqs::update_load_avg_and_recent(&mut table);

    let coefficient = mlfqs::decay_coefficient(table.load_avg);
    let expected = (coefficient * Fixed::from_int(5)).add_int(3);
    assert_eq!(table.entry(runner).recent_cpu, expected);

    // With load_avg < 1 the coefficient is well below one, so the old
    // usage shrank before nice was re-added.
    let decayed = table.entry(runner).recent_cpu.sub_int(3);
    assert!(decayed < Fixed::from_int(5));
}

#[test]
fn priority_recomputation_skips_idle() {
    let mut table = ThreadTable::new();
    let idle = spawn(&mut table, "idle", 0, Fixed::ZERO);
    let busy = spawn(&mut table, "busy", 0, Fixed::from_int(40));
    table.current = Some(busy);
    table.idle = Some(idle);
    table.entry_mut(idle).priority = PRI_MIN;
    table.entry_mut(idle).base_priority = PRI_MIN;

    mlfqs::recompute_all_priorities(&mut table);

    assert_eq!(
        table.entry(idle).priority,
        PRI_MIN,
        "idle must never outrank a real thread"
    );
    assert_eq!(table.entry(busy).priority, PRI_MAX - 10);
}

#[test]
fn busier_threads_end_up_below_niced_peers() {
    // Fairness, in miniature: same nice, different CPU burn.
    let mut table = ThreadTable::new();
    let busy = spawn(&mut table, "busy", 0, Fixed::from_int(200));
    let light = spawn(&mut table, "light", 0, Fixed::from_int(8));
    table.current = Some(busy);

    mlfqs::recompute_all_priorities(&mut table);

    assert!(table.entry(busy).priority < table.entry(light).priority);
}
