//! MLFQS accounting pipeline.
//!
//! Three cadences, driven from the timer tick:
//! - every tick: the running thread's `recent_cpu` grows by one;
//! - every [`TIME_SLICE`](super::types::TIME_SLICE) ticks: every thread's
//!   priority is recomputed as
//!   `clamp(PRI_MAX - recent_cpu/4 - 2*nice, PRI_MIN, PRI_MAX)`;
//! - every second: `load_avg` is folded with the runnable-thread count
//!   and every thread's `recent_cpu` decays by `2*load_avg / (2*load_avg + 1)`.
//!
//! The idle thread takes no part in any of it: it burns no accounted CPU
//! and must never outrank a real thread.

use crate::fixed_point::Fixed;

use super::types::{ThreadTable, ThreadStatus, PRI_MAX, PRI_MIN};

/// MLFQS priority for a given CPU usage estimate and niceness. The
/// `recent_cpu / 4` term is truncated, not rounded.
pub fn priority_for(recent_cpu: Fixed, nice: i32) -> i32 {
    let priority = PRI_MAX - recent_cpu.div_int(4).trunc() - nice * 2;
    priority.clamp(PRI_MIN, PRI_MAX)
}

/// Decay factor `2*load_avg / (2*load_avg + 1)` applied to `recent_cpu`
/// once per second.
pub fn decay_coefficient(load_avg: Fixed) -> Fixed {
    let twice = load_avg.mul_int(2);
    twice / twice.add_int(1)
}

/// Per-tick: charge the running thread one tick of CPU.
pub fn bump_recent_cpu(table: &mut ThreadTable) {
    let Some(current) = table.current else { return };
    if table.idle == Some(current) {
        return;
    }

    let entry = table.entry_mut(current);
    entry.recent_cpu = entry.recent_cpu.add_int(1);
}

/// Per-slice: recompute every thread's priority from its `recent_cpu`
/// and `nice`. Base and effective priority coincide under MLFQS —
/// donation is disabled.
pub fn recompute_all_priorities(table: &mut ThreadTable) {
    let idle = table.idle;

    for slot in table.slots.iter_mut() {
        let Some(entry) = slot else { continue };
        if entry.status == ThreadStatus::Dying || idle == Some(entry.tid) {
            continue;
        }

        let priority = priority_for(entry.recent_cpu, entry.nice);
        entry.priority = priority;
        entry.base_priority = priority;
    }
}

/// Per-second: fold the runnable count into `load_avg`, then decay every
/// thread's `recent_cpu` and re-add its niceness.
pub fn update_load_avg_and_recent(table: &mut ThreadTable) {
    let running_counts = match table.current {
        Some(current) if table.idle != Some(current) => 1,
        _ => 0,
    };
    let ready_count = table.ready.len() as i32 + running_counts;

    let fifty_nine_sixtieths = Fixed::from_int(59).div_int(60);
    let one_sixtieth = Fixed::from_int(1).div_int(60);
    table.load_avg = fifty_nine_sixtieths * table.load_avg + one_sixtieth.mul_int(ready_count);

    let coefficient = decay_coefficient(table.load_avg);
    let idle = table.idle;

    for slot in table.slots.iter_mut() {
        let Some(entry) = slot else { continue };
        if entry.status == ThreadStatus::Dying || idle == Some(entry.tid) {
            continue;
        }

        entry.recent_cpu = (coefficient * entry.recent_cpu).add_int(entry.nice);
    }
}
