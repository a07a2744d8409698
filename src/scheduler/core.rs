//! The dispatcher.
//!
//! `schedule()` is the single point where the CPU changes hands. Callers
//! have already moved the current thread out of `Running` (to `Ready`,
//! `Blocked` or `Dying`) with interrupts masked; this picks the best
//! runnable thread, falls back to idle, and performs the raw context
//! switch. The switched-from thread resumes inside `schedule()` whenever
//! it is dispatched again.
//!
//! A dying thread cannot free the stack it is still running on, so its
//! slot is queued and reclaimed here at the *next* dispatch.

use crate::arch::{self, Context};
use crate::interrupts::{self, IntrLevel};

use super::stats;
use super::table;
use super::types::ThreadStatus;

pub(crate) fn schedule() {
    assert_eq!(
        interrupts::get_level(),
        IntrLevel::Off,
        "dispatch with interrupts enabled"
    );
    assert!(!interrupts::in_isr(), "dispatch from interrupt context");

    let mut switch: Option<(*mut Context, *const Context)> = None;

    {
        let mut table = table::locked();
        reap_dying(&mut table);

        let prev = table.current_tid();
        {
            let entry = table.entry(prev);
            assert_ne!(
                entry.status,
                ThreadStatus::Running,
                "schedule() with the current thread still running"
            );
            assert!(
                entry.stack_canary_ok(),
                "stack overflow in thread '{}'",
                entry.name
            );
        }

        let next = table
            .take_next_ready()
            .or(table.idle)
            .expect("nothing to run and no idle thread");
        assert_ne!(
            table.entry(next).status,
            ThreadStatus::Dying,
            "dying thread selected for dispatch"
        );

        table.entry_mut(next).status = ThreadStatus::Running;
        table.current = Some(next);
        table.slice_ticks = 0;

        if prev != next {
            // The initial thread runs on the boot stack and has nothing
            // to reclaim; everyone else queues for the next dispatch.
            let prev_entry = table.entry(prev);
            if prev_entry.status == ThreadStatus::Dying && prev_entry.stack.is_some() {
                table.destruction.push_back(prev);
            }

            stats::record_switch();

            let prev_slot = table.slot_of(prev).unwrap();
            let next_slot = table.slot_of(next).unwrap();
            let prev_ctx: *mut Context = &mut table.slots[prev_slot].as_mut().unwrap().context;
            let next_ctx: *const Context = &table.slots[next_slot].as_ref().unwrap().context;
            switch = Some((prev_ctx, next_ctx));
        }
    }

    if let Some((prev_ctx, next_ctx)) = switch {
        // The table guard is gone — the resumed thread must find the
        // table unlocked. The raw pointers stay valid: slots never move,
        // and a switched-from slot is only reaped by a later dispatch.
        unsafe { arch::switch_context(prev_ctx, next_ctx) };
    }
}

/// Release the stacks of threads that finished dying before this
/// dispatch. Their slots are free for reuse afterwards.
fn reap_dying(table: &mut super::types::ThreadTable) {
    while let Some(tid) = table.destruction.pop_front() {
        crate::ktrace!("reaping dead thread {}", tid);
        table.remove(tid);
    }
}
