//! Thread management: creation, state transitions, priorities, and the
//! per-tick hook.
//!
//! Initialization is two-phase. [`init`] turns the boot path into the
//! initial thread ("main") with interrupts still off; [`start`] creates
//! the idle thread, enables interrupts, and from then on preemption is
//! live. The timer vector drives [`tick`] and [`wake_sleepers`] once per
//! tick from ISR context.

use alloc::boxed::Box;

use crate::fixed_point::Fixed;
use crate::interrupts::{self, IntrLevel};
use crate::options::KernelOptions;
use crate::sync::Semaphore;
use crate::{arch, timer};

use super::donate;
use super::mlfqs;
use super::stats;
use super::table;
use super::types::{
    ThreadName, ThreadStatus, Tid, NICE_MAX, NICE_MIN, PRI_DEFAULT, PRI_MAX, PRI_MIN, TIME_SLICE,
};

/// Turn the running boot path into the initial thread and apply the boot
/// options. Must run with interrupts off, before any other call into the
/// scheduler.
pub fn init(opts: &KernelOptions) {
    assert_eq!(
        interrupts::get_level(),
        IntrLevel::Off,
        "thread init with interrupts enabled"
    );

    table::set_mlfqs_mode(opts.mlfqs);
    if let Some(seed) = opts.rng_seed {
        crate::random::seed(seed);
    }
    if let Some(level) = opts.log_level {
        crate::logger::set_max_level(level);
    }

    let mut table = table::locked();
    assert!(table.current.is_none(), "thread init ran twice");

    let tid = table
        .allocate("main", PRI_DEFAULT, 0, Fixed::ZERO, false)
        .expect("empty thread table rejected the initial thread");
    table.entry_mut(tid).status = ThreadStatus::Running;
    table.current = Some(tid);

    crate::kinfo!(
        "thread system ready ({} scheduler)",
        if opts.mlfqs { "mlfqs" } else { "priority" }
    );
}

/// Create the idle thread and enable preemptive scheduling. Returns once
/// the idle thread has registered itself.
pub fn start() {
    let handshake = Semaphore::new(0);
    let started = handshake.clone();

    create("idle", PRI_MIN, move || idle_loop(started))
        .expect("failed to create the idle thread");

    table::set_started();
    interrupts::enable();
    handshake.down();
}

/// The idle thread: registers itself, then alternates between giving up
/// the CPU and halting until the next interrupt. It is returned directly
/// by the dispatcher when the ready queue is empty and is never queued.
fn idle_loop(started: Semaphore) {
    {
        let _m = interrupts::masked();
        let mut table = table::locked();
        let tid = table.current_tid();
        table.idle = Some(tid);
    }
    started.up();

    loop {
        interrupts::disable();
        block();
        arch::wait_for_interrupt();
    }
}

/// Entry point of every created thread: runs the closure with interrupts
/// on, then exits.
extern "C" fn thread_entry_trampoline(tid: usize) -> ! {
    let entry = {
        let mut table = table::locked();
        table
            .entry_mut(tid as Tid)
            .entry
            .take()
            .expect("thread dispatched twice into its trampoline")
    };

    interrupts::enable();
    entry();
    exit();
}

/// Create a thread and make it runnable. If it outranks the caller it
/// runs before `create` returns. Fails when the thread table is full.
///
/// Under MLFQS the priority argument is ignored; the thread inherits the
/// creator's `nice` and `recent_cpu` and its priority follows from them.
pub fn create<F>(name: &str, priority: i32, f: F) -> Result<Tid, &'static str>
where
    F: FnOnce() + Send + 'static,
{
    assert!(!interrupts::in_isr(), "thread creation from interrupt context");
    assert!(
        (PRI_MIN..=PRI_MAX).contains(&priority),
        "priority {} out of range",
        priority
    );

    let _m = interrupts::masked();

    let (tid, need_yield) = {
        let mut table = table::locked();

        let (nice, recent_cpu) = match table.current {
            Some(current) => {
                let entry = table.entry(current);
                (entry.nice, entry.recent_cpu)
            }
            None => (0, Fixed::ZERO),
        };
        let priority = if table::mlfqs_mode() {
            mlfqs::priority_for(recent_cpu, nice)
        } else {
            priority
        };

        let tid = table.allocate(name, priority, nice, recent_cpu, true)?;
        let entry = table.entry_mut(tid);
        entry.entry = Some(Box::new(f));
        let stack_top = entry.stack_top();
        entry
            .context
            .prepare(thread_entry_trampoline, tid as usize, stack_top);

        let need_yield = unblock_locked(&mut table, tid);
        (tid, need_yield)
    };

    if need_yield {
        yield_now();
    }
    Ok(tid)
}

/// Move the current thread to `Blocked` and dispatch. The caller has
/// interrupts masked and has arranged for somebody to unblock it.
pub fn block() {
    assert!(!interrupts::in_isr(), "block from interrupt context");
    assert_eq!(
        interrupts::get_level(),
        IntrLevel::Off,
        "block with interrupts enabled"
    );

    {
        let mut table = table::locked();
        let current = table.current_tid();
        table.entry_mut(current).status = ThreadStatus::Blocked;
    }
    super::core::schedule();
}

/// Transition inside an already-locked table; returns whether the caller
/// must yield (thread context) — in ISR context the yield is deferred to
/// the interrupt's return instead.
pub(crate) fn unblock_locked(table: &mut super::types::ThreadTable, tid: Tid) -> bool {
    assert_eq!(
        table.entry(tid).status,
        ThreadStatus::Blocked,
        "unblock of a thread that is not blocked"
    );

    table.entry_mut(tid).status = ThreadStatus::Ready;
    if table.idle != Some(tid) {
        table.ready_push(tid);
    }

    if !table::started() {
        return false;
    }
    let Some(current) = table.current else {
        return false;
    };

    if table.entry(tid).priority > table.entry(current).priority {
        if interrupts::in_isr() {
            interrupts::yield_on_return();
            false
        } else {
            true
        }
    } else {
        false
    }
}

/// Make a blocked thread runnable. If it outranks the running thread the
/// caller yields before returning to its own work (directly from thread
/// context, via the deferred-yield flag from an ISR).
pub fn unblock(tid: Tid) {
    let _m = interrupts::masked();
    let need_yield = {
        let mut table = table::locked();
        unblock_locked(&mut table, tid)
    };
    if need_yield {
        yield_now();
    }
}

/// Give up the CPU; the thread stays runnable and may be rescheduled
/// immediately if it is still the best candidate.
pub fn yield_now() {
    assert!(!interrupts::in_isr(), "yield from interrupt context");
    if !table::started() {
        return;
    }

    let _m = interrupts::masked();
    {
        let mut table = table::locked();
        let current = table.current_tid();
        if table.idle != Some(current) {
            table.ready_push(current);
        }
        table.entry_mut(current).status = ThreadStatus::Ready;
    }
    super::core::schedule();
}

/// Deschedule and destroy the current thread. The stack is reclaimed by
/// a later dispatch, never by the exiting thread itself.
pub fn exit() -> ! {
    assert!(!interrupts::in_isr(), "exit from interrupt context");

    interrupts::disable();
    {
        let mut table = table::locked();
        let current = table.current_tid();
        crate::ktrace!("thread {} exiting", current);
        table.entry_mut(current).status = ThreadStatus::Dying;
    }
    super::core::schedule();
    unreachable!("a dying thread was dispatched again");
}

/// Suspend the current thread until `ticks() >= wakeup_tick`. Wakeups are
/// never early; under load they may be late.
pub fn sleep_until(wakeup_tick: i64) {
    assert!(!interrupts::in_isr(), "sleep from interrupt context");

    let _m = interrupts::masked();
    {
        let mut table = table::locked();
        let current = table.current_tid();
        assert!(
            table.idle != Some(current),
            "the idle thread cannot sleep"
        );
        table.entry_mut(current).wakeup_tick = wakeup_tick;
        table.sleepers.insert(current, wakeup_tick);
        table.entry_mut(current).status = ThreadStatus::Blocked;
    }
    super::core::schedule();
}

/// ISR: unblock every sleeper whose wakeup tick has arrived.
pub(crate) fn wake_sleepers(now: i64) {
    let mut table = table::locked();
    while let Some(tid) = table.sleepers.pop_expired(now) {
        unblock_locked(&mut table, tid);
    }
}

/// Timer tick hook, ISR context. Runs the MLFQS cadences and requests a
/// deferred yield when the running thread's slice is up (or, under MLFQS,
/// when recomputation leaves a better thread ready).
pub fn tick(now: i64) {
    debug_assert!(interrupts::in_isr(), "scheduler tick outside the timer interrupt");

    let mut table = table::locked();
    let Some(current) = table.current else {
        return;
    };
    stats::record_tick(table.idle == Some(current));

    if table::mlfqs_mode() {
        mlfqs::bump_recent_cpu(&mut table);

        if now % timer::TIMER_FREQ as i64 == 0 {
            mlfqs::update_load_avg_and_recent(&mut table);
        }
        if now % TIME_SLICE as i64 == 0 {
            mlfqs::recompute_all_priorities(&mut table);

            let current_priority = table.entry(current).priority;
            if table.highest_ready_priority() > Some(current_priority) {
                stats::record_deferred_yield();
                interrupts::yield_on_return();
            }
        }
    }

    table.slice_ticks += 1;
    if table.slice_ticks >= TIME_SLICE {
        stats::record_deferred_yield();
        interrupts::yield_on_return();
    }
}

pub fn current_tid() -> Tid {
    let _m = interrupts::masked();
    table::locked().current_tid()
}

pub fn name() -> ThreadName {
    let _m = interrupts::masked();
    let table = table::locked();
    table.entry(table.current_tid()).name
}

/// The current thread's effective priority.
pub fn get_priority() -> i32 {
    let _m = interrupts::masked();
    let table = table::locked();
    table.entry(table.current_tid()).priority
}

/// Set the current thread's base priority. Donations it is receiving
/// still apply; if the change leaves a higher-priority thread ready, the
/// CPU goes there now. No-op under MLFQS.
pub fn set_priority(new_priority: i32) {
    if table::mlfqs_mode() {
        return;
    }
    assert!(
        (PRI_MIN..=PRI_MAX).contains(&new_priority),
        "priority {} out of range",
        new_priority
    );

    let _m = interrupts::masked();
    let need_yield = {
        let mut table = table::locked();
        let current = table.current_tid();
        table.entry_mut(current).base_priority = new_priority;
        donate::recompute_priority(&mut table, current);

        let current_priority = table.entry(current).priority;
        table.highest_ready_priority() > Some(current_priority)
    };
    if need_yield {
        yield_now();
    }
}

pub fn get_nice() -> i32 {
    let _m = interrupts::masked();
    let table = table::locked();
    table.entry(table.current_tid()).nice
}

/// Set the current thread's niceness. Under MLFQS the priority is
/// recomputed immediately; the thread yields only if that leaves a
/// strictly higher-priority thread ready.
pub fn set_nice(nice: i32) {
    let nice = nice.clamp(NICE_MIN, NICE_MAX);

    let _m = interrupts::masked();
    let need_yield = {
        let mut table = table::locked();
        let current = table.current_tid();
        table.entry_mut(current).nice = nice;

        if table::mlfqs_mode() {
            let entry = table.entry_mut(current);
            let priority = mlfqs::priority_for(entry.recent_cpu, nice);
            entry.priority = priority;
            entry.base_priority = priority;
        }

        let current_priority = table.entry(current).priority;
        table.highest_ready_priority() > Some(current_priority)
    };
    if need_yield {
        yield_now();
    }
}

/// System load average, scaled by 100 and rounded to nearest.
pub fn load_avg_x100() -> i32 {
    let _m = interrupts::masked();
    table::locked().load_avg.mul_int(100).round()
}

/// The current thread's `recent_cpu`, scaled by 100 and rounded.
pub fn recent_cpu_x100() -> i32 {
    let _m = interrupts::masked();
    let table = table::locked();
    table.entry(table.current_tid()).recent_cpu.mul_int(100).round()
}

pub fn print_stats() {
    stats::print_stats();
}
