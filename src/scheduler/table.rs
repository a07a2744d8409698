//! Global scheduler state.
//!
//! One mutex-guarded [`ThreadTable`] holds the whole of it. The mutex is
//! only ever taken with interrupts masked — on this single CPU it never
//! spins, it simply marks the scope that owns the state.

use core::sync::atomic::{AtomicBool, Ordering};

use spin::Mutex;

use crate::interrupts::{self, IntrLevel};

use super::types::{ThreadTable, Tid};

pub static THREAD_TABLE: Mutex<ThreadTable> = Mutex::new(ThreadTable::new());

/// Boot-time policy switch: false = strict priority with donation,
/// true = MLFQS.
static MLFQS_MODE: AtomicBool = AtomicBool::new(false);

/// Set once `start()` has created the idle thread; preemption and
/// yielding are inert before that.
static STARTED: AtomicBool = AtomicBool::new(false);

pub fn mlfqs_mode() -> bool {
    MLFQS_MODE.load(Ordering::Relaxed)
}

pub(crate) fn set_mlfqs_mode(enabled: bool) {
    MLFQS_MODE.store(enabled, Ordering::Relaxed);
}

pub fn started() -> bool {
    STARTED.load(Ordering::Relaxed)
}

pub(crate) fn set_started() {
    STARTED.store(true, Ordering::Relaxed);
}

/// Lock the thread table. Interrupt masking is the actual mutual
/// exclusion; taking the table with interrupts on is a bug.
pub(crate) fn locked() -> spin::MutexGuard<'static, ThreadTable> {
    debug_assert_eq!(
        interrupts::get_level(),
        IntrLevel::Off,
        "thread table accessed with interrupts enabled"
    );
    THREAD_TABLE.lock()
}

/// Tid of the running thread, for contexts that do not already hold the
/// table.
pub fn current_tid() -> Option<Tid> {
    let _m = interrupts::masked();
    locked().current
}
