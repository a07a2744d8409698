//! Counting semaphore.

use alloc::collections::VecDeque;
use alloc::sync::Arc;

use spin::Mutex;

use crate::interrupts;
use crate::scheduler::table;
use crate::scheduler::threads;
use crate::scheduler::types::{ThreadStatus, Tid};

struct SemaInner {
    value: usize,
    waiters: VecDeque<Tid>,
}

/// Counting semaphore. `down` waits for the value to become positive and
/// decrements it; `up` increments it and wakes the best waiter.
#[derive(Clone)]
pub struct Semaphore {
    inner: Arc<Mutex<SemaInner>>,
}

impl Semaphore {
    pub fn new(value: usize) -> Self {
        Self {
            inner: Arc::new(Mutex::new(SemaInner {
                value,
                waiters: VecDeque::new(),
            })),
        }
    }

    /// The "P" operation. Blocks while the value is zero, then
    /// decrements. Re-checks after every wakeup: another thread may have
    /// taken the value first. Not callable from an ISR.
    pub fn down(&self) {
        assert!(!interrupts::in_isr(), "sema down from interrupt context");

        let _m = interrupts::masked();
        loop {
            let mut inner = self.inner.lock();
            if inner.value > 0 {
                inner.value -= 1;
                return;
            }

            {
                let mut table = table::locked();
                let current = table.current_tid();
                inner.waiters.push_back(current);
                table.entry_mut(current).status = ThreadStatus::Blocked;
            }
            drop(inner);
            crate::scheduler::core::schedule();
        }
    }

    /// Decrement the value only if it is positive, without waiting.
    /// ISR-safe.
    pub fn try_down(&self) -> bool {
        let _m = interrupts::masked();
        let mut inner = self.inner.lock();
        if inner.value > 0 {
            inner.value -= 1;
            true
        } else {
            false
        }
    }

    /// The "V" operation. Increments the value and, if anyone is
    /// waiting, wakes the waiter with the highest effective priority as
    /// of right now — donation may have promoted a thread since it
    /// queued. ISR-safe; from thread context the woken thread may
    /// preempt the caller before `up` returns.
    pub fn up(&self) {
        let _m = interrupts::masked();

        let need_yield = {
            let mut inner = self.inner.lock();
            inner.value += 1;

            let mut need_yield = false;
            if !inner.waiters.is_empty() {
                let mut table = table::locked();
                let idx = table
                    .best_waiter(&inner.waiters)
                    .expect("non-empty waiter queue");
                let tid = inner.waiters.remove(idx).unwrap();
                need_yield = threads::unblock_locked(&mut table, tid);
            }
            need_yield
        };

        if need_yield {
            threads::yield_now();
        }
    }
}
