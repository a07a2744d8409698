//! Mutual-exclusion lock with nested priority donation.
//!
//! Owned by at most one thread, non-recursive. In the strict-priority
//! policy a blocked acquirer donates its effective priority to the
//! holder, transitively along the holder's own wait chain, and the
//! donation unwinds per-lock on release. Under MLFQS donation is
//! disabled and this degenerates to a priority-ordered mutex.
//!
//! Release hands the lock to the woken waiter directly: `holder` keeps
//! naming the releaser until the waiter runs and installs itself, so a
//! `try_acquire` in between correctly fails. The waiter queue is managed
//! here, not through a semaphore value — the handoff is what preserves
//! donation semantics.

use alloc::sync::Arc;

use spin::Mutex;

use crate::interrupts;
use crate::scheduler::donate;
use crate::scheduler::table;
use crate::scheduler::threads;
use crate::scheduler::types::{LockInner, LockRef, ThreadStatus};

#[derive(Clone)]
pub struct Lock {
    inner: LockRef,
}

impl Lock {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(LockInner::new())),
        }
    }

    /// Block until this thread owns the lock.
    pub fn acquire(&self) {
        assert!(!interrupts::in_isr(), "lock acquire from interrupt context");
        assert!(!self.held_by_current(), "recursive lock acquire");

        let _m = interrupts::masked();
        let mut inner = self.inner.lock();

        match inner.holder {
            None => {
                let table = table::locked();
                inner.holder = Some(table.current_tid());
            }
            Some(holder) => {
                {
                    let mut table = table::locked();
                    let current = table.current_tid();

                    if !table::mlfqs_mode() {
                        donate::register_donation(&mut table, current, &self.inner, holder);
                    }

                    inner.waiters.push_back(current);
                    table.entry_mut(current).status = ThreadStatus::Blocked;
                }
                drop(inner);
                crate::scheduler::core::schedule();

                // Woken by release: ownership was handed to us.
                let mut inner = self.inner.lock();
                let mut table = table::locked();
                let current = table.current_tid();
                inner.holder = Some(current);
                table.entry_mut(current).waiting_for_lock = None;
            }
        }
    }

    /// Take the lock only if it is free, without waiting.
    pub fn try_acquire(&self) -> bool {
        assert!(!self.held_by_current(), "recursive lock acquire");

        let _m = interrupts::masked();
        let mut inner = self.inner.lock();
        if inner.holder.is_none() {
            let table = table::locked();
            inner.holder = Some(table.current_tid());
            true
        } else {
            false
        }
    }

    /// Release the lock; the caller must hold it. The donations that
    /// arrived through this lock end here, and if shedding them leaves a
    /// higher-priority thread ready, the CPU goes there before this
    /// returns.
    pub fn release(&self) {
        assert!(
            self.held_by_current(),
            "lock released by a thread that does not hold it"
        );

        let _m = interrupts::masked();
        let need_yield = {
            let mut inner = self.inner.lock();
            let mut table = table::locked();
            let current = table.current_tid();

            if !table::mlfqs_mode() {
                donate::strip_donations_for_lock(&mut table, current, &self.inner);
            }

            let mut need_yield = false;
            match table.best_waiter(&inner.waiters) {
                Some(idx) => {
                    // Handoff: the woken thread becomes the holder when
                    // it resumes inside acquire().
                    let tid = inner.waiters.remove(idx).unwrap();
                    need_yield = threads::unblock_locked(&mut table, tid);
                }
                None => inner.holder = None,
            }

            let current_priority = table.entry(current).priority;
            need_yield || table.highest_ready_priority() > Some(current_priority)
        };

        if need_yield {
            threads::yield_now();
        }
    }

    /// Whether the calling thread owns this lock.
    pub fn held_by_current(&self) -> bool {
        let _m = interrupts::masked();
        let holder = self.inner.lock().holder;
        holder == Some(table::locked().current_tid())
    }
}

impl Default for Lock {
    fn default() -> Self {
        Self::new()
    }
}
