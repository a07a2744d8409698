//! Condition variable, Mesa semantics.
//!
//! Each waiter parks on a private binary semaphore ("gate") tagged with
//! its effective priority snapshotted at wait time. `signal` wakes the
//! highest-snapshot gate; it does not hand over the lock — the woken
//! thread reacquires it and must re-check its condition. The snapshot is
//! deliberately not refreshed by later donation: condition waits are
//! short-lived rendezvous and this matches the behavior the tests pin.

use alloc::sync::Arc;
use alloc::vec::Vec;

use spin::Mutex;

use crate::interrupts;
use crate::scheduler::threads;

use super::lock::Lock;
use super::semaphore::Semaphore;

struct Waiter {
    gate: Semaphore,
    priority: i32,
}

#[derive(Clone)]
pub struct Condvar {
    waiters: Arc<Mutex<Vec<Waiter>>>,
}

impl Condvar {
    pub fn new() -> Self {
        Self {
            waiters: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Atomically release `lock` and wait for a signal; reacquires the
    /// lock before returning. The caller must hold `lock`.
    pub fn wait(&self, lock: &Lock) {
        assert!(!interrupts::in_isr(), "condition wait from interrupt context");
        assert!(lock.held_by_current(), "condition wait without holding the lock");

        let gate = Semaphore::new(0);
        {
            let _m = interrupts::masked();
            self.waiters.lock().push(Waiter {
                gate: gate.clone(),
                priority: threads::get_priority(),
            });
        }

        lock.release();
        gate.down();
        lock.acquire();
    }

    /// Wake one waiter — the one with the highest priority snapshot,
    /// FIFO among equals. The caller must hold the associated lock.
    pub fn signal(&self, lock: &Lock) {
        assert!(!interrupts::in_isr(), "condition signal from interrupt context");
        assert!(lock.held_by_current(), "condition signal without holding the lock");

        let waiter = {
            let _m = interrupts::masked();
            let mut waiters = self.waiters.lock();

            let mut best: Option<(usize, i32)> = None;
            for (idx, waiter) in waiters.iter().enumerate() {
                if best.map_or(true, |(_, bp)| waiter.priority > bp) {
                    best = Some((idx, waiter.priority));
                }
            }
            best.map(|(idx, _)| waiters.remove(idx))
        };

        if let Some(waiter) = waiter {
            waiter.gate.up();
        }
    }

    /// Wake every waiter, best snapshots first.
    pub fn broadcast(&self, lock: &Lock) {
        loop {
            let empty = {
                let _m = interrupts::masked();
                self.waiters.lock().is_empty()
            };
            if empty {
                break;
            }
            self.signal(lock);
        }
    }
}

impl Default for Condvar {
    fn default() -> Self {
        Self::new()
    }
}
