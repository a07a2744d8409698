//! Sleep queue: threads waiting for a wakeup tick.
//!
//! Kept ordered by ascending wakeup tick so the per-tick scan only ever
//! inspects the head. Insertion pays the linear walk instead.

use alloc::collections::VecDeque;

use super::types::Tid;

#[derive(Clone, Copy, Debug)]
pub struct SleepEntry {
    pub tid: Tid,
    pub wakeup_tick: i64,
}

pub struct SleepQueue {
    entries: VecDeque<SleepEntry>,
}

impl SleepQueue {
    pub const fn new() -> Self {
        Self {
            entries: VecDeque::new(),
        }
    }

    /// Insert in wakeup-tick order. Equal ticks keep arrival order.
    pub fn insert(&mut self, tid: Tid, wakeup_tick: i64) {
        let pos = self
            .entries
            .iter()
            .position(|e| e.wakeup_tick > wakeup_tick)
            .unwrap_or(self.entries.len());
        self.entries.insert(pos, SleepEntry { tid, wakeup_tick });
    }

    /// Pop one thread whose wakeup tick has arrived, if any. The queue is
    /// ordered, so a head that is still sleeping ends the scan.
    pub fn pop_expired(&mut self, now: i64) -> Option<Tid> {
        if self.entries.front()?.wakeup_tick <= now {
            self.entries.pop_front().map(|e| e.tid)
        } else {
            None
        }
    }

    /// Earliest pending wakeup tick.
    pub fn next_wakeup(&self) -> Option<i64> {
        self.entries.front().map(|e| e.wakeup_tick)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Ordering invariant check, for assertions.
    pub fn is_ordered(&self) -> bool {
        self.entries
            .iter()
            .zip(self.entries.iter().skip(1))
            .all(|(a, b)| a.wakeup_tick <= b.wakeup_tick)
    }
}
