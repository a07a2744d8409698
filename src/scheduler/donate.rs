//! Priority donation bookkeeping.
//!
//! A thread blocked on a lock donates its effective priority to the
//! holder, transitively along the holder's own `waiting_for_lock` chain.
//! Each thread is in at most one donor set — that of the holder of the
//! lock it is blocked on — which is what makes the unwind on release
//! local: stripping the donors tied to one lock leaves donations arriving
//! through every other lock intact.
//!
//! These functions only touch the thread table (and read lock state
//! already resolved by the caller), so the whole protocol is exercised by
//! the host test suite.

use alloc::sync::Arc;
use alloc::vec::Vec;

use super::types::{LockRef, ThreadTable, Tid};

/// Recompute one thread's effective priority from its base and donors.
pub fn recompute_priority(table: &mut ThreadTable, tid: Tid) {
    let (base, donors) = {
        let entry = table.entry(tid);
        (entry.base_priority, entry.donors.clone())
    };

    let mut priority = base;
    for donor in donors {
        priority = priority.max(table.entry(donor).priority);
    }
    table.entry_mut(tid).priority = priority;
}

/// Recompute from `start` down the chain of lock holders. The chain must
/// be acyclic; a cycle is a deadlock and a kernel bug upstream of here.
pub fn propagate_from(table: &mut ThreadTable, start: Tid) {
    let mut donee = Some(start);
    while let Some(tid) = donee {
        recompute_priority(table, tid);
        donee = table
            .entry(tid)
            .waiting_for_lock
            .as_ref()
            .and_then(|lock| lock.lock().holder);
    }
}

/// Record that `donor` now blocks on `lock` (held by `holder`) and push
/// its priority down the chain. The caller owns the lock's inner guard,
/// so the holder is passed in rather than re-read.
pub fn register_donation(table: &mut ThreadTable, donor: Tid, lock: &LockRef, holder: Tid) {
    table.entry_mut(donor).waiting_for_lock = Some(lock.clone());

    let donors = &mut table.entry_mut(holder).donors;
    debug_assert!(
        !donors.contains(&donor),
        "thread {} is already in a donor set",
        donor
    );
    donors.push(donor);

    crate::ktrace!("thread {} donates to {} (chain walk)", donor, holder);
    propagate_from(table, holder);
}

/// On release of `lock` by `holder`: the donors that were waiting on this
/// particular lock stop donating, and the holder's priority falls back to
/// whatever its base and remaining donors justify.
pub fn strip_donations_for_lock(table: &mut ThreadTable, holder: Tid, lock: &LockRef) {
    let stale: Vec<Tid> = table
        .entry(holder)
        .donors
        .iter()
        .copied()
        .filter(|&donor| {
            table
                .entry(donor)
                .waiting_for_lock
                .as_ref()
                .map_or(false, |waited| Arc::ptr_eq(waited, lock))
        })
        .collect();

    table
        .entry_mut(holder)
        .donors
        .retain(|donor| !stale.contains(donor));

    recompute_priority(table, holder);
}
