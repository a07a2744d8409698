//! Scheduler statistics.

use spin::Mutex;

/// Counters accumulated since boot.
#[derive(Clone, Copy, Default)]
pub struct SchedStats {
    /// Timer ticks spent in the idle thread.
    pub idle_ticks: u64,
    /// Timer ticks spent in kernel threads.
    pub kernel_ticks: u64,
    /// Context switches performed.
    pub context_switches: u64,
    /// Yields requested by the tick handler (slice expiry or MLFQS
    /// priority change).
    pub deferred_yields: u64,
}

static SCHED_STATS: Mutex<SchedStats> = Mutex::new(SchedStats {
    idle_ticks: 0,
    kernel_ticks: 0,
    context_switches: 0,
    deferred_yields: 0,
});

pub(crate) fn record_tick(is_idle: bool) {
    let mut stats = SCHED_STATS.lock();
    if is_idle {
        stats.idle_ticks += 1;
    } else {
        stats.kernel_ticks += 1;
    }
}

pub(crate) fn record_switch() {
    SCHED_STATS.lock().context_switches += 1;
}

pub(crate) fn record_deferred_yield() {
    SCHED_STATS.lock().deferred_yields += 1;
}

pub fn get_stats() -> SchedStats {
    *SCHED_STATS.lock()
}

pub fn print_stats() {
    let stats = get_stats();
    crate::kinfo!(
        "Thread: {} idle ticks, {} kernel ticks",
        stats.idle_ticks,
        stats.kernel_ticks
    );
    crate::kinfo!(
        "Thread: {} context switches, {} deferred yields",
        stats.context_switches,
        stats.deferred_yields
    );
}
