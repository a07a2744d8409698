//! Thread scheduler.
//!
//! Strict priority scheduling with donation through locks by default; the
//! `-mlfqs` boot flag swaps in a multi-level feedback queue policy whose
//! priorities derive from per-thread CPU usage and a system load average.
//! One CPU, interrupt masking as the only mutual exclusion, preemption
//! delivered at scheduler entry points and at timer-interrupt return.
//!
//! ## Module organization
//!
//! - `types`: constants, thread control block, thread table
//! - `table`: the mutex-guarded global state and mode flags
//! - `core`: the dispatcher and dying-thread reclamation
//! - `threads`: public thread operations and the per-tick hook
//! - `sleep`: the ordered sleep queue
//! - `donate`: priority donation bookkeeping
//! - `mlfqs`: the MLFQS accounting pipeline
//! - `stats`: tick and context-switch counters

pub mod core;
pub mod donate;
pub mod mlfqs;
pub mod sleep;
pub mod stats;
pub mod table;
pub mod threads;
pub mod types;

pub use self::stats::{get_stats, SchedStats};
pub use self::table::{current_tid, mlfqs_mode, started};
pub use self::types::{
    ThreadName, ThreadStatus, Tid, NICE_MAX, NICE_MIN, PRI_DEFAULT, PRI_MAX, PRI_MIN, TIME_SLICE,
};
