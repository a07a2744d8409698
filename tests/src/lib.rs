//! Tern test suite.
//!
//! This crate tests kernel code by including kernel source files
//! directly, which sidesteps the `no_std` target without forking the
//! logic under test.
//!
//! # How it works
//! 1. Stub macros (`kinfo!`, `ktrace!`, ...) replace the kernel's logging
//!    macros; they print to stderr or do nothing.
//! 2. `#[path = "..."]` mounts kernel source files at the paths they
//!    expect (`crate::fixed_point`, `crate::scheduler::types`, ...).
//! 3. A mock `arch` module stands in for the machine layer, so the
//!    scheduler state machine runs without an x86_64 context switch.

extern crate alloc;

// ===========================================================================
// Kernel macro stubs - these replace the kernel's logging macros for testing
// ===========================================================================

/// Stub for the kernel's kfatal! macro - prints to stderr in tests.
#[macro_export]
macro_rules! kfatal {
    ($($arg:tt)*) => {{
        #[cfg(test)]
        eprintln!("[FATAL] {}", format_args!($($arg)*));
    }};
}

/// Stub for the kernel's kerror! macro - prints to stderr in tests.
#[macro_export]
macro_rules! kerror {
    ($($arg:tt)*) => {{
        #[cfg(test)]
        eprintln!("[ERROR] {}", format_args!($($arg)*));
    }};
}

/// Stub for the kernel's kwarn! macro - prints to stderr in tests.
#[macro_export]
macro_rules! kwarn {
    ($($arg:tt)*) => {{
        #[cfg(test)]
        eprintln!("[WARN] {}", format_args!($($arg)*));
    }};
}

/// Stub for the kernel's kinfo! macro - prints to stdout in tests.
#[macro_export]
macro_rules! kinfo {
    ($($arg:tt)*) => {{
        #[cfg(test)]
        eprintln!("[INFO] {}", format_args!($($arg)*));
    }};
}

/// Stub for the kernel's kdebug! macro - no-op in tests.
#[macro_export]
macro_rules! kdebug {
    ($($arg:tt)*) => {{}};
}

/// Stub for the kernel's ktrace! macro - no-op in tests (too verbose).
#[macro_export]
macro_rules! ktrace {
    ($($arg:tt)*) => {{}};
}

// ===========================================================================
// Import kernel source files directly using #[path]
// ===========================================================================

#[path = "../../src/fixed_point.rs"]
pub mod fixed_point;

#[path = "../../src/logger.rs"]
pub mod logger;

#[path = "../../src/options.rs"]
pub mod options;

#[path = "../../src/random.rs"]
pub mod random;

// Scheduler state machine (thread table, donation, sleep queue, MLFQS).
pub mod scheduler;

// ===========================================================================
// Mock machine layer
// ===========================================================================

pub mod arch;

// ===========================================================================
// Test modules
// ===========================================================================

#[cfg(test)]
mod fixed_point_tests;
