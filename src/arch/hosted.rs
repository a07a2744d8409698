//! Hosted machine double for non-x86_64 builds.
//!
//! The interrupt flag becomes an atomic and the context becomes inert so
//! the scheduler logic builds and its pure parts can run under a host
//! test harness. Actually switching stacks needs the real target.

use core::sync::atomic::{AtomicBool, Ordering};

static INTERRUPTS_ENABLED: AtomicBool = AtomicBool::new(false);

pub fn interrupts_enabled() -> bool {
    INTERRUPTS_ENABLED.load(Ordering::Relaxed)
}

pub fn enable_interrupts() {
    INTERRUPTS_ENABLED.store(true, Ordering::Relaxed);
}

pub fn disable_interrupts() {
    INTERRUPTS_ENABLED.store(false, Ordering::Relaxed);
}

pub fn wait_for_interrupt() {
    enable_interrupts();
    core::hint::spin_loop();
}

pub fn pit_init(_freq: u32) {}

/// Inert stand-in for the saved register frame.
#[derive(Clone, Copy)]
pub struct Context {
    _private: (),
}

impl Context {
    pub const fn zeroed() -> Self {
        Self { _private: () }
    }

    pub fn prepare(&mut self, _entry: extern "C" fn(usize) -> !, _arg: usize, _stack_top: u64) {}
}

/// # Safety
/// Never actually switches; only the x86_64 target can.
pub unsafe fn switch_context(_old: *mut Context, _new: *const Context) {
    unreachable!("context switch requires the x86_64 target");
}
