//! Interrupt level control.
//!
//! On this single CPU, masking interrupts is the kernel's only mutual
//! exclusion mechanism: every inspection or mutation of scheduler state
//! happens with interrupts off. The [`Masked`] guard is the scoped form —
//! it restores the previous level on every exit path, including the far
//! side of a context switch (the restore then pairs with the resumed
//! thread, which is exactly the semantics the scheduler needs).

use core::sync::atomic::{AtomicBool, Ordering};

use crate::arch;

/// Whether we are currently servicing an external interrupt.
static IN_ISR: AtomicBool = AtomicBool::new(false);

/// Set from ISR context when the running thread must yield as soon as the
/// interrupt returns.
static YIELD_ON_RETURN: AtomicBool = AtomicBool::new(false);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IntrLevel {
    /// Interrupts enabled.
    On,
    /// Interrupts disabled.
    Off,
}

pub fn get_level() -> IntrLevel {
    if arch::interrupts_enabled() {
        IntrLevel::On
    } else {
        IntrLevel::Off
    }
}

/// Enable interrupts and return the previous level. Illegal inside an ISR:
/// external interrupt handlers do not nest.
pub fn enable() -> IntrLevel {
    assert!(!in_isr(), "interrupts cannot be enabled inside an interrupt handler");

    let old = get_level();
    arch::enable_interrupts();
    old
}

/// Disable interrupts and return the previous level.
pub fn disable() -> IntrLevel {
    let old = get_level();
    arch::disable_interrupts();
    old
}

pub fn set_level(level: IntrLevel) -> IntrLevel {
    match level {
        IntrLevel::On => enable(),
        IntrLevel::Off => disable(),
    }
}

/// Scoped interrupt masking; see the module docs.
#[must_use = "dropping the guard immediately re-enables interrupts"]
pub struct Masked {
    prev: IntrLevel,
}

pub fn masked() -> Masked {
    Masked { prev: disable() }
}

impl Drop for Masked {
    fn drop(&mut self) {
        set_level(self.prev);
    }
}

/// True while an external interrupt handler runs.
pub fn in_isr() -> bool {
    IN_ISR.load(Ordering::Relaxed)
}

/// Bracket an external interrupt handler. The outer kernel's vector stub
/// calls this first, then the handler, then [`exit_isr`].
pub fn enter_isr() {
    assert_eq!(get_level(), IntrLevel::Off, "external interrupts must arrive masked");
    assert!(!IN_ISR.swap(true, Ordering::Relaxed), "nested external interrupt");
}

/// Leave ISR context; performs the deferred yield requested by
/// [`yield_on_return`] now that blocking is legal again.
pub fn exit_isr() {
    assert!(IN_ISR.swap(false, Ordering::Relaxed), "exit_isr outside an interrupt");

    if YIELD_ON_RETURN.swap(false, Ordering::Relaxed) {
        crate::scheduler::threads::yield_now();
    }
}

/// Ask for a yield at the end of the current interrupt. ISR context only.
pub fn yield_on_return() {
    assert!(in_isr(), "deferred yield requested outside an interrupt");
    YIELD_ON_RETURN.store(true, Ordering::Relaxed);
}
