//! Machine layer.
//!
//! Everything the scheduler needs from the CPU lives behind this module:
//! the interrupt flag, the saved-register frame and the context switch,
//! the halt instruction, and the 8254 timer programming. On the real
//! target this is x86_64; on any other target a hosted double with an
//! atomic interrupt flag and an inert context stands in, which is what
//! lets the logic build (and the pure parts run) off the metal.

#[cfg(target_arch = "x86_64")]
mod x86_64;
#[cfg(target_arch = "x86_64")]
pub use self::x86_64::*;

#[cfg(not(target_arch = "x86_64"))]
mod hosted;
#[cfg(not(target_arch = "x86_64"))]
pub use self::hosted::*;
