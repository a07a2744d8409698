//! Synchronization primitives: counting semaphore, lock with priority
//! donation, condition variable.
//!
//! Handles are cheap `Arc` clones — two clones name the same primitive,
//! which is how they are shared across threads. All waiting is
//! priority-aware: wakeups go to the highest-priority waiter.

mod condvar;
mod lock;
mod semaphore;

pub use self::condvar::Condvar;
pub use self::lock::Lock;
pub use self::semaphore::Semaphore;
