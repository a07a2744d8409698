//! System timer: the monotonic tick count, timed sleeps, and the
//! calibrated busy loop for sub-tick delays.
//!
//! The outer kernel routes the timer vector here:
//!
//! ```text
//! interrupts::enter_isr();
//! timer::interrupt_tick();
//! interrupts::exit_isr();   // performs any deferred yield
//! ```
//!
//! Within one tick the order is fixed: count the tick, run the
//! scheduler's accounting (which may request preemption), then wake
//! sleepers.

use core::sync::atomic::{AtomicI64, AtomicU64, Ordering};

use crate::interrupts::{self, IntrLevel};
use crate::scheduler::threads;
use crate::{arch, kinfo};

/// Timer interrupts per second. The 8254 cannot do better than 19 Hz and
/// more than 1000 leaves no time to do work between ticks.
pub const TIMER_FREQ: u32 = 100;
const _: () = assert!(19 <= TIMER_FREQ && TIMER_FREQ <= 1000);

/// Ticks since boot.
static TICKS: AtomicI64 = AtomicI64::new(0);

/// Busy-loop iterations per tick, fitted by [`calibrate`].
static LOOPS_PER_TICK: AtomicU64 = AtomicU64::new(0);

/// Program the hardware timer and hook the logger's timestamps up to the
/// tick count. Interrupt routing stays with the outer kernel.
pub fn init() {
    arch::pit_init(TIMER_FREQ);
    crate::logger::set_time_source(ticks);
}

/// Ticks since boot. Reads under masking so the count never tears
/// against the interrupt that increments it.
pub fn ticks() -> i64 {
    let _m = interrupts::masked();
    TICKS.load(Ordering::Relaxed)
}

/// Ticks elapsed since `then`, which should be a previous [`ticks`]
/// result.
pub fn elapsed(then: i64) -> i64 {
    ticks() - then
}

/// Suspend execution for about `n` timer ticks; `n <= 0` returns at
/// once. Never wakes early.
pub fn sleep(n: i64) {
    if n <= 0 {
        return;
    }
    threads::sleep_until(ticks() + n);
}

/// Suspend execution for about `ms` milliseconds.
pub fn msleep(ms: i64) {
    real_time_sleep(ms, 1000);
}

/// Suspend execution for about `us` microseconds.
pub fn usleep(us: i64) {
    real_time_sleep(us, 1000 * 1000);
}

/// Suspend execution for about `ns` nanoseconds.
pub fn nsleep(ns: i64) {
    real_time_sleep(ns, 1000 * 1000 * 1000);
}

/// Timer interrupt body. ISR context.
pub fn interrupt_tick() {
    let now = TICKS.fetch_add(1, Ordering::Relaxed) + 1;
    threads::tick(now);
    threads::wake_sleepers(now);
}

pub fn print_stats() {
    kinfo!("Timer: {} ticks", ticks());
}

/// Fit `LOOPS_PER_TICK` for sub-tick busy waits. Needs live interrupts;
/// run once after `threads::start()`.
pub fn calibrate() {
    assert_eq!(
        interrupts::get_level(),
        IntrLevel::On,
        "timer calibration needs interrupts on"
    );

    // Largest power of two that still fits in one tick.
    let mut loops_per_tick: u64 = 1 << 10;
    while !too_many_loops(loops_per_tick << 1) {
        loops_per_tick <<= 1;
        assert!(loops_per_tick != 0);
    }

    // Refine the next 8 bits.
    let high_bit = loops_per_tick;
    let mut test_bit = high_bit >> 1;
    while test_bit != high_bit >> 10 {
        if !too_many_loops(high_bit | test_bit) {
            loops_per_tick |= test_bit;
        }
        test_bit >>= 1;
    }

    LOOPS_PER_TICK.store(loops_per_tick, Ordering::Relaxed);
    kinfo!(
        "Calibrated timer: {} loops/s",
        loops_per_tick * TIMER_FREQ as u64
    );
}

/// Whether `loops` busy iterations span more than one timer tick.
fn too_many_loops(loops: u64) -> bool {
    // Start on a tick edge.
    let start = TICKS.load(Ordering::Relaxed);
    while TICKS.load(Ordering::Relaxed) == start {
        core::hint::spin_loop();
    }

    let start = TICKS.load(Ordering::Relaxed);
    busy_wait(loops as i64);
    start != TICKS.load(Ordering::Relaxed)
}

/// Spin for `loops` iterations. Kept out of line so inlining differences
/// cannot skew the calibration.
#[inline(never)]
fn busy_wait(mut loops: i64) {
    while loops > 0 {
        core::hint::spin_loop();
        loops -= 1;
    }
}

/// Sleep for about `num / denom` seconds.
fn real_time_sleep(num: i64, denom: i64) {
    // num / denom seconds is num * TIMER_FREQ / denom ticks, truncated.
    let ticks = num * TIMER_FREQ as i64 / denom;

    assert_eq!(
        interrupts::get_level(),
        IntrLevel::On,
        "real-time sleep needs interrupts on"
    );

    if ticks > 0 {
        // A full tick or more: let the scheduler have the CPU.
        sleep(ticks);
    } else {
        // Sub-tick interval: busy-wait for accuracy. Scale num and denom
        // down by 1000 to dodge overflow in the product.
        assert!(denom % 1000 == 0);
        let loops = LOOPS_PER_TICK.load(Ordering::Relaxed) as i64;
        busy_wait(loops * num / 1000 * TIMER_FREQ as i64 / (denom / 1000));
    }
}
