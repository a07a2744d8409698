//! Seedable kernel PRNG.
//!
//! Deterministic by default so test runs are reproducible; the `-rs=SEED`
//! boot flag reseeds it. xorshift64* is plenty for scheduling tests.

use spin::Mutex;

// Non-zero default state so the generator works unseeded.
static STATE: Mutex<u64> = Mutex::new(0x9e37_79b9_7f4a_7c15);

/// Reseed the generator. A zero seed is remapped; xorshift has no zero state.
pub fn seed(seed: u64) {
    let mut state = STATE.lock();
    *state = if seed == 0 { 0x9e37_79b9_7f4a_7c15 } else { seed };
}

/// Next raw 64-bit value.
pub fn next_u64() -> u64 {
    let mut state = STATE.lock();
    let mut x = *state;
    x ^= x >> 12;
    x ^= x << 25;
    x ^= x >> 27;
    *state = x;
    x.wrapping_mul(0x2545_f491_4f6c_dd1d)
}

/// Uniform-ish value in `[0, bound)`. `bound` must be non-zero.
pub fn below(bound: u64) -> u64 {
    next_u64() % bound
}
