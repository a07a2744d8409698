//! 17.14 signed fixed-point arithmetic.
//!
//! The MLFQS recurrences (`load_avg`, `recent_cpu`) are specified in real
//! arithmetic but the kernel has no floating point, so they are evaluated
//! in a 17.14 fixed-point format: the value `x` is represented by the
//! integer `x * F` with `F = 2^14`. Multiplication and division widen to
//! 64 bits to keep the intermediate product exact.

use core::fmt;
use core::ops::{Add, Div, Mul, Sub};

/// Scale factor: one in fixed-point representation.
pub const F: i32 = 1 << 14;

/// A 17.14 signed fixed-point number.
#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct Fixed(i32);

impl Fixed {
    pub const ZERO: Fixed = Fixed(0);

    /// Convert an integer to fixed point.
    #[inline]
    pub const fn from_int(n: i32) -> Fixed {
        Fixed(n * F)
    }

    /// Wrap a raw 17.14 representation.
    #[inline]
    pub const fn from_raw(raw: i32) -> Fixed {
        Fixed(raw)
    }

    /// The raw 17.14 representation.
    #[inline]
    pub const fn raw(self) -> i32 {
        self.0
    }

    /// Convert to integer, truncating toward zero.
    #[inline]
    pub const fn trunc(self) -> i32 {
        self.0 / F
    }

    /// Convert to integer, rounding to the nearest.
    #[inline]
    pub const fn round(self) -> i32 {
        if self.0 >= 0 {
            (self.0 + F / 2) / F
        } else {
            (self.0 - F / 2) / F
        }
    }

    #[inline]
    pub const fn add_int(self, n: i32) -> Fixed {
        Fixed(self.0 + n * F)
    }

    #[inline]
    pub const fn sub_int(self, n: i32) -> Fixed {
        Fixed(self.0 - n * F)
    }

    #[inline]
    pub const fn mul_int(self, n: i32) -> Fixed {
        Fixed(self.0 * n)
    }

    #[inline]
    pub const fn div_int(self, n: i32) -> Fixed {
        Fixed(self.0 / n)
    }
}

impl Add for Fixed {
    type Output = Fixed;

    #[inline]
    fn add(self, rhs: Fixed) -> Fixed {
        Fixed(self.0 + rhs.0)
    }
}

impl Sub for Fixed {
    type Output = Fixed;

    #[inline]
    fn sub(self, rhs: Fixed) -> Fixed {
        Fixed(self.0 - rhs.0)
    }
}

impl Mul for Fixed {
    type Output = Fixed;

    #[inline]
    fn mul(self, rhs: Fixed) -> Fixed {
        Fixed((self.0 as i64 * rhs.0 as i64 / F as i64) as i32)
    }
}

impl Div for Fixed {
    type Output = Fixed;

    #[inline]
    fn div(self, rhs: Fixed) -> Fixed {
        Fixed((self.0 as i64 * F as i64 / rhs.0 as i64) as i32)
    }
}

impl fmt::Debug for Fixed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Two decimal places is plenty for log output.
        let scaled = (self.0 as i64).abs() * 100 / F as i64;
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}{}.{:02}", sign, scaled / 100, scaled % 100)
    }
}
