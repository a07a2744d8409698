//! 17.14 fixed-point arithmetic tests.

use crate::fixed_point::{Fixed, F};

#[test]
fn integer_conversions_are_exact() {
    assert_eq!(Fixed::from_int(1).raw(), F);
    assert_eq!(Fixed::from_int(-3).raw(), -3 * F);
    assert_eq!(Fixed::from_int(42).trunc(), 42);
    assert_eq!(Fixed::from_int(-42).round(), -42);
}

#[test]
fn truncation_goes_toward_zero() {
    // 1.5 and -1.5
    assert_eq!(Fixed::from_raw(3 * F / 2).trunc(), 1);
    assert_eq!(Fixed::from_raw(-3 * F / 2).trunc(), -1);
}

#[test]
fn rounding_goes_to_nearest() {
    assert_eq!(Fixed::from_raw(3 * F / 2).round(), 2);
    assert_eq!(Fixed::from_raw(-3 * F / 2).round(), -2);
    assert_eq!(Fixed::from_raw(F / 4).round(), 0);
    assert_eq!(Fixed::from_raw(-F / 4).round(), 0);
}

#[test]
fn addition_and_subtraction() {
    let a = Fixed::from_int(3);
    let b = Fixed::from_int(2);
    assert_eq!((a + b).trunc(), 5);
    assert_eq!((a - b).trunc(), 1);
    assert_eq!(a.add_int(4), Fixed::from_int(7));
    assert_eq!(a.sub_int(4), Fixed::from_int(-1));
}

#[test]
fn multiplication_widens_the_intermediate() {
    assert_eq!(Fixed::from_int(3) * Fixed::from_int(4), Fixed::from_int(12));
    // 1.5 * 1.5 = 2.25
    let one_and_half = Fixed::from_raw(3 * F / 2);
    assert_eq!((one_and_half * one_and_half).raw(), 9 * F / 4);
    assert_eq!(Fixed::from_int(3).mul_int(-2), Fixed::from_int(-6));
}

#[test]
fn division_keeps_the_fraction() {
    assert_eq!(Fixed::from_int(1).div_int(60).raw(), F / 60);
    // 59/60 in fixed point, the load_avg factor.
    let factor = Fixed::from_int(59) / Fixed::from_int(60);
    assert_eq!(factor.raw(), 59 * F / 60);
    assert!(factor < Fixed::from_int(1));
}

#[test]
fn scaled_reporting_rounds_to_nearest() {
    // The getter contract: value * 100, rounded.
    assert_eq!(Fixed::from_int(1).div_int(60).mul_int(100).round(), 2);
    assert_eq!(Fixed::from_int(1).div_int(2).mul_int(100).round(), 50);
    assert_eq!(Fixed::ZERO.mul_int(100).round(), 0);
}
