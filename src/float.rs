//! Width abstraction for the pair arithmetic.
//!
//! [`Quad`](crate::Quad) is generic over its native component type. The
//! trait carries the IEEE parameters the pair algorithms depend on
//! (mantissa width, Dekker splitter, pair epsilon) plus the native
//! operations used as seeds for the quad-precision refinements. `ldexp`
//! is implemented by exponent-field manipulation so scaling by a power
//! of two is exact across the whole range, subnormals included.

use std::fmt;
use std::ops::{Add, Div, Mul, Neg, Sub};

use once_cell::sync::OnceCell;

use crate::quad::consts::Constants;

mod sealed {
    pub trait Sealed {}
    impl Sealed for f64 {}
    impl Sealed for f32 {}
}

/// Native floating-point component of a [`Quad`](crate::Quad) pair.
///
/// Implemented for `f64` and `f32`; the trait is sealed because every
/// algorithm in this crate is tuned to IEEE binary interchange formats.
pub trait Float:
    sealed::Sealed
    + Copy
    + PartialEq
    + PartialOrd
    + fmt::Debug
    + fmt::Display
    + Default
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Div<Output = Self>
    + Neg<Output = Self>
    + Send
    + Sync
    + 'static
{
    /// Floating-point radix of the format.
    const RADIX: u32;
    /// Mantissa digits including the implicit bit.
    const MANT_DIG: u32;
    /// Largest exponent, as in [`f64::MAX_EXP`].
    const MAX_EXP: i32;
    /// Smallest normal exponent, as in [`f64::MIN_EXP`].
    const MIN_EXP: i32;
    /// Dekker splitter 2^⌈p/2⌉ + 1.
    const SPLIT: Self;
    /// Ulp of 1.0 in the pair format: 2^(-2p).
    const QUAD_EPS: Self;
    const ZERO: Self;
    const ONE: Self;
    const HALF: Self;
    const TWO: Self;

    fn from_u32(v: u32) -> Self;
    fn to_i32(self) -> i32;
    fn abs(self) -> Self;
    fn floor(self) -> Self;
    fn round(self) -> Self;
    fn sqrt(self) -> Self;
    fn ln(self) -> Self;
    fn atan2(self, other: Self) -> Self;
    fn rem_euclid(self, rhs: Self) -> Self;
    fn is_nan(self) -> bool;
    fn is_infinite(self) -> bool;
    fn is_finite(self) -> bool;
    fn is_sign_negative(self) -> bool;
    fn nan() -> Self;
    fn infinity() -> Self;
    /// self · 2^n with saturation to ±inf / ±0 at the range ends.
    fn ldexp(self, n: i32) -> Self;
    /// The next representable value toward +inf. NaN and +inf pass
    /// through.
    fn next_up(self) -> Self;
    /// The next representable value toward −inf.
    fn next_down(self) -> Self;
    /// Process-wide cache slot for the lazily folded constants.
    #[doc(hidden)]
    fn constants() -> &'static OnceCell<Constants<Self>>;
}

impl Float for f64 {
    const RADIX: u32 = 2;
    const MANT_DIG: u32 = 53;
    const MAX_EXP: i32 = 1024;
    const MIN_EXP: i32 = -1021;
    const SPLIT: f64 = 134_217_729.0; // 2^27 + 1
    const QUAD_EPS: f64 = f64::from_bits(0x3950_0000_0000_0000); // 2^-106
    const ZERO: f64 = 0.0;
    const ONE: f64 = 1.0;
    const HALF: f64 = 0.5;
    const TWO: f64 = 2.0;

    #[inline(always)]
    fn from_u32(v: u32) -> f64 {
        v as f64
    }

    #[inline(always)]
    fn to_i32(self) -> i32 {
        self as i32
    }

    #[inline(always)]
    fn abs(self) -> f64 {
        f64::abs(self)
    }

    #[inline(always)]
    fn floor(self) -> f64 {
        f64::floor(self)
    }

    #[inline(always)]
    fn round(self) -> f64 {
        f64::round(self)
    }

    #[inline(always)]
    fn sqrt(self) -> f64 {
        f64::sqrt(self)
    }

    #[inline(always)]
    fn ln(self) -> f64 {
        f64::ln(self)
    }

    #[inline(always)]
    fn atan2(self, other: f64) -> f64 {
        f64::atan2(self, other)
    }

    #[inline(always)]
    fn rem_euclid(self, rhs: f64) -> f64 {
        f64::rem_euclid(self, rhs)
    }

    #[inline(always)]
    fn is_nan(self) -> bool {
        f64::is_nan(self)
    }

    #[inline(always)]
    fn is_infinite(self) -> bool {
        f64::is_infinite(self)
    }

    #[inline(always)]
    fn is_finite(self) -> bool {
        f64::is_finite(self)
    }

    #[inline(always)]
    fn is_sign_negative(self) -> bool {
        f64::is_sign_negative(self)
    }

    #[inline(always)]
    fn nan() -> f64 {
        f64::NAN
    }

    #[inline(always)]
    fn infinity() -> f64 {
        f64::INFINITY
    }

    fn ldexp(self, n: i32) -> f64 {
        ldexp_f64(self, n)
    }

    #[inline]
    fn next_up(self) -> f64 {
        next_up_f64(self)
    }

    #[inline]
    fn next_down(self) -> f64 {
        -next_up_f64(-self)
    }

    fn constants() -> &'static OnceCell<Constants<f64>> {
        static CONSTANTS_F64: OnceCell<Constants<f64>> = OnceCell::new();
        &CONSTANTS_F64
    }
}

impl Float for f32 {
    const RADIX: u32 = 2;
    const MANT_DIG: u32 = 24;
    const MAX_EXP: i32 = 128;
    const MIN_EXP: i32 = -125;
    const SPLIT: f32 = 4097.0; // 2^12 + 1
    const QUAD_EPS: f32 = f32::from_bits(0x2780_0000); // 2^-48
    const ZERO: f32 = 0.0;
    const ONE: f32 = 1.0;
    const HALF: f32 = 0.5;
    const TWO: f32 = 2.0;

    #[inline(always)]
    fn from_u32(v: u32) -> f32 {
        v as f32
    }

    #[inline(always)]
    fn to_i32(self) -> i32 {
        self as i32
    }

    #[inline(always)]
    fn abs(self) -> f32 {
        f32::abs(self)
    }

    #[inline(always)]
    fn floor(self) -> f32 {
        f32::floor(self)
    }

    #[inline(always)]
    fn round(self) -> f32 {
        f32::round(self)
    }

    #[inline(always)]
    fn sqrt(self) -> f32 {
        f32::sqrt(self)
    }

    #[inline(always)]
    fn ln(self) -> f32 {
        f32::ln(self)
    }

    #[inline(always)]
    fn atan2(self, other: f32) -> f32 {
        f32::atan2(self, other)
    }

    #[inline(always)]
    fn rem_euclid(self, rhs: f32) -> f32 {
        f32::rem_euclid(self, rhs)
    }

    #[inline(always)]
    fn is_nan(self) -> bool {
        f32::is_nan(self)
    }

    #[inline(always)]
    fn is_infinite(self) -> bool {
        f32::is_infinite(self)
    }

    #[inline(always)]
    fn is_finite(self) -> bool {
        f32::is_finite(self)
    }

    #[inline(always)]
    fn is_sign_negative(self) -> bool {
        f32::is_sign_negative(self)
    }

    #[inline(always)]
    fn nan() -> f32 {
        f32::NAN
    }

    #[inline(always)]
    fn infinity() -> f32 {
        f32::INFINITY
    }

    fn ldexp(self, n: i32) -> f32 {
        ldexp_f32(self, n)
    }

    #[inline]
    fn next_up(self) -> f32 {
        next_up_f32(self)
    }

    #[inline]
    fn next_down(self) -> f32 {
        -next_up_f32(-self)
    }

    fn constants() -> &'static OnceCell<Constants<f32>> {
        static CONSTANTS_F32: OnceCell<Constants<f32>> = OnceCell::new();
        &CONSTANTS_F32
    }
}

/// x · 2^n for f64 via exponent-field manipulation.
fn ldexp_f64(x: f64, n: i32) -> f64 {
    const TWO54: f64 = f64::from_bits(0x4350_0000_0000_0000); // 2^54
    const TWOM54: f64 = f64::from_bits(0x3C90_0000_0000_0000); // 2^-54
    const HUGE: f64 = 1.0e300;
    const TINY: f64 = 1.0e-300;

    if n == 0 {
        return x;
    }
    let mut x = x;
    let mut ix = x.to_bits();
    let mut k = ((ix >> 52) & 0x7ff) as i32;
    if k == 0 {
        if ix & 0x000f_ffff_ffff_ffff == 0 {
            return x; // ±0
        }
        x *= TWO54;
        ix = x.to_bits();
        k = ((ix >> 52) & 0x7ff) as i32 - 54;
    }
    if k == 0x7ff {
        return x + x; // NaN or inf
    }
    if n < -50000 {
        return TINY * TINY.copysign(x);
    }
    if n > 50000 || k as i64 + n as i64 > 0x7fe {
        return HUGE * HUGE.copysign(x);
    }
    k += n;
    if k > 0 {
        return f64::from_bits((ix & 0x800f_ffff_ffff_ffff) | ((k as u64) << 52));
    }
    if k <= -54 {
        return TINY * TINY.copysign(x);
    }
    k += 54;
    f64::from_bits((ix & 0x800f_ffff_ffff_ffff) | ((k as u64) << 52)) * TWOM54
}

/// x · 2^n for f32 via exponent-field manipulation.
fn ldexp_f32(x: f32, n: i32) -> f32 {
    const TWO25: f32 = f32::from_bits(0x4C00_0000); // 2^25
    const TWOM25: f32 = f32::from_bits(0x3300_0000); // 2^-25
    const HUGE: f32 = 1.0e30;
    const TINY: f32 = 1.0e-30;

    if n == 0 {
        return x;
    }
    let mut x = x;
    let mut ix = x.to_bits();
    let mut k = ((ix >> 23) & 0xff) as i32;
    if k == 0 {
        if ix & 0x007f_ffff == 0 {
            return x; // ±0
        }
        x *= TWO25;
        ix = x.to_bits();
        k = ((ix >> 23) & 0xff) as i32 - 25;
    }
    if k == 0xff {
        return x + x; // NaN or inf
    }
    if n < -50000 {
        return TINY * TINY.copysign(x);
    }
    if n > 50000 || k + n > 0xfe {
        return HUGE * HUGE.copysign(x);
    }
    k += n;
    if k > 0 {
        return f32::from_bits((ix & 0x807f_ffff) | ((k as u32) << 23));
    }
    if k <= -25 {
        return TINY * TINY.copysign(x);
    }
    k += 25;
    f32::from_bits((ix & 0x807f_ffff) | ((k as u32) << 23)) * TWOM25
}

/// Smallest f64 above x, by magnitude-ordered bit increment.
fn next_up_f64(x: f64) -> f64 {
    if x.is_nan() || x == f64::INFINITY {
        return x;
    }
    if x == 0.0 {
        return f64::from_bits(1);
    }
    let bits = x.to_bits();
    if bits >> 63 == 0 {
        f64::from_bits(bits + 1)
    } else {
        f64::from_bits(bits - 1)
    }
}

/// Smallest f32 above x, by magnitude-ordered bit increment.
fn next_up_f32(x: f32) -> f32 {
    if x.is_nan() || x == f32::INFINITY {
        return x;
    }
    if x == 0.0 {
        return f32::from_bits(1);
    }
    let bits = x.to_bits();
    if bits >> 31 == 0 {
        f32::from_bits(bits + 1)
    } else {
        f32::from_bits(bits - 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ldexp_f64() {
        let values = [
            (1.0, 1),
            (1.0, -1),
            (1.0, 100),
            (1.0, -100),
            (std::f64::consts::PI, 5),
            (std::f64::consts::PI, -5),
            (-3.75, 17),
            (1e-300, 40),
            (1e-300, -40),
        ];
        for &(x, n) in &values {
            let actual = ldexp_f64(x, n);
            let expected = x * 2.0f64.powi(n);
            assert_eq!(actual, expected, "ldexp_f64({x}, {n}) failed");
        }
    }

    #[test]
    fn test_ldexp_f64_extremes() {
        assert_eq!(ldexp_f64(1.0, 2000), f64::INFINITY);
        assert_eq!(ldexp_f64(-1.0, 2000), f64::NEG_INFINITY);
        assert_eq!(ldexp_f64(1.0, -2000), 0.0);
        assert_eq!(ldexp_f64(0.0, 50), 0.0);
        assert!(ldexp_f64(f64::NAN, 3).is_nan());
        assert_eq!(ldexp_f64(f64::INFINITY, -3), f64::INFINITY);
        // subnormal in, exact scaling out
        let sub = f64::from_bits(1); // 2^-1074
        assert_eq!(ldexp_f64(sub, 1074), 1.0);
        assert_eq!(ldexp_f64(1.0, -1074), sub);
    }

    #[test]
    fn test_ldexp_f32() {
        let values = [(1.0f32, 1), (1.0, -1), (1.5, 30), (1.5, -30), (-2.25, 7)];
        for &(x, n) in &values {
            let actual = ldexp_f32(x, n);
            let expected = x * 2.0f32.powi(n);
            assert_eq!(actual, expected, "ldexp_f32({x}, {n}) failed");
        }
        assert_eq!(ldexp_f32(1.0, 300), f32::INFINITY);
        assert_eq!(ldexp_f32(1.0, -300), 0.0);
        let sub = f32::from_bits(1); // 2^-149
        assert_eq!(ldexp_f32(sub, 149), 1.0);
    }

    #[test]
    fn test_next_up_down() {
        // Called through the trait so both implementations are the
        // ones under test.
        assert_eq!(Float::next_up(1.0f64), 1.0 + 2.0f64.powi(-52));
        assert_eq!(Float::next_down(1.0f64), 1.0 - 2.0f64.powi(-53));
        assert_eq!(Float::next_up(-1.0f64), -(1.0 - 2.0f64.powi(-53)));
        assert_eq!(Float::next_up(0.0f64), f64::from_bits(1));
        assert_eq!(Float::next_down(0.0f64), -f64::from_bits(1));
        assert_eq!(Float::next_up(f64::INFINITY), f64::INFINITY);
        assert_eq!(Float::next_down(f64::INFINITY), f64::MAX);
        assert!(Float::next_up(f64::NAN).is_nan());
        assert_eq!(Float::next_up(1.5f32), 1.5 + 2.0f32.powi(-23));
        assert_eq!(Float::next_down(1.5f32), 1.5 - 2.0f32.powi(-23));
    }

    #[test]
    fn test_format_parameters() {
        assert_eq!(f64::SPLIT, (1u64 << 27) as f64 + 1.0);
        assert_eq!(f32::SPLIT, (1u32 << 12) as f32 + 1.0);
        assert_eq!(f64::QUAD_EPS, 2.0f64.powi(-106));
        assert_eq!(f32::QUAD_EPS, 2.0f32.powi(-48));
        assert_eq!(f64::MAX_EXP, 1024);
        assert_eq!(f32::MAX_EXP, 128);
    }
}
