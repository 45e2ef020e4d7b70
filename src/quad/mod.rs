//! Double-double scalar arithmetic.
//!
//! A [`Quad<F>`] carries a value as an unevaluated sum of two native
//! floats `h + l` whose mantissas do not overlap, which roughly doubles
//! the native precision (~107 bits for f64 pairs). The arithmetic is the
//! classic error-free-transformation toolkit: two-sum with a
//! magnitude-ordering branch for addition, Dekker's split two-product
//! for multiplication, and single Newton corrections for division and
//! square root.
//!
//! On x87 hardware every operation here must run under a
//! [`PrecisionGuard`](crate::PrecisionGuard) so intermediates round to
//! the component width.

pub mod consts;
mod exp;
mod hypot;
mod trig;

use std::fmt;
use std::ops::{Add, AddAssign, Div, DivAssign, Mul, MulAssign, Neg, Sub, SubAssign};

use crate::float::Float;

/// Double-double value: `h` holds the leading digits, `l` the tail.
///
/// The pair is normalized after every operation (|l| ≤ ulp(h)/2), but
/// the fields are public and constructors do not enforce it; callers
/// assembling raw pairs are on their own.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Quad<F: Float> {
    /// Leading component.
    pub h: F,
    /// Trailing component.
    pub l: F,
}

/// Pair of binary64 components, ~107 bits of precision.
pub type Quad64 = Quad<f64>;
/// Pair of binary32 components, ~49 bits of precision.
pub type Quad32 = Quad<f32>;

/// Dekker's splitter: cuts a float into two half-width parts whose
/// product terms are exact.
#[inline(always)]
fn split<F: Float>(a: F) -> (F, F) {
    let t = F::SPLIT * a;
    let hi = t - (t - a);
    let lo = a - hi;
    (hi, lo)
}

impl<F: Float> Quad<F> {
    /// Builds a pair from raw components, without normalizing.
    #[inline]
    pub fn new(h: F, l: F) -> Self {
        Quad { h, l }
    }

    #[inline]
    pub fn zero() -> Self {
        Quad {
            h: F::ZERO,
            l: F::ZERO,
        }
    }

    #[inline]
    pub fn one() -> Self {
        Quad {
            h: F::ONE,
            l: F::ZERO,
        }
    }

    #[inline]
    pub fn half() -> Self {
        Quad {
            h: F::HALF,
            l: F::ZERO,
        }
    }

    /// The nearest native float: `h + l` evaluated in native arithmetic.
    #[inline]
    pub fn value(self) -> F {
        self.h + self.l
    }

    /// Exact product of two native floats: `h + l == x·y` with no
    /// rounding at all, barring overflow of the product itself. A
    /// non-finite product comes back with a zero tail.
    pub fn mul12(x: F, y: F) -> Self {
        if !(x * y).is_finite() {
            return Quad {
                h: x * y,
                l: F::ZERO,
            };
        }
        // The splitter multiply overflows for operands within a few
        // octaves of the exponent ceiling even when the product is
        // finite; shift those down and scale the exact result back.
        let digits = F::MANT_DIG as i32;
        let cap = F::ONE.ldexp(F::MAX_EXP - digits - 2);
        let (x, ex) = if x.abs() > cap {
            (x.ldexp(-digits), digits)
        } else {
            (x, 0)
        };
        let (y, ey) = if y.abs() > cap {
            (y.ldexp(-digits), digits)
        } else {
            (y, 0)
        };
        let p = x * y;
        let (hx, tx) = split(x);
        let (hy, ty) = split(y);
        let e = ((hx * hy - p) + hx * ty + tx * hy) + tx * ty;
        if ex + ey == 0 {
            Quad { h: p, l: e }
        } else {
            Quad {
                h: p.ldexp(ex + ey),
                l: e.ldexp(ex + ey),
            }
        }
    }

    #[inline]
    pub fn abs(self) -> Self {
        if self.h < F::ZERO {
            -self
        } else {
            self
        }
    }

    /// self · 2^n. Exact: both components scale by a power of two.
    #[inline]
    pub fn ldexp(self, n: i32) -> Self {
        Quad {
            h: self.h.ldexp(n),
            l: self.l.ldexp(n),
        }
    }

    /// Quad square root by a native seed plus one Newton correction.
    /// Non-positive and NaN inputs give zero rather than NaN.
    pub fn sqrt(self) -> Self {
        if !(self.h > F::ZERO) {
            return Quad::zero();
        }
        if self.h.is_infinite() {
            return self;
        }
        let t = (self.h + self.l).sqrt();
        let u = Quad::mul12(t, t);
        let cc = (self.h - u.h - u.l + self.l) / (t + t);
        let h = t + cc;
        let l = t - h + cc;
        Quad { h, l }
    }

    /// Largest integer value not above self, exact in quad precision.
    pub fn floor(self) -> Self {
        if !self.h.is_finite() {
            return self;
        }
        let one = Quad::one();
        let q = Quad::from(self.h.floor()) + Quad::from(self.l.floor());
        // The two floors can land one below or above the true floor;
        // decide with quad-precision residuals, not rounded values.
        let r = self - q;
        if (r - one).value() >= F::ZERO {
            q + one
        } else if r.value() < F::ZERO {
            q - one
        } else {
            q
        }
    }

    /// Dot product of equal-length slices, accumulated in quad
    /// precision.
    ///
    /// # Panics
    /// Panics if the slice lengths differ.
    pub fn dot_product(a: &[Quad<F>], b: &[Quad<F>]) -> Quad<F> {
        assert_eq!(a.len(), b.len(), "dot product operands differ in length");
        let mut acc = Quad::zero();
        for (x, y) in a.iter().zip(b.iter()) {
            acc += *x * *y;
        }
        acc
    }

    /// Whether this platform delivers pair-precision results for `F`.
    #[inline]
    pub fn functional() -> bool {
        crate::guard::functional::<F>()
    }
}

impl<F: Float> From<F> for Quad<F> {
    #[inline]
    fn from(value: F) -> Self {
        Quad {
            h: value,
            l: F::ZERO,
        }
    }
}

impl<F: Float> Add for Quad<F> {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        let r = self.h + rhs.h;
        if !r.is_finite() {
            return Quad { h: r, l: F::ZERO };
        }
        // The larger-magnitude leading term must anchor the error path.
        let s = if self.h.abs() > rhs.h.abs() {
            self.h - r + rhs.h + rhs.l + self.l
        } else {
            rhs.h - r + self.h + self.l + rhs.l
        };
        let h = r + s;
        let l = r - h + s;
        Quad { h, l }
    }
}

impl<F: Float> Sub for Quad<F> {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        let r = self.h - rhs.h;
        if !r.is_finite() {
            return Quad { h: r, l: F::ZERO };
        }
        let s = if self.h.abs() > rhs.h.abs() {
            self.h - r - rhs.h - rhs.l + self.l
        } else {
            -rhs.h - r + self.h + self.l - rhs.l
        };
        let h = r + s;
        let l = r - h + s;
        Quad { h, l }
    }
}

impl<F: Float> Mul for Quad<F> {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self {
        let t = Quad::mul12(self.h, rhs.h);
        if !t.h.is_finite() {
            return t;
        }
        let v = t.l + (self.h * rhs.l + self.l * rhs.h);
        let h = t.h + v;
        let l = t.h - h + v;
        Quad { h, l }
    }
}

impl<F: Float> Div for Quad<F> {
    type Output = Self;

    fn div(self, rhs: Self) -> Self {
        let c = self.h / rhs.h;
        if !c.is_finite() || c == F::ZERO {
            return Quad { h: c, l: F::ZERO };
        }
        let u = Quad::mul12(c, rhs.h);
        let cc = (self.h - u.h - u.l + self.l - c * rhs.l) / rhs.h;
        let h = c + cc;
        let l = c - h + cc;
        Quad { h, l }
    }
}

impl<F: Float> Neg for Quad<F> {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Quad {
            h: -self.h,
            l: -self.l,
        }
    }
}

impl<F: Float> AddAssign for Quad<F> {
    #[inline]
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl<F: Float> SubAssign for Quad<F> {
    #[inline]
    fn sub_assign(&mut self, rhs: Self) {
        *self = *self - rhs;
    }
}

impl<F: Float> MulAssign for Quad<F> {
    #[inline]
    fn mul_assign(&mut self, rhs: Self) {
        *self = *self * rhs;
    }
}

impl<F: Float> DivAssign for Quad<F> {
    #[inline]
    fn div_assign(&mut self, rhs: Self) {
        *self = *self / rhs;
    }
}

impl<F: Float> fmt::Display for Quad<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.value(), f)
    }
}
