//! Exponential and logarithm at pair precision.
//!
//! `exp` reduces against the pair-precision ln 2 so the Taylor kernel
//! only ever sees |r| ≤ ln 2 / 2, then recombines with an exact
//! power-of-two scale. `ln` polishes the native seed with one Newton
//! step evaluated entirely in pair arithmetic. The `_scaled` variants
//! return a mantissa/exponent pair so regression code can work with
//! exponents far outside the native range.

use crate::float::Float;
use crate::quad::Quad;

/// m · 2^e with the exponent clamped into `ldexp`'s saturating range.
fn scale<F: Float>(m: Quad<F>, e: F) -> Quad<F> {
    if !m.h.is_finite() || m.h == F::ZERO {
        return m;
    }
    let bound = F::from_u32(100_000);
    let n = if e > bound {
        100_000
    } else if e < -bound {
        -100_000
    } else {
        e.round().to_i32()
    };
    m.ldexp(n)
}

/// exp(r) for a reduced argument, |r| ≤ ln 2 / 2, by Taylor series.
fn exp_kernel<F: Float>(r: Quad<F>) -> Quad<F> {
    let mut term = Quad::one();
    let mut sum = Quad::one();
    let mut i = 1u32;
    loop {
        term = term * r / Quad::from(F::from_u32(i));
        sum += term;
        if term.h.abs() <= F::QUAD_EPS {
            return sum;
        }
        i += 1;
    }
}

impl<F: Float> Quad<F> {
    /// exp(self) as a mantissa/exponent pair: the true value is
    /// `m · 2^e` with m near 1. Usable far outside the native exponent
    /// range, which is the point for regression-scale arguments.
    ///
    /// The reduction multiple is the native-rounded self/ln2; once it
    /// stops being an exact integer (|self| beyond ~2^60) the mantissa
    /// carries no accuracy, only the exponent's order of magnitude.
    pub fn exp_scaled(self) -> (Quad<F>, F) {
        if self.h.is_nan() {
            return (self, F::ZERO);
        }
        if self.h.is_infinite() {
            let m = if self.h > F::ZERO {
                self
            } else {
                Quad::zero()
            };
            return (m, F::ZERO);
        }
        let ln2 = Quad::ln2();
        let k = (self.value() / ln2.h).round();
        let mut r = self - Quad::from(k) * ln2;
        if r.h.abs() > F::ONE {
            // |self| too large for the reduction to mean anything.
            r = Quad::zero();
        }
        (exp_kernel(r), k)
    }

    /// exp(self) at pair precision. Overflows to +inf, underflows to 0.
    pub fn exp(self) -> Self {
        let (m, e) = self.exp_scaled();
        scale(m, e)
    }

    /// exp(self) − 1, accurate near zero where the direct subtraction
    /// would cancel.
    pub fn expm1(self) -> Self {
        if self.h.is_nan() {
            return self;
        }
        if self.h.is_infinite() {
            return if self.h > F::ZERO {
                self
            } else {
                -Quad::one()
            };
        }
        let ln2 = Quad::ln2();
        let k = (self.value() / ln2.h).round();
        if k == F::ZERO {
            // Same kernel without the leading 1.
            let mut term = Quad::one();
            let mut sum = Quad::zero();
            let mut i = 1u32;
            loop {
                term = term * self / Quad::from(F::from_u32(i));
                sum += term;
                if term.h.abs() <= F::QUAD_EPS {
                    return sum;
                }
                i += 1;
            }
        }
        self.exp() - Quad::one()
    }

    /// Natural logarithm: native seed refined by one Newton step on
    /// `x·exp(−y) − 1`, with the residual exponential taken in scaled
    /// form so no intermediate can overflow.
    ///
    /// ln(0) is −inf, ln of a negative number is NaN.
    pub fn ln(self) -> Self {
        if self.h.is_nan() {
            return self;
        }
        if self.h == F::ZERO && self.l == F::ZERO {
            return Quad::from(-F::infinity());
        }
        if self.h < F::ZERO {
            return Quad::from(F::nan());
        }
        if self.h.is_infinite() {
            return self;
        }
        let y = Quad::from(self.value().ln());
        let (m, e) = (-y).exp_scaled();
        let u = self.ldexp(e.round().to_i32()) * m;
        let d = u - Quad::one();
        let d2 = d * d;
        y + d - d2.ldexp(-1) + d2 * d / Quad::from(F::from_u32(3))
    }

    /// self^y as a mantissa/exponent pair, `m · 2^e`.
    ///
    /// Conventions: 0^0 is 1, 0^negative is +inf, and a negative base
    /// demands an integer exponent (the sign folds by parity) or the
    /// result is NaN.
    pub fn pow_scaled(self, y: Self) -> (Self, F) {
        if self.h.is_nan() || y.h.is_nan() {
            return (Quad::from(F::nan()), F::ZERO);
        }
        if y.h == F::ZERO && y.l == F::ZERO {
            return (Quad::one(), F::ZERO);
        }
        if self.h == F::ZERO && self.l == F::ZERO {
            let m = if y.h > F::ZERO {
                Quad::zero()
            } else {
                Quad::from(F::infinity())
            };
            return (m, F::ZERO);
        }
        if self.h < F::ZERO {
            if y.floor() != y {
                return (Quad::from(F::nan()), F::ZERO);
            }
            let half_y = y.ldexp(-1);
            let odd = half_y.floor() != half_y;
            let (m, e) = (-self).pow_scaled(y);
            return (if odd { -m } else { m }, e);
        }
        (y * self.ln()).exp_scaled()
    }

    /// self^y at pair precision.
    pub fn pow(self, y: Self) -> Self {
        let (m, e) = self.pow_scaled(y);
        scale(m, e)
    }
}
