//! Trigonometric functions at pair precision.
//!
//! `sin`/`cos` reduce by the nearest multiple of the pair-precision π/2
//! and evaluate a Taylor kernel on the residue, so absolute reduction
//! error grows like |x|·2^-107; past |x| ≈ 2^53 the quadrant itself is
//! uncertain and accuracy degrades.
//! `sinpi`/`cospi` reduce modulo 2 exactly in pair arithmetic and stay
//! exact at every magnitude. `atan2` refines the native seed with two
//! Newton steps on x·sin r − y·cos r.

use crate::float::Float;
use crate::quad::Quad;

/// sin r for |r| ≲ π/4, by Taylor series.
fn sin_kernel<F: Float>(r: Quad<F>) -> Quad<F> {
    let r2 = r * r;
    let mut term = r;
    let mut sum = r;
    let mut i = 1u32;
    loop {
        term = -(term * r2 / Quad::from(F::from_u32(2 * i * (2 * i + 1))));
        sum += term;
        if term.h.abs() <= F::QUAD_EPS {
            return sum;
        }
        i += 1;
    }
}

/// cos r for |r| ≲ π/4, by Taylor series.
fn cos_kernel<F: Float>(r: Quad<F>) -> Quad<F> {
    let r2 = r * r;
    let mut term = Quad::one();
    let mut sum = Quad::one();
    let mut i = 1u32;
    loop {
        term = -(term * r2 / Quad::from(F::from_u32((2 * i - 1) * 2 * i)));
        sum += term;
        if term.h.abs() <= F::QUAD_EPS {
            return sum;
        }
        i += 1;
    }
}

/// Reduces a finite x by the nearest multiple of π/2: returns the
/// residue and the quadrant (multiple mod 4). Repeats the reduction
/// when cancellation leaves the residue outside the kernel range,
/// which happens once the multiple needs more bits than the native
/// mantissa holds.
fn reduce_half_pi<F: Float>(x: Quad<F>) -> (Quad<F>, u32) {
    let hp = Quad::half_pi();
    let mut r = x;
    let mut q = 0u32;
    loop {
        let n = (r.value() / hp.h).round();
        r = r - Quad::from(n) * hp;
        q = (q + n.rem_euclid(F::from_u32(4)).to_i32() as u32) % 4;
        if r.h.abs() <= F::ONE {
            return (r, q);
        }
    }
}

/// Reduces x modulo 2 (exactly), splits off the nearest half-integer:
/// returns the residue times π and the quadrant in π/2 steps.
fn reduce_pi_units<F: Float>(x: Quad<F>) -> (Quad<F>, u32) {
    let m = x - x.ldexp(-1).floor().ldexp(1);
    let n = (m.value() + m.value()).round();
    let r = m - Quad::from(n).ldexp(-1);
    (r * Quad::pi(), n.to_i32() as u32 % 4)
}

impl<F: Float> Quad<F> {
    /// sin(self) at pair precision. Non-finite input gives NaN.
    pub fn sin(self) -> Self {
        if !self.h.is_finite() {
            return Quad::from(F::nan());
        }
        let (r, q) = reduce_half_pi(self);
        match q {
            0 => sin_kernel(r),
            1 => cos_kernel(r),
            2 => -sin_kernel(r),
            _ => -cos_kernel(r),
        }
    }

    /// cos(self) at pair precision. Non-finite input gives NaN.
    pub fn cos(self) -> Self {
        if !self.h.is_finite() {
            return Quad::from(F::nan());
        }
        let (r, q) = reduce_half_pi(self);
        match q {
            0 => cos_kernel(r),
            1 => -sin_kernel(r),
            2 => -cos_kernel(r),
            _ => sin_kernel(r),
        }
    }

    /// sin(π·self). The argument is reduced modulo 2 exactly, so
    /// half-integer multiples give exact 0/±1 at every magnitude.
    pub fn sinpi(self) -> Self {
        if !self.h.is_finite() {
            return Quad::from(F::nan());
        }
        let (r, q) = reduce_pi_units(self);
        match q {
            0 => sin_kernel(r),
            1 => cos_kernel(r),
            2 => -sin_kernel(r),
            _ => -cos_kernel(r),
        }
    }

    /// cos(π·self), exact at half-integer multiples like [`sinpi`].
    ///
    /// [`sinpi`]: Quad::sinpi
    pub fn cospi(self) -> Self {
        if !self.h.is_finite() {
            return Quad::from(F::nan());
        }
        let (r, q) = reduce_pi_units(self);
        match q {
            0 => cos_kernel(r),
            1 => -sin_kernel(r),
            2 => -cos_kernel(r),
            _ => sin_kernel(r),
        }
    }

    /// arcsin via `atan2` against √((1−x)(1+x)); |x| > 1 gives NaN.
    pub fn asin(self) -> Self {
        let one = Quad::one();
        if self.h.is_nan() || (self.abs() - one).value() > F::ZERO {
            return Quad::from(F::nan());
        }
        let t = ((one - self) * (one + self)).sqrt();
        self.atan2(t)
    }

    /// arccos via `atan2`; |x| > 1 gives NaN.
    pub fn acos(self) -> Self {
        let one = Quad::one();
        if self.h.is_nan() || (self.abs() - one).value() > F::ZERO {
            return Quad::from(F::nan());
        }
        let t = ((one - self) * (one + self)).sqrt();
        t.atan2(self)
    }

    /// atan2(self, x): the angle of the point (x, self).
    ///
    /// Zero and infinite arguments produce the exact pair-precision
    /// multiple of π the native function's sign rules select. The
    /// general case seeds from native atan2 and polishes with two
    /// Newton steps on x·sin r − y·cos r, evaluated in pair precision.
    pub fn atan2(self, x: Self) -> Self {
        let y = self;
        if y.h.is_nan() || x.h.is_nan() {
            return Quad::from(F::nan());
        }
        let y_zero = y.h == F::ZERO && y.l == F::ZERO;
        let x_zero = x.h == F::ZERO && x.l == F::ZERO;
        if y_zero || x_zero || y.h.is_infinite() || x.h.is_infinite() {
            return promote_special(y.h.atan2(x.h));
        }

        // A common power-of-two rescale leaves the angle alone and
        // keeps the Newton products finite.
        let shift = F::MAX_EXP / 2;
        let mag = if x.h.abs() > y.h.abs() {
            x.h.abs()
        } else {
            y.h.abs()
        };
        let (xs, ys) = if mag > F::ONE.ldexp(shift) {
            (x.ldexp(-shift), y.ldexp(-shift))
        } else if mag < F::ONE.ldexp(-shift) {
            (x.ldexp(shift), y.ldexp(shift))
        } else {
            (x, y)
        };

        let mut r = Quad::from(ys.value().atan2(xs.value()));
        for _ in 0..2 {
            let s = r.sin();
            let c = r.cos();
            let num = xs * s - ys * c;
            let den = xs * c + ys * s;
            if den.h == F::ZERO {
                break;
            }
            r = r - num / den;
        }
        r
    }

    /// atan2(self, x) / π, with the axis and diagonal cases produced as
    /// exact rationals (0, ±1/4, ±1/2, ±3/4, ±1).
    pub fn atan2pi(self, x: Self) -> Self {
        let y = self;
        if y.h.is_nan() || x.h.is_nan() {
            return Quad::from(F::nan());
        }
        let quarter = F::HALF.ldexp(-1);
        let neg = y.h.is_sign_negative();
        let sign = |v: F| if neg { -v } else { v };

        let y_zero = y.h == F::ZERO && y.l == F::ZERO;
        let x_zero = x.h == F::ZERO && x.l == F::ZERO;
        if y_zero && x_zero {
            return Quad::from(y.h.atan2(x.h) / Quad::<F>::pi().h);
        }
        if y_zero {
            return if x.h > F::ZERO {
                Quad::from(sign(F::ZERO))
            } else {
                Quad::from(sign(F::ONE))
            };
        }
        if x_zero {
            return Quad::from(sign(F::HALF));
        }
        if y.h.is_infinite() {
            if x.h.is_infinite() {
                return if x.h > F::ZERO {
                    Quad::from(sign(quarter))
                } else {
                    Quad::from(sign(F::ONE - quarter))
                };
            }
            return Quad::from(sign(F::HALF));
        }
        if x.h.is_infinite() {
            return if x.h > F::ZERO {
                Quad::from(sign(F::ZERO))
            } else {
                Quad::from(sign(F::ONE))
            };
        }
        if y.abs() == x.abs() {
            return if x.h > F::ZERO {
                Quad::from(sign(quarter))
            } else {
                Quad::from(sign(F::ONE - quarter))
            };
        }
        y.atan2(x) / Quad::pi()
    }
}

/// Maps a native special-case atan2 result onto the pair-precision
/// multiple of π it rounds from. Anything unrecognized passes through
/// with a zero tail.
fn promote_special<F: Float>(a: F) -> Quad<F> {
    let pi = Quad::<F>::pi();
    let half_pi = Quad::half_pi();
    let quarter_pi = pi.ldexp(-2);
    let three_quarter_pi = pi - quarter_pi;
    for q in [pi, half_pi, quarter_pi, three_quarter_pi] {
        if a == q.h {
            return q;
        }
        if a == -q.h {
            return -q;
        }
    }
    Quad::from(a)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rel_err(q: Quad<f64>, reference: f64) -> f64 {
        if reference == 0.0 {
            return q.value().abs();
        }
        ((q.value() - reference) / reference).abs()
    }

    #[test]
    fn test_sin_cos_grid_against_native() {
        // 80 points over [0, 10).
        for i in 0..80 {
            let x = i as f64 * 0.125;
            let q = Quad::from(x);
            assert!(
                rel_err(q.sin(), x.sin()) < 1e-14,
                "sin({x}) drifted from native"
            );
            assert!(
                rel_err(q.cos(), x.cos()) < 1e-14,
                "cos({x}) drifted from native"
            );
        }
    }

    #[test]
    fn test_sin_cos_identity() {
        for &x in &[-7.3, -1.0, 0.0, 0.5, 2.25, 100.0, 12345.875] {
            let q = Quad::from(x);
            let (s, c) = (q.sin(), q.cos());
            let err = (s * s + c * c - Quad::one()).value().abs();
            assert!(err < 1e-30, "sin²+cos² at {x} off by {err}");
        }
    }

    #[test]
    fn test_sin_special_points() {
        assert_eq!(Quad::from(0.0f64).sin(), Quad::zero());
        assert_eq!(Quad::from(0.0f64).cos(), Quad::one());
        // sin(π) in pair precision is the tail error of π, not zero.
        let s = Quad::<f64>::pi().sin();
        assert!(s.value().abs() < 1e-31, "sin(π quad) = {s}");
        let c = Quad::<f64>::half_pi().cos();
        assert!(c.value().abs() < 1e-31, "cos(π/2 quad) = {c}");
        assert!(Quad::from(f64::INFINITY).sin().value().is_nan());
        assert!(Quad::from(f64::NAN).cos().value().is_nan());
    }

    #[test]
    fn test_sinpi_cospi_half_integers_exact() {
        // Exact at any magnitude thanks to the mod-2 reduction.
        let cases: [(f64, f64, f64); 6] = [
            (0.0, 0.0, 1.0),
            (0.5, 1.0, 0.0),
            (1.0, 0.0, -1.0),
            (1.5, -1.0, 0.0),
            (2.5e15, 0.0, 1.0),
            (-7.5, 1.0, -0.0),
        ];
        for &(x, s, c) in &cases {
            assert_eq!(Quad::from(x).sinpi().value(), s, "sinpi({x})");
            assert_eq!(Quad::from(x).cospi().value(), c, "cospi({x})");
        }
        let huge = Quad::mul12(11.0f64, 2.0f64.powi(80));
        assert_eq!(huge.sinpi().value(), 0.0);
        assert_eq!(huge.cospi().value(), 1.0);
        let huge_half = huge + Quad::from(0.5);
        assert_eq!(huge_half.sinpi().value(), 1.0);
        assert_eq!(huge_half.cospi().value(), 0.0);
    }

    #[test]
    fn test_sinpi_quarter() {
        let q = Quad::from(0.25f64).sinpi();
        let err = (q - Quad::sqrt2().ldexp(-1)).value().abs();
        assert!(err < 1e-31, "sinpi(1/4) off √2/2 by {err}");
        let q = Quad::from(0.25f64).cospi();
        let err = (q - Quad::sqrt2().ldexp(-1)).value().abs();
        assert!(err < 1e-31, "cospi(1/4) off √2/2 by {err}");
    }

    #[test]
    fn test_atan2_literal_case() {
        let q = Quad::from(2.3f64).atan2(Quad::from(-1.2));
        let err = rel_err(q, 2.3f64.atan2(-1.2));
        assert!(err < 1e-14, "atan2(2.3, -1.2) drifted by {err}");
    }

    #[test]
    fn test_atan2_axes_and_infinities() {
        let pi = Quad::<f64>::pi();
        let hp = Quad::half_pi();
        let qp = pi.ldexp(-2);
        let inf = f64::INFINITY;

        assert_eq!(Quad::from(0.0f64).atan2(Quad::from(3.0)), Quad::zero());
        assert_eq!(Quad::from(0.0f64).atan2(Quad::from(-3.0)), pi);
        assert_eq!(Quad::from(2.0f64).atan2(Quad::from(0.0)), hp);
        assert_eq!(Quad::from(-2.0f64).atan2(Quad::from(0.0)), -hp);
        assert_eq!(Quad::from(inf).atan2(Quad::from(inf)), qp);
        assert_eq!(Quad::from(inf).atan2(Quad::from(-inf)), pi - qp);
        assert_eq!(Quad::from(-inf).atan2(Quad::from(-inf)), -(pi - qp));
        assert_eq!(Quad::from(inf).atan2(Quad::from(5.0)), hp);
        assert_eq!(Quad::from(1.0f64).atan2(Quad::from(-inf)), pi);
        assert!(Quad::from(f64::NAN)
            .atan2(Quad::from(1.0))
            .value()
            .is_nan());
    }

    #[test]
    fn test_atan2_diagonal_reaches_quarter_pi() {
        let qp = Quad::<f64>::pi().ldexp(-2);
        let r = Quad::from(1.0f64).atan2(Quad::from(1.0));
        let err = (r - qp).value().abs();
        assert!(err < 1e-31, "atan2(1,1) off π/4 by {err}");
    }

    #[test]
    fn test_atan2_huge_and_tiny_operands() {
        let q = Quad::from(1e300f64).atan2(Quad::from(1e300));
        let err = (q - Quad::<f64>::pi().ldexp(-2)).value().abs();
        assert!(err < 1e-30, "atan2 at 1e300 scale off by {err}");
        let q = Quad::from(3e-300f64).atan2(Quad::from(4e-300));
        let err = rel_err(q, 3.0f64.atan2(4.0));
        assert!(err < 1e-14, "atan2 at 1e-300 scale drifted by {err}");
    }

    #[test]
    fn test_atan2pi_exact_rationals() {
        let inf = f64::INFINITY;
        let cases = [
            (0.0, 5.0, 0.0),
            (0.0, -5.0, 1.0),
            (-0.0, -5.0, -1.0),
            (3.0, 0.0, 0.5),
            (-3.0, 0.0, -0.5),
            (2.0, 2.0, 0.25),
            (2.0, -2.0, 0.75),
            (-2.0, 2.0, -0.25),
            (-2.0, -2.0, -0.75),
            (inf, inf, 0.25),
            (inf, -inf, 0.75),
            (7.0, inf, 0.0),
            (7.0, -inf, 1.0),
            (inf, 3.0, 0.5),
        ];
        for &(y, x, expected) in &cases {
            let q = Quad::from(y).atan2pi(Quad::from(x));
            assert_eq!(q, Quad::from(expected), "atan2pi({y}, {x})");
        }
    }

    #[test]
    fn test_atan2pi_general() {
        let q = Quad::from(2.3f64).atan2pi(Quad::from(-1.2));
        let expected = 2.3f64.atan2(-1.2) / std::f64::consts::PI;
        assert!(rel_err(q, expected) < 1e-14);
    }

    #[test]
    fn test_asin_acos() {
        for &x in &[-1.0, -0.7, -0.5, 0.0, 0.3, 0.5, 0.9, 1.0] {
            let q = Quad::from(x);
            assert!(rel_err(q.asin(), x.asin()) < 1e-14, "asin({x})");
            assert!(rel_err(q.acos(), x.acos()) < 1e-14, "acos({x})");
        }
        let err = (Quad::from(0.5f64).asin() - Quad::<f64>::pi() / Quad::from(6.0))
            .value()
            .abs();
        assert!(err < 1e-30, "asin(1/2) off π/6 by {err}");
        assert_eq!(Quad::from(-1.0f64).acos(), Quad::<f64>::pi());
        assert!(Quad::from(1.5f64).asin().value().is_nan());
        assert!(Quad::from(-1.0000001f64).acos().value().is_nan());
    }

    #[test]
    fn test_f32_trig() {
        let x = Quad::from(0.75f32);
        let err = ((x.sin().value() - 0.75f32.sin()) / 0.75f32.sin()).abs();
        assert!(err < 1e-6, "f32 sin drifted by {err}");
        assert_eq!(Quad::from(2.5f32).sinpi().value(), 1.0);
        assert_eq!(Quad::from(1.5f32).sinpi().value(), -1.0);
        assert_eq!(
            Quad::from(1.0f32).atan2pi(Quad::from(-1.0)),
            Quad::from(0.75f32)
        );
    }
}
