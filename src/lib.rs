//! Double-double ("quad") arithmetic: every value is an unevaluated sum
//! of two native floats, which roughly doubles the working precision
//! (~32 significant decimal digits for f64 pairs). On top of the scalar
//! layer sit a compensated-summation accumulator whose result is exact
//! regardless of term count or order, and dense pair-precision linear
//! algebra (QR, determinant, inverse, pseudo-inverse, eigenvalue-range
//! bounds) for high-accuracy regression.
//!
//! The error-free transformations at the bottom of the stack require
//! every intermediate to round to the native width. That fails on x87
//! hardware, whose registers default to 80-bit internal precision, so
//! computations there are bracketed by a [`PrecisionGuard`]:
//!
//! ```
//! use quadmaths::{PrecisionGuard, Quad};
//!
//! let _guard = PrecisionGuard::new();
//! let a = Quad::from(1e20) + Quad::from(1.0) - Quad::from(1e20);
//! assert_eq!(a.value(), 1.0); // native arithmetic returns 0
//! ```
//!
//! On everything else (x86-64, SSE2 x86, aarch64, ...) the guard is
//! pure bookkeeping and costs one mutex acquisition. [`functional`]
//! reports whether the platform can deliver pair accuracy at all;
//! where it cannot, operations still run and degrade gracefully to
//! roughly native precision.

pub mod accumulator;
mod arch;
pub mod error;
pub mod float;
mod guard;
pub mod matrix;
pub mod quad;

pub use accumulator::Accumulator;
pub use error::MatrixError;
pub use float::Float;
pub use guard::{functional, PrecisionGuard};
pub use matrix::qr::QuadQR;
pub use matrix::QuadMatrix;
pub use quad::{Quad, Quad32, Quad64};

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    /// Exact (mantissa, ulp-exponent) decomposition: x == m·2^e.
    fn decompose(x: f64) -> (i64, i32) {
        assert!(x.is_finite() && x != 0.0);
        let bits = x.to_bits();
        let sign = if bits >> 63 == 1 { -1i64 } else { 1 };
        let exp = ((bits >> 52) & 0x7ff) as i32;
        let frac = (bits & ((1u64 << 52) - 1)) as i64;
        if exp == 0 {
            (sign * frac, -1074)
        } else {
            (sign * (frac | (1 << 52)), exp - 1075)
        }
    }

    /// x as an exact integer multiple of 2^grid. Panics if x does not
    /// lie on that grid, which in these tests means the operation under
    /// test was not error-free.
    fn on_grid(x: f64, grid: i32) -> i128 {
        if x == 0.0 {
            return 0;
        }
        let (m, e) = decompose(x);
        let shift = e - grid;
        if shift >= 0 {
            assert!(shift < 75, "grid span too wide for exact comparison");
            (m as i128) << shift
        } else {
            let down = -shift as u32;
            assert!(
                down < 63 && m % (1i64 << down) == 0,
                "{x} is not on grid 2^{grid}"
            );
            (m >> down) as i128
        }
    }

    fn ulp(x: f64) -> f64 {
        let a = x.abs();
        f64::from_bits(a.to_bits() + 1) - a
    }

    proptest! {
        #[test]
        fn prop_two_sum_is_error_free(a in -1e12f64..1e12, b in -1e12f64..1e12) {
            prop_assume!(a != 0.0 && b != 0.0);
            let (ea, eb) = (decompose(a).1, decompose(b).1);
            // keep the shared grid narrow enough for i128 reconstruction
            prop_assume!((ea - eb).abs() < 60);
            let q = Quad::from(a) + Quad::from(b);
            // h + l must reproduce a + b exactly, not just rounded.
            let grid = ea.min(eb);
            let exact = on_grid(a, grid) + on_grid(b, grid);
            let pair = on_grid(q.h, grid) + on_grid(q.l, grid);
            prop_assert_eq!(pair, exact);
            // and the head is the correctly rounded native sum.
            prop_assert_eq!(q.h, a + b);
            if q.h != 0.0 {
                prop_assert!(q.l.abs() <= ulp(q.h) / 2.0 + f64::MIN_POSITIVE);
            }
        }

        #[test]
        fn prop_two_sum_subtraction(a in -1e12f64..1e12, b in -1e12f64..1e12) {
            prop_assume!(a != 0.0 && b != 0.0);
            let (ea, eb) = (decompose(a).1, decompose(b).1);
            prop_assume!((ea - eb).abs() < 60);
            let q = Quad::from(a) - Quad::from(b);
            let grid = ea.min(eb);
            let exact = on_grid(a, grid) - on_grid(b, grid);
            let pair = on_grid(q.h, grid) + on_grid(q.l, grid);
            prop_assert_eq!(pair, exact);
        }

        #[test]
        fn prop_mul12_is_exact(a in -1e6f64..1e6, b in -1e6f64..1e6) {
            // keep the product well clear of subnormal underflow,
            // where the low product bits genuinely round away
            prop_assume!(a.abs() > 1e-140 && b.abs() > 1e-140);
            let q = Quad::mul12(a, b);
            let (ma, ea) = decompose(a);
            let (mb, eb) = decompose(b);
            let grid = ea + eb;
            let exact = ma as i128 * mb as i128;
            let pair = on_grid(q.h, grid) + on_grid(q.l, grid);
            prop_assert_eq!(pair, exact);
        }

        #[test]
        fn prop_value_round_trips(x in proptest::num::f64::NORMAL) {
            prop_assert_eq!(Quad::from(x).value(), x);
            prop_assert_eq!(Quad::from(x).floor().value(), x.floor());
        }

        #[test]
        fn prop_mul_matches_native_head(a in -1e100f64..1e100, b in -1e100f64..1e100) {
            let q = Quad::from(a) * Quad::from(b);
            prop_assert_eq!(q.value(), a * b);
        }

        #[test]
        fn prop_div_mul_round_trip(a in 1e-10f64..1e10, b in 1e-10f64..1e10) {
            let q = Quad::from(a) / Quad::from(b) * Quad::from(b);
            let err = ((q - Quad::from(a)) / Quad::from(a)).value().abs();
            prop_assert!(err < 1e-30, "a/b·b drifted by {}", err);
        }

        #[test]
        fn prop_sqrt_squares_back(a in 1e-150f64..1e150) {
            let q = Quad::from(a).sqrt();
            let err = ((q * q - Quad::from(a)) / Quad::from(a)).value().abs();
            prop_assert!(err < 1e-30, "sqrt² drifted by {}", err);
        }

        #[test]
        fn prop_accumulator_is_order_independent(
            xs in proptest::collection::vec(-1e15f64..1e15, 1..40)
        ) {
            let mut fwd = Accumulator::new();
            let mut rev = Accumulator::new();
            let mut sorted = Accumulator::new();
            for &x in &xs {
                fwd.add(x);
            }
            for &x in xs.iter().rev() {
                rev.add(x);
            }
            let mut by_magnitude = xs.clone();
            by_magnitude.sort_by(|p, q| p.abs().partial_cmp(&q.abs()).unwrap());
            for &x in &by_magnitude {
                sorted.add(x);
            }
            prop_assert_eq!(fwd.value(), rev.value());
            prop_assert_eq!(fwd.value(), sorted.value());
        }

        #[test]
        fn prop_exp_ln_consistency(x in -600.0f64..600.0) {
            let q = Quad::from(x).exp().ln();
            let err = (q - Quad::from(x)).value().abs();
            let tol = 1e-29 * x.abs().max(1.0);
            prop_assert!(err < tol, "ln(exp({})) drifted by {}", x, err);
        }
    }

    #[test]
    fn test_constants_beat_the_advertised_floor() {
        // The pairs sit ~1e-32 from the true values; 1e-14 is the
        // sanity floor against the native constants.
        let checks = [
            (Quad::<f64>::pi(), std::f64::consts::PI),
            (Quad::e(), std::f64::consts::E),
            (Quad::ln2(), std::f64::consts::LN_2),
            (Quad::sqrt2(), std::f64::consts::SQRT_2),
            (Quad::euler(), 0.5772156649015329),
        ];
        for (q, native) in checks {
            let rel = ((q.value() - native) / native).abs();
            assert!(rel < 1e-14, "{q:?} drifted from native {native}");
        }
        assert_eq!(Quad::<f64>::zero().value(), 0.0);
        assert_eq!(Quad::<f64>::one().value(), 1.0);
        assert_eq!(Quad::<f64>::half().value(), 0.5);
    }

    #[test]
    fn test_regression_shaped_workflow() {
        // Least squares for y = 2x + 1 through a QR solve, the way the
        // statistics consumers drive this crate.
        let _guard = PrecisionGuard::new();
        let xs = [0.0f64, 1.0, 2.0, 3.0, 4.0];
        let mut design = QuadMatrix::new(5, 2);
        let mut rhs = Vec::with_capacity(5);
        for (i, &x) in xs.iter().enumerate() {
            design[(i, 0)] = Quad::one();
            design[(i, 1)] = Quad::from(x);
            rhs.push(Quad::from(2.0 * x + 1.0));
        }
        let qr = QuadQR::new(&design).unwrap();
        qr.multiply_qt(&mut rhs).unwrap();
        let mut coeff = [Quad::zero(); 2];
        qr.back_solve(&mut coeff, &rhs[..2], false).unwrap();
        assert!((coeff[0] - Quad::from(1.0)).value().abs() < 1e-28);
        assert!((coeff[1] - Quad::from(2.0)).value().abs() < 1e-28);
    }

    #[test]
    fn test_dot_product_beats_native() {
        let a: Vec<Quad<f64>> = [1e18, 3.0, -1e18, 4.0]
            .iter()
            .map(|&x| Quad::from(x))
            .collect();
        let b: Vec<Quad<f64>> = [2.0, 1.0, 2.0, 0.5]
            .iter()
            .map(|&x| Quad::from(x))
            .collect();
        assert_eq!(Quad::dot_product(&a, &b).value(), 5.0);
    }

    #[test]
    fn test_functional_reports_support() {
        assert!(functional::<f64>());
        assert!(Quad::<f64>::functional());
        assert!(Quad::<f32>::functional());
    }
}
