//! Euclidean norm at pair precision.

use crate::float::Float;
use crate::quad::Quad;

impl<F: Float> Quad<F> {
    /// √(self² + other²), prescaled by a power of two so the squares
    /// can neither overflow nor flush to zero.
    ///
    /// IEEE special-value rules apply: an infinite operand wins even
    /// against NaN.
    pub fn hypot(self, other: Self) -> Self {
        if self.h.is_infinite() || other.h.is_infinite() {
            return Quad::from(F::infinity());
        }
        if self.h.is_nan() || other.h.is_nan() {
            return Quad::from(F::nan());
        }
        let m = if self.h.abs() > other.h.abs() {
            self.h.abs()
        } else {
            other.h.abs()
        };
        if m == F::ZERO {
            return Quad::zero();
        }
        let e = (m.ln() / Quad::<F>::ln2().h).round().to_i32();
        let x = self.ldexp(-e);
        let y = other.ldexp(-e);
        (x * x + y * y).sqrt().ldexp(e)
    }
}
