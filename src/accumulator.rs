//! Compensated summation by distillation.
//!
//! The accumulator keeps a list of partial sums that never overlap at
//! bit granularity, so the total is exact no matter how many terms went
//! in or in what order. Each `add` runs the incoming value through a
//! two-sum against every existing partial, keeping nonzero residues and
//! carrying the high part forward; the non-overlap invariant caps the
//! list length at roughly the exponent range divided by the mantissa
//! width, about 40 entries for f64 in practice.
//!
//! Like the scalar layer, the arithmetic relies on intermediates
//! rounding to the component width, so x87 callers hold a
//! [`PrecisionGuard`](crate::PrecisionGuard) across use.

use crate::float::Float;
use crate::quad::Quad;

/// Running compensated sum of native floats.
///
/// ```
/// use quadmaths::Accumulator;
///
/// let mut acc = Accumulator::new();
/// acc.add(1e20);
/// acc.add(1.0);
/// acc.add(-1e20);
/// assert_eq!(acc.value(), 1.0);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Accumulator<F: Float> {
    partials: Vec<F>,
}

impl<F: Float> Accumulator<F> {
    /// An empty accumulator, value 0.
    pub fn new() -> Self {
        Accumulator {
            partials: Vec::new(),
        }
    }

    /// Adds one term.
    ///
    /// A non-finite running value stops the distillation and collapses
    /// the whole accumulator to that single value; infinities and NaN
    /// then propagate through every later `add` and `value`.
    pub fn add(&mut self, x: F) {
        let mut x = x;
        let mut kept = 0;
        for i in 0..self.partials.len() {
            let mut y = self.partials[i];
            if x.abs() < y.abs() {
                core::mem::swap(&mut x, &mut y);
            }
            let hi = x + y;
            if !hi.is_finite() {
                self.partials.clear();
                self.partials.push(hi);
                return;
            }
            let lo = y - (hi - x);
            if lo != F::ZERO {
                self.partials[kept] = lo;
                kept += 1;
            }
            x = hi;
        }
        self.partials.truncate(kept);
        self.partials.push(x);
    }

    /// Adds both components of a pair value.
    pub fn add_quad(&mut self, q: Quad<F>) {
        self.add(q.h);
        self.add(q.l);
    }

    /// The current sum: a plain left-to-right fold of the partials,
    /// which is exact because they do not overlap.
    pub fn value(&self) -> F {
        let mut sum = F::ZERO;
        for &p in &self.partials {
            sum = sum + p;
        }
        sum
    }

    /// Resets to the empty state.
    pub fn clear(&mut self) {
        self.partials.clear();
    }

    /// Number of partials currently held.
    pub fn len(&self) -> usize {
        self.partials.len()
    }

    /// Whether no terms have been added since creation or `clear`.
    pub fn is_empty(&self) -> bool {
        self.partials.is_empty()
    }
}
