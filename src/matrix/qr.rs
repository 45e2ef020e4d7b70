//! Householder QR factorization at pair precision.

use crate::error::MatrixError;
use crate::float::Float;
use crate::matrix::QuadMatrix;
use crate::quad::Quad;

/// QR decomposition of an m×n matrix, m ≥ n.
///
/// Q is kept in factored form as Householder vectors; `multiply_qt`
/// applies Qᵗ to a vector without ever materializing the m×m matrix.
/// R is the n×n upper triangle. Rank-deficient columns show up as
/// (numerically) zero diagonal entries of R, and [`mark_degenerate`]
/// lets regression callers zero one explicitly so the triangular solves
/// treat its unknown as free.
///
/// [`mark_degenerate`]: QuadQR::mark_degenerate
#[derive(Debug, Clone)]
pub struct QuadQR<F: Float> {
    /// Householder vectors, column k zero above row k.
    v: QuadMatrix<F>,
    /// 2/vᵗv per reflection; zero head marks a skipped column.
    beta: Vec<Quad<F>>,
    /// Upper-triangular factor, n×n.
    r: QuadMatrix<F>,
    /// Count of reflections actually applied, for the determinant sign.
    reflections: u32,
}

impl<F: Float> QuadQR<F> {
    /// Factors `a = QR` by Householder reflections carried out in pair
    /// precision. Fails with `DimensionMismatch` when rows < cols.
    ///
    /// A zero column produces a zero R diagonal entry rather than an
    /// error; the degeneracy surfaces at solve time.
    pub fn new(a: &QuadMatrix<F>) -> Result<Self, MatrixError> {
        let m = a.rows();
        let n = a.cols();
        if m < n {
            return Err(MatrixError::DimensionMismatch);
        }
        let mut work = a.clone();
        let mut v = QuadMatrix::new(m, n);
        let mut beta = vec![Quad::zero(); n];
        let mut reflections = 0;

        for k in 0..n {
            let mut norm2 = Quad::zero();
            for i in k..m {
                let x = work[(i, k)];
                norm2 += x * x;
            }
            if norm2.h == F::ZERO {
                continue; // zero column, R diagonal stays zero
            }
            let norm = norm2.sqrt();
            // Reflect onto ∓norm·e_k, the sign chosen away from x_k so
            // the leading component of v cannot cancel.
            let alpha = if work[(k, k)].h >= F::ZERO {
                -norm
            } else {
                norm
            };
            let mut vtv = Quad::zero();
            for i in k..m {
                let vi = if i == k {
                    work[(i, k)] - alpha
                } else {
                    work[(i, k)]
                };
                v[(i, k)] = vi;
                vtv += vi * vi;
            }
            beta[k] = Quad::from(F::TWO) / vtv;
            reflections += 1;

            for j in k..n {
                let mut dot = Quad::zero();
                for i in k..m {
                    dot += v[(i, k)] * work[(i, j)];
                }
                let s = beta[k] * dot;
                for i in k..m {
                    let correction = s * v[(i, k)];
                    work[(i, j)] -= correction;
                }
            }
            // The reflection sends column k to alpha·e_k by
            // construction; store that exactly.
            work[(k, k)] = alpha;
            for i in k + 1..m {
                work[(i, k)] = Quad::zero();
            }
        }

        let mut r = QuadMatrix::new(n, n);
        for i in 0..n {
            for j in i..n {
                r[(i, j)] = work[(i, j)];
            }
        }
        Ok(QuadQR {
            v,
            beta,
            r,
            reflections,
        })
    }

    /// The upper-triangular factor.
    pub fn r(&self) -> &QuadMatrix<F> {
        &self.r
    }

    /// Parity sign of the applied reflections: det Q.
    pub(crate) fn det_sign(&self) -> i32 {
        if self.reflections % 2 == 0 {
            1
        } else {
            -1
        }
    }

    /// Applies Qᵗ to a vector in place. `x.len()` must equal the row
    /// count of the factored matrix.
    pub fn multiply_qt(&self, x: &mut [Quad<F>]) -> Result<(), MatrixError> {
        let m = self.v.rows();
        if x.len() != m {
            return Err(MatrixError::DimensionMismatch);
        }
        for k in 0..self.v.cols() {
            if self.beta[k].h == F::ZERO {
                continue;
            }
            let mut dot = Quad::zero();
            for i in k..m {
                dot += self.v[(i, k)] * x[i];
            }
            let s = self.beta[k] * dot;
            for i in k..m {
                let correction = s * self.v[(i, k)];
                x[i] -= correction;
            }
        }
        Ok(())
    }

    /// Flags column `k` as rank-deficient by zeroing its R diagonal
    /// entry, so degenerate-aware solves pin its unknown to zero.
    pub fn mark_degenerate(&mut self, k: usize) {
        self.r[(k, k)] = Quad::zero();
    }

    /// Solves R·x = b by back substitution.
    ///
    /// A zero diagonal entry fails with `Singular` unless
    /// `allow_degenerate`, in which case the corresponding unknown is
    /// set to zero and the sweep continues.
    pub fn back_solve(
        &self,
        x: &mut [Quad<F>],
        b: &[Quad<F>],
        allow_degenerate: bool,
    ) -> Result<(), MatrixError> {
        let n = self.r.rows();
        if x.len() != n || b.len() != n {
            return Err(MatrixError::DimensionMismatch);
        }
        for k in (0..n).rev() {
            let d = self.r[(k, k)];
            if d.h == F::ZERO {
                if !allow_degenerate {
                    return Err(MatrixError::Singular);
                }
                x[k] = Quad::zero();
                continue;
            }
            let mut acc = b[k];
            for j in k + 1..n {
                let t = self.r[(k, j)] * x[j];
                acc -= t;
            }
            x[k] = acc / d;
        }
        Ok(())
    }

    /// Solves Rᵗ·x = b by forward substitution, with the same
    /// degeneracy handling as [`back_solve`].
    ///
    /// [`back_solve`]: QuadQR::back_solve
    pub fn fwd_solve(
        &self,
        x: &mut [Quad<F>],
        b: &[Quad<F>],
        allow_degenerate: bool,
    ) -> Result<(), MatrixError> {
        let n = self.r.rows();
        if x.len() != n || b.len() != n {
            return Err(MatrixError::DimensionMismatch);
        }
        for k in 0..n {
            let d = self.r[(k, k)];
            if d.h == F::ZERO {
                if !allow_degenerate {
                    return Err(MatrixError::Singular);
                }
                x[k] = Quad::zero();
                continue;
            }
            let mut acc = b[k];
            for j in 0..k {
                let t = self.r[(j, k)] * x[j];
                acc -= t;
            }
            x[k] = acc / d;
        }
        Ok(())
    }

    /// Largest |r_kk|, the pivot scale for relative thresholds.
    pub(crate) fn max_diag(&self) -> F {
        let mut max = F::ZERO;
        for k in 0..self.r.rows() {
            let d = self.r[(k, k)].h.abs();
            if d > max {
                max = d;
            }
        }
        max
    }
}
