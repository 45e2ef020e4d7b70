//! Dense linear algebra over pair-precision entries.
//!
//! The point of this layer is high-accuracy regression: products
//! accumulate through [`Quad::dot_product`], and everything that needs
//! a factorization goes through Householder QR rather than elimination,
//! so determinants and inverses stay stable for the ill-conditioned
//! normal-equation matrices statistics code produces.

pub mod qr;

use std::fmt;
use std::ops::{Index, IndexMut};

use crate::error::MatrixError;
use crate::float::Float;
use crate::quad::Quad;
use qr::QuadQR;

/// Dense row-major matrix of pair-precision values.
///
/// Indexed by `(row, col)` tuples. Cloning deep-copies the storage.
#[derive(Debug, Clone, PartialEq)]
pub struct QuadMatrix<F: Float> {
    rows: usize,
    cols: usize,
    data: Vec<Quad<F>>,
}

impl<F: Float> QuadMatrix<F> {
    /// A zero-filled rows×cols matrix.
    ///
    /// # Panics
    /// Panics when either dimension is zero.
    pub fn new(rows: usize, cols: usize) -> Self {
        assert!(rows > 0 && cols > 0, "matrix dimensions must be positive");
        QuadMatrix {
            rows,
            cols,
            data: vec![Quad::zero(); rows * cols],
        }
    }

    /// Builds a matrix from native values in row-major order.
    ///
    /// # Panics
    /// Panics when `entries.len() != rows * cols` or a dimension is zero.
    pub fn from_rows(rows: usize, cols: usize, entries: &[F]) -> Self {
        assert_eq!(
            entries.len(),
            rows * cols,
            "entry count does not match the matrix shape"
        );
        let mut m = QuadMatrix::new(rows, cols);
        for (slot, &x) in m.data.iter_mut().zip(entries) {
            *slot = Quad::from(x);
        }
        m
    }

    /// The n×n identity.
    pub fn identity(n: usize) -> Self {
        let mut m = QuadMatrix::new(n, n);
        for i in 0..n {
            m[(i, i)] = Quad::one();
        }
        m
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    fn is_square(&self) -> bool {
        self.rows == self.cols
    }

    /// Matrix product, every cell accumulated in pair precision via
    /// [`Quad::dot_product`]. Fails with `DimensionMismatch` when the
    /// inner dimensions disagree.
    pub fn multiply(&self, other: &QuadMatrix<F>) -> Result<QuadMatrix<F>, MatrixError> {
        if self.cols != other.rows {
            return Err(MatrixError::DimensionMismatch);
        }
        let mut out = QuadMatrix::new(self.rows, other.cols);
        let mut col = vec![Quad::zero(); other.rows];
        for j in 0..other.cols {
            for (k, slot) in col.iter_mut().enumerate() {
                *slot = other[(k, j)];
            }
            for i in 0..self.rows {
                let row = &self.data[i * self.cols..(i + 1) * self.cols];
                out[(i, j)] = Quad::dot_product(row, &col);
            }
        }
        Ok(out)
    }

    /// The transposed matrix.
    pub fn transpose(&self) -> QuadMatrix<F> {
        let mut out = QuadMatrix::new(self.cols, self.rows);
        for i in 0..self.rows {
            for j in 0..self.cols {
                out[(j, i)] = self[(i, j)];
            }
        }
        out
    }

    /// Determinant via QR: the product of R's diagonal, sign-adjusted
    /// by the reflection parity. Square matrices only.
    pub fn determinant(&self) -> Result<Quad<F>, MatrixError> {
        if !self.is_square() {
            return Err(MatrixError::DimensionMismatch);
        }
        let qr = QuadQR::new(self)?;
        let mut det = Quad::one();
        for k in 0..self.rows {
            det *= qr.r()[(k, k)];
        }
        if qr.det_sign() < 0 {
            det = -det;
        }
        Ok(det)
    }

    /// Inverse via QR, solving against each unit column.
    ///
    /// Fails with `Singular` when any R diagonal entry falls at or
    /// below `threshold` relative to the largest one; pass zero to
    /// reject only exact zeros.
    pub fn inverse(&self, threshold: F) -> Result<QuadMatrix<F>, MatrixError> {
        if !self.is_square() {
            return Err(MatrixError::DimensionMismatch);
        }
        let qr = QuadQR::new(self)?;
        let cutoff = threshold * qr.max_diag();
        for k in 0..self.rows {
            if !(qr.r()[(k, k)].h.abs() > cutoff) {
                return Err(MatrixError::Singular);
            }
        }
        solve_unit_columns(&qr, self.rows, false)
    }

    /// Moore-Penrose-style generalized inverse. Never fails: columns
    /// whose R diagonal entry falls at or below `threshold` relative to
    /// the largest are marked degenerate and contribute zero.
    pub fn pseudo_inverse(&self, threshold: F) -> QuadMatrix<F> {
        if self.rows < self.cols {
            return self.transpose().pseudo_inverse(threshold).transpose();
        }
        // rows ≥ cols makes the QR unconditionally valid, and the unit
        // column solves cannot fail in degenerate-aware mode.
        let mut qr = QuadQR::new(self).unwrap_or_else(|_| unreachable!());
        let cutoff = threshold * qr.max_diag();
        for k in 0..self.cols {
            if !(qr.r()[(k, k)].h.abs() > cutoff) {
                qr.mark_degenerate(k);
            }
        }
        solve_unit_columns(&qr, self.rows, true).unwrap_or_else(|_| unreachable!())
    }

    /// Bounds on the eigenvalue spread of a symmetric matrix, by
    /// Gershgorin discs evaluated in pair precision. The returned
    /// interval is guaranteed to contain the whole spectrum; it is a
    /// bracketing bound, not a pair of eigenvalues. Disc edges that are
    /// not representable natively are rounded outward, never inward.
    pub fn eigen_range(&self) -> Result<(F, F), MatrixError> {
        if !self.is_square() {
            return Err(MatrixError::DimensionMismatch);
        }
        let mut min = F::infinity();
        let mut max = -F::infinity();
        for i in 0..self.rows {
            let center = self[(i, i)];
            let mut radius = Quad::zero();
            for j in 0..self.cols {
                if j != i {
                    radius += self[(i, j)].abs();
                }
            }
            let lo = lower_bound(center - radius);
            let hi = upper_bound(center + radius);
            if lo < min {
                min = lo;
            }
            if hi > max {
                max = hi;
            }
        }
        Ok((min, max))
    }
}

/// Native value of a pair, nudged one ulp down when rounding to the
/// component width discarded a negative tail. Keeps interval lower
/// bounds from creeping inward.
fn lower_bound<F: Float>(q: Quad<F>) -> F {
    let v = q.value();
    if (q - Quad::from(v)).value() < F::ZERO {
        v.next_down()
    } else {
        v
    }
}

/// Upper-bound counterpart of [`lower_bound`]: nudges one ulp up when a
/// positive tail was discarded.
fn upper_bound<F: Float>(q: Quad<F>) -> F {
    let v = q.value();
    if (q - Quad::from(v)).value() > F::ZERO {
        v.next_up()
    } else {
        v
    }
}

/// Solves the factored system against every unit column, assembling the
/// (pseudo-)inverse column by column.
fn solve_unit_columns<F: Float>(
    qr: &QuadQR<F>,
    rows: usize,
    allow_degenerate: bool,
) -> Result<QuadMatrix<F>, MatrixError> {
    let n = qr.r().rows();
    let mut out = QuadMatrix::new(n, rows);
    let mut rhs = vec![Quad::zero(); rows];
    let mut x = vec![Quad::zero(); n];
    for j in 0..rows {
        for (k, slot) in rhs.iter_mut().enumerate() {
            *slot = if k == j { Quad::one() } else { Quad::zero() };
        }
        qr.multiply_qt(&mut rhs)?;
        qr.back_solve(&mut x, &rhs[..n], allow_degenerate)?;
        for i in 0..n {
            out[(i, j)] = x[i];
        }
    }
    Ok(out)
}

impl<F: Float> Index<(usize, usize)> for QuadMatrix<F> {
    type Output = Quad<F>;

    #[inline]
    fn index(&self, (r, c): (usize, usize)) -> &Quad<F> {
        assert!(r < self.rows && c < self.cols, "matrix index out of range");
        &self.data[r * self.cols + c]
    }
}

impl<F: Float> IndexMut<(usize, usize)> for QuadMatrix<F> {
    #[inline]
    fn index_mut(&mut self, (r, c): (usize, usize)) -> &mut Quad<F> {
        assert!(r < self.rows && c < self.cols, "matrix index out of range");
        &mut self.data[r * self.cols + c]
    }
}

impl<F: Float> fmt::Display for QuadMatrix<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for i in 0..self.rows {
            for j in 0..self.cols {
                if j > 0 {
                    write!(f, " ")?;
                }
                write!(f, "{}", self[(i, j)].value())?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
