//! Sparse matrix kernel: CSR storage and a conjugate gradient solver.
//!
//! The fairing pipeline needs a small set of sparse operations: triplet
//! assembly, matrix-vector products for the solver, diagonal row scaling for
//! mass normalization, and a sparse matrix-matrix product for composing the
//! higher-order operator. All of it lives here, on top of a compressed
//! sparse row (CSR) layout.

use nalgebra::DVector;

use crate::error::{MeshError, Result};

/// Compressed Sparse Row (CSR) matrix.
///
/// Column indices within each row are stored in ascending order.
#[derive(Debug, Clone)]
pub struct CsrMatrix {
    rows: usize,
    cols: usize,
    /// `row_ptr[i]..row_ptr[i + 1]` indexes row `i` in `col_idx`/`values`.
    row_ptr: Vec<usize>,
    col_idx: Vec<usize>,
    values: Vec<f64>,
}

impl CsrMatrix {
    /// Create a CSR matrix from `(row, col, value)` triplets.
    ///
    /// Duplicate entries at the same position are summed.
    ///
    /// # Panics
    ///
    /// Debug-asserts that every triplet is in range.
    pub fn from_triplets(rows: usize, cols: usize, mut triplets: Vec<(usize, usize, f64)>) -> Self {
        triplets.sort_unstable_by(|a, b| a.0.cmp(&b.0).then(a.1.cmp(&b.1)));

        let mut row_counts = vec![0usize; rows];
        let mut col_idx = Vec::with_capacity(triplets.len());
        let mut values = Vec::with_capacity(triplets.len());

        let mut prev: Option<(usize, usize)> = None;
        for (row, col, val) in triplets {
            debug_assert!(row < rows && col < cols, "triplet ({row}, {col}) out of range");
            if prev == Some((row, col)) {
                *values.last_mut().unwrap() += val;
            } else {
                col_idx.push(col);
                values.push(val);
                row_counts[row] += 1;
                prev = Some((row, col));
            }
        }

        let mut row_ptr = vec![0usize; rows + 1];
        for i in 0..rows {
            row_ptr[i + 1] = row_ptr[i] + row_counts[i];
        }

        Self {
            rows,
            cols,
            row_ptr,
            col_idx,
            values,
        }
    }

    /// Number of rows.
    #[inline]
    pub fn nrows(&self) -> usize {
        self.rows
    }

    /// Number of columns.
    #[inline]
    pub fn ncols(&self) -> usize {
        self.cols
    }

    /// Number of stored entries.
    #[inline]
    pub fn nnz(&self) -> usize {
        self.values.len()
    }

    /// Iterate over the stored `(col, value)` entries of row `i`.
    pub fn row_entries(&self, i: usize) -> impl Iterator<Item = (usize, f64)> + '_ {
        let range = self.row_ptr[i]..self.row_ptr[i + 1];
        self.col_idx[range.clone()]
            .iter()
            .zip(&self.values[range])
            .map(|(&c, &v)| (c, v))
    }

    /// Matrix-vector product `y = A * x`.
    pub fn mul_vec(&self, x: &DVector<f64>) -> DVector<f64> {
        assert_eq!(x.len(), self.cols, "vector dimension mismatch");

        let mut y = DVector::zeros(self.rows);
        for i in 0..self.rows {
            let mut sum = 0.0;
            for k in self.row_ptr[i]..self.row_ptr[i + 1] {
                sum += self.values[k] * x[self.col_idx[k]];
            }
            y[i] = sum;
        }
        y
    }

    /// Scale each row by a diagonal: `diag(d) * A`.
    ///
    /// This is how the mass normalization `M⁻¹ · A` is applied, with `d`
    /// holding the inverse mass entries.
    pub fn scale_rows(&self, d: &DVector<f64>) -> CsrMatrix {
        assert_eq!(d.len(), self.rows, "diagonal dimension mismatch");

        let mut out = self.clone();
        for i in 0..self.rows {
            for k in self.row_ptr[i]..self.row_ptr[i + 1] {
                out.values[k] *= d[i];
            }
        }
        out
    }

    /// Sparse matrix-matrix product `A * B`.
    ///
    /// Row-by-row accumulation into a dense workspace; the workspace marker
    /// trick keeps each row's cost proportional to the entries it touches.
    pub fn matmul(&self, rhs: &CsrMatrix) -> CsrMatrix {
        assert_eq!(self.cols, rhs.rows, "matrix dimension mismatch");

        let n = rhs.cols;
        // marker[j] == i means accum[j] is live for the current row i.
        let mut marker = vec![usize::MAX; n];
        let mut accum = vec![0.0f64; n];
        let mut touched: Vec<usize> = Vec::new();

        let mut row_ptr = Vec::with_capacity(self.rows + 1);
        let mut col_idx = Vec::new();
        let mut values = Vec::new();
        row_ptr.push(0);

        for i in 0..self.rows {
            touched.clear();
            for (k, a) in self.row_entries(i) {
                for (j, b) in rhs.row_entries(k) {
                    if marker[j] != i {
                        marker[j] = i;
                        accum[j] = a * b;
                        touched.push(j);
                    } else {
                        accum[j] += a * b;
                    }
                }
            }
            touched.sort_unstable();
            for &j in &touched {
                col_idx.push(j);
                values.push(accum[j]);
            }
            row_ptr.push(col_idx.len());
        }

        CsrMatrix {
            rows: self.rows,
            cols: n,
            row_ptr,
            col_idx,
            values,
        }
    }
}

/// Solve `A * x = b` with the conjugate gradient method.
///
/// `A` must be symmetric positive definite. `x0` seeds the iteration (zeros
/// if `None`); convergence is declared when the residual norm drops below
/// `tolerance` relative to `|b|`.
///
/// # Errors
///
/// [`MeshError::ConvergenceFailed`] if the residual has not met the
/// tolerance after `max_iter` iterations, or on breakdown (which for an SPD
/// matrix only happens when it is numerically singular).
pub fn conjugate_gradient(
    a: &CsrMatrix,
    b: &DVector<f64>,
    x0: Option<&DVector<f64>>,
    max_iter: usize,
    tolerance: f64,
) -> Result<DVector<f64>> {
    let n = b.len();
    assert_eq!(a.nrows(), n, "matrix-vector dimension mismatch");
    assert_eq!(a.ncols(), n, "matrix must be square");

    let b_norm = b.norm();
    if b_norm == 0.0 {
        // Homogeneous system: for a positive definite A the solution is
        // exactly zero.
        return Ok(DVector::zeros(n));
    }

    let mut x = match x0 {
        Some(x0) => x0.clone(),
        None => DVector::zeros(n),
    };

    let mut r = b - a.mul_vec(&x);
    let mut r_norm_sq = r.dot(&r);
    if r_norm_sq.sqrt() / b_norm < tolerance {
        return Ok(x);
    }

    let mut p = r.clone();

    for _ in 0..max_iter {
        let ap = a.mul_vec(&p);
        let p_ap = p.dot(&ap);
        if p_ap <= 0.0 || p_ap.abs() < 1e-30 {
            // Breakdown: direction with non-positive curvature.
            break;
        }
        let alpha = r_norm_sq / p_ap;

        x += alpha * &p;
        r -= alpha * &ap;

        let new_r_norm_sq = r.dot(&r);
        if new_r_norm_sq.sqrt() / b_norm < tolerance {
            return Ok(x);
        }

        let beta = new_r_norm_sq / r_norm_sq;
        p = &r + beta * &p;
        r_norm_sq = new_r_norm_sq;
    }

    Err(MeshError::ConvergenceFailed {
        iterations: max_iter,
    })
}
