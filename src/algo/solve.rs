//! Constrained sparse linear solves.
//!
//! Fairing produces systems of the form `A · X = B` where a subset of rows
//! is pinned: locked rows of the solution must equal the corresponding rows
//! of an initial-value matrix. The locked degrees of freedom are eliminated
//! before solving — their known values move to the right-hand side and the
//! reduced system over free rows is solved per column.
//!
//! The solve itself is behind the [`ConstrainedSolver`] trait so
//! factorization strategies can be swapped without touching the callers:
//! [`CgSolver`] (iterative, matrix-free, the default) and
//! [`DenseCholeskySolver`] (direct, reuses one factorization across all
//! right-hand-side columns).

use nalgebra::{Cholesky, DMatrix, DVector};
use rayon::prelude::*;

use crate::error::{MeshError, Result};

use super::sparse::{conjugate_gradient, CsrMatrix};

/// A solver for `A · X = B` with per-row equality constraints.
///
/// Rows `i` with `locked[i]` are hard constraints: the output equals
/// `x0.row(i)`. Free rows satisfy the reduced system obtained by
/// substituting the locked values. Columns share `A` and are solved
/// independently.
pub trait ConstrainedSolver {
    /// Solve the constrained system.
    ///
    /// # Errors
    ///
    /// [`MeshError::SingularSystem`] if the reduced system over free rows
    /// cannot be solved — typically because the locked set leaves part of
    /// the operator's null space unpinned.
    fn solve(
        &self,
        a: &CsrMatrix,
        b: &DMatrix<f64>,
        locked: &[bool],
        x0: &DMatrix<f64>,
    ) -> Result<DMatrix<f64>>;
}

/// The system restricted to free rows, with locked values folded into the
/// right-hand side.
struct ReducedSystem {
    /// Free row index -> original row index.
    free: Vec<usize>,
    a_ff: CsrMatrix,
    /// `b_f - A_fl · x_l`, one column per coordinate axis.
    rhs: DMatrix<f64>,
}

fn reduce(
    a: &CsrMatrix,
    b: &DMatrix<f64>,
    locked: &[bool],
    x0: &DMatrix<f64>,
) -> ReducedSystem {
    let n = a.nrows();
    assert_eq!(a.ncols(), n, "operator must be square");
    assert_eq!(locked.len(), n, "locked mask dimension mismatch");
    assert_eq!(b.nrows(), n, "right-hand side dimension mismatch");
    assert_eq!(x0.nrows(), n, "initial value dimension mismatch");
    assert_eq!(b.ncols(), x0.ncols(), "column count mismatch");

    let free: Vec<usize> = (0..n).filter(|&i| !locked[i]).collect();
    let mut index_of = vec![usize::MAX; n];
    for (fi, &i) in free.iter().enumerate() {
        index_of[i] = fi;
    }

    let cols = b.ncols();
    let mut rhs = DMatrix::zeros(free.len(), cols);
    let mut triplets = Vec::new();

    for (fi, &i) in free.iter().enumerate() {
        for c in 0..cols {
            rhs[(fi, c)] = b[(i, c)];
        }
        for (j, v) in a.row_entries(i) {
            if locked[j] {
                for c in 0..cols {
                    rhs[(fi, c)] -= v * x0[(j, c)];
                }
            } else {
                triplets.push((fi, index_of[j], v));
            }
        }
    }

    ReducedSystem {
        a_ff: CsrMatrix::from_triplets(free.len(), free.len(), triplets),
        free,
        rhs,
    }
}

/// Scatter per-column free solutions back over the initial values.
fn scatter(x0: &DMatrix<f64>, free: &[usize], columns: &[DVector<f64>]) -> DMatrix<f64> {
    let mut x = x0.clone();
    for (c, col) in columns.iter().enumerate() {
        for (fi, &i) in free.iter().enumerate() {
            x[(i, c)] = col[fi];
        }
    }
    x
}

/// Conjugate gradient backend.
///
/// Solves each right-hand-side column iteratively, seeded with the free part
/// of the initial values; columns run in parallel unless disabled. Suited to
/// large systems where factorization is too expensive.
#[derive(Debug, Clone)]
pub struct CgSolver {
    /// Iteration budget per column.
    pub max_iterations: usize,
    /// Relative residual tolerance.
    pub tolerance: f64,
    /// Solve the columns in parallel.
    pub parallel: bool,
}

impl Default for CgSolver {
    fn default() -> Self {
        Self {
            max_iterations: 1000,
            tolerance: 1e-10,
            parallel: true,
        }
    }
}

impl CgSolver {
    fn solve_column(&self, reduced: &ReducedSystem, x0: &DMatrix<f64>, c: usize) -> Result<DVector<f64>> {
        let rhs = reduced.rhs.column(c).into_owned();
        let guess = DVector::from_iterator(
            reduced.free.len(),
            reduced.free.iter().map(|&i| x0[(i, c)]),
        );
        conjugate_gradient(
            &reduced.a_ff,
            &rhs,
            Some(&guess),
            self.max_iterations,
            self.tolerance,
        )
        .map_err(|_| MeshError::SingularSystem)
    }
}

impl ConstrainedSolver for CgSolver {
    fn solve(
        &self,
        a: &CsrMatrix,
        b: &DMatrix<f64>,
        locked: &[bool],
        x0: &DMatrix<f64>,
    ) -> Result<DMatrix<f64>> {
        let reduced = reduce(a, b, locked, x0);
        if reduced.free.is_empty() {
            return Ok(x0.clone());
        }

        let cols = b.ncols();
        let columns: Vec<DVector<f64>> = if self.parallel {
            (0..cols)
                .into_par_iter()
                .map(|c| self.solve_column(&reduced, x0, c))
                .collect::<Result<_>>()?
        } else {
            (0..cols)
                .map(|c| self.solve_column(&reduced, x0, c))
                .collect::<Result<_>>()?
        };

        Ok(scatter(x0, &reduced.free, &columns))
    }
}

/// Dense Cholesky backend.
///
/// Densifies the reduced system and factors it once, then back-substitutes
/// all right-hand-side columns through the shared factorization. Memory is
/// quadratic in the number of free vertices, so this is for small and
/// medium systems — and it detects rank deficiency outright where an
/// iterative method may stagnate instead.
#[derive(Debug, Clone, Default)]
pub struct DenseCholeskySolver;

impl ConstrainedSolver for DenseCholeskySolver {
    fn solve(
        &self,
        a: &CsrMatrix,
        b: &DMatrix<f64>,
        locked: &[bool],
        x0: &DMatrix<f64>,
    ) -> Result<DMatrix<f64>> {
        let reduced = reduce(a, b, locked, x0);
        let nf = reduced.free.len();
        if nf == 0 {
            return Ok(x0.clone());
        }

        let mut dense = DMatrix::zeros(nf, nf);
        for i in 0..nf {
            for (j, v) in reduced.a_ff.row_entries(i) {
                dense[(i, j)] = v;
            }
        }

        let factorization = Cholesky::new(dense).ok_or(MeshError::SingularSystem)?;
        let solution = factorization.solve(&reduced.rhs);

        let columns: Vec<DVector<f64>> = (0..b.ncols())
            .map(|c| solution.column(c).into_owned())
            .collect();
        Ok(scatter(x0, &reduced.free, &columns))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Path graph Laplacian on 4 vertices (positive convention).
    fn path_laplacian() -> CsrMatrix {
        let mut triplets = Vec::new();
        for (i, j) in [(0usize, 1usize), (1, 2), (2, 3)] {
            triplets.push((i, j, -1.0));
            triplets.push((j, i, -1.0));
            triplets.push((i, i, 1.0));
            triplets.push((j, j, 1.0));
        }
        CsrMatrix::from_triplets(4, 4, triplets)
    }

    fn endpoints_locked() -> Vec<bool> {
        vec![true, false, false, true]
    }

    /// Endpoint values 0 and 3: the harmonic interior is 1, 2.
    fn path_x0() -> DMatrix<f64> {
        DMatrix::from_row_slice(4, 1, &[0.0, 5.0, -5.0, 3.0])
    }

    fn check_path_solution(x: &DMatrix<f64>) {
        assert_eq!(x[(0, 0)], 0.0);
        assert!((x[(1, 0)] - 1.0).abs() < 1e-8);
        assert!((x[(2, 0)] - 2.0).abs() < 1e-8);
        assert_eq!(x[(3, 0)], 3.0);
    }

    #[test]
    fn test_cg_locked_rows_preserved() {
        let a = path_laplacian();
        let b = DMatrix::zeros(4, 1);
        let x = CgSolver::default()
            .solve(&a, &b, &endpoints_locked(), &path_x0())
            .unwrap();
        check_path_solution(&x);
    }

    #[test]
    fn test_cholesky_matches_cg() {
        let a = path_laplacian();
        let b = DMatrix::zeros(4, 1);

        let from_cg = CgSolver::default()
            .solve(&a, &b, &endpoints_locked(), &path_x0())
            .unwrap();
        let from_chol = DenseCholeskySolver
            .solve(&a, &b, &endpoints_locked(), &path_x0())
            .unwrap();

        assert!((from_cg - from_chol).norm() < 1e-8);
    }

    #[test]
    fn test_multiple_columns() {
        let a = path_laplacian();
        let b = DMatrix::zeros(4, 2);
        // Second column interpolates 10 .. 40.
        let x0 = DMatrix::from_row_slice(4, 2, &[0.0, 10.0, 9.0, 0.0, 9.0, 0.0, 3.0, 40.0]);

        let x = CgSolver::default()
            .solve(&a, &b, &endpoints_locked(), &x0)
            .unwrap();

        assert!((x[(1, 0)] - 1.0).abs() < 1e-8);
        assert!((x[(1, 1)] - 20.0).abs() < 1e-8);
        assert!((x[(2, 1)] - 30.0).abs() < 1e-8);
        assert_eq!(x[(0, 1)], 10.0);
        assert_eq!(x[(3, 1)], 40.0);
    }

    #[test]
    fn test_all_locked_returns_input() {
        let a = path_laplacian();
        let b = DMatrix::zeros(4, 1);
        let x0 = path_x0();

        let x = CgSolver::default()
            .solve(&a, &b, &[true; 4], &x0)
            .unwrap();
        assert_eq!(x, x0);
    }

    #[test]
    fn test_cholesky_detects_singular_reduced_system() {
        // No row locked: the path Laplacian keeps its constant null space.
        let a = path_laplacian();
        let b = DMatrix::zeros(4, 1);
        let x0 = path_x0();

        let result = DenseCholeskySolver.solve(&a, &b, &[false; 4], &x0);
        assert!(matches!(result, Err(MeshError::SingularSystem)));
    }

    #[test]
    fn test_cg_reports_unsolvable_system() {
        // Free block is singular and the locked column makes the reduced
        // right-hand side inconsistent, so CG cannot converge.
        let triplets = vec![
            (0, 0, 1.0),
            (1, 1, 1.0),
            (1, 2, -1.0),
            (2, 1, -1.0),
            (2, 2, 1.0),
            (0, 1, -1.0),
            (1, 0, -1.0),
        ];
        let a = CsrMatrix::from_triplets(3, 3, triplets);
        let b = DMatrix::zeros(3, 1);
        let x0 = DMatrix::from_row_slice(3, 1, &[1.0, 0.0, 0.0]);

        let solver = CgSolver {
            max_iterations: 50,
            tolerance: 1e-12,
            parallel: false,
        };
        let result = solver.solve(&a, &b, &[true, false, false], &x0);
        assert!(matches!(result, Err(MeshError::SingularSystem)));
    }
}
