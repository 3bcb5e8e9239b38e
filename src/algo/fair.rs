//! Surface fairing: constrained smoothness-energy minimization.
//!
//! Fairing repositions the free vertices of a mesh to minimize a k-th order
//! smoothness energy while locked vertices stay put as boundary constraints:
//! `k = 1` minimizes membrane (area) energy, `k = 2` thin-plate (curvature)
//! energy, larger `k` higher-order variants.
//!
//! Which vertices are locked is derived from the mesh, not chosen here:
//! boundary vertices always are (plus one or two rings of their neighbors
//! for higher orders, since a 2k-order energy needs k rings of boundary
//! data), isolated vertices always are, and if a `"v:selected"` attribute
//! marks a non-empty selection, everything unselected is locked too. The
//! remaining free vertices are solved for by eliminating the locked rows
//! from the k-th order operator and solving the reduced system per
//! coordinate axis.
//!
//! # Example
//!
//! ```
//! use burnish::algo::fair::minimize_area;
//! use burnish::mesh::{build_from_triangles, HalfEdgeMesh, VertexId};
//! use nalgebra::Point3;
//!
//! // A square with a lifted center vertex.
//! let vertices = vec![
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(1.0, 0.0, 0.0),
//!     Point3::new(1.0, 1.0, 0.0),
//!     Point3::new(0.0, 1.0, 0.0),
//!     Point3::new(0.5, 0.5, 0.8),
//! ];
//! let faces = vec![[0, 1, 4], [1, 2, 4], [2, 3, 4], [3, 0, 4]];
//! let mut mesh: HalfEdgeMesh = build_from_triangles(&vertices, &faces).unwrap();
//!
//! minimize_area(&mut mesh).unwrap();
//!
//! // The center vertex relaxed into the plane of the locked border.
//! assert!(mesh.position(VertexId::new(4)).z.abs() < 1e-6);
//! ```

use nalgebra::{DMatrix, Point3};

use crate::error::{MeshError, Result};
use crate::mesh::{HalfEdgeMesh, MeshIndex, VertexId};

use super::laplace::{higher_order_operator, mass_matrix, stiffness_matrix, LaplaceOptions};
use super::solve::{CgSolver, ConstrainedSolver, DenseCholeskySolver};

/// Name of the per-vertex selection attribute consumed by fairing.
///
/// A `bool` attribute under this name restricts fairing to the selected
/// vertices; see [`fair`] for the exact locking rules.
pub const SELECTION_ATTRIBUTE: &str = "v:selected";

/// Which constrained-solver backend to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolverBackend {
    /// Iterative conjugate gradient (default; scales to large meshes).
    ConjugateGradient,
    /// Direct dense Cholesky factorization (small/medium meshes; detects
    /// singular constraint sets outright).
    DenseCholesky,
}

/// Options for [`fair_with`].
#[derive(Debug, Clone)]
pub struct FairOptions {
    /// Solver backend.
    pub backend: SolverBackend,

    /// Iteration budget per coordinate axis (conjugate gradient only).
    pub max_iterations: usize,

    /// Relative residual tolerance (conjugate gradient only).
    pub tolerance: f64,

    /// Solve the three coordinate axes in parallel (default: true).
    pub parallel: bool,
}

impl Default for FairOptions {
    fn default() -> Self {
        Self {
            backend: SolverBackend::ConjugateGradient,
            max_iterations: 1000,
            tolerance: 1e-10,
            parallel: true,
        }
    }
}

impl FairOptions {
    /// Select the solver backend.
    pub fn with_backend(mut self, backend: SolverBackend) -> Self {
        self.backend = backend;
        self
    }

    /// Set the conjugate gradient iteration budget.
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Set the conjugate gradient tolerance.
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Force sequential execution.
    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }
}

/// Minimize membrane (area) energy: fairing of order 1.
pub fn minimize_area<I: MeshIndex>(mesh: &mut HalfEdgeMesh<I>) -> Result<()> {
    fair(mesh, 1)
}

/// Minimize thin-plate (curvature) energy: fairing of order 2.
pub fn minimize_curvature<I: MeshIndex>(mesh: &mut HalfEdgeMesh<I>) -> Result<()> {
    fair(mesh, 2)
}

/// Fair a mesh with the k-th order smoothness energy and default options.
///
/// Locking rules, applied in this order:
/// 1. Every boundary vertex is locked; for `k >= 2` its one-ring as well,
///    and for `k >= 3` its two-ring. Rings beyond the second are never
///    locked, no matter how large `k` grows.
/// 2. If the [`SELECTION_ATTRIBUTE`] exists and selects at least one
///    vertex, every unselected vertex is locked.
/// 3. Every isolated vertex is locked.
///
/// All other vertices are free and get new positions; locked positions are
/// preserved exactly.
///
/// # Errors
///
/// - [`MeshError::InvalidParameter`] for `k = 0`.
/// - [`MeshError::MissingConstraints`] if no vertex ends up locked (for
///   example a closed mesh without a selection); nothing is computed in
///   that case.
/// - [`MeshError::SingularSystem`] if the locked set does not pin the
///   system down (for example a free connected component with no locked
///   vertex). Vertex positions are untouched on error.
pub fn fair<I: MeshIndex>(mesh: &mut HalfEdgeMesh<I>, k: u32) -> Result<()> {
    fair_with(mesh, k, &FairOptions::default())
}

/// Fair a mesh with explicit options.
///
/// See [`fair`] for semantics.
pub fn fair_with<I: MeshIndex>(
    mesh: &mut HalfEdgeMesh<I>,
    k: u32,
    options: &FairOptions,
) -> Result<()> {
    match options.backend {
        SolverBackend::ConjugateGradient => {
            let solver = CgSolver {
                max_iterations: options.max_iterations,
                tolerance: options.tolerance,
                parallel: options.parallel,
            };
            fair_with_solver(mesh, k, &solver)
        }
        SolverBackend::DenseCholesky => fair_with_solver(mesh, k, &DenseCholeskySolver),
    }
}

/// Fair a mesh with a caller-provided constrained solver.
///
/// The solver seam: any [`ConstrainedSolver`] implementation can be
/// substituted without changing how constraints are classified or how the
/// operator is assembled.
pub fn fair_with_solver<I: MeshIndex>(
    mesh: &mut HalfEdgeMesh<I>,
    k: u32,
    solver: &dyn ConstrainedSolver,
) -> Result<()> {
    if k < 1 {
        return Err(MeshError::invalid_param(
            "k",
            k,
            "fairing order must be at least 1",
        ));
    }

    // Classify before any matrix work: an unconstrained system is a
    // precondition failure, not a solver failure.
    let locked = locked_vertices(mesh, k);
    if !locked.iter().any(|&l| l) {
        return Err(MeshError::MissingConstraints);
    }

    let n = mesh.num_vertices();

    let stiffness = stiffness_matrix(mesh, &LaplaceOptions::default());
    let mass = mass_matrix(mesh);
    let a = higher_order_operator(&stiffness, &mass, k);

    // The energy is homogeneous: the right-hand side is zero and the
    // constraint values enter through the locked rows of X.
    let b = DMatrix::zeros(n, 3);
    let x0 = DMatrix::from_fn(n, 3, |i, c| mesh.position(VertexId::new(i))[c]);

    let x = solver.solve(&a, &b, &locked, &x0)?;

    // Write back only after a successful solve.
    for i in 0..n {
        mesh.set_position(VertexId::new(i), Point3::new(x[(i, 0)], x[(i, 1)], x[(i, 2)]));
    }

    Ok(())
}

/// Derive the locked-vertex mask for order-`k` fairing.
///
/// The mask is a plain per-call vector, never stored on the mesh, so it
/// cannot outlive the fairing call or leak through an error path.
fn locked_vertices<I: MeshIndex>(mesh: &HalfEdgeMesh<I>, k: u32) -> Vec<bool> {
    let n = mesh.num_vertices();
    let mut locked = vec![false; n];

    let selection = mesh.vertex_props().get::<bool>(SELECTION_ATTRIBUTE);
    let has_selection = selection.is_some_and(|s| s.iter().any(|&sel| sel));

    // Boundary vertices, with up to two rings of padding for higher orders.
    for v in mesh.vertex_ids() {
        if mesh.is_boundary_vertex(v) {
            locked[v.index()] = true;

            if k >= 2 {
                for w in mesh.vertex_neighbors(v) {
                    locked[w.index()] = true;

                    if k >= 3 {
                        for u in mesh.vertex_neighbors(w) {
                            locked[u.index()] = true;
                        }
                    }
                }
            }
        }
    }

    // Unselected and isolated vertices.
    for v in mesh.vertex_ids() {
        if has_selection && !selection.unwrap()[v.index()] {
            locked[v.index()] = true;
        }
        if mesh.is_isolated(v) {
            locked[v.index()] = true;
        }
    }

    locked
}
