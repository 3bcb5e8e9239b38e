//! # Burnish
//!
//! Constrained surface fairing for triangle meshes.
//!
//! Burnish smooths a mesh by minimizing a discrete smoothness energy while
//! holding a set of locked vertices fixed as boundary constraints: membrane
//! (area) energy for order 1, thin-plate (curvature) energy for order 2,
//! and higher-order variants beyond that. The locked set is derived from
//! the mesh boundary, an optional per-vertex selection, and isolated
//! vertices; everything else is repositioned by a constrained sparse solve.
//!
//! ## Features
//!
//! - **Half-edge mesh**: O(1) adjacency queries with type-safe handles and
//!   named per-vertex attributes
//! - **Fairing of any order**: `minimize_area`, `minimize_curvature`, and
//!   general `fair(mesh, k)`
//! - **Pluggable solvers**: conjugate gradient by default, dense Cholesky
//!   for small meshes, or your own `ConstrainedSolver` implementation
//! - **OBJ I/O** and a CLI binary
//!
//! ## Quick Start
//!
//! ```no_run
//! use burnish::prelude::*;
//!
//! let mut mesh: HalfEdgeMesh = burnish::io::load("bumpy_patch.obj").unwrap();
//! minimize_curvature(&mut mesh).unwrap();
//! burnish::io::save(&mesh, "faired.obj").unwrap();
//! ```
//!
//! ## Building Meshes Programmatically
//!
//! ```
//! use burnish::prelude::*;
//! use nalgebra::Point3;
//!
//! let vertices = vec![
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(1.0, 0.0, 0.0),
//!     Point3::new(1.0, 1.0, 0.0),
//!     Point3::new(0.0, 1.0, 0.0),
//!     Point3::new(0.5, 0.5, 0.3),
//! ];
//! let faces = vec![[0, 1, 4], [1, 2, 4], [2, 3, 4], [3, 0, 4]];
//! let mut mesh: HalfEdgeMesh = build_from_triangles(&vertices, &faces).unwrap();
//!
//! // Flatten the interior against the locked square border.
//! minimize_area(&mut mesh).unwrap();
//! assert!(mesh.position(VertexId::new(4)).z.abs() < 1e-6);
//! ```
//!
//! ## Restricting Fairing with a Selection
//!
//! A boolean `"v:selected"` vertex attribute limits fairing to the selected
//! vertices; everything unselected is treated as a constraint:
//!
//! ```
//! use burnish::algo::fair::SELECTION_ATTRIBUTE;
//! use burnish::prelude::*;
//! use nalgebra::Point3;
//!
//! # let vertices = vec![
//! #     Point3::new(0.0, 0.0, 0.0),
//! #     Point3::new(1.0, 0.0, 0.0),
//! #     Point3::new(1.0, 1.0, 0.0),
//! #     Point3::new(0.0, 1.0, 0.0),
//! #     Point3::new(0.5, 0.5, 0.3),
//! # ];
//! # let faces = vec![[0, 1, 4], [1, 2, 4], [2, 3, 4], [3, 0, 4]];
//! # let mut mesh: HalfEdgeMesh = build_from_triangles(&vertices, &faces).unwrap();
//! let selection = mesh
//!     .vertex_props_mut()
//!     .get_or_add::<bool>(SELECTION_ATTRIBUTE, false);
//! selection[4] = true;
//!
//! fair(&mut mesh, 1).unwrap();
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod algo;
pub mod error;
pub mod io;
pub mod mesh;

/// Prelude module for convenient imports.
///
/// ```
/// use burnish::prelude::*;
/// ```
pub mod prelude {
    pub use crate::algo::fair::{fair, fair_with, minimize_area, minimize_curvature, FairOptions};
    pub use crate::error::{MeshError, Result};
    pub use crate::mesh::{
        build_from_triangles, to_face_vertex, FaceId, HalfEdgeId, HalfEdgeMesh, MeshIndex,
        VertexId,
    };
}

// Re-export nalgebra types for convenience
pub use nalgebra;
