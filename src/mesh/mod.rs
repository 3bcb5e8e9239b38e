//! Half-edge triangle mesh and per-vertex attribute storage.
//!
//! The central type is [`HalfEdgeMesh`]: a triangle mesh stored as a
//! half-edge (doubly-connected edge list) structure with O(1) adjacency
//! queries, plus a typed, name-keyed per-vertex attribute store
//! ([`VertexProps`]).
//!
//! Mesh elements are addressed by type-safe handles ([`VertexId`],
//! [`HalfEdgeId`], [`FaceId`]), generic over the index width via the
//! [`MeshIndex`] trait (`u16`, `u32`, `u64`; default `u32`). Vertex handles
//! are stable integers `0..n`, so they double as row indices into solver
//! matrices and attribute arrays.
//!
//! # Construction
//!
//! ```
//! use burnish::mesh::{build_from_triangles, HalfEdgeMesh};
//! use nalgebra::Point3;
//!
//! let vertices = vec![
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(1.0, 0.0, 0.0),
//!     Point3::new(0.5, 1.0, 0.0),
//! ];
//! let mesh: HalfEdgeMesh = build_from_triangles(&vertices, &[[0, 1, 2]]).unwrap();
//! assert!(mesh.is_boundary_vertex(burnish::mesh::VertexId::new(0)));
//! ```

mod builder;
mod halfedge;
mod index;
mod props;

pub use builder::{build_from_triangles, to_face_vertex};
pub use halfedge::{Face, HalfEdge, HalfEdgeMesh, Vertex, VertexHalfEdgeIter};
pub use index::{FaceId, HalfEdgeId, MeshIndex, VertexId};
pub use props::VertexProps;
