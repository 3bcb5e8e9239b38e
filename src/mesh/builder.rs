//! Mesh construction from face-vertex lists.
//!
//! Mesh files and most geometry pipelines hand over a vertex array plus
//! triangle index triples; [`build_from_triangles`] turns that into a fully
//! linked half-edge mesh, including boundary loops. [`to_face_vertex`] goes
//! the other way for export.

use std::collections::HashMap;

use nalgebra::Point3;

use super::halfedge::{Face, HalfEdge, HalfEdgeMesh};
use super::index::{FaceId, HalfEdgeId, MeshIndex, VertexId};
use crate::error::{MeshError, Result};

/// Build a half-edge mesh from vertex positions and triangle index triples.
///
/// Vertices not referenced by any face are kept and end up isolated. Input
/// is validated: out-of-range indices, degenerate triangles, and directed
/// edges shared by two faces (non-manifold or inconsistently oriented input)
/// are rejected.
///
/// # Example
/// ```
/// use burnish::mesh::{build_from_triangles, HalfEdgeMesh};
/// use nalgebra::Point3;
///
/// let vertices = vec![
///     Point3::new(0.0, 0.0, 0.0),
///     Point3::new(1.0, 0.0, 0.0),
///     Point3::new(0.5, 1.0, 0.0),
/// ];
/// let mesh: HalfEdgeMesh = build_from_triangles(&vertices, &[[0, 1, 2]]).unwrap();
/// assert_eq!(mesh.num_vertices(), 3);
/// assert_eq!(mesh.num_faces(), 1);
/// ```
pub fn build_from_triangles<I: MeshIndex>(
    vertices: &[Point3<f64>],
    faces: &[[usize; 3]],
) -> Result<HalfEdgeMesh<I>> {
    if faces.is_empty() {
        return Err(MeshError::EmptyMesh);
    }

    for (fi, face) in faces.iter().enumerate() {
        for &vi in face {
            if vi >= vertices.len() {
                return Err(MeshError::InvalidVertexIndex {
                    face: fi,
                    vertex: vi,
                });
            }
        }
        if face[0] == face[1] || face[1] == face[2] || face[0] == face[2] {
            return Err(MeshError::DegenerateFace { face: fi });
        }
    }

    let mut mesh = HalfEdgeMesh::with_capacity(vertices.len(), faces.len());
    let vertex_ids: Vec<VertexId<I>> = vertices.iter().map(|&pos| mesh.add_vertex(pos)).collect();

    // Directed edge (origin, dest) -> half-edge; a duplicate directed edge
    // means two coherently oriented faces share it, which a manifold
    // orientable surface cannot have.
    let mut edge_map: HashMap<(usize, usize), HalfEdgeId<I>> = HashMap::new();

    for face in faces {
        let face_id = FaceId::<I>::new(mesh.num_faces());
        let base = mesh.num_halfedges();
        let hes = [
            HalfEdgeId::<I>::new(base),
            HalfEdgeId::<I>::new(base + 1),
            HalfEdgeId::<I>::new(base + 2),
        ];
        mesh.halfedges.extend([HalfEdge::new(); 3]);
        mesh.faces.push(Face::new(hes[0]));

        for i in 0..3 {
            let origin = face[i];
            let dest = face[(i + 1) % 3];

            let he = mesh.halfedge_mut(hes[i]);
            he.origin = vertex_ids[origin];
            he.next = hes[(i + 1) % 3];
            he.face = face_id;

            mesh.vertex_mut(vertex_ids[origin]).halfedge = hes[i];

            if edge_map.insert((origin, dest), hes[i]).is_some() {
                return Err(MeshError::NonManifoldEdge {
                    v0: origin,
                    v1: dest,
                });
            }
        }
    }

    link_twins(&mut mesh, &edge_map, &vertex_ids);
    link_boundary_loops(&mut mesh);
    anchor_boundary_vertices(&mut mesh);

    Ok(mesh)
}

/// Pair each half-edge with its twin, creating boundary half-edges where the
/// reverse directed edge has no face.
fn link_twins<I: MeshIndex>(
    mesh: &mut HalfEdgeMesh<I>,
    edge_map: &HashMap<(usize, usize), HalfEdgeId<I>>,
    vertex_ids: &[VertexId<I>],
) {
    for (&(origin, dest), &he) in edge_map {
        if let Some(&twin) = edge_map.get(&(dest, origin)) {
            mesh.halfedge_mut(he).twin = twin;
        } else {
            let boundary = HalfEdgeId::<I>::new(mesh.num_halfedges());
            mesh.halfedges.push(HalfEdge::new());

            mesh.halfedge_mut(he).twin = boundary;
            let bhe = mesh.halfedge_mut(boundary);
            bhe.origin = vertex_ids[dest];
            bhe.twin = he;
            // face stays invalid: this half-edge is the boundary side
        }
    }
}

/// Chain boundary half-edges into loops via `next`.
///
/// On a manifold surface each boundary vertex has exactly one outgoing
/// boundary half-edge, so following "the boundary half-edge leaving my
/// destination" closes every loop.
fn link_boundary_loops<I: MeshIndex>(mesh: &mut HalfEdgeMesh<I>) {
    let boundary: Vec<HalfEdgeId<I>> = mesh
        .halfedge_ids()
        .filter(|&he| mesh.is_boundary_halfedge(he))
        .collect();

    let mut outgoing: HashMap<usize, HalfEdgeId<I>> = HashMap::new();
    for &he in &boundary {
        outgoing.insert(mesh.origin(he).index(), he);
    }

    for &he in &boundary {
        if let Some(&next) = outgoing.get(&mesh.dest(he).index()) {
            mesh.halfedge_mut(he).next = next;
        }
    }
}

/// Point every boundary vertex at one of its outgoing boundary half-edges.
///
/// [`HalfEdgeMesh::is_boundary_vertex`] relies on this to answer in O(1).
fn anchor_boundary_vertices<I: MeshIndex>(mesh: &mut HalfEdgeMesh<I>) {
    for he in mesh.halfedge_ids().collect::<Vec<_>>() {
        if mesh.is_boundary_halfedge(he) {
            let v = mesh.origin(he);
            mesh.vertex_mut(v).halfedge = he;
        }
    }
}

/// Convert a half-edge mesh back to a face-vertex representation.
///
/// Returns the `(vertices, faces)` pair in the same form
/// [`build_from_triangles`] accepts.
pub fn to_face_vertex<I: MeshIndex>(mesh: &HalfEdgeMesh<I>) -> (Vec<Point3<f64>>, Vec<[usize; 3]>) {
    let vertices: Vec<Point3<f64>> = mesh.vertex_ids().map(|v| *mesh.position(v)).collect();
    let faces: Vec<[usize; 3]> = mesh
        .face_ids()
        .map(|f| {
            let [v0, v1, v2] = mesh.face_triangle(f);
            [v0.index(), v1.index(), v2.index()]
        })
        .collect();
    (vertices, faces)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quad_vertices() -> Vec<Point3<f64>> {
        vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ]
    }

    #[test]
    fn test_build_two_triangles() {
        let mesh: HalfEdgeMesh =
            build_from_triangles(&quad_vertices(), &[[0, 1, 2], [0, 2, 3]]).unwrap();

        assert_eq!(mesh.num_vertices(), 4);
        assert_eq!(mesh.num_faces(), 2);
        // 6 interior half-edges, one shared edge, 4 boundary half-edges.
        assert_eq!(mesh.num_halfedges(), 10);
        assert!(mesh.is_valid());

        for v in mesh.vertex_ids() {
            assert!(mesh.is_boundary_vertex(v));
        }
    }

    #[test]
    fn test_closed_mesh_has_no_boundary() {
        let vertices = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.5, 1.0, 0.0),
            Point3::new(0.5, 0.5, 1.0),
        ];
        let faces = vec![[0, 2, 1], [0, 1, 3], [1, 2, 3], [2, 0, 3]];
        let mesh: HalfEdgeMesh = build_from_triangles(&vertices, &faces).unwrap();

        assert_eq!(mesh.num_halfedges(), 12);
        assert!(mesh.is_valid());
        for v in mesh.vertex_ids() {
            assert!(!mesh.is_boundary_vertex(v));
        }
    }

    #[test]
    fn test_unreferenced_vertex_is_isolated() {
        let mut vertices = quad_vertices();
        vertices.push(Point3::new(5.0, 5.0, 5.0));
        let mesh: HalfEdgeMesh =
            build_from_triangles(&vertices, &[[0, 1, 2], [0, 2, 3]]).unwrap();

        assert!(mesh.is_isolated(VertexId::new(4)));
        assert!(!mesh.is_isolated(VertexId::new(0)));
    }

    #[test]
    fn test_empty_faces_rejected() {
        let result: Result<HalfEdgeMesh> = build_from_triangles(&quad_vertices(), &[]);
        assert!(matches!(result, Err(MeshError::EmptyMesh)));
    }

    #[test]
    fn test_out_of_range_index_rejected() {
        let result: Result<HalfEdgeMesh> = build_from_triangles(&quad_vertices(), &[[0, 1, 9]]);
        assert!(matches!(
            result,
            Err(MeshError::InvalidVertexIndex { face: 0, vertex: 9 })
        ));
    }

    #[test]
    fn test_degenerate_face_rejected() {
        let result: Result<HalfEdgeMesh> = build_from_triangles(&quad_vertices(), &[[0, 1, 1]]);
        assert!(matches!(result, Err(MeshError::DegenerateFace { face: 0 })));
    }

    #[test]
    fn test_duplicated_directed_edge_rejected() {
        // Both faces traverse 0 -> 1 in the same direction.
        let result: Result<HalfEdgeMesh> =
            build_from_triangles(&quad_vertices(), &[[0, 1, 2], [0, 1, 3]]);
        assert!(matches!(result, Err(MeshError::NonManifoldEdge { .. })));
    }

    #[test]
    fn test_face_vertex_roundtrip() {
        let faces = vec![[0usize, 1, 2], [0, 2, 3]];
        let mesh: HalfEdgeMesh = build_from_triangles(&quad_vertices(), &faces).unwrap();
        let (vertices, out_faces) = to_face_vertex(&mesh);

        assert_eq!(vertices, quad_vertices());
        assert_eq!(out_faces, faces);
    }

    #[test]
    fn test_boundary_loop_is_closed() {
        let mesh: HalfEdgeMesh =
            build_from_triangles(&quad_vertices(), &[[0, 1, 2], [0, 2, 3]]).unwrap();

        // Walk the boundary loop from any boundary half-edge; it must come
        // back to the start after visiting each boundary half-edge once.
        let start = mesh
            .halfedge_ids()
            .find(|&he| mesh.is_boundary_halfedge(he))
            .unwrap();
        let mut he = start;
        let mut steps = 0;
        loop {
            he = mesh.next(he);
            steps += 1;
            assert!(steps <= mesh.num_halfedges(), "boundary loop not closed");
            if he == start {
                break;
            }
        }
        assert_eq!(steps, 4);
    }
}
