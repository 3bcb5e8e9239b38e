//! Discrete Laplace operators: cotangent stiffness and lumped mass.
//!
//! The stiffness matrix is the cotangent-weight discrete Laplace-Beltrami
//! operator, assembled per face: the edge `(i, j)` of a triangle gets half
//! the cotangent of the angle opposite to it, summed over the (up to two)
//! incident triangles. The matrix is assembled in the positive convention
//! (positive diagonal, negative off-diagonals), so `S` is symmetric positive
//! semi-definite with the constant vectors as its null space — and so is
//! every mass-normalized composition `S · (M⁻¹ · S)^(k-1)`, which keeps a
//! single solver path valid for all orders `k`.
//!
//! The mass matrix is the barycentric lumped diagonal: each vertex carries
//! one third of the area of its incident triangles.

use nalgebra::{DVector, Point3};

use crate::mesh::{HalfEdgeMesh, MeshIndex};

use super::sparse::CsrMatrix;

/// Assembly options for the stiffness operator.
#[derive(Debug, Clone, Default)]
pub struct LaplaceOptions {
    /// Clamp negative cotangent weights to zero.
    ///
    /// Obtuse triangles produce negative edge weights; clamping trades
    /// accuracy of the operator for a positivity-preserving stencil. Energy
    /// minimization wants the unclamped operator, so this defaults to off.
    pub clamp_negative: bool,
}

/// Cotangent of the angle at vertex `a` in triangle `(a, b, c)`.
fn cotangent_angle(a: &Point3<f64>, b: &Point3<f64>, c: &Point3<f64>) -> f64 {
    let ab = b - a;
    let ac = c - a;

    let dot = ab.dot(&ac);
    let cross_len = ab.cross(&ac).norm();

    if cross_len < 1e-10 {
        0.0 // degenerate corner
    } else {
        dot / cross_len
    }
}

/// Assemble the cotangent stiffness matrix of a mesh.
///
/// Returns an `n x n` symmetric positive semi-definite CSR matrix in the
/// positive convention (see module docs). Rows of isolated vertices are
/// empty. Assembly reads geometry only; the mesh is not modified.
pub fn stiffness_matrix<I: MeshIndex>(
    mesh: &HalfEdgeMesh<I>,
    options: &LaplaceOptions,
) -> CsrMatrix {
    let n = mesh.num_vertices();
    // 4 triplets per edge, 3 edges per face.
    let mut triplets: Vec<(usize, usize, f64)> = Vec::with_capacity(mesh.num_faces() * 12);

    for f in mesh.face_ids() {
        let [v0, v1, v2] = mesh.face_triangle(f);
        let [p0, p1, p2] = mesh.face_positions(f);

        // The weight of an edge is half the cotangent of the opposite angle.
        let mut w01 = 0.5 * cotangent_angle(&p2, &p0, &p1);
        let mut w12 = 0.5 * cotangent_angle(&p0, &p1, &p2);
        let mut w20 = 0.5 * cotangent_angle(&p1, &p2, &p0);

        if options.clamp_negative {
            w01 = w01.max(0.0);
            w12 = w12.max(0.0);
            w20 = w20.max(0.0);
        }

        for (a, b, w) in [
            (v0.index(), v1.index(), w01),
            (v1.index(), v2.index(), w12),
            (v2.index(), v0.index(), w20),
        ] {
            triplets.push((a, b, -w));
            triplets.push((b, a, -w));
            triplets.push((a, a, w));
            triplets.push((b, b, w));
        }
    }

    CsrMatrix::from_triplets(n, n, triplets)
}

/// Assemble the barycentric lumped mass diagonal.
///
/// `mass[i]` is one third of the total area of the triangles incident to
/// vertex `i`; isolated vertices get zero.
pub fn mass_matrix<I: MeshIndex>(mesh: &HalfEdgeMesh<I>) -> DVector<f64> {
    let mut mass = DVector::zeros(mesh.num_vertices());

    for f in mesh.face_ids() {
        let contribution = mesh.face_area(f) / 3.0;
        for v in mesh.face_triangle(f) {
            mass[v.index()] += contribution;
        }
    }

    mass
}

/// Compose the order-`k` operator `S · (M⁻¹ · S)^(k-1)`.
///
/// `k = 1` returns the stiffness matrix itself (membrane energy), `k = 2`
/// the mass-normalized bi-Laplacian (thin-plate energy), and so on. The
/// inverse mass of a zero-mass vertex is never touched because such a
/// vertex's stiffness row and column are empty.
pub fn higher_order_operator(stiffness: &CsrMatrix, mass: &DVector<f64>, k: u32) -> CsrMatrix {
    debug_assert!(k >= 1, "operator order must be positive");

    let mut a = stiffness.clone();
    if k > 1 {
        let inv_mass = mass.map(|m| if m > 0.0 { 1.0 / m } else { 0.0 });
        for _ in 1..k {
            a = stiffness.matmul(&a.scale_rows(&inv_mass));
        }
    }
    a
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::build_from_triangles;
    use nalgebra::Point3;

    fn quad_mesh() -> HalfEdgeMesh {
        let vertices = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ];
        build_from_triangles(&vertices, &[[0, 1, 2], [0, 2, 3]]).unwrap()
    }

    #[test]
    fn test_stiffness_rows_sum_to_zero() {
        let mesh = quad_mesh();
        let s = stiffness_matrix(&mesh, &LaplaceOptions::default());

        // Constant functions are in the null space: each row sums to zero.
        for i in 0..s.nrows() {
            let sum: f64 = s.row_entries(i).map(|(_, v)| v).sum();
            assert!(sum.abs() < 1e-12, "row {} sums to {}", i, sum);
        }
    }

    #[test]
    fn test_stiffness_is_symmetric() {
        let mesh = quad_mesh();
        let s = stiffness_matrix(&mesh, &LaplaceOptions::default());

        for i in 0..s.nrows() {
            for (j, v) in s.row_entries(i) {
                let transposed: f64 = s
                    .row_entries(j)
                    .find(|&(c, _)| c == i)
                    .map(|(_, v)| v)
                    .unwrap_or(0.0);
                assert!((v - transposed).abs() < 1e-12);
            }
        }
    }

    #[test]
    fn test_stiffness_diagonal_positive() {
        let mesh = quad_mesh();
        let s = stiffness_matrix(&mesh, &LaplaceOptions::default());

        for i in 0..s.nrows() {
            let diag: f64 = s
                .row_entries(i)
                .find(|&(c, _)| c == i)
                .map(|(_, v)| v)
                .unwrap_or(0.0);
            assert!(diag > 0.0, "diagonal {} is {}", i, diag);
        }
    }

    #[test]
    fn test_clamping_changes_obtuse_weights() {
        // A strongly obtuse triangle has a negative cotangent weight on the
        // edge opposite the obtuse corner.
        let vertices = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(4.0, 0.0, 0.0),
            Point3::new(2.0, 0.2, 0.0),
        ];
        let mesh: HalfEdgeMesh = build_from_triangles(&vertices, &[[0, 1, 2]]).unwrap();

        let raw = stiffness_matrix(&mesh, &LaplaceOptions::default());
        let clamped = stiffness_matrix(
            &mesh,
            &LaplaceOptions {
                clamp_negative: true,
            },
        );

        // Off-diagonal (0, 1) is opposite the obtuse corner at vertex 2.
        let raw_01 = raw.row_entries(0).find(|&(c, _)| c == 1).unwrap().1;
        let clamped_01 = clamped
            .row_entries(0)
            .find(|&(c, _)| c == 1)
            .map(|(_, v)| v)
            .unwrap_or(0.0);
        assert!(raw_01 > 0.0, "unclamped negative weight is stored as positive off-diagonal");
        assert_eq!(clamped_01, 0.0);
    }

    #[test]
    fn test_mass_totals_surface_area() {
        let mesh = quad_mesh();
        let mass = mass_matrix(&mesh);

        let total: f64 = mass.iter().sum();
        assert!((total - mesh.surface_area()).abs() < 1e-12);
        assert!(mass.iter().all(|&m| m > 0.0));
    }

    #[test]
    fn test_isolated_vertex_has_zero_mass_and_empty_row() {
        let vertices = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(9.0, 9.0, 9.0),
        ];
        let mesh: HalfEdgeMesh = build_from_triangles(&vertices, &[[0, 1, 2]]).unwrap();

        let mass = mass_matrix(&mesh);
        assert_eq!(mass[3], 0.0);

        let s = stiffness_matrix(&mesh, &LaplaceOptions::default());
        assert_eq!(s.row_entries(3).count(), 0);
    }

    #[test]
    fn test_higher_order_matches_manual_composition() {
        let mesh = quad_mesh();
        let s = stiffness_matrix(&mesh, &LaplaceOptions::default());
        let mass = mass_matrix(&mesh);

        let a2 = higher_order_operator(&s, &mass, 2);

        // Compare A2 * x against S * (M^-1 * (S * x)) on a probe vector.
        let x = DVector::from_vec(vec![1.0, -2.0, 0.5, 3.0]);
        let mut sx = s.mul_vec(&x);
        for i in 0..sx.len() {
            sx[i] /= mass[i];
        }
        let expected = s.mul_vec(&sx);

        let actual = a2.mul_vec(&x);
        assert!((actual - expected).norm() < 1e-10);
    }

    #[test]
    fn test_order_one_is_stiffness() {
        let mesh = quad_mesh();
        let s = stiffness_matrix(&mesh, &LaplaceOptions::default());
        let mass = mass_matrix(&mesh);

        let a1 = higher_order_operator(&s, &mass, 1);
        let x = DVector::from_vec(vec![0.3, 1.0, -1.0, 2.0]);
        assert!((a1.mul_vec(&x) - s.mul_vec(&x)).norm() < 1e-14);
    }
}
