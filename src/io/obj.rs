//! Wavefront OBJ load and save.
//!
//! Reads `v` and `f` records; everything else (normals, texture
//! coordinates, materials, groups) is skipped. Face records may use the
//! `v/vt/vn` forms and negative (relative) indices; polygons with more than
//! three corners are fan-triangulated.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use nalgebra::Point3;

use crate::error::{MeshError, Result};
use crate::mesh::{build_from_triangles, to_face_vertex, HalfEdgeMesh, MeshIndex};

/// Load a mesh from an OBJ file.
pub fn load<P: AsRef<Path>, I: MeshIndex>(path: P) -> Result<HalfEdgeMesh<I>> {
    let path = path.as_ref();
    let file = File::open(path)?;
    let (vertices, faces) = parse(BufReader::new(file)).map_err(|message| MeshError::LoadError {
        path: path.to_path_buf(),
        message,
    })?;
    build_from_triangles(&vertices, &faces)
}

/// Save a mesh to an OBJ file.
pub fn save<P: AsRef<Path>, I: MeshIndex>(mesh: &HalfEdgeMesh<I>, path: P) -> Result<()> {
    let path = path.as_ref();
    let file = File::create(path)?;
    let (vertices, faces) = to_face_vertex(mesh);
    write(BufWriter::new(file), &vertices, &faces).map_err(|e| MeshError::SaveError {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Parse OBJ text into a face-vertex list.
///
/// Errors are returned as messages carrying the offending line number.
fn parse<R: BufRead>(reader: R) -> std::result::Result<(Vec<Point3<f64>>, Vec<[usize; 3]>), String> {
    let mut vertices: Vec<Point3<f64>> = Vec::new();
    let mut faces: Vec<[usize; 3]> = Vec::new();

    for (lineno, line) in reader.lines().enumerate() {
        let lineno = lineno + 1;
        let line = line.map_err(|e| format!("line {}: {}", lineno, e))?;
        let mut tokens = line.split_whitespace();

        match tokens.next() {
            Some("v") => {
                let mut coord = |axis: &str| {
                    tokens
                        .next()
                        .ok_or_else(|| format!("line {}: missing {} coordinate", lineno, axis))?
                        .parse::<f64>()
                        .map_err(|_| format!("line {}: malformed {} coordinate", lineno, axis))
                };
                let x = coord("x")?;
                let y = coord("y")?;
                let z = coord("z")?;
                vertices.push(Point3::new(x, y, z));
            }
            Some("f") => {
                let mut corners: Vec<usize> = Vec::with_capacity(4);
                for token in tokens {
                    corners.push(parse_face_index(token, vertices.len(), lineno)?);
                }
                if corners.len() < 3 {
                    return Err(format!("line {}: face with fewer than 3 corners", lineno));
                }
                // Fan-triangulate polygons.
                for i in 1..corners.len() - 1 {
                    faces.push([corners[0], corners[i], corners[i + 1]]);
                }
            }
            _ => {} // comments, normals, texcoords, groups, empty lines
        }
    }

    Ok((vertices, faces))
}

/// Parse one face corner: `v`, `v/vt`, `v//vn`, or `v/vt/vn`, where `v` is
/// 1-based or negative (relative to the vertices seen so far).
fn parse_face_index(
    token: &str,
    num_vertices: usize,
    lineno: usize,
) -> std::result::Result<usize, String> {
    let index_part = token.split('/').next().unwrap_or("");
    let index: i64 = index_part
        .parse()
        .map_err(|_| format!("line {}: malformed face index {:?}", lineno, token))?;

    let resolved = if index > 0 {
        (index - 1) as usize
    } else if index < 0 {
        let back = (-index) as usize;
        if back > num_vertices {
            return Err(format!("line {}: relative index {} out of range", lineno, index));
        }
        num_vertices - back
    } else {
        return Err(format!("line {}: face index 0 is not valid", lineno));
    };

    if resolved >= num_vertices {
        return Err(format!("line {}: face index {} out of range", lineno, index));
    }
    Ok(resolved)
}

/// Write a face-vertex list as OBJ text.
fn write<W: Write>(
    mut writer: W,
    vertices: &[Point3<f64>],
    faces: &[[usize; 3]],
) -> std::io::Result<()> {
    for p in vertices {
        writeln!(writer, "v {} {} {}", p.x, p.y, p.z)?;
    }
    for f in faces {
        writeln!(writer, "f {} {} {}", f[0] + 1, f[1] + 1, f[2] + 1)?;
    }
    writer.flush()
}
