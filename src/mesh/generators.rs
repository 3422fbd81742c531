//! Uniform structured meshes on the bi-unit box [-1, 1]^d.
//!
//! Vertices are numbered with x fastest. Quads are counter-clockwise,
//! each square cell splits into two counter-clockwise triangles, and hex
//! vertices follow the `i + 2j + 4k` convention of the reference cube.

use super::MeshError;
use crate::reference::ElementShape;

/// Vertex coordinates per axis and the element-to-vertex table.
pub type VertexMesh = (Vec<Vec<f64>>, Vec<Vec<usize>>);

/// Uniform mesh of [-1, 1]^d with `cells[d]` cells along axis d.
///
/// # Errors
/// [`MeshError::DimensionMismatch`] if `cells` does not have one positive
/// entry per dimension of `shape`.
pub fn uniform_mesh(shape: ElementShape, cells: &[usize]) -> Result<VertexMesh, MeshError> {
    let dim = shape.dim();
    if cells.len() != dim || cells.contains(&0) {
        return Err(MeshError::dimension(format!(
            "{:?} mesh needs {} positive cell counts, got {:?}",
            shape, dim, cells
        )));
    }

    // vertex grid
    let counts: Vec<usize> = cells.iter().map(|&n| n + 1).collect();
    let n_vertices: usize = counts.iter().product();
    let mut vertices = vec![Vec::with_capacity(n_vertices); dim];
    for v in 0..n_vertices {
        let mut rest = v;
        for d in 0..dim {
            let i = rest % counts[d];
            rest /= counts[d];
            vertices[d].push(-1.0 + 2.0 * i as f64 / cells[d] as f64);
        }
    }

    let vid = |ijk: [usize; 3]| -> usize {
        let mut id = 0;
        let mut stride = 1;
        for d in 0..dim {
            id += ijk[d] * stride;
            stride *= counts[d];
        }
        id
    };

    let mut etov = Vec::new();
    match shape {
        ElementShape::Line => {
            for i in 0..cells[0] {
                etov.push(vec![i, i + 1]);
            }
        }
        ElementShape::Quad | ElementShape::Tri => {
            for j in 0..cells[1] {
                for i in 0..cells[0] {
                    let a = vid([i, j, 0]);
                    let b = vid([i + 1, j, 0]);
                    let c = vid([i, j + 1, 0]);
                    let d = vid([i + 1, j + 1, 0]);
                    if shape == ElementShape::Quad {
                        etov.push(vec![a, b, d, c]);
                    } else {
                        etov.push(vec![a, b, c]);
                        etov.push(vec![d, c, b]);
                    }
                }
            }
        }
        ElementShape::Hex => {
            for k in 0..cells[2] {
                for j in 0..cells[1] {
                    for i in 0..cells[0] {
                        etov.push(
                            (0..8)
                                .map(|v| vid([i + (v & 1), j + ((v >> 1) & 1), k + ((v >> 2) & 1)]))
                                .collect(),
                        );
                    }
                }
            }
        }
    }

    Ok((vertices, etov))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signed_area(vertices: &[Vec<f64>], tri: &[usize]) -> f64 {
        let (x, y) = (&vertices[0], &vertices[1]);
        let (a, b, c) = (tri[0], tri[1], tri[2]);
        0.5 * ((x[b] - x[a]) * (y[c] - y[a]) - (x[c] - x[a]) * (y[b] - y[a]))
    }

    #[test]
    fn test_triangles_are_counter_clockwise() {
        let (vertices, etov) = uniform_mesh(ElementShape::Tri, &[2, 3]).unwrap();
        assert_eq!(etov.len(), 12);
        let total: f64 = etov.iter().map(|t| signed_area(&vertices, t)).sum();
        assert!(etov.iter().all(|t| signed_area(&vertices, t) > 0.0));
        assert!((total - 4.0).abs() < 1e-14);
    }

    #[test]
    fn test_hex_vertex_convention() {
        let (vertices, etov) = uniform_mesh(ElementShape::Hex, &[1, 1, 1]).unwrap();
        assert_eq!(vertices[0].len(), 8);
        for (local, &v) in etov[0].iter().enumerate() {
            for d in 0..3 {
                let expected = if (local >> d) & 1 == 1 { 1.0 } else { -1.0 };
                assert_eq!(vertices[d][v], expected);
            }
        }
    }

    #[test]
    fn test_rejects_bad_cell_counts() {
        assert!(uniform_mesh(ElementShape::Quad, &[2]).is_err());
        assert!(uniform_mesh(ElementShape::Line, &[0]).is_err());
    }
}
