//! Volume and face quadrature on curved cut cells.
//!
//! The cut cell polygon (boundary at its break-points) is triangulated
//! and edges are flipped until no curved edge bends too far into its
//! sub-triangle. Each sub-triangle is mapped from the reference triangle by a degree-Ng
//! polynomial map: the affine map plus a warp that moves the edge points
//! onto the true boundary. The warp is the minimum-norm lift
//!
//! W = V_nodes Eᵀ (E Eᵀ)⁻¹
//!
//! where E is the Dubiner basis at 3Ng reference boundary points (Ng GLL
//! points per edge, end point excluded). Weights are `wq * J` with J
//! computed from the warped nodes, and J must stay positive.

use super::curve::CutBoundary;
use super::triangulate::{EdgeKind, PlanarTriangulator, classify_edge, counter_clockwise, curvature_flips};
use super::CutCellError;
use crate::basis::triangle_basis;
use crate::operators::dense::{matmul, matvec, right_solve, transpose};
use crate::polynomial::{gauss_legendre, gauss_lobatto_nodes};
use crate::reference::{ElementShape, ReferenceElement};
use faer::Mat;

const REFERENCE_VERTICES: [[f64; 2]; 3] = [[-1.0, -1.0], [1.0, -1.0], [-1.0, 1.0]];

/// Volume quadrature of one cut cell.
#[derive(Clone, Debug, Default)]
pub struct CutCellQuadrature {
    /// Point x coordinates
    pub x: Vec<f64>,
    /// Point y coordinates
    pub y: Vec<f64>,
    /// Weights (physical, include J)
    pub w: Vec<f64>,
}

impl CutCellQuadrature {
    /// Number of points.
    #[inline]
    pub fn len(&self) -> usize {
        self.w.len()
    }

    /// True if the rule has no points.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.w.is_empty()
    }

    /// Sum of the weights.
    pub fn volume(&self) -> f64 {
        self.w.iter().sum()
    }
}

/// Boundary quadrature of one cut cell.
#[derive(Clone, Debug, Default)]
pub struct CutFaceQuadrature {
    /// Point x coordinates
    pub x: Vec<f64>,
    /// Point y coordinates
    pub y: Vec<f64>,
    /// Outward unit normal, x component
    pub nx: Vec<f64>,
    /// Outward unit normal, y component
    pub ny: Vec<f64>,
    /// Weights including the face Jacobian sJ
    pub w: Vec<f64>,
}

/// Builds quadrature rules for cut cells.
///
/// Everything that depends only on the degrees is precomputed once.
#[derive(Clone)]
pub struct CutCellQuadratureBuilder {
    degree: usize,
    /// Reference triangle of the geometry degree with the volume rule
    geometry: ReferenceElement,
    vq_dr: Mat<f64>,
    vq_ds: Mat<f64>,
    /// (reference edge, local parameter u) of each lifted boundary point
    boundary_points: Vec<(usize, f64)>,
    warp: Mat<f64>,
    /// Reference line of the geometry degree, for boundary tangents
    line: ReferenceElement,
    face_nodes: Vec<f64>,
    face_weights: Vec<f64>,
    face_interp: Mat<f64>,
}

impl CutCellQuadratureBuilder {
    /// Create a builder for rules exact to `degree` on straight sub-triangles,
    /// boundary maps of degree `geometry_degree` and `face_points` Gauss
    /// points per boundary segment.
    pub fn new(degree: usize, geometry_degree: usize, face_points: usize) -> Result<Self, CutCellError> {
        if geometry_degree == 0 || face_points == 0 {
            return Err(CutCellError::InvalidConfig(
                "geometry degree and face point count must be positive".to_string(),
            ));
        }
        let ng = geometry_degree;
        let geometry = ReferenceElement::with_quadrature_degree(ElementShape::Tri, ng, degree);
        let vq_dr = matmul(&geometry.vq, &geometry.differentiation[0]);
        let vq_ds = matmul(&geometry.vq, &geometry.differentiation[1]);

        let gll = gauss_lobatto_nodes(ng);
        let boundary_points: Vec<(usize, f64)> = (0..3)
            .flat_map(|edge| gll[..ng].iter().map(move |&xi| (edge, 0.5 * (1.0 + xi))))
            .collect();
        let (rb, sb): (Vec<f64>, Vec<f64>) = boundary_points
            .iter()
            .map(|&(edge, u)| {
                let p = lerp(REFERENCE_VERTICES[edge], REFERENCE_VERTICES[(edge + 1) % 3], u);
                (p[0], p[1])
            })
            .unzip();

        let e = triangle_basis(ng, &rb, &sb).v;
        let et = transpose(&e);
        let warp = right_solve(&matmul(&geometry.vandermonde, &et), &matmul(&e, &et));

        let line = ReferenceElement::new(ElementShape::Line, ng);
        let (face_nodes, face_weights) = gauss_legendre(face_points);
        let face_interp = line.interpolation_matrix(&[face_nodes.clone()]);

        Ok(Self {
            degree,
            geometry,
            vq_dr,
            vq_ds,
            boundary_points,
            warp,
            line,
            face_nodes,
            face_weights,
            face_interp,
        })
    }

    /// Polynomial degree of the volume rule on each sub-triangle.
    #[inline]
    pub fn degree(&self) -> usize {
        self.degree
    }

    /// Volume quadrature of the region enclosed by `boundary`.
    ///
    /// # Errors
    /// - any error of the triangulator
    /// - [`CutCellError::InvertedSubTriangle`] if a warped sub-triangle has
    ///   J ≤ 0 at a quadrature point
    pub fn volume_quadrature(
        &self,
        boundary: &CutBoundary,
        triangulator: &dyn PlanarTriangulator,
    ) -> Result<CutCellQuadrature, CutCellError> {
        let vertices = boundary.vertices();
        let n = vertices.len();
        let mut triangles = triangulator.triangulate(&vertices)?;
        curvature_flips(&mut triangles, &vertices, boundary);

        let mut rule = CutCellQuadrature::default();
        for tri in triangles {
            let tri = counter_clockwise(tri, &vertices);
            let corners = tri.map(|v| vertices[v]);
            let affine = |r: f64, s: f64| -> [f64; 2] {
                let (la, lb, lc) = (-0.5 * (r + s), 0.5 * (1.0 + r), 0.5 * (1.0 + s));
                [
                    la * corners[0][0] + lb * corners[1][0] + lc * corners[2][0],
                    la * corners[0][1] + lb * corners[1][1] + lc * corners[2][1],
                ]
            };

            // displacement of each lifted boundary point from the affine edge
            let mut dx = Vec::with_capacity(self.boundary_points.len());
            let mut dy = Vec::with_capacity(self.boundary_points.len());
            for &(edge, u) in &self.boundary_points {
                let reference = lerp(REFERENCE_VERTICES[edge], REFERENCE_VERTICES[(edge + 1) % 3], u);
                let straight = affine(reference[0], reference[1]);
                let physical = match classify_edge(tri[edge], tri[(edge + 1) % 3], n) {
                    EdgeKind::Forward(k) => boundary.segments[k].point(u),
                    EdgeKind::Reversed(k) => boundary.segments[k].point(1.0 - u),
                    EdgeKind::Straight => straight,
                };
                dx.push(physical[0] - straight[0]);
                dy.push(physical[1] - straight[1]);
            }
            let warp_x = matvec(&self.warp, &dx);
            let warp_y = matvec(&self.warp, &dy);

            let nodes = &self.geometry.nodes;
            let np = nodes[0].len();
            let mut x_nodes = Mat::zeros(np, 1);
            let mut y_nodes = Mat::zeros(np, 1);
            for i in 0..np {
                let p = affine(nodes[0][i], nodes[1][i]);
                x_nodes[(i, 0)] = p[0] + warp_x[i];
                y_nodes[(i, 0)] = p[1] + warp_y[i];
            }

            let xq = matmul(&self.geometry.vq, &x_nodes);
            let yq = matmul(&self.geometry.vq, &y_nodes);
            let xr = matmul(&self.vq_dr, &x_nodes);
            let xs = matmul(&self.vq_ds, &x_nodes);
            let yr = matmul(&self.vq_dr, &y_nodes);
            let ys = matmul(&self.vq_ds, &y_nodes);

            for q in 0..self.geometry.n_quad() {
                let jac = xr[(q, 0)] * ys[(q, 0)] - xs[(q, 0)] * yr[(q, 0)];
                if jac <= 0.0 || jac.is_nan() {
                    return Err(CutCellError::InvertedSubTriangle { triangle: tri, jacobian: jac });
                }
                rule.x.push(xq[(q, 0)]);
                rule.y.push(yq[(q, 0)]);
                rule.w.push(self.geometry.quad_weights[q] * jac);
            }
        }

        Ok(rule)
    }

    /// Gauss quadrature along every boundary segment with outward normals.
    ///
    /// Tangents come from differentiating the segment sampled at GLL points.
    pub fn face_quadrature(&self, boundary: &CutBoundary) -> CutFaceQuadrature {
        let dr = &self.line.differentiation[0];
        let line_nodes = &self.line.nodes[0];
        let mut rule = CutFaceQuadrature::default();

        for segment in &boundary.segments {
            let samples: Vec<[f64; 2]> = line_nodes.iter().map(|&xi| segment.point(0.5 * (1.0 + xi))).collect();
            let sx: Vec<f64> = samples.iter().map(|p| p[0]).collect();
            let sy: Vec<f64> = samples.iter().map(|p| p[1]).collect();
            let tx = matvec(&self.face_interp, &matvec(dr, &sx));
            let ty = matvec(&self.face_interp, &matvec(dr, &sy));

            for (g, (&xi, &wg)) in self.face_nodes.iter().zip(&self.face_weights).enumerate() {
                let p = segment.point(0.5 * (1.0 + xi));
                let s_j = tx[g].hypot(ty[g]);
                rule.x.push(p[0]);
                rule.y.push(p[1]);
                rule.nx.push(ty[g] / s_j);
                rule.ny.push(-tx[g] / s_j);
                rule.w.push(wg * s_j);
            }
        }

        rule
    }
}

fn lerp(a: [f64; 2], b: [f64; 2], u: f64) -> [f64; 2] {
    [a[0] + u * (b[0] - a[0]), a[1] + u * (b[1] - a[1])]
}
