//! Nodal reference elements: nodes, operators and quadrature.
//!
//! All operators are built from an orthonormal modal basis:
//!
//! - Dr = Vr V⁻¹ (and Ds, Dt)
//! - Vq = V(r_q) V⁻¹, Vf = V(r_f) V⁻¹
//! - V1 = V₁(r) V₁(r_v)⁻¹ maps vertex values to nodes with the degree-1 basis
//!
//! Face points are stored face by face: rows `f * nfp .. (f+1) * nfp` of `vf`
//! belong to local face `f`.

use super::quadrature::{hex_quadrature, line_quadrature, quad_quadrature, triangle_quadrature};
use super::shape::ElementShape;
use crate::basis::{Vandermonde, hex_basis, line_basis, quad_basis, triangle_basis};
use crate::operators::dense::right_solve;
use crate::polynomial::{gauss_legendre, gauss_lobatto_nodes};
use faer::Mat;

/// Reference element operators for one shape and polynomial degree.
#[derive(Clone)]
pub struct ReferenceElement {
    /// Element shape
    pub shape: ElementShape,
    /// Polynomial degree N
    pub order: usize,
    /// Degree of exactness of the volume quadrature
    pub quadrature_degree: usize,

    /// Interpolation node coordinates, one array per dimension
    pub nodes: Vec<Vec<f64>>,
    /// Volume quadrature points, one array per dimension
    pub quad_points: Vec<Vec<f64>>,
    /// Volume quadrature weights
    pub quad_weights: Vec<f64>,
    /// Face quadrature points (all faces), one array per dimension
    pub face_points: Vec<Vec<f64>>,
    /// Face quadrature weights on the reference face
    pub face_weights: Vec<f64>,
    /// Reference outward normals scaled by the reference face Jacobian
    /// (nrJ, nsJ, ntJ) at face points
    pub reference_normals: Vec<Vec<f64>>,

    /// Modal Vandermonde matrix at the nodes
    pub vandermonde: Mat<f64>,
    /// Nodal differentiation matrices (Dr, Ds, Dt)
    pub differentiation: Vec<Mat<f64>>,
    /// Interpolation from nodes to volume quadrature points
    pub vq: Mat<f64>,
    /// Interpolation from nodes to face points
    pub vf: Mat<f64>,
    /// Interpolation from vertices to nodes
    pub v1: Mat<f64>,
}

impl ReferenceElement {
    /// Build with the default volume quadrature degree 2N.
    pub fn new(shape: ElementShape, order: usize) -> Self {
        Self::with_quadrature_degree(shape, order, 2 * order)
    }

    /// Build with an explicit volume quadrature degree.
    pub fn with_quadrature_degree(shape: ElementShape, order: usize, quadrature_degree: usize) -> Self {
        let nodes = interpolation_nodes(shape, order);
        let (quad_points, quad_weights) = volume_quadrature(shape, quadrature_degree);
        let (face_points, face_weights, reference_normals) = face_quadrature(shape, order);

        let at_nodes = evaluate_basis(shape, order, &nodes);
        let vandermonde = at_nodes.v.clone();
        let differentiation = at_nodes
            .gradients
            .iter()
            .map(|grad| right_solve(grad, &vandermonde))
            .collect();

        let vq = right_solve(&evaluate_basis(shape, order, &quad_points).v, &vandermonde);
        let vf = right_solve(&evaluate_basis(shape, order, &face_points).v, &vandermonde);

        let vertices = shape.vertices();
        let v1 = right_solve(
            &evaluate_basis(shape, 1, &nodes).v,
            &evaluate_basis(shape, 1, &vertices).v,
        );

        Self {
            shape,
            order,
            quadrature_degree,
            nodes,
            quad_points,
            quad_weights,
            face_points,
            face_weights,
            reference_normals,
            vandermonde,
            differentiation,
            vq,
            vf,
            v1,
        }
    }

    /// Spatial dimension.
    #[inline]
    pub fn dim(&self) -> usize {
        self.shape.dim()
    }

    /// Number of interpolation nodes Np.
    #[inline]
    pub fn n_nodes(&self) -> usize {
        self.nodes[0].len()
    }

    /// Number of volume quadrature points.
    #[inline]
    pub fn n_quad(&self) -> usize {
        self.quad_weights.len()
    }

    /// Number of faces.
    #[inline]
    pub fn n_faces(&self) -> usize {
        self.shape.n_faces()
    }

    /// Number of face points per face.
    #[inline]
    pub fn n_face_points(&self) -> usize {
        self.face_weights.len() / self.n_faces()
    }

    /// Evaluate the modal basis of this element at arbitrary reference points.
    pub fn basis(&self, points: &[Vec<f64>]) -> Vandermonde {
        evaluate_basis(self.shape, self.order, points)
    }

    /// Nodal interpolation matrix onto arbitrary reference points.
    pub fn interpolation_matrix(&self, points: &[Vec<f64>]) -> Mat<f64> {
        right_solve(&self.basis(points).v, &self.vandermonde)
    }
}

fn evaluate_basis(shape: ElementShape, order: usize, points: &[Vec<f64>]) -> Vandermonde {
    match shape {
        ElementShape::Line => line_basis(order, &points[0]),
        ElementShape::Tri => triangle_basis(order, &points[0], &points[1]),
        ElementShape::Quad => quad_basis(order, &points[0], &points[1]),
        ElementShape::Hex => hex_basis(order, &points[0], &points[1], &points[2]),
    }
}

/// Equispaced nodes on the reference triangle, r fastest.
fn triangle_equispaced_nodes(order: usize) -> (Vec<f64>, Vec<f64>) {
    if order == 0 {
        return (vec![-1.0 / 3.0], vec![-1.0 / 3.0]);
    }
    let h = 2.0 / order as f64;
    let mut r = Vec::new();
    let mut s = Vec::new();
    for j in 0..=order {
        for i in 0..=(order - j) {
            r.push(-1.0 + h * i as f64);
            s.push(-1.0 + h * j as f64);
        }
    }
    (r, s)
}

fn interpolation_nodes(shape: ElementShape, order: usize) -> Vec<Vec<f64>> {
    match shape {
        ElementShape::Line => vec![gauss_lobatto_nodes(order)],
        ElementShape::Tri => {
            let (r, s) = triangle_equispaced_nodes(order);
            vec![r, s]
        }
        ElementShape::Quad | ElementShape::Hex => {
            let r1d = gauss_lobatto_nodes(order);
            tensor_points(&r1d, shape.dim())
        }
    }
}

/// Tensor grid of a 1D point set, first coordinate fastest.
fn tensor_points(x1d: &[f64], dim: usize) -> Vec<Vec<f64>> {
    let n = x1d.len();
    let total = n.pow(dim as u32);
    (0..dim)
        .map(|d| {
            let stride = n.pow(d as u32);
            (0..total).map(|p| x1d[(p / stride) % n]).collect()
        })
        .collect()
}

fn volume_quadrature(shape: ElementShape, degree: usize) -> (Vec<Vec<f64>>, Vec<f64>) {
    match shape {
        ElementShape::Line => {
            let (r, w) = line_quadrature(degree);
            (vec![r], w)
        }
        ElementShape::Tri => {
            let (r, s, w) = triangle_quadrature(degree);
            (vec![r, s], w)
        }
        ElementShape::Quad => {
            let (r, s, w) = quad_quadrature(degree);
            (vec![r, s], w)
        }
        ElementShape::Hex => {
            let (r, s, t, w) = hex_quadrature(degree);
            (vec![r, s, t], w)
        }
    }
}

type FaceRule = (Vec<Vec<f64>>, Vec<f64>, Vec<Vec<f64>>);

/// Face points, weights and scaled reference normals, face by face.
fn face_quadrature(shape: ElementShape, order: usize) -> FaceRule {
    let dim = shape.dim();
    let mut points = vec![Vec::new(); dim];
    let mut weights = Vec::new();
    let mut normals = vec![Vec::new(); dim];

    let (x1d, w1d) = gauss_legendre(order + 1);

    let mut push_face = |coords: &dyn Fn(f64, f64) -> Vec<f64>, normal: &[f64], face_rule: &[(f64, f64, f64)]| {
        for &(a, b, w) in face_rule {
            let p = coords(a, b);
            for d in 0..dim {
                points[d].push(p[d]);
                normals[d].push(normal[d]);
            }
            weights.push(w);
        }
    };

    match shape {
        ElementShape::Tri | ElementShape::Quad => {
            let rule: Vec<(f64, f64, f64)> = x1d.iter().zip(&w1d).map(|(&x, &w)| (x, 0.0, w)).collect();
            if shape == ElementShape::Tri {
                push_face(&|a, _| vec![a, -1.0], &[0.0, -1.0], &rule);
                push_face(&|a, _| vec![-a, a], &[1.0, 1.0], &rule);
                push_face(&|a, _| vec![-1.0, -a], &[-1.0, 0.0], &rule);
            } else {
                push_face(&|a, _| vec![a, -1.0], &[0.0, -1.0], &rule);
                push_face(&|a, _| vec![1.0, a], &[1.0, 0.0], &rule);
                push_face(&|a, _| vec![-a, 1.0], &[0.0, 1.0], &rule);
                push_face(&|a, _| vec![-1.0, -a], &[-1.0, 0.0], &rule);
            }
        }
        ElementShape::Hex => {
            let mut rule = Vec::new();
            for (&b, &wb) in x1d.iter().zip(&w1d) {
                for (&a, &wa) in x1d.iter().zip(&w1d) {
                    rule.push((a, b, wa * wb));
                }
            }
            push_face(&|a, b| vec![-1.0, a, b], &[-1.0, 0.0, 0.0], &rule);
            push_face(&|a, b| vec![1.0, a, b], &[1.0, 0.0, 0.0], &rule);
            push_face(&|a, b| vec![a, -1.0, b], &[0.0, -1.0, 0.0], &rule);
            push_face(&|a, b| vec![a, 1.0, b], &[0.0, 1.0, 0.0], &rule);
            push_face(&|a, b| vec![a, b, -1.0], &[0.0, 0.0, -1.0], &rule);
            push_face(&|a, b| vec![a, b, 1.0], &[0.0, 0.0, 1.0], &rule);
        }
        ElementShape::Line => {
            let point = [(0.0, 0.0, 1.0)];
            push_face(&|_, _| vec![-1.0], &[-1.0], &point);
            push_face(&|_, _| vec![1.0], &[1.0], &point);
        }
    }

    (points, weights, normals)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operators::dense::matvec;

    const SHAPES: [ElementShape; 4] = [ElementShape::Line, ElementShape::Tri, ElementShape::Quad, ElementShape::Hex];

    #[test]
    fn test_node_counts() {
        assert_eq!(ReferenceElement::new(ElementShape::Line, 3).n_nodes(), 4);
        assert_eq!(ReferenceElement::new(ElementShape::Tri, 3).n_nodes(), 10);
        assert_eq!(ReferenceElement::new(ElementShape::Quad, 3).n_nodes(), 16);
        assert_eq!(ReferenceElement::new(ElementShape::Hex, 2).n_nodes(), 27);
    }

    #[test]
    fn test_differentiation_is_exact_for_linears() {
        for shape in SHAPES {
            let rd = ReferenceElement::new(shape, 2);
            for (d, dmat) in rd.differentiation.iter().enumerate() {
                for (e, coord) in rd.nodes.iter().enumerate() {
                    let derivative = matvec(dmat, coord);
                    let expected = if d == e { 1.0 } else { 0.0 };
                    for value in derivative {
                        assert!(
                            (value - expected).abs() < 1e-12,
                            "{:?}: d{}/dr{} = {}",
                            shape,
                            e,
                            d,
                            value
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn test_high_order_operators_are_exact() {
        // u = r^N + s^(N-1) lies in every space of degree N
        for order in [3, 4] {
            for shape in SHAPES {
                let rd = ReferenceElement::new(shape, order);
                let n = order as i32;
                let field = |p: &[Vec<f64>], i: usize| {
                    p[0][i].powi(n) + if p.len() > 1 { p[1][i].powi(n - 1) } else { 0.0 }
                };
                let u: Vec<f64> = (0..rd.n_nodes()).map(|i| field(&rd.nodes[..], i)).collect();

                for (d, dmat) in rd.differentiation.iter().enumerate() {
                    let du = matvec(dmat, &u);
                    for (i, value) in du.iter().enumerate() {
                        let expected = match d {
                            0 => n as f64 * rd.nodes[0][i].powi(n - 1),
                            1 => (n - 1) as f64 * rd.nodes[1][i].powi(n - 2),
                            _ => 0.0,
                        };
                        assert!(
                            (value - expected).abs() < 1e-9,
                            "{:?} N={}: D{} at node {} gives {} instead of {}",
                            shape,
                            order,
                            d,
                            i,
                            value,
                            expected
                        );
                    }
                }

                let uq = matvec(&rd.vq, &u);
                for (q, value) in uq.iter().enumerate() {
                    let expected = field(&rd.quad_points[..], q);
                    assert!((value - expected).abs() < 1e-10, "{:?} N={}: Vq mismatch", shape, order);
                }
                let uf = matvec(&rd.vf, &u);
                for (q, value) in uf.iter().enumerate() {
                    let expected = field(&rd.face_points[..], q);
                    assert!((value - expected).abs() < 1e-10, "{:?} N={}: Vf mismatch", shape, order);
                }
            }
        }
    }

    #[test]
    fn test_vertex_map_reproduces_nodes() {
        for shape in SHAPES {
            let rd = ReferenceElement::new(shape, 3);
            let vertices = shape.vertices();
            for d in 0..rd.dim() {
                let mapped = matvec(&rd.v1, &vertices[d]);
                for (a, b) in mapped.iter().zip(&rd.nodes[d]) {
                    assert!((a - b).abs() < 1e-12, "{:?}: V1 mismatch", shape);
                }
            }
        }
    }

    #[test]
    fn test_face_weights_measure_faces() {
        // sum of |n_ref J_f| w_f is the reference perimeter / surface area
        let expected = [
            (ElementShape::Tri, 4.0 + 2.0 * 2f64.sqrt()),
            (ElementShape::Quad, 8.0),
            (ElementShape::Hex, 24.0),
        ];
        for (shape, area) in expected {
            let rd = ReferenceElement::new(shape, 2);
            let total: f64 = (0..rd.face_weights.len())
                .map(|i| {
                    let norm: f64 = rd.reference_normals.iter().map(|n| n[i] * n[i]).sum::<f64>().sqrt();
                    norm * rd.face_weights[i]
                })
                .sum();
            assert!((total - area).abs() < 1e-12, "{:?}: surface {}", shape, total);
        }
    }

    #[test]
    fn test_face_points_lie_on_face_vertices() {
        let rd = ReferenceElement::new(ElementShape::Tri, 2);
        let nfp = rd.n_face_points();
        // hypotenuse: r + s = 0
        for i in nfp..2 * nfp {
            assert!((rd.face_points[0][i] + rd.face_points[1][i]).abs() < 1e-14);
        }
    }
}
