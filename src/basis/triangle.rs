//! Orthonormal Dubiner basis on the reference triangle.
//!
//! Reference triangle vertices: (-1,-1), (1,-1), (-1,1).
//! With collapsed coordinates a = 2(1+r)/(1-s) - 1, b = s:
//!
//! ψ_{ij}(r, s) = √2 P_i^{(0,0)}(a) P_j^{(2i+1,0)}(b) (1-b)^i,  i + j ≤ N
//!
//! where P are orthonormal Jacobi polynomials.

use super::Vandermonde;
use crate::polynomial::{jacobi_normalized, jacobi_normalized_derivative};
use faer::Mat;

/// Dimension of the total-degree-N polynomial space in 2D.
#[inline]
pub fn triangle_mode_count(order: usize) -> usize {
    (order + 1) * (order + 2) / 2
}

fn collapsed_coordinates(r: f64, s: f64) -> (f64, f64) {
    let a = if (1.0 - s).abs() > 1e-12 {
        2.0 * (1.0 + r) / (1.0 - s) - 1.0
    } else {
        -1.0
    };
    (a, s)
}

/// Value and (r, s)-gradient of ψ_{ij} at one point.
fn dubiner_mode(i: usize, j: usize, r: f64, s: f64) -> (f64, f64, f64) {
    let (a, b) = collapsed_coordinates(r, s);
    let alpha = 2 * i as u32 + 1;

    let fa = jacobi_normalized(i, 0, 0, a);
    let dfa = jacobi_normalized_derivative(i, 0, 0, a);
    let gb = jacobi_normalized(j, alpha, 0, b);
    let dgb = jacobi_normalized_derivative(j, alpha, 0, b);

    let half_one_minus_b = 0.5 * (1.0 - b);
    let value = std::f64::consts::SQRT_2 * fa * gb * (1.0 - b).powi(i as i32);

    // Chain rule through the collapsed map (Hesthaven & Warburton, GradSimplex2DP)
    let mut dr = dfa * gb;
    if i > 0 {
        dr *= half_one_minus_b.powi(i as i32 - 1);
    }

    let mut ds = dfa * (gb * (0.5 * (1.0 + a)));
    if i > 0 {
        ds *= half_one_minus_b.powi(i as i32 - 1);
    }
    let mut tmp = dgb * half_one_minus_b.powi(i as i32);
    if i > 0 {
        tmp -= 0.5 * i as f64 * gb * half_one_minus_b.powi(i as i32 - 1);
    }
    ds += fa * tmp;

    let scale = 2f64.powf(i as f64 + 0.5);
    (value, scale * dr, scale * ds)
}

/// Evaluate the degree-`order` Dubiner basis at points (r, s).
///
/// Modes are ordered by i, then j, with i + j ≤ order.
pub fn triangle_basis(order: usize, r: &[f64], s: &[f64]) -> Vandermonde {
    assert_eq!(r.len(), s.len(), "r and s must have the same length");
    let n_modes = triangle_mode_count(order);
    let mut v = Mat::zeros(r.len(), n_modes);
    let mut vr = Mat::zeros(r.len(), n_modes);
    let mut vs = Mat::zeros(r.len(), n_modes);

    for (k, (&rk, &sk)) in r.iter().zip(s).enumerate() {
        let mut m = 0;
        for i in 0..=order {
            for j in 0..=(order - i) {
                let (p, dp_dr, dp_ds) = dubiner_mode(i, j, rk, sk);
                v[(k, m)] = p;
                vr[(k, m)] = dp_dr;
                vs[(k, m)] = dp_ds;
                m += 1;
            }
        }
    }

    Vandermonde {
        v,
        gradients: vec![vr, vs],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operators::dense::weighted_gram;
    use crate::reference::triangle_quadrature;

    #[test]
    fn test_mode_count() {
        assert_eq!(triangle_mode_count(0), 1);
        assert_eq!(triangle_mode_count(3), 10);
    }

    #[test]
    fn test_orthonormal_under_exact_quadrature() {
        let order = 3;
        let (rq, sq, wq) = triangle_quadrature(2 * order);
        let vdm = triangle_basis(order, &rq, &sq);
        let mass = weighted_gram(&vdm.v, &wq, &vdm.v);
        for i in 0..mass.nrows() {
            for j in 0..mass.ncols() {
                let expected = if i == j { 1.0 } else { 0.0 };
                assert!(
                    (mass[(i, j)] - expected).abs() < 1e-12,
                    "M[{},{}] = {}",
                    i,
                    j,
                    mass[(i, j)]
                );
            }
        }
    }

    #[test]
    fn test_gradients_match_finite_differences() {
        let h = 1e-6;
        let (r, s) = (-0.3, -0.2);
        let vdm = triangle_basis(3, &[r], &[s]);
        let plus_r = triangle_basis(3, &[r + h], &[s]);
        let minus_r = triangle_basis(3, &[r - h], &[s]);
        let plus_s = triangle_basis(3, &[r], &[s + h]);
        let minus_s = triangle_basis(3, &[r], &[s - h]);
        for m in 0..vdm.n_modes() {
            let fd_r = (plus_r.v[(0, m)] - minus_r.v[(0, m)]) / (2.0 * h);
            let fd_s = (plus_s.v[(0, m)] - minus_s.v[(0, m)]) / (2.0 * h);
            assert!((vdm.gradients[0][(0, m)] - fd_r).abs() < 1e-6, "mode {m} d/dr");
            assert!((vdm.gradients[1][(0, m)] - fd_s).abs() < 1e-6, "mode {m} d/ds");
        }
    }
}
