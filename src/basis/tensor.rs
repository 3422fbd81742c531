//! Tensor-product Legendre bases for quadrilaterals and hexahedra.
//!
//! φ_{ij}(r, s) = φ_i(r) φ_j(s) with φ_k the orthonormal 1D Legendre
//! polynomials. Mode index: m = i + (N+1) j (+ (N+1)² k in 3D), so the
//! r-degree varies fastest, matching the node ordering.

use super::Vandermonde;
use crate::polynomial::legendre_normalized;
use faer::Mat;

/// Evaluate the (N+1)^dim tensor basis at points given per coordinate.
fn tensor_basis(order: usize, coords: &[&[f64]]) -> Vandermonde {
    let dim = coords.len();
    let n_points = coords[0].len();
    assert!(
        coords.iter().all(|c| c.len() == n_points),
        "coordinate arrays must have equal length"
    );

    let n_1d = order + 1;
    let n_modes = n_1d.pow(dim as u32);
    let mut v = Mat::zeros(n_points, n_modes);
    let mut gradients = vec![Mat::zeros(n_points, n_modes); dim];

    for p in 0..n_points {
        // 1D values and derivatives per direction
        let factors: Vec<Vec<(f64, f64)>> = coords
            .iter()
            .map(|c| (0..n_1d).map(|k| legendre_normalized(k, c[p])).collect())
            .collect();

        for m in 0..n_modes {
            let mut degrees = [0usize; 3];
            let mut rest = m;
            for degree in degrees.iter_mut().take(dim) {
                *degree = rest % n_1d;
                rest /= n_1d;
            }

            let value: f64 = (0..dim).map(|d| factors[d][degrees[d]].0).product();
            v[(p, m)] = value;
            for (d, grad) in gradients.iter_mut().enumerate() {
                grad[(p, m)] = (0..dim)
                    .map(|e| {
                        let (f, df) = factors[e][degrees[e]];
                        if e == d { df } else { f }
                    })
                    .product();
            }
        }
    }

    Vandermonde { v, gradients }
}

/// Evaluate the (N+1)² tensor Legendre basis on the reference square.
pub fn quad_basis(order: usize, r: &[f64], s: &[f64]) -> Vandermonde {
    tensor_basis(order, &[r, s])
}

/// Evaluate the (N+1)³ tensor Legendre basis on the reference cube.
pub fn hex_basis(order: usize, r: &[f64], s: &[f64], t: &[f64]) -> Vandermonde {
    tensor_basis(order, &[r, s, t])
}
