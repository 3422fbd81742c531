//! Orthonormal Legendre basis on the reference interval [-1, 1].

use super::Vandermonde;
use crate::polynomial::legendre_normalized;
use faer::Mat;

/// Evaluate φ_j(r) = √((2j+1)/2) P_j(r), j = 0..=order, at the given points.
///
/// This normalization ensures ∫ φ_i φ_j dr = δ_{ij}.
pub fn line_basis(order: usize, r: &[f64]) -> Vandermonde {
    let n_modes = order + 1;
    let mut v = Mat::zeros(r.len(), n_modes);
    let mut vr = Mat::zeros(r.len(), n_modes);

    for (i, &x) in r.iter().enumerate() {
        for j in 0..n_modes {
            let (p, dp) = legendre_normalized(j, x);
            v[(i, j)] = p;
            vr[(i, j)] = dp;
        }
    }

    Vandermonde {
        v,
        gradients: vec![vr],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operators::dense::{invert, matmul};
    use crate::polynomial::gauss_lobatto_nodes;

    #[test]
    fn test_vandermonde_invertibility() {
        for order in 1..=5 {
            let nodes = gauss_lobatto_nodes(order);
            let vdm = line_basis(order, &nodes);
            let product = matmul(&vdm.v, &invert(&vdm.v));
            for i in 0..=order {
                for j in 0..=order {
                    let expected = if i == j { 1.0 } else { 0.0 };
                    assert!(
                        (product[(i, j)] - expected).abs() < 1e-12,
                        "V * V^{{-1}} should be identity for order {}",
                        order
                    );
                }
            }
        }
    }
}
