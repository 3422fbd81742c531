//! One-dimensional nodes and quadrature rules.
//!
//! - Gauss-Lobatto-Legendre (GLL): roots of (1-x²)P'_N(x), endpoints included.
//!   Used as interpolation nodes on lines, quads and hexes.
//! - Gauss-Legendre (GL): roots of P_n(x), exact for degree 2n-1.
//!   Used for volume and face quadrature.

use super::legendre::{legendre, legendre_and_derivative};
use std::f64::consts::PI;

/// Compute Gauss-Lobatto-Legendre nodes for polynomial order N.
///
/// Returns N+1 nodes in [-1, 1], including the endpoints.
/// Uses Newton iteration starting from Chebyshev-Lobatto nodes.
pub fn gauss_lobatto_nodes(order: usize) -> Vec<f64> {
    let n = order;

    if n == 0 {
        return vec![0.0];
    }
    if n == 1 {
        return vec![-1.0, 1.0];
    }

    let mut nodes: Vec<f64> = (0..=n)
        .map(|j| -(PI * j as f64 / n as f64).cos())
        .collect();
    nodes[0] = -1.0;
    nodes[n] = 1.0;

    // For L(x) = (1-x²)P'_N(x) the identity L'(x) = -N(N+1)P_N(x) gives
    // the Newton update x += (1-x²)P'_N / (N(N+1)P_N).
    for node in nodes.iter_mut().take(n).skip(1) {
        let mut x = *node;
        for _ in 0..100 {
            let (p_n, dp_n) = legendre_and_derivative(n, x);
            let update = (1.0 - x * x) * dp_n / (n as f64 * (n + 1) as f64 * p_n);
            x += update;
            if update.abs() < 1e-15 {
                break;
            }
        }
        *node = x;
    }

    nodes
}

/// Compute Gauss-Lobatto-Legendre weights: w_j = 2 / (N(N+1) [P_N(x_j)]²).
pub fn gauss_lobatto_weights(order: usize, nodes: &[f64]) -> Vec<f64> {
    let n = order;
    if n == 0 {
        return vec![2.0];
    }

    let denom = (n * (n + 1)) as f64;
    nodes
        .iter()
        .map(|&x| {
            let p_n = legendre(n, x);
            2.0 / (denom * p_n * p_n)
        })
        .collect()
}

/// Gauss-Legendre rule with `n_points` nodes, returned as `(nodes, weights)`.
///
/// Nodes are sorted ascending. Exact for polynomials of degree `2 n_points - 1`.
pub fn gauss_legendre(n_points: usize) -> (Vec<f64>, Vec<f64>) {
    assert!(n_points > 0, "Gauss-Legendre rule needs at least one point");
    let n = n_points;
    let mut nodes = vec![0.0; n];
    let mut weights = vec![0.0; n];

    for i in 0..n {
        // Chebyshev-like initial guess for the i-th root, descending order
        let mut x = (PI * (i as f64 + 0.75) / (n as f64 + 0.5)).cos();
        for _ in 0..100 {
            let (p, dp) = legendre_and_derivative(n, x);
            let update = p / dp;
            x -= update;
            if update.abs() < 1e-15 {
                break;
            }
        }
        let (_, dp) = legendre_and_derivative(n, x);
        nodes[n - 1 - i] = x;
        weights[n - 1 - i] = 2.0 / ((1.0 - x * x) * dp * dp);
    }

    (nodes, weights)
}

/// Number of Gauss-Legendre points needed to integrate degree `degree` exactly.
#[inline]
pub fn gauss_points_for_degree(degree: usize) -> usize {
    degree / 2 + 1
}

#[cfg(test)]
mod tests {
    use super::*;

    fn monomial_integral(k: usize) -> f64 {
        if k % 2 == 0 { 2.0 / (k + 1) as f64 } else { 0.0 }
    }

    #[test]
    fn test_gll_endpoints_and_symmetry() {
        for order in 1..=6 {
            let nodes = gauss_lobatto_nodes(order);
            assert_eq!(nodes.len(), order + 1);
            assert!((nodes[0] + 1.0).abs() < 1e-14);
            assert!((nodes[order] - 1.0).abs() < 1e-14);
            for i in 0..nodes.len() / 2 {
                assert!((nodes[i] + nodes[order - i]).abs() < 1e-14);
            }
        }
    }

    #[test]
    fn test_gll_exactness() {
        // GLL with N+1 points is exact up to degree 2N-1
        for order in 1..=5 {
            let nodes = gauss_lobatto_nodes(order);
            let weights = gauss_lobatto_weights(order, &nodes);
            for k in 0..=(2 * order - 1) {
                let numerical: f64 = nodes
                    .iter()
                    .zip(&weights)
                    .map(|(&x, &w)| w * x.powi(k as i32))
                    .sum();
                assert!(
                    (numerical - monomial_integral(k)).abs() < 1e-12,
                    "Order {}, degree {}: got {}",
                    order,
                    k,
                    numerical
                );
            }
        }
    }

    #[test]
    fn test_gauss_legendre_exactness() {
        for n in 1..=8 {
            let (nodes, weights) = gauss_legendre(n);
            assert!(nodes.windows(2).all(|w| w[0] < w[1]), "nodes must ascend");
            for k in 0..=(2 * n - 1) {
                let numerical: f64 = nodes
                    .iter()
                    .zip(&weights)
                    .map(|(&x, &w)| w * x.powi(k as i32))
                    .sum();
                assert!(
                    (numerical - monomial_integral(k)).abs() < 1e-13,
                    "n={}, degree {}: got {}",
                    n,
                    k,
                    numerical
                );
            }
        }
    }

    #[test]
    fn test_points_for_degree() {
        for degree in 0..12 {
            let n = gauss_points_for_degree(degree);
            assert!(2 * n - 1 >= degree);
        }
    }
}
