//! Volume quadrature rules on reference elements.
//!
//! All rules are built from 1D Gauss-Legendre points. The triangle rule
//! uses the collapsed (Duffy) map r = (1+a)(1-b)/2 - 1, s = b, whose
//! Jacobian (1-b)/2 raises the b-degree by one.

use crate::polynomial::{gauss_legendre, gauss_points_for_degree};

/// Gauss-Legendre rule on [-1, 1] exact for the given degree.
pub fn line_quadrature(degree: usize) -> (Vec<f64>, Vec<f64>) {
    gauss_legendre(gauss_points_for_degree(degree))
}

/// Collapsed Gauss rule on the reference triangle, exact for the given degree.
pub fn triangle_quadrature(degree: usize) -> (Vec<f64>, Vec<f64>, Vec<f64>) {
    let (x1d, w1d) = gauss_legendre(gauss_points_for_degree(degree + 1));
    let n = x1d.len();
    let mut r = Vec::with_capacity(n * n);
    let mut s = Vec::with_capacity(n * n);
    let mut w = Vec::with_capacity(n * n);

    for (&b, &wb) in x1d.iter().zip(&w1d) {
        for (&a, &wa) in x1d.iter().zip(&w1d) {
            r.push(0.5 * (1.0 + a) * (1.0 - b) - 1.0);
            s.push(b);
            w.push(wa * wb * 0.5 * (1.0 - b));
        }
    }

    (r, s, w)
}

/// Tensor Gauss rule on the reference square (r varies fastest).
pub fn quad_quadrature(degree: usize) -> (Vec<f64>, Vec<f64>, Vec<f64>) {
    let (x1d, w1d) = line_quadrature(degree);
    let mut r = Vec::new();
    let mut s = Vec::new();
    let mut w = Vec::new();
    for (&sj, &wj) in x1d.iter().zip(&w1d) {
        for (&ri, &wi) in x1d.iter().zip(&w1d) {
            r.push(ri);
            s.push(sj);
            w.push(wi * wj);
        }
    }
    (r, s, w)
}

/// Tensor Gauss rule on the reference cube (r fastest, t slowest).
pub fn hex_quadrature(degree: usize) -> (Vec<f64>, Vec<f64>, Vec<f64>, Vec<f64>) {
    let (x1d, w1d) = line_quadrature(degree);
    let mut r = Vec::new();
    let mut s = Vec::new();
    let mut t = Vec::new();
    let mut w = Vec::new();
    for (&tk, &wk) in x1d.iter().zip(&w1d) {
        for (&sj, &wj) in x1d.iter().zip(&w1d) {
            for (&ri, &wi) in x1d.iter().zip(&w1d) {
                r.push(ri);
                s.push(sj);
                t.push(tk);
                w.push(wi * wj * wk);
            }
        }
    }
    (r, s, t, w)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// ∫ r^i s^j over the reference triangle, by direct 1D integration in s.
    fn triangle_monomial(i: i32, j: i32) -> f64 {
        // inner ∫_{-1}^{-s} r^i dr, then a 40-point Gauss rule in s (exact here)
        let (xs, ws) = gauss_legendre(40);
        xs.iter()
            .zip(&ws)
            .map(|(&s, &w)| {
                let upper = -s;
                let inner = (upper.powi(i + 1) - (-1.0f64).powi(i + 1)) / (i + 1) as f64;
                w * inner * s.powi(j)
            })
            .sum()
    }

    #[test]
    fn test_triangle_area_and_exactness() {
        for degree in [2, 5, 6, 10] {
            let (r, s, w) = triangle_quadrature(degree);
            let area: f64 = w.iter().sum();
            assert!((area - 2.0).abs() < 1e-14, "area = {area}");
            for i in 0..=degree as i32 {
                for j in 0..=(degree as i32 - i) {
                    let numerical: f64 = r
                        .iter()
                        .zip(&s)
                        .zip(&w)
                        .map(|((&r, &s), &w)| w * r.powi(i) * s.powi(j))
                        .sum();
                    let exact = triangle_monomial(i, j);
                    assert!(
                        (numerical - exact).abs() < 1e-12,
                        "degree {degree}: r^{i} s^{j} gave {numerical}, expected {exact}"
                    );
                }
            }
        }
    }

    #[test]
    fn test_tensor_rules_integrate_volume() {
        let (_, _, w) = quad_quadrature(4);
        assert!((w.iter().sum::<f64>() - 4.0).abs() < 1e-14);
        let (_, _, _, w) = hex_quadrature(4);
        assert!((w.iter().sum::<f64>() - 8.0).abs() < 1e-13);
    }
}
