//! Total-degree polynomial basis defined directly in physical coordinates.
//!
//! Cut cells have no reference element, so their approximation space is
//! spanned by Legendre products on the cell's bounding box:
//!
//! φ_{ij}(x, y) = φ_i(x̂) φ_j(ŷ),  i + j ≤ N,
//! x̂ = (x - x_c) / h_x,  ŷ = (y - y_c) / h_y
//!
//! where (x_c, y_c) is the box center and (h_x, h_y) its half-widths.

use super::{Vandermonde, triangle_mode_count};
use crate::polynomial::legendre_normalized;
use faer::Mat;

/// Physical-frame basis of total degree `order` on an axis-aligned box.
#[derive(Clone, Debug)]
pub struct PhysicalFrame {
    /// Total polynomial degree
    pub order: usize,
    /// Box center (x_c, y_c)
    pub center: [f64; 2],
    /// Box half-widths (h_x, h_y)
    pub half_widths: [f64; 2],
}

impl PhysicalFrame {
    /// Fit the frame to the bounding box of the given points.
    pub fn fit(order: usize, x: &[f64], y: &[f64]) -> Self {
        let (x_min, x_max) = bounds(x);
        let (y_min, y_max) = bounds(y);
        // degenerate boxes fall back to unit scaling
        let half = |lo: f64, hi: f64| {
            let h = 0.5 * (hi - lo);
            if h > 0.0 { h } else { 1.0 }
        };
        Self {
            order,
            center: [0.5 * (x_min + x_max), 0.5 * (y_min + y_max)],
            half_widths: [half(x_min, x_max), half(y_min, y_max)],
        }
    }

    /// Number of basis functions, (N+1)(N+2)/2.
    #[inline]
    pub fn n_modes(&self) -> usize {
        triangle_mode_count(self.order)
    }

    /// Evaluate basis values and physical gradients (∂/∂x, ∂/∂y).
    pub fn vandermonde(&self, x: &[f64], y: &[f64]) -> Vandermonde {
        assert_eq!(x.len(), y.len(), "x and y must have the same length");
        let n_modes = self.n_modes();
        let mut v = Mat::zeros(x.len(), n_modes);
        let mut vx = Mat::zeros(x.len(), n_modes);
        let mut vy = Mat::zeros(x.len(), n_modes);

        for (k, (&xk, &yk)) in x.iter().zip(y).enumerate() {
            let xh = (xk - self.center[0]) / self.half_widths[0];
            let yh = (yk - self.center[1]) / self.half_widths[1];
            let mut m = 0;
            for i in 0..=self.order {
                let (px, dpx) = legendre_normalized(i, xh);
                for j in 0..=(self.order - i) {
                    let (py, dpy) = legendre_normalized(j, yh);
                    v[(k, m)] = px * py;
                    vx[(k, m)] = dpx * py / self.half_widths[0];
                    vy[(k, m)] = px * dpy / self.half_widths[1];
                    m += 1;
                }
            }
        }

        Vandermonde {
            v,
            gradients: vec![vx, vy],
        }
    }
}

fn bounds(values: &[f64]) -> (f64, f64) {
    values
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)))
}
