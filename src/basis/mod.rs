//! Orthonormal polynomial bases and their Vandermonde matrices.
//!
//! Every basis is evaluated into a [`Vandermonde`]: V[i,m] = φ_m(x_i) and one
//! gradient matrix per coordinate direction. Nodal operators are built from
//! these by right-division with the Vandermonde matrix at the nodes.

mod line;
mod physical_frame;
mod tensor;
mod triangle;

pub use line::line_basis;
pub use physical_frame::PhysicalFrame;
pub use tensor::{hex_basis, quad_basis};
pub use triangle::{triangle_basis, triangle_mode_count};

use faer::Mat;

/// Basis values and gradients at a set of points.
#[derive(Clone)]
pub struct Vandermonde {
    /// V[i, m] = φ_m(x_i)
    /// Shape: (n_points, n_modes)
    pub v: Mat<f64>,

    /// gradients[d][(i, m)] = ∂φ_m/∂x_d (x_i)
    pub gradients: Vec<Mat<f64>>,
}

impl Vandermonde {
    /// Number of evaluation points.
    #[inline]
    pub fn n_points(&self) -> usize {
        self.v.nrows()
    }

    /// Number of basis functions.
    #[inline]
    pub fn n_modes(&self) -> usize {
        self.v.ncols()
    }
}
