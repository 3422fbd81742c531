//! Polynomial evaluation and node generation.
//!
//! This module provides:
//! - 1D Legendre polynomials (plain and orthonormal) and their derivatives
//! - Orthonormal Jacobi polynomials for simplex bases
//! - Gauss-Lobatto-Legendre nodes/weights and Gauss-Legendre rules

mod jacobi;
mod legendre;
mod nodes;

pub use jacobi::{jacobi_normalized, jacobi_normalized_derivative};
pub use legendre::{legendre, legendre_and_derivative, legendre_normalized};
pub use nodes::{gauss_legendre, gauss_lobatto_nodes, gauss_lobatto_weights, gauss_points_for_degree};
