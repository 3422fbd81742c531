//! Dense operator helpers and the geometric factor engine.
//!
//! - [`dense`]: small matrix products and LU-based solves on `faer::Mat`
//! - [`geometric_factors`] / [`compute_normals`]: Jacobian-scaled metric
//!   terms and outward normals for mapped elements

pub mod dense;
mod geometric;

pub use geometric::{FaceNormals, GeometricFactors, compute_normals, geometric_factors};
