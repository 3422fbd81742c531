//! Errors raised while building mesh connectivity and geometry.

use thiserror::Error;

/// Error type for mesh construction.
#[derive(Debug, Error)]
pub enum MeshError {
    /// Malformed element-to-vertex table or face incidence.
    #[error("Invalid topology: {0}")]
    InvalidTopology(String),

    /// Boundary face centroids do not span the domain along a periodic axis.
    #[error(
        "Periodicity mismatch along axis {axis}: boundary centroids span {centroid_extent}, face nodes span {domain_extent}"
    )]
    PeriodicityMismatch {
        axis: usize,
        centroid_extent: f64,
        domain_extent: f64,
    },

    /// A face node on a matched face has no coincident partner.
    #[error("Face node {node} of face {face} on element {element} has no coincident node on the matched face")]
    UnmatchedFaceNode { element: usize, face: usize, node: usize },

    /// Array shapes disagree with the reference element or each other.
    #[error("Dimension mismatch: {0}")]
    DimensionMismatch(String),
}

impl MeshError {
    /// Create an invalid topology error.
    pub fn topology(msg: impl Into<String>) -> Self {
        Self::InvalidTopology(msg.into())
    }

    /// Create a dimension mismatch error.
    pub fn dimension(msg: impl Into<String>) -> Self {
        Self::DimensionMismatch(msg.into())
    }
}
