//! Errors raised while building cut meshes and redistribution operators.

use crate::mesh::MeshError;
use crate::quadrature::PruningError;
use thiserror::Error;

/// Error type for cut-cell construction.
#[derive(Debug, Error)]
pub enum CutCellError {
    /// The curve crosses a background cell in an unsupported way.
    #[error("Unsupported cut in background cell ({i}, {j}): {reason}")]
    UnsupportedCut { i: usize, j: usize, reason: String },

    /// The cut cell polygon could not be triangulated.
    #[error("Triangulation failed: {0}")]
    Triangulation(String),

    /// A warped sub-triangle folds over itself.
    #[error("Curved sub-triangle {triangle:?} has non-positive Jacobian {jacobian:e}")]
    InvertedSubTriangle { triangle: [usize; 3], jacobian: f64 },

    /// Invalid construction parameters.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The merged mass matrix of a neighborhood is singular.
    #[error("Singular projection for the neighborhood of cut cell {cell}")]
    SingularProjection { cell: usize },

    /// Error from the Cartesian mesh.
    #[error(transparent)]
    Mesh(#[from] MeshError),

    /// Error from quadrature pruning.
    #[error(transparent)]
    Pruning(#[from] PruningError),
}

impl CutCellError {
    /// Create an unsupported cut error.
    pub fn unsupported(i: usize, j: usize, reason: impl Into<String>) -> Self {
        Self::UnsupportedCut {
            i,
            j,
            reason: reason.into(),
        }
    }
}
