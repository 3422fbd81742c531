//! Cut-cell meshes: Cartesian background grids clipped by embedded curves.
//!
//! - [`curve`]: closed curves and piecewise cut cell boundaries
//! - [`index`]: tagged cell indices
//! - [`quadrature`]: volume and boundary quadrature on curved polygons
//! - [`triangulate`]: polygon triangulation
//! - [`mesh`]: classification and per-cell operators

pub mod curve;
mod error;
pub mod index;
pub mod mesh;
pub mod quadrature;
pub mod triangulate;

pub use curve::{BoundarySegment, Circle, ClosedCurve, CutBoundary};
pub use error::CutCellError;
pub use index::{CartesianIndex, CellIndex, CellIndexMap, CellKind, CutIndex};
pub use mesh::{BackgroundGrid, CutCell, CutCellField, CutMesh, CutMeshConfig};
pub use quadrature::{CutCellQuadrature, CutCellQuadratureBuilder, CutFaceQuadrature};
pub use triangulate::{EarcutTriangulator, PlanarTriangulator};
