//! # dg-mesh
//!
//! Mesh data for high-order discontinuous Galerkin methods.
//!
//! This crate provides:
//! - Reference elements (Line, Tri, Quad, Hex) with nodal operators
//! - Face connectivity and node maps with tolerance-aware matching
//! - Periodic boundary identification
//! - Geometric factors and outward normals, including curved rebuilds
//! - Cut-cell meshes: curved polygon quadrature, Caratheodory pruning
//!   and state redistribution for small cells

pub mod basis;
pub mod cut;
pub mod mesh;
pub mod operators;
pub mod polynomial;
pub mod quadrature;
pub mod redistribution;
pub mod reference;

// Re-export main types for convenience
pub use basis::{PhysicalFrame, Vandermonde};
pub use cut::{
    BackgroundGrid, CellIndex, Circle, ClosedCurve, CutCellError, CutCellField, CutMesh, CutMeshConfig,
};
pub use mesh::{
    ConnectivityConfig, MeshData, MeshError, MeshTopology, NodeMaps, NodeMatching, PeriodicityConfig,
    build_node_maps, connect_mesh, make_periodic, uniform_mesh,
};
pub use operators::{FaceNormals, GeometricFactors, compute_normals, geometric_factors};
pub use quadrature::{PrunedQuadrature, PruningError, caratheodory_pruning};
pub use redistribution::{RedistributionConfig, StateRedistribution, compute_neighbor_list};
pub use reference::{ElementShape, ReferenceElement};
