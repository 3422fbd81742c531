//! Mesh connectivity, periodicity and physical mesh data.
//!
//! - [`connect_mesh`] / [`build_node_maps`]: face and face-node matching
//! - [`make_periodic`]: periodic pairing of boundary faces
//! - [`MeshData`]: node coordinates, metric terms and normals over a
//!   shared [`MeshTopology`]
//! - [`uniform_mesh`]: structured meshes of the bi-unit box

mod connectivity;
mod error;
mod generators;
mod mesh_data;
mod periodicity;

pub use connectivity::{ConnectivityConfig, NodeMaps, NodeMatching, build_node_maps, connect_mesh};
pub use error::MeshError;
pub use generators::{VertexMesh, uniform_mesh};
pub use mesh_data::{MeshData, MeshTopology};
pub use periodicity::{PeriodicityConfig, make_periodic};
