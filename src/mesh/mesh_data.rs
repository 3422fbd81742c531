//! Physical mesh data for high-order DG elements.
//!
//! [`MeshData`] combines topology (vertices, EToV, FToF, node maps) with
//! geometry (node coordinates, metric terms, normals, weighted Jacobians).
//! Topology lives in an [`Arc<MeshTopology>`] so that a curved mesh built
//! with [`MeshData::curved`] shares it with the original record.

use std::sync::Arc;

use super::connectivity::{ConnectivityConfig, NodeMaps, build_node_maps, connect_mesh};
use super::periodicity::{PeriodicityConfig, make_periodic};
use super::MeshError;
use crate::operators::dense::matmul;
use crate::operators::{FaceNormals, GeometricFactors, compute_normals, geometric_factors};
use crate::reference::{ElementShape, ReferenceElement};
use faer::Mat;

/// Mesh topology shared between geometric variants of the same mesh.
#[derive(Clone, Debug)]
pub struct MeshTopology {
    /// Vertex coordinates per axis (VX, VY, VZ)
    pub vertices: Vec<Vec<f64>>,
    /// Element-to-vertex table
    pub etov: Vec<Vec<usize>>,
    /// Face-to-face table, f = local_face + n_faces * element
    pub ftof: Vec<usize>,
    /// Face node connectivity
    pub node_maps: NodeMaps,
    /// Periodicity flag per axis
    pub is_periodic: Vec<bool>,
}

/// Geometry and connectivity of a mesh of one element shape.
///
/// All nodal arrays have one column per element.
#[derive(Clone)]
pub struct MeshData {
    /// Element shape
    pub shape: ElementShape,
    /// Shared topology
    pub topology: Arc<MeshTopology>,

    /// Volume node coordinates per axis, shape (Np, K)
    pub x: Vec<Mat<f64>>,
    /// Quadrature point coordinates per axis, shape (Nq, K)
    pub xq: Vec<Mat<f64>>,
    /// Face point coordinates per axis, shape (n_faces * nfp, K)
    pub xf: Vec<Mat<f64>>,
    /// Quadrature weights times J, shape (Nq, K)
    pub wjq: Mat<f64>,

    /// Scaled metric terms and J at volume nodes
    pub geometry: GeometricFactors,
    /// Scaled and unit outward normals, face Jacobians
    pub normals: FaceNormals,
}

impl MeshData {
    /// Build mesh data from vertices and an element-to-vertex table.
    ///
    /// # Errors
    /// [`MeshError::DimensionMismatch`] if the vertex arrays do not match the
    /// reference element dimension, plus any error from
    /// [`connect_mesh`] and [`build_node_maps`].
    pub fn new(
        rd: &ReferenceElement,
        vertices: Vec<Vec<f64>>,
        etov: Vec<Vec<usize>>,
        config: &ConnectivityConfig,
    ) -> Result<Self, MeshError> {
        let dim = rd.dim();
        if vertices.len() != dim {
            return Err(MeshError::dimension(format!(
                "{} vertex coordinate arrays for a {}D element",
                vertices.len(),
                dim
            )));
        }
        let n_vertices = vertices[0].len();
        if vertices.iter().any(|v| v.len() != n_vertices) {
            return Err(MeshError::dimension("vertex coordinate arrays differ in length"));
        }

        let ftof = connect_mesh(&etov, &rd.shape.face_vertices(), n_vertices)?;

        let k = etov.len();
        let x: Vec<Mat<f64>> = vertices
            .iter()
            .map(|v| {
                let at_vertices = Mat::from_fn(rd.shape.n_vertices(), k, |i, e| v[etov[e][i]]);
                matmul(&rd.v1, &at_vertices)
            })
            .collect();

        let (xq, xf, wjq, geometry, normals) = derived_geometry(rd, &x)?;
        let node_maps = build_node_maps(&ftof, &xf, rd.n_faces(), config)?;

        log::debug!(
            "MeshData: {:?} N={}, {} elements, {} boundary face nodes",
            rd.shape,
            rd.order,
            k,
            node_maps.map_b.len()
        );

        Ok(Self {
            shape: rd.shape,
            topology: Arc::new(MeshTopology {
                vertices,
                etov,
                ftof,
                node_maps,
                is_periodic: vec![false; dim],
            }),
            x,
            xq,
            xf,
            wjq,
            geometry,
            normals,
        })
    }

    /// Connect opposite boundary faces along the flagged axes.
    ///
    /// Consumes the mesh and returns a new record with updated FToF and
    /// node maps; geometry is unchanged.
    pub fn make_periodic(self, is_periodic: &[bool], config: &PeriodicityConfig) -> Result<Self, MeshError> {
        let topo = &self.topology;
        let (ftof, node_maps) = make_periodic(
            &topo.ftof,
            &topo.node_maps,
            &self.xf,
            self.shape.n_faces(),
            is_periodic,
            config,
        )?;
        let periodic = topo
            .is_periodic
            .iter()
            .zip(is_periodic)
            .map(|(&a, &b)| a || b)
            .collect();

        let topology = Arc::new(MeshTopology {
            vertices: topo.vertices.clone(),
            etov: topo.etov.clone(),
            ftof,
            node_maps,
            is_periodic: periodic,
        });
        Ok(Self { topology, ..self })
    }

    /// Rebuild geometry for moved volume nodes, sharing the topology.
    ///
    /// # Errors
    /// [`MeshError::DimensionMismatch`] if `x` does not have one (Np, K)
    /// array per axis.
    pub fn curved(&self, rd: &ReferenceElement, x: Vec<Mat<f64>>) -> Result<Self, MeshError> {
        if rd.shape != self.shape {
            return Err(MeshError::dimension(format!(
                "reference element is {:?} but the mesh is {:?}",
                rd.shape, self.shape
            )));
        }
        let shape_ok = x.len() == self.x.len()
            && x.iter()
                .all(|xi| xi.nrows() == rd.n_nodes() && xi.ncols() == self.num_elements());
        if !shape_ok {
            return Err(MeshError::dimension(format!(
                "curved coordinates must be {} arrays of shape ({}, {})",
                self.x.len(),
                rd.n_nodes(),
                self.num_elements()
            )));
        }

        let (xq, xf, wjq, geometry, normals) = derived_geometry(rd, &x)?;
        Ok(Self {
            shape: self.shape,
            topology: Arc::clone(&self.topology),
            x,
            xq,
            xf,
            wjq,
            geometry,
            normals,
        })
    }

    /// Number of elements K.
    #[inline]
    pub fn num_elements(&self) -> usize {
        self.topology.etov.len()
    }

    /// Spatial dimension.
    #[inline]
    pub fn dim(&self) -> usize {
        self.x.len()
    }

    /// Face-to-face table.
    #[inline]
    pub fn ftof(&self) -> &[usize] {
        &self.topology.ftof
    }

    /// Interior face node indices.
    #[inline]
    pub fn map_m(&self) -> &[usize] {
        &self.topology.node_maps.map_m
    }

    /// Exterior face node indices.
    #[inline]
    pub fn map_p(&self) -> &[usize] {
        &self.topology.node_maps.map_p
    }

    /// Boundary face node indices.
    #[inline]
    pub fn map_b(&self) -> &[usize] {
        &self.topology.node_maps.map_b
    }

    /// Periodicity flag per axis.
    #[inline]
    pub fn is_periodic(&self) -> &[bool] {
        &self.topology.is_periodic
    }

    /// Total mesh volume Σ wJq.
    pub fn total_volume(&self) -> f64 {
        (0..self.wjq.ncols())
            .map(|e| (0..self.wjq.nrows()).map(|q| self.wjq[(q, e)]).sum::<f64>())
            .sum()
    }
}

type DerivedGeometry = (Vec<Mat<f64>>, Vec<Mat<f64>>, Mat<f64>, GeometricFactors, FaceNormals);

/// Everything that depends on node positions only.
fn derived_geometry(rd: &ReferenceElement, x: &[Mat<f64>]) -> Result<DerivedGeometry, MeshError> {
    let geometry = geometric_factors(x, &rd.differentiation)?;
    let normals = compute_normals(&geometry, &rd.vf, &rd.reference_normals)?;

    let xq: Vec<Mat<f64>> = x.iter().map(|xi| matmul(&rd.vq, xi)).collect();
    let xf: Vec<Mat<f64>> = x.iter().map(|xi| matmul(&rd.vf, xi)).collect();

    let jq = matmul(&rd.vq, &geometry.j);
    let wjq = Mat::from_fn(jq.nrows(), jq.ncols(), |q, e| rd.quad_weights[q] * jq[(q, e)]);

    Ok((xq, xf, wjq, geometry, normals))
}
