//! State redistribution for small cut cells.
//!
//! Each cut cell j owns a neighborhood N_j of cells whose union is large
//! enough to be stable. With overlap counts n_k (how many neighborhoods
//! cell k belongs to, Cartesian cells counting themselves once more), the
//! merged solution on N_j is the weighted L2 projection
//!
//! û_j = argmin Σ_{k∈N_j} (1/n_k) ‖v - u_k‖²_{L2(k)}
//!
//! over total-degree N polynomials v on the bounding box of N_j. The new
//! value on cell k is the average of every û_j that covers it:
//!
//! u_k ← (1/n_k) [ u_k (Cartesian only) + Σ_{j: k∈N_j} û_j|_k ]
//!
//! This preserves constants and the total mass Σ_k ∫_k u_k.

mod neighbors;

pub use neighbors::{NeighborList, compute_neighbor_list};

use crate::basis::PhysicalFrame;
use crate::cut::{CellIndex, CutCellError, CutCellField, CutMesh};
use crate::operators::dense::{column, is_finite, matmul, matvec, solve, weighted_gram};
use faer::Mat;

/// Parameters for neighborhood construction.
#[derive(Clone, Debug)]
pub struct RedistributionConfig {
    /// Minimum neighborhood volume as a fraction of a background cell
    pub volume_threshold: f64,
}

impl Default for RedistributionConfig {
    fn default() -> Self {
        Self { volume_threshold: 0.5 }
    }
}

/// Precomputed redistribution operators for a cut mesh.
#[derive(Clone, Debug)]
pub struct StateRedistribution {
    /// Neighborhoods and overlap counts
    pub neighbors: NeighborList,
    /// Per neighborhood: pooled member nodal values to projected values
    pub projections: Vec<Mat<f64>>,
    /// Cell tag of each linear cell
    cells: Vec<CellIndex>,
}

/// Quadrature and node data of one member cell.
struct MemberData {
    xq: Vec<f64>,
    yq: Vec<f64>,
    w: Vec<f64>,
    vq: Mat<f64>,
    nodes: [Vec<f64>; 2],
    face: [Vec<f64>; 2],
}

impl MemberData {
    fn gather(mesh: &CutMesh, cell: CellIndex) -> Self {
        match cell {
            CellIndex::Cartesian(c) => {
                let md = &mesh.cartesian;
                let e = c.get();
                Self {
                    xq: column(&md.xq[0], e),
                    yq: column(&md.xq[1], e),
                    w: column(&md.wjq, e),
                    vq: mesh.reference.vq.clone(),
                    nodes: [column(&md.x[0], e), column(&md.x[1], e)],
                    face: [column(&md.xf[0], e), column(&md.xf[1], e)],
                }
            }
            CellIndex::Cut(c) => {
                let cell = mesh.cut_cell(c);
                Self {
                    xq: cell.quadrature.x.clone(),
                    yq: cell.quadrature.y.clone(),
                    w: cell.quadrature.w.clone(),
                    vq: cell.vq.clone(),
                    nodes: cell.nodes.clone(),
                    face: [cell.face.x.clone(), cell.face.y.clone()],
                }
            }
        }
    }

    fn n_nodes(&self) -> usize {
        self.nodes[0].len()
    }
}

impl StateRedistribution {
    /// Build neighborhoods and their projection operators.
    ///
    /// # Errors
    /// [`CutCellError::SingularProjection`] if a merged mass matrix cannot
    /// be solved.
    pub fn new(mesh: &CutMesh, config: &RedistributionConfig) -> Result<Self, CutCellError> {
        let neighbors = compute_neighbor_list(mesh, config);
        let cells = mesh.index.linear_to_cell.clone();

        let projections = neighbors
            .neighborhoods
            .iter()
            .enumerate()
            .map(|(owner, members)| neighborhood_projection(mesh, &cells, &neighbors.overlap, owner, members))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            neighbors,
            projections,
            cells,
        })
    }

    /// Redistribute `field` in place.
    ///
    /// Every projection reads the values passed in, so applying twice is
    /// not the same as applying once.
    pub fn apply(&self, field: &mut CutCellField) {
        let contributions: Vec<Vec<f64>> = self
            .neighbors
            .neighborhoods
            .iter()
            .zip(&self.projections)
            .map(|(members, projection)| {
                let pooled: Vec<f64> = members
                    .iter()
                    .flat_map(|&m| self.values(field, m))
                    .collect();
                matvec(projection, &pooled)
            })
            .collect();

        // Cartesian cells keep their own value as the self contribution
        for c in 0..field.cut.ncols() {
            for i in 0..field.cut.nrows() {
                field.cut[(i, c)] = 0.0;
            }
        }
        for (members, contribution) in self.neighbors.neighborhoods.iter().zip(&contributions) {
            let mut offset = 0;
            for &m in members {
                let (target, col) = self.storage_mut(field, m);
                let n = target.nrows();
                for i in 0..n {
                    target[(i, col)] += contribution[offset + i];
                }
                offset += n;
            }
        }

        for (linear, &count) in self.neighbors.overlap.iter().enumerate() {
            if count <= 1 {
                continue;
            }
            let (target, col) = self.storage_mut(field, linear);
            for i in 0..target.nrows() {
                target[(i, col)] /= count as f64;
            }
        }
    }

    fn values(&self, field: &CutCellField, linear: usize) -> Vec<f64> {
        match self.cells[linear] {
            CellIndex::Cartesian(c) => column(&field.cartesian, c.get()),
            CellIndex::Cut(c) => column(&field.cut, c.get()),
        }
    }

    /// Storage matrix and column of a linear cell.
    fn storage_mut<'a>(&self, field: &'a mut CutCellField, linear: usize) -> (&'a mut Mat<f64>, usize) {
        match self.cells[linear] {
            CellIndex::Cartesian(c) => (&mut field.cartesian, c.get()),
            CellIndex::Cut(c) => (&mut field.cut, c.get()),
        }
    }
}

/// Projection operator of one neighborhood: (Σ Np_k) × (Σ Np_k).
fn neighborhood_projection(
    mesh: &CutMesh,
    cells: &[CellIndex],
    overlap: &[usize],
    owner: usize,
    members: &[usize],
) -> Result<Mat<f64>, CutCellError> {
    let data: Vec<MemberData> = members.iter().map(|&m| MemberData::gather(mesh, cells[m])).collect();

    let face_x: Vec<f64> = data.iter().flat_map(|d| d.face[0].iter().copied()).collect();
    let face_y: Vec<f64> = data.iter().flat_map(|d| d.face[1].iter().copied()).collect();
    let frame = PhysicalFrame::fit(mesh.config.order, &face_x, &face_y);
    let n_modes = frame.n_modes();
    let n_pooled: usize = data.iter().map(MemberData::n_nodes).sum();

    let mut mass = Mat::zeros(n_modes, n_modes);
    let mut coupling = Mat::zeros(n_modes, n_pooled);
    let mut at_nodes = Mat::zeros(n_pooled, n_modes);
    let mut offset = 0;
    for (d, &m) in data.iter().zip(members) {
        let scale = 1.0 / overlap[m] as f64;
        let w: Vec<f64> = d.w.iter().map(|w| w * scale).collect();
        let vh = frame.vandermonde(&d.xq, &d.yq).v;

        let m_k = weighted_gram(&vh, &w, &vh);
        let b_k = weighted_gram(&vh, &w, &d.vq);
        for j in 0..n_modes {
            for i in 0..n_modes {
                mass[(i, j)] += m_k[(i, j)];
            }
        }
        let vn = frame.vandermonde(&d.nodes[0], &d.nodes[1]).v;
        for l in 0..d.n_nodes() {
            for i in 0..n_modes {
                coupling[(i, offset + l)] = b_k[(i, l)];
                at_nodes[(offset + l, i)] = vn[(l, i)];
            }
        }
        offset += d.n_nodes();
    }

    let projection = matmul(&at_nodes, &solve(&mass, &coupling));
    if !is_finite(&projection) {
        return Err(CutCellError::SingularProjection { cell: owner });
    }
    Ok(projection)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cut::{BackgroundGrid, Circle, ClosedCurve, CutMeshConfig};
    use std::sync::Arc;

    fn circle_mesh(order: usize) -> CutMesh {
        let grid = BackgroundGrid::new([-1.0, 1.0], [-1.0, 1.0], [4, 4]).unwrap();
        let circle: Arc<dyn ClosedCurve> = Arc::new(Circle::new([0.0, 0.0], 0.49));
        CutMesh::new(grid, vec![circle], CutMeshConfig::with_order(order)).unwrap()
    }

    #[test]
    fn test_constants_are_reproduced() {
        let mesh = circle_mesh(2);
        let srd = StateRedistribution::new(&mesh, &RedistributionConfig::default()).unwrap();
        let mut field = mesh.interpolate(|_, _| 2.5);
        srd.apply(&mut field);
        for values in [&field.cartesian, &field.cut] {
            for e in 0..values.ncols() {
                for i in 0..values.nrows() {
                    assert!((values[(i, e)] - 2.5).abs() < 1e-10, "value = {}", values[(i, e)]);
                }
            }
        }
    }

    #[test]
    fn test_mass_is_conserved() {
        let mesh = circle_mesh(2);
        let srd = StateRedistribution::new(&mesh, &RedistributionConfig::default()).unwrap();
        let mut field = mesh.interpolate(|x, y| (3.0 * x).sin() + x * y * y);
        let before = mesh.integrate(&field);
        srd.apply(&mut field);
        let after = mesh.integrate(&field);
        assert!((before - after).abs() < 1e-10, "mass {} -> {}", before, after);
    }

    #[test]
    fn test_massless_cell_gives_singular_projection() {
        let mut mesh = circle_mesh(2);
        for w in mesh.cut_cells[1].quadrature.w.iter_mut() {
            *w = 0.0;
        }
        // keep every neighborhood a single cell so nothing else adds mass
        let config = RedistributionConfig { volume_threshold: 0.0 };
        let result = StateRedistribution::new(&mesh, &config);
        assert!(matches!(result, Err(CutCellError::SingularProjection { cell: 1 })));
    }

    #[test]
    fn test_projection_sizes() {
        let mesh = circle_mesh(1);
        let srd = StateRedistribution::new(&mesh, &RedistributionConfig::default()).unwrap();
        for (members, projection) in srd.neighbors.neighborhoods.iter().zip(&srd.projections) {
            let pooled: usize = members
                .iter()
                .map(|&m| match mesh.index.linear_to_cell[m] {
                    CellIndex::Cartesian(_) => mesh.reference.n_nodes(),
                    CellIndex::Cut(c) => mesh.cut_cell(c).n_nodes(),
                })
                .sum();
            assert_eq!(projection.nrows(), pooled);
            assert_eq!(projection.ncols(), pooled);
        }
    }
}
