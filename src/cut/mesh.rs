//! Cartesian background grids cut by embedded closed curves.
//!
//! Each background cell is classified as:
//! - Cartesian: no corner inside any curve and no crossing
//! - removed: every corner inside one curve and no crossing
//! - cut: crossed by exactly one curve, twice, with a corner outside it
//!
//! Cartesian cells form a Quad [`MeshData`]. A cut cell boundary starts at
//! an outside corner, walks the cell edges counter-clockwise and follows
//! the curve clockwise (object on the right) between its entry and exit
//! crossings.

use std::sync::Arc;

use super::curve::{BoundarySegment, ClosedCurve, CutBoundary};
use super::index::{CellIndex, CellIndexMap, CellKind, CutIndex};
use super::quadrature::{CutCellQuadrature, CutCellQuadratureBuilder, CutFaceQuadrature};
use super::triangulate::{EarcutTriangulator, PlanarTriangulator};
use super::CutCellError;
use crate::basis::PhysicalFrame;
use crate::mesh::{ConnectivityConfig, MeshData};
use crate::operators::dense::{is_finite, matmul, matvec, right_solve, select_rows};
use crate::polynomial::gauss_points_for_degree;
use crate::quadrature::caratheodory_pruning;
use crate::reference::{ElementShape, ReferenceElement};
use faer::Mat;

/// Axis-aligned background grid.
#[derive(Clone, Debug, PartialEq)]
pub struct BackgroundGrid {
    /// [x0, x1]
    pub x_range: [f64; 2],
    /// [y0, y1]
    pub y_range: [f64; 2],
    /// Cells along x and y
    pub cells: [usize; 2],
}

impl BackgroundGrid {
    /// Create a grid, validating the bounds and cell counts.
    pub fn new(x_range: [f64; 2], y_range: [f64; 2], cells: [usize; 2]) -> Result<Self, CutCellError> {
        if !(x_range[1] > x_range[0] && y_range[1] > y_range[0]) {
            return Err(CutCellError::InvalidConfig(format!(
                "invalid domain bounds {:?} x {:?}",
                x_range, y_range
            )));
        }
        if cells[0] == 0 || cells[1] == 0 {
            return Err(CutCellError::InvalidConfig(
                "need at least one cell in each direction".to_string(),
            ));
        }
        Ok(Self { x_range, y_range, cells })
    }

    /// Cell sizes (dx, dy).
    #[inline]
    pub fn spacing(&self) -> [f64; 2] {
        [
            (self.x_range[1] - self.x_range[0]) / self.cells[0] as f64,
            (self.y_range[1] - self.y_range[0]) / self.cells[1] as f64,
        ]
    }

    /// Area of one background cell.
    #[inline]
    pub fn cell_volume(&self) -> f64 {
        let [dx, dy] = self.spacing();
        dx * dy
    }

    /// Grid vertex (i, j).
    #[inline]
    pub fn vertex(&self, i: usize, j: usize) -> [f64; 2] {
        let [dx, dy] = self.spacing();
        [self.x_range[0] + i as f64 * dx, self.y_range[0] + j as f64 * dy]
    }

    /// Corners of cell (i, j), counter-clockwise from the lower left.
    pub fn corners(&self, i: usize, j: usize) -> [[f64; 2]; 4] {
        [
            self.vertex(i, j),
            self.vertex(i + 1, j),
            self.vertex(i + 1, j + 1),
            self.vertex(i, j + 1),
        ]
    }
}

/// Construction parameters for [`CutMesh`].
#[derive(Clone, Debug)]
pub struct CutMeshConfig {
    /// Polynomial degree N
    pub order: usize,
    /// Cut-cell volume quadrature degree, default max(2N, (N-1)(N+2))
    pub quadrature_degree: Option<usize>,
    /// Degree of the curved sub-triangle maps, default max(N, 2)
    pub geometry_degree: Option<usize>,
    /// Curve pieces per cut cell boundary arc
    pub arc_subdivisions: usize,
    /// Prune cut-cell volume rules against the degree 2N basis
    pub prune_quadrature: bool,
}

impl Default for CutMeshConfig {
    fn default() -> Self {
        Self {
            order: 3,
            quadrature_degree: None,
            geometry_degree: None,
            arc_subdivisions: 4,
            prune_quadrature: true,
        }
    }
}

impl CutMeshConfig {
    /// Config for degree N with all other settings at their defaults.
    pub fn with_order(order: usize) -> Self {
        Self {
            order,
            ..Default::default()
        }
    }

    /// Resolved volume quadrature degree.
    pub fn resolved_quadrature_degree(&self) -> usize {
        let n = self.order;
        self.quadrature_degree
            .unwrap_or_else(|| (2 * n).max(n.saturating_sub(1) * (n + 2)))
    }

    /// Resolved geometry degree.
    pub fn resolved_geometry_degree(&self) -> usize {
        self.geometry_degree.unwrap_or(self.order.max(2))
    }

    fn validate(&self) -> Result<(), CutCellError> {
        if self.order == 0 {
            return Err(CutCellError::InvalidConfig("polynomial degree must be at least 1".to_string()));
        }
        if self.arc_subdivisions == 0 {
            return Err(CutCellError::InvalidConfig("arc_subdivisions must be positive".to_string()));
        }
        if self.resolved_geometry_degree() == 0 {
            return Err(CutCellError::InvalidConfig("geometry degree must be positive".to_string()));
        }
        Ok(())
    }
}

/// A background cell clipped by a curve, with its quadrature and basis.
#[derive(Clone, Debug)]
pub struct CutCell {
    /// Background grid position (i, j)
    pub grid_position: (usize, usize),
    /// Closed counter-clockwise boundary
    pub boundary: CutBoundary,
    /// Volume quadrature (pruned if configured)
    pub quadrature: CutCellQuadrature,
    /// Boundary quadrature with outward normals
    pub face: CutFaceQuadrature,
    /// Total-degree N basis on the cell bounding box
    pub basis: PhysicalFrame,
    /// Interpolation nodes (x, y), chosen among the quadrature points
    pub nodes: [Vec<f64>; 2],
    /// Nodal values to volume quadrature points
    pub vq: Mat<f64>,
    /// Nodal values to face quadrature points
    pub vf: Mat<f64>,
}

impl CutCell {
    /// Cell area from the volume quadrature.
    #[inline]
    pub fn volume(&self) -> f64 {
        self.quadrature.volume()
    }

    /// Number of interpolation nodes.
    #[inline]
    pub fn n_nodes(&self) -> usize {
        self.nodes[0].len()
    }
}

/// Nodal values on a cut mesh.
#[derive(Clone, Debug)]
pub struct CutCellField {
    /// Cartesian cells, shape (Np, K_cartesian)
    pub cartesian: Mat<f64>,
    /// Cut cells, shape (Np_cut, K_cut)
    pub cut: Mat<f64>,
}

/// A Cartesian background grid with embedded curves.
#[derive(Clone)]
pub struct CutMesh {
    /// Background grid
    pub grid: BackgroundGrid,
    /// Embedded curves
    pub curves: Vec<Arc<dyn ClosedCurve>>,
    /// Construction parameters
    pub config: CutMeshConfig,
    /// Quad reference element of degree N for the Cartesian cells
    pub reference: ReferenceElement,
    /// Mesh data of the Cartesian cells, in [`CartesianIndex`](super::CartesianIndex) order
    pub cartesian: MeshData,
    /// Cut cells in [`CutIndex`] order
    pub cut_cells: Vec<CutCell>,
    /// Cell index tables
    pub index: CellIndexMap,
}

/// Result of classifying one background cell.
enum Classified {
    Cartesian,
    Removed,
    Cut(CutBoundary),
}

impl CutMesh {
    /// Build with the default ear-clipping triangulator.
    pub fn new(
        grid: BackgroundGrid,
        curves: Vec<Arc<dyn ClosedCurve>>,
        config: CutMeshConfig,
    ) -> Result<Self, CutCellError> {
        Self::with_triangulator(grid, curves, config, &EarcutTriangulator)
    }

    /// Build with a custom polygon triangulator.
    pub fn with_triangulator(
        grid: BackgroundGrid,
        curves: Vec<Arc<dyn ClosedCurve>>,
        config: CutMeshConfig,
        triangulator: &dyn PlanarTriangulator,
    ) -> Result<Self, CutCellError> {
        config.validate()?;
        let (kinds, boundaries) = classify_cells(&grid, &curves, config.arc_subdivisions)?;
        let builder = cut_quadrature_builder(&config)?;

        let cut_cells = boundaries
            .into_iter()
            .map(|(position, boundary)| build_cut_cell(&builder, &config, triangulator, position, boundary))
            .collect::<Result<Vec<_>, _>>()?;

        Self::assemble(grid, curves, config, kinds, cut_cells)
    }

    /// Build with cut cells constructed in parallel.
    ///
    /// Produces the same mesh as [`CutMesh::new`].
    #[cfg(feature = "parallel")]
    pub fn new_parallel(
        grid: BackgroundGrid,
        curves: Vec<Arc<dyn ClosedCurve>>,
        config: CutMeshConfig,
    ) -> Result<Self, CutCellError> {
        use rayon::prelude::*;

        config.validate()?;
        let (kinds, boundaries) = classify_cells(&grid, &curves, config.arc_subdivisions)?;
        let builder = cut_quadrature_builder(&config)?;

        let cut_cells = boundaries
            .into_par_iter()
            .map(|(position, boundary)| build_cut_cell(&builder, &config, &EarcutTriangulator, position, boundary))
            .collect::<Result<Vec<_>, _>>()?;

        Self::assemble(grid, curves, config, kinds, cut_cells)
    }

    fn assemble(
        grid: BackgroundGrid,
        curves: Vec<Arc<dyn ClosedCurve>>,
        config: CutMeshConfig,
        kinds: Vec<CellKind>,
        cut_cells: Vec<CutCell>,
    ) -> Result<Self, CutCellError> {
        let index = CellIndexMap::new(grid.cells, &kinds);
        let reference = ReferenceElement::new(ElementShape::Quad, config.order);

        // Quad mesh of the Cartesian cells over the full vertex grid
        let [nx, ny] = grid.cells;
        let mut vx = Vec::with_capacity((nx + 1) * (ny + 1));
        let mut vy = Vec::with_capacity((nx + 1) * (ny + 1));
        for j in 0..=ny {
            for i in 0..=nx {
                let v = grid.vertex(i, j);
                vx.push(v[0]);
                vy.push(v[1]);
            }
        }
        let etov: Vec<Vec<usize>> = index
            .cartesian_cells
            .iter()
            .map(|&linear| {
                let (i, j) = index.linear_to_cartesian[linear];
                let v0 = i + (nx + 1) * j;
                vec![v0, v0 + 1, v0 + nx + 2, v0 + nx + 1]
            })
            .collect();
        let cartesian = MeshData::new(&reference, vec![vx, vy], etov, &ConnectivityConfig::default())?;

        log::debug!(
            "CutMesh: {} Cartesian cells, {} cut cells, {} removed",
            index.cartesian_cells.len(),
            index.cut_cells.len(),
            grid.cells[0] * grid.cells[1] - index.n_cells()
        );

        Ok(Self {
            grid,
            curves,
            config,
            reference,
            cartesian,
            cut_cells,
            index,
        })
    }

    /// Number of active cells.
    #[inline]
    pub fn n_cells(&self) -> usize {
        self.index.n_cells()
    }

    /// Area of a cell from its quadrature.
    pub fn cell_volume(&self, cell: CellIndex) -> f64 {
        match cell {
            CellIndex::Cartesian(c) => {
                let wjq = &self.cartesian.wjq;
                (0..wjq.nrows()).map(|q| wjq[(q, c.get())]).sum()
            }
            CellIndex::Cut(c) => self.cut_cells[c].volume(),
        }
    }

    /// Cut cell by index.
    #[inline]
    pub fn cut_cell(&self, index: CutIndex) -> &CutCell {
        &self.cut_cells[index]
    }

    /// Field of zeros.
    pub fn zero_field(&self) -> CutCellField {
        let np_cut = self.cut_cells.first().map_or(0, CutCell::n_nodes);
        CutCellField {
            cartesian: Mat::zeros(self.reference.n_nodes(), self.cartesian.num_elements()),
            cut: Mat::zeros(np_cut, self.cut_cells.len()),
        }
    }

    /// Interpolate a function at every node.
    pub fn interpolate<F: Fn(f64, f64) -> f64>(&self, f: F) -> CutCellField {
        let mut field = self.zero_field();
        let (x, y) = (&self.cartesian.x[0], &self.cartesian.x[1]);
        for e in 0..field.cartesian.ncols() {
            for i in 0..field.cartesian.nrows() {
                field.cartesian[(i, e)] = f(x[(i, e)], y[(i, e)]);
            }
        }
        for (c, cell) in self.cut_cells.iter().enumerate() {
            for i in 0..cell.n_nodes() {
                field.cut[(i, c)] = f(cell.nodes[0][i], cell.nodes[1][i]);
            }
        }
        field
    }

    /// ∫ u over the whole mesh using each cell's volume quadrature.
    pub fn integrate(&self, field: &CutCellField) -> f64 {
        let uq = matmul(&self.reference.vq, &field.cartesian);
        let wjq = &self.cartesian.wjq;
        let mut total = 0.0;
        for e in 0..uq.ncols() {
            for q in 0..uq.nrows() {
                total += wjq[(q, e)] * uq[(q, e)];
            }
        }
        for (c, cell) in self.cut_cells.iter().enumerate() {
            let u: Vec<f64> = (0..cell.n_nodes()).map(|i| field.cut[(i, c)]).collect();
            let uq = matvec(&cell.vq, &u);
            total += uq.iter().zip(&cell.quadrature.w).map(|(u, w)| u * w).sum::<f64>();
        }
        total
    }
}

fn cut_quadrature_builder(config: &CutMeshConfig) -> Result<CutCellQuadratureBuilder, CutCellError> {
    CutCellQuadratureBuilder::new(
        config.resolved_quadrature_degree(),
        config.resolved_geometry_degree(),
        gauss_points_for_degree(2 * config.order + 1),
    )
}

type CutBoundaries = Vec<((usize, usize), CutBoundary)>;

/// Classify every background cell, x index fastest.
fn classify_cells(
    grid: &BackgroundGrid,
    curves: &[Arc<dyn ClosedCurve>],
    arc_subdivisions: usize,
) -> Result<(Vec<CellKind>, CutBoundaries), CutCellError> {
    let [nx, ny] = grid.cells;
    let mut kinds = Vec::with_capacity(nx * ny);
    let mut boundaries = Vec::new();
    for j in 0..ny {
        for i in 0..nx {
            match classify_cell(grid, curves, i, j, arc_subdivisions)? {
                Classified::Cartesian => kinds.push(CellKind::Cartesian),
                Classified::Removed => kinds.push(CellKind::Removed),
                Classified::Cut(boundary) => {
                    kinds.push(CellKind::Cut);
                    boundaries.push(((i, j), boundary));
                }
            }
        }
    }
    Ok((kinds, boundaries))
}

fn classify_cell(
    grid: &BackgroundGrid,
    curves: &[Arc<dyn ClosedCurve>],
    i: usize,
    j: usize,
    arc_subdivisions: usize,
) -> Result<Classified, CutCellError> {
    let corners = grid.corners(i, j);

    // per curve: corner containment and crossings per edge sorted along the edge
    let mut involved = Vec::new();
    for (c, curve) in curves.iter().enumerate() {
        let inside = corners.map(|p| curve.contains(p));
        let crossings: Vec<Vec<(f64, f64)>> = (0..4)
            .map(|k| {
                let mut hits = curve.segment_intersections(corners[k], corners[(k + 1) % 4]);
                hits.sort_by(|a, b| a.0.total_cmp(&b.0));
                hits
            })
            .collect();
        let n_crossings: usize = crossings.iter().map(Vec::len).sum();

        if n_crossings == 0 && !inside.iter().any(|&b| b) {
            let p = curve.point(0.0);
            let (lo, hi) = (corners[0], corners[2]);
            if p[0] > lo[0] && p[0] < hi[0] && p[1] > lo[1] && p[1] < hi[1] {
                return Err(CutCellError::unsupported(i, j, "curve lies entirely inside the cell"));
            }
            continue;
        }
        involved.push((c, inside, crossings, n_crossings));
    }

    let Some((c, inside, crossings, n_crossings)) = involved.pop() else {
        return Ok(Classified::Cartesian);
    };
    if !involved.is_empty() {
        return Err(CutCellError::unsupported(i, j, "more than one curve meets the cell"));
    }
    if n_crossings == 0 {
        return if inside.iter().all(|&b| b) {
            Ok(Classified::Removed)
        } else {
            Err(CutCellError::unsupported(i, j, "corners inside a curve without a crossing"))
        };
    }
    if n_crossings != 2 {
        return Err(CutCellError::unsupported(
            i,
            j,
            format!("curve crosses the cell boundary {} times", n_crossings),
        ));
    }
    let Some(start) = (0..4).find(|&k| !inside[k]) else {
        return Err(CutCellError::unsupported(i, j, "no cell corner lies outside the curve"));
    };

    let curve = &curves[c];
    let min_length = 1e-12 * grid.spacing()[0].min(grid.spacing()[1]);
    let mut segments: Vec<BoundarySegment> = Vec::new();
    let push_line = |segments: &mut Vec<BoundarySegment>, start: [f64; 2], end: [f64; 2]| {
        if (end[0] - start[0]).abs() + (end[1] - start[1]).abs() > min_length {
            segments.push(BoundarySegment::Line { start, end });
        }
    };

    let mut current = corners[start];
    let mut entry: Option<f64> = None;
    for step in 0..4 {
        let k = (start + step) % 4;
        let (a, b) = (corners[k], corners[(k + 1) % 4]);
        for &(s, t) in &crossings[k] {
            let p = [a[0] + s * (b[0] - a[0]), a[1] + s * (b[1] - a[1])];
            match entry {
                None => {
                    push_line(&mut segments, current, p);
                    entry = Some(t);
                }
                Some(t_in) => {
                    // clockwise from t_in down to t
                    let sweep = (t_in - t).rem_euclid(1.0);
                    for m in 0..arc_subdivisions {
                        segments.push(BoundarySegment::Curve {
                            curve: Arc::clone(curve),
                            t_start: t_in - sweep * m as f64 / arc_subdivisions as f64,
                            t_end: t_in - sweep * (m + 1) as f64 / arc_subdivisions as f64,
                        });
                    }
                    current = p;
                    entry = None;
                }
            }
        }
        if entry.is_none() {
            push_line(&mut segments, current, b);
            current = b;
        }
    }

    if entry.is_some() || segments.len() < 3 {
        return Err(CutCellError::unsupported(i, j, "cut boundary does not close"));
    }
    Ok(Classified::Cut(CutBoundary { segments }))
}

fn build_cut_cell(
    builder: &CutCellQuadratureBuilder,
    config: &CutMeshConfig,
    triangulator: &dyn PlanarTriangulator,
    grid_position: (usize, usize),
    boundary: CutBoundary,
) -> Result<CutCell, CutCellError> {
    let n = config.order;
    let mut quadrature = builder.volume_quadrature(&boundary, triangulator)?;
    let face = builder.face_quadrature(&boundary);

    if config.prune_quadrature {
        let frame = PhysicalFrame::fit(2 * n, &face.x, &face.y);
        let moments = frame.vandermonde(&quadrature.x, &quadrature.y).v;
        let pruned = caratheodory_pruning(&moments, &quadrature.w)?;
        quadrature = CutCellQuadrature {
            x: pruned.select(&quadrature.x),
            y: pruned.select(&quadrature.y),
            w: pruned.weights,
        };
    }

    let basis = PhysicalFrame::fit(n, &face.x, &face.y);
    let at_quadrature = basis.vandermonde(&quadrature.x, &quadrature.y).v;
    let selected = greedy_fekete_rows(&at_quadrature, basis.n_modes());
    let at_nodes = select_rows(&at_quadrature, &selected);

    let vq = right_solve(&at_quadrature, &at_nodes);
    let vf = right_solve(&basis.vandermonde(&face.x, &face.y).v, &at_nodes);
    if !is_finite(&vq) || !is_finite(&vf) {
        let (i, j) = grid_position;
        return Err(CutCellError::unsupported(i, j, "interpolation nodes are degenerate"));
    }

    let nodes = [
        selected.iter().map(|&q| quadrature.x[q]).collect(),
        selected.iter().map(|&q| quadrature.y[q]).collect(),
    ];

    Ok(CutCell {
        grid_position,
        boundary,
        quadrature,
        face,
        basis,
        nodes,
        vq,
        vf,
    })
}

/// Greedy row selection maximizing the spanned volume (approximate Fekete points).
///
/// Equivalent to column-pivoted Gram-Schmidt on Vᵀ.
fn greedy_fekete_rows(v: &Mat<f64>, count: usize) -> Vec<usize> {
    let (m, p) = (v.nrows(), v.ncols());
    let mut rows: Vec<Vec<f64>> = (0..m).map(|i| (0..p).map(|j| v[(i, j)]).collect()).collect();
    let mut taken = vec![false; m];
    let mut selected = Vec::with_capacity(count);

    for _ in 0..count.min(m) {
        let norm2 = |r: &Vec<f64>| r.iter().map(|x| x * x).sum::<f64>();
        let Some(best) = (0..m)
            .filter(|&i| !taken[i])
            .max_by(|&a, &b| norm2(&rows[a]).total_cmp(&norm2(&rows[b])))
        else {
            break;
        };
        taken[best] = true;
        selected.push(best);

        let norm = norm2(&rows[best]).sqrt();
        if norm == 0.0 {
            continue;
        }
        let q: Vec<f64> = rows[best].iter().map(|x| x / norm).collect();
        for (i, row) in rows.iter_mut().enumerate() {
            if taken[i] {
                continue;
            }
            let dot: f64 = row.iter().zip(&q).map(|(a, b)| a * b).sum();
            for (r, qk) in row.iter_mut().zip(&q) {
                *r -= dot * qk;
            }
        }
    }

    selected
}
