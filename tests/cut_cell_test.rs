//! Cut-cell quadrature, pruning and state redistribution on a circular
//! cut-out.

use approx::assert_abs_diff_eq;
use dg_mesh::cut::CutMesh;
use dg_mesh::{
    BackgroundGrid, Circle, ClosedCurve, CutMeshConfig, PhysicalFrame, RedistributionConfig, StateRedistribution,
    caratheodory_pruning,
};
use std::f64::consts::PI;
use std::sync::Arc;

fn circle(radius: f64) -> Arc<dyn ClosedCurve> {
    Arc::new(Circle::new([0.0, 0.0], radius))
}

fn mesh(cells: usize, radius: f64, config: CutMeshConfig) -> CutMesh {
    let grid = BackgroundGrid::new([-1.0, 1.0], [-1.0, 1.0], [cells, cells]).unwrap();
    CutMesh::new(grid, vec![circle(radius)], config).unwrap()
}

#[test]
fn test_pruning_to_cubic_space_keeps_area() {
    let config = CutMeshConfig {
        order: 3,
        quadrature_degree: Some(6),
        geometry_degree: Some(6),
        prune_quadrature: false,
        ..Default::default()
    };
    let mesh = mesh(2, 0.5, config);
    assert_eq!(mesh.cut_cells.len(), 4);

    let mut full_area = 0.0;
    let mut pruned_area = 0.0;
    for cell in &mesh.cut_cells {
        let q = &cell.quadrature;
        let frame = PhysicalFrame::fit(3, &cell.face.x, &cell.face.y);
        let v = frame.vandermonde(&q.x, &q.y).v;
        let pruned = caratheodory_pruning(&v, &q.w).unwrap();

        assert!(q.len() > 10);
        assert!(pruned.len() <= 10, "kept {} of {} points", pruned.len(), q.len());
        assert!(pruned.weights.iter().all(|&w| w >= 0.0));

        full_area += q.volume();
        pruned_area += pruned.weights.iter().sum::<f64>();
    }
    assert!((full_area - pruned_area).abs() < 1e-10, "{} vs {}", full_area, pruned_area);

    // each cut cell is a unit square minus a quarter disk
    assert_abs_diff_eq!(full_area, 4.0 - PI * 0.25, epsilon = 1e-6);
}

#[test]
fn test_default_pruning_matches_degree_2n_space() {
    let mesh = mesh(2, 0.5, CutMeshConfig::with_order(2));
    for cell in &mesh.cut_cells {
        // total degree 4 space
        assert!(cell.quadrature.len() <= 15);
        assert_eq!(cell.n_nodes(), 6);
        assert_eq!(cell.vq.nrows(), cell.quadrature.len());
        assert_eq!(cell.vq.ncols(), 6);
    }
}

#[test]
fn test_symmetric_cut_cells_have_equal_positive_rules() {
    // a background cell minus a quarter disk
    let exact = 0.25 - PI * 0.49 * 0.49 / 4.0;
    for prune in [false, true] {
        let config = CutMeshConfig {
            prune_quadrature: prune,
            ..CutMeshConfig::with_order(3)
        };
        let mesh = mesh(4, 0.49, config);
        assert_eq!(mesh.cut_cells.len(), 4);

        let volumes: Vec<f64> = mesh.cut_cells.iter().map(|c| c.volume()).collect();
        for cell in &mesh.cut_cells {
            assert!(cell.quadrature.w.iter().all(|&w| w >= 0.0), "negative weight, prune = {}", prune);
        }
        for v in &volumes {
            assert!((v - volumes[0]).abs() < 1e-10, "volumes {:?}, prune = {}", volumes, prune);
            assert_abs_diff_eq!(*v, exact, epsilon = 5e-5);
        }
    }
}

#[test]
fn test_integrate_linear_field() {
    let mesh = mesh(4, 0.49, CutMeshConfig::with_order(2));
    // ∫ x over a region symmetric in x vanishes
    let field = mesh.interpolate(|x, _| x);
    assert!(mesh.integrate(&field).abs() < 1e-10);

    let ones = mesh.interpolate(|_, _| 1.0);
    assert_abs_diff_eq!(mesh.integrate(&ones), 4.0 - PI * 0.49 * 0.49, epsilon = 1e-4);
}

#[test]
fn test_redistribution_conserves_and_preserves_constants() {
    let mesh = mesh(4, 0.49, CutMeshConfig::with_order(3));
    let srd = StateRedistribution::new(&mesh, &RedistributionConfig::default()).unwrap();

    let mut constant = mesh.interpolate(|_, _| -1.5);
    srd.apply(&mut constant);
    for e in 0..constant.cut.ncols() {
        for i in 0..constant.cut.nrows() {
            assert_abs_diff_eq!(constant.cut[(i, e)], -1.5, epsilon = 1e-9);
        }
    }

    let mut field = mesh.interpolate(|x, y| (x + 2.0 * y).exp());
    let before = mesh.integrate(&field);
    srd.apply(&mut field);
    let after = mesh.integrate(&field);
    assert!((before - after).abs() < 1e-10 * before.abs(), "mass {} -> {}", before, after);
}

#[cfg(feature = "parallel")]
#[test]
fn test_parallel_matches_serial() {
    let grid = BackgroundGrid::new([-1.0, 1.0], [-1.0, 1.0], [4, 4]).unwrap();
    let serial = CutMesh::new(grid.clone(), vec![circle(0.49)], CutMeshConfig::with_order(2)).unwrap();
    let parallel = CutMesh::new_parallel(grid, vec![circle(0.49)], CutMeshConfig::with_order(2)).unwrap();

    assert_eq!(serial.cut_cells.len(), parallel.cut_cells.len());
    for (a, b) in serial.cut_cells.iter().zip(&parallel.cut_cells) {
        assert_eq!(a.grid_position, b.grid_position);
        assert_eq!(a.quadrature.w, b.quadrature.w);
        assert_eq!(a.nodes, b.nodes);
    }
}
