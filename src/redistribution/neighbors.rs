//! Greedy merging neighborhoods for cut cells.

use super::RedistributionConfig;
use crate::cut::{CellIndex, CutMesh};

/// Merging neighborhoods and per-cell overlap counts.
#[derive(Clone, Debug, PartialEq)]
pub struct NeighborList {
    /// One neighborhood per cut cell, as linear cell indices, owner first
    pub neighborhoods: Vec<Vec<usize>>,
    /// Number of neighborhoods containing each linear cell; Cartesian
    /// cells count their implicit self-neighborhood
    pub overlap: Vec<usize>,
}

impl NeighborList {
    /// Linear indices of cells that belong to some cut-cell neighborhood.
    pub fn merged_cells(&self) -> impl Iterator<Item = usize> + '_ {
        self.neighborhoods.iter().flatten().copied()
    }
}

/// Grow a neighborhood around every cut cell.
///
/// Starting from the cut cell itself, repeatedly add the active 4-connected
/// neighbor of any member that gives the largest merged volume, until the
/// volume reaches `volume_threshold` times the background cell volume or no
/// candidate remains.
pub fn compute_neighbor_list(mesh: &CutMesh, config: &RedistributionConfig) -> NeighborList {
    let index = &mesh.index;
    let volumes: Vec<f64> = index.linear_to_cell.iter().map(|&c| mesh.cell_volume(c)).collect();
    let target = config.volume_threshold * mesh.grid.cell_volume();

    let mut neighborhoods = Vec::with_capacity(index.cut_cells.len());
    for &owner in &index.cut_cells {
        let mut members = vec![owner];
        let mut volume = volumes[owner];

        while volume < target {
            let mut best: Option<(usize, f64)> = None;
            for &member in &members {
                let (i, j) = index.linear_to_cartesian[member];
                let (i, j) = (i as isize, j as isize);
                for (di, dj) in [(1, 0), (0, 1), (-1, 0), (0, -1)] {
                    let Some(candidate) = index.linear_at(i + di, j + dj) else {
                        continue;
                    };
                    if members.contains(&candidate) {
                        continue;
                    }
                    let score = volume + volumes[candidate];
                    if best.is_none_or(|(_, s)| score > s) {
                        best = Some((candidate, score));
                    }
                }
            }
            let Some((candidate, score)) = best else {
                break;
            };
            members.push(candidate);
            volume = score;
        }

        if volume < target {
            log::warn!(
                "Neighborhood of cell {} stops at volume {:.3e} below target {:.3e}",
                owner,
                volume,
                target
            );
        }
        neighborhoods.push(members);
    }

    let mut overlap: Vec<usize> = index
        .linear_to_cell
        .iter()
        .map(|c| match c {
            CellIndex::Cartesian(_) => 1,
            CellIndex::Cut(_) => 0,
        })
        .collect();
    for &cell in neighborhoods.iter().flatten() {
        overlap[cell] += 1;
    }

    log::debug!(
        "Neighborhoods: {} cut cells, largest has {} members",
        neighborhoods.len(),
        neighborhoods.iter().map(Vec::len).max().unwrap_or(0)
    );

    NeighborList { neighborhoods, overlap }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cut::{BackgroundGrid, Circle, ClosedCurve, CutMeshConfig};
    use std::sync::Arc;

    fn circle_mesh() -> CutMesh {
        let grid = BackgroundGrid::new([-1.0, 1.0], [-1.0, 1.0], [4, 4]).unwrap();
        let circle: Arc<dyn ClosedCurve> = Arc::new(Circle::new([0.0, 0.0], 0.49));
        CutMesh::new(grid, vec![circle], CutMeshConfig::with_order(2)).unwrap()
    }

    #[test]
    fn test_every_cut_cell_owns_one_neighborhood() {
        let mesh = circle_mesh();
        let list = compute_neighbor_list(&mesh, &RedistributionConfig::default());
        assert_eq!(list.neighborhoods.len(), mesh.index.cut_cells.len());
        for (owner, members) in mesh.index.cut_cells.iter().zip(&list.neighborhoods) {
            assert_eq!(members[0], *owner);
            let mut sorted = members.clone();
            sorted.sort_unstable();
            sorted.dedup();
            assert_eq!(sorted.len(), members.len(), "duplicate members {:?}", members);
        }
        for &c in &mesh.index.cut_cells {
            assert!(list.overlap[c] >= 1);
        }
        for &c in &mesh.index.cartesian_cells {
            assert!(list.overlap[c] >= 1);
        }
    }

    #[test]
    fn test_neighborhoods_reach_target_volume() {
        let mesh = circle_mesh();
        let config = RedistributionConfig::default();
        let list = compute_neighbor_list(&mesh, &config);
        let target = config.volume_threshold * mesh.grid.cell_volume();
        for members in &list.neighborhoods {
            let volume: f64 = members
                .iter()
                .map(|&m| mesh.cell_volume(mesh.index.linear_to_cell[m]))
                .sum();
            assert!(volume >= target, "volume {} below {}", volume, target);
        }
    }

    #[test]
    fn test_zero_threshold_keeps_cells_alone() {
        let mesh = circle_mesh();
        let config = RedistributionConfig { volume_threshold: 0.0 };
        let list = compute_neighbor_list(&mesh, &config);
        assert!(list.neighborhoods.iter().all(|n| n.len() == 1));
        assert!(list.overlap.iter().all(|&n| n == 1));
    }
}
