//! Periodic boundary identification.
//!
//! Boundary faces (FToF[f] == f) on the min and max side of a periodic
//! axis are paired when their centroids agree in every other coordinate.
//! Axes are processed in order, so later axes only see faces that earlier
//! axes left unpaired.

use super::MeshError;
use super::connectivity::{NodeMaps, face_node_index, match_face_nodes};
use faer::Mat;

/// Tolerances for periodic face pairing.
#[derive(Clone, Debug)]
pub struct PeriodicityConfig {
    /// Centroid tolerance, relative to the domain extent along the axis
    pub centroid_tolerance: f64,
    /// Face node tolerance, relative to the largest face node distance
    pub node_tolerance: f64,
}

impl Default for PeriodicityConfig {
    fn default() -> Self {
        Self {
            centroid_tolerance: 1e-12,
            node_tolerance: 1e-10,
        }
    }
}

/// Pair periodic boundary faces along every enabled axis.
///
/// Returns the updated FToF and node maps; the inputs are left untouched.
///
/// # Errors
/// - [`MeshError::PeriodicityMismatch`] if the boundary face centroids do
///   not span the face node extent along an enabled axis
/// - [`MeshError::UnmatchedFaceNode`] if paired faces have nodes without
///   a periodic partner
pub fn make_periodic(
    ftof: &[usize],
    maps: &NodeMaps,
    xf: &[Mat<f64>],
    n_faces: usize,
    is_periodic: &[bool],
    config: &PeriodicityConfig,
) -> Result<(Vec<usize>, NodeMaps), MeshError> {
    let dim = xf.len();
    if is_periodic.len() != dim {
        return Err(MeshError::dimension(format!(
            "{} periodicity flags for a {}D mesh",
            is_periodic.len(),
            dim
        )));
    }
    if n_faces == 0 || xf.iter().any(|x| x.nrows() % n_faces != 0) {
        return Err(MeshError::dimension(format!(
            "face node rows are not divisible by {} faces",
            n_faces
        )));
    }

    let mut ftof = ftof.to_vec();
    let mut maps = maps.clone();

    if dim == 1 {
        if is_periodic[0] {
            pair_line_ends(&mut ftof, &mut maps, &xf[0], n_faces)?;
        }
    } else {
        for axis in (0..dim).filter(|&a| is_periodic[a]) {
            pair_axis(&mut ftof, &mut maps, xf, n_faces, axis, config)?;
        }
    }

    maps.refresh_boundary();
    log::debug!(
        "make_periodic: axes {:?}, {} boundary nodes remain",
        is_periodic,
        maps.map_b.len()
    );
    Ok((ftof, maps))
}

/// 1D: connect the leftmost and rightmost boundary points directly.
fn pair_line_ends(
    ftof: &mut [usize],
    maps: &mut NodeMaps,
    xf: &Mat<f64>,
    n_faces: usize,
) -> Result<(), MeshError> {
    let boundary: Vec<usize> = (0..ftof.len()).filter(|&f| ftof[f] == f).collect();
    let coord = |f: usize| xf[(f % n_faces, f / n_faces)];

    let left = boundary.iter().copied().min_by(|&a, &b| coord(a).total_cmp(&coord(b)));
    let right = boundary.iter().copied().max_by(|&a, &b| coord(a).total_cmp(&coord(b)));
    let (Some(left), Some(right)) = (left, right) else {
        return Err(MeshError::PeriodicityMismatch {
            axis: 0,
            centroid_extent: 0.0,
            domain_extent: extent(xf).1,
        });
    };
    if left == right {
        return Err(MeshError::topology("a periodic 1D mesh needs two boundary points"));
    }

    ftof[left] = right;
    ftof[right] = left;
    // one node per face: the global face node index equals the face index
    maps.map_p[left] = right;
    maps.map_p[right] = left;
    Ok(())
}

/// (min, max - min) over every entry.
fn extent(x: &Mat<f64>) -> (f64, f64) {
    let mut lo = f64::INFINITY;
    let mut hi = f64::NEG_INFINITY;
    for e in 0..x.ncols() {
        for i in 0..x.nrows() {
            lo = lo.min(x[(i, e)]);
            hi = hi.max(x[(i, e)]);
        }
    }
    (lo, hi - lo)
}

fn pair_axis(
    ftof: &mut [usize],
    maps: &mut NodeMaps,
    xf: &[Mat<f64>],
    n_faces: usize,
    axis: usize,
    config: &PeriodicityConfig,
) -> Result<(), MeshError> {
    let dim = xf.len();
    let nfp = xf[0].nrows() / n_faces;
    let boundary: Vec<usize> = (0..ftof.len()).filter(|&f| ftof[f] == f).collect();

    let centroids: Vec<Vec<f64>> = boundary
        .iter()
        .map(|&f| {
            let (e, local) = (f / n_faces, f % n_faces);
            (0..dim)
                .map(|d| (0..nfp).map(|row| xf[d][(local * nfp + row, e)]).sum::<f64>() / nfp as f64)
                .collect()
        })
        .collect();

    let (lo, domain_extent) = extent(&xf[axis]);
    let tol = config.centroid_tolerance * domain_extent;
    let centroid_extent = if centroids.is_empty() {
        0.0
    } else {
        let (c_lo, c_hi) = centroids
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(l, h), c| (l.min(c[axis]), h.max(c[axis])));
        c_hi - c_lo
    };
    if (centroid_extent - domain_extent).abs() > tol {
        return Err(MeshError::PeriodicityMismatch {
            axis,
            centroid_extent,
            domain_extent,
        });
    }

    let hi = lo + domain_extent;
    let min_side: Vec<usize> = (0..boundary.len())
        .filter(|&b| (centroids[b][axis] - lo).abs() < tol)
        .collect();
    let max_side: Vec<usize> = (0..boundary.len())
        .filter(|&b| (centroids[b][axis] - hi).abs() < tol)
        .collect();
    let others: Vec<usize> = (0..dim).filter(|&d| d != axis).collect();

    let mut paired = vec![false; max_side.len()];
    let mut n_pairs = 0;
    for &bm in &min_side {
        let partner = max_side.iter().enumerate().find(|&(slot, &bp)| {
            !paired[slot]
                && others
                    .iter()
                    .all(|&d| (centroids[bm][d] - centroids[bp][d]).abs() < tol)
        });
        let Some((slot, &bp)) = partner else {
            log::warn!(
                "periodic axis {}: boundary face {} has no partner on the opposite side",
                axis,
                boundary[bm]
            );
            continue;
        };
        paired[slot] = true;
        n_pairs += 1;

        let (f1, f2) = (boundary[bm], boundary[bp]);
        ftof[f1] = f2;
        ftof[f2] = f1;
        connect_face_nodes(maps, xf, f1, f2, n_faces, &others, config.node_tolerance)?;
        connect_face_nodes(maps, xf, f2, f1, n_faces, &others, config.node_tolerance)?;
    }

    log::debug!("periodic axis {}: paired {} face pairs", axis, n_pairs);
    Ok(())
}

fn connect_face_nodes(
    maps: &mut NodeMaps,
    xf: &[Mat<f64>],
    fa: usize,
    fb: usize,
    n_faces: usize,
    axes: &[usize],
    tolerance: f64,
) -> Result<(), MeshError> {
    let nfp = xf[0].nrows() / n_faces;
    let (element, face) = (fa / n_faces, fa % n_faces);
    for (row, partner) in match_face_nodes(xf, fa, fb, n_faces, axes, tolerance)
        .into_iter()
        .enumerate()
    {
        let Some(p) = partner else {
            return Err(MeshError::UnmatchedFaceNode { element, face, node: row });
        };
        maps.map_p[face_node_index(element, face, row, nfp, n_faces)] = p;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_ends_are_paired() {
        // three elements on [0, 3], faces store one node each
        let xf = Mat::from_fn(2, 3, |i, e| (e + i) as f64);
        let ftof = vec![0, 2, 1, 4, 3, 5];
        let mut maps = NodeMaps::identity(6);
        maps.map_p = ftof.clone();
        maps.refresh_boundary();

        let (ftof, maps) = make_periodic(&ftof, &maps, &[xf], 2, &[true], &PeriodicityConfig::default()).unwrap();
        assert_eq!(ftof[0], 5);
        assert_eq!(ftof[5], 0);
        assert!(maps.map_b.is_empty());
    }

    #[test]
    fn test_flag_count_must_match_dimension() {
        let xf = Mat::zeros(2, 1);
        let result = make_periodic(&[0, 1], &NodeMaps::identity(2), &[xf], 2, &[true, true], &Default::default());
        assert!(matches!(result, Err(MeshError::DimensionMismatch(_))));
    }
}
