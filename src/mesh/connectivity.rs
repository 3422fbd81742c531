//! Face-to-face connectivity and face node maps.
//!
//! Faces are matched topologically: each face is keyed by its sorted
//! global vertex indices, all keys are sorted, and equal neighbours in the
//! sorted list are the two sides of an interior face.
//!
//! Face nodes are then matched geometrically. Face-node arrays have shape
//! (n_faces * nfp, K), so global face node `i = row + n_faces * nfp * e`.
//! Two nodes coincide when their L1 distance is below
//! `tol * (largest distance between the two faces' nodes)`.

use super::MeshError;
use faer::Mat;

/// What to do with a node on a matched face that has no coincident partner.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum NodeMatching {
    /// Return [`MeshError::UnmatchedFaceNode`]
    #[default]
    Strict,
    /// Log a warning and leave the node mapped to itself
    Lenient,
}

/// Configuration for face node matching.
#[derive(Clone, Debug)]
pub struct ConnectivityConfig {
    /// Relative tolerance for coincident face nodes
    pub node_tolerance: f64,
    /// Policy for unmatched nodes on matched faces
    pub matching: NodeMatching,
}

impl Default for ConnectivityConfig {
    fn default() -> Self {
        Self {
            node_tolerance: 1e-10,
            matching: NodeMatching::Strict,
        }
    }
}

/// Face node connectivity.
#[derive(Clone, Debug, PartialEq)]
pub struct NodeMaps {
    /// Interior face node indices (identity)
    pub map_m: Vec<usize>,
    /// Exterior partner of each face node (itself on boundaries)
    pub map_p: Vec<usize>,
    /// Face nodes with no distinct partner
    pub map_b: Vec<usize>,
}

impl NodeMaps {
    /// Identity maps for `n` face nodes.
    pub fn identity(n: usize) -> Self {
        let map_m: Vec<usize> = (0..n).collect();
        Self {
            map_p: map_m.clone(),
            map_b: map_m.clone(),
            map_m,
        }
    }

    /// Recompute `map_b` from `map_p`.
    pub fn refresh_boundary(&mut self) {
        self.map_b = self
            .map_p
            .iter()
            .enumerate()
            .filter(|&(i, &p)| i == p)
            .map(|(i, _)| i)
            .collect();
    }
}

/// Match element faces by their vertex sets.
///
/// Returns FToF with global face index `f = local_face + n_faces * element`.
/// Unmatched faces map to themselves.
///
/// # Errors
/// [`MeshError::InvalidTopology`] if an element has the wrong number of
/// vertices, references a vertex outside `0..n_vertices`, or if more than
/// two faces share the same vertex set.
pub fn connect_mesh(
    etov: &[Vec<usize>],
    face_vertices: &[Vec<usize>],
    n_vertices: usize,
) -> Result<Vec<usize>, MeshError> {
    let n_faces = face_vertices.len();
    let vertices_per_element = face_vertices
        .iter()
        .flatten()
        .max()
        .map(|&v| v + 1)
        .ok_or_else(|| MeshError::topology("reference element has no face vertices"))?;

    let mut keys: Vec<(Vec<usize>, usize)> = Vec::with_capacity(etov.len() * n_faces);
    for (e, element) in etov.iter().enumerate() {
        if element.len() != vertices_per_element {
            return Err(MeshError::topology(format!(
                "element {} has {} vertices, expected {}",
                e,
                element.len(),
                vertices_per_element
            )));
        }
        if let Some(&v) = element.iter().find(|&&v| v >= n_vertices) {
            return Err(MeshError::topology(format!(
                "element {} references vertex {} but only {} vertices exist",
                e, v, n_vertices
            )));
        }
        for (local, face) in face_vertices.iter().enumerate() {
            let mut key: Vec<usize> = face.iter().map(|&lv| element[lv]).collect();
            key.sort_unstable();
            keys.push((key, local + n_faces * e));
        }
    }

    keys.sort();

    let mut ftof: Vec<usize> = (0..keys.len()).collect();
    let mut start = 0;
    while start < keys.len() {
        let mut end = start + 1;
        while end < keys.len() && keys[end].0 == keys[start].0 {
            end += 1;
        }
        match end - start {
            1 => {}
            2 => {
                let (f1, f2) = (keys[start].1, keys[start + 1].1);
                ftof[f1] = f2;
                ftof[f2] = f1;
            }
            n => {
                return Err(MeshError::topology(format!(
                    "{} faces share vertices {:?}",
                    n, keys[start].0
                )));
            }
        }
        start = end;
    }

    let n_boundary = ftof.iter().enumerate().filter(|&(f, &g)| f == g).count();
    log::debug!(
        "connect_mesh: {} elements, {} faces, {} boundary faces",
        etov.len(),
        ftof.len(),
        n_boundary
    );

    Ok(ftof)
}

/// Global index of node `row` of local face `face` on element `element`.
#[inline]
pub(crate) fn face_node_index(element: usize, face: usize, row: usize, nfp: usize, n_faces: usize) -> usize {
    row + face * nfp + n_faces * nfp * element
}

/// For each node on face `fa`, find its coincident node on face `fb`.
///
/// Distances are summed over `axes` only. Returns global indices of the
/// partners, `None` where no node is within tolerance.
pub(crate) fn match_face_nodes(
    xf: &[Mat<f64>],
    fa: usize,
    fb: usize,
    n_faces: usize,
    axes: &[usize],
    tolerance: f64,
) -> Vec<Option<usize>> {
    let n_rows = xf[0].nrows();
    let nfp = n_rows / n_faces;
    let at = |f: usize, row: usize| (f % n_faces * nfp + row, f / n_faces);

    let distance = |ra: usize, rb: usize| -> f64 {
        let (ia, ea) = at(fa, ra);
        let (ib, eb) = at(fb, rb);
        axes.iter().map(|&d| (xf[d][(ia, ea)] - xf[d][(ib, eb)]).abs()).sum()
    };

    let mut dist = vec![vec![0.0; nfp]; nfp];
    let mut reference = 0.0f64;
    for (ra, row) in dist.iter_mut().enumerate() {
        for (rb, d) in row.iter_mut().enumerate() {
            *d = distance(ra, rb);
            reference = reference.max(*d);
        }
    }
    // point faces have no spread, so coordinate magnitude sets the scale
    for &f in &[fa, fb] {
        for row in 0..nfp {
            let (i, e) = at(f, row);
            for &d in axes {
                reference = reference.max(xf[d][(i, e)].abs());
            }
        }
    }
    let threshold = if reference > 0.0 { tolerance * reference } else { tolerance };

    dist.iter()
        .map(|row| {
            row.iter()
                .enumerate()
                .filter(|&(_, &d)| d < threshold)
                .min_by(|a, b| a.1.total_cmp(b.1))
                .map(|(rb, _)| face_node_index(fb / n_faces, fb % n_faces, rb, nfp, n_faces))
        })
        .collect()
}

/// Build `mapM`, `mapP` and `mapB` from FToF and face node coordinates.
///
/// `xf[d]` has shape (n_faces * nfp, K). Node correspondence is purely
/// geometric, so face node orderings need not agree between neighbours.
///
/// # Errors
/// With [`NodeMatching::Strict`], [`MeshError::UnmatchedFaceNode`] for the
/// first node on a matched face with no coincident partner.
pub fn build_node_maps(
    ftof: &[usize],
    xf: &[Mat<f64>],
    n_faces: usize,
    config: &ConnectivityConfig,
) -> Result<NodeMaps, MeshError> {
    if xf.is_empty() || n_faces == 0 {
        return Err(MeshError::dimension(format!(
            "node maps need face coordinates and at least one face per element, got {} axes and {} faces",
            xf.len(),
            n_faces
        )));
    }
    let n_rows = xf[0].nrows();
    let k = xf[0].ncols();
    if xf.iter().any(|x| x.nrows() != n_rows || x.ncols() != k) {
        return Err(MeshError::dimension("face coordinate arrays differ in shape"));
    }
    if ftof.len() != n_faces * k {
        return Err(MeshError::dimension(format!(
            "FToF has {} entries but the mesh has {} faces",
            ftof.len(),
            n_faces * k
        )));
    }
    if n_rows % n_faces != 0 {
        return Err(MeshError::dimension(format!(
            "{} face node rows are not divisible by {} faces",
            n_rows, n_faces
        )));
    }
    let nfp = n_rows / n_faces;
    let axes: Vec<usize> = (0..xf.len()).collect();

    let mut maps = NodeMaps::identity(n_rows * k);
    for (f, &fp) in ftof.iter().enumerate() {
        if fp == f {
            continue;
        }
        let partners = match_face_nodes(xf, f, fp, n_faces, &axes, config.node_tolerance);
        for (row, partner) in partners.into_iter().enumerate() {
            let (element, face) = (f / n_faces, f % n_faces);
            let i = face_node_index(element, face, row, nfp, n_faces);
            match (partner, config.matching) {
                (Some(p), _) => maps.map_p[i] = p,
                (None, NodeMatching::Strict) => {
                    return Err(MeshError::UnmatchedFaceNode { element, face, node: row });
                }
                (None, NodeMatching::Lenient) => {
                    log::warn!(
                        "face node {} of face {} on element {} has no coincident partner; treating it as boundary",
                        row,
                        face,
                        element
                    );
                }
            }
        }
    }
    maps.refresh_boundary();

    log::debug!(
        "build_node_maps: {} face nodes, {} boundary nodes",
        maps.map_m.len(),
        maps.map_b.len()
    );
    Ok(maps)
}

#[cfg(test)]
mod tests {
    use super::*;

    const QUAD_FACES: [[usize; 2]; 4] = [[0, 1], [1, 2], [2, 3], [3, 0]];

    fn quad_faces() -> Vec<Vec<usize>> {
        QUAD_FACES.iter().map(|f| f.to_vec()).collect()
    }

    #[test]
    fn test_two_quads_share_one_face() {
        // 3---4---5
        // | 0 | 1 |
        // 0---1---2
        let etov = vec![vec![0, 1, 4, 3], vec![1, 2, 5, 4]];
        let ftof = connect_mesh(&etov, &quad_faces(), 6).unwrap();
        assert_eq!(ftof[1], 4 + 3, "right face of element 0 matches left face of element 1");
        assert_eq!(ftof[7], 1);
        for (f, &g) in ftof.iter().enumerate() {
            assert_eq!(ftof[g], f, "FToF must be symmetric");
        }
        assert_eq!(ftof.iter().enumerate().filter(|&(f, &g)| f == g).count(), 6);
    }

    #[test]
    fn test_invalid_topology_is_reported() {
        let faces = quad_faces();
        let out_of_range = connect_mesh(&[vec![0, 1, 2, 9]], &faces, 4);
        assert!(matches!(out_of_range, Err(MeshError::InvalidTopology(_))));

        let wrong_count = connect_mesh(&[vec![0, 1, 2]], &faces, 4);
        assert!(matches!(wrong_count, Err(MeshError::InvalidTopology(_))));

        // three line elements sharing vertex 1
        let line_faces = vec![vec![0], vec![1]];
        let branching = connect_mesh(&[vec![0, 1], vec![1, 2], vec![1, 3]], &line_faces, 4);
        assert!(matches!(branching, Err(MeshError::InvalidTopology(_))));
    }

    /// Two 1D "faces" with two nodes each, numbered in opposite directions.
    fn reversed_pair() -> (Vec<usize>, Vec<Mat<f64>>) {
        // one element per column, faces 0 and 1 with 2 nodes each
        let x = Mat::from_fn(4, 2, |i, e| match (e, i) {
            (0, 2) => 0.0,
            (0, 3) => 1.0,
            (1, 0) => 1.0,
            (1, 1) => 0.0,
            _ => 5.0 + (i + 4 * e) as f64,
        });
        let y = Mat::zeros(4, 2);
        // face 1 of element 0 matches face 0 of element 1
        (vec![0, 2, 1, 3], vec![x, y])
    }

    #[test]
    fn test_node_maps_handle_reversed_ordering() {
        let (ftof, xf) = reversed_pair();
        let maps = build_node_maps(&ftof, &xf, 2, &ConnectivityConfig::default()).unwrap();
        assert_eq!(maps.map_p[2], 5);
        assert_eq!(maps.map_p[3], 4);
        assert_eq!(maps.map_p[4], 3);
        for &i in &maps.map_m {
            assert_eq!(maps.map_p[maps.map_p[i]], i, "mapP must be an involution");
        }
        assert_eq!(maps.map_b, vec![0, 1, 6, 7]);
    }

    #[test]
    fn test_unmatched_nodes_strict_and_lenient() {
        let (ftof, mut xf) = reversed_pair();
        xf[1][(1, 1)] = 0.5;

        let strict = build_node_maps(&ftof, &xf, 2, &ConnectivityConfig::default());
        assert!(matches!(strict, Err(MeshError::UnmatchedFaceNode { element: 0, face: 1, .. })));

        let lenient = ConnectivityConfig {
            matching: NodeMatching::Lenient,
            ..Default::default()
        };
        let maps = build_node_maps(&ftof, &xf, 2, &lenient).unwrap();
        assert_eq!(maps.map_p[2], 2, "unmatched node falls back to itself");
        assert_eq!(maps.map_p[3], 4);
    }

    #[test]
    fn test_point_faces_on_a_line() {
        // 1D faces hold one node, so matched faces have zero spread
        let xf = Mat::from_fn(2, 3, |i, e| 0.5 * (e + i) as f64 - 0.25);
        let ftof = vec![0, 2, 1, 4, 3, 5];
        let maps = build_node_maps(&ftof, &[xf], 2, &ConnectivityConfig::default()).unwrap();
        assert_eq!(maps.map_p, vec![0, 2, 1, 4, 3, 5]);
        assert_eq!(maps.map_b, vec![0, 5]);

        // an interface at the origin is matched exactly
        let at_origin = Mat::from_fn(2, 2, |i, e| (e + i) as f64 - 1.0);
        let maps = build_node_maps(&[0, 2, 1, 3], &[at_origin], 2, &ConnectivityConfig::default()).unwrap();
        assert_eq!(maps.map_p, vec![0, 2, 1, 3]);
    }

    #[test]
    fn test_malformed_inputs_are_dimension_errors() {
        let config = ConnectivityConfig::default();
        assert!(matches!(
            build_node_maps(&[], &[], 2, &config),
            Err(MeshError::DimensionMismatch(_))
        ));
        let xf = Mat::zeros(2, 1);
        assert!(matches!(
            build_node_maps(&[], &[xf.clone()], 0, &config),
            Err(MeshError::DimensionMismatch(_))
        ));
        assert!(matches!(
            build_node_maps(&[0, 1], &[xf, Mat::zeros(3, 1)], 2, &config),
            Err(MeshError::DimensionMismatch(_))
        ));
    }
}
