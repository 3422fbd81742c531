//! Planar polygon triangulation behind a trait, plus edge flips.
//!
//! Ear clipping gives some triangulation of the cut polygon. Lawson flips
//! then move it to the constrained Delaunay triangulation, and a second
//! flip pass scores sub-triangles by how far a curved boundary edge bends
//! towards the opposite vertex, so that warped maps keep J > 0.

use super::CutCellError;
use super::curve::CutBoundary;
use earcutr::earcut;

/// Interior samples per curved segment when measuring its bend.
const CURVE_SAMPLES: usize = 8;

/// Upper bound on flip passes over all triangle pairs.
const MAX_FLIP_PASSES: usize = 64;

/// Relative area below which a flipped triangle counts as degenerate.
const FLIP_AREA_EPS: f64 = 1e-10;

/// Relative in-circle determinant below which points count as cocircular.
const IN_CIRCLE_EPS: f64 = 1e-12;

/// Smallest quality gain that justifies a curvature flip.
const QUALITY_GAIN: f64 = 1e-12;

/// Triangulates a simple polygon given by its vertices in order.
///
/// Returns triangles as vertex index triples. Orientation is not
/// guaranteed; callers re-orient as needed.
pub trait PlanarTriangulator: Send + Sync {
    /// Triangulate the polygon.
    fn triangulate(&self, vertices: &[[f64; 2]]) -> Result<Vec<[usize; 3]>, CutCellError>;
}

/// Ear-clipping triangulation from the `earcutr` crate, flipped to the
/// constrained Delaunay triangulation of the polygon.
#[derive(Clone, Copy, Debug, Default)]
pub struct EarcutTriangulator;

impl PlanarTriangulator for EarcutTriangulator {
    fn triangulate(&self, vertices: &[[f64; 2]]) -> Result<Vec<[usize; 3]>, CutCellError> {
        if vertices.len() < 3 {
            return Err(CutCellError::Triangulation(format!(
                "polygon has {} vertices",
                vertices.len()
            )));
        }
        let flattened: Vec<f64> = vertices.iter().flat_map(|v| [v[0], v[1]]).collect();
        let indices = earcut(&flattened, &[], 2).map_err(|e| CutCellError::Triangulation(format!("{:?}", e)))?;
        if indices.len() != 3 * (vertices.len() - 2) {
            return Err(CutCellError::Triangulation(format!(
                "expected {} triangles for {} vertices, got {}",
                vertices.len() - 2,
                vertices.len(),
                indices.len() / 3
            )));
        }
        let mut triangles: Vec<[usize; 3]> = indices.chunks(3).map(|t| [t[0], t[1], t[2]]).collect();
        delaunay_flips(&mut triangles, vertices);
        Ok(triangles)
    }
}

/// How a sub-triangle edge relates to the cut boundary.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) enum EdgeKind {
    /// Boundary segment traversed forward
    Forward(usize),
    /// Boundary segment traversed backward
    Reversed(usize),
    /// Interior chord
    Straight,
}

/// Classify the edge p → q of a polygon with `n` vertices.
pub(crate) fn classify_edge(p: usize, q: usize, n: usize) -> EdgeKind {
    if q == (p + 1) % n {
        EdgeKind::Forward(p)
    } else if p == (q + 1) % n {
        EdgeKind::Reversed(q)
    } else {
        EdgeKind::Straight
    }
}

/// Reorder a triangle counter-clockwise.
pub(crate) fn counter_clockwise(tri: [usize; 3], vertices: &[[f64; 2]]) -> [usize; 3] {
    let [a, b, c] = tri.map(|i| vertices[i]);
    if orient(a, b, c) < 0.0 { [tri[0], tri[2], tri[1]] } else { tri }
}

/// Twice the signed area of a, b, c.
fn orient(a: [f64; 2], b: [f64; 2], c: [f64; 2]) -> f64 {
    (b[0] - a[0]) * (c[1] - a[1]) - (c[0] - a[0]) * (b[1] - a[1])
}

fn squared_distance(a: [f64; 2], b: [f64; 2]) -> f64 {
    (a[0] - b[0]).powi(2) + (a[1] - b[1]).powi(2)
}

/// Positive if d lies inside the circumcircle of the counter-clockwise a, b, c.
fn in_circle(a: [f64; 2], b: [f64; 2], c: [f64; 2], d: [f64; 2]) -> f64 {
    let row = |p: [f64; 2]| {
        let (x, y) = (p[0] - d[0], p[1] - d[1]);
        [x, y, x * x + y * y]
    };
    let (ra, rb, rc) = (row(a), row(b), row(c));
    ra[0] * (rb[1] * rc[2] - rb[2] * rc[1]) - ra[1] * (rb[0] * rc[2] - rb[2] * rc[0])
        + ra[2] * (rb[0] * rc[1] - rb[1] * rc[0])
}

/// Vertex of `t` that is not in `other`.
fn apex(t: [usize; 3], other: [usize; 3]) -> Option<usize> {
    t.into_iter().find(|v| !other.contains(v))
}

/// Triangles across the other diagonal of the quadrilateral formed by
/// two triangles sharing an edge, if that quadrilateral is strictly convex.
fn flipped(t1: [usize; 3], t2: [usize; 3], vertices: &[[f64; 2]]) -> Option<[[usize; 3]; 2]> {
    let shared: Vec<usize> = t1.into_iter().filter(|v| t2.contains(v)).collect();
    if shared.len() != 2 {
        return None;
    }
    let (x, y) = (apex(t1, t2)?, apex(t2, t1)?);
    let (u, v) = (shared[0], shared[1]);
    let [pu, pv, px, py] = [u, v, x, y].map(|i| vertices[i]);

    let scale = [pv, px, py]
        .into_iter()
        .map(|p| squared_distance(pu, p))
        .fold(squared_distance(px, py), f64::max);
    let (ou, ov) = (orient(px, py, pu), orient(px, py, pv));
    let (ox, oy) = (orient(pu, pv, px), orient(pu, pv, py));

    // each diagonal must separate the other two vertices
    let convex = ou * ov < 0.0 && ox * oy < 0.0;
    if convex && ou.abs().min(ov.abs()) > FLIP_AREA_EPS * scale {
        Some([
            counter_clockwise([x, y, u], vertices),
            counter_clockwise([x, y, v], vertices),
        ])
    } else {
        None
    }
}

/// Flip shared edges while `improves(current, flipped)` holds.
///
/// Returns the number of flips.
fn flip_while<F>(triangles: &mut [[usize; 3]], vertices: &[[f64; 2]], mut improves: F) -> usize
where
    F: FnMut(&[[usize; 3]; 2], &[[usize; 3]; 2]) -> bool,
{
    let mut flips = 0;
    for _ in 0..MAX_FLIP_PASSES {
        let before = flips;
        for a in 0..triangles.len() {
            for b in (a + 1)..triangles.len() {
                let Some(candidate) = flipped(triangles[a], triangles[b], vertices) else {
                    continue;
                };
                if improves(&[triangles[a], triangles[b]], &candidate) {
                    triangles[a] = candidate[0];
                    triangles[b] = candidate[1];
                    flips += 1;
                }
            }
        }
        if flips == before {
            break;
        }
    }
    flips
}

/// Lawson flips towards the constrained Delaunay triangulation.
pub(crate) fn delaunay_flips(triangles: &mut [[usize; 3]], vertices: &[[f64; 2]]) -> usize {
    flip_while(triangles, vertices, |current, _| {
        let Some(d) = apex(current[1], current[0]).map(|i| vertices[i]) else {
            return false;
        };
        let [a, b, c] = counter_clockwise(current[0], vertices).map(|i| vertices[i]);
        let scale = [a, b, c].into_iter().map(|p| squared_distance(p, d)).fold(0.0, f64::max);
        in_circle(a, b, c, d) > IN_CIRCLE_EPS * scale * scale
    })
}

/// Flip until no flip raises the worst [`curved_quality`] of a pair.
pub(crate) fn curvature_flips(triangles: &mut [[usize; 3]], vertices: &[[f64; 2]], boundary: &CutBoundary) -> usize {
    if boundary.segments.len() != vertices.len() {
        return 0;
    }
    let worst = |pair: &[[usize; 3]; 2]| {
        pair.iter()
            .map(|&t| curved_quality(t, vertices, boundary))
            .fold(f64::INFINITY, f64::min)
    };
    let flips = flip_while(triangles, vertices, |current, candidate| {
        worst(candidate) > worst(current) + QUALITY_GAIN
    });
    if flips > 0 {
        log::debug!("curvature_flips: {} flips on a {}-gon", flips, vertices.len());
    }
    flips
}

/// Worst (h - d) / L over the curved boundary edges of a sub-triangle.
///
/// L is the chord length, h the height of the opposite vertex over the
/// chord and d how far the curve bends from the chord towards that
/// vertex. Non-positive values mean the curve reaches the vertex. A
/// triangle without curved edges scores +∞.
pub(crate) fn curved_quality(tri: [usize; 3], vertices: &[[f64; 2]], boundary: &CutBoundary) -> f64 {
    let n = vertices.len();
    let mut quality = f64::INFINITY;
    for corner in 0..3 {
        let (p, q, opposite) = (tri[corner], tri[(corner + 1) % 3], tri[(corner + 2) % 3]);
        let segment = match classify_edge(p, q, n) {
            EdgeKind::Forward(k) | EdgeKind::Reversed(k) => &boundary.segments[k],
            EdgeKind::Straight => continue,
        };
        if !segment.is_curved() {
            continue;
        }

        let (a, b, c) = (vertices[p], vertices[q], vertices[opposite]);
        let length = squared_distance(a, b).sqrt();
        if length == 0.0 {
            return f64::NEG_INFINITY;
        }
        // unit normal of the chord, towards the opposite vertex
        let side = if orient(a, b, c) < 0.0 { -1.0 } else { 1.0 };
        let normal = [-side * (b[1] - a[1]) / length, side * (b[0] - a[0]) / length];
        let along_normal = |x: [f64; 2]| (x[0] - a[0]) * normal[0] + (x[1] - a[1]) * normal[1];

        let height = along_normal(c);
        let bend = (1..=CURVE_SAMPLES)
            .map(|m| along_normal(segment.point(m as f64 / (CURVE_SAMPLES + 1) as f64)))
            .fold(0.0, f64::max);
        quality = quality.min((height - bend) / length);
    }
    quality
}
