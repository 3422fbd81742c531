//! Embedded closed curves and piecewise cut-cell boundaries.
//!
//! Curves are parametrized counter-clockwise over t ∈ [0, 1) and must
//! accept any real t (periodic extension). A cut cell boundary is a
//! counter-clockwise loop of straight and curved segments; segment k
//! covers the boundary parameter range [k, k+1], so the break-points
//! (`stop_pts`) are 0, 1, ..., n.

use std::f64::consts::PI;
use std::fmt;
use std::sync::Arc;

/// A closed, counter-clockwise parametrized curve in the plane.
pub trait ClosedCurve: fmt::Debug + Send + Sync {
    /// Point at parameter t (periodic with period 1).
    fn point(&self, t: f64) -> [f64; 2];

    /// True if `p` lies strictly inside the curve.
    fn contains(&self, p: [f64; 2]) -> bool;

    /// Crossings with the segment a → b as (s, t): position a + s (b - a)
    /// with s ∈ [0, 1) and curve parameter t ∈ [0, 1).
    fn segment_intersections(&self, a: [f64; 2], b: [f64; 2]) -> Vec<(f64, f64)>;
}

/// Circle with counter-clockwise parametrization starting at angle 0.
#[derive(Clone, Debug, PartialEq)]
pub struct Circle {
    /// Center (x, y)
    pub center: [f64; 2],
    /// Radius
    pub radius: f64,
}

impl Circle {
    /// Create a circle.
    pub fn new(center: [f64; 2], radius: f64) -> Self {
        Self { center, radius }
    }

    fn parameter_of(&self, p: [f64; 2]) -> f64 {
        let angle = (p[1] - self.center[1]).atan2(p[0] - self.center[0]);
        (angle / (2.0 * PI)).rem_euclid(1.0)
    }
}

impl ClosedCurve for Circle {
    fn point(&self, t: f64) -> [f64; 2] {
        let angle = 2.0 * PI * t;
        [
            self.center[0] + self.radius * angle.cos(),
            self.center[1] + self.radius * angle.sin(),
        ]
    }

    fn contains(&self, p: [f64; 2]) -> bool {
        let dx = p[0] - self.center[0];
        let dy = p[1] - self.center[1];
        dx * dx + dy * dy < self.radius * self.radius
    }

    fn segment_intersections(&self, a: [f64; 2], b: [f64; 2]) -> Vec<(f64, f64)> {
        // |a + s d - c|² = R²
        let d = [b[0] - a[0], b[1] - a[1]];
        let f = [a[0] - self.center[0], a[1] - self.center[1]];
        let qa = d[0] * d[0] + d[1] * d[1];
        let qb = 2.0 * (f[0] * d[0] + f[1] * d[1]);
        let qc = f[0] * f[0] + f[1] * f[1] - self.radius * self.radius;
        let disc = qb * qb - 4.0 * qa * qc;
        if qa == 0.0 || disc <= 0.0 {
            return Vec::new();
        }

        let root = disc.sqrt();
        [(-qb - root) / (2.0 * qa), (-qb + root) / (2.0 * qa)]
            .into_iter()
            .filter(|s| (0.0..1.0).contains(s))
            .map(|s| {
                let p = [a[0] + s * d[0], a[1] + s * d[1]];
                (s, self.parameter_of(p))
            })
            .collect()
    }
}

/// One piece of a cut cell boundary.
#[derive(Clone, Debug)]
pub enum BoundarySegment {
    /// Straight segment along a background cell edge
    Line { start: [f64; 2], end: [f64; 2] },
    /// Piece of an embedded curve between two parameters (t_end may be
    /// below t_start when the curve is followed clockwise)
    Curve {
        curve: Arc<dyn ClosedCurve>,
        t_start: f64,
        t_end: f64,
    },
}

impl BoundarySegment {
    /// Point at local parameter u ∈ [0, 1].
    pub fn point(&self, u: f64) -> [f64; 2] {
        match self {
            BoundarySegment::Line { start, end } => [
                start[0] + u * (end[0] - start[0]),
                start[1] + u * (end[1] - start[1]),
            ],
            BoundarySegment::Curve { curve, t_start, t_end } => curve.point(t_start + u * (t_end - t_start)),
        }
    }

    /// True for curved pieces.
    #[inline]
    pub fn is_curved(&self) -> bool {
        matches!(self, BoundarySegment::Curve { .. })
    }
}

/// Closed counter-clockwise boundary of a cut cell.
#[derive(Clone, Debug)]
pub struct CutBoundary {
    /// Segments in counter-clockwise order; segment k spans [k, k+1]
    pub segments: Vec<BoundarySegment>,
}

impl CutBoundary {
    /// Number of segments n.
    #[inline]
    pub fn n_segments(&self) -> usize {
        self.segments.len()
    }

    /// Break-points 0, 1, ..., n.
    pub fn stop_pts(&self) -> Vec<f64> {
        (0..=self.segments.len()).map(|k| k as f64).collect()
    }

    /// Boundary point at parameter t ∈ [0, n].
    pub fn point(&self, t: f64) -> [f64; 2] {
        let n = self.segments.len();
        let k = (t.floor() as usize).min(n - 1);
        self.segments[k].point(t - k as f64)
    }

    /// Polygon vertices: the boundary at break-points 0..n-1.
    pub fn vertices(&self) -> Vec<[f64; 2]> {
        self.segments.iter().map(|s| s.point(0.0)).collect()
    }

    /// Signed area of the vertex polygon.
    pub fn polygon_area(&self) -> f64 {
        let v = self.vertices();
        let n = v.len();
        0.5 * (0..n)
            .map(|i| {
                let (a, b) = (v[i], v[(i + 1) % n]);
                a[0] * b[1] - b[0] * a[1]
            })
            .sum::<f64>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_circle_intersections() {
        let circle = Circle::new([0.0, 0.0], 0.5);
        let hits = circle.segment_intersections([0.0, 1.0], [0.0, -1.0]);
        assert_eq!(hits.len(), 2);
        // first hit at y = 0.5, t = 1/4
        assert!((hits[0].0 - 0.25).abs() < 1e-14);
        assert!((hits[0].1 - 0.25).abs() < 1e-14);
        assert!((hits[1].1 - 0.75).abs() < 1e-14);

        assert!(circle.segment_intersections([1.0, 1.0], [2.0, 1.0]).is_empty());
        assert!(circle.contains([0.1, 0.1]));
        assert!(!circle.contains([0.5, 0.5]));
    }

    #[test]
    fn test_boundary_parametrization() {
        let circle: Arc<dyn ClosedCurve> = Arc::new(Circle::new([0.0, 0.0], 1.0));
        // quarter disk: two radii and an arc followed counter-clockwise
        let boundary = CutBoundary {
            segments: vec![
                BoundarySegment::Line { start: [0.0, 0.0], end: [1.0, 0.0] },
                BoundarySegment::Curve { curve: circle, t_start: 0.0, t_end: 0.25 },
                BoundarySegment::Line { start: [0.0, 1.0], end: [0.0, 0.0] },
            ],
        };
        assert_eq!(boundary.stop_pts(), vec![0.0, 1.0, 2.0, 3.0]);
        let mid_arc = boundary.point(1.5);
        let expected = (PI / 4.0).cos();
        assert!((mid_arc[0] - expected).abs() < 1e-14 && (mid_arc[1] - expected).abs() < 1e-14);
        assert!((boundary.point(3.0)[1]).abs() < 1e-14);
        assert!((boundary.polygon_area() - 0.5).abs() < 1e-14);
    }
}
