//! Reference element shapes and their vertex/face conventions.
//!
//! - Line: vertices r = -1, +1; faces are the two endpoints.
//! - Tri: vertices (-1,-1), (1,-1), (-1,1); faces [0,1], [1,2], [2,0].
//! - Quad: vertices counter-clockwise from (-1,-1); faces bottom, right,
//!   top, left = [0,1], [1,2], [2,3], [3,0].
//! - Hex: vertex i + 2j + 4k sits at (2i-1, 2j-1, 2k-1); faces r = -1,
//!   r = +1, s = -1, s = +1, t = -1, t = +1.

/// Supported reference element shapes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ElementShape {
    /// Interval [-1, 1]
    Line,
    /// Right triangle with legs on r = -1 and s = -1
    Tri,
    /// Bi-unit square
    Quad,
    /// Bi-unit cube
    Hex,
}

impl ElementShape {
    /// Spatial dimension.
    pub fn dim(self) -> usize {
        match self {
            ElementShape::Line => 1,
            ElementShape::Tri | ElementShape::Quad => 2,
            ElementShape::Hex => 3,
        }
    }

    /// Number of vertices per element.
    pub fn n_vertices(self) -> usize {
        match self {
            ElementShape::Line => 2,
            ElementShape::Tri => 3,
            ElementShape::Quad => 4,
            ElementShape::Hex => 8,
        }
    }

    /// Number of faces per element.
    pub fn n_faces(self) -> usize {
        match self {
            ElementShape::Line => 2,
            ElementShape::Tri => 3,
            ElementShape::Quad => 4,
            ElementShape::Hex => 6,
        }
    }

    /// Local vertex indices of each face.
    pub fn face_vertices(self) -> Vec<Vec<usize>> {
        match self {
            ElementShape::Line => vec![vec![0], vec![1]],
            ElementShape::Tri => vec![vec![0, 1], vec![1, 2], vec![2, 0]],
            ElementShape::Quad => vec![vec![0, 1], vec![1, 2], vec![2, 3], vec![3, 0]],
            ElementShape::Hex => vec![
                vec![0, 2, 4, 6],
                vec![1, 3, 5, 7],
                vec![0, 1, 4, 5],
                vec![2, 3, 6, 7],
                vec![0, 1, 2, 3],
                vec![4, 5, 6, 7],
            ],
        }
    }

    /// Reference vertex coordinates, one array per dimension.
    pub fn vertices(self) -> Vec<Vec<f64>> {
        match self {
            ElementShape::Line => vec![vec![-1.0, 1.0]],
            ElementShape::Tri => vec![vec![-1.0, 1.0, -1.0], vec![-1.0, -1.0, 1.0]],
            ElementShape::Quad => vec![vec![-1.0, 1.0, 1.0, -1.0], vec![-1.0, -1.0, 1.0, 1.0]],
            ElementShape::Hex => {
                let coord = |v: usize, bit: usize| if (v >> bit) & 1 == 1 { 1.0 } else { -1.0 };
                (0..3).map(|d| (0..8).map(|v| coord(v, d)).collect()).collect()
            }
        }
    }
}
