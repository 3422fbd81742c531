//! Cell indexing for meshes that mix Cartesian and cut cells.
//!
//! Every active background cell has a linear index. A [`CellIndex`] tags
//! it with its kind and its position in the per-kind dense arrays, so
//! Cartesian data (a Quad `MeshData`) and cut-cell data can be stored
//! separately and still be addressed uniformly.

use std::fmt;

macro_rules! define_index {
    (
        $(#[$meta:meta])*
        $name:ident, $display_prefix:literal
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
        #[repr(transparent)]
        pub struct $name(usize);

        impl $name {
            /// Create a new index.
            #[inline]
            pub const fn new(index: usize) -> Self {
                Self(index)
            }

            /// Get the raw index value.
            #[inline]
            pub const fn get(self) -> usize {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}{}", $display_prefix, self.0)
            }
        }

        impl From<usize> for $name {
            #[inline]
            fn from(index: usize) -> Self {
                Self(index)
            }
        }

        impl From<$name> for usize {
            #[inline]
            fn from(idx: $name) -> usize {
                idx.0
            }
        }

        impl<T> std::ops::Index<$name> for Vec<T> {
            type Output = T;
            #[inline]
            fn index(&self, idx: $name) -> &T {
                &self[idx.0]
            }
        }
    };
}

define_index!(
    /// Column of a Cartesian cell in the Cartesian `MeshData`.
    CartesianIndex,
    "C"
);

define_index!(
    /// Position of a cut cell in the cut-cell arrays.
    CutIndex,
    "X"
);

/// A cell of a cut mesh, tagged by kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CellIndex {
    /// Uncut background cell
    Cartesian(CartesianIndex),
    /// Background cell clipped by an embedded curve
    Cut(CutIndex),
}

impl fmt::Display for CellIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellIndex::Cartesian(c) => write!(f, "{}", c),
            CellIndex::Cut(c) => write!(f, "{}", c),
        }
    }
}

/// Lookup tables between grid positions, linear indices and tagged indices.
///
/// Linear indices enumerate active cells with the x index fastest.
#[derive(Clone, Debug)]
pub struct CellIndexMap {
    /// Background grid size (nx, ny)
    pub grid: [usize; 2],
    /// Linear index of grid cell (i, j) at `i + nx * j`; `None` if removed
    pub cartesian_to_linear: Vec<Option<usize>>,
    /// Grid position of each linear cell
    pub linear_to_cartesian: Vec<(usize, usize)>,
    /// Tagged index of each linear cell
    pub linear_to_cell: Vec<CellIndex>,
    /// Linear index of each Cartesian cell
    pub cartesian_cells: Vec<usize>,
    /// Linear index of each cut cell
    pub cut_cells: Vec<usize>,
}

/// Kind of a background cell before indexing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CellKind {
    /// Entirely outside every curve
    Cartesian,
    /// Crossed by a curve
    Cut,
    /// Entirely inside a curve
    Removed,
}

impl CellIndexMap {
    /// Build the tables from per-cell kinds stored at `i + nx * j`.
    pub fn new(grid: [usize; 2], kinds: &[CellKind]) -> Self {
        let mut map = Self {
            grid,
            cartesian_to_linear: vec![None; grid[0] * grid[1]],
            linear_to_cartesian: Vec::new(),
            linear_to_cell: Vec::new(),
            cartesian_cells: Vec::new(),
            cut_cells: Vec::new(),
        };

        for j in 0..grid[1] {
            for i in 0..grid[0] {
                let cell = match kinds[i + grid[0] * j] {
                    CellKind::Removed => continue,
                    CellKind::Cartesian => CellIndex::Cartesian(CartesianIndex::new(map.cartesian_cells.len())),
                    CellKind::Cut => CellIndex::Cut(CutIndex::new(map.cut_cells.len())),
                };
                let linear = map.linear_to_cell.len();
                match cell {
                    CellIndex::Cartesian(_) => map.cartesian_cells.push(linear),
                    CellIndex::Cut(_) => map.cut_cells.push(linear),
                }
                map.cartesian_to_linear[i + grid[0] * j] = Some(linear);
                map.linear_to_cartesian.push((i, j));
                map.linear_to_cell.push(cell);
            }
        }
        map
    }

    /// Number of active cells.
    #[inline]
    pub fn n_cells(&self) -> usize {
        self.linear_to_cell.len()
    }

    /// Linear index of grid cell (i, j), if active. Out-of-grid positions give `None`.
    pub fn linear_at(&self, i: isize, j: isize) -> Option<usize> {
        if i < 0 || j < 0 || i as usize >= self.grid[0] || j as usize >= self.grid[1] {
            return None;
        }
        self.cartesian_to_linear[i as usize + self.grid[0] * j as usize]
    }

    /// Linear index of a tagged cell.
    #[inline]
    pub fn linear(&self, cell: CellIndex) -> usize {
        match cell {
            CellIndex::Cartesian(c) => self.cartesian_cells[c],
            CellIndex::Cut(c) => self.cut_cells[c],
        }
    }
}
