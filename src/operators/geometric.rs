//! Geometric factors for mapped elements in 1D, 2D and 3D.
//!
//! With A[i][j] = ∂x_i/∂r_j computed by applying the nodal
//! differentiation matrices to the physical coordinates, the
//! Jacobian-scaled metric terms are the adjugate of A:
//!
//! J ∂r_i/∂x_j = adj(A)[i][j],  J = det(A)
//!
//! 2D: rxJ = y_s, sxJ = -y_r, ryJ = -x_s, syJ = x_r.
//! 3D uses the cyclic cofactor formula. Scaled terms stay finite where
//! J → 0.
//!
//! Normals are obtained by interpolating the scaled metric to face points
//! and contracting with the reference normals:
//!
//! nJ_j = Σ_i n̂_i (J ∂r_i/∂x_j),  sJ = |nJ|,  n = nJ / sJ

use super::dense::matmul;
use crate::mesh::MeshError;
use faer::Mat;

/// Jacobian-scaled metric terms and Jacobian at every node of every element.
#[derive(Clone)]
pub struct GeometricFactors {
    /// rstxyz_j[i][j][(node, element)] = J ∂r_i/∂x_j
    pub rstxyz_j: Vec<Vec<Mat<f64>>>,

    /// Jacobian determinant, shape (n_points, K)
    pub j: Mat<f64>,
}

impl GeometricFactors {
    /// Spatial dimension.
    #[inline]
    pub fn dim(&self) -> usize {
        self.rstxyz_j.len()
    }

    /// Number of elements.
    #[inline]
    pub fn n_elements(&self) -> usize {
        self.j.ncols()
    }

    /// Interpolate every field to another point set (e.g. Vq or Vf).
    pub fn interpolate(&self, interp: &Mat<f64>) -> Self {
        Self {
            rstxyz_j: self
                .rstxyz_j
                .iter()
                .map(|row| row.iter().map(|m| matmul(interp, m)).collect())
                .collect(),
            j: matmul(interp, &self.j),
        }
    }
}

/// Scaled and unit outward normals at face points.
#[derive(Clone)]
pub struct FaceNormals {
    /// Scaled normals nJ per physical direction, shape (n_face_points, K)
    pub scaled: Vec<Mat<f64>>,
    /// Unit outward normals per physical direction
    pub unit: Vec<Mat<f64>>,
    /// Face Jacobian sJ = |nJ|
    pub s_j: Mat<f64>,
}

/// Compute scaled metric terms and J from nodal coordinates.
///
/// `x[i]` holds physical coordinate i with shape (Np, K) and `d[j]` is the
/// nodal differentiation matrix in reference direction j.
///
/// # Errors
/// [`MeshError::DimensionMismatch`] unless there are 1, 2 or 3 coordinate
/// arrays of equal shape and one Np x Np matrix per coordinate.
pub fn geometric_factors(x: &[Mat<f64>], d: &[Mat<f64>]) -> Result<GeometricFactors, MeshError> {
    let dim = x.len();
    if !(1..=3).contains(&dim) {
        return Err(MeshError::dimension(format!(
            "geometric factors are defined for 1, 2 or 3 dimensions, got {}",
            dim
        )));
    }
    if d.len() != dim {
        return Err(MeshError::dimension(format!(
            "{} differentiation matrices for {} coordinates",
            d.len(),
            dim
        )));
    }
    let (np, k) = (x[0].nrows(), x[0].ncols());
    if x.iter().any(|xi| xi.nrows() != np || xi.ncols() != k) {
        return Err(MeshError::dimension("coordinate arrays differ in shape"));
    }
    if d.iter().any(|dj| dj.nrows() != np || dj.ncols() != np) {
        return Err(MeshError::dimension(format!(
            "differentiation matrices must be {} x {}",
            np, np
        )));
    }

    // a[i][j] = ∂x_i/∂r_j
    let a: Vec<Vec<Mat<f64>>> = x
        .iter()
        .map(|xi| d.iter().map(|dj| matmul(dj, xi)).collect())
        .collect();

    let geo = match dim {
        1 => GeometricFactors {
            rstxyz_j: vec![vec![Mat::from_fn(np, k, |_, _| 1.0)]],
            j: a[0][0].clone(),
        },
        2 => {
            let (xr, xs, yr, ys) = (&a[0][0], &a[0][1], &a[1][0], &a[1][1]);
            let rx_j = ys.clone();
            let ry_j = Mat::from_fn(np, k, |i, e| -xs[(i, e)]);
            let sx_j = Mat::from_fn(np, k, |i, e| -yr[(i, e)]);
            let sy_j = xr.clone();
            let j = Mat::from_fn(np, k, |i, e| xr[(i, e)] * ys[(i, e)] - xs[(i, e)] * yr[(i, e)]);
            GeometricFactors {
                rstxyz_j: vec![vec![rx_j, ry_j], vec![sx_j, sy_j]],
                j,
            }
        }
        _ => {
            let cofactor = |i: usize, j: usize| {
                let (j1, j2) = ((j + 1) % 3, (j + 2) % 3);
                let (i1, i2) = ((i + 1) % 3, (i + 2) % 3);
                Mat::from_fn(np, k, |p, e| {
                    a[j1][i1][(p, e)] * a[j2][i2][(p, e)] - a[j1][i2][(p, e)] * a[j2][i1][(p, e)]
                })
            };
            let rstxyz_j: Vec<Vec<Mat<f64>>> =
                (0..3).map(|i| (0..3).map(|j| cofactor(i, j)).collect()).collect();
            let j = Mat::from_fn(np, k, |p, e| (0..3).map(|c| a[0][c][(p, e)] * rstxyz_j[c][0][(p, e)]).sum());
            GeometricFactors { rstxyz_j, j }
        }
    };
    Ok(geo)
}

/// Compute outward normals and face Jacobians.
///
/// `vf` interpolates nodal values to face points; `reference_normals[i]`
/// holds the scaled reference normal component n̂_i at each face point.
///
/// # Errors
/// [`MeshError::DimensionMismatch`] if `vf` does not act on the element
/// nodes or a reference normal component is missing.
pub fn compute_normals(
    geo: &GeometricFactors,
    vf: &Mat<f64>,
    reference_normals: &[Vec<f64>],
) -> Result<FaceNormals, MeshError> {
    let dim = geo.dim();
    let (nf, k) = (vf.nrows(), geo.n_elements());
    if vf.ncols() != geo.j.nrows() {
        return Err(MeshError::dimension(format!(
            "face interpolation acts on {} nodes, geometry has {}",
            vf.ncols(),
            geo.j.nrows()
        )));
    }
    if reference_normals.len() != dim || reference_normals.iter().any(|n| n.len() != nf) {
        return Err(MeshError::dimension(format!(
            "expected {} reference normal components with {} face points each",
            dim, nf
        )));
    }
    let at_faces = geo.interpolate(vf);

    let scaled: Vec<Mat<f64>> = (0..dim)
        .map(|j| {
            Mat::from_fn(nf, k, |p, e| {
                (0..dim)
                    .map(|i| reference_normals[i][p] * at_faces.rstxyz_j[i][j][(p, e)])
                    .sum()
            })
        })
        .collect();

    let s_j = Mat::from_fn(nf, k, |p, e| scaled.iter().map(|n| n[(p, e)].powi(2)).sum::<f64>().sqrt());
    let unit = scaled
        .iter()
        .map(|n| Mat::from_fn(nf, k, |p, e| n[(p, e)] / s_j[(p, e)]))
        .collect();

    Ok(FaceNormals { scaled, unit, s_j })
}
