//! Small dense linear algebra helpers on `faer::Mat`.
//!
//! Operator matrices in this crate are small (tens to a few hundred rows),
//! so products are written as plain loops and all solves go through a
//! partially pivoted LU factorization. Shape mismatches are programming
//! errors here and panic, as in faer itself.

use faer::{Mat, linalg::solvers::Solve};

/// C = A * B
pub fn matmul(a: &Mat<f64>, b: &Mat<f64>) -> Mat<f64> {
    assert_eq!(a.ncols(), b.nrows(), "matmul: inner dimensions differ");
    let (m, n, p) = (a.nrows(), b.ncols(), a.ncols());
    let mut c = Mat::zeros(m, n);
    for j in 0..n {
        for k in 0..p {
            let b_kj = b[(k, j)];
            if b_kj == 0.0 {
                continue;
            }
            for i in 0..m {
                c[(i, j)] += a[(i, k)] * b_kj;
            }
        }
    }
    c
}

/// y = A * x
pub fn matvec(a: &Mat<f64>, x: &[f64]) -> Vec<f64> {
    assert_eq!(a.ncols(), x.len(), "matvec: dimension mismatch");
    let mut y = vec![0.0; a.nrows()];
    for (j, &x_j) in x.iter().enumerate() {
        for (i, y_i) in y.iter_mut().enumerate() {
            *y_i += a[(i, j)] * x_j;
        }
    }
    y
}

/// Aᵀ as an owned matrix.
pub fn transpose(a: &Mat<f64>) -> Mat<f64> {
    Mat::from_fn(a.ncols(), a.nrows(), |i, j| a[(j, i)])
}

/// Solve A X = B with a partially pivoted LU factorization of A.
pub fn solve(a: &Mat<f64>, b: &Mat<f64>) -> Mat<f64> {
    assert_eq!(a.nrows(), a.ncols(), "solve: matrix must be square");
    assert_eq!(a.nrows(), b.nrows(), "solve: right-hand side has wrong size");
    let lu = a.as_ref().partial_piv_lu();
    lu.solve(b)
}

/// X = B A⁻¹, computed as (A⁻ᵀ Bᵀ)ᵀ.
///
/// This is the shape of every nodal operator built from a Vandermonde
/// matrix: Dr = Vr V⁻¹, Vq = V(rq) V⁻¹.
pub fn right_solve(b: &Mat<f64>, a: &Mat<f64>) -> Mat<f64> {
    transpose(&solve(&transpose(a), &transpose(b)))
}

/// A⁻¹, column by column.
pub fn invert(a: &Mat<f64>) -> Mat<f64> {
    solve(a, &Mat::identity(a.nrows(), a.ncols()))
}

/// Gather the given rows of A into a new matrix.
pub fn select_rows(a: &Mat<f64>, rows: &[usize]) -> Mat<f64> {
    Mat::from_fn(rows.len(), a.ncols(), |i, j| a[(rows[i], j)])
}

/// Weighted Gram matrix Aᵀ diag(w) B.
///
/// With A = B = V evaluated at quadrature points this is the mass matrix.
pub fn weighted_gram(a: &Mat<f64>, w: &[f64], b: &Mat<f64>) -> Mat<f64> {
    assert_eq!(a.nrows(), w.len(), "weighted_gram: weight length mismatch");
    assert_eq!(b.nrows(), w.len(), "weighted_gram: weight length mismatch");
    let mut g = Mat::zeros(a.ncols(), b.ncols());
    for (q, &w_q) in w.iter().enumerate() {
        for j in 0..b.ncols() {
            let wb = w_q * b[(q, j)];
            for i in 0..a.ncols() {
                g[(i, j)] += a[(q, i)] * wb;
            }
        }
    }
    g
}

/// True if no entry is NaN or infinite.
pub fn is_finite(a: &Mat<f64>) -> bool {
    (0..a.ncols()).all(|j| (0..a.nrows()).all(|i| a[(i, j)].is_finite()))
}

/// Column `j` copied into a `Vec`.
pub fn column(a: &Mat<f64>, j: usize) -> Vec<f64> {
    (0..a.nrows()).map(|i| a[(i, j)]).collect()
}
