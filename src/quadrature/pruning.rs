//! Caratheodory pruning of non-negative quadrature rules.
//!
//! Given V (M × P, basis functions at M points) and positive weights w,
//! find at most P points carrying non-negative weights with the same
//! moments Vᵀw. Each step removes one point:
//!
//! 1. QR-factorize V[active, :] (full Q)
//! 2. The last column k of Q is orthogonal to every column of V[active, :],
//!    so w - α k keeps the moments for any α
//! 3. Ratio test: α₊ = min w_i / k_i over k_i > 0, α₋ = max w_i / k_i over
//!    k_i < 0; take the one of smaller magnitude, which zeroes one weight
//!    and keeps the rest non-negative

use faer::Mat;
use thiserror::Error;

/// Error type for quadrature pruning.
#[derive(Debug, Error)]
pub enum PruningError {
    /// The kernel direction has no usable entries.
    #[error("Degenerate kernel direction at pruning step {step}: ratio test is empty")]
    DegenerateKernel { step: usize },

    /// Weights and moment matrix disagree in size.
    #[error("Dimension mismatch: {0}")]
    DimensionMismatch(String),

    /// A weight is negative or not a number.
    #[error("Weight {weight} at point {index} is not non-negative")]
    NegativeWeight { index: usize, weight: f64 },
}

/// A pruned quadrature rule: kept point indices (ascending) and weights.
#[derive(Clone, Debug)]
pub struct PrunedQuadrature {
    /// Indices of the kept points in the original rule
    pub indices: Vec<usize>,
    /// Weights of the kept points
    pub weights: Vec<f64>,
}

impl PrunedQuadrature {
    /// Number of kept points.
    #[inline]
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    /// True if no point was kept.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Gather values at the kept points.
    pub fn select(&self, values: &[f64]) -> Vec<f64> {
        self.indices.iter().map(|&i| values[i]).collect()
    }
}

/// Relative size below which kernel entries are treated as zero.
const KERNEL_ZERO: f64 = 1e-14;

/// Negative weights within this multiple of eps * max |w| are round-off.
const WEIGHT_ROUNDOFF: f64 = 64.0;

/// Reduce the rule (rows of `v`, weights `w`) to at most `v.ncols()` points.
///
/// If the rule already has at most P points it is returned unchanged.
///
/// # Errors
/// - [`PruningError::DimensionMismatch`] if `w.len() != v.nrows()`
/// - [`PruningError::NegativeWeight`] if an input weight is negative or NaN
/// - [`PruningError::DegenerateKernel`] if a kernel direction is numerically
///   zero or not finite
pub fn caratheodory_pruning(v: &Mat<f64>, w: &[f64]) -> Result<PrunedQuadrature, PruningError> {
    let (m, p) = (v.nrows(), v.ncols());
    if w.len() != m {
        return Err(PruningError::DimensionMismatch(format!(
            "{} weights for a moment matrix with {} rows",
            w.len(),
            m
        )));
    }
    if let Some((index, &weight)) = w.iter().enumerate().find(|&(_, &wi)| wi < 0.0 || wi.is_nan()) {
        return Err(PruningError::NegativeWeight { index, weight });
    }
    if m <= p {
        return Ok(PrunedQuadrature {
            indices: (0..m).collect(),
            weights: w.to_vec(),
        });
    }

    let mut active: Vec<usize> = (0..m).collect();
    let mut weights = w.to_vec();
    let roundoff = WEIGHT_ROUNDOFF * f64::EPSILON * w.iter().fold(0.0f64, |acc, wi| acc.max(*wi));

    for step in 0..(m - p) {
        let sub = Mat::from_fn(active.len(), p, |i, j| v[(active[i], j)]);
        let q = sub.as_ref().qr().compute_Q();
        let last = q.ncols() - 1;
        let kernel: Vec<f64> = (0..active.len()).map(|i| q[(i, last)]).collect();

        let scale = kernel.iter().fold(0.0f64, |acc, k| acc.max(k.abs()));
        if !scale.is_finite() || kernel.iter().any(|k| !k.is_finite()) {
            return Err(PruningError::DegenerateKernel { step });
        }
        let cutoff = KERNEL_ZERO * scale;

        // (ratio, position in active)
        let mut plus: Option<(f64, usize)> = None;
        let mut minus: Option<(f64, usize)> = None;
        for (pos, &k) in kernel.iter().enumerate() {
            let ratio = weights[active[pos]] / k;
            if k > cutoff {
                if plus.is_none_or(|(best, _)| ratio < best) {
                    plus = Some((ratio, pos));
                }
            } else if k < -cutoff && minus.is_none_or(|(best, _)| ratio > best) {
                minus = Some((ratio, pos));
            }
        }

        let (alpha, drop) = match (plus, minus) {
            (Some(a), Some(b)) => {
                if a.0.abs() < b.0.abs() {
                    a
                } else {
                    b
                }
            }
            (Some(a), None) => a,
            (None, Some(b)) => b,
            (None, None) => return Err(PruningError::DegenerateKernel { step }),
        };

        for (pos, &k) in kernel.iter().enumerate() {
            let index = active[pos];
            let wi = &mut weights[index];
            *wi -= alpha * k;
            if *wi < 0.0 {
                // entries skipped by the ratio test only pick up kernel noise
                if *wi < -roundoff && k.abs() > cutoff {
                    return Err(PruningError::NegativeWeight { index, weight: *wi });
                }
                *wi = 0.0;
            }
        }
        weights[active[drop]] = 0.0;
        active.remove(drop);
    }

    log::debug!("caratheodory_pruning: {} -> {} points", m, active.len());

    Ok(PrunedQuadrature {
        weights: active.iter().map(|&i| weights[i]).collect(),
        indices: active,
    })
}
