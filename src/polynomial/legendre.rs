//! Legendre polynomial evaluation.
//!
//! Legendre polynomials P_n(x) are orthogonal on [-1, 1] with weight 1:
//! ∫_{-1}^{1} P_m(x) P_n(x) dx = 2/(2n+1) δ_{mn}

/// Evaluate Legendre polynomial P_n(x) using three-term recurrence.
///
/// The recurrence relation is:
/// P_0(x) = 1
/// P_1(x) = x
/// (n+1) P_{n+1}(x) = (2n+1) x P_n(x) - n P_{n-1}(x)
pub fn legendre(n: usize, x: f64) -> f64 {
    legendre_and_derivative(n, x).0
}

/// Evaluate both P_n(x) and P'_n(x) with one pass of the recurrence.
///
/// The derivative uses P'_n(x) = n (x P_n(x) - P_{n-1}(x)) / (x² - 1) in the
/// interior and the closed forms P'_n(±1) = (±1)^{n+1} n(n+1)/2 at the ends.
pub fn legendre_and_derivative(n: usize, x: f64) -> (f64, f64) {
    if n == 0 {
        return (1.0, 0.0);
    }
    if n == 1 {
        return (x, 1.0);
    }

    let mut p_prev = 1.0; // P_0
    let mut p_curr = x; // P_1

    for k in 1..n {
        let p_next = ((2 * k + 1) as f64 * x * p_curr - k as f64 * p_prev) / (k + 1) as f64;
        p_prev = p_curr;
        p_curr = p_next;
    }

    let end_slope = (n * (n + 1)) as f64 / 2.0;
    let dp_n = if (x - 1.0).abs() < 1e-14 {
        end_slope
    } else if (x + 1.0).abs() < 1e-14 {
        if n % 2 == 0 { -end_slope } else { end_slope }
    } else {
        n as f64 * (x * p_curr - p_prev) / (x * x - 1.0)
    };

    (p_curr, dp_n)
}

/// Orthonormal Legendre polynomial √((2n+1)/2) P_n(x) and its derivative.
///
/// With this scaling ∫_{-1}^{1} φ_m φ_n dx = δ_{mn}, so modal mass
/// matrices are the identity.
#[inline]
pub fn legendre_normalized(n: usize, x: f64) -> (f64, f64) {
    let norm = ((2 * n + 1) as f64 / 2.0).sqrt();
    let (p, dp) = legendre_and_derivative(n, x);
    (norm * p, norm * dp)
}
