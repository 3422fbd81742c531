//! Orthonormal Jacobi polynomials.
//!
//! P_n^{(α,β)} normalized so that
//! ∫_{-1}^{1} (1-x)^α (1+x)^β P_m P_n dx = δ_{mn}.
//! These are the building blocks of the Dubiner basis on triangles,
//! where α = 2i + 1 and β = 0.

/// Γ(n) for a positive integer argument.
fn gamma_int(n: u32) -> f64 {
    (1..n).fold(1.0, |acc, k| acc * k as f64)
}

/// Evaluate the orthonormal Jacobi polynomial of degree `n` at `x`.
pub fn jacobi_normalized(n: usize, alpha: u32, beta: u32, x: f64) -> f64 {
    let a = alpha as f64;
    let b = beta as f64;

    let gamma0 = 2f64.powf(a + b + 1.0) / (a + b + 1.0) * gamma_int(alpha + 1) * gamma_int(beta + 1)
        / gamma_int(alpha + beta + 1);
    let p0 = 1.0 / gamma0.sqrt();
    if n == 0 {
        return p0;
    }

    let gamma1 = (a + 1.0) * (b + 1.0) / (a + b + 3.0) * gamma0;
    let p1 = ((a + b + 2.0) * x / 2.0 + (a - b) / 2.0) / gamma1.sqrt();
    if n == 1 {
        return p1;
    }

    let mut a_old = 2.0 / (2.0 + a + b) * ((a + 1.0) * (b + 1.0) / (a + b + 3.0)).sqrt();
    let mut p_prev = p0;
    let mut p_curr = p1;

    for i in 1..n {
        let i = i as f64;
        let h1 = 2.0 * i + a + b;
        let a_new = 2.0 / (h1 + 2.0)
            * ((i + 1.0) * (i + 1.0 + a + b) * (i + 1.0 + a) * (i + 1.0 + b)
                / (h1 + 1.0)
                / (h1 + 3.0))
                .sqrt();
        let b_new = -(a * a - b * b) / h1 / (h1 + 2.0);
        let p_next = (-a_old * p_prev + (x - b_new) * p_curr) / a_new;
        a_old = a_new;
        p_prev = p_curr;
        p_curr = p_next;
    }

    p_curr
}

/// Derivative of the orthonormal Jacobi polynomial.
///
/// d/dx P_n^{(α,β)} = √(n (n + α + β + 1)) P_{n-1}^{(α+1,β+1)}
pub fn jacobi_normalized_derivative(n: usize, alpha: u32, beta: u32, x: f64) -> f64 {
    if n == 0 {
        return 0.0;
    }
    let scale = (n as f64 * (n as f64 + alpha as f64 + beta as f64 + 1.0)).sqrt();
    scale * jacobi_normalized(n - 1, alpha + 1, beta + 1, x)
}
