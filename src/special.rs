//! Normal density evaluation.
//!
//! The theoretical curve the sample means are compared against is
//! N(μ, SE²); these are the closed forms it is drawn from.

/// 1/√(2π) ≈ 0.3989422804014327
const FRAC_1_SQRT_2PI: f64 = 0.3989422804014326779399460599343818684758586311649;

/// Standard normal PDF φ(x) = (1/√(2π)) exp(-x²/2).
///
/// # Examples
/// ```
/// use clt_lab::special::standard_normal_pdf;
/// let peak = standard_normal_pdf(0.0);
/// assert!((peak - 0.3989422804014327).abs() < 1e-15);
/// ```
pub fn standard_normal_pdf(x: f64) -> f64 {
    if x.is_nan() {
        return f64::NAN;
    }
    FRAC_1_SQRT_2PI * (-0.5 * x * x).exp()
}

/// Density of N(μ, σ²) at `x`: φ((x−μ)/σ)/σ.
///
/// Callers guarantee `sigma > 0`.
pub fn normal_pdf(x: f64, mu: f64, sigma: f64) -> f64 {
    standard_normal_pdf((x - mu) / sigma) / sigma
}

// ============================================================================
// Tests
// ============================================================================
