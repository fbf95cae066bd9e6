//! Shape descriptors for the population and the sampling distribution.
//!
//! The rendering layer draws a density histogram of the population,
//! smoothed by a kernel density estimate and labelled with its skew, and a
//! density histogram of the sample means overlaid with the theoretical
//! normal curve N(μ, SE²). This module computes the numbers behind each of
//! them; it draws nothing.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{Error, Result};
use crate::special::normal_pdf;
use crate::stats::{empirical_stats, skewness};

/// |G₁| below this counts as symmetric.
pub const SYMMETRY_TOLERANCE: f64 = 0.1;

/// Coarse skew label for a distribution of values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Shape {
    Symmetric,
    /// Positive skew, long right tail.
    RightSkewed,
    /// Negative skew, long left tail.
    LeftSkewed,
}

impl Shape {
    /// Labels a skewness coefficient.
    pub fn from_skewness(g: f64) -> Self {
        if g.abs() < SYMMETRY_TOLERANCE {
            Shape::Symmetric
        } else if g > 0.0 {
            Shape::RightSkewed
        } else {
            Shape::LeftSkewed
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Shape::Symmetric => "symmetric",
            Shape::RightSkewed => "positive skew (right tail)",
            Shape::LeftSkewed => "negative skew (left tail)",
        }
    }
}

/// Labels the skew of `data`.
///
/// Fewer than three values, or zero variance, reads as symmetric.
///
/// # Errors
/// Returns `InvalidArgument` if `data` is empty or contains NaN/Inf.
pub fn describe_shape(data: &[f64]) -> Result<Shape> {
    check_finite(data, "shape description")?;
    Ok(skewness(data).map_or(Shape::Symmetric, Shape::from_skewness))
}

fn check_finite(data: &[f64], what: &str) -> Result<()> {
    if data.is_empty() {
        return Err(Error::invalid(format!("{what} needs at least one value")));
    }
    if data.iter().any(|x| !x.is_finite()) {
        return Err(Error::invalid(format!("{what} needs finite values")));
    }
    Ok(())
}

// ============================================================================
// Normal overlay
// ============================================================================

/// One point on a density curve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CurvePoint {
    pub x: f64,
    pub density: f64,
}

/// Evaluates the N(`mean`, `standard_error`²) density at `points` equally
/// spaced x values spanning `[lower, upper]`.
///
/// When `lower == upper` (every sample mean identical) the span is widened
/// to ±3 standard errors around that value.
///
/// # Errors
/// Returns `InvalidArgument` if `points < 2`, `standard_error` is not a
/// positive finite number, or the bounds are not finite with
/// `lower <= upper`.
///
/// # Examples
/// ```
/// use clt_lab::shape::normal_curve;
/// let curve = normal_curve(10.0, 0.5, 8.0, 12.0, 5).unwrap();
/// assert_eq!(curve.len(), 5);
/// assert_eq!(curve[2].x, 10.0);
/// ```
pub fn normal_curve(
    mean: f64,
    standard_error: f64,
    lower: f64,
    upper: f64,
    points: usize,
) -> Result<Vec<CurvePoint>> {
    if points < 2 {
        return Err(Error::invalid(format!(
            "normal curve needs at least 2 points, got {points}"
        )));
    }
    if !standard_error.is_finite() || standard_error <= 0.0 || !mean.is_finite() {
        return Err(Error::invalid(format!(
            "normal curve needs finite mean and standard error > 0, got mean={mean}, se={standard_error}"
        )));
    }
    if !lower.is_finite() || !upper.is_finite() || lower > upper {
        return Err(Error::invalid(format!(
            "normal curve needs finite lower <= upper, got [{lower}, {upper}]"
        )));
    }

    let (lower, upper) = if lower == upper {
        (lower - 3.0 * standard_error, upper + 3.0 * standard_error)
    } else {
        (lower, upper)
    };

    Ok(linspace(lower, upper, points)
        .map(|x| CurvePoint {
            x,
            density: normal_pdf(x, mean, standard_error),
        })
        .collect())
}

/// `points` equally spaced values from `lower` to exactly `upper`.
fn linspace(lower: f64, upper: f64, points: usize) -> impl Iterator<Item = f64> {
    let last = points.saturating_sub(1);
    let step = (upper - lower) / last.max(1) as f64;
    (0..points).map(move |i| {
        if i == last {
            upper
        } else {
            lower + i as f64 * step
        }
    })
}

// ============================================================================
// Kernel density estimate
// ============================================================================

/// Gaussian kernel density estimate of `data`, evaluated at `points`
/// equally spaced x values from the minimum to the maximum of `data`.
///
/// The bandwidth follows Scott's rule, `h = s·n^(−1/5)` with `s` the sample
/// standard deviation (denominator `n − 1`).
///
/// # Errors
/// Returns `InvalidArgument` if `points < 2`, `data` has fewer than two
/// values, contains NaN/Inf, or has zero spread.
///
/// # Complexity
/// Time: O(points · n)
///
/// # Examples
/// ```
/// use clt_lab::shape::kde_curve;
/// let curve = kde_curve(&[0.0, 1.0, 1.5, 3.0], 50).unwrap();
/// assert_eq!(curve.len(), 50);
/// assert_eq!(curve[0].x, 0.0);
/// assert_eq!(curve[49].x, 3.0);
/// ```
pub fn kde_curve(data: &[f64], points: usize) -> Result<Vec<CurvePoint>> {
    if points < 2 {
        return Err(Error::invalid(format!(
            "density estimate needs at least 2 points, got {points}"
        )));
    }
    check_finite(data, "density estimate")?;
    if data.len() < 2 {
        return Err(Error::invalid("density estimate needs at least two values"));
    }

    let stats = empirical_stats(data)?;
    let n = data.len() as f64;
    let sample_std = stats.standard_deviation * (n / (n - 1.0)).sqrt();
    if sample_std <= 0.0 {
        return Err(Error::invalid("density estimate needs data with spread"));
    }
    let bandwidth = sample_std * n.powf(-0.2);

    let lo = data.iter().copied().fold(f64::INFINITY, f64::min);
    let hi = data.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    Ok(linspace(lo, hi, points)
        .map(|x| CurvePoint {
            x,
            density: data.iter().map(|&xi| normal_pdf(x, xi, bandwidth)).sum::<f64>() / n,
        })
        .collect())
}

// ============================================================================
// Density histogram
// ============================================================================

/// Equal-width histogram normalised to unit area.
///
/// Bins are half-open `[edge_i, edge_{i+1})` except the last, which also
/// contains its right edge.
///
/// # Examples
/// ```
/// use clt_lab::shape::DensityHistogram;
/// let h = DensityHistogram::new(&[0.0, 1.0, 1.0, 2.0], 2).unwrap();
/// assert_eq!(h.counts(), &[1, 3]);
/// let area: f64 = h.densities().iter().map(|d| d * h.bin_width()).sum();
/// assert!((area - 1.0).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DensityHistogram {
    edges: Vec<f64>,
    counts: Vec<usize>,
    densities: Vec<f64>,
    bin_width: f64,
}

impl DensityHistogram {
    /// Bins `data` into `bins` equal-width bins over `[min, max]`.
    ///
    /// # Errors
    /// Returns `InvalidArgument` if `bins == 0`, `data` is empty, contains
    /// NaN/Inf, or spans a range too wide to represent.
    pub fn new(data: &[f64], bins: usize) -> Result<Self> {
        if bins == 0 {
            return Err(Error::invalid("histogram needs at least one bin"));
        }
        check_finite(data, "histogram")?;

        let mut lo = data.iter().copied().fold(f64::INFINITY, f64::min);
        let mut hi = data.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        if lo == hi {
            // At large magnitudes ±0.5 is below one ulp; pad by at least one
            // ulp per bin so the edges stay distinct.
            let pad = 0.5_f64.max(lo.abs() * f64::EPSILON * bins as f64);
            warn!(value = lo, pad, "histogram range is degenerate, widening");
            lo -= pad;
            hi += pad;
        }
        let width = (hi - lo) / bins as f64;
        if !width.is_finite() || width <= 0.0 {
            return Err(Error::invalid(format!(
                "histogram range [{lo}, {hi}] cannot be split into {bins} bins"
            )));
        }

        let mut counts = vec![0_usize; bins];
        for &x in data {
            let idx = (((x - lo) / width) as usize).min(bins - 1);
            counts[idx] += 1;
        }

        let edges: Vec<f64> = (0..=bins)
            .map(|i| if i == bins { hi } else { lo + i as f64 * width })
            .collect();
        let n = data.len() as f64;
        let densities = counts.iter().map(|&c| c as f64 / n / width).collect();

        Ok(Self {
            edges,
            counts,
            densities,
            bin_width: width,
        })
    }

    /// `bins + 1` edges from the minimum to the maximum.
    pub fn edges(&self) -> &[f64] {
        &self.edges
    }

    pub fn counts(&self) -> &[usize] {
        &self.counts
    }

    /// Count divided by `n · bin_width`, so the bars integrate to 1.
    pub fn densities(&self) -> &[f64] {
        &self.densities
    }

    pub fn bins(&self) -> usize {
        self.counts.len()
    }

    pub fn bin_width(&self) -> f64 {
        self.bin_width
    }
}

// ============================================================================
// Tests
// ============================================================================
