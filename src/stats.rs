//! Empirical and theoretical summary statistics.
//!
//! Turns raw draws and sample-mean sequences into the summary records the
//! presentation layer shows side by side, and measures how far the
//! empirical numbers land from the closed-form predictions.
//!
//! # Algorithms
//!
//! - **Mean/StdDev**: Welford's online algorithm.
//!   Reference: Welford (1962), "Note on a Method for Calculating
//!   Corrected Sums of Squares and Products", *Technometrics* 4(3).
//! - **Sums**: Neumaier-compensated summation for O(ε) error independent
//!   of n.
//! - **Standard error**: σ/√n, the standard deviation of the sampling
//!   distribution of the mean.
//!
//! Standard deviations here are **population** style (denominator `n`).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::distributions::DistributionSpec;
use crate::error::{Error, Result};
use crate::simulation::check_sample_size;

/// Metric name → value. Also the shape of a difference record.
pub type Metrics = BTreeMap<String, f64>;

/// Magnitude above which data is divided by its peak before squaring.
const RESCALE_THRESHOLD: f64 = 1e100;

/// `max |x|` when that exceeds [`RESCALE_THRESHOLD`], else 1.
///
/// Squares and cubes of rescaled values stay finite for any finite input.
fn rescale_factor(data: &[f64]) -> f64 {
    let peak = data.iter().fold(0.0_f64, |m, x| m.max(x.abs()));
    if peak > RESCALE_THRESHOLD {
        peak
    } else {
        1.0
    }
}

/// Empirical summary of a numeric sequence.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EmpiricalStats {
    pub mean: f64,
    /// Population standard deviation (denominator `count`).
    pub standard_deviation: f64,
    pub count: usize,
}

impl EmpiricalStats {
    /// Metric mapping with keys `mean`, `std`, `count`.
    pub fn metrics(&self) -> Metrics {
        metrics_from(&[
            ("mean", self.mean),
            ("std", self.standard_deviation),
            ("count", self.count as f64),
        ])
    }
}

/// Closed-form statistics of a population and of its sample means.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TheoreticalStats {
    pub mean: f64,
    pub standard_deviation: f64,
    /// σ/√n for the sample size the record was built for.
    pub standard_error: f64,
}

impl TheoreticalStats {
    /// Metric mapping with keys `mean`, `std`, `se`.
    pub fn metrics(&self) -> Metrics {
        metrics_from(&[
            ("mean", self.mean),
            ("std", self.standard_deviation),
            ("se", self.standard_error),
        ])
    }

    /// Predicted `mean` and `std` of the population itself.
    pub fn population_metrics(&self) -> Metrics {
        metrics_from(&[("mean", self.mean), ("std", self.standard_deviation)])
    }

    /// Predicted `mean` and `std` of the sample-means sequence.
    ///
    /// The theorem says the means are centred on the population mean with
    /// spread equal to the standard error.
    pub fn sampling_metrics(&self) -> Metrics {
        metrics_from(&[("mean", self.mean), ("std", self.standard_error)])
    }
}

fn metrics_from(pairs: &[(&str, f64)]) -> Metrics {
    pairs.iter().map(|&(k, v)| (k.to_string(), v)).collect()
}

/// Computes mean, population standard deviation, and count of `data`.
///
/// # Errors
/// Returns `InvalidArgument` if `data` is empty or contains NaN/Inf.
///
/// # Examples
/// ```
/// use clt_lab::stats::empirical_stats;
/// let s = empirical_stats(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]).unwrap();
/// assert!((s.mean - 5.0).abs() < 1e-15);
/// assert!((s.standard_deviation - 2.0).abs() < 1e-12);
/// assert_eq!(s.count, 8);
/// ```
pub fn empirical_stats(data: &[f64]) -> Result<EmpiricalStats> {
    if data.is_empty() {
        return Err(Error::invalid(
            "empirical statistics need at least one value",
        ));
    }
    if let Some(bad) = data.iter().find(|x| !x.is_finite()) {
        return Err(Error::invalid(format!(
            "empirical statistics need finite values, got {bad}"
        )));
    }
    let scale = rescale_factor(data);
    let mut acc = WelfordAccumulator::new();
    for &x in data {
        acc.update(x / scale);
    }
    Ok(EmpiricalStats {
        mean: acc.mean_acc * scale,
        standard_deviation: acc.population_std_dev().unwrap_or(0.0) * scale,
        count: data.len(),
    })
}

/// Closed-form population statistics plus the standard error for
/// `sample_size`.
///
/// # Errors
/// Returns `InvalidArgument` if `sample_size == 0`.
///
/// # Examples
/// ```
/// use clt_lab::distributions::DistributionSpec;
/// use clt_lab::stats::theoretical_stats;
/// let spec = DistributionSpec::binomial(20, 0.5).unwrap();
/// let t = theoretical_stats(&spec, 40).unwrap();
/// assert_eq!(t.mean, 10.0);
/// assert!((t.standard_error - 0.353_553_390_593).abs() < 1e-9);
/// ```
pub fn theoretical_stats(spec: &DistributionSpec, sample_size: usize) -> Result<TheoreticalStats> {
    check_sample_size(sample_size)?;
    let (mean, standard_deviation) = spec.theoretical_moments();
    Ok(TheoreticalStats {
        mean,
        standard_deviation,
        standard_error: standard_deviation / (sample_size as f64).sqrt(),
    })
}

/// `|theoretical[k] − empirical[k]|` for every key present in both maps.
///
/// Keys present in only one input are omitted.
///
/// # Examples
/// ```
/// use clt_lab::stats::{absolute_differences, Metrics};
/// let t: Metrics = [("mean".to_string(), 5.0)].into_iter().collect();
/// assert!(absolute_differences(&t, &Metrics::new()).is_empty());
/// ```
pub fn absolute_differences(theoretical: &Metrics, empirical: &Metrics) -> Metrics {
    theoretical
        .iter()
        .filter_map(|(key, &t)| empirical.get(key).map(|&e| (key.clone(), (t - e).abs())))
        .collect()
}

/// Computes Fisher's adjusted sample skewness (G₁) with bias correction.
///
/// # Formula
/// ```text
/// G₁ = [√(n(n−1)) / (n−2)] × (m₃ / m₂^{3/2})
/// ```
/// where `m₂`, `m₃` are the biased second and third central moments.
///
/// Reference: Joanes & Gill (1998), "Comparing measures of sample skewness
/// and kurtosis", *The Statistician* 47(1), pp. 183–189.
///
/// # Returns
/// - `None` if `data.len() < 3`, data contains NaN/Inf, or variance is zero.
pub fn skewness(data: &[f64]) -> Option<f64> {
    let n = data.len();
    if n < 3 {
        return None;
    }
    if !data.iter().all(|x| x.is_finite()) {
        return None;
    }
    let nf = n as f64;
    // G₁ is scale invariant.
    let scale = rescale_factor(data);
    let m = neumaier(data.iter().map(|&x| x / scale)) / nf;
    let mut sum2 = 0.0;
    let mut sum3 = 0.0;
    for &x in data {
        let d = x / scale - m;
        let d2 = d * d;
        sum2 += d2;
        sum3 += d2 * d;
    }
    let m2 = sum2 / nf;
    if m2 == 0.0 {
        return None;
    }
    let m3 = sum3 / nf;
    let g1 = m3 / m2.powf(1.5);
    let correction = (nf * (nf - 1.0)).sqrt() / (nf - 2.0);
    Some(correction * g1)
}

// ---------------------------------------------------------------------------
// Kahan compensated summation
// ---------------------------------------------------------------------------

/// Neumaier compensated summation for O(ε) error independent of `n`.
///
/// This is an improved variant of Kahan summation that also handles the
/// case where the addend is larger in magnitude than the running sum.
///
/// Reference: Neumaier (1974), "Rundungsfehleranalyse einiger Verfahren
/// zur Summation endlicher Summen", *Zeitschrift für Angewandte
/// Mathematik und Mechanik* 54(1), pp. 39–51.
///
/// # Complexity
/// Time: O(n), Space: O(1)
pub fn kahan_sum(data: &[f64]) -> f64 {
    neumaier(data.iter().copied())
}

/// Arithmetic mean as the compensated sum of `xᵢ/n`.
///
/// Dividing before summing keeps the result finite whenever every value is,
/// even when the plain sum would overflow.
///
/// # Returns
/// - `None` if `data` is empty.
///
/// # Examples
/// ```
/// use clt_lab::stats::compensated_mean;
/// let m = compensated_mean(&[f64::MAX, f64::MAX]).unwrap();
/// assert_eq!(m, f64::MAX);
/// ```
pub fn compensated_mean(data: &[f64]) -> Option<f64> {
    if data.is_empty() {
        return None;
    }
    let n = data.len() as f64;
    Some(neumaier(data.iter().map(|&x| x / n)))
}

fn neumaier(values: impl Iterator<Item = f64>) -> f64 {
    let mut sum = 0.0_f64;
    let mut c = 0.0_f64;
    for x in values {
        let t = sum + x;
        if sum.abs() >= x.abs() {
            c += (sum - t) + x;
        } else {
            c += (x - t) + sum;
        }
        sum = t;
    }
    sum + c
}

// ---------------------------------------------------------------------------
// Welford online accumulator
// ---------------------------------------------------------------------------

/// Streaming accumulator for mean and variance.
///
/// Maintains a running mean and sum of squared deviations, avoiding the
/// catastrophic cancellation of `Var = E[X²] − (E[X])²`.
///
/// # Examples
/// ```
/// use clt_lab::stats::WelfordAccumulator;
/// let mut acc = WelfordAccumulator::new();
/// for &x in &[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0] {
///     acc.update(x);
/// }
/// assert!((acc.mean().unwrap() - 5.0).abs() < 1e-15);
/// assert!((acc.population_variance().unwrap() - 4.0).abs() < 1e-10);
/// ```
#[derive(Debug, Clone)]
pub struct WelfordAccumulator {
    count: u64,
    mean_acc: f64,
    m2: f64,
}

impl WelfordAccumulator {
    /// Creates a new empty accumulator.
    pub fn new() -> Self {
        Self {
            count: 0,
            mean_acc: 0.0,
            m2: 0.0,
        }
    }

    /// Feeds a new sample into the accumulator.
    ///
    /// The first sample only initializes the mean, which avoids
    /// intermediate overflow when `delta² > f64::MAX`.
    pub fn update(&mut self, value: f64) {
        let n1 = self.count;
        self.count += 1;

        if n1 == 0 {
            self.mean_acc = value;
            return;
        }

        let delta = value - self.mean_acc;
        let delta_n = delta / self.count as f64;
        self.m2 += delta * delta_n * n1 as f64;
        self.mean_acc += delta_n;
    }

    /// Returns the number of samples seen so far.
    pub fn count(&self) -> u64 {
        self.count
    }

    /// Returns the running mean, or `None` if no samples have been added.
    pub fn mean(&self) -> Option<f64> {
        if self.count == 0 {
            None
        } else {
            Some(self.mean_acc)
        }
    }

    /// Returns the population variance (n denominator), or `None` if no
    /// samples have been added.
    pub fn population_variance(&self) -> Option<f64> {
        if self.count == 0 {
            None
        } else {
            Some(self.m2 / self.count as f64)
        }
    }

    /// Returns the population standard deviation, or `None` if no samples
    /// have been added.
    pub fn population_std_dev(&self) -> Option<f64> {
        self.population_variance().map(f64::sqrt)
    }
}

impl Default for WelfordAccumulator {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
