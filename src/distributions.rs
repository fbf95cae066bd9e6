//! Distribution catalog.
//!
//! The population families a simulation can draw from, each with a sampler
//! and closed-form moments.
//!
//! # Supported Distributions
//!
//! | Distribution | Parameters | Mean | Std Dev |
//! |---|---|---|---|
//! | [`Uniform`] | a, b | (a+b)/2 | (b−a)/√12 |
//! | [`Exponential`] | rate λ | 1/λ | 1/λ |
//! | [`Binomial`] | trials n, probability p | n·p | √(n·p·(1−p)) |
//!
//! # Design Notes
//!
//! [`DistributionSpec`] is a tagged variant over the three parameter
//! records, so every family has both a sampler and a moment formula and
//! dispatch is an exhaustive `match`. Name-keyed parameter mappings (the
//! shape the control surface hands over) enter through
//! [`DistributionSpec::from_params`], which is the only place key mismatches
//! can occur.
//!
//! The exponential family is parametrized by **rate**, not scale: a rate of
//! λ yields draws with mean 1/λ.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use rand::Rng;
use rand_distr::Distribution;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Shape parameters keyed by name, as supplied by a control surface.
pub type ParamMap = BTreeMap<String, f64>;

/// Largest float below which every integer is exactly representable (2⁵³).
const MAX_EXACT_INTEGER: f64 = 9_007_199_254_740_992.0;

fn check_count(count: usize) -> Result<()> {
    if count == 0 {
        return Err(Error::invalid("count must be positive"));
    }
    Ok(())
}

// ============================================================================
// Distribution Kind
// ============================================================================

/// Identifier of a supported distribution family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DistributionKind {
    Uniform,
    Exponential,
    Binomial,
}

impl DistributionKind {
    /// Every family in the catalog, in display order.
    pub const ALL: [DistributionKind; 3] = [
        DistributionKind::Uniform,
        DistributionKind::Exponential,
        DistributionKind::Binomial,
    ];

    /// Canonical family name.
    pub fn name(self) -> &'static str {
        match self {
            DistributionKind::Uniform => "Uniform",
            DistributionKind::Exponential => "Exponential",
            DistributionKind::Binomial => "Binomial",
        }
    }

    /// Parameter names a mapping for this family must contain, and nothing else.
    pub fn parameter_names(self) -> &'static [&'static str] {
        match self {
            DistributionKind::Uniform => &["a", "b"],
            DistributionKind::Exponential => &["rate"],
            DistributionKind::Binomial => &["trials", "probability"],
        }
    }
}

impl fmt::Display for DistributionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DistributionKind {
    type Err = Error;

    /// Parses a family name, ignoring ASCII case.
    ///
    /// # Errors
    /// [`Error::UnsupportedDistribution`] carrying the input for any other name.
    fn from_str(s: &str) -> Result<Self> {
        DistributionKind::ALL
            .into_iter()
            .find(|kind| kind.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| Error::UnsupportedDistribution(s.to_string()))
    }
}

// ============================================================================
// Uniform Distribution
// ============================================================================

/// Continuous uniform distribution on `[lower, upper)`.
///
/// # Mathematical Definition
/// - Mean: (a+b)/2
/// - Variance: (b−a)²/12
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Uniform {
    lower: f64,
    upper: f64,
}

impl Uniform {
    /// Creates a new uniform distribution on `[lower, upper)`.
    ///
    /// # Errors
    /// Returns `InvalidArgument` if `lower >= upper`, either bound is not
    /// finite, or the width overflows.
    pub fn new(lower: f64, upper: f64) -> Result<Self> {
        if !lower.is_finite() || !upper.is_finite() || lower >= upper {
            return Err(Error::invalid(format!(
                "Uniform requires finite a < b, got a={lower}, b={upper}"
            )));
        }
        if !(upper - lower).is_finite() {
            return Err(Error::invalid(format!(
                "Uniform width overflows, got a={lower}, b={upper}"
            )));
        }
        Ok(Self { lower, upper })
    }

    pub fn lower(&self) -> f64 {
        self.lower
    }

    pub fn upper(&self) -> f64 {
        self.upper
    }

    pub fn mean(&self) -> f64 {
        // Halved first so bounds near f64::MAX do not overflow.
        self.lower / 2.0 + self.upper / 2.0
    }

    pub fn variance(&self) -> f64 {
        let range = self.upper - self.lower;
        range * range / 12.0
    }

    /// Std dev = (b−a)/√12.
    pub fn std_dev(&self) -> f64 {
        (self.upper - self.lower) / 12.0_f64.sqrt()
    }

    /// Draws `count` independent values from `[lower, upper)`.
    ///
    /// The float sampler can round a draw up to `upper`; such draws are
    /// rejected and redrawn, which keeps the rest uniform.
    ///
    /// # Errors
    /// Returns `InvalidArgument` if `count == 0`.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R, count: usize) -> Result<Vec<f64>> {
        check_count(count)?;
        let dist = rand::distr::Uniform::new(self.lower, self.upper)
            .map_err(|e| Error::invalid(format!("Uniform sampler: {e}")))?;
        Ok((0..count)
            .map(|_| loop {
                let x = dist.sample(rng);
                if x < self.upper {
                    break x;
                }
            })
            .collect())
    }
}

// ============================================================================
// Exponential Distribution
// ============================================================================

/// Exponential distribution with rate λ.
///
/// # Mathematical Definition
/// - PDF: f(x) = λ·exp(−λx) for x ≥ 0
/// - Mean: 1/λ
/// - Variance: 1/λ²
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Exponential {
    rate: f64,
}

impl Exponential {
    /// Smallest accepted rate. Keeps 1/λ, and draws tens of means out in
    /// the tail, finite.
    pub const MIN_RATE: f64 = 1e-300;

    /// Creates a new exponential distribution with the given rate.
    ///
    /// # Errors
    /// Returns `InvalidArgument` if `rate` is not finite or is below
    /// [`MIN_RATE`](Self::MIN_RATE).
    pub fn new(rate: f64) -> Result<Self> {
        if !rate.is_finite() || rate <= 0.0 {
            return Err(Error::invalid(format!(
                "Exponential requires finite rate > 0, got rate={rate}"
            )));
        }
        if rate < Self::MIN_RATE {
            return Err(Error::invalid(format!(
                "Exponential rate must be at least {}, got rate={rate}",
                Self::MIN_RATE
            )));
        }
        Ok(Self { rate })
    }

    pub fn rate(&self) -> f64 {
        self.rate
    }

    pub fn mean(&self) -> f64 {
        1.0 / self.rate
    }

    pub fn variance(&self) -> f64 {
        1.0 / (self.rate * self.rate)
    }

    pub fn std_dev(&self) -> f64 {
        1.0 / self.rate
    }

    /// Draws `count` independent values.
    ///
    /// # Errors
    /// Returns `InvalidArgument` if `count == 0`.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R, count: usize) -> Result<Vec<f64>> {
        check_count(count)?;
        // rand_distr's Exp takes λ, not the scale 1/λ.
        let dist = rand_distr::Exp::new(self.rate)
            .map_err(|e| Error::invalid(format!("Exponential sampler: {e}")))?;
        Ok((0..count).map(|_| dist.sample(rng)).collect())
    }
}

// ============================================================================
// Binomial Distribution
// ============================================================================

/// Binomial distribution: successes in `trials` Bernoulli(`probability`) trials.
///
/// # Mathematical Definition
/// - Mean: n·p
/// - Variance: n·p·(1−p)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Binomial {
    trials: u64,
    probability: f64,
}

impl Binomial {
    /// Creates a new binomial distribution.
    ///
    /// # Errors
    /// Returns `InvalidArgument` if `trials == 0` or `probability` is not
    /// strictly inside `(0, 1)`.
    pub fn new(trials: u64, probability: f64) -> Result<Self> {
        if trials == 0 {
            return Err(Error::invalid("Binomial requires trials >= 1, got 0"));
        }
        if !(probability > 0.0 && probability < 1.0) {
            return Err(Error::invalid(format!(
                "Binomial requires 0 < probability < 1, got probability={probability}"
            )));
        }
        Ok(Self {
            trials,
            probability,
        })
    }

    pub fn trials(&self) -> u64 {
        self.trials
    }

    pub fn probability(&self) -> f64 {
        self.probability
    }

    pub fn mean(&self) -> f64 {
        self.trials as f64 * self.probability
    }

    pub fn variance(&self) -> f64 {
        self.trials as f64 * self.probability * (1.0 - self.probability)
    }

    pub fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }

    /// Draws `count` independent success counts, widened to `f64`.
    ///
    /// # Errors
    /// Returns `InvalidArgument` if `count == 0`.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R, count: usize) -> Result<Vec<f64>> {
        check_count(count)?;
        let dist = rand_distr::Binomial::new(self.trials, self.probability)
            .map_err(|e| Error::invalid(format!("Binomial sampler: {e}")))?;
        Ok((0..count).map(|_| dist.sample(rng) as f64).collect())
    }
}

// ============================================================================
// Distribution Specification
// ============================================================================

/// A distribution family together with validated shape parameters.
///
/// # Examples
/// ```
/// use clt_lab::distributions::DistributionSpec;
/// let spec = DistributionSpec::uniform(0.0, 10.0).unwrap();
/// let (mean, std) = spec.theoretical_moments();
/// assert_eq!(mean, 5.0);
/// assert!((std - 10.0 / 12.0_f64.sqrt()).abs() < 1e-15);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DistributionSpec {
    Uniform(Uniform),
    Exponential(Exponential),
    Binomial(Binomial),
}

impl DistributionSpec {
    pub fn uniform(a: f64, b: f64) -> Result<Self> {
        Uniform::new(a, b).map(DistributionSpec::Uniform)
    }

    pub fn exponential(rate: f64) -> Result<Self> {
        Exponential::new(rate).map(DistributionSpec::Exponential)
    }

    pub fn binomial(trials: u64, probability: f64) -> Result<Self> {
        Binomial::new(trials, probability).map(DistributionSpec::Binomial)
    }

    /// Builds a specification from a family name and a name-keyed mapping.
    ///
    /// # Errors
    /// - [`Error::UnsupportedDistribution`] if `name` is not a catalog family.
    /// - [`Error::InvalidArgument`] if the mapping's keys differ from the
    ///   family's parameter set or a value is out of range.
    ///
    /// # Examples
    /// ```
    /// use clt_lab::distributions::{DistributionSpec, ParamMap};
    /// let mut params = ParamMap::new();
    /// params.insert("rate".into(), 2.0);
    /// let spec = DistributionSpec::from_params("Exponential", &params).unwrap();
    /// assert_eq!(spec.theoretical_moments(), (0.5, 0.5));
    /// ```
    pub fn from_params(name: &str, params: &ParamMap) -> Result<Self> {
        let kind: DistributionKind = name.parse()?;
        Self::from_kind_params(kind, params)
    }

    /// Like [`from_params`](Self::from_params) with the family already resolved.
    pub fn from_kind_params(kind: DistributionKind, params: &ParamMap) -> Result<Self> {
        let expected = kind.parameter_names();
        if let Some(extra) = params.keys().find(|k| !expected.contains(&k.as_str())) {
            return Err(Error::invalid(format!(
                "unexpected parameter `{extra}` for {kind}, expected {expected:?}"
            )));
        }
        let get = |key: &str| {
            params.get(key).copied().ok_or_else(|| {
                Error::invalid(format!("{kind} requires parameter `{key}`"))
            })
        };

        match kind {
            DistributionKind::Uniform => Self::uniform(get("a")?, get("b")?),
            DistributionKind::Exponential => Self::exponential(get("rate")?),
            DistributionKind::Binomial => {
                let trials = get("trials")?;
                if !(trials.fract() == 0.0 && (1.0..=MAX_EXACT_INTEGER).contains(&trials)) {
                    return Err(Error::invalid(format!(
                        "Binomial requires integer trials >= 1, got trials={trials}"
                    )));
                }
                Self::binomial(trials as u64, get("probability")?)
            }
        }
    }

    pub fn kind(&self) -> DistributionKind {
        match self {
            DistributionSpec::Uniform(_) => DistributionKind::Uniform,
            DistributionSpec::Exponential(_) => DistributionKind::Exponential,
            DistributionSpec::Binomial(_) => DistributionKind::Binomial,
        }
    }

    /// The name-keyed mapping this specification was (or could be) built from.
    pub fn params(&self) -> ParamMap {
        let pairs: Vec<(&str, f64)> = match self {
            DistributionSpec::Uniform(d) => vec![("a", d.lower()), ("b", d.upper())],
            DistributionSpec::Exponential(d) => vec![("rate", d.rate())],
            DistributionSpec::Binomial(d) => {
                vec![("trials", d.trials() as f64), ("probability", d.probability())]
            }
        };
        pairs.into_iter().map(|(k, v)| (k.to_string(), v)).collect()
    }

    /// Draws `count` independent values from the family.
    ///
    /// # Errors
    /// Returns `InvalidArgument` if `count == 0`.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R, count: usize) -> Result<Vec<f64>> {
        match self {
            DistributionSpec::Uniform(d) => d.sample(rng, count),
            DistributionSpec::Exponential(d) => d.sample(rng, count),
            DistributionSpec::Binomial(d) => d.sample(rng, count),
        }
    }

    /// Closed-form `(mean, standard deviation)` of the population.
    pub fn theoretical_moments(&self) -> (f64, f64) {
        match self {
            DistributionSpec::Uniform(d) => (d.mean(), d.std_dev()),
            DistributionSpec::Exponential(d) => (d.mean(), d.std_dev()),
            DistributionSpec::Binomial(d) => (d.mean(), d.std_dev()),
        }
    }
}

impl fmt::Display for DistributionSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DistributionSpec::Uniform(d) => {
                write!(f, "Uniform(a = {:.2}, b = {:.2})", d.lower(), d.upper())
            }
            DistributionSpec::Exponential(d) => write!(f, "Exponential(rate = {:.2})", d.rate()),
            DistributionSpec::Binomial(d) => write!(
                f,
                "Binomial(trials = {}, probability = {:.2})",
                d.trials(),
                d.probability()
            ),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::create_rng;

    fn params(pairs: &[(&str, f64)]) -> ParamMap {
        pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    // --- Kind ---

    #[test]
    fn test_kind_parse() {
        assert_eq!("Uniform".parse::<DistributionKind>().unwrap(), DistributionKind::Uniform);
        assert_eq!(
            "exponential".parse::<DistributionKind>().unwrap(),
            DistributionKind::Exponential
        );
        assert_eq!(" BINOMIAL ".parse::<DistributionKind>().unwrap(), DistributionKind::Binomial);
    }

    #[test]
    fn test_kind_unsupported() {
        match "Poisson".parse::<DistributionKind>() {
            Err(Error::UnsupportedDistribution(name)) => assert_eq!(name, "Poisson"),
            other => panic!("expected UnsupportedDistribution, got {other:?}"),
        }
    }

    // --- Uniform ---

    #[test]
    fn test_uniform_moments() {
        let u = Uniform::new(0.0, 10.0).unwrap();
        assert_eq!(u.mean(), 5.0);
        assert!((u.std_dev() - 2.886_751_345_948_129).abs() < 1e-12);
        assert!((u.variance() - 100.0 / 12.0).abs() < 1e-10);
    }

    #[test]
    fn test_uniform_invalid() {
        assert!(Uniform::new(5.0, 5.0).is_err());
        assert!(Uniform::new(5.0, 3.0).is_err());
        assert!(Uniform::new(f64::NAN, 5.0).is_err());
        assert!(Uniform::new(-f64::MAX, f64::MAX).is_err());
    }

    #[test]
    fn test_uniform_sample_in_support() {
        let u = Uniform::new(-2.0, 3.0).unwrap();
        let mut rng = create_rng(7);
        let xs = u.sample(&mut rng, 1000).unwrap();
        assert_eq!(xs.len(), 1000);
        assert!(xs.iter().all(|&x| (-2.0..3.0).contains(&x)));
    }

    #[test]
    fn test_uniform_narrow_range_excludes_upper() {
        // Four ulps wide, where the raw float sampler often rounds up to b
        let a = 1.0;
        let b = 1.0 + 4.0 * f64::EPSILON;
        let u = Uniform::new(a, b).unwrap();
        let xs = u.sample(&mut create_rng(1), 200_000).unwrap();
        assert!(xs.iter().all(|&x| (a..b).contains(&x)));
        assert!(xs.iter().any(|&x| x > a));
    }

    #[test]
    fn test_uniform_mean_near_max() {
        let u = Uniform::new(1e308, 1.7e308).unwrap();
        assert!(u.mean().is_finite());
        assert!((u.mean() / 1.35e308 - 1.0).abs() < 1e-12);
    }

    // --- Exponential ---

    #[test]
    fn test_exponential_rate_semantics() {
        let e = Exponential::new(2.0).unwrap();
        assert_eq!(e.mean(), 0.5);
        assert_eq!(e.std_dev(), 0.5);
        assert_eq!(e.variance(), 0.25);
    }

    #[test]
    fn test_exponential_sample_mean_is_inverse_rate() {
        let e = Exponential::new(4.0).unwrap();
        let mut rng = create_rng(11);
        let xs = e.sample(&mut rng, 20_000).unwrap();
        assert!(xs.iter().all(|&x| x >= 0.0));
        let m = xs.iter().sum::<f64>() / xs.len() as f64;
        // σ/√n = 0.25/√20000 ≈ 0.0018
        assert!((m - 0.25).abs() < 0.01, "mean {m} should be near 1/rate");
    }

    #[test]
    fn test_exponential_invalid() {
        assert!(Exponential::new(0.0).is_err());
        assert!(Exponential::new(-1.0).is_err());
        assert!(Exponential::new(f64::INFINITY).is_err());
        assert!(Exponential::new(1e-320).is_err());
        assert!(Exponential::new(Exponential::MIN_RATE / 2.0).is_err());
    }

    #[test]
    fn test_exponential_smallest_rate_stays_finite() {
        let e = Exponential::new(Exponential::MIN_RATE).unwrap();
        assert!(e.mean().is_finite());
        assert!(e.std_dev().is_finite());
        let xs = e.sample(&mut create_rng(3), 10_000).unwrap();
        assert!(xs.iter().all(|x| x.is_finite()));
    }

    // --- Binomial ---

    #[test]
    fn test_binomial_moments() {
        let b = Binomial::new(20, 0.5).unwrap();
        assert_eq!(b.mean(), 10.0);
        assert!((b.std_dev() - 5.0_f64.sqrt()).abs() < 1e-15);
    }

    #[test]
    fn test_binomial_sample_integers_in_range() {
        let b = Binomial::new(12, 0.3).unwrap();
        let mut rng = create_rng(3);
        let xs = b.sample(&mut rng, 2000).unwrap();
        assert!(xs
            .iter()
            .all(|&x| x.fract() == 0.0 && (0.0..=12.0).contains(&x)));
    }

    #[test]
    fn test_binomial_invalid() {
        assert!(Binomial::new(0, 0.5).is_err());
        assert!(Binomial::new(10, 0.0).is_err());
        assert!(Binomial::new(10, 1.0).is_err());
        assert!(Binomial::new(10, f64::NAN).is_err());
    }

    // --- Spec ---

    #[test]
    fn test_sample_zero_count_rejected() {
        let mut rng = create_rng(0);
        for spec in [
            DistributionSpec::uniform(0.0, 1.0).unwrap(),
            DistributionSpec::exponential(1.0).unwrap(),
            DistributionSpec::binomial(5, 0.5).unwrap(),
        ] {
            assert!(matches!(
                spec.sample(&mut rng, 0),
                Err(Error::InvalidArgument(_))
            ));
        }
    }

    #[test]
    fn test_from_params_each_family() {
        let u = DistributionSpec::from_params("Uniform", &params(&[("a", 0.0), ("b", 10.0)]))
            .unwrap();
        assert_eq!(u.kind(), DistributionKind::Uniform);
        assert_eq!(u.theoretical_moments().0, 5.0);

        let e = DistributionSpec::from_params("Exponential", &params(&[("rate", 2.0)])).unwrap();
        assert_eq!(e.theoretical_moments(), (0.5, 0.5));

        let b = DistributionSpec::from_params(
            "Binomial",
            &params(&[("trials", 20.0), ("probability", 0.5)]),
        )
        .unwrap();
        let (mean, std) = b.theoretical_moments();
        assert_eq!(mean, 10.0);
        assert!((std - 2.236_067_977_499_79).abs() < 1e-12);
    }

    #[test]
    fn test_from_params_unsupported_name() {
        let err = DistributionSpec::from_params("Gamma", &params(&[("rate", 1.0)])).unwrap_err();
        assert!(matches!(err, Error::UnsupportedDistribution(ref n) if n == "Gamma"));
    }

    #[test]
    fn test_from_params_key_mismatch() {
        // missing
        let err = DistributionSpec::from_params("Uniform", &params(&[("a", 0.0)])).unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
        // extra
        let err = DistributionSpec::from_params("Exponential", &params(&[("rate", 1.0), ("b", 2.0)]))
            .unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
        // other family's keys
        let err = DistributionSpec::from_params("Exponential", &params(&[("lam", 1.0)]))
            .unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
    }

    #[test]
    fn test_from_params_fractional_trials() {
        let err = DistributionSpec::from_params(
            "Binomial",
            &params(&[("trials", 2.5), ("probability", 0.5)]),
        )
        .unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
    }

    #[test]
    fn test_params_roundtrip() {
        let spec = DistributionSpec::binomial(20, 0.25).unwrap();
        let back = DistributionSpec::from_kind_params(spec.kind(), &spec.params()).unwrap();
        assert_eq!(spec, back);
    }

    #[test]
    fn test_display_labels() {
        assert_eq!(
            DistributionSpec::uniform(0.0, 5.0).unwrap().to_string(),
            "Uniform(a = 0.00, b = 5.00)"
        );
        assert_eq!(
            DistributionSpec::exponential(1.0).unwrap().to_string(),
            "Exponential(rate = 1.00)"
        );
        assert_eq!(
            DistributionSpec::binomial(20, 0.5).unwrap().to_string(),
            "Binomial(trials = 20, probability = 0.50)"
        );
    }
}
