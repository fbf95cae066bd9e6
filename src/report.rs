//! One complete simulation run.
//!
//! [`run_simulation`] wires the catalog, the engine, and the statistics
//! together and returns every record the presentation layer consumes:
//! the raw population and sample means, the three summary records, both
//! difference records, and the shape data for the charts.

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::SimulationConfig;
use crate::distributions::{DistributionKind, ParamMap};
use crate::error::Result;
use crate::shape::{
    describe_shape, kde_curve, normal_curve, CurvePoint, DensityHistogram, Shape,
};
use crate::simulation::{generate_population, simulate_sample_means};
use crate::stats::{
    absolute_differences, empirical_stats, theoretical_stats, EmpiricalStats, Metrics,
    TheoreticalStats,
};

/// Bins in the population histogram.
pub const POPULATION_BINS: usize = 40;
/// Bins in the sample-means histogram.
pub const SAMPLE_MEANS_BINS: usize = 30;
/// Points on the theoretical normal curve and on the population KDE.
pub const CURVE_POINTS: usize = 300;

/// Everything one run produces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationReport {
    /// Readable label, e.g. `Exponential(rate = 2.00)`.
    pub label: String,
    pub kind: DistributionKind,
    pub params: ParamMap,
    pub sample_size: usize,
    pub n_simulations: usize,

    pub population: Vec<f64>,
    pub sample_means: Vec<f64>,

    pub theoretical: TheoreticalStats,
    pub population_empirical: EmpiricalStats,
    pub sample_means_empirical: EmpiricalStats,
    /// `mean`, `std`: population theory vs the drawn population.
    pub population_differences: Metrics,
    /// `mean`: population mean vs mean of means; `std`: standard error vs
    /// spread of the means.
    pub sample_means_differences: Metrics,

    pub population_shape: Shape,
    /// Gaussian KDE of the population over its range; `None` when every
    /// draw is identical.
    pub population_kde: Option<Vec<CurvePoint>>,
    /// N(mean, SE²) over the range of the sample means.
    pub normal_curve: Vec<CurvePoint>,
    pub population_histogram: DensityHistogram,
    pub sample_means_histogram: DensityHistogram,
}

impl SimulationReport {
    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Validates `config` and runs population generation, the sample-means
/// experiment, and all statistics against `rng`.
///
/// # Errors
/// Anything [`SimulationConfig::validate`] reports; the downstream steps
/// cannot fail on a validated config.
///
/// # Examples
/// ```
/// use clt_lab::config::SimulationConfig;
/// use clt_lab::random::create_rng;
/// use clt_lab::report::run_simulation;
/// let config = SimulationConfig {
///     population_size: 2000,
///     ..SimulationConfig::default()
/// };
/// let report = run_simulation(&config, &mut create_rng(1)).unwrap();
/// assert_eq!(report.sample_means.len(), 1000);
/// assert_eq!(report.theoretical.mean, 2.5);
/// ```
pub fn run_simulation<R: Rng + ?Sized>(
    config: &SimulationConfig,
    rng: &mut R,
) -> Result<SimulationReport> {
    let spec = config.validate()?;

    let population = generate_population(&spec, config.population_size, rng)?;
    let sample_means =
        simulate_sample_means(&spec, config.sample_size, config.n_simulations, rng)?;

    let theoretical = theoretical_stats(&spec, config.sample_size)?;
    let population_empirical = empirical_stats(&population)?;
    let sample_means_empirical = empirical_stats(&sample_means)?;

    let population_differences = absolute_differences(
        &theoretical.population_metrics(),
        &population_empirical.metrics(),
    );
    let sample_means_differences = absolute_differences(
        &theoretical.sampling_metrics(),
        &sample_means_empirical.metrics(),
    );

    let (lo, hi) = sample_means
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &x| {
            (lo.min(x), hi.max(x))
        });
    let curve = normal_curve(
        theoretical.mean,
        theoretical.standard_error,
        lo,
        hi,
        CURVE_POINTS,
    )?;

    let population_shape = describe_shape(&population)?;
    let population_kde = if population_empirical.standard_deviation > 0.0 {
        Some(kde_curve(&population, CURVE_POINTS)?)
    } else {
        None
    };
    let population_histogram = DensityHistogram::new(&population, POPULATION_BINS)?;
    let sample_means_histogram = DensityHistogram::new(&sample_means, SAMPLE_MEANS_BINS)?;

    info!(
        distribution = %spec,
        sample_size = config.sample_size,
        n_simulations = config.n_simulations,
        population_size = config.population_size,
        standard_error = theoretical.standard_error,
        empirical_spread = sample_means_empirical.standard_deviation,
        mean_gap = (sample_means_empirical.mean - theoretical.mean).abs(),
        "simulation complete"
    );

    Ok(SimulationReport {
        label: spec.to_string(),
        kind: spec.kind(),
        params: spec.params(),
        sample_size: config.sample_size,
        n_simulations: config.n_simulations,
        population,
        sample_means,
        theoretical,
        population_empirical,
        sample_means_empirical,
        population_differences,
        sample_means_differences,
        population_shape,
        population_kde,
        normal_curve: curve,
        population_histogram,
        sample_means_histogram,
    })
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distributions::DistributionSpec;
    use crate::error::Error;
    use crate::random::create_rng;

    fn small_config(spec: &DistributionSpec) -> SimulationConfig {
        SimulationConfig {
            sample_size: 40,
            n_simulations: 1000,
            population_size: 5000,
            ..SimulationConfig::for_spec(spec)
        }
    }

    #[test]
    fn test_report_shapes() {
        let spec = DistributionSpec::binomial(20, 0.5).unwrap();
        let report = run_simulation(&small_config(&spec), &mut create_rng(3)).unwrap();

        assert_eq!(report.label, "Binomial(trials = 20, probability = 0.50)");
        assert_eq!(report.kind, DistributionKind::Binomial);
        assert_eq!(report.population.len(), 5000);
        assert_eq!(report.sample_means.len(), 1000);
        assert_eq!(report.population_empirical.count, 5000);
        assert_eq!(report.sample_means_empirical.count, 1000);
        assert_eq!(report.normal_curve.len(), CURVE_POINTS);
        assert_eq!(report.population_kde.as_ref().map(Vec::len), Some(CURVE_POINTS));
        assert_eq!(report.population_histogram.bins(), POPULATION_BINS);
        assert_eq!(report.sample_means_histogram.bins(), SAMPLE_MEANS_BINS);
        assert_eq!(
            report.population_differences.keys().collect::<Vec<_>>(),
            vec!["mean", "std"]
        );
        assert_eq!(
            report.sample_means_differences.keys().collect::<Vec<_>>(),
            vec!["mean", "std"]
        );
    }

    #[test]
    fn test_report_binomial_within_tolerance() {
        let spec = DistributionSpec::binomial(20, 0.5).unwrap();
        let report = run_simulation(&small_config(&spec), &mut create_rng(21)).unwrap();
        let se = report.theoretical.standard_error;
        assert!(report.sample_means_differences["mean"] < 3.0 * se);
        // Spread of the means vs SE: relative error ≈ 1/√2000
        assert!(report.sample_means_differences["std"] < 0.1 * se);
        // Population: σ/√5000 ≈ 0.03
        assert!(report.population_differences["mean"] < 0.15);
    }

    #[test]
    fn test_report_differences_match_records() {
        let spec = DistributionSpec::exponential(2.0).unwrap();
        let report = run_simulation(&small_config(&spec), &mut create_rng(4)).unwrap();
        let t = report.theoretical;
        assert_eq!(
            report.population_differences["std"],
            (t.standard_deviation - report.population_empirical.standard_deviation).abs()
        );
        assert_eq!(
            report.sample_means_differences["std"],
            (t.standard_error - report.sample_means_empirical.standard_deviation).abs()
        );
    }

    #[test]
    fn test_report_exponential_shapes() {
        let spec = DistributionSpec::exponential(2.0).unwrap();
        let report = run_simulation(&small_config(&spec), &mut create_rng(5)).unwrap();
        assert_eq!(report.population_shape, Shape::RightSkewed);
        assert!((report.population_empirical.mean - 0.5).abs() < 0.05);

        let first = report.normal_curve.first().unwrap().x;
        let last = report.normal_curve.last().unwrap().x;
        let lo = report.sample_means.iter().copied().fold(f64::INFINITY, f64::min);
        let hi = report.sample_means.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        assert_eq!(first, lo);
        assert_eq!(last, hi);
    }

    #[test]
    fn test_report_kde_spans_population() {
        let spec = DistributionSpec::uniform(-1.0, 1.0).unwrap();
        let report = run_simulation(&small_config(&spec), &mut create_rng(8)).unwrap();
        let kde = report.population_kde.unwrap();
        let lo = report.population.iter().copied().fold(f64::INFINITY, f64::min);
        let hi = report.population.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        assert_eq!(kde.first().unwrap().x, lo);
        assert_eq!(kde.last().unwrap().x, hi);
        // Interior of a U(−1, 1) density is 0.5
        assert!((kde[CURVE_POINTS / 2].density - 0.5).abs() < 0.1);
    }

    #[test]
    fn test_report_constant_population_has_no_kde() {
        let config = SimulationConfig {
            population_size: 1,
            sample_size: 4,
            n_simulations: 10,
            ..SimulationConfig::default()
        };
        let report = run_simulation(&config, &mut create_rng(2)).unwrap();
        assert_eq!(report.population_kde, None);
    }

    #[test]
    fn test_report_extreme_parameters_stay_finite() {
        for spec in [
            DistributionSpec::uniform(0.0, 8e307).unwrap(),
            DistributionSpec::exponential(crate::distributions::Exponential::MIN_RATE).unwrap(),
        ] {
            let config = SimulationConfig {
                sample_size: 40,
                n_simulations: 50,
                population_size: 500,
                ..SimulationConfig::for_spec(&spec)
            };
            let report = run_simulation(&config, &mut create_rng(9)).unwrap();
            assert!(report.sample_means.iter().all(|m| m.is_finite()));
            assert!(report.sample_means_empirical.standard_deviation.is_finite());
            assert!(report.population_empirical.standard_deviation.is_finite());
            assert!(report.theoretical.standard_error.is_finite());
        }
    }

    #[test]
    fn test_report_rejects_invalid_config() {
        let config = SimulationConfig {
            distribution: "Weibull".into(),
            ..SimulationConfig::default()
        };
        assert!(matches!(
            run_simulation(&config, &mut create_rng(0)),
            Err(Error::UnsupportedDistribution(_))
        ));

        let config = SimulationConfig {
            n_simulations: 0,
            ..SimulationConfig::default()
        };
        assert!(matches!(
            run_simulation(&config, &mut create_rng(0)),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_report_serializes() {
        let config = SimulationConfig {
            sample_size: 3,
            n_simulations: 20,
            population_size: 50,
            ..SimulationConfig::default()
        };
        let report = run_simulation(&config, &mut create_rng(6)).unwrap();
        let json = report.to_json_string().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["label"], "Uniform(a = 0.00, b = 5.00)");
        assert_eq!(value["kind"], "Uniform");
        assert_eq!(value["sample_means"].as_array().unwrap().len(), 20);
    }
}
