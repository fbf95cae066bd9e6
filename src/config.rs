//! Run configuration.
//!
//! [`SimulationConfig`] is the record a control surface hands to the engine:
//! a family name, a name-keyed parameter mapping, the three sizes, and an
//! optional seed. It deserializes from JSON and validates into a
//! [`DistributionSpec`] before anything is sampled.
//!
//! Defaults match the initial state of the interactive controls:
//! Uniform(a = 0, b = 5), samples of 40, 1000 simulations, and a population
//! of 100 000 draws for display.

use serde::{Deserialize, Serialize};

use crate::distributions::{DistributionKind, DistributionSpec, ParamMap};
use crate::error::{Error, Result};
use crate::random::{create_rng, entropy_rng};
use crate::report::{run_simulation, SimulationReport};

pub const DEFAULT_SAMPLE_SIZE: usize = 40;
pub const DEFAULT_N_SIMULATIONS: usize = 1000;
pub const DEFAULT_POPULATION_SIZE: usize = 100_000;

fn default_sample_size() -> usize {
    DEFAULT_SAMPLE_SIZE
}

fn default_n_simulations() -> usize {
    DEFAULT_N_SIMULATIONS
}

fn default_population_size() -> usize {
    DEFAULT_POPULATION_SIZE
}

/// Inputs for one simulation run.
///
/// # Examples
/// ```
/// use clt_lab::config::SimulationConfig;
/// let config = SimulationConfig::from_json_str(
///     r#"{ "distribution": "Exponential", "params": { "rate": 2.0 }, "seed": 7 }"#,
/// )
/// .unwrap();
/// assert_eq!(config.sample_size, 40);
/// assert_eq!(config.spec().unwrap().theoretical_moments(), (0.5, 0.5));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Family name: `Uniform`, `Exponential` or `Binomial`.
    pub distribution: String,
    #[serde(default)]
    pub params: ParamMap,
    #[serde(default = "default_sample_size")]
    pub sample_size: usize,
    #[serde(default = "default_n_simulations")]
    pub n_simulations: usize,
    #[serde(default = "default_population_size")]
    pub population_size: usize,
    /// Fixed seed for a reproducible run; `None` seeds from OS entropy.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        let params = [("a", 0.0), ("b", 5.0)]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect();
        Self {
            distribution: DistributionKind::Uniform.name().to_string(),
            params,
            sample_size: DEFAULT_SAMPLE_SIZE,
            n_simulations: DEFAULT_N_SIMULATIONS,
            population_size: DEFAULT_POPULATION_SIZE,
            seed: None,
        }
    }
}

impl SimulationConfig {
    /// Default sizes around an already-built specification.
    pub fn for_spec(spec: &DistributionSpec) -> Self {
        Self {
            distribution: spec.kind().name().to_string(),
            params: spec.params(),
            ..Self::default()
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Parses and validates a JSON configuration.
    ///
    /// # Errors
    /// - [`Error::Config`] for malformed JSON, missing `distribution`, or
    ///   negative sizes.
    /// - Anything [`validate`](Self::validate) reports.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Resolves the family name and parameter mapping.
    ///
    /// # Errors
    /// [`Error::UnsupportedDistribution`] or [`Error::InvalidArgument`], as
    /// [`DistributionSpec::from_params`].
    pub fn spec(&self) -> Result<DistributionSpec> {
        DistributionSpec::from_params(&self.distribution, &self.params)
    }

    /// Checks every field and returns the resolved specification.
    ///
    /// # Errors
    /// Returns `InvalidArgument` for any zero size, plus whatever
    /// [`spec`](Self::spec) reports.
    pub fn validate(&self) -> Result<DistributionSpec> {
        let spec = self.spec()?;
        if self.sample_size == 0 || self.n_simulations == 0 {
            return Err(Error::invalid(
                "sample_size and n_simulations must be positive",
            ));
        }
        if self.population_size == 0 {
            return Err(Error::invalid("population_size must be positive"));
        }
        Ok(spec)
    }

    /// Runs the full simulation, seeded from `seed` when present.
    pub fn run(&self) -> Result<SimulationReport> {
        match self.seed {
            Some(seed) => run_simulation(self, &mut create_rng(seed)),
            None => run_simulation(self, &mut entropy_rng()),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
