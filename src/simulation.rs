//! Population generation and the sample-means experiment.
//!
//! [`simulate_sample_means`] is the operational definition of the sampling
//! distribution of the mean: an `n_simulations × sample_size` matrix of
//! i.i.d. draws, each row reduced to its arithmetic mean.
//!
//! # Independence
//!
//! Every cell of the matrix is a fresh draw from the generator. Rows are
//! never reused or derived from one another, so the row means are
//! independent and identically distributed.

use rand::Rng;
use tracing::debug;

use crate::distributions::DistributionSpec;
use crate::error::{Error, Result};
use crate::stats::compensated_mean;

pub(crate) fn check_sample_size(sample_size: usize) -> Result<()> {
    if sample_size == 0 {
        return Err(Error::invalid("sample_size must be positive"));
    }
    Ok(())
}

/// Draws `size` values from `spec` for displaying the population shape.
///
/// # Errors
/// Returns `InvalidArgument` if `size == 0`.
///
/// # Examples
/// ```
/// use clt_lab::distributions::DistributionSpec;
/// use clt_lab::random::create_rng;
/// use clt_lab::simulation::generate_population;
/// let spec = DistributionSpec::uniform(0.0, 1.0).unwrap();
/// let mut rng = create_rng(42);
/// let population = generate_population(&spec, 1000, &mut rng).unwrap();
/// assert_eq!(population.len(), 1000);
/// ```
pub fn generate_population<R: Rng + ?Sized>(
    spec: &DistributionSpec,
    size: usize,
    rng: &mut R,
) -> Result<Vec<f64>> {
    if size == 0 {
        return Err(Error::invalid("population size must be positive"));
    }
    debug!(distribution = %spec, size, "generating population");
    spec.sample(rng, size)
}

/// Runs the CLT experiment: `n_simulations` independent samples of
/// `sample_size` draws each, reduced to their means.
///
/// # Errors
/// Returns `InvalidArgument` if either size is zero or the matrix has more
/// cells than `usize` can index.
///
/// # Complexity
/// Time: O(n_simulations · sample_size), Space: O(n_simulations · sample_size)
///
/// # Examples
/// ```
/// use clt_lab::distributions::DistributionSpec;
/// use clt_lab::random::create_rng;
/// use clt_lab::simulation::simulate_sample_means;
/// let spec = DistributionSpec::exponential(1.0).unwrap();
/// let mut rng = create_rng(7);
/// let means = simulate_sample_means(&spec, 30, 500, &mut rng).unwrap();
/// assert_eq!(means.len(), 500);
/// ```
pub fn simulate_sample_means<R: Rng + ?Sized>(
    spec: &DistributionSpec,
    sample_size: usize,
    n_simulations: usize,
    rng: &mut R,
) -> Result<Vec<f64>> {
    if sample_size == 0 || n_simulations == 0 {
        return Err(Error::invalid(
            "sample_size and n_simulations must be positive",
        ));
    }
    let cells = sample_size.checked_mul(n_simulations).ok_or_else(|| {
        Error::invalid(format!(
            "sample matrix of {n_simulations} x {sample_size} is too large"
        ))
    })?;

    debug!(
        distribution = %spec,
        sample_size,
        n_simulations,
        "simulating sample means"
    );

    // Row-major: row i holds cells [i * sample_size, (i + 1) * sample_size).
    // Rows are never empty, so every row yields a mean.
    let matrix = spec.sample(rng, cells)?;
    Ok(matrix
        .chunks_exact(sample_size)
        .filter_map(compensated_mean)
        .collect())
}

// ============================================================================
// Tests
// ============================================================================
