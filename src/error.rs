//! Error types for the simulation engine.
//!
//! Every failure is surfaced synchronously to the caller. Nothing in the
//! crate catches or recovers from these.

use thiserror::Error;

/// Top-level error type for catalog, simulation, and statistics operations.
#[derive(Debug, Error)]
pub enum Error {
    /// The requested distribution family is not in the catalog.
    #[error("unsupported distribution: {0}")]
    UnsupportedDistribution(String),

    /// A size, count, sequence, or parameter mapping is out of contract.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Run configuration could not be parsed.
    #[error("configuration error: {0}")]
    Config(#[from] serde_json::Error),
}

impl Error {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        Error::InvalidArgument(msg.into())
    }
}

/// Type alias for Result with our Error type
pub type Result<T> = std::result::Result<T, Error>;
