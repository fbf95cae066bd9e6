//! # clt-lab
//!
//! Simulation and statistics engine for demonstrating the Central Limit
//! Theorem.
//!
//! A run draws a large population from one of three distribution families,
//! repeats an experiment of many independent fixed-size samples reduced to
//! their means, and contrasts the empirical spread of those means with the
//! closed-form standard error. Rendering, controls and export live outside
//! this crate and consume its records.
//!
//! ## Modules
//!
//! - [`distributions`] — Uniform, Exponential, Binomial: samplers and closed-form moments
//! - [`simulation`] — population generation and the sample-means experiment
//! - [`stats`] — empirical and theoretical summaries, difference records
//! - [`shape`] — skew label, normal overlay curve, population KDE, density histograms
//! - [`config`] — run configuration with JSON loading and validation
//! - [`report`] — one complete run bundled for the presentation layer
//! - [`random`] — seeded and entropy-seeded generators
//! - [`special`] — normal density
//!
//! ## Design Philosophy
//!
//! - **Explicit randomness**: every sampling call takes the generator as an
//!   argument; a fixed seed reproduces a run exactly
//! - **Numerical stability**: Welford's algorithm for variance,
//!   compensated summation for sample means
//! - **Typed parameters**: one record per family behind a tagged variant;
//!   name-keyed mappings are validated once, at the boundary

pub mod config;
pub mod distributions;
pub mod error;
pub mod random;
pub mod report;
pub mod shape;
pub mod simulation;
pub mod special;
pub mod stats;

pub use config::SimulationConfig;
pub use distributions::{DistributionKind, DistributionSpec};
pub use error::{Error, Result};
pub use report::{run_simulation, SimulationReport};
