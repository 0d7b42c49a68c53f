//! Convergence sweeps for iterative average-reward algorithms.
//!
//! Drives every (environment, algorithm, step size) combination of a
//! [`SweepConfig`] to convergence, divergence or an exhausted round
//! budget, and reports the outcome of each.
//!
//! # Architecture
//!
//! ```text
//! SweepConfig ──validate()──► Environments + Vec<AlgorithmSpec> + step sizes
//!                                   │
//!                              Sweep::check (every pair, before any run)
//!                                   │
//!                              Sweep::run ──► run_to_convergence (per combination)
//!                                   │                 │
//!                                   │            EstimateSink (optional)
//!                                   ▼
//!                              SweepReport
//! ```
//!
//! Execution is single-threaded; each combination owns its algorithm
//! instance exclusively.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod config;
pub mod harness;
pub mod persist;
pub mod schedule;
pub mod sweep;

pub use config::{
    BetaSweep, ConfigError, EnvironmentSource, Environments, ScheduleRange, SweepConfig,
};
pub use harness::{mean_abs_change, run_to_convergence, RunOutcome, RunSettings, Termination};
pub use persist::{write_npy, ArtifactKey, EstimateSink, NpyDirSink, PersistError, NPY_MAGIC};
pub use schedule::geomspace;
pub use sweep::{run_config, CombinationReport, Sweep, SweepError, SweepReport};
