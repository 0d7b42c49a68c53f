//! diffvi: average-reward process generation and convergence sweeps.
//!
//! This is the top-level facade crate that re-exports the public API from
//! all diffvi sub-crates. It also ships the `diffvi` command-line binary.
//!
//! # Quick start
//!
//! ```rust
//! use diffvi::prelude::*;
//!
//! // One DVI configuration on the two-state chain, one step size.
//! let single = ScheduleRange { minimum: 0.1, maximum: 0.1, count: 1 };
//! let config = SweepConfig {
//!     max_iters: 1000,
//!     step_sizes: single,
//!     dvi: Some(BetaSweep { betas: single, initial_r_bar: 0.0 }),
//!     mdvi: None,
//!     rvi: None,
//!     environments: vec![EnvironmentSource::Mrp1],
//!     ..SweepConfig::default()
//! };
//! let report = run_config::<f64>(&config, None)?;
//! assert_eq!(report.count(Termination::Converged), 1);
//!
//! // A reproducible random MDP.
//! let mdp = diffvi::envs::garet::create::<f32>(&GARET1)?;
//! assert_eq!((mdp.num_actions(), mdp.num_states()), (4, 4));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! # Modules
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`process`] | `diffvi-core` | Process records, element types, validation errors |
//! | [`envs`] | `diffvi-envs` | GARET generator and micro environments |
//! | [`algorithms`] | `diffvi-algorithms` | DVI, MDVI, RVI and the `Algorithm` trait |
//! | [`sweep`] | `diffvi-sweep` | Configuration, convergence harness, sweep driver, persistence |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Validated process records and element types (`diffvi-core`).
pub use diffvi_core as process;

/// Environment constructors (`diffvi-envs`).
///
/// [`envs::garet::create`] for random MDPs, [`envs::micro`] for the
/// fixed test processes.
pub use diffvi_envs as envs;

/// Iterative algorithms (`diffvi-algorithms`).
pub use diffvi_algorithms as algorithms;

/// Convergence harness and sweep driver (`diffvi-sweep`).
pub use diffvi_sweep as sweep;

/// Array types used throughout the API.
pub use ndarray;

/// Common imports for typical diffvi usage.
pub mod prelude {
    // Process model
    pub use diffvi_core::{
        Element, Environment, MarkovDecisionProcess, MarkovRewardProcess, Precision, ProcessError,
    };

    // Environments
    pub use diffvi_envs::{GaretError, GaretParams, GARET1, GARET2, GARET3, GARET_100};

    // Algorithms
    pub use diffvi_algorithms::{
        Algorithm, AlgorithmError, AlgorithmFactory, AlgorithmFamily, AlgorithmInit,
        AlgorithmSpec,
    };

    // Sweeps
    pub use diffvi_sweep::{
        run_config, run_to_convergence, BetaSweep, ConfigError, EnvironmentSource, EstimateSink,
        NpyDirSink, RunOutcome, RunSettings, ScheduleRange, Sweep, SweepConfig, SweepError,
        SweepReport, Termination,
    };
}
