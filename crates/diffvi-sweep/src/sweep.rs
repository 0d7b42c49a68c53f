//! The sweep driver: environments × algorithms × step sizes.
//!
//! A [`Sweep`] first checks every (environment, algorithm) pair, so a
//! configuration problem aborts before any work is done, then runs every
//! combination to termination in order. Divergence and exhaustion are
//! recorded in the report and never stop the sweep.

use std::error::Error;
use std::fmt;

use diffvi_algorithms::{AlgorithmError, AlgorithmFactory, AlgorithmInit, AlgorithmSpec};
use diffvi_core::{Element, Environment};
use ndarray::Array1;
use tracing::{debug, info, warn};

use crate::config::{ConfigError, Environments, SweepConfig};
use crate::harness::{run_to_convergence, RunOutcome, RunSettings, Termination};
use crate::persist::{ArtifactKey, EstimateSink, NpyDirSink, PersistError};

// ── SweepError ──────────────────────────────────────────────────────

/// Faults that abort a sweep.
#[derive(Debug)]
pub enum SweepError {
    /// The configuration is invalid.
    Config(ConfigError),
    /// An algorithm cannot be built for an environment.
    Algorithm {
        /// Environment name.
        environment: String,
        /// Algorithm label.
        algorithm: String,
        /// Why it cannot be built.
        source: AlgorithmError,
    },
    /// Saving final estimates failed.
    Persist(PersistError),
}

impl fmt::Display for SweepError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(e) => write!(f, "configuration: {e}"),
            Self::Algorithm {
                environment,
                algorithm,
                source,
            } => write!(f, "{algorithm} on {environment}: {source}"),
            Self::Persist(e) => write!(f, "saving estimates: {e}"),
        }
    }
}

impl Error for SweepError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Config(e) => Some(e),
            Self::Algorithm { source, .. } => Some(source),
            Self::Persist(e) => Some(e),
        }
    }
}

impl From<ConfigError> for SweepError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

impl From<PersistError> for SweepError {
    fn from(e: PersistError) -> Self {
        Self::Persist(e)
    }
}

// ── Reports ─────────────────────────────────────────────────────────

/// One finished combination.
#[derive(Clone, Debug, PartialEq)]
pub struct CombinationReport<T: Element> {
    /// Zero-based position within the sweep.
    pub index: usize,
    /// Environment name.
    pub environment: String,
    /// Algorithm label.
    pub algorithm: String,
    /// How the run ended.
    pub outcome: RunOutcome<T>,
    /// Where the final estimates were saved, if they were.
    pub artifact: Option<String>,
}

/// Every combination of a sweep, in execution order.
#[derive(Clone, Debug, PartialEq)]
pub struct SweepReport<T: Element> {
    /// Finished combinations.
    pub combinations: Vec<CombinationReport<T>>,
}

impl<T: Element> SweepReport<T> {
    /// Number of combinations that ended with `status`.
    pub fn count(&self, status: Termination) -> usize {
        self.combinations
            .iter()
            .filter(|c| c.outcome.status == status)
            .count()
    }
}

// ── Sweep ───────────────────────────────────────────────────────────

/// Runs combinations and accumulates a [`SweepReport`].
///
/// Several environment groups (say, MRPs for evaluation and MDPs for
/// control) may be run through one `Sweep`; combination indices keep
/// counting across groups.
pub struct Sweep<'s, T: Element> {
    settings: RunSettings,
    step_sizes: Vec<f64>,
    sink: Option<&'s mut dyn EstimateSink<T>>,
    combinations: Vec<CombinationReport<T>>,
}

impl<'s, T: Element> Sweep<'s, T> {
    /// A sweep that does not persist estimates.
    pub fn new(settings: RunSettings, step_sizes: Vec<f64>) -> Self {
        Self {
            settings,
            step_sizes,
            sink: None,
            combinations: Vec::new(),
        }
    }

    /// Hand final estimates of every combination to `sink`.
    pub fn with_sink(mut self, sink: &'s mut dyn EstimateSink<T>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Verify every (environment, algorithm) pair can be built.
    pub fn check<E, F>(&self, environments: &[E], algorithms: &[F]) -> Result<(), SweepError>
    where
        E: Environment,
        F: AlgorithmFactory<E, T>,
    {
        for environment in environments {
            for algorithm in algorithms {
                algorithm
                    .check(environment)
                    .map_err(|source| SweepError::Algorithm {
                        environment: environment.name().to_string(),
                        algorithm: algorithm.label(),
                        source,
                    })?;
            }
        }
        Ok(())
    }

    /// Check, then run every combination of `environments` × `algorithms`
    /// × step sizes.
    pub fn run<E, F>(&mut self, environments: &[E], algorithms: &[F]) -> Result<(), SweepError>
    where
        E: Environment,
        F: AlgorithmFactory<E, T>,
    {
        self.check(environments, algorithms)?;
        for environment in environments {
            let num_states = environment.num_states();
            for algorithm in algorithms {
                let label = algorithm.label();
                info!(
                    environment = environment.name(),
                    algorithm = %label,
                    "running"
                );
                for &step_size in &self.step_sizes {
                    let mut instance = algorithm
                        .build(AlgorithmInit {
                            environment,
                            initial_values: Array1::zeros(num_states),
                            step_size,
                            synchronized: self.settings.synchronized,
                        })
                        .map_err(|source| SweepError::Algorithm {
                            environment: environment.name().to_string(),
                            algorithm: label.clone(),
                            source,
                        })?;
                    let outcome =
                        run_to_convergence(instance.as_mut(), num_states, step_size, &self.settings);
                    let index = self.combinations.len();
                    log_outcome(&outcome);

                    let artifact = match self.sink.as_deref_mut() {
                        Some(sink) => {
                            let key = ArtifactKey {
                                index,
                                environment: environment.name(),
                                algorithm: &label,
                                step_size,
                            };
                            let location = sink.save(&key, &instance.estimates())?;
                            debug!(index, location = %location, "saved final estimates");
                            Some(location)
                        }
                        None => None,
                    };

                    self.combinations.push(CombinationReport {
                        index,
                        environment: environment.name().to_string(),
                        algorithm: label.clone(),
                        outcome,
                        artifact,
                    });
                }
            }
        }
        Ok(())
    }

    /// Finish and return the accumulated report.
    pub fn finish(self) -> SweepReport<T> {
        SweepReport {
            combinations: self.combinations,
        }
    }
}

fn log_outcome<T: Element>(outcome: &RunOutcome<T>) {
    let RunOutcome {
        step_size,
        status,
        iterations,
        final_change,
        final_changes,
    } = outcome;
    match status {
        Termination::Diverged => warn!(
            step_size = format_args!("{step_size:.5}"),
            iterations, "diverged"
        ),
        _ => info!(
            step_size = format_args!("{step_size:.5}"),
            converged = status.converged(),
            %status,
            iterations,
            final_change,
            "finished"
        ),
    }
    debug!(final_changes = %final_changes, "final changes");
}

/// Validate `config`, build its environments at precision `T`, check
/// every pair, then run the whole sweep.
///
/// MRPs are swept with the evaluation variants of the configured
/// algorithms and MDPs with the control variants. Nothing runs unless
/// every pair in both groups passes its check.
///
/// Final estimates go to `sink` when one is given. Otherwise, with
/// [`SweepConfig::save_final_estimates`] set, they are written by an
/// [`NpyDirSink`] in [`SweepConfig::results_dir`], created only after the
/// checks pass.
pub fn run_config<T: Element>(
    config: &SweepConfig,
    sink: Option<&mut dyn EstimateSink<T>>,
) -> Result<SweepReport<T>, SweepError> {
    config.validate()?;
    let environments = Environments::<T>::build(&config.environments)?;
    let algorithms: Vec<AlgorithmSpec> = config.algorithms();

    let mut npy: Option<NpyDirSink> = None;
    let mut sweep = Sweep::new(config.run_settings(), config.step_size_values());
    sweep.check(&environments.mrps, &algorithms)?;
    sweep.check(&environments.mdps, &algorithms)?;

    let sink: Option<&mut dyn EstimateSink<T>> = match sink {
        Some(sink) => Some(sink),
        None if config.save_final_estimates => {
            Some(npy.insert(NpyDirSink::create(&config.results_dir)?))
        }
        None => None,
    };
    if let Some(sink) = sink {
        sweep = sweep.with_sink(sink);
    }

    sweep.run(&environments.mrps, &algorithms)?;
    sweep.run(&environments.mdps, &algorithms)?;
    Ok(sweep.finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{BetaSweep, EnvironmentSource, ScheduleRange};

    fn small_config() -> SweepConfig {
        SweepConfig {
            max_iters: 200,
            step_sizes: ScheduleRange {
                minimum: 0.1,
                maximum: 1.0,
                count: 2,
            },
            dvi: Some(BetaSweep {
                betas: ScheduleRange {
                    minimum: 0.1,
                    maximum: 0.1,
                    count: 1,
                },
                initial_r_bar: 0.0,
            }),
            mdvi: None,
            rvi: Some(0),
            environments: vec![EnvironmentSource::Mrp1, EnvironmentSource::Mdp1],
            ..SweepConfig::default()
        }
    }

    #[test]
    fn reports_every_combination_in_order() {
        let report = run_config::<f64>(&small_config(), None).unwrap();
        // 2 environments × 2 algorithms × 2 step sizes.
        assert_eq!(report.combinations.len(), 8);
        for (i, c) in report.combinations.iter().enumerate() {
            assert_eq!(c.index, i);
            assert!(c.artifact.is_none());
        }
        assert_eq!(report.combinations[0].environment, "mrp1 D:float64");
        assert_eq!(report.combinations[4].environment, "mdp1 D:float64");
        assert_eq!(report.combinations[2].algorithm, "rvi(reference_index=0)");
        assert_eq!(report.combinations[1].outcome.step_size, 1.0);
    }

    #[test]
    fn multichain_control_fails_before_running() {
        let config = SweepConfig {
            mdvi: Some(BetaSweep::default()),
            ..small_config()
        };
        let err = run_config::<f32>(&config, None).unwrap_err();
        assert!(matches!(
            err,
            SweepError::Algorithm {
                source: AlgorithmError::Unsupported { .. },
                ..
            }
        ));
    }

    #[test]
    fn reference_index_out_of_range_fails_before_running() {
        let config = SweepConfig {
            rvi: Some(2),
            environments: vec![EnvironmentSource::Mrp2, EnvironmentSource::Mrp1],
            ..small_config()
        };
        let err = run_config::<f32>(&config, None).unwrap_err();
        assert!(err.to_string().contains("mrp1 D:float32"), "{err}");
        assert!(err.source().is_some());
    }

    #[test]
    fn invalid_config_is_reported() {
        let config = SweepConfig {
            environments: Vec::new(),
            ..small_config()
        };
        assert!(matches!(
            run_config::<f32>(&config, None),
            Err(SweepError::Config(ConfigError::NoEnvironments))
        ));
    }
}
