//! Sweep configuration, validation, and error types.
//!
//! [`SweepConfig`] is assembled once (by the command-line front end or by
//! hand) and passed by reference into the sweep. [`validate()`](SweepConfig::validate)
//! checks every structural invariant up front so that a bad configuration
//! aborts before any combination runs.

use std::error::Error;
use std::fmt;
use std::path::PathBuf;

use diffvi_algorithms::AlgorithmSpec;
use diffvi_core::{
    Element, MarkovDecisionProcess, MarkovRewardProcess, Precision, ProcessError, ProcessKind,
};
use diffvi_envs::{garet, micro, GaretError, GaretParams};

use crate::harness::RunSettings;
use crate::schedule::geomspace;

// ── ScheduleRange ───────────────────────────────────────────────────

/// Log-spaced schedule bounds: `count` values from `minimum` to `maximum`
/// inclusive.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScheduleRange {
    /// First value.
    pub minimum: f64,
    /// Last value.
    pub maximum: f64,
    /// Number of values. Must be at least 1.
    pub count: usize,
}

impl ScheduleRange {
    /// `1e-3 ..= 1` in 10 steps.
    pub const DEFAULT: Self = Self {
        minimum: 1e-3,
        maximum: 1.0,
        count: 10,
    };

    /// Expand into the concrete schedule.
    pub fn values(&self) -> Vec<f64> {
        geomspace(self.minimum, self.maximum, self.count)
    }

    /// Check bounds are finite and positive and the count is non-zero.
    ///
    /// `name` identifies the schedule in the error.
    pub fn validate(&self, name: &'static str) -> Result<(), ConfigError> {
        let bound_ok = |v: f64| v.is_finite() && v > 0.0;
        if !bound_ok(self.minimum) || !bound_ok(self.maximum) {
            return Err(ConfigError::InvalidSchedule {
                name,
                reason: format!(
                    "bounds must be finite and positive, got {}..={}",
                    self.minimum, self.maximum
                ),
            });
        }
        if self.count == 0 {
            return Err(ConfigError::InvalidSchedule {
                name,
                reason: "count must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

impl Default for ScheduleRange {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Hyperparameters for a `β`-swept family (DVI, MDVI).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BetaSweep {
    /// Values of `β` to try.
    pub betas: ScheduleRange,
    /// Starting reward-rate estimate.
    pub initial_r_bar: f64,
}

impl Default for BetaSweep {
    fn default() -> Self {
        Self {
            betas: ScheduleRange::DEFAULT,
            initial_r_bar: 0.0,
        }
    }
}

// ── EnvironmentSource ───────────────────────────────────────────────

/// A selectable environment.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EnvironmentSource {
    /// [`micro::mrp1`].
    Mrp1,
    /// [`micro::mrp2`].
    Mrp2,
    /// [`micro::mrp3`].
    Mrp3,
    /// [`micro::mdp1`].
    Mdp1,
    /// A generated GARET instance.
    Garet(GaretParams),
}

impl EnvironmentSource {
    /// Whether this source yields an MRP or an MDP.
    pub fn kind(&self) -> ProcessKind {
        match self {
            Self::Mrp1 | Self::Mrp2 | Self::Mrp3 => ProcessKind::Mrp,
            Self::Mdp1 | Self::Garet(_) => ProcessKind::Mdp,
        }
    }
}

/// Environments built from a configuration, split by kind.
///
/// MRPs are swept with evaluation algorithms, MDPs with control
/// algorithms.
#[derive(Clone, Debug, Default)]
pub struct Environments<T: Element> {
    /// Reward processes, in selection order.
    pub mrps: Vec<MarkovRewardProcess<T>>,
    /// Decision processes, in selection order.
    pub mdps: Vec<MarkovDecisionProcess<T>>,
}

impl<T: Element> Environments<T> {
    /// Construct every selected environment at precision `T`.
    pub fn build(sources: &[EnvironmentSource]) -> Result<Self, ConfigError> {
        let mut out = Self {
            mrps: Vec::new(),
            mdps: Vec::new(),
        };
        for source in sources {
            match source {
                EnvironmentSource::Mrp1 => out.mrps.push(micro::mrp1()?),
                EnvironmentSource::Mrp2 => out.mrps.push(micro::mrp2()?),
                EnvironmentSource::Mrp3 => out.mrps.push(micro::mrp3()?),
                EnvironmentSource::Mdp1 => out.mdps.push(micro::mdp1()?),
                EnvironmentSource::Garet(params) => out.mdps.push(garet::create(params)?),
            }
        }
        Ok(out)
    }

    /// Total number of environments.
    pub fn len(&self) -> usize {
        self.mrps.len() + self.mdps.len()
    }

    /// True if nothing was built.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// ── ConfigError ─────────────────────────────────────────────────────

/// Errors detected by [`SweepConfig::validate()`] or while building the
/// selected environments.
#[derive(Clone, Debug, PartialEq)]
pub enum ConfigError {
    /// No algorithm family selected.
    NoAlgorithms,
    /// No environment selected.
    NoEnvironments,
    /// `max_iters` is zero.
    ZeroMaxIters,
    /// Tolerance is negative or NaN.
    InvalidTolerance {
        /// The invalid value.
        value: f64,
    },
    /// A log-spaced schedule is malformed.
    InvalidSchedule {
        /// Which schedule (`step_sizes`, `dvi_betas`, ...).
        name: &'static str,
        /// What is wrong with it.
        reason: String,
    },
    /// A GARET selection cannot be generated.
    Garet(GaretError),
    /// A fixed environment failed validation.
    Process(ProcessError),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoAlgorithms => write!(f, "no algorithms scheduled to run"),
            Self::NoEnvironments => write!(f, "at least one environment required"),
            Self::ZeroMaxIters => write!(f, "max_iters must be at least 1"),
            Self::InvalidTolerance { value } => write!(
                f,
                "convergence_tolerance must be a non-negative number, got {value}"
            ),
            Self::InvalidSchedule { name, reason } => write!(f, "invalid {name}: {reason}"),
            Self::Garet(e) => write!(f, "garet: {e}"),
            Self::Process(e) => write!(f, "environment: {e}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Garet(e) => Some(e),
            Self::Process(e) => Some(e),
            _ => None,
        }
    }
}

impl From<GaretError> for ConfigError {
    fn from(e: GaretError) -> Self {
        Self::Garet(e)
    }
}

impl From<ProcessError> for ConfigError {
    fn from(e: ProcessError) -> Self {
        Self::Process(e)
    }
}

// ── SweepConfig ─────────────────────────────────────────────────────

/// Complete description of one sweep.
#[derive(Clone, Debug, PartialEq)]
pub struct SweepConfig {
    /// Round budget per combination. Default: 50000.
    pub max_iters: usize,
    /// Step sizes to try for every (environment, algorithm) pair.
    pub step_sizes: ScheduleRange,
    /// Round change at or below which a run counts as converged. Default: 1e-5.
    pub convergence_tolerance: f64,
    /// Synchronised (whole-vector) updates. Default: true.
    pub synchronized: bool,
    /// Element precision of every environment. Default: 32-bit.
    pub precision: Precision,
    /// DVI `β` sweep, or `None` to skip DVI.
    pub dvi: Option<BetaSweep>,
    /// MDVI `β` sweep, or `None` to skip MDVI.
    pub mdvi: Option<BetaSweep>,
    /// RVI reference state, or `None` to skip RVI.
    pub rvi: Option<usize>,
    /// Environments to sweep. Default: the three micro MRPs.
    pub environments: Vec<EnvironmentSource>,
    /// Write final estimates to [`results_dir`](Self::results_dir). Default: false.
    pub save_final_estimates: bool,
    /// Directory for saved estimates. Default: `results`.
    pub results_dir: PathBuf,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            max_iters: 50_000,
            step_sizes: ScheduleRange::DEFAULT,
            convergence_tolerance: 1e-5,
            synchronized: true,
            precision: Precision::F32,
            dvi: Some(BetaSweep::default()),
            mdvi: Some(BetaSweep::default()),
            rvi: Some(0),
            environments: vec![
                EnvironmentSource::Mrp1,
                EnvironmentSource::Mrp2,
                EnvironmentSource::Mrp3,
            ],
            save_final_estimates: false,
            results_dir: PathBuf::from("results"),
        }
    }
}

impl SweepConfig {
    /// Validate all structural invariants.
    ///
    /// Algorithm/environment compatibility (for example an RVI reference
    /// index beyond an environment's state count) needs the built
    /// environments and is checked by the sweep's pre-flight pass.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.dvi.is_none() && self.mdvi.is_none() && self.rvi.is_none() {
            return Err(ConfigError::NoAlgorithms);
        }
        if self.environments.is_empty() {
            return Err(ConfigError::NoEnvironments);
        }
        if self.max_iters == 0 {
            return Err(ConfigError::ZeroMaxIters);
        }
        if self.convergence_tolerance.is_nan() || self.convergence_tolerance < 0.0 {
            return Err(ConfigError::InvalidTolerance {
                value: self.convergence_tolerance,
            });
        }
        self.step_sizes.validate("step_sizes")?;
        if let Some(sweep) = &self.dvi {
            sweep.betas.validate("dvi_betas")?;
        }
        if let Some(sweep) = &self.mdvi {
            sweep.betas.validate("mdvi_betas")?;
        }
        for source in &self.environments {
            if let EnvironmentSource::Garet(params) = source {
                params.validate()?;
            }
        }
        Ok(())
    }

    /// One configuration record per hyperparameter value, DVI first,
    /// then MDVI, then RVI.
    pub fn algorithms(&self) -> Vec<AlgorithmSpec> {
        let mut specs = Vec::new();
        if let Some(sweep) = &self.dvi {
            specs.extend(sweep.betas.values().into_iter().map(|beta| AlgorithmSpec::Dvi {
                beta,
                initial_r_bar: sweep.initial_r_bar,
            }));
        }
        if let Some(sweep) = &self.mdvi {
            specs.extend(sweep.betas.values().into_iter().map(|beta| AlgorithmSpec::Mdvi {
                beta,
                initial_r_bar: sweep.initial_r_bar,
            }));
        }
        if let Some(reference_index) = self.rvi {
            specs.push(AlgorithmSpec::Rvi { reference_index });
        }
        specs
    }

    /// The concrete step-size schedule.
    pub fn step_size_values(&self) -> Vec<f64> {
        self.step_sizes.values()
    }

    /// Loop limits for the harness.
    pub fn run_settings(&self) -> RunSettings {
        RunSettings {
            max_iters: self.max_iters,
            convergence_tolerance: self.convergence_tolerance,
            synchronized: self.synchronized,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use diffvi_algorithms::AlgorithmFamily;
    use diffvi_envs::GARET1;

    #[test]
    fn default_config_is_valid() {
        let config = SweepConfig::default();
        config.validate().unwrap();
        // 10 DVI betas, 10 MDVI betas, one RVI record.
        let specs = config.algorithms();
        assert_eq!(specs.len(), 21);
        assert_eq!(specs[0].family(), AlgorithmFamily::Dvi);
        assert_eq!(specs[10].family(), AlgorithmFamily::Mdvi);
        assert_eq!(specs[20], AlgorithmSpec::Rvi { reference_index: 0 });
        assert_eq!(config.step_size_values().len(), 10);
        assert_eq!(config.run_settings().max_iters, 50_000);
    }

    #[test]
    fn no_algorithms_rejected() {
        let config = SweepConfig {
            dvi: None,
            mdvi: None,
            rvi: None,
            ..SweepConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::NoAlgorithms));
    }

    #[test]
    fn no_environments_rejected() {
        let config = SweepConfig {
            environments: Vec::new(),
            ..SweepConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::NoEnvironments));
    }

    #[test]
    fn zero_max_iters_rejected() {
        let config = SweepConfig {
            max_iters: 0,
            ..SweepConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::ZeroMaxIters));
    }

    #[test]
    fn bad_tolerance_rejected() {
        for value in [-1e-5, f64::NAN] {
            let config = SweepConfig {
                convergence_tolerance: value,
                ..SweepConfig::default()
            };
            assert!(matches!(
                config.validate(),
                Err(ConfigError::InvalidTolerance { .. })
            ));
        }
        let zero = SweepConfig {
            convergence_tolerance: 0.0,
            ..SweepConfig::default()
        };
        assert!(zero.validate().is_ok());
    }

    #[test]
    fn bad_schedules_rejected() {
        let config = SweepConfig {
            step_sizes: ScheduleRange {
                minimum: 0.0,
                maximum: 1.0,
                count: 3,
            },
            ..SweepConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().starts_with("invalid step_sizes"), "{err}");

        let config = SweepConfig {
            mdvi: Some(BetaSweep {
                betas: ScheduleRange {
                    count: 0,
                    ..ScheduleRange::DEFAULT
                },
                initial_r_bar: 0.0,
            }),
            ..SweepConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidSchedule {
                name: "mdvi_betas",
                ..
            })
        ));
    }

    #[test]
    fn oversized_branching_factor_rejected() {
        let params = GaretParams {
            branching_factor: 5,
            ..GARET1
        };
        let config = SweepConfig {
            environments: vec![EnvironmentSource::Garet(params)],
            ..SweepConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::Garet(_)));
        assert!(err.source().is_some());
    }

    #[test]
    fn environments_split_by_kind() {
        let sources = [
            EnvironmentSource::Mrp1,
            EnvironmentSource::Garet(GARET1),
            EnvironmentSource::Mrp3,
            EnvironmentSource::Mdp1,
        ];
        let envs = Environments::<f32>::build(&sources).unwrap();
        assert_eq!(envs.mrps.len(), 2);
        assert_eq!(envs.mdps.len(), 2);
        assert_eq!(envs.len(), 4);
        assert!(envs.mdps[0].name().starts_with("GARET S:4 A:4 B:3"));
        assert_eq!(EnvironmentSource::Mdp1.kind(), ProcessKind::Mdp);
    }
}
