//! `diffvi` command-line front end.
//!
//! ```text
//! diffvi evaluation [--max-iters N] [--64bit] [--dvi false] [--mrp3 false] ...
//! diffvi control    [--garet2 true] [--garet-seed 7] ...
//! ```
//!
//! Flags are assembled into a single `SweepConfig`, validated, and run.
//! Logging goes to stderr through `tracing` (`RUST_LOG` overrides `-v`);
//! the per-combination results table goes to stdout.

use std::error::Error;
use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use diffvi::envs::{GARET1, GARET2, GARET3, GARET_100};
use diffvi::prelude::*;
use diffvi::sweep::CombinationReport;

#[derive(Debug, Parser)]
#[command(
    name = "diffvi",
    about = "Convergence sweeps for differential value iteration",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Verbosity: -v for debug, -vv for trace.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Sweep evaluation algorithms over the micro MRPs.
    Evaluation(EvaluationArgs),
    /// Sweep control algorithms over MDPs.
    Control(ControlArgs),
}

/// Flags shared by both subcommands.
#[derive(Debug, Args)]
struct CommonArgs {
    /// Maximum rounds per combination.
    #[arg(long, default_value_t = 50_000)]
    max_iters: usize,

    /// Smallest step size.
    #[arg(long, default_value_t = 1e-3)]
    minimum_step_size: f64,

    /// Largest step size.
    #[arg(long, default_value_t = 1.0)]
    maximum_step_size: f64,

    /// Number of log-spaced step sizes.
    #[arg(long, default_value_t = 10)]
    num_step_sizes: usize,

    /// Round change at or below which a run has converged.
    #[arg(long, default_value_t = 1e-5)]
    convergence_tolerance: f64,

    /// Whole-vector updates; `false` updates one state at a time.
    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    synchronized: bool,

    /// Use 64-bit precision (default is 32-bit).
    #[arg(long = "64bit")]
    use_64bit: bool,

    /// Run differential value iteration.
    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    dvi: bool,

    /// Smallest DVI beta.
    #[arg(long, default_value_t = 1e-3)]
    dvi_minimum_beta: f64,

    /// Largest DVI beta.
    #[arg(long, default_value_t = 1.0)]
    dvi_maximum_beta: f64,

    /// Number of DVI betas.
    #[arg(long, default_value_t = 10)]
    dvi_num_betas: usize,

    /// Initial DVI reward-rate estimate.
    #[arg(long, default_value_t = 0.0)]
    dvi_initial_rbar: f64,

    /// Run relative value iteration.
    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    rvi: bool,

    /// RVI reference state.
    #[arg(long, default_value_t = 0)]
    rvi_reference_index: usize,

    /// Save each combination's final estimates as `.npy`.
    #[arg(long)]
    save_final_estimates: bool,

    /// Directory for saved estimates.
    #[arg(long, default_value = "results")]
    results_dir: PathBuf,
}

#[derive(Debug, Args)]
struct EvaluationArgs {
    #[command(flatten)]
    common: CommonArgs,

    /// Run multichain differential value iteration.
    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    mdvi: bool,

    /// Smallest MDVI beta.
    #[arg(long, default_value_t = 1e-3)]
    mdvi_minimum_beta: f64,

    /// Largest MDVI beta.
    #[arg(long, default_value_t = 1.0)]
    mdvi_maximum_beta: f64,

    /// Number of MDVI betas.
    #[arg(long, default_value_t = 10)]
    mdvi_num_betas: usize,

    /// Initial MDVI reward-rate estimate.
    #[arg(long, default_value_t = 0.0)]
    mdvi_initial_rbar: f64,

    /// Include MRP1 (two-state ergodic chain).
    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    mrp1: bool,

    /// Include MRP2 (three-state cycle).
    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    mrp2: bool,

    /// Include MRP3 (multichain).
    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    mrp3: bool,
}

#[derive(Debug, Args)]
struct ControlArgs {
    #[command(flatten)]
    common: CommonArgs,

    /// Include MDP1 (two states, two actions).
    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    mdp1: bool,

    /// Include GARET1 (4 states, 4 actions).
    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    garet1: bool,

    /// Include GARET2 (4 states, 20 actions).
    #[arg(long, default_value_t = false, action = ArgAction::Set)]
    garet2: bool,

    /// Include GARET3 (10 states, 2 actions).
    #[arg(long, default_value_t = false, action = ArgAction::Set)]
    garet3: bool,

    /// Include the 100-state GARET preset.
    #[arg(long, default_value_t = false, action = ArgAction::Set)]
    garet100: bool,

    /// Seed for every selected GARET preset.
    #[arg(long, default_value_t = 42)]
    garet_seed: u64,
}

impl CommonArgs {
    fn into_config(self) -> SweepConfig {
        SweepConfig {
            max_iters: self.max_iters,
            step_sizes: ScheduleRange {
                minimum: self.minimum_step_size,
                maximum: self.maximum_step_size,
                count: self.num_step_sizes,
            },
            convergence_tolerance: self.convergence_tolerance,
            synchronized: self.synchronized,
            precision: if self.use_64bit {
                Precision::F64
            } else {
                Precision::F32
            },
            dvi: self.dvi.then_some(BetaSweep {
                betas: ScheduleRange {
                    minimum: self.dvi_minimum_beta,
                    maximum: self.dvi_maximum_beta,
                    count: self.dvi_num_betas,
                },
                initial_r_bar: self.dvi_initial_rbar,
            }),
            mdvi: None,
            rvi: self.rvi.then_some(self.rvi_reference_index),
            environments: Vec::new(),
            save_final_estimates: self.save_final_estimates,
            results_dir: self.results_dir,
        }
    }
}

impl Command {
    fn into_config(self) -> SweepConfig {
        match self {
            Self::Evaluation(args) => {
                let environments = [
                    (args.mrp1, EnvironmentSource::Mrp1),
                    (args.mrp2, EnvironmentSource::Mrp2),
                    (args.mrp3, EnvironmentSource::Mrp3),
                ]
                .into_iter()
                .filter_map(|(on, source)| on.then_some(source))
                .collect();
                SweepConfig {
                    mdvi: args.mdvi.then_some(BetaSweep {
                        betas: ScheduleRange {
                            minimum: args.mdvi_minimum_beta,
                            maximum: args.mdvi_maximum_beta,
                            count: args.mdvi_num_betas,
                        },
                        initial_r_bar: args.mdvi_initial_rbar,
                    }),
                    environments,
                    ..args.common.into_config()
                }
            }
            Self::Control(args) => {
                let garet = |params: GaretParams| {
                    EnvironmentSource::Garet(params.with_seed(args.garet_seed))
                };
                let environments = [
                    (args.mdp1, EnvironmentSource::Mdp1),
                    (args.garet1, garet(GARET1)),
                    (args.garet2, garet(GARET2)),
                    (args.garet3, garet(GARET3)),
                    (args.garet100, garet(GARET_100)),
                ]
                .into_iter()
                .filter_map(|(on, source)| on.then_some(source))
                .collect();
                SweepConfig {
                    environments,
                    ..args.common.into_config()
                }
            }
        }
    }
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "diffvi=info",
        1 => "diffvi=debug",
        _ => "diffvi=trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .finish();

    // A second initialisation (only possible in tests) keeps the first.
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("diffvi: logging not initialised: {e}");
    }
}

fn outcome_line<T: Element>(c: &CombinationReport<T>) -> String {
    let o = &c.outcome;
    let mut line = format!(
        "step_size:{:.5}\tConverged:{}\tafter {} iterations\tChange:{:.3e}\tFinal Changes:{}",
        o.step_size,
        o.converged(),
        o.iterations,
        o.final_change,
        o.final_changes
    );
    if let Some(location) = &c.artifact {
        line.push_str("\tsaved:");
        line.push_str(location);
    }
    line
}

fn run<T: Element>(config: &SweepConfig) -> Result<(), Box<dyn Error>> {
    let report = run_config::<T>(config, None)?;

    let mut current = None;
    for c in &report.combinations {
        let group = (c.environment.as_str(), c.algorithm.as_str());
        if current != Some(group) {
            println!("Running {} on {}", c.algorithm, c.environment);
            current = Some(group);
        }
        println!("{}", outcome_line(c));
    }

    info!(
        combinations = report.combinations.len(),
        converged = report.count(Termination::Converged),
        diverged = report.count(Termination::Diverged),
        exhausted = report.count(Termination::Exhausted),
        "sweep complete"
    );
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = cli.command.into_config();
    info!(
        precision = %config.precision,
        environments = config.environments.len(),
        "starting sweep"
    );
    match config.precision {
        Precision::F32 => run::<f32>(&config),
        Precision::F64 => run::<f64>(&config),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> SweepConfig {
        let cli = Cli::try_parse_from(std::iter::once("diffvi").chain(args.iter().copied()))
            .unwrap();
        cli.command.into_config()
    }

    #[test]
    fn evaluation_defaults_match_library_defaults() {
        assert_eq!(parse(&["evaluation"]), SweepConfig::default());
    }

    #[test]
    fn evaluation_flags_override() {
        let config = parse(&[
            "evaluation",
            "--64bit",
            "--synchronized",
            "false",
            "--mdvi",
            "false",
            "--mrp2",
            "false",
            "--max-iters",
            "10",
            "--rvi-reference-index",
            "1",
        ]);
        assert_eq!(config.precision, Precision::F64);
        assert!(!config.synchronized);
        assert!(config.mdvi.is_none());
        assert_eq!(
            config.environments,
            vec![EnvironmentSource::Mrp1, EnvironmentSource::Mrp3]
        );
        assert_eq!(config.max_iters, 10);
        assert_eq!(config.rvi, Some(1));
    }

    #[test]
    fn control_selects_mdps_with_seed() {
        let config = parse(&["control", "--garet3", "true", "--garet-seed", "7"]);
        assert!(config.mdvi.is_none());
        assert_eq!(
            config.environments,
            vec![
                EnvironmentSource::Mdp1,
                EnvironmentSource::Garet(GARET1.with_seed(7)),
                EnvironmentSource::Garet(GARET3.with_seed(7)),
            ]
        );
        config.validate().unwrap();
    }

    #[test]
    fn disabling_everything_fails_validation() {
        let config = parse(&["evaluation", "--dvi", "false", "--mdvi", "false", "--rvi", "false"]);
        assert_eq!(config.validate(), Err(ConfigError::NoAlgorithms));
        let config = parse(&[
            "evaluation", "--mrp1", "false", "--mrp2", "false", "--mrp3", "false",
        ]);
        assert_eq!(config.validate(), Err(ConfigError::NoEnvironments));
    }

    #[test]
    fn outcome_line_reports_final_change() {
        let mut report = CombinationReport {
            index: 3,
            environment: "mrp1 D:float64".to_string(),
            algorithm: "rvi(reference_index=0)".to_string(),
            outcome: RunOutcome {
                step_size: 0.1,
                status: Termination::Converged,
                iterations: 364,
                final_change: 8e-6,
                final_changes: diffvi::ndarray::arr1(&[8e-6f64, 0.0]),
            },
            artifact: None,
        };
        let line = outcome_line(&report);
        assert!(
            line.starts_with("step_size:0.10000\tConverged:true\tafter 364 iterations\tChange:8.000e-6\t"),
            "{line}"
        );
        assert!(!line.contains("saved:"));

        report.artifact = Some("results/stamp-3.npy".to_string());
        assert!(outcome_line(&report).ends_with("\tsaved:results/stamp-3.npy"));
    }

    #[test]
    fn repeated_logging_init_is_reported_not_fatal() {
        init_logging(0);
        init_logging(2);
        assert!(tracing::dispatcher::has_been_set());
    }

    #[test]
    fn verbosity_is_global() {
        let cli = Cli::try_parse_from(["diffvi", "control", "-vv"]).unwrap();
        assert_eq!(cli.verbose, 2);
    }
}
