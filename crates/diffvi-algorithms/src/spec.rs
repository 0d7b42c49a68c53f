//! Fully-specified algorithm configurations.
//!
//! A sweep over hyperparameters is a `Vec<AlgorithmSpec>`: one record per
//! hyperparameter value, each naming the family it instantiates. The
//! harness iterates the list and asks each record to build a fresh
//! algorithm for every step size.

use std::fmt;

use diffvi_core::{Element, MarkovDecisionProcess, MarkovRewardProcess};

use crate::algorithm::{Algorithm, AlgorithmError, AlgorithmFactory, AlgorithmInit};
use crate::rvi::check_reference_index;
use crate::{dvi, mdvi, rvi};

/// Algorithm family, independent of hyperparameters.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AlgorithmFamily {
    /// Differential value iteration.
    Dvi,
    /// Multichain differential value iteration.
    Mdvi,
    /// Relative value iteration.
    Rvi,
}

impl AlgorithmFamily {
    /// Short lowercase name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Dvi => "dvi",
            Self::Mdvi => "mdvi",
            Self::Rvi => "rvi",
        }
    }
}

impl fmt::Display for AlgorithmFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One algorithm family with all of its hyperparameters bound.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum AlgorithmSpec {
    /// [`dvi`] with a fixed `β` and starting reward-rate estimate.
    Dvi {
        /// Reward-rate learning-rate multiplier.
        beta: f64,
        /// Starting `r̄`.
        initial_r_bar: f64,
    },
    /// [`mdvi`] with a fixed `β` and starting per-state gain.
    Mdvi {
        /// Gain learning-rate multiplier.
        beta: f64,
        /// Starting value of every entry of `ḡ`.
        initial_r_bar: f64,
    },
    /// [`rvi`] anchored at a reference state.
    Rvi {
        /// Index of the anchoring state.
        reference_index: usize,
    },
}

impl AlgorithmSpec {
    /// The family this record instantiates.
    pub fn family(&self) -> AlgorithmFamily {
        match self {
            Self::Dvi { .. } => AlgorithmFamily::Dvi,
            Self::Mdvi { .. } => AlgorithmFamily::Mdvi,
            Self::Rvi { .. } => AlgorithmFamily::Rvi,
        }
    }

    fn check_states(&self, num_states: usize) -> Result<(), AlgorithmError> {
        match *self {
            Self::Rvi { reference_index } => check_reference_index(reference_index, num_states),
            Self::Dvi { .. } | Self::Mdvi { .. } => Ok(()),
        }
    }
}

impl fmt::Display for AlgorithmSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Dvi {
                beta,
                initial_r_bar,
            }
            | Self::Mdvi {
                beta,
                initial_r_bar,
            } => write!(
                f,
                "{}(beta={beta:.5}, initial_r_bar={initial_r_bar})",
                self.family()
            ),
            Self::Rvi { reference_index } => {
                write!(f, "rvi(reference_index={reference_index})")
            }
        }
    }
}

impl<T: Element> AlgorithmFactory<MarkovRewardProcess<T>, T> for AlgorithmSpec {
    fn label(&self) -> String {
        self.to_string()
    }

    fn check(&self, environment: &MarkovRewardProcess<T>) -> Result<(), AlgorithmError> {
        self.check_states(environment.num_states())
    }

    fn build<'a>(
        &self,
        init: AlgorithmInit<'a, MarkovRewardProcess<T>, T>,
    ) -> Result<Box<dyn Algorithm<T> + 'a>, AlgorithmError> {
        let AlgorithmInit {
            environment,
            initial_values,
            step_size,
            synchronized,
        } = init;
        let algorithm: Box<dyn Algorithm<T> + 'a> = match *self {
            Self::Dvi {
                beta,
                initial_r_bar,
            } => Box::new(dvi::Evaluation::new(
                environment,
                initial_values,
                step_size,
                beta,
                initial_r_bar,
                synchronized,
            )?),
            Self::Mdvi {
                beta,
                initial_r_bar,
            } => Box::new(mdvi::Evaluation::new(
                environment,
                initial_values,
                step_size,
                beta,
                initial_r_bar,
                synchronized,
            )?),
            Self::Rvi { reference_index } => Box::new(rvi::Evaluation::new(
                environment,
                initial_values,
                step_size,
                reference_index,
                synchronized,
            )?),
        };
        Ok(algorithm)
    }
}

impl<T: Element> AlgorithmFactory<MarkovDecisionProcess<T>, T> for AlgorithmSpec {
    fn label(&self) -> String {
        self.to_string()
    }

    fn check(&self, environment: &MarkovDecisionProcess<T>) -> Result<(), AlgorithmError> {
        if let Self::Mdvi { .. } = self {
            return Err(AlgorithmError::Unsupported {
                algorithm: self.to_string(),
                environment: "mdp",
            });
        }
        self.check_states(environment.num_states())
    }

    fn build<'a>(
        &self,
        init: AlgorithmInit<'a, MarkovDecisionProcess<T>, T>,
    ) -> Result<Box<dyn Algorithm<T> + 'a>, AlgorithmError> {
        let AlgorithmInit {
            environment,
            initial_values,
            step_size,
            synchronized,
        } = init;
        let algorithm: Box<dyn Algorithm<T> + 'a> = match *self {
            Self::Dvi {
                beta,
                initial_r_bar,
            } => Box::new(dvi::Control::new(
                environment,
                initial_values,
                step_size,
                beta,
                initial_r_bar,
                synchronized,
            )?),
            Self::Rvi { reference_index } => Box::new(rvi::Control::new(
                environment,
                initial_values,
                step_size,
                reference_index,
                synchronized,
            )?),
            Self::Mdvi { .. } => {
                return Err(AlgorithmError::Unsupported {
                    algorithm: self.to_string(),
                    environment: "mdp",
                })
            }
        };
        Ok(algorithm)
    }
}
