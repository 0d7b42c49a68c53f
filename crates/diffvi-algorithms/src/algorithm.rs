//! The [`Algorithm`] capability and its construction contract.
//!
//! The convergence harness treats an algorithm as an opaque collaborator
//! with exactly three operations. It never inspects anything else.

use std::error::Error;
use std::fmt;

use diffvi_core::Element;
use ndarray::Array1;

/// An iterative estimator driven round by round by the harness.
///
/// # Contract
///
/// - [`update`](Algorithm::update) performs one update step and returns
///   the per-element changes it applied (the whole state vector when
///   synchronised, a single entry when asynchronous).
/// - [`diverged`](Algorithm::diverged) is a self-report that the
///   estimates are blowing up rather than settling.
/// - [`estimates`](Algorithm::estimates) returns the current value
///   estimates.
///
/// # Object safety
///
/// This trait is object-safe; factories hand out
/// `Box<dyn Algorithm<T> + 'a>`.
pub trait Algorithm<T: Element> {
    /// Perform one update step and return the changes applied.
    fn update(&mut self) -> Array1<T>;

    /// Whether the algorithm judges itself numerically divergent.
    fn diverged(&self) -> bool;

    /// Current value estimates.
    fn estimates(&self) -> Array1<T>;
}

/// Arguments common to every algorithm constructor.
#[derive(Debug)]
pub struct AlgorithmInit<'a, E, T: Element> {
    /// The process to evaluate or control. Read-only.
    pub environment: &'a E,
    /// Starting value estimates, one per state.
    pub initial_values: Array1<T>,
    /// Step size `α`.
    pub step_size: f64,
    /// Whole-vector updates (`true`) or one state per update (`false`).
    pub synchronized: bool,
}

/// A fully-specified algorithm configuration that can instantiate itself
/// against an environment of type `E`.
pub trait AlgorithmFactory<E, T: Element> {
    /// Label used in reports and logs.
    fn label(&self) -> String;

    /// Check that this configuration can run on `environment` at all.
    ///
    /// Called for every (environment, factory) pair before a sweep starts
    /// so configuration problems abort the run before any work is done.
    fn check(&self, environment: &E) -> Result<(), AlgorithmError> {
        let _ = environment;
        Ok(())
    }

    /// Build a fresh algorithm instance.
    fn build<'a>(
        &self,
        init: AlgorithmInit<'a, E, T>,
    ) -> Result<Box<dyn Algorithm<T> + 'a>, AlgorithmError>;
}

/// Errors from algorithm construction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AlgorithmError {
    /// Initial value vector does not match the number of states.
    InitialValuesLength {
        /// Number of states in the environment.
        expected: usize,
        /// Length of the supplied vector.
        found: usize,
    },
    /// Relative value iteration reference state is out of range.
    ReferenceIndex {
        /// The configured reference index.
        reference_index: usize,
        /// Number of states in the environment.
        num_states: usize,
    },
    /// The algorithm family has no variant for this kind of environment.
    Unsupported {
        /// Algorithm label.
        algorithm: String,
        /// Environment kind (e.g. `"mdp"`).
        environment: &'static str,
    },
}

impl fmt::Display for AlgorithmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InitialValuesLength { expected, found } => write!(
                f,
                "initial values have {found} entries, environment has {expected} states"
            ),
            Self::ReferenceIndex {
                reference_index,
                num_states,
            } => write!(
                f,
                "reference index {reference_index} out of range for {num_states} states"
            ),
            Self::Unsupported {
                algorithm,
                environment,
            } => write!(f, "{algorithm} cannot run on an {environment}"),
        }
    }
}

impl Error for AlgorithmError {}

/// Reject an initial value vector of the wrong length.
pub(crate) fn check_initial_values<T: Element>(
    initial_values: &Array1<T>,
    num_states: usize,
) -> Result<(), AlgorithmError> {
    if initial_values.len() != num_states {
        return Err(AlgorithmError::InitialValuesLength {
            expected: num_states,
            found: initial_values.len(),
        });
    }
    Ok(())
}

/// True if any value is NaN or infinite.
pub(crate) fn any_non_finite<'a, T: Element>(values: impl IntoIterator<Item = &'a T>) -> bool {
    values.into_iter().any(|v| !v.is_finite())
}
