//! GARET: Generic Average Reward Environment Testbed.
//!
//! A special case of Bhatnagar et al.'s GARNET. Produces exact transition
//! and reward tables for value/policy iteration research; it does not
//! support online, sample-based operation.
//!
//! All randomness comes from one
//! ChaCha8 stream seeded from [`GaretParams::seed`], drawn in a fixed
//! order (next states, then branch probabilities, then branch rewards),
//! so identical parameters produce bit-identical processes.

use std::error::Error;
use std::fmt;

use diffvi_core::{Element, MarkovDecisionProcess, ProcessError};
use ndarray::{Array3, Axis};
use rand::prelude::*;
use rand::seq::index;
use rand_chacha::ChaCha8Rng;

/// Parameters fully determining a GARET instance.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct GaretParams {
    /// Seed for the random stream.
    pub seed: u64,
    /// Number of states `S`.
    pub num_states: usize,
    /// Number of actions `A`.
    pub num_actions: usize,
    /// Reachable next states per (state, action) pair. Must be in `1..=S`.
    pub branching_factor: usize,
}

/// Small dense instance: 4 states, 4 actions.
pub const GARET1: GaretParams = GaretParams {
    seed: 42,
    num_states: 4,
    num_actions: 4,
    branching_factor: 3,
};

/// More actions: 4 states, 20 actions.
pub const GARET2: GaretParams = GaretParams {
    seed: 42,
    num_states: 4,
    num_actions: 20,
    branching_factor: 3,
};

/// More states: 10 states, 2 actions.
pub const GARET3: GaretParams = GaretParams {
    seed: 42,
    num_states: 10,
    num_actions: 2,
    branching_factor: 3,
};

/// 100 states, 2 actions.
pub const GARET_100: GaretParams = GaretParams {
    seed: 42,
    num_states: 100,
    num_actions: 2,
    branching_factor: 3,
};

impl GaretParams {
    /// Same parameters with a different seed.
    pub fn with_seed(self, seed: u64) -> Self {
        Self { seed, ..self }
    }

    /// Check that the branching factor can be sampled without replacement.
    pub fn validate(&self) -> Result<(), GaretError> {
        if self.branching_factor == 0 || self.branching_factor > self.num_states {
            return Err(GaretError::BranchingFactor {
                branching_factor: self.branching_factor,
                num_states: self.num_states,
            });
        }
        Ok(())
    }
}

/// Errors from [`create`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GaretError {
    /// Branching factor is zero or exceeds the number of states.
    BranchingFactor {
        /// The configured branching factor.
        branching_factor: usize,
        /// The configured number of states.
        num_states: usize,
    },
    /// The assembled arrays failed process validation.
    Process(ProcessError),
}

impl fmt::Display for GaretError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BranchingFactor {
                branching_factor,
                num_states,
            } => write!(
                f,
                "branching factor {branching_factor} must be in 1..={num_states} (number of states)"
            ),
            Self::Process(e) => write!(f, "generated process invalid: {e}"),
        }
    }
}

impl Error for GaretError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Process(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ProcessError> for GaretError {
    fn from(e: ProcessError) -> Self {
        Self::Process(e)
    }
}

/// Generate a standard normal sample using the Box-Muller transform.
fn standard_normal(rng: &mut ChaCha8Rng) -> f64 {
    let u1: f64 = rng.random::<f64>().max(1e-300); // avoid ln(0)
    let u2: f64 = rng.random();
    (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos()
}

/// Create the transition and reward tables for a GARET instance.
///
/// Per (state, action) pair: `branching_factor` distinct next states are
/// drawn without replacement, given normalised uniform probabilities and
/// standard normal rewards. Rewards are then marginalised over next
/// states, yielding an `A x S` expected-reward table. All arithmetic is
/// carried out in `f64`; the result is cast to `T` once.
///
/// # Errors
///
/// [`GaretError::BranchingFactor`] if `branching_factor` is not in
/// `1..=num_states`.
pub fn create<T: Element>(params: &GaretParams) -> Result<MarkovDecisionProcess<T>, GaretError> {
    params.validate()?;
    let GaretParams {
        seed,
        num_states,
        num_actions,
        branching_factor,
    } = *params;
    let pairs = num_states * num_actions;
    let mut rng = ChaCha8Rng::seed_from_u64(seed);

    // Pair `p` is (state p / A, action p % A).
    let next_states: Vec<Vec<usize>> = (0..pairs)
        .map(|_| index::sample(&mut rng, num_states, branching_factor).into_vec())
        .collect();

    // Magnitudes in (0, 1] so every branch keeps non-zero mass.
    let branch_probs: Vec<Vec<f64>> = (0..pairs)
        .map(|_| {
            let magnitudes: Vec<f64> = (0..branching_factor)
                .map(|_| 1.0 - rng.random::<f64>())
                .collect();
            let total: f64 = magnitudes.iter().sum();
            magnitudes.into_iter().map(|m| m / total).collect()
        })
        .collect();

    let branch_rewards: Vec<Vec<f64>> = (0..pairs)
        .map(|_| {
            (0..branching_factor)
                .map(|_| standard_normal(&mut rng))
                .collect()
        })
        .collect();

    // Dense (S, A, S') tables; non-branch entries stay zero.
    let mut transitions = Array3::<f64>::zeros((num_states, num_actions, num_states));
    let mut transition_rewards = Array3::<f64>::zeros((num_states, num_actions, num_states));
    for pair in 0..pairs {
        let (state, action) = (pair / num_actions, pair % num_actions);
        for (k, &next) in next_states[pair].iter().enumerate() {
            transitions[[state, action, next]] = branch_probs[pair][k];
            transition_rewards[[state, action, next]] = branch_rewards[pair][k];
        }
    }

    let expected_rewards = (&transitions * &transition_rewards).sum_axis(Axis(2));

    // (S, A, S') -> (A, S, S') and (S, A) -> (A, S).
    let transitions = transitions.permuted_axes([1, 0, 2]).mapv(T::narrow);
    let rewards = expected_rewards.reversed_axes().mapv(T::narrow);

    let name = format!(
        "GARET S:{num_states} A:{num_actions} B:{branching_factor} K:{seed}@{} D:{}",
        rng.get_word_pos(),
        T::DTYPE,
    );
    MarkovDecisionProcess::from_arrays(transitions, rewards, name).map_err(GaretError::Process)
}
