//! Markov decision process record.

use ndarray::{Array2, Array3, ArrayD, Axis, Ix2, Ix3};

use crate::element::Element;
use crate::error::{ProcessError, ProcessKind};
use crate::traits::Environment;

/// Maximum absolute deviation from one allowed in an MDP transition row.
///
/// Looser than the MRP check because generated or derived probabilities
/// accumulate floating-point error.
pub const TRANSITION_SUM_TOLERANCE: f64 = 1e-5;

/// A validated, immutable Markov decision process.
///
/// - `transitions`: `A x S x S`; `transitions[[a, s, ..]]` is the
///   next-state distribution after taking action `a` in state `s`.
/// - `rewards`: `A x S`, expected reward for taking `a` in `s`, already
///   marginalised over next states.
#[derive(Clone, Debug, PartialEq)]
pub struct MarkovDecisionProcess<T: Element> {
    transitions: Array3<T>,
    rewards: Array2<T>,
    name: String,
}

impl<T: Element> MarkovDecisionProcess<T> {
    /// Validate dynamically-ranked arrays and build the process.
    ///
    /// # Errors
    ///
    /// Returns the first violated invariant. Row-sum failures report the
    /// first action with offending rows and every offending state for it.
    pub fn new(
        transitions: ArrayD<T>,
        rewards: ArrayD<T>,
        name: impl Into<String>,
    ) -> Result<Self, ProcessError> {
        let t_shape = transitions.shape().to_vec();
        let r_shape = rewards.shape().to_vec();

        if transitions.ndim() != 3 {
            return Err(ProcessError::TransitionsRank {
                kind: ProcessKind::Mdp,
                expected: 3,
                shape: t_shape,
            });
        }
        if t_shape[1] != t_shape[2] {
            return Err(ProcessError::TransitionsNotSquare {
                kind: ProcessKind::Mdp,
                shape: t_shape,
            });
        }
        if rewards.ndim() != 2 {
            return Err(ProcessError::RewardsRank {
                kind: ProcessKind::Mdp,
                expected: 2,
                shape: r_shape,
            });
        }
        if t_shape[0] != r_shape[0] {
            return Err(ProcessError::ActionCountMismatch {
                transitions: t_shape,
                rewards: r_shape,
            });
        }
        if t_shape[1] != r_shape[1] {
            return Err(ProcessError::StateCountMismatch {
                kind: ProcessKind::Mdp,
                transitions: t_shape,
                rewards: r_shape,
            });
        }

        let transitions = transitions.into_dimensionality::<Ix3>().map_err(|_| {
            ProcessError::TransitionsRank {
                kind: ProcessKind::Mdp,
                expected: 3,
                shape: t_shape.clone(),
            }
        })?;
        let rewards = rewards.into_dimensionality::<Ix2>().map_err(|_| {
            ProcessError::RewardsRank {
                kind: ProcessKind::Mdp,
                expected: 2,
                shape: r_shape.clone(),
            }
        })?;

        for (action, block) in transitions.axis_iter(Axis(0)).enumerate() {
            let bad_states: Vec<usize> = block
                .rows()
                .into_iter()
                .enumerate()
                .filter(|(_, row)| {
                    let error = (1.0 - row.sum().widen()).abs();
                    // NaN mass fails the comparison and is reported.
                    !(error <= TRANSITION_SUM_TOLERANCE)
                })
                .map(|(s, _)| s)
                .collect();
            if !bad_states.is_empty() {
                return Err(ProcessError::ActionRowsNotStochastic {
                    action,
                    states: bad_states,
                });
            }
        }

        Ok(Self {
            transitions,
            rewards,
            name: name.into(),
        })
    }

    /// Build from statically-ranked arrays. Runs the same checks as
    /// [`new`](Self::new).
    pub fn from_arrays(
        transitions: Array3<T>,
        rewards: Array2<T>,
        name: impl Into<String>,
    ) -> Result<Self, ProcessError> {
        Self::new(transitions.into_dyn(), rewards.into_dyn(), name)
    }

    /// `A x S x S` transition probabilities.
    pub fn transitions(&self) -> &Array3<T> {
        &self.transitions
    }

    /// `A x S` expected rewards.
    pub fn rewards(&self) -> &Array2<T> {
        &self.rewards
    }

    /// Descriptive label.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of states `S`.
    pub fn num_states(&self) -> usize {
        self.transitions.len_of(Axis(1))
    }

    /// Number of actions `A`.
    pub fn num_actions(&self) -> usize {
        self.transitions.len_of(Axis(0))
    }
}

impl<T: Element> Environment for MarkovDecisionProcess<T> {
    fn num_states(&self) -> usize {
        self.transitions.len_of(Axis(1))
    }

    fn name(&self) -> &str {
        &self.name
    }
}
