//! Markov reward process record.

use ndarray::{Array1, Array2, ArrayD, Ix1, Ix2};

use crate::element::Element;
use crate::error::{ProcessError, ProcessKind};
use crate::traits::Environment;

/// A validated, immutable Markov reward process.
///
/// - `transitions`: `S x S`, row `i` is the next-state distribution from `i`.
/// - `rewards`: length `S`, reward for entering each state.
///
/// The only way to obtain one is through [`new`](Self::new) or
/// [`from_arrays`](Self::from_arrays), both of which reject malformed
/// input. Every row of `transitions` sums to exactly one, with no
/// tolerance.
#[derive(Clone, Debug, PartialEq)]
pub struct MarkovRewardProcess<T: Element> {
    transitions: Array2<T>,
    rewards: Array1<T>,
    name: String,
}

impl<T: Element> MarkovRewardProcess<T> {
    /// Validate dynamically-ranked arrays and build the process.
    ///
    /// # Errors
    ///
    /// Returns the first violated invariant, in this order: transitions
    /// rank, squareness, rewards rank, state counts, row sums.
    pub fn new(
        transitions: ArrayD<T>,
        rewards: ArrayD<T>,
        name: impl Into<String>,
    ) -> Result<Self, ProcessError> {
        let t_shape = transitions.shape().to_vec();
        let r_shape = rewards.shape().to_vec();

        if transitions.ndim() != 2 {
            return Err(ProcessError::TransitionsRank {
                kind: ProcessKind::Mrp,
                expected: 2,
                shape: t_shape,
            });
        }
        if t_shape[0] != t_shape[1] {
            return Err(ProcessError::TransitionsNotSquare {
                kind: ProcessKind::Mrp,
                shape: t_shape,
            });
        }
        if rewards.ndim() != 1 {
            return Err(ProcessError::RewardsRank {
                kind: ProcessKind::Mrp,
                expected: 1,
                shape: r_shape,
            });
        }
        if t_shape[0] != r_shape[0] {
            return Err(ProcessError::StateCountMismatch {
                kind: ProcessKind::Mrp,
                transitions: t_shape,
                rewards: r_shape,
            });
        }

        let transitions = transitions.into_dimensionality::<Ix2>().map_err(|_| {
            ProcessError::TransitionsRank {
                kind: ProcessKind::Mrp,
                expected: 2,
                shape: t_shape.clone(),
            }
        })?;
        let rewards = rewards.into_dimensionality::<Ix1>().map_err(|_| {
            ProcessError::RewardsRank {
                kind: ProcessKind::Mrp,
                expected: 1,
                shape: r_shape.clone(),
            }
        })?;

        let bad_states: Vec<usize> = transitions
            .rows()
            .into_iter()
            .enumerate()
            .filter(|(_, row)| row.sum() != T::one())
            .map(|(s, _)| s)
            .collect();
        if !bad_states.is_empty() {
            return Err(ProcessError::RowsNotStochastic { states: bad_states });
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
        transitions: Array2<T>,
        rewards: Array1<T>,
        name: impl Into<String>,
    ) -> Result<Self, ProcessError> {
        Self::new(transitions.into_dyn(), rewards.into_dyn(), name)
    }

    /// `S x S` transition probabilities.
    pub fn transitions(&self) -> &Array2<T> {
        &self.transitions
    }

    /// Per-state entry rewards.
    pub fn rewards(&self) -> &Array1<T> {
        &self.rewards
    }

    /// Descriptive label.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of states `S`.
    pub fn num_states(&self) -> usize {
        self.transitions.nrows()
    }
}

impl<T: Element> Environment for MarkovRewardProcess<T> {
    fn num_states(&self) -> usize {
        self.transitions.nrows()
    }

    fn name(&self) -> &str {
        &self.name
    }
}
