//! Relative value iteration.
//!
//! Values are anchored to a reference state instead of carrying a separate
//! reward-rate estimate: the value of the reference state plays the role
//! of `r̄`.
//!
//! ```text
//! evaluation: δ = r + P v − v[ref] − v
//! control:    δ = max_a (r_a + P_a v) − v[ref] − v
//! ```

use diffvi_core::{Element, MarkovDecisionProcess, MarkovRewardProcess};
use ndarray::{arr1, Array1};

use crate::algorithm::{any_non_finite, check_initial_values, Algorithm, AlgorithmError};
use crate::backup::{greedy_backup, greedy_backup_state};

/// Reject a reference state outside `0..num_states`.
pub(crate) fn check_reference_index(
    reference_index: usize,
    num_states: usize,
) -> Result<(), AlgorithmError> {
    if reference_index >= num_states {
        return Err(AlgorithmError::ReferenceIndex {
            reference_index,
            num_states,
        });
    }
    Ok(())
}

/// Relative value iteration for policy evaluation on an MRP.
#[derive(Debug)]
pub struct Evaluation<'a, T: Element> {
    mrp: &'a MarkovRewardProcess<T>,
    values: Array1<T>,
    step_size: T,
    reference_index: usize,
    synchronized: bool,
    index: usize,
}

impl<'a, T: Element> Evaluation<'a, T> {
    /// Create an evaluator anchored at `reference_index`.
    ///
    /// # Errors
    ///
    /// [`AlgorithmError::InitialValuesLength`] on a wrong-length
    /// `initial_values`, [`AlgorithmError::ReferenceIndex`] if the reference
    /// state does not exist.
    pub fn new(
        mrp: &'a MarkovRewardProcess<T>,
        initial_values: Array1<T>,
        step_size: f64,
        reference_index: usize,
        synchronized: bool,
    ) -> Result<Self, AlgorithmError> {
        check_initial_values(&initial_values, mrp.num_states())?;
        check_reference_index(reference_index, mrp.num_states())?;
        Ok(Self {
            mrp,
            values: initial_values,
            step_size: T::narrow(step_size),
            reference_index,
            synchronized,
            index: 0,
        })
    }

    /// The anchoring state.
    pub fn reference_index(&self) -> usize {
        self.reference_index
    }
}

impl<T: Element> Algorithm<T> for Evaluation<'_, T> {
    fn update(&mut self) -> Array1<T> {
        let anchor = self.values[self.reference_index];
        if self.synchronized {
            let changes =
                self.mrp.rewards() + &self.mrp.transitions().dot(&self.values) - anchor - &self.values;
            self.values.scaled_add(self.step_size, &changes);
            return changes;
        }

        let n = self.mrp.num_states();
        let s = self.index;
        let change = self.mrp.rewards()[s] + self.mrp.transitions().row(s).dot(&self.values)
            - anchor
            - self.values[s];
        self.values[s] += self.step_size * change;
        self.index = (s + 1) % n;
        arr1(&[change])
    }

    fn diverged(&self) -> bool {
        any_non_finite(&self.values)
    }

    fn estimates(&self) -> Array1<T> {
        self.values.clone()
    }
}

/// Relative value iteration for control on an MDP.
#[derive(Debug)]
pub struct Control<'a, T: Element> {
    mdp: &'a MarkovDecisionProcess<T>,
    values: Array1<T>,
    step_size: T,
    reference_index: usize,
    synchronized: bool,
    index: usize,
}

impl<'a, T: Element> Control<'a, T> {
    /// Create a controller anchored at `reference_index`.
    ///
    /// # Errors
    ///
    /// Same as [`Evaluation::new`].
    pub fn new(
        mdp: &'a MarkovDecisionProcess<T>,
        initial_values: Array1<T>,
        step_size: f64,
        reference_index: usize,
        synchronized: bool,
    ) -> Result<Self, AlgorithmError> {
        check_initial_values(&initial_values, mdp.num_states())?;
        check_reference_index(reference_index, mdp.num_states())?;
        Ok(Self {
            mdp,
            values: initial_values,
            step_size: T::narrow(step_size),
            reference_index,
            synchronized,
            index: 0,
        })
    }
}

impl<T: Element> Algorithm<T> for Control<'_, T> {
    fn update(&mut self) -> Array1<T> {
        let anchor = self.values[self.reference_index];
        if self.synchronized {
            let changes = greedy_backup(self.mdp, &self.values) - anchor - &self.values;
            self.values.scaled_add(self.step_size, &changes);
            return changes;
        }

        let n = self.mdp.num_states();
        let s = self.index;
        let change = greedy_backup_state(self.mdp, &self.values, s) - anchor - self.values[s];
        self.values[s] += self.step_size * change;
        self.index = (s + 1) % n;
        arr1(&[change])
    }

    fn diverged(&self) -> bool {
        any_non_finite(&self.values)
    }

    fn estimates(&self) -> Array1<T> {
        self.values.clone()
    }
}
