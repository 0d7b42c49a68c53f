//! Multichain differential value iteration.
//!
//! Like [`dvi`](crate::dvi) but with one reward-rate estimate per state,
//! so processes with several recurrent classes (each with its own gain)
//! can still settle. Per update:
//!
//! ```text
//! δ     = r − ḡ + P v − v
//! drift = P ḡ − ḡ
//! v    += α δ
//! ḡ     = P ḡ + β δ
//! ```
//!
//! Projecting the gains through `P` keeps them constant on each recurrent
//! class; `β` blends in the differential error directly. The reported
//! changes are `δ` followed by `drift`, so convergence requires both the
//! values and the gains to stop moving.

use diffvi_core::{Element, MarkovRewardProcess};
use ndarray::{arr1, Array1};

use crate::algorithm::{any_non_finite, check_initial_values, Algorithm, AlgorithmError};

/// Multichain differential value iteration for policy evaluation.
#[derive(Debug)]
pub struct Evaluation<'a, T: Element> {
    mrp: &'a MarkovRewardProcess<T>,
    values: Array1<T>,
    gains: Array1<T>,
    step_size: T,
    beta: T,
    synchronized: bool,
    index: usize,
}

impl<'a, T: Element> Evaluation<'a, T> {
    /// Create an evaluator. Every state's gain starts at `initial_r_bar`.
    ///
    /// # Errors
    ///
    /// [`AlgorithmError::InitialValuesLength`] if `initial_values` does not
    /// have one entry per state.
    pub fn new(
        mrp: &'a MarkovRewardProcess<T>,
        initial_values: Array1<T>,
        step_size: f64,
        beta: f64,
        initial_r_bar: f64,
        synchronized: bool,
    ) -> Result<Self, AlgorithmError> {
        check_initial_values(&initial_values, mrp.num_states())?;
        Ok(Self {
            mrp,
            values: initial_values,
            gains: Array1::from_elem(mrp.num_states(), T::narrow(initial_r_bar)),
            step_size: T::narrow(step_size),
            beta: T::narrow(beta),
            synchronized,
            index: 0,
        })
    }

    /// Current per-state reward-rate estimates.
    pub fn gains(&self) -> &Array1<T> {
        &self.gains
    }

    fn update_sync(&mut self) -> Array1<T> {
        let p = self.mrp.transitions();
        let delta = self.mrp.rewards() - &self.gains + &p.dot(&self.values) - &self.values;
        let projected = p.dot(&self.gains);
        let drift = &projected - &self.gains;
        self.values.scaled_add(self.step_size, &delta);
        self.gains = projected;
        self.gains.scaled_add(self.beta, &delta);
        delta.iter().chain(drift.iter()).copied().collect()
    }

    fn update_async(&mut self) -> Array1<T> {
        let n = self.mrp.num_states();
        if n == 0 {
            return Array1::zeros(0);
        }
        let s = self.index;
        let row = self.mrp.transitions().row(s);
        let delta = self.mrp.rewards()[s] - self.gains[s] + row.dot(&self.values) - self.values[s];
        let projected = row.dot(&self.gains);
        let drift = projected - self.gains[s];
        self.values[s] += self.step_size * delta;
        self.gains[s] = projected + self.beta * delta;
        self.index = (s + 1) % n;
        arr1(&[delta, drift])
    }
}

impl<T: Element> Algorithm<T> for Evaluation<'_, T> {
    fn update(&mut self) -> Array1<T> {
        if self.synchronized {
            self.update_sync()
        } else {
            self.update_async()
        }
    }

    fn diverged(&self) -> bool {
        any_non_finite(&self.values) || any_non_finite(&self.gains)
    }

    fn estimates(&self) -> Array1<T> {
        self.values.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use diffvi_envs::micro;

    #[test]
    fn recovers_per_class_gains_on_multichain_process() {
        let mrp = micro::mrp3::<f64>().unwrap();
        let mut alg = Evaluation::new(&mrp, Array1::zeros(3), 1.0, 0.1, 0.0, true).unwrap();
        for _ in 0..2000 {
            alg.update();
        }
        let expected = [1.5, 1.0, 2.0];
        for (g, e) in alg.gains().iter().zip(expected) {
            assert!((g - e).abs() < 1e-4, "gains {}", alg.gains());
        }
        assert!(!alg.diverged());
    }

    #[test]
    fn synchronized_changes_cover_values_and_gains() {
        let mrp = micro::mrp1::<f32>().unwrap();
        let mut alg = Evaluation::new(&mrp, Array1::zeros(2), 0.1, 0.1, 0.0, true).unwrap();
        let changes = alg.update();
        assert_eq!(changes.len(), 4);
        // Zero values and gains: delta is the reward, drift is zero.
        assert_eq!(changes, arr1(&[1.0f32, 0.0, 0.0, 0.0]));
    }

    #[test]
    fn gain_step_projects_through_transitions() {
        let mrp = micro::mrp1::<f64>().unwrap();
        let mut alg = Evaluation::new(&mrp, Array1::zeros(2), 0.1, 0.1, 0.0, true).unwrap();
        alg.update();
        // Zero gains project to zero; only β δ = 0.1 × [1, 0] lands.
        assert_eq!(alg.gains(), &arr1(&[0.1, 0.0]));
        let changes = alg.update();
        // δ = [0.89, 0.02], P ḡ = [0.09, 0.02].
        let expected_gains = [0.09 + 0.089, 0.02 + 0.002];
        for (g, e) in alg.gains().iter().zip(expected_gains) {
            assert!((g - e).abs() < 1e-12, "gains {}", alg.gains());
        }
        let expected_changes = [0.89, 0.02, -0.01, 0.02];
        for (c, e) in changes.iter().zip(expected_changes) {
            assert!((c - e).abs() < 1e-12, "changes {changes}");
        }
    }

    #[test]
    fn asynchronous_update_reports_one_state() {
        let mrp = micro::mrp1::<f64>().unwrap();
        let mut alg = Evaluation::new(&mrp, Array1::zeros(2), 0.1, 0.1, 0.0, false).unwrap();
        assert_eq!(alg.update().len(), 2);
        assert_eq!(alg.estimates(), arr1(&[0.1, 0.0]));
        for _ in 0..4000 {
            alg.update();
        }
        for g in alg.gains() {
            assert!((g - 2.0 / 3.0).abs() < 1e-3, "gains {}", alg.gains());
        }
    }

    #[test]
    fn non_finite_gain_reports_divergence() {
        let mrp = micro::mrp1::<f64>().unwrap();
        let alg = Evaluation::new(&mrp, Array1::zeros(2), 0.1, 0.1, f64::NAN, true).unwrap();
        assert!(alg.diverged());
    }
}
