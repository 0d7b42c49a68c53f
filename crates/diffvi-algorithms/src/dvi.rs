//! Differential value iteration.
//!
//! Maintains value estimates `v` and a scalar reward-rate estimate `r̄`.
//! Each update moves `v` by `α δ` and `r̄` by `β α Σ δ`, where the
//! differential error is
//!
//! - evaluation: `δ = r − r̄ + P v − v`
//! - control: `δ = max_a (r_a + P_a v) − r̄ − v`
//!
//! Asynchronous mode updates one state per call, cycling `0..S`.

use diffvi_core::{Element, MarkovDecisionProcess, MarkovRewardProcess};
use ndarray::{arr1, Array1};

use crate::algorithm::{any_non_finite, check_initial_values, Algorithm, AlgorithmError};
use crate::backup::{greedy_backup, greedy_backup_state};

/// Differential value iteration for policy evaluation on an MRP.
#[derive(Debug)]
pub struct Evaluation<'a, T: Element> {
    mrp: &'a MarkovRewardProcess<T>,
    values: Array1<T>,
    r_bar: T,
    step_size: T,
    beta: T,
    synchronized: bool,
    index: usize,
}

impl<'a, T: Element> Evaluation<'a, T> {
    /// Create an evaluator.
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
            r_bar: T::narrow(initial_r_bar),
            step_size: T::narrow(step_size),
            beta: T::narrow(beta),
            synchronized,
            index: 0,
        })
    }

    /// Current reward-rate estimate.
    pub fn r_bar(&self) -> T {
        self.r_bar
    }

    fn update_sync(&mut self) -> Array1<T> {
        let changes = self.mrp.rewards() - self.r_bar
            + &self.mrp.transitions().dot(&self.values)
            - &self.values;
        self.values.scaled_add(self.step_size, &changes);
        self.r_bar += self.beta * self.step_size * changes.sum();
        changes
    }

    fn update_async(&mut self) -> Array1<T> {
        let n = self.mrp.num_states();
        if n == 0 {
            return Array1::zeros(0);
        }
        let s = self.index;
        let change = self.mrp.rewards()[s] - self.r_bar
            + self.mrp.transitions().row(s).dot(&self.values)
            - self.values[s];
        self.values[s] += self.step_size * change;
        self.r_bar += self.beta * self.step_size * change;
        self.index = (s + 1) % n;
        arr1(&[change])
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
        !self.r_bar.is_finite() || any_non_finite(&self.values)
    }

    fn estimates(&self) -> Array1<T> {
        self.values.clone()
    }
}

/// Differential value iteration for control on an MDP.
#[derive(Debug)]
pub struct Control<'a, T: Element> {
    mdp: &'a MarkovDecisionProcess<T>,
    values: Array1<T>,
    r_bar: T,
    step_size: T,
    beta: T,
    synchronized: bool,
    index: usize,
}

impl<'a, T: Element> Control<'a, T> {
    /// Create a controller.
    ///
    /// # Errors
    ///
    /// [`AlgorithmError::InitialValuesLength`] if `initial_values` does not
    /// have one entry per state.
    pub fn new(
        mdp: &'a MarkovDecisionProcess<T>,
        initial_values: Array1<T>,
        step_size: f64,
        beta: f64,
        initial_r_bar: f64,
        synchronized: bool,
    ) -> Result<Self, AlgorithmError> {
        check_initial_values(&initial_values, mdp.num_states())?;
        Ok(Self {
            mdp,
            values: initial_values,
            r_bar: T::narrow(initial_r_bar),
            step_size: T::narrow(step_size),
            beta: T::narrow(beta),
            synchronized,
            index: 0,
        })
    }

    /// Current reward-rate estimate.
    pub fn r_bar(&self) -> T {
        self.r_bar
    }
}

impl<T: Element> Algorithm<T> for Control<'_, T> {
    fn update(&mut self) -> Array1<T> {
        if self.synchronized {
            let changes = greedy_backup(self.mdp, &self.values) - self.r_bar - &self.values;
            self.values.scaled_add(self.step_size, &changes);
            self.r_bar += self.beta * self.step_size * changes.sum();
            return changes;
        }

        let n = self.mdp.num_states();
        if n == 0 {
            return Array1::zeros(0);
        }
        let s = self.index;
        let change = greedy_backup_state(self.mdp, &self.values, s) - self.r_bar - self.values[s];
        self.values[s] += self.step_size * change;
        self.r_bar += self.beta * self.step_size * change;
        self.index = (s + 1) % n;
        arr1(&[change])
    }

    fn diverged(&self) -> bool {
        !self.r_bar.is_finite() || any_non_finite(&self.values)
    }

    fn estimates(&self) -> Array1<T> {
        self.values.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use diffvi_envs::micro;

    const GAIN_MRP1: f64 = 2.0 / 3.0;

    #[test]
    fn synchronized_evaluation_finds_average_reward() {
        let mrp = micro::mrp1::<f64>().unwrap();
        let mut alg = Evaluation::new(&mrp, Array1::zeros(2), 0.1, 0.1, 0.0, true).unwrap();
        for _ in 0..3000 {
            let changes = alg.update();
            assert_eq!(changes.len(), 2);
        }
        assert!((alg.r_bar() - GAIN_MRP1).abs() < 1e-4, "r_bar {}", alg.r_bar());
        let v = alg.estimates();
        // Differential values are unique up to a constant.
        assert!((v[0] - v[1] - 10.0 / 3.0).abs() < 1e-3, "{v}");
        assert!(!alg.diverged());
    }

    #[test]
    fn asynchronous_evaluation_touches_one_state_per_update() {
        let mrp = micro::mrp1::<f64>().unwrap();
        let mut alg = Evaluation::new(&mrp, Array1::zeros(2), 0.1, 0.1, 0.0, false).unwrap();
        let first = alg.update();
        assert_eq!(first.len(), 1);
        // State 0: r = 1, r_bar = 0, v = 0 -> change of exactly 1.
        assert_eq!(first[0], 1.0);
        assert_eq!(alg.estimates(), arr1(&[0.1, 0.0]));
        for _ in 0..6000 {
            alg.update();
        }
        assert!((alg.r_bar() - GAIN_MRP1).abs() < 1e-4, "r_bar {}", alg.r_bar());
    }

    #[test]
    fn initial_r_bar_is_respected() {
        let mrp = micro::mrp1::<f32>().unwrap();
        let alg = Evaluation::new(&mrp, Array1::zeros(2), 0.1, 0.1, 0.5, true).unwrap();
        assert_eq!(alg.r_bar(), 0.5);
    }

    #[test]
    fn wrong_initial_values_length_is_rejected() {
        let mrp = micro::mrp1::<f64>().unwrap();
        let err = Evaluation::new(&mrp, Array1::zeros(3), 0.1, 0.1, 0.0, true).unwrap_err();
        assert_eq!(
            err,
            AlgorithmError::InitialValuesLength {
                expected: 2,
                found: 3
            }
        );
    }

    #[test]
    fn non_finite_estimates_report_divergence() {
        let mrp = micro::mrp1::<f64>().unwrap();
        let alg = Evaluation::new(&mrp, arr1(&[f64::NAN, 0.0]), 0.1, 0.1, 0.0, true).unwrap();
        assert!(alg.diverged());
        let alg = Evaluation::new(&mrp, Array1::zeros(2), 0.1, 0.1, f64::INFINITY, true).unwrap();
        assert!(alg.diverged());
    }

    #[test]
    fn control_prefers_rewarding_state() {
        let mdp = micro::mdp1::<f64>().unwrap();
        let mut alg = Control::new(&mdp, Array1::zeros(2), 0.5, 0.1, 0.0, true).unwrap();
        for _ in 0..5000 {
            alg.update();
        }
        assert!(!alg.diverged());
        // Staying in state 1 earns 1 per step with probability 0.9.
        assert!(alg.r_bar() > 0.5, "r_bar {}", alg.r_bar());
        let v = alg.estimates();
        assert!(v[1] > v[0], "{v}");
    }

    #[test]
    fn asynchronous_control_cycles_states() {
        let mdp = micro::mdp1::<f32>().unwrap();
        let mut alg = Control::new(&mdp, Array1::zeros(2), 0.5, 0.1, 0.0, false).unwrap();
        let first = alg.update();
        // State 0 backup with zero values is the best immediate reward, 0.5.
        assert_eq!(first, arr1(&[0.5f32]));
        let second = alg.update();
        assert_eq!(second.len(), 1);
        let v = alg.estimates();
        assert_eq!(v[0], 0.25);
    }
}
