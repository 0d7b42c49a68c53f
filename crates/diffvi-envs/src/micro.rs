//! Small fixed processes.
//!
//! Probabilities are chosen so every row sums to exactly one in both
//! `f32` and `f64`, which the MRP constructor requires.

use diffvi_core::{Element, MarkovDecisionProcess, MarkovRewardProcess, ProcessError};
use ndarray::{arr1, arr2, arr3};

/// Two-state ergodic chain.
///
/// Transitions `[[0.9, 0.1], [0.2, 0.8]]`, reward 1 for entering state 0.
/// Stationary distribution `(2/3, 1/3)`, average reward `2/3`.
pub fn mrp1<T: Element>() -> Result<MarkovRewardProcess<T>, ProcessError> {
    MarkovRewardProcess::from_arrays(
        arr2(&[[0.9, 0.1], [0.2, 0.8]]).mapv(T::narrow),
        arr1(&[1.0, 0.0]).mapv(T::narrow),
        format!("mrp1 D:{}", T::DTYPE),
    )
}

/// Three-state deterministic cycle `0 -> 1 -> 2 -> 0`, reward 1 for
/// entering state 2. Periodic, average reward `1/3`.
pub fn mrp2<T: Element>() -> Result<MarkovRewardProcess<T>, ProcessError> {
    MarkovRewardProcess::from_arrays(
        arr2(&[[0.0, 1.0, 0.0], [0.0, 0.0, 1.0], [1.0, 0.0, 0.0]]).mapv(T::narrow),
        arr1(&[0.0, 0.0, 1.0]).mapv(T::narrow),
        format!("mrp2 D:{}", T::DTYPE),
    )
}

/// Three-state multichain process.
///
/// State 0 is transient and splits evenly into two absorbing states with
/// rewards 1 and 2, so the gain differs per recurrent class.
pub fn mrp3<T: Element>() -> Result<MarkovRewardProcess<T>, ProcessError> {
    MarkovRewardProcess::from_arrays(
        arr2(&[[0.0, 0.5, 0.5], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]]).mapv(T::narrow),
        arr1(&[0.0, 1.0, 2.0]).mapv(T::narrow),
        format!("mrp3 D:{}", T::DTYPE),
    )
}

/// Two-state, two-action process.
///
/// Action 0 mostly stays put, action 1 mostly switches. Staying in state 1
/// pays best, so the optimal policy heads there and remains.
pub fn mdp1<T: Element>() -> Result<MarkovDecisionProcess<T>, ProcessError> {
    MarkovDecisionProcess::from_arrays(
        arr3(&[[[0.9, 0.1], [0.1, 0.9]], [[0.2, 0.8], [0.8, 0.2]]]).mapv(T::narrow),
        arr2(&[[0.0, 1.0], [0.5, -0.5]]).mapv(T::narrow),
        format!("mdp1 D:{}", T::DTYPE),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn micro_processes_validate_in_both_precisions() {
        assert_eq!(mrp1::<f32>().unwrap().num_states(), 2);
        assert_eq!(mrp1::<f64>().unwrap().num_states(), 2);
        assert_eq!(mrp2::<f32>().unwrap().num_states(), 3);
        assert_eq!(mrp2::<f64>().unwrap().num_states(), 3);
        assert_eq!(mrp3::<f32>().unwrap().num_states(), 3);
        assert_eq!(mrp3::<f64>().unwrap().num_states(), 3);
        let mdp = mdp1::<f32>().unwrap();
        assert_eq!((mdp.num_actions(), mdp.num_states()), (2, 2));
        assert!(mdp1::<f64>().is_ok());
    }

    #[test]
    fn names_carry_dtype() {
        assert_eq!(mrp1::<f32>().unwrap().name(), "mrp1 D:float32");
        assert_eq!(mdp1::<f64>().unwrap().name(), "mdp1 D:float64");
    }
}
