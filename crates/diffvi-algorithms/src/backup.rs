//! Greedy one-step backups over MDP actions.

use diffvi_core::{Element, MarkovDecisionProcess};
use ndarray::{Array1, Axis};

/// `max_a (r[a, s] + P[a, s, ..] · v)` for every state.
pub(crate) fn greedy_backup<T: Element>(
    mdp: &MarkovDecisionProcess<T>,
    values: &Array1<T>,
) -> Array1<T> {
    let mut best = Array1::from_elem(mdp.num_states(), T::neg_infinity());
    for (block, rewards) in mdp
        .transitions()
        .axis_iter(Axis(0))
        .zip(mdp.rewards().axis_iter(Axis(0)))
    {
        let q = &rewards + &block.dot(values);
        best.zip_mut_with(&q, |b, &q| {
            if q > *b {
                *b = q;
            }
        });
    }
    best
}

/// [`greedy_backup`] restricted to a single state.
pub(crate) fn greedy_backup_state<T: Element>(
    mdp: &MarkovDecisionProcess<T>,
    values: &Array1<T>,
    state: usize,
) -> T {
    let mut best = T::neg_infinity();
    for action in 0..mdp.num_actions() {
        let q = mdp.rewards()[[action, state]]
            + mdp
                .transitions()
                .index_axis(Axis(0), action)
                .row(state)
                .dot(values);
        if q > best {
            best = q;
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::arr1;

    #[test]
    fn whole_vector_and_single_state_agree() {
        let mdp = diffvi_envs::micro::mdp1::<f64>().unwrap();
        let values = arr1(&[0.25, -1.0]);
        let all = greedy_backup(&mdp, &values);
        for s in 0..2 {
            assert!((all[s] - greedy_backup_state(&mdp, &values, s)).abs() < 1e-12);
        }
    }

    #[test]
    fn picks_best_action() {
        let mdp = diffvi_envs::micro::mdp1::<f64>().unwrap();
        let values = arr1(&[0.0, 0.0]);
        // With zero values the backup is the best immediate reward.
        assert_eq!(greedy_backup(&mdp, &values), arr1(&[0.5, 1.0]));
    }
}
