//! The per-combination convergence loop.
//!
//! [`run_to_convergence`] drives one algorithm instance until one of three
//! terminal states is reached:
//!
//! | Status | Trigger | `iterations` |
//! |--------|---------|--------------|
//! | [`Termination::Diverged`] | `diverged()` after a round | index of that round |
//! | [`Termination::Converged`] | round change `<= tolerance` and round index `> 1` | index of that round |
//! | [`Termination::Exhausted`] | `max_iters` rounds without either | `max_iters` |
//!
//! A round is one `update()` when synchronised and `num_states` updates
//! otherwise. Its change magnitude is the mean absolute change of each
//! update, averaged over the updates issued in the round. The
//! asynchronous inner count approximates one full sweep; it does not
//! guarantee that every state is touched if the algorithm picks states
//! itself.

use std::fmt;

use diffvi_algorithms::Algorithm;
use diffvi_core::Element;
use ndarray::Array1;

/// Loop limits shared by every combination in a sweep.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RunSettings {
    /// Maximum number of rounds.
    pub max_iters: usize,
    /// A round whose change magnitude is at most this counts as settled.
    pub convergence_tolerance: f64,
    /// One update per round (`true`) or one per state (`false`).
    pub synchronized: bool,
}

impl RunSettings {
    /// Updates issued per round for an environment with `num_states` states.
    ///
    /// Never zero, so an empty environment still performs one update.
    pub fn updates_per_round(&self, num_states: usize) -> usize {
        if self.synchronized {
            1
        } else {
            num_states.max(1)
        }
    }
}

/// How a combination's run ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Termination {
    /// The change magnitude fell within tolerance.
    Converged,
    /// The algorithm reported numerical divergence.
    Diverged,
    /// The round budget ran out.
    Exhausted,
}

impl Termination {
    /// Whether this is the success outcome.
    pub fn converged(self) -> bool {
        self == Self::Converged
    }
}

impl fmt::Display for Termination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Converged => f.write_str("converged"),
            Self::Diverged => f.write_str("diverged"),
            Self::Exhausted => f.write_str("exhausted"),
        }
    }
}

/// Result of one (environment, algorithm, step size) run.
#[derive(Clone, Debug, PartialEq)]
pub struct RunOutcome<T: Element> {
    /// Step size the algorithm was built with.
    pub step_size: f64,
    /// Terminal state.
    pub status: Termination,
    /// See the table in the module docs.
    pub iterations: usize,
    /// Change magnitude of the last completed round.
    pub final_change: f64,
    /// Changes returned by the last `update()` call.
    pub final_changes: Array1<T>,
}

impl<T: Element> RunOutcome<T> {
    /// Shorthand for `self.status.converged()`.
    pub fn converged(&self) -> bool {
        self.status.converged()
    }
}

/// Mean of `|x|` over `changes`, in `f64`. Zero for an empty array.
pub fn mean_abs_change<T: Element>(changes: &Array1<T>) -> f64 {
    if changes.is_empty() {
        return 0.0;
    }
    changes.iter().map(|c| c.widen().abs()).sum::<f64>() / changes.len() as f64
}

/// Drive `algorithm` until it converges, diverges or exhausts
/// `settings.max_iters` rounds.
pub fn run_to_convergence<T: Element>(
    algorithm: &mut dyn Algorithm<T>,
    num_states: usize,
    step_size: f64,
    settings: &RunSettings,
) -> RunOutcome<T> {
    let inner = settings.updates_per_round(num_states);
    let mut changes = Array1::zeros(0);
    let mut change_summary = 0.0;

    let finish = |status: Termination,
                  iterations: usize,
                  final_change: f64,
                  final_changes: Array1<T>| RunOutcome {
        step_size,
        status,
        iterations,
        final_change,
        final_changes,
    };

    for i in 0..settings.max_iters {
        change_summary = 0.0;
        for _ in 0..inner {
            changes = algorithm.update();
            change_summary += mean_abs_change(&changes);
        }
        change_summary /= inner as f64;

        if algorithm.diverged() {
            return finish(Termination::Diverged, i, change_summary, changes);
        }
        if change_summary <= settings.convergence_tolerance && i > 1 {
            return finish(Termination::Converged, i, change_summary, changes);
        }
    }

    finish(
        Termination::Exhausted,
        settings.max_iters,
        change_summary,
        changes,
    )
}
