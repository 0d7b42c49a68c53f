//! Construction errors for process records.
//!
//! Every variant is structural: it signals a bug in whatever produced the
//! arrays (a generator, a loader, a hand-written fixture), never a runtime
//! condition to recover from. Each carries the offending shapes or indices.

use std::error::Error;
use std::fmt;

/// Which process type failed validation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProcessKind {
    /// Markov reward process.
    Mrp,
    /// Markov decision process.
    Mdp,
}

impl fmt::Display for ProcessKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Mrp => f.write_str("mrp"),
            Self::Mdp => f.write_str("mdp"),
        }
    }
}

/// Errors from [`MarkovRewardProcess::new`](crate::MarkovRewardProcess::new)
/// and [`MarkovDecisionProcess::new`](crate::MarkovDecisionProcess::new).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ProcessError {
    /// Transitions array has the wrong number of dimensions.
    TransitionsRank {
        /// Process being constructed.
        kind: ProcessKind,
        /// Required rank (2 for MRP, 3 for MDP).
        expected: usize,
        /// Shape that was supplied.
        shape: Vec<usize>,
    },
    /// The trailing two transition dimensions differ.
    TransitionsNotSquare {
        /// Process being constructed.
        kind: ProcessKind,
        /// Shape that was supplied.
        shape: Vec<usize>,
    },
    /// Rewards array has the wrong number of dimensions.
    RewardsRank {
        /// Process being constructed.
        kind: ProcessKind,
        /// Required rank (1 for MRP, 2 for MDP).
        expected: usize,
        /// Shape that was supplied.
        shape: Vec<usize>,
    },
    /// MDP transitions and rewards disagree on the number of actions.
    ActionCountMismatch {
        /// Transitions shape.
        transitions: Vec<usize>,
        /// Rewards shape.
        rewards: Vec<usize>,
    },
    /// Transitions and rewards disagree on the number of states.
    StateCountMismatch {
        /// Process being constructed.
        kind: ProcessKind,
        /// Transitions shape.
        transitions: Vec<usize>,
        /// Rewards shape.
        rewards: Vec<usize>,
    },
    /// MRP rows whose probabilities do not sum to exactly one.
    RowsNotStochastic {
        /// Offending state indices, ascending.
        states: Vec<usize>,
    },
    /// MDP rows, for one action, whose probability mass deviates from one
    /// by more than [`TRANSITION_SUM_TOLERANCE`](crate::TRANSITION_SUM_TOLERANCE).
    ActionRowsNotStochastic {
        /// The first action with offending rows.
        action: usize,
        /// Offending state indices for that action, ascending.
        states: Vec<usize>,
    },
}

impl fmt::Display for ProcessError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TransitionsRank {
                kind,
                expected,
                shape,
            } => write!(
                f,
                "{kind} transitions should be {expected} dimensional, not: {shape:?}"
            ),
            Self::TransitionsNotSquare { kind, shape } => {
                let layout = match kind {
                    ProcessKind::Mrp => "SxS",
                    ProcessKind::Mdp => "AxSxS",
                };
                write!(f, "{kind} transitions should be {layout}, not: {shape:?}")
            }
            Self::RewardsRank {
                kind,
                expected,
                shape,
            } => write!(
                f,
                "{kind} rewards should be {expected} dimensional, not: {shape:?}"
            ),
            Self::ActionCountMismatch {
                transitions,
                rewards,
            } => write!(
                f,
                "mdp transition and reward actions do not match: {transitions:?} vs. {rewards:?}"
            ),
            Self::StateCountMismatch {
                kind,
                transitions,
                rewards,
            } => write!(
                f,
                "{kind} transition and reward states do not match: {transitions:?} vs. {rewards:?}"
            ),
            Self::RowsNotStochastic { states } => write!(
                f,
                "invalid reward process, some states do not have transitions that sum to 1: {states:?}"
            ),
            Self::ActionRowsNotStochastic { action, states } => write!(
                f,
                "invalid decision process, action:{action}, some states do not have transitions that sum to 1: {states:?}"
            ),
        }
    }
}

impl Error for ProcessError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_process_kind_and_shape() {
        let e = ProcessError::TransitionsNotSquare {
            kind: ProcessKind::Mdp,
            shape: vec![2, 3, 4],
        };
        assert_eq!(e.to_string(), "mdp transitions should be AxSxS, not: [2, 3, 4]");
    }

    #[test]
    fn display_lists_offending_states() {
        let e = ProcessError::ActionRowsNotStochastic {
            action: 1,
            states: vec![0, 2],
        };
        let msg = e.to_string();
        assert!(msg.contains("action:1"), "{msg}");
        assert!(msg.ends_with("[0, 2]"), "{msg}");
    }
}
