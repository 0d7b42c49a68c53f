//! Iterative average-reward algorithms for the diffvi workspace.
//!
//! Every algorithm implements the three-operation [`Algorithm`] capability
//! consumed by the convergence harness. Hyperparameter sweeps are expressed
//! as lists of [`AlgorithmSpec`] configuration records, each of which knows
//! how to instantiate its algorithm family through [`AlgorithmFactory`].
//!
//! | Module | Evaluation (MRP) | Control (MDP) |
//! |--------|------------------|---------------|
//! | [`dvi`] | Differential value iteration | Differential value iteration |
//! | [`mdvi`] | Multichain differential value iteration | n/a |
//! | [`rvi`] | Relative value iteration | Relative value iteration |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod algorithm;
mod backup;
pub mod dvi;
pub mod mdvi;
pub mod rvi;
pub mod spec;

pub use algorithm::{Algorithm, AlgorithmError, AlgorithmFactory, AlgorithmInit};
pub use spec::{AlgorithmFamily, AlgorithmSpec};
