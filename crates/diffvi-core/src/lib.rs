//! Core types and traits for the diffvi workspace.
//!
//! This is the leaf crate with zero internal dependencies. It defines the
//! validated process records every other crate consumes: the
//! [`MarkovRewardProcess`] and [`MarkovDecisionProcess`] value objects,
//! their construction errors, the [`Element`] precision abstraction, and
//! the [`Environment`] trait that exposes process shape to the harness.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod element;
pub mod error;
pub mod mdp;
pub mod mrp;
pub mod traits;

pub use element::{Element, Precision};
pub use error::{ProcessError, ProcessKind};
pub use mdp::{MarkovDecisionProcess, TRANSITION_SUM_TOLERANCE};
pub use mrp::MarkovRewardProcess;
pub use traits::Environment;
