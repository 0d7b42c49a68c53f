//! Environment constructors for the diffvi workspace.
//!
//! - [`garet`]: the Generic Average Reward Environment Testbed, a seeded
//!   generator of random MDPs with bounded per-(state, action) branching.
//! - [`micro`]: small hand-written processes used as sweep fixtures.
//!
//! Every constructor is generic over the element type and returns a
//! validated process record from `diffvi-core`.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod garet;
pub mod micro;

pub use garet::{GaretError, GaretParams, GARET1, GARET2, GARET3, GARET_100};
