//! Test utilities for diffvi development.
//!
//! Provides scripted stub algorithms ([`fixtures`]), a shape-only
//! [`StubEnvironment`], and an in-memory [`MemorySink`] for exercising the
//! sweep driver without touching the filesystem.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;

use diffvi_core::{Element, Environment};
use diffvi_sweep::{ArtifactKey, EstimateSink, PersistError};
use ndarray::Array1;

pub use fixtures::{DivergesAfter, NeverSettles, StubFactory, ZeroChange};

/// An environment that only has a name and a state count.
#[derive(Clone, Debug)]
pub struct StubEnvironment {
    pub name: String,
    pub num_states: usize,
}

impl StubEnvironment {
    pub fn new(name: impl Into<String>, num_states: usize) -> Self {
        Self {
            name: name.into(),
            num_states,
        }
    }
}

impl Environment for StubEnvironment {
    fn num_states(&self) -> usize {
        self.num_states
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// One saved set of estimates.
#[derive(Clone, Debug, PartialEq)]
pub struct SavedEstimates<T: Element> {
    pub index: usize,
    pub environment: String,
    pub algorithm: String,
    pub step_size: f64,
    pub estimates: Array1<T>,
}

/// Keeps every saved estimate vector in memory.
#[derive(Debug)]
pub struct MemorySink<T: Element> {
    pub saved: Vec<SavedEstimates<T>>,
}

impl<T: Element> MemorySink<T> {
    pub fn new() -> Self {
        Self { saved: Vec::new() }
    }
}

impl<T: Element> Default for MemorySink<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Element> EstimateSink<T> for MemorySink<T> {
    fn save(
        &mut self,
        key: &ArtifactKey<'_>,
        estimates: &Array1<T>,
    ) -> Result<String, PersistError> {
        self.saved.push(SavedEstimates {
            index: key.index,
            environment: key.environment.to_string(),
            algorithm: key.algorithm.to_string(),
            step_size: key.step_size,
            estimates: estimates.clone(),
        });
        Ok(format!("memory:{}", key.index))
    }
}
