//! Stub algorithms with scripted behaviour for harness tests.
//!
//! - [`ZeroChange`]: every update changes nothing.
//! - [`DivergesAfter`]: reports divergence once it has been updated more
//!   than a given number of times.
//! - [`NeverSettles`]: a constant non-zero change forever.
//!
//! [`StubFactory`] builds any of them for any environment, or refuses to.

use diffvi_algorithms::{Algorithm, AlgorithmError, AlgorithmFactory, AlgorithmInit};
use diffvi_core::{Element, Environment};
use ndarray::Array1;

/// Always returns a zero change vector.
pub struct ZeroChange<T: Element> {
    pub values: Array1<T>,
    pub updates: usize,
}

impl<T: Element> ZeroChange<T> {
    pub fn new(num_states: usize) -> Self {
        Self {
            values: Array1::zeros(num_states),
            updates: 0,
        }
    }
}

impl<T: Element> Algorithm<T> for ZeroChange<T> {
    fn update(&mut self) -> Array1<T> {
        self.updates += 1;
        Array1::zeros(self.values.len())
    }

    fn diverged(&self) -> bool {
        false
    }

    fn estimates(&self) -> Array1<T> {
        self.values.clone()
    }
}

/// Changes by one per state each update; diverged once `updates > limit`.
pub struct DivergesAfter<T: Element> {
    pub values: Array1<T>,
    pub limit: usize,
    pub updates: usize,
}

impl<T: Element> DivergesAfter<T> {
    pub fn new(num_states: usize, limit: usize) -> Self {
        Self {
            values: Array1::zeros(num_states),
            limit,
            updates: 0,
        }
    }
}

impl<T: Element> Algorithm<T> for DivergesAfter<T> {
    fn update(&mut self) -> Array1<T> {
        self.updates += 1;
        let changes = Array1::ones(self.values.len());
        self.values += &changes;
        changes
    }

    fn diverged(&self) -> bool {
        self.updates > self.limit
    }

    fn estimates(&self) -> Array1<T> {
        self.values.clone()
    }
}

/// Returns the same change for every state, forever.
pub struct NeverSettles<T: Element> {
    pub change: T,
    pub num_states: usize,
    pub updates: usize,
}

impl<T: Element> NeverSettles<T> {
    pub fn new(num_states: usize, change: f64) -> Self {
        Self {
            change: T::narrow(change),
            num_states,
            updates: 0,
        }
    }
}

impl<T: Element> Algorithm<T> for NeverSettles<T> {
    fn update(&mut self) -> Array1<T> {
        self.updates += 1;
        Array1::from_elem(self.num_states, self.change)
    }

    fn diverged(&self) -> bool {
        false
    }

    fn estimates(&self) -> Array1<T> {
        Array1::zeros(self.num_states)
    }
}

/// Factory for the stubs above.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum StubFactory {
    ZeroChange,
    /// Diverged once updated more than this many times.
    DivergesAfter(usize),
    /// Constant change of this magnitude.
    NeverSettles(f64),
    /// Fails its pre-flight check on every environment.
    Rejects,
}

impl<E: Environment, T: Element> AlgorithmFactory<E, T> for StubFactory {
    fn label(&self) -> String {
        format!("stub:{self:?}")
    }

    fn check(&self, environment: &E) -> Result<(), AlgorithmError> {
        let _ = environment;
        if let Self::Rejects = self {
            return Err(AlgorithmError::Unsupported {
                algorithm: format!("{self:?}"),
                environment: "stub",
            });
        }
        Ok(())
    }

    fn build<'a>(
        &self,
        init: AlgorithmInit<'a, E, T>,
    ) -> Result<Box<dyn Algorithm<T> + 'a>, AlgorithmError> {
        let n = init.environment.num_states();
        let algorithm: Box<dyn Algorithm<T> + 'a> = match *self {
            Self::ZeroChange => Box::new(ZeroChange::<T>::new(n)),
            Self::DivergesAfter(limit) => Box::new(DivergesAfter::<T>::new(n, limit)),
            Self::NeverSettles(change) => Box::new(NeverSettles::<T>::new(n, change)),
            Self::Rejects => {
                return Err(AlgorithmError::Unsupported {
                    algorithm: format!("{self:?}"),
                    environment: "stub",
                })
            }
        };
        Ok(algorithm)
    }
}
