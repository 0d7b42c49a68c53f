//! Core traits shared by the process types.

/// Read-only view of an environment's shape.
///
/// The convergence harness depends on this and nothing else: it sizes the
/// initial value vector from [`num_states`](Environment::num_states) and
/// labels reports with [`name`](Environment::name).
pub trait Environment {
    /// Number of states `S`.
    fn num_states(&self) -> usize;

    /// Descriptive label.
    fn name(&self) -> &str;
}
