//! Physical model trait
//!
//! This module defines the core API every model exposes to the solver and to
//! reporting code:
//! - right-hand side evaluation `dy/dt = f(t, y)`
//! - the model's default initial state
//! - variable naming, so results can be labelled without knowing the kinetics

use nalgebra::DVector;

/// Trait for physical models
///
/// # Responsibility
///
/// Computes the right-hand side of the ODE system at a given state.
/// Does NOT integrate it (that's the Solver's job).
///
/// Implementations must be free of side effects: two calls with the same
/// arguments return the same vector.
pub trait PhysicalModel: Send + Sync {
    /// Number of state variables
    ///
    /// Used by the solver to allocate vectors and check initial conditions.
    fn dimension(&self) -> usize;

    /// Computes `f(t, y)` of `dy/dt = f(t, y)`
    ///
    /// # Arguments
    /// * `t` - Current simulation time
    /// * `state` - Current state, of length [`dimension()`](Self::dimension)
    ///
    /// # Returns
    /// Rate-of-change vector of the same length as `state`.
    fn compute_physics(&self, t: f64, state: &DVector<f64>) -> DVector<f64>;

    /// Default initial state for this model
    fn setup_initial_state(&self) -> DVector<f64>;

    /// Name of the model (used to display and logging)
    fn name(&self) -> &str;

    /// Description of the model (option)
    fn description(&self) -> Option<&str> {
        None
    }

    /// Names of the state variables, in state order
    fn variable_names(&self) -> &[&'static str];

    /// Position of a named variable, `None` when the name is unknown
    fn variable_index_of(&self, name: &str) -> Option<usize> {
        self.variable_names().iter().position(|candidate| *candidate == name)
    }

    /// Name of the variable at `index`, `"UNKNOWN"` when out of range
    fn variable_name_of(&self, index: usize) -> &'static str {
        self.variable_names().get(index).copied().unwrap_or("UNKNOWN")
    }
}

// =================================================================================================
// Tests
// =================================================================================================

#[cfg(test)]
mod tests {
    use super::*;

    struct TwoSpecies;

    impl PhysicalModel for TwoSpecies {
        fn dimension(&self) -> usize {
            2
        }

        fn compute_physics(&self, _t: f64, state: &DVector<f64>) -> DVector<f64> {
            state.map(|y| -y)
        }

        fn setup_initial_state(&self) -> DVector<f64> {
            DVector::from_vec(vec![1.0, 2.0])
        }

        fn name(&self) -> &str {
            "TwoSpecies"
        }

        fn variable_names(&self) -> &[&'static str] {
            &["A", "B"]
        }
    }

    #[test]
    fn test_variable_lookup() {
        let model = TwoSpecies;
        assert_eq!(model.variable_index_of("B"), Some(1));
        assert_eq!(model.variable_index_of("C"), None);
        assert_eq!(model.variable_name_of(0), "A");
        assert_eq!(model.variable_name_of(7), "UNKNOWN");
        assert!(model.description().is_none());
    }

    #[test]
    fn test_rate_has_state_length() {
        let model = TwoSpecies;
        let y = model.setup_initial_state();
        let rate = model.compute_physics(0.0, &y);
        assert_eq!(rate.len(), model.dimension());
        assert_eq!(rate[1], -2.0);
    }
}
