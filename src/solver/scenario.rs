//! Simulation scenario definition
//!
//! A scenario combines a physical model with the interval to integrate over.
use crate::physics::traits::PhysicalModel;
use crate::solver::span::TimeSpan;
use crate::solver::validate_state;
use nalgebra::DVector;
use std::sync::Arc;

/// Simulation scenario
///
/// Defines a specific case to simulate:
/// - Physical model (equations and default initial state)
/// - Time span
/// - Optional initial state replacing the model's default
///
/// # Design
///
/// The same scenario can be solved with different configurations.
/// This is the "WHAT to solve" (not "HOW to solve"). The model is shared
/// through an `Arc` so results can keep a handle on it for variable naming.
///
/// # Examples
///
/// ```rust
/// use adm1_rs::models::Adm1Model;
/// use adm1_rs::solver::{Scenario, TimeSpan};
///
/// let scenario = Scenario::from_model(Adm1Model::default(), TimeSpan::from_zero(30.0));
/// assert!(scenario.validate().is_ok());
/// assert_eq!(scenario.get_model_name(), "ADM1");
/// ```
#[derive(Clone)]
pub struct Scenario {
    /// Physical model (equations)
    pub model: Arc<dyn PhysicalModel>,

    /// Integration interval
    pub span: TimeSpan,

    /// Replaces `model.setup_initial_state()` when set
    pub initial_state: Option<DVector<f64>>,
}

impl Scenario {
    /// Create a scenario
    pub fn new(model: Arc<dyn PhysicalModel>, span: TimeSpan) -> Self {
        Self { model, span, initial_state: None }
    }

    /// Create a scenario owning `model`
    pub fn from_model<M: PhysicalModel + 'static>(model: M, span: TimeSpan) -> Self {
        Self::new(Arc::new(model), span)
    }

    pub fn with_initial_state(mut self, initial_state: DVector<f64>) -> Self {
        self.initial_state = Some(initial_state);
        self
    }

    /// State the integration starts from
    pub fn initial_condition(&self) -> DVector<f64> {
        match &self.initial_state {
            Some(state) => state.clone(),
            None => self.model.setup_initial_state(),
        }
    }

    /// Verifying scenario content (span and initial state)
    pub fn validate(&self) -> Result<(), String> {
        self.span.validate()?;

        let initial = self.initial_condition();
        let dimension = self.model.dimension();
        if initial.len() != dimension {
            return Err(format!(
                "Initial state has {} values, model {} expects {}",
                initial.len(),
                self.model.name(),
                dimension
            ));
        }
        validate_state(&initial, self.model.as_ref()).map_err(|reason| format!("Initial state: {}", reason))
    }

    /// Get model name
    pub fn get_model_name(&self) -> &str {
        self.model.name()
    }

    /// Number of state variables
    pub fn ndim(&self) -> usize {
        self.model.dimension()
    }
}

impl std::fmt::Debug for Scenario {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scenario")
            .field("name", &self.get_model_name())
            .field("dimension", &self.ndim())
            .field("span", &self.span)
            .field("custom initial state", &self.initial_state.is_some())
            .finish()
    }
}

// =================================================================================================
// Tests
// =================================================================================================

#[cfg(test)]
mod tests {
    use super::*;

    struct MockModel;

    impl PhysicalModel for MockModel {
        fn dimension(&self) -> usize {
            2
        }

        fn compute_physics(&self, _t: f64, state: &DVector<f64>) -> DVector<f64> {
            state.clone()
        }

        fn setup_initial_state(&self) -> DVector<f64> {
            DVector::from_vec(vec![1.0, 2.0])
        }

        fn name(&self) -> &str {
            "MockModel"
        }

        fn variable_names(&self) -> &[&'static str] {
            &["a", "b"]
        }
    }

    #[test]
    fn test_scenario_creation() {
        let scenario = Scenario::from_model(MockModel, TimeSpan::from_zero(1.0));
        assert_eq!(scenario.get_model_name(), "MockModel");
        assert_eq!(scenario.ndim(), 2);
        assert_eq!(scenario.initial_condition(), DVector::from_vec(vec![1.0, 2.0]));
        assert!(scenario.validate().is_ok());
    }

    #[test]
    fn test_initial_state_override() {
        let scenario = Scenario::from_model(MockModel, TimeSpan::from_zero(1.0))
            .with_initial_state(DVector::from_vec(vec![3.0, 4.0]));
        assert_eq!(scenario.initial_condition()[1], 4.0);
    }

    #[test]
    fn test_validation_failures() {
        let reversed = Scenario::from_model(MockModel, TimeSpan::new(1.0, 0.0));
        assert!(reversed.validate().is_err());

        let wrong_length = Scenario::from_model(MockModel, TimeSpan::from_zero(1.0))
            .with_initial_state(DVector::from_vec(vec![1.0]));
        assert!(wrong_length.validate().unwrap_err().contains("expects 2"));

        let not_finite = Scenario::from_model(MockModel, TimeSpan::from_zero(1.0))
            .with_initial_state(DVector::from_vec(vec![1.0, f64::NAN]));
        assert!(not_finite.validate().unwrap_err().contains("b"));
    }
}
