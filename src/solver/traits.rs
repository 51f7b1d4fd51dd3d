//! Numerical solver traits and types
//!
//! # Design Philosophy
//!
//! - `IntegrationMethod` names the numerical method class
//! - `SolverConfiguration` carries the method and its tolerances
//! - `SimulationResult` is the single output shape of every solve, for
//!   successful and failed runs alike
//!
//! # Failure as data
//!
//! [`Solver::solve`] never returns an error and never panics on bad input:
//! failures come back as a `SimulationResult` with `success == false`, empty
//! time and state sequences, a [`FailureKind`] and a message.

use crate::physics::PhysicalModel;
use crate::solver::Scenario;
use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

// =================================================================================================
// Integration method
// =================================================================================================

/// Class of numerical method used for the time integration
///
/// The reaction network is stiff (hydrogen turnover is orders of magnitude
/// faster than biomass growth), so only implicit multistep integration is
/// offered.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IntegrationMethod {
    /// Variable-order (1 to 5), variable-step backward differentiation formulas
    #[default]
    Bdf,
}

impl IntegrationMethod {
    /// Get name identifier
    pub fn name(&self) -> &'static str {
        match self {
            IntegrationMethod::Bdf => "BDF",
        }
    }
}

// =================================================================================================
// Solver configuration
// =================================================================================================

/// Configuration of the integration
///
/// # Defaults
///
/// | Field        | Default    |
/// |--------------|------------|
/// | `method`     | `Bdf`      |
/// | `rtol`       | `1e-6`     |
/// | `atol`       | `1e-8`     |
/// | `max_step`   | `0.1`      |
/// | `first_step` | `Some(0.01)` |
/// | `max_steps`  | `500_000`  |
///
/// `first_step = None` lets the solver pick the initial step from the local
/// behaviour of the right-hand side.
///
/// # Examples
///
/// ```rust
/// use adm1_rs::solver::SolverConfiguration;
///
/// let config = SolverConfiguration::default().with_tolerances(1e-8, 1e-10);
/// assert!(config.validate().is_ok());
///
/// let config: SolverConfiguration = serde_json::from_str(r#"{"max_step": 0.5}"#).unwrap();
/// assert_eq!(config.max_step, 0.5);
/// assert_eq!(config.rtol, 1e-6);
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfiguration {
    /// Integration method class
    pub method: IntegrationMethod,

    /// Relative tolerance
    pub rtol: f64,

    /// Absolute tolerance
    pub atol: f64,

    /// Upper bound on the step size
    pub max_step: f64,

    /// Initial step size, `None` for automatic selection
    pub first_step: Option<f64>,

    /// Accepted steps after which the integration is abandoned
    pub max_steps: usize,
}

impl Default for SolverConfiguration {
    fn default() -> Self {
        Self {
            method: IntegrationMethod::Bdf,
            rtol: 1e-6,
            atol: 1e-8,
            max_step: 0.1,
            first_step: Some(0.01),
            max_steps: 500_000,
        }
    }
}

impl SolverConfiguration {
    /// Create a new configuration with a given method and default tolerances
    pub fn new(method: IntegrationMethod) -> Self {
        Self { method, ..Self::default() }
    }

    pub fn with_tolerances(mut self, rtol: f64, atol: f64) -> Self {
        self.rtol = rtol;
        self.atol = atol;
        self
    }

    pub fn with_max_step(mut self, max_step: f64) -> Self {
        self.max_step = max_step;
        self
    }

    pub fn with_first_step(mut self, first_step: Option<f64>) -> Self {
        self.first_step = first_step;
        self
    }

    pub fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = max_steps;
        self
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if !(self.rtol.is_finite() && self.rtol > 0.0) {
            return Err(format!("Relative tolerance must be positive, got {}", self.rtol));
        }
        if !(self.atol.is_finite() && self.atol > 0.0) {
            return Err(format!("Absolute tolerance must be positive, got {}", self.atol));
        }
        if !(self.max_step > 0.0) {
            return Err(format!("Maximum step must be positive, got {}", self.max_step));
        }
        if let Some(first_step) = self.first_step
            && !(first_step.is_finite() && first_step > 0.0)
        {
            return Err(format!("First step must be positive, got {}", first_step));
        }
        if self.max_steps == 0 {
            return Err("Maximum number of steps must be greater than 0".to_string());
        }
        Ok(())
    }
}

// =================================================================================================
// Failures
// =================================================================================================

/// Why a solve did not complete
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FailureKind {
    /// Tolerances or step bounds are unusable
    InvalidConfiguration,
    /// Time span or initial state is unusable for the model
    InvalidScenario,
    /// The right-hand side returned NaN or infinity
    NonFiniteDerivative,
    /// The step size fell below the floating-point resolution of `t`
    StepSizeTooSmall,
    /// `max_steps` accepted steps did not reach the end of the span
    TooManySteps,
    /// The right-hand side panicked
    RhsPanicked,
    /// A bounded solve could not start its worker thread, or the worker
    /// ended without reporting a result
    WorkerLost,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            FailureKind::InvalidConfiguration => "invalid configuration",
            FailureKind::InvalidScenario => "invalid scenario",
            FailureKind::NonFiniteDerivative => "non-finite derivative",
            FailureKind::StepSizeTooSmall => "step size too small",
            FailureKind::TooManySteps => "too many steps",
            FailureKind::RhsPanicked => "right-hand side panicked",
            FailureKind::WorkerLost => "solver thread lost",
        };
        f.write_str(text)
    }
}

// =================================================================================================
// Simulation result
// =================================================================================================

/// Output of one solve
///
/// `states` is indexed `[variable, time]`: column `j` is the state at
/// `time_points[j]`. On failure both are empty.
#[derive(Clone)]
pub struct SimulationResult {
    /// Strictly increasing output times
    pub time_points: Vec<f64>,

    /// State matrix, one row per variable, one column per time point
    pub states: DMatrix<f64>,

    pub success: bool,

    /// Human readable outcome
    pub message: String,

    /// Set when `success` is false
    pub failure: Option<FailureKind>,

    /// Right-hand side evaluations (Jacobian columns included)
    pub nfev: usize,

    /// Jacobian evaluations
    pub njev: usize,

    /// LU factorisations
    pub nlu: usize,

    /// Accepted steps
    pub n_steps: usize,

    /// Model the result was computed with, for variable naming
    pub model: Arc<dyn PhysicalModel>,

    /// Free-form solver metadata
    pub metadata: HashMap<String, String>,
}

impl SimulationResult {
    /// Successful result from the visited states
    pub fn new(
        model: Arc<dyn PhysicalModel>,
        time_points: Vec<f64>,
        trajectory: &[DVector<f64>],
        message: impl Into<String>,
    ) -> Self {
        let states = if trajectory.is_empty() {
            DMatrix::zeros(model.dimension(), 0)
        } else {
            DMatrix::from_columns(trajectory)
        };

        Self {
            time_points,
            states,
            success: true,
            message: message.into(),
            failure: None,
            nfev: 0,
            njev: 0,
            nlu: 0,
            n_steps: 0,
            model,
            metadata: HashMap::new(),
        }
    }

    /// Failed result: no data, a kind and a message
    pub fn failed(model: Arc<dyn PhysicalModel>, kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            time_points: Vec::new(),
            states: DMatrix::zeros(0, 0),
            success: false,
            message: message.into(),
            failure: Some(kind),
            nfev: 0,
            njev: 0,
            nlu: 0,
            n_steps: 0,
            model,
            metadata: HashMap::new(),
        }
    }

    /// Number of output time points
    pub fn len(&self) -> usize {
        self.time_points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time_points.is_empty()
    }

    /// `(variables, time points)`
    pub fn shape(&self) -> (usize, usize) {
        self.states.shape()
    }

    /// State at output index `index`
    pub fn state_at(&self, index: usize) -> Option<DVector<f64>> {
        (index < self.states.ncols()).then(|| self.states.column(index).into_owned())
    }

    /// State at the last output time
    pub fn final_state(&self) -> Option<DVector<f64>> {
        self.states.ncols().checked_sub(1).and_then(|last| self.state_at(last))
    }

    pub fn final_time(&self) -> Option<f64> {
        self.time_points.last().copied()
    }

    /// Time series of a named variable
    pub fn series(&self, name: &str) -> Option<Vec<f64>> {
        let index = self.variable_index_of(name)?;
        (index < self.states.nrows()).then(|| self.states.row(index).iter().copied().collect())
    }

    pub fn variable_index_of(&self, name: &str) -> Option<usize> {
        self.model.variable_index_of(name)
    }

    pub fn variable_name_of(&self, index: usize) -> &'static str {
        self.model.variable_name_of(index)
    }

    /// Smallest value anywhere in the state matrix, `None` when empty
    pub fn min_value(&self) -> Option<f64> {
        self.states.iter().copied().reduce(f64::min)
    }

    /// Entries below `-threshold`, as `(variable index, time index, value)`
    pub fn negative_excursions(&self, threshold: f64) -> Vec<(usize, usize, f64)> {
        let mut excursions = Vec::new();
        for (column, state) in self.states.column_iter().enumerate() {
            for (row, value) in state.iter().enumerate() {
                if *value < -threshold {
                    excursions.push((row, column, *value));
                }
            }
        }
        excursions
    }

    /// Add a metadata entry
    pub fn add_metadata(&mut self, key: &str, value: &str) {
        self.metadata.insert(key.to_string(), value.to_string());
    }

    pub fn get_metadata(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).map(String::as_str)
    }
}

impl fmt::Debug for SimulationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SimulationResult")
            .field("model", &self.model.name())
            .field("success", &self.success)
            .field("message", &self.message)
            .field("failure", &self.failure)
            .field("shape", &self.shape())
            .field("nfev", &self.nfev)
            .field("njev", &self.njev)
            .field("nlu", &self.nlu)
            .field("n_steps", &self.n_steps)
            .finish()
    }
}

// =================================================================================================
// Solver trait
// =================================================================================================

/// Trait for numerical solvers
///
/// # Responsibility
///
/// Integrates the model of a [`Scenario`] over its time span. Each call is
/// an independent, synchronous computation; no state survives between calls.
pub trait Solver {
    /// Integrate `scenario` with `config`
    ///
    /// Always returns a result; check [`SimulationResult::success`].
    fn solve(&self, scenario: &Scenario, config: &SolverConfiguration) -> SimulationResult;

    /// Solver name (used to display and logging)
    fn name(&self) -> &'static str;
}

// =================================================================================================
// Tests
// =================================================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Adm1Model;

    #[test]
    fn test_default_configuration() {
        let config = SolverConfiguration::default();
        assert_eq!(config.method, IntegrationMethod::Bdf);
        assert_eq!(config.rtol, 1e-6);
        assert_eq!(config.atol, 1e-8);
        assert_eq!(config.max_step, 0.1);
        assert_eq!(config.first_step, Some(0.01));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_configurations() {
        let base = SolverConfiguration::default();
        assert!(base.clone().with_tolerances(0.0, 1e-8).validate().is_err());
        assert!(base.clone().with_tolerances(1e-6, -1.0).validate().is_err());
        assert!(base.clone().with_max_step(0.0).validate().is_err());
        assert!(base.clone().with_max_step(f64::NAN).validate().is_err());
        assert!(base.clone().with_first_step(Some(-0.1)).validate().is_err());
        assert!(base.clone().with_max_steps(0).validate().is_err());
        assert!(base.with_first_step(None).validate().is_ok());
    }

    #[test]
    fn test_infinite_max_step_is_allowed() {
        let config = SolverConfiguration::default().with_max_step(f64::INFINITY);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_method_deserializes_lowercase() {
        let config: SolverConfiguration =
            serde_json::from_str(r#"{"method": "bdf", "first_step": null}"#).unwrap();
        assert_eq!(config.method, IntegrationMethod::Bdf);
        assert_eq!(config.first_step, None);
        assert_eq!(config.method.name(), "BDF");
    }

    #[test]
    fn test_result_accessors() {
        let model: Arc<dyn PhysicalModel> = Arc::new(Adm1Model::default());
        let y0 = model.setup_initial_state();
        let mut y1 = y0.clone();
        y1[0] = -1e-3;

        let mut result = SimulationResult::new(model, vec![0.0, 1.0], &[y0.clone(), y1], "done");
        result.add_metadata("solver", "BDF");

        assert_eq!(result.len(), 2);
        assert_eq!(result.shape(), (29, 2));
        assert_eq!(result.final_time(), Some(1.0));
        assert_eq!(result.state_at(0), Some(y0));
        assert!(result.state_at(2).is_none());
        assert_eq!(result.series("S_su").unwrap(), vec![5.0, -1e-3]);
        assert!(result.series("S_none").is_none());
        assert_eq!(result.min_value(), Some(-1e-3));
        assert_eq!(result.negative_excursions(1e-4), vec![(0, 1, -1e-3)]);
        assert!(result.negative_excursions(1e-2).is_empty());
        assert_eq!(result.get_metadata("solver"), Some("BDF"));
        assert_eq!(result.variable_name_of(0), "S_su");
    }

    #[test]
    fn test_failed_result_is_empty() {
        let model: Arc<dyn PhysicalModel> = Arc::new(Adm1Model::default());
        let result = SimulationResult::failed(model, FailureKind::StepSizeTooSmall, "stuck");

        assert!(!result.success);
        assert!(result.is_empty());
        assert_eq!(result.shape(), (0, 0));
        assert!(result.final_state().is_none());
        assert!(result.min_value().is_none());
        assert_eq!(result.failure, Some(FailureKind::StepSizeTooSmall));
        assert_eq!(result.variable_index_of("S_ac"), Some(6));
    }
}
