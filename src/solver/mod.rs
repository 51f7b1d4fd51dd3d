//! Numerical solvers
//!
//! This module provides traits and implementations for numerical solvers.
//! A numerical solver applies a numerical method to solve the equations
//! provided by a physical model within a specific scenario.
//!
//! # Core Concepts
//!
//! ## The Architecture (WHAT vs HOW)
//!
//! The solver architecture separates concerns into three layers:
//!
//! 1. **Scenario** (`Scenario`) - WHAT to solve
//!    - Physical model (equations, default initial state)
//!    - Time span
//!
//! 2. **Configuration** (`SolverConfiguration`) - HOW to solve
//!    - Integration method
//!    - Tolerances and step bounds
//!
//! 3. **Solver** (`Solver` trait) - The numerical method
//!    - Applies the numerical scheme
//!    - Returns the solution, or a failed result describing what went wrong
//!    - Independent of physics
//!
//! # Module Organization
//!
//! - **`traits`**: `Solver`, `IntegrationMethod`, `SolverConfiguration`,
//!   `SimulationResult`, `FailureKind`
//! - **`span`**: `TimeSpan`
//! - **`scenario`**: `Scenario` (model + span)
//! - **`linalg`**: norms and finite-difference Jacobians
//! - **`methods`**: `BdfSolver`
//! - **`timeout`**: wall-clock bounded solves
//!
//! # Quick Start Example
//!
//! ```rust
//! use adm1_rs::models::Adm1Model;
//! use adm1_rs::solver::{BdfSolver, Scenario, Solver, SolverConfiguration, TimeSpan};
//!
//! // 1. Create scenario (WHAT to solve)
//! let scenario = Scenario::from_model(Adm1Model::default(), TimeSpan::from_zero(2.0));
//!
//! // 2. Create configuration (HOW to solve)
//! let config = SolverConfiguration::default();
//!
//! // 3. Solve
//! let result = BdfSolver::new().solve(&scenario, &config);
//!
//! // 4. Access results
//! assert!(result.success, "{}", result.message);
//! let methane = result.series("S_ch4").unwrap();
//! assert_eq!(methane.len(), result.len());
//! ```
//!
//! # Workflow Diagram
//!
//! ```text
//! ┌─────────────────┐   ┌────────────┐
//! │  Physical Model │   │ Time span  │
//! └────────┬────────┘   └─────┬──────┘
//!          └───────┬──────────┘
//!         ┌────────▼────────┐
//!         │ Scenario        │ ← WHAT to solve
//!         └────────┬────────┘
//!         ┌────────▼─────────────┐
//!         │ Solver Configuration │ ← HOW to solve
//!         └────────┬─────────────┘
//!         ┌────────▼────────┐
//!         │ BDF Solver      │ ← The method
//!         └────────┬────────┘
//!         ┌────────▼────────────┐
//!         │ Simulation Result   │ ← The solution (or the failure)
//!         └─────────────────────┘
//! ```
//!
//! # Error Handling
//!
//! `Solver::solve` returns a [`SimulationResult`] in every case. Validation
//! helpers (`SolverConfiguration::validate`, `Scenario::validate`) return
//! `Result<(), String>`; the solver turns their errors into failed results.

// =================================================================================================
// Module Declarations
// =================================================================================================
mod traits;
mod span;
mod scenario;
mod methods;
pub mod linalg;
pub mod timeout;

// =================================================================================================
// Public Re-exports
// =================================================================================================

pub use traits::{
    FailureKind,
    IntegrationMethod,
    SimulationResult,
    Solver,
    SolverConfiguration,
};

pub use span::TimeSpan;
pub use scenario::Scenario;

pub use methods::BdfSolver;
pub use timeout::{solve_with_timeout, TimedOutcome, DEFAULT_TIMEOUT};

// =================================================================================================
// Helper Functions
// =================================================================================================

use crate::physics::PhysicalModel;
use nalgebra::DVector;

/// True when every component is finite
pub(crate) fn is_finite_state(state: &DVector<f64>) -> bool {
    state.iter().all(|value| value.is_finite())
}

/// Validate a state vector for numerical issues
///
/// Checks that the state does not contain NaN or Inf values, naming the
/// first offending variable.
///
/// # Returns
///
/// `Ok(())` if state is valid, `Err(msg)` with diagnostic information otherwise
pub(crate) fn validate_state(state: &DVector<f64>, model: &dyn PhysicalModel) -> Result<(), String> {
    for (index, value) in state.iter().enumerate() {
        // NaN can arise from 0/0, Inf - Inf, or other undefined operations
        if value.is_nan() {
            return Err(format!("NaN detected in {}", model.variable_name_of(index)));
        }

        // Inf can indicate overflow or division by zero
        if value.is_infinite() {
            return Err(format!("Infinity detected in {}", model.variable_name_of(index)));
        }
    }

    Ok(())
}

// =================================================================================================
// Tests
// =================================================================================================
