//! Physical models
//!
//! This module provides the trait and the building blocks for models of the
//! digester. A physical model encapsulates the equations of the system; it
//! never integrates them.
//!
//! # Core Concepts
//!
//! - **Physical Model**: computes `dy/dt = f(t, y)` at a given state
//! - **State Variable**: type-safe identifier for one of the 29 concentrations
//! - **State Vector**: fixed-length container of concentrations
//! - **Kinetics**: Monod uptake and inhibition rate laws
//!
//! # Architecture
//!
//! Physical models are **separate from numerical solvers**:
//! - The model provides the **equations** (biochemistry)
//! - The solver provides the **method** to integrate them (numerics)
//!
//! # Example
//!
//! ```rust
//! use adm1_rs::physics::{PhysicalModel, StateVariable};
//! use adm1_rs::models::Adm1Model;
//!
//! let model = Adm1Model::default();
//! let y0 = model.setup_initial_state();
//! let rates = model.compute_physics(0.0, &y0);
//!
//! assert_eq!(rates.len(), y0.len());
//! assert!(rates[StateVariable::SSu.index()] < 0.0);
//! ```

pub mod kinetics;
pub mod state;
pub mod traits;

pub use state::{
    StateVariable,
    StateVector,
    VariableCategory,
    DEFAULT_INITIAL_CONDITIONS,
    STATE_DIMENSION,
};
pub use traits::PhysicalModel;
