//! adm1-rs: Anaerobic Digestion Simulation Framework
//!
//! Simulates an anaerobic digester with a reduced Anaerobic Digestion Model
//! No. 1 (ADM1) extended with iron/EDTA complexation and iron-sulfide
//! precipitation. 29 concentrations evolve under Monod uptake kinetics with
//! hydrogen and free-ammonia inhibition, integrated by a variable-order BDF
//! method suited to the stiffness of the network.
//!
//! # Architecture
//!
//! adm1-rs is built on two core principles:
//!
//! 1. **Separation of Physics and Numerics**
//!    - Physical models define equations (what to solve)
//!    - Numerical solvers provide methods (how to solve)
//!
//! 2. **Immutable configuration**
//!    - Presets are merged into fresh parameter bundles
//!    - Each solve is an independent computation returning plain data
//!
//! # Quick Start
//!
//! ```rust
//! use adm1_rs::prelude::*;
//!
//! // 1. Load presets and pick a substrate
//! let mut store = ParameterStore::builtin();
//! assert!(store.select_preset("food_waste"));
//! let model = store.active_model().unwrap();
//!
//! // 2. Configure scenario and solver
//! let scenario = Scenario::from_model(model, TimeSpan::from_zero(1.0));
//! let config = SolverConfiguration::default();
//!
//! // 3. Run simulation
//! let result = BdfSolver::new().solve(&scenario, &config);
//!
//! // 4. Access results
//! assert!(result.success, "{}", result.message);
//! assert_eq!(result.shape().0, 29);
//! println!("Methane after 1 day: {:?}", result.series("S_ch4").and_then(|s| s.last().copied()));
//! ```
//!
//! # Modules
//!
//! - [`physics`]: state layout, rate laws, the `PhysicalModel` trait
//! - [`models`]: the ADM1 network and its kinetic parameters
//! - [`parameters`]: named substrate presets
//! - [`solver`]: numerical integration
//! - [`output`]: result export

// Core modules
pub mod physics;

pub mod models;
pub mod parameters;
pub mod solver;

pub mod output;

pub mod prelude {
    //! Convenient imports for common usage
    //!
    //! ```rust
    //! use adm1_rs::prelude::*;
    //! ```
    pub use crate::models::{Adm1Model, KineticParameters};
    pub use crate::parameters::{ParameterStore, PresetBundle};
    pub use crate::physics::{PhysicalModel, StateVariable, StateVector};
    pub use crate::solver::{
        BdfSolver,
        FailureKind,
        Scenario,
        SimulationResult,
        Solver,
        SolverConfiguration,
        TimeSpan,
    };
}
