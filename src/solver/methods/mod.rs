//! Numerical methods for solving differential equations
//!
//! This module contains concrete implementations of the [`Solver`](crate::solver::Solver) trait.
//!
//! # Architecture
//!
//! The separation between abstract solver interface (`solver::traits`) and concrete
//! implementations (`solver::methods`) lets new methods be added without touching
//! the models or the result types.
//!
//! # Available Methods
//!
//! ## Implicit Multistep Methods
//!
//! - **[`BdfSolver`]**: variable-order, variable-step backward differentiation formulas
//!   - Order: 1 to 5, adapted step by step
//!   - Cost: one Newton solve per step, Jacobian reused across steps
//!   - Use: stiff reaction networks such as the digester model
//!
//! # Design Philosophy
//!
//! Each solver is:
//! - **Self-contained**: No shared mutable state
//! - **Stateless**: Can be reused for multiple simulations
//! - **Sequential**: one solve runs on the calling thread

mod bdf;

// Re-exports for convenience
pub use bdf::BdfSolver;
