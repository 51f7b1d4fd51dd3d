//! Common utilities for integration tests
#![allow(dead_code)]

pub mod mock_models;
pub mod test_helpers;

// Re-export commonly used items
pub use mock_models::{DampedRotation, ExponentialDecay, Robertson};
pub use test_helpers::{assert_states_close, create_simple_scenario, init_logging, relative_error};
