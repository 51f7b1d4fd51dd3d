//! Helper functions for integration tests

use adm1_rs::physics::PhysicalModel;
use adm1_rs::solver::{Scenario, TimeSpan};
use nalgebra::DVector;

/// Assert that two state vectors are close (within tolerance)
pub fn assert_states_close(state1: &DVector<f64>, state2: &DVector<f64>, tolerance: f64, message: &str) {
    assert_eq!(state1.len(), state2.len(), "{}: Dimension mismatch", message);

    for (i, (&v1, &v2)) in state1.iter().zip(state2.iter()).enumerate() {
        let diff = (v1 - v2).abs();
        assert!(
            diff < tolerance,
            "{}: Element {} differs by {} (tolerance {})",
            message,
            i,
            diff,
            tolerance
        );
    }
}

/// Relative error |computed - exact| / |exact|
pub fn relative_error(computed: f64, exact: f64) -> f64 {
    if exact == 0.0 {
        computed.abs()
    } else {
        ((computed - exact) / exact).abs()
    }
}

/// Scenario over `[0, end]` owning `model`
pub fn create_simple_scenario<M: PhysicalModel + 'static>(model: M, end: f64) -> Scenario {
    Scenario::from_model(model, TimeSpan::from_zero(end))
}

/// Route `log` output to the test harness, once per test binary
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}
