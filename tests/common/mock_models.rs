//! Mock physical models for testing
//!
//! These models have known analytical solutions or reference values,
//! making them ideal for validating numerical solver accuracy.

use adm1_rs::physics::PhysicalModel;
use nalgebra::DVector;

// =================================================================================================
// Exponential Decay: dy/dt = -k*y
// =================================================================================================

static DECAY_NAMES: [&str; 8] = ["y0", "y1", "y2", "y3", "y4", "y5", "y6", "y7"];

/// Exponential decay model: dy/dt = -k*y
///
/// Analytical solution: y(t) = y₀ * exp(-k*t)
pub struct ExponentialDecay {
    pub points: usize,
    pub decay_rate: f64,
}

impl ExponentialDecay {
    pub fn new(points: usize, decay_rate: f64) -> Self {
        Self { points, decay_rate }
    }

    /// Compute analytical solution at time t
    pub fn analytical_solution(&self, t: f64, y0: f64) -> f64 {
        y0 * (-self.decay_rate * t).exp()
    }
}

impl PhysicalModel for ExponentialDecay {
    fn dimension(&self) -> usize {
        self.points
    }

    fn compute_physics(&self, _t: f64, state: &DVector<f64>) -> DVector<f64> {
        state * -self.decay_rate
    }

    fn setup_initial_state(&self) -> DVector<f64> {
        DVector::from_element(self.points, 1.0)
    }

    fn name(&self) -> &str {
        "Exponential Decay"
    }

    fn variable_names(&self) -> &[&'static str] {
        &DECAY_NAMES[..self.points.min(DECAY_NAMES.len())]
    }
}

// =================================================================================================
// Damped rotation: a 2x2 linear system
// =================================================================================================

/// dy/dt = A y with A = [[-a, -b], [b, -a]], y(0) = (1, 0)
///
/// Analytical solution: y(t) = e^{-a t} (cos b t, sin b t)
pub struct DampedRotation {
    pub damping: f64,
    pub frequency: f64,
}

impl DampedRotation {
    pub fn analytical_solution(&self, t: f64) -> DVector<f64> {
        let envelope = (-self.damping * t).exp();
        DVector::from_vec(vec![
            envelope * (self.frequency * t).cos(),
            envelope * (self.frequency * t).sin(),
        ])
    }
}

impl PhysicalModel for DampedRotation {
    fn dimension(&self) -> usize {
        2
    }

    fn compute_physics(&self, _t: f64, state: &DVector<f64>) -> DVector<f64> {
        DVector::from_vec(vec![
            -self.damping * state[0] - self.frequency * state[1],
            self.frequency * state[0] - self.damping * state[1],
        ])
    }

    fn setup_initial_state(&self) -> DVector<f64> {
        DVector::from_vec(vec![1.0, 0.0])
    }

    fn name(&self) -> &str {
        "Damped Rotation"
    }

    fn variable_names(&self) -> &[&'static str] {
        &["x", "y"]
    }
}

// =================================================================================================
// Robertson chemical kinetics (stiff)
// =================================================================================================

/// Robertson's three-species reaction system
///
/// ```text
/// A → B          k1 = 0.04
/// B + B → C + B  k2 = 3e7
/// B + C → A + C  k3 = 1e4
/// ```
///
/// Rate constants spanning nine orders of magnitude make it a standard stiff
/// benchmark. Total mass `A + B + C` is conserved.
pub struct Robertson;

impl Robertson {
    /// Reference solution at t = 40
    pub const AT_40: [f64; 3] = [0.715_827_1, 9.185_535e-6, 0.284_163_7];
}

impl PhysicalModel for Robertson {
    fn dimension(&self) -> usize {
        3
    }

    fn compute_physics(&self, _t: f64, state: &DVector<f64>) -> DVector<f64> {
        let (a, b, c) = (state[0], state[1], state[2]);
        let forward = 0.04 * a;
        let dimer = 3e7 * b * b;
        let back = 1e4 * b * c;
        DVector::from_vec(vec![-forward + back, forward - back - dimer, dimer])
    }

    fn setup_initial_state(&self) -> DVector<f64> {
        DVector::from_vec(vec![1.0, 0.0, 0.0])
    }

    fn name(&self) -> &str {
        "Robertson"
    }

    fn variable_names(&self) -> &[&'static str] {
        &["A", "B", "C"]
    }
}
