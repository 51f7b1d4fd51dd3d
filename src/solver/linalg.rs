//! Dense linear-algebra helpers shared by the implicit integrators

use nalgebra::{DMatrix, DVector};

/// Smallest magnitude used to size a finite-difference perturbation
pub const JACOBIAN_FLOOR: f64 = 1e-3;

/// Root-mean-square norm, `0` for an empty vector
pub fn rms_norm(values: &DVector<f64>) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.norm() / (values.len() as f64).sqrt()
}

/// RMS norm of `values / scale`, component-wise
pub fn scaled_rms_norm(values: &DVector<f64>, scale: &DVector<f64>) -> f64 {
    rms_norm(&values.component_div(scale))
}

/// Error weights `atol + rtol * |y|`
pub fn error_scale(y: &DVector<f64>, rtol: f64, atol: f64) -> DVector<f64> {
    y.map(|value| atol + rtol * value.abs())
}

/// Distance from `t` to the next representable `f64` away from zero
pub fn spacing(t: f64) -> f64 {
    let magnitude = t.abs();
    if magnitude == 0.0 {
        return f64::from_bits(1);
    }
    f64::from_bits(magnitude.to_bits() + 1) - magnitude
}

/// Magnitude below which a component is perturbed as if it had this size
///
/// `atol / rtol` is the concentration at which absolute and relative error
/// weights are equal, clamped to `[JACOBIAN_FLOOR, 1]`. Smaller perturbations
/// of components sitting at zero drown in the rounding of `f`.
pub fn jacobian_threshold(rtol: f64, atol: f64) -> f64 {
    (atol / rtol).clamp(JACOBIAN_FLOOR, 1.0)
}

/// Forward-difference Jacobian `J[i][j] = ∂f_i/∂y_j` at `(t, y)`
///
/// `f0` must be `rhs(t, y)`. Column `j` costs one evaluation of `rhs` with
/// `y_j` perturbed by `sqrt(eps) * max(|y_j|, threshold)`.
pub fn finite_difference_jacobian<F>(
    mut rhs: F,
    t: f64,
    y: &DVector<f64>,
    f0: &DVector<f64>,
    threshold: f64,
) -> DMatrix<f64>
where
    F: FnMut(f64, &DVector<f64>) -> DVector<f64>,
{
    let n = y.len();
    let relative_step = f64::EPSILON.sqrt();
    let mut jacobian = DMatrix::zeros(f0.len(), n);
    let mut perturbed = y.clone();

    for j in 0..n {
        let original = y[j];
        perturbed[j] = original + relative_step * original.abs().max(threshold);
        // Exact representable increment
        let step = perturbed[j] - original;

        let f1 = rhs(t, &perturbed);
        jacobian.set_column(j, &((f1 - f0) / step));
        perturbed[j] = original;
    }

    jacobian
}
