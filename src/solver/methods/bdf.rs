//! Backward differentiation formulas (BDF)
//!
//! # Mathematical Background
//!
//! For `dy/dt = f(t, y)` a BDF of order `k` finds `y_{n+1}` such that
//!
//! ```text
//! Σ_{j=1..k} (1/j) ∇^j y_{n+1} = h f(t_{n+1}, y_{n+1})
//! ```
//!
//! where `∇` is the backward difference operator. The implicit equation is
//! solved by a simplified Newton iteration with the matrix `I - c J`,
//! `c = h / α_k`, factorised once and reused while `c` and `J` stay the same.
//!
//! This implementation uses the quasi-constant step size formulation with
//! the NDF error coefficients `κ` (Shampine & Reichelt, *The MATLAB ODE
//! Suite*, 1997):
//!
//! - the history is a table `D` of modified divided differences, rescaled
//!   whenever the step size changes
//! - the local error estimate is `(κ_k γ_k + 1/(k+1)) · d`, `d` being the
//!   Newton correction sum
//! - the order moves between 1 and 5 after `k + 1` steps of equal size,
//!   towards whichever of `k - 1, k, k + 1` allows the largest next step
//!
//! # Characteristics
//!
//! - **Order**: 1 to 5, chosen automatically
//! - **Stability**: A(α)-stable, suited to stiff systems
//! - **Cost per step**: one LU solve per Newton iteration, a new Jacobian only
//!   when Newton fails to converge
//!
//! # Example
//!
//! ```rust
//! use adm1_rs::models::Adm1Model;
//! use adm1_rs::solver::{BdfSolver, Scenario, Solver, SolverConfiguration, TimeSpan};
//!
//! let scenario = Scenario::from_model(Adm1Model::default(), TimeSpan::from_zero(1.0));
//! let result = BdfSolver::new().solve(&scenario, &SolverConfiguration::default());
//!
//! assert!(result.success, "{}", result.message);
//! assert_eq!(result.shape().0, 29);
//! ```

use crate::physics::PhysicalModel;
use crate::solver::linalg::{error_scale, finite_difference_jacobian, jacobian_threshold, scaled_rms_norm, spacing};
use crate::solver::{
    FailureKind, Scenario, SimulationResult, Solver, SolverConfiguration, TimeSpan, is_finite_state,
};
use nalgebra::{DMatrix, DVector, Dyn, LU};
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

const MAX_ORDER: usize = 5;
const NEWTON_MAXITER: usize = 4;
const MIN_FACTOR: f64 = 0.2;
const MAX_FACTOR: f64 = 10.0;

/// NDF modification of the classic BDF coefficients
const KAPPA: [f64; MAX_ORDER + 1] = [0.0, -0.1850, -1.0 / 9.0, -0.0823, -0.0415, 0.0];

// =================================================================================================
// Coefficients and difference table
// =================================================================================================

struct Coefficients {
    gamma: [f64; MAX_ORDER + 1],
    alpha: [f64; MAX_ORDER + 1],
    error_const: [f64; MAX_ORDER + 1],
}

impl Coefficients {
    fn new() -> Self {
        let mut gamma = [0.0; MAX_ORDER + 1];
        for k in 1..=MAX_ORDER {
            gamma[k] = gamma[k - 1] + 1.0 / k as f64;
        }

        let mut alpha = [0.0; MAX_ORDER + 1];
        let mut error_const = [0.0; MAX_ORDER + 1];
        for k in 0..=MAX_ORDER {
            alpha[k] = (1.0 - KAPPA[k]) * gamma[k];
            error_const[k] = KAPPA[k] * gamma[k] + 1.0 / (k + 1) as f64;
        }

        Self { gamma, alpha, error_const }
    }
}

/// Matrix rescaling the first `order + 1` differences by `factor`
fn compute_r(order: usize, factor: f64) -> DMatrix<f64> {
    let size = order + 1;
    let mut m = DMatrix::<f64>::zeros(size, size);
    m.row_mut(0).fill(1.0);
    for i in 1..size {
        for j in 1..size {
            m[(i, j)] = (i as f64 - 1.0 - factor * j as f64) / i as f64;
        }
    }

    // Cumulative product down each column
    for i in 1..size {
        for j in 0..size {
            m[(i, j)] *= m[(i - 1, j)];
        }
    }
    m
}

/// Rescale the difference table for a step size multiplied by `factor`
fn change_difference(d: &mut [DVector<f64>], order: usize, factor: f64) {
    let transform = compute_r(order, factor) * compute_r(order, 1.0);
    let previous: Vec<DVector<f64>> = d[..=order].to_vec();

    for (i, row) in d.iter_mut().take(order + 1).enumerate() {
        row.fill(0.0);
        for (k, source) in previous.iter().enumerate() {
            row.axpy(transform[(k, i)], source, 1.0);
        }
    }
}

// =================================================================================================
// Integration state
// =================================================================================================

#[derive(Clone, Copy, Debug, Default)]
struct Statistics {
    nfev: usize,
    njev: usize,
    nlu: usize,
    n_steps: usize,
    n_rejected: usize,
    highest_order: usize,
}

struct Trajectory {
    time_points: Vec<f64>,
    states: Vec<DVector<f64>>,
    statistics: Statistics,
}

struct Abort {
    kind: FailureKind,
    message: String,
    statistics: Statistics,
}

struct Factorization {
    c: f64,
    lu: LU<f64, Dyn, Dyn>,
}

/// LU of `I - c J`, recomputed only when `c` differs from the cached one
fn factorize<'f>(
    slot: &'f mut Option<Factorization>,
    jacobian: &DMatrix<f64>,
    c: f64,
    nlu: &mut usize,
) -> &'f LU<f64, Dyn, Dyn> {
    if slot.as_ref().is_none_or(|factorization| factorization.c != c) {
        *slot = None;
        *nlu += 1;
    }
    let factorization = slot.get_or_insert_with(|| {
        let n = jacobian.nrows();
        Factorization { c, lu: (DMatrix::identity(n, n) - jacobian * c).lu() }
    });
    &factorization.lu
}

/// Right-hand side with an evaluation counter
struct Rhs<'a> {
    model: &'a dyn PhysicalModel,
    nfev: usize,
}

impl Rhs<'_> {
    fn eval(&mut self, t: f64, y: &DVector<f64>) -> DVector<f64> {
        self.nfev += 1;
        self.model.compute_physics(t, y)
    }
}

struct NewtonOutcome {
    converged: bool,
    iterations: usize,
    y: DVector<f64>,
    d: DVector<f64>,
    non_finite: bool,
}

/// Simplified Newton iteration for the implicit BDF equation
#[allow(clippy::too_many_arguments)]
fn solve_collocation(
    rhs: &mut Rhs<'_>,
    t_new: f64,
    y_predict: &DVector<f64>,
    c: f64,
    psi: &DVector<f64>,
    lu: &LU<f64, Dyn, Dyn>,
    scale: &DVector<f64>,
    tol: f64,
) -> NewtonOutcome {
    let mut outcome = NewtonOutcome {
        converged: false,
        iterations: 0,
        y: y_predict.clone(),
        d: DVector::zeros(y_predict.len()),
        non_finite: false,
    };
    let mut dy_norm_old: Option<f64> = None;

    for k in 0..NEWTON_MAXITER {
        outcome.iterations = k + 1;

        let f = rhs.eval(t_new, &outcome.y);
        if !is_finite_state(&f) {
            outcome.non_finite = true;
            break;
        }

        let residual = f * c - psi - &outcome.d;
        let Some(dy) = lu.solve(&residual) else {
            break;
        };
        let dy_norm = scaled_rms_norm(&dy, scale);
        if !dy_norm.is_finite() {
            outcome.non_finite = true;
            break;
        }

        let rate = dy_norm_old.map(|old| dy_norm / old);
        if let Some(rate) = rate
            && (rate >= 1.0 || rate.powi((NEWTON_MAXITER - k) as i32) / (1.0 - rate) * dy_norm > tol)
        {
            break;
        }

        outcome.y += &dy;
        outcome.d += &dy;

        if dy_norm == 0.0 || rate.is_some_and(|rate| rate / (1.0 - rate) * dy_norm < tol) {
            outcome.converged = true;
            break;
        }
        dy_norm_old = Some(dy_norm);
    }

    outcome
}

/// Automatic first step from the local behaviour of `f` (first order estimate)
fn select_initial_step(
    rhs: &mut Rhs<'_>,
    t0: f64,
    y0: &DVector<f64>,
    f0: &DVector<f64>,
    interval_length: f64,
    config: &SolverConfiguration,
) -> f64 {
    if interval_length == 0.0 {
        return 0.0;
    }

    let scale = error_scale(y0, config.rtol, config.atol);
    let d0 = scaled_rms_norm(y0, &scale);
    let d1 = scaled_rms_norm(f0, &scale);
    let h0 = if d0 < 1e-5 || d1 < 1e-5 { 1e-6 } else { 0.01 * d0 / d1 };
    let h0 = h0.min(interval_length);

    let y1 = y0 + f0 * h0;
    let f1 = rhs.eval(t0 + h0, &y1);
    let d2 = scaled_rms_norm(&(f1 - f0), &scale) / h0;

    let h1 = if d1 <= 1e-15 && d2 <= 1e-15 {
        (h0 * 1e-3).max(1e-6)
    } else {
        (0.01 / d1.max(d2)).sqrt()
    };

    (100.0 * h0).min(h1).min(interval_length)
}

struct BdfIntegrator<'a> {
    rhs: Rhs<'a>,
    config: &'a SolverConfiguration,
    coefficients: Coefficients,
    newton_tol: f64,
    t: f64,
    t_bound: f64,
    y: DVector<f64>,
    h_abs: f64,
    order: usize,
    n_equal_steps: usize,
    d: Vec<DVector<f64>>,
    jacobian: DMatrix<f64>,
    lu: Option<Factorization>,
    statistics: Statistics,
}

impl<'a> BdfIntegrator<'a> {
    fn start(
        model: &'a dyn PhysicalModel,
        span: TimeSpan,
        y0: DVector<f64>,
        config: &'a SolverConfiguration,
    ) -> Result<Self, Abort> {
        let mut rhs = Rhs { model, nfev: 0 };
        let t0 = span.start;

        let f0 = rhs.eval(t0, &y0);
        if f0.len() != y0.len() {
            return Err(Abort {
                kind: FailureKind::InvalidScenario,
                message: format!("Right-hand side returned {} values for {} states", f0.len(), y0.len()),
                statistics: Statistics { nfev: rhs.nfev, ..Statistics::default() },
            });
        }
        if !is_finite_state(&f0) {
            return Err(Abort {
                kind: FailureKind::NonFiniteDerivative,
                message: format!("Right-hand side is not finite at t = {}", t0),
                statistics: Statistics { nfev: rhs.nfev, ..Statistics::default() },
            });
        }

        let interval_length = span.duration();
        let first_step = match config.first_step {
            Some(step) => step,
            None => select_initial_step(&mut rhs, t0, &y0, &f0, interval_length, config),
        };
        let h_abs = first_step.min(config.max_step).min(interval_length);

        let threshold = jacobian_threshold(config.rtol, config.atol);
        let jacobian = finite_difference_jacobian(|t, y| rhs.eval(t, y), t0, &y0, &f0, threshold);

        let n = y0.len();
        let mut d = vec![DVector::<f64>::zeros(n); MAX_ORDER + 3];
        d[0] = y0.clone();
        d[1] = &f0 * h_abs;

        let newton_tol = (10.0 * f64::EPSILON / config.rtol).max(0.03_f64.min(config.rtol.sqrt()));

        Ok(Self {
            rhs,
            config,
            coefficients: Coefficients::new(),
            newton_tol,
            t: t0,
            t_bound: span.end,
            y: y0,
            h_abs,
            order: 1,
            n_equal_steps: 0,
            d,
            jacobian,
            lu: None,
            statistics: Statistics { njev: 1, highest_order: 1, ..Statistics::default() },
        })
    }

    fn statistics(&self) -> Statistics {
        Statistics { nfev: self.rhs.nfev, ..self.statistics }
    }

    fn abort(&self, kind: FailureKind, message: String) -> Abort {
        Abort { kind, message, statistics: self.statistics() }
    }

    fn rescale(&mut self, factor: f64) {
        change_difference(&mut self.d, self.order, factor);
        self.n_equal_steps = 0;
    }

    /// Re-evaluate the Jacobian at `(t, y)`; false if `f` is not finite there
    fn refresh_jacobian(&mut self, t: f64, y: &DVector<f64>) -> bool {
        let f = self.rhs.eval(t, y);
        if !is_finite_state(&f) {
            return false;
        }
        log::trace!("t = {:.6}: refreshing Jacobian", t);
        let threshold = jacobian_threshold(self.config.rtol, self.config.atol);
        let rhs = &mut self.rhs;
        self.jacobian = finite_difference_jacobian(|t, y| rhs.eval(t, y), t, y, &f, threshold);
        self.statistics.njev += 1;
        self.lu = None;
        true
    }

    fn run(mut self) -> Result<Trajectory, Abort> {
        let mut time_points = vec![self.t];
        let mut states = vec![self.y.clone()];

        while self.t < self.t_bound {
            if self.statistics.n_steps >= self.config.max_steps {
                return Err(self.abort(
                    FailureKind::TooManySteps,
                    format!(
                        "Reached {} steps at t = {} before the end of the span ({})",
                        self.config.max_steps, self.t, self.t_bound
                    ),
                ));
            }

            self.step()?;
            time_points.push(self.t);
            states.push(self.y.clone());
        }

        Ok(Trajectory { time_points, states, statistics: self.statistics() })
    }

    fn step(&mut self) -> Result<(), Abort> {
        let t = self.t;
        let max_step = self.config.max_step;
        let min_step = 10.0 * spacing(t);

        let mut h_abs = self.h_abs;
        if h_abs > max_step {
            h_abs = max_step;
            self.rescale(max_step / self.h_abs);
        } else if h_abs < min_step {
            h_abs = min_step;
            self.rescale(min_step / self.h_abs);
        }

        let mut current_jacobian = false;
        let mut saw_non_finite = false;

        let (t_new, outcome, scale, error_norm, safety) = loop {
            if h_abs < min_step {
                let kind = if saw_non_finite {
                    FailureKind::NonFiniteDerivative
                } else {
                    FailureKind::StepSizeTooSmall
                };
                return Err(self.abort(
                    kind,
                    format!("Step size {:e} fell below the resolution of t = {}", h_abs, t),
                ));
            }

            let mut t_new = t + h_abs;
            if t_new > self.t_bound {
                t_new = self.t_bound;
                self.rescale((t_new - t) / h_abs);
            }
            let h = t_new - t;
            h_abs = h;

            let order = self.order;
            let alpha = self.coefficients.alpha[order];

            let y_predict = self.d[..=order].iter().fold(DVector::<f64>::zeros(self.y.len()), |sum, row| sum + row);
            let scale = error_scale(&y_predict, self.config.rtol, self.config.atol);
            let mut psi = DVector::zeros(self.y.len());
            for (row, gamma) in self.d[1..=order].iter().zip(&self.coefficients.gamma[1..=order]) {
                psi.axpy(*gamma, row, 1.0);
            }
            psi /= alpha;
            let c = h / alpha;

            let outcome = loop {
                let lu = factorize(&mut self.lu, &self.jacobian, c, &mut self.statistics.nlu);
                let outcome =
                    solve_collocation(&mut self.rhs, t_new, &y_predict, c, &psi, lu, &scale, self.newton_tol);
                saw_non_finite |= outcome.non_finite;

                if outcome.converged || current_jacobian {
                    break outcome;
                }
                current_jacobian = true;
                if !self.refresh_jacobian(t_new, &y_predict) {
                    saw_non_finite = true;
                    break outcome;
                }
            };

            if !outcome.converged {
                log::trace!("t = {:.6}: Newton did not converge, halving step to {:e}", t, 0.5 * h_abs);
                h_abs *= 0.5;
                self.rescale(0.5);
                self.statistics.n_rejected += 1;
                continue;
            }

            let safety =
                0.9 * (2 * NEWTON_MAXITER + 1) as f64 / (2 * NEWTON_MAXITER + outcome.iterations) as f64;
            let scale = error_scale(&outcome.y, self.config.rtol, self.config.atol);
            let error = &outcome.d * self.coefficients.error_const[order];
            let error_norm = scaled_rms_norm(&error, &scale);

            if error_norm > 1.0 {
                let factor = MIN_FACTOR.max(safety * error_norm.powf(-1.0 / (order as f64 + 1.0)));
                log::trace!("t = {:.6}: step {:e} rejected (error norm {:.3})", t, h_abs, error_norm);
                h_abs *= factor;
                self.rescale(factor);
                self.statistics.n_rejected += 1;
                continue;
            }

            break (t_new, outcome, scale, error_norm, safety);
        };

        // ====== Accepted step ======

        self.statistics.n_steps += 1;
        self.n_equal_steps += 1;
        self.t = t_new;
        self.y = outcome.y;
        self.h_abs = h_abs;

        let order = self.order;
        self.d[order + 2] = &outcome.d - &self.d[order + 1];
        self.d[order + 1] = outcome.d;
        for i in (0..=order).rev() {
            let (head, tail) = self.d.split_at_mut(i + 1);
            head[i] += &tail[0];
        }

        if self.n_equal_steps < order + 1 {
            return Ok(());
        }

        // ====== Order selection ======

        let error_const = &self.coefficients.error_const;
        let error_m_norm = if order > 1 {
            scaled_rms_norm(&(&self.d[order] * error_const[order - 1]), &scale)
        } else {
            f64::INFINITY
        };
        let error_p_norm = if order < MAX_ORDER {
            scaled_rms_norm(&(&self.d[order + 2] * error_const[order + 1]), &scale)
        } else {
            f64::INFINITY
        };

        let norms = [error_m_norm, error_norm, error_p_norm];
        let mut best = 1;
        let mut best_factor = norms[1].powf(-1.0 / (order as f64 + 1.0));
        for (offset, norm) in norms.iter().enumerate() {
            let factor = norm.powf(-1.0 / (order + offset) as f64);
            if factor > best_factor || (factor == best_factor && offset < best) {
                best = offset;
                best_factor = factor;
            }
        }

        let new_order = (order + best - 1).clamp(1, MAX_ORDER);
        if new_order != order {
            log::debug!("t = {:.6}: order {} -> {}", self.t, order, new_order);
        }
        self.order = new_order;
        self.statistics.highest_order = self.statistics.highest_order.max(new_order);

        let factor = MAX_FACTOR.min(safety * best_factor);
        self.h_abs *= factor;
        self.rescale(factor);

        Ok(())
    }
}

// =================================================================================================
// BDF Solver
// =================================================================================================

/// Variable-order BDF solver for stiff systems
///
/// Stateless: the same instance can solve any number of scenarios, one
/// call at a time or from several threads.
#[derive(Debug, Clone, Copy, Default)]
pub struct BdfSolver;

impl BdfSolver {
    /// Create a new BDF solver
    ///
    /// # Example
    ///
    /// ```rust
    /// use adm1_rs::solver::{BdfSolver, Solver};
    ///
    /// let solver = BdfSolver::new();
    /// assert_eq!(solver.name(), "BDF (variable order)");
    /// ```
    pub fn new() -> Self {
        Self
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(text) = payload.downcast_ref::<&str>() {
        (*text).to_string()
    } else if let Some(text) = payload.downcast_ref::<String>() {
        text.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

impl Solver for BdfSolver {
    fn solve(&self, scenario: &Scenario, config: &SolverConfiguration) -> SimulationResult {
        let model = Arc::clone(&scenario.model);

        // ====== Step 1: Validation ======

        if let Err(reason) = config.validate() {
            log::error!("Invalid solver configuration: {}", reason);
            return SimulationResult::failed(model, FailureKind::InvalidConfiguration, reason);
        }
        if let Err(reason) = scenario.validate() {
            log::error!("Invalid scenario for {}: {}", scenario.get_model_name(), reason);
            return SimulationResult::failed(model, FailureKind::InvalidScenario, reason);
        }

        let span = scenario.span;
        let y0 = scenario.initial_condition();

        if span.is_degenerate() {
            let mut result = SimulationResult::new(model, vec![span.start], &[y0], "Empty time span, initial state returned");
            result.add_metadata("solver", self.name());
            return result;
        }

        log::info!("Integrating {} over {} with {}", scenario.get_model_name(), span, self.name());

        // ====== Step 2: Integration ======

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            BdfIntegrator::start(model.as_ref(), span, y0, config).and_then(BdfIntegrator::run)
        }));

        // ====== Step 3: Build Result ======

        let trajectory = match outcome {
            Ok(Ok(trajectory)) => trajectory,
            Ok(Err(abort)) => {
                log::error!("Integration of {} failed: {}", scenario.get_model_name(), abort.message);
                let mut result = SimulationResult::failed(model, abort.kind, abort.message);
                apply_statistics(&mut result, &abort.statistics);
                return result;
            }
            Err(payload) => {
                let message = format!("Right-hand side panicked: {}", panic_message(payload.as_ref()));
                log::error!("Integration of {} failed: {}", scenario.get_model_name(), message);
                return SimulationResult::failed(model, FailureKind::RhsPanicked, message);
            }
        };

        let statistics = trajectory.statistics;
        let mut result = SimulationResult::new(
            model,
            trajectory.time_points,
            &trajectory.states,
            "The solver successfully reached the end of the integration interval.",
        );
        apply_statistics(&mut result, &statistics);

        result.add_metadata("solver", self.name());
        result.add_metadata("rtol", &config.rtol.to_string());
        result.add_metadata("atol", &config.atol.to_string());
        result.add_metadata("max step", &config.max_step.to_string());
        result.add_metadata("rejected steps", &statistics.n_rejected.to_string());
        result.add_metadata("highest order", &statistics.highest_order.to_string());

        let threshold = 10.0 * config.atol;
        if let Some((variable, time_index, value)) = result.negative_excursions(threshold).first().copied() {
            log::warn!(
                "{} went negative ({:e}) at t = {}; concentrations are not clamped",
                result.variable_name_of(variable),
                value,
                result.time_points[time_index]
            );
        }

        log::info!(
            "Integration of {} finished: {} steps, {} rhs evaluations, {} Jacobians",
            scenario.get_model_name(),
            statistics.n_steps,
            statistics.nfev,
            statistics.njev
        );

        result
    }

    fn name(&self) -> &'static str {
        "BDF (variable order)"
    }
}

fn apply_statistics(result: &mut SimulationResult, statistics: &Statistics) {
    result.nfev = statistics.nfev;
    result.njev = statistics.njev;
    result.nlu = statistics.nlu;
    result.n_steps = statistics.n_steps;
}

// =================================================================================================
// Tests
// =================================================================================================
