//! Wall-clock bounded solves
//!
//! Interactive front-ends must not hang on a scenario that makes the
//! integrator crawl. [`solve_with_timeout`] runs the solve on a worker thread
//! and stops waiting after a limit. The worker cannot be interrupted: it
//! finishes in the background and its result is dropped.
//!
//! A worker that cannot be started, or that dies without sending a result,
//! is not a timeout: it completes with a failed result tagged
//! [`FailureKind::WorkerLost`].

use crate::solver::{FailureKind, Scenario, SimulationResult, Solver, SolverConfiguration};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::Duration;

/// Wait limit used by interactive callers
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Result of a bounded solve
#[derive(Debug)]
pub enum TimedOutcome {
    /// The solve returned in time (successfully or not)
    Completed(SimulationResult),
    /// No result within `limit`
    TimedOut { limit: Duration },
}

impl TimedOutcome {
    pub fn is_timed_out(&self) -> bool {
        matches!(self, TimedOutcome::TimedOut { .. })
    }

    /// The result, if the solve completed
    pub fn into_result(self) -> Option<SimulationResult> {
        match self {
            TimedOutcome::Completed(result) => Some(result),
            TimedOutcome::TimedOut { .. } => None,
        }
    }
}

/// Solve `scenario` on a worker thread, giving up after `limit`
pub fn solve_with_timeout<S>(
    solver: S,
    scenario: Scenario,
    config: SolverConfiguration,
    limit: Duration,
) -> TimedOutcome
where
    S: Solver + Send + 'static,
{
    let (sender, receiver) = mpsc::channel();
    let model = scenario.model.clone();
    let model_name = scenario.get_model_name().to_string();

    let spawned = thread::Builder::new()
        .name(format!("solve-{}", model_name))
        .spawn(move || {
            let result = solver.solve(&scenario, &config);
            // The receiver is gone once the caller stopped waiting
            let _ = sender.send(result);
        });

    if let Err(error) = spawned {
        let message = format!("Could not start solver thread for {}: {}", model_name, error);
        log::error!("{}", message);
        return TimedOutcome::Completed(SimulationResult::failed(model, FailureKind::WorkerLost, message));
    }

    match receiver.recv_timeout(limit) {
        Ok(result) => TimedOutcome::Completed(result),
        Err(RecvTimeoutError::Timeout) => {
            log::warn!("Simulation of {} did not finish within {:?}", model_name, limit);
            TimedOutcome::TimedOut { limit }
        }
        Err(RecvTimeoutError::Disconnected) => {
            let message = format!("Solver thread for {} ended without a result", model_name);
            log::error!("{}", message);
            TimedOutcome::Completed(SimulationResult::failed(model, FailureKind::WorkerLost, message))
        }
    }
}
