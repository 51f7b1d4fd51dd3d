//! Export module for simulation results.
//!
//! # Architecture
//!
//! This module defines the [`Exporter`] trait that abstracts the export format.
//! Each format is an independent implementation in its own sub-module, so a
//! new format is a new file.
//!
//! # Available formats
//!
//! | Format  | Module    |
//! |---------|-----------|
//! | CSV     | [`csv`]   |
//!
//! # Usage example
//!
//! ```rust,no_run
//! use adm1_rs::output::export::{CsvExporter, Exporter};
//! use adm1_rs::parameters::ParameterStore;
//! use adm1_rs::solver::{BdfSolver, Scenario, Solver, SolverConfiguration, TimeSpan};
//! use std::path::Path;
//!
//! let store = ParameterStore::builtin();
//! let model = store.build_model("food_waste").unwrap();
//! let scenario = Scenario::from_model(model, TimeSpan::from_zero(30.0));
//! let result = BdfSolver::new().solve(&scenario, &SolverConfiguration::default());
//!
//! let exporter = CsvExporter::default();
//!
//! // Every variable, every step
//! exporter.export(&result, &[], None, Path::new("food_waste.csv")).unwrap();
//!
//! // Gas-phase precursors, 500 points
//! exporter.export(&result, &["S_ch4", "S_h2", "S_ac"], Some(500), Path::new("gas.csv")).unwrap();
//! ```

pub mod csv;

pub use csv::{downsample_indices, CsvConfig, CsvError, CsvExporter};

use crate::solver::SimulationResult;
use std::path::Path;

/// Abstraction trait for all export formats.
///
/// # Associated type `Error`
///
/// Each format manages its own errors via the associated type.
///
/// # Parameters
///
/// - `variables`: columns to write after time, in that order; empty means
///   every variable of the model
/// - `n_points`: `None` writes every time point, `Some(n)` downsamples
///   uniformly to `n` points, first and last included
pub trait Exporter {
    /// Error type specific to this export format.
    type Error: std::error::Error;

    /// Write `result` to `path`
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `result` failed or contains no data
    /// - a variable name is unknown to the result's model
    /// - the path is invalid or the directory does not exist
    fn export(
        &self,
        result: &SimulationResult,
        variables: &[&str],
        n_points: Option<usize>,
        path: &Path,
    ) -> Result<(), Self::Error>;
}
