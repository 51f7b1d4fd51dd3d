//! Output module for simulation results
//!
//! Writes [`SimulationResult`](crate::solver::SimulationResult)s to files for
//! external analysis.
//!
//! # Architecture
//!
//! ```text
//! output/
//! ├── mod.rs              ← This file
//! └── export/             ← Data export
//!     ├── mod.rs          ← Exporter trait
//!     └── csv.rs
//! ```
//!
//! Rendering charts is left to the consumer of the exported data.

pub mod export;

pub use export::{CsvConfig, CsvError, CsvExporter, Exporter};
