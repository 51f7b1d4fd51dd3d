//! CSV export of simulation results
//!
//! Writes a [`SimulationResult`] as comma-separated values, compatible with
//! spreadsheets, pandas and most data analysis tools.
//!
//! # Features
//!
//! - **Column selection**: `time` then any subset of the state variables
//! - **Downsampling**: uniform, always keeping the first and last points
//! - **Metadata support**: optional `#` header with model and solver info
//! - **Customizable**: delimiter, decimal separator, precision
//! - **Validation**: refuses failed or empty results and non-finite values
//!
//! # Output
//!
//! ```csv
//! # ADM1 Simulation Data
//! # Model: food_waste
//! # Solver: BDF (variable order)
//! #
//! time,S_ac,S_ch4
//! 0.000000,0.500000,0.100000
//! 0.010000,0.512345,0.101234
//! ...
//! ```

use crate::output::export::Exporter;
use crate::solver::SimulationResult;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use thiserror::Error;

// =================================================================================================
// Errors
// =================================================================================================

/// Errors raised while exporting to CSV
#[derive(Debug, Error)]
pub enum CsvError {
    /// The result carries no data
    #[error("Empty data: the result has no time points")]
    EmptyResult,
    /// The solve failed; carries its message
    #[error("Cannot export a failed simulation: {0}")]
    FailedResult(String),
    /// A requested column is not a variable of the model
    #[error("Unknown variable '{0}'")]
    UnknownVariable(String),
    /// Downsampling needs at least the first and last point
    #[error("Downsampling needs at least 2 points, got {0}")]
    InvalidPointCount(usize),
    /// NaN or Inf in the data
    #[error("Invalid data: NaN or Inf in {column} at t = {time}")]
    NonFinite { column: String, time: f64 },
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

// =================================================================================================
// Configuration
// =================================================================================================

/// Configuration for CSV export
///
/// # Example
///
/// ```rust
/// use adm1_rs::output::export::CsvConfig;
///
/// let config = CsvConfig::european().precision(10).with_metadata();
/// assert_eq!(config.delimiter, ';');
/// assert_eq!(config.decimal_separator, ',');
/// ```
#[derive(Debug, Clone)]
pub struct CsvConfig {
    /// Column delimiter (default: ',')
    pub delimiter: char,

    /// Decimal separator (default: '.')
    pub decimal_separator: char,

    /// Number of decimal places (default: 6)
    pub precision: usize,

    /// Include `#` header comments (default: false)
    pub include_metadata: bool,

    /// Header of the time column (default: "time")
    pub time_header: String,
}

impl Default for CsvConfig {
    fn default() -> Self {
        Self {
            delimiter: ',',
            decimal_separator: '.',
            precision: 6,
            include_metadata: false,
            time_header: "time".to_string(),
        }
    }
}

impl CsvConfig {
    /// Semicolon delimiter, comma decimal separator
    pub fn european() -> Self {
        Self {
            delimiter: ';',
            decimal_separator: ',',
            ..Default::default()
        }
    }

    /// Builder pattern: set delimiter
    pub fn delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Builder pattern: set precision
    pub fn precision(mut self, precision: usize) -> Self {
        self.precision = precision;
        self
    }

    /// Builder pattern: enable metadata
    pub fn with_metadata(mut self) -> Self {
        self.include_metadata = true;
        self
    }

    fn format_number(&self, value: f64) -> String {
        let formatted = format!("{:.prec$}", value, prec = self.precision);
        if self.decimal_separator != '.' {
            formatted.replace('.', &self.decimal_separator.to_string())
        } else {
            formatted
        }
    }
}

// =================================================================================================
// Helper Functions
// =================================================================================================

/// Indices of `n_points` samples spread uniformly over `len`, first and last included
pub fn downsample_indices(len: usize, n_points: Option<usize>) -> Result<Vec<usize>, CsvError> {
    match n_points {
        None => Ok((0..len).collect()),
        Some(n) if n < 2 => Err(CsvError::InvalidPointCount(n)),
        Some(n) if n >= len => Ok((0..len).collect()),
        Some(n) => {
            let last = (len - 1) as f64;
            let mut indices: Vec<usize> = (0..n)
                .map(|i| (i as f64 * last / (n - 1) as f64).round() as usize)
                .collect();
            indices.dedup();
            Ok(indices)
        }
    }
}

fn write_metadata_header<W: Write>(writer: &mut W, result: &SimulationResult, rows: usize) -> io::Result<()> {
    writeln!(writer, "# ADM1 Simulation Data")?;
    writeln!(writer, "# Model: {}", result.model.name())?;
    if let Some(description) = result.model.description() {
        writeln!(writer, "# Description: {}", description)?;
    }
    if let Some(solver) = result.get_metadata("solver") {
        writeln!(writer, "# Solver: {}", solver)?;
    }
    if let (Some(start), Some(end)) = (result.time_points.first(), result.time_points.last()) {
        writeln!(writer, "# Time span: {} - {} d", start, end)?;
    }
    writeln!(writer, "# Points: {} of {}", rows, result.len())?;
    writeln!(writer, "# Steps: {}, rhs evaluations: {}, Jacobians: {}", result.n_steps, result.nfev, result.njev)?;

    let mut extra: Vec<(&String, &String)> = result
        .metadata
        .iter()
        .filter(|(key, _)| key.as_str() != "solver")
        .collect();
    extra.sort();
    for (key, value) in extra {
        writeln!(writer, "# {}: {}", key, value)?;
    }

    writeln!(writer, "#")
}

// =================================================================================================
// Exporter
// =================================================================================================

/// CSV implementation of [`Exporter`]
#[derive(Debug, Clone, Default)]
pub struct CsvExporter {
    pub config: CsvConfig,
}

impl CsvExporter {
    pub fn new(config: CsvConfig) -> Self {
        Self { config }
    }

    /// Write `result` to any writer
    ///
    /// An empty `variables` slice selects every variable of the model.
    pub fn write_to<W: Write>(
        &self,
        result: &SimulationResult,
        variables: &[&str],
        n_points: Option<usize>,
        writer: &mut W,
    ) -> Result<(), CsvError> {
        // ============================= Validation =============================

        if !result.success {
            return Err(CsvError::FailedResult(result.message.clone()));
        }
        if result.is_empty() {
            return Err(CsvError::EmptyResult);
        }

        let names: Vec<&str> = if variables.is_empty() {
            result.model.variable_names().to_vec()
        } else {
            variables.to_vec()
        };
        let rows: Vec<usize> = names
            .iter()
            .map(|name| {
                result
                    .variable_index_of(name)
                    .filter(|index| *index < result.states.nrows())
                    .ok_or_else(|| CsvError::UnknownVariable(name.to_string()))
            })
            .collect::<Result<_, _>>()?;

        let samples = downsample_indices(result.len(), n_points)?;

        for &column in &samples {
            let time = result.time_points[column];
            if !time.is_finite() {
                return Err(CsvError::NonFinite { column: self.config.time_header.clone(), time });
            }
            for (name, &row) in names.iter().zip(&rows) {
                if !result.states[(row, column)].is_finite() {
                    return Err(CsvError::NonFinite { column: name.to_string(), time });
                }
            }
        }

        // ============================= Write ==================================

        if self.config.include_metadata {
            write_metadata_header(writer, result, samples.len())?;
        }

        let delimiter = self.config.delimiter.to_string();
        let mut header = vec![self.config.time_header.as_str()];
        header.extend(names.iter().copied());
        writeln!(writer, "{}", header.join(&delimiter))?;

        for &column in &samples {
            let mut line = vec![self.config.format_number(result.time_points[column])];
            line.extend(rows.iter().map(|&row| self.config.format_number(result.states[(row, column)])));
            writeln!(writer, "{}", line.join(&delimiter))?;
        }

        writer.flush()?;
        Ok(())
    }
}

impl Exporter for CsvExporter {
    type Error = CsvError;

    fn export(
        &self,
        result: &SimulationResult,
        variables: &[&str],
        n_points: Option<usize>,
        path: &Path,
    ) -> Result<(), CsvError> {
        let mut writer = BufWriter::new(File::create(path)?);
        self.write_to(result, variables, n_points, &mut writer)?;
        log::info!("Exported {} to {}", result.model.name(), path.display());
        Ok(())
    }
}

// =================================================================================================
// Tests
// =================================================================================================
