//! Physical models implementations
//!
//! - [`Adm1Model`]: ADM1 uptake network with the iron/EDTA extension
//! - [`KineticParameters`]: immutable constants the network is evaluated with

pub mod adm1;
pub mod kinetic_parameters;

pub use adm1::{Adm1Model, ProcessRates};
pub use kinetic_parameters::{KineticParameters, PARAMETER_COUNT, PARAMETER_NAMES};
