//! Parameter store
//!
//! Named presets supply the reaction network with kinetic constants and
//! initial concentrations:
//!
//! - [`PresetBundle`]: one named entry of the preset document
//! - [`ParameterStore`]: loads the document and tracks the active preset
//!
//! Presets never modify [`KineticParameters::default()`](crate::models::KineticParameters);
//! each one yields a freshly merged bundle.

pub mod preset;
pub mod store;

pub use preset::PresetBundle;
pub use store::{ParameterStore, PresetError, BUILTIN_PRESETS, DEFAULT_PRESET_PATH};
