//! Preset store
//!
//! Loads the preset document, keeps the presets in document order and tracks
//! which one is active.
//!
//! # Failure as data
//!
//! The store never panics and the boolean operations never return errors:
//!
//! | Operation            | Failure result                          |
//! |----------------------|-----------------------------------------|
//! | `load_presets`       | `false`, store left empty, error logged |
//! | `select_preset`      | `false`, active preset unchanged        |
//! | `active_parameters`  | empty map when nothing is active        |
//!
//! The `try_*` variants return a [`PresetError`] for callers that want the
//! cause.
//!
//! # Example
//!
//! ```rust
//! use adm1_rs::parameters::ParameterStore;
//!
//! let mut store = ParameterStore::builtin();
//! assert!(store.list_preset_names().contains(&"food_waste"));
//!
//! assert!(store.active_parameters().is_empty());
//! assert!(store.select_preset("food_waste"));
//! assert!(!store.select_preset("no_such_preset"));
//! assert_eq!(store.active_preset_name(), Some("food_waste"));
//! ```

use crate::models::Adm1Model;
use crate::parameters::PresetBundle;
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Default location of the preset document, relative to the working directory
pub const DEFAULT_PRESET_PATH: &str = "config/substrate_presets.json";

/// Preset document shipped with the crate
pub const BUILTIN_PRESETS: &str = include_str!("../../config/substrate_presets.json");

// =================================================================================================
// Errors
// =================================================================================================

/// Reasons a preset operation can fail
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PresetError {
    /// The source could not be read
    #[error("Preset source {} unavailable: {reason}", .path.display())]
    SourceUnavailable { path: PathBuf, reason: String },
    /// The source is not a valid preset document
    #[error("Malformed preset document: {reason}")]
    Malformed { reason: String },
    /// No preset carries this name
    #[error("Unknown preset '{0}'")]
    UnknownPreset(String),
    /// The preset parses but describes an unusable configuration
    #[error("Preset '{name}' is invalid: {reason}")]
    InvalidPreset { name: String, reason: String },
}

// =================================================================================================
// Store
// =================================================================================================

/// Where the store reads its document from
#[derive(Debug, Clone, PartialEq)]
enum PresetSource {
    File(PathBuf),
    Embedded,
}

/// Named preset collection with at most one active preset
#[derive(Debug, Clone)]
pub struct ParameterStore {
    source: PresetSource,
    presets: Vec<PresetBundle>,
    active: Option<usize>,
}

impl Default for ParameterStore {
    fn default() -> Self {
        Self::new(DEFAULT_PRESET_PATH)
    }
}

impl ParameterStore {
    /// Store reading from `path`
    ///
    /// Nothing is read until [`load_presets()`](Self::load_presets) is called.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            source: PresetSource::File(path.as_ref().to_path_buf()),
            presets: Vec::new(),
            active: None,
        }
    }

    /// Store loaded from the document embedded in the crate
    pub fn builtin() -> Self {
        let mut store = Self {
            source: PresetSource::Embedded,
            presets: Vec::new(),
            active: None,
        };
        store.load_presets();
        store
    }

    /// Read the source, replacing any previously loaded presets
    ///
    /// Returns `true` when at least one preset was loaded. A missing or
    /// corrupt source leaves the store empty and is logged, never raised.
    pub fn load_presets(&mut self) -> bool {
        match self.try_load() {
            Ok(count) => count > 0,
            Err(error) => {
                match &error {
                    PresetError::SourceUnavailable { .. } => log::warn!("{}", error),
                    _ => log::error!("{}", error),
                }
                false
            }
        }
    }

    /// Read the source, reporting why loading failed
    ///
    /// On error the store is emptied and no preset is active.
    pub fn try_load(&mut self) -> Result<usize, PresetError> {
        self.presets.clear();
        self.active = None;

        let text = match &self.source {
            PresetSource::Embedded => BUILTIN_PRESETS.to_string(),
            PresetSource::File(path) => {
                fs::read_to_string(path).map_err(|e| PresetError::SourceUnavailable {
                    path: path.clone(),
                    reason: e.to_string(),
                })?
            }
        };

        let presets = parse_document(&text)?;
        for preset in &presets {
            log::info!("Loaded preset: {}", preset.name);
        }

        self.presets = presets;
        Ok(self.presets.len())
    }

    /// Load presets from a JSON string instead of the configured source
    pub fn load_from_str(&mut self, text: &str) -> Result<usize, PresetError> {
        self.presets.clear();
        self.active = None;
        self.presets = parse_document(text)?;
        Ok(self.presets.len())
    }

    /// Names of all loaded presets, in document order
    pub fn list_preset_names(&self) -> Vec<&str> {
        self.presets.iter().map(|preset| preset.name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.presets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.presets.is_empty()
    }

    /// Preset by name
    pub fn preset(&self, name: &str) -> Option<&PresetBundle> {
        self.presets.iter().find(|preset| preset.name == name)
    }

    /// Make `name` the active preset
    ///
    /// Returns `false` and keeps the current selection when `name` is unknown.
    pub fn select_preset(&mut self, name: &str) -> bool {
        match self.try_select(name) {
            Ok(()) => true,
            Err(error) => {
                log::warn!("{}", error);
                false
            }
        }
    }

    /// Make `name` the active preset, reporting unknown names
    pub fn try_select(&mut self, name: &str) -> Result<(), PresetError> {
        let index = self
            .presets
            .iter()
            .position(|preset| preset.name == name)
            .ok_or_else(|| PresetError::UnknownPreset(name.to_string()))?;

        self.active = Some(index);
        log::info!("Active preset: {}", name);
        Ok(())
    }

    pub fn active_preset(&self) -> Option<&PresetBundle> {
        self.active.and_then(|index| self.presets.get(index))
    }

    pub fn active_preset_name(&self) -> Option<&str> {
        self.active_preset().map(|preset| preset.name.as_str())
    }

    /// Kinetic values of the active preset, exactly as persisted
    ///
    /// Empty when no preset is active.
    pub fn active_parameters(&self) -> Map<String, Value> {
        self.active_preset()
            .map(PresetBundle::kinetic_values)
            .unwrap_or_default()
    }

    /// Reaction network configured by the preset `name`
    pub fn build_model(&self, name: &str) -> Result<Adm1Model, PresetError> {
        let preset = self
            .preset(name)
            .ok_or_else(|| PresetError::UnknownPreset(name.to_string()))?;

        preset.validate().map_err(|reason| PresetError::InvalidPreset {
            name: name.to_string(),
            reason,
        })?;

        Ok(preset.build_model())
    }

    /// Reaction network configured by the active preset
    pub fn active_model(&self) -> Option<Adm1Model> {
        let name = self.active_preset_name()?;
        match self.build_model(name) {
            Ok(model) => Some(model),
            Err(error) => {
                log::warn!("{}", error);
                None
            }
        }
    }
}

/// Parse a preset document, keeping document order
///
/// An entry that does not describe a preset is logged and skipped; the
/// remaining entries still load. Only a document that is not a JSON object
/// is rejected as a whole.
fn parse_document(text: &str) -> Result<Vec<PresetBundle>, PresetError> {
    let document: Map<String, Value> = serde_json::from_str(text)
        .map_err(|e| PresetError::Malformed { reason: e.to_string() })?;

    let presets = document
        .into_iter()
        .filter_map(|(name, value)| match serde_json::from_value::<PresetBundle>(value) {
            Ok(mut preset) => {
                preset.name = name;
                Some(preset)
            }
            Err(e) => {
                log::warn!("Skipping preset '{}': {}", name, e);
                None
            }
        })
        .collect();

    Ok(presets)
}

// =================================================================================================
// Tests
// =================================================================================================
