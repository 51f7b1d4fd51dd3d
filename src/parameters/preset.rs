//! Preset documents
//!
//! A preset is one entry of the preset configuration document:
//!
//! ```json
//! {
//!   "food_waste": {
//!     "description": "Food waste, carbohydrate rich",
//!     "kinetic_parameters": { "k_m_su": 35.0, "K_S_su": 0.6 },
//!     "initial_conditions": { "S_su": 8.0, "X_ch": 20.0 },
//!     "metal_parameters": { "k_precip_fes": 0.015, "KI_Fe": 0.001 },
//!     "physical_parameters": { "T_op": 308.15 }
//!   }
//! }
//! ```
//!
//! Every group is kept verbatim, unknown keys included, so display code can
//! show the whole document. Only the numeric entries with known names take
//! part in the kinetics.

use crate::models::{Adm1Model, KineticParameters};
use crate::physics::{StateVariable, StateVector};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Metal constants that may be overridden from `metal_parameters`
const METAL_RATE_KEYS: [&str; 3] = ["k_edta_fe", "k_edta_fe_rev", "k_precip_fes"];

/// One named preset
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PresetBundle {
    /// Preset name, the key of the entry in the document
    #[serde(skip)]
    pub name: String,

    /// Free-text description
    #[serde(default)]
    pub description: String,

    /// Kinetic overrides keyed by literature symbol
    #[serde(default)]
    pub kinetic_parameters: Map<String, Value>,

    /// Initial concentrations keyed by state-variable symbol
    #[serde(default)]
    pub initial_conditions: Map<String, Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metal_parameters: Option<Map<String, Value>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub physical_parameters: Option<Map<String, Value>>,

    /// Any other top-level keys of the entry
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl PresetBundle {
    /// Numeric kinetic values exactly as persisted
    ///
    /// Non-numeric entries are skipped.
    pub fn kinetic_values(&self) -> Map<String, Value> {
        self.kinetic_parameters
            .iter()
            .filter(|(_, value)| value.is_number())
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect()
    }

    /// Literature defaults merged with this preset's overrides
    ///
    /// Returns the merged bundle and the keys that did not take part in the
    /// merge. Metal rate constants listed under `metal_parameters` win over
    /// the same keys under `kinetic_parameters`.
    pub fn kinetic_parameters(&self, defaults: &KineticParameters) -> (KineticParameters, Vec<String>) {
        let (mut merged, ignored) = defaults.with_overrides(&self.kinetic_parameters);

        if let Some(metal) = &self.metal_parameters {
            for key in METAL_RATE_KEYS {
                if let Some(value) = metal.get(key).and_then(Value::as_f64)
                    && let Some(updated) = merged.with(key, value)
                {
                    merged = updated;
                }
            }
        }

        (merged, ignored)
    }

    /// Literature initial state with this preset's concentrations applied
    ///
    /// Returns the state and the keys that are not state variables or not
    /// numeric.
    pub fn initial_state(&self) -> (StateVector, Vec<String>) {
        let mut state = StateVector::default();
        let mut ignored = Vec::new();

        for (key, value) in &self.initial_conditions {
            match (StateVariable::from_name(key), value.as_f64()) {
                (Some(variable), Some(number)) => state[variable] = number,
                _ => ignored.push(key.clone()),
            }
        }

        (state, ignored)
    }

    /// Reaction network configured by this preset
    pub fn build_model(&self) -> Adm1Model {
        let (parameters, ignored_kinetics) = self.kinetic_parameters(&KineticParameters::default());
        let (initial_state, ignored_state) = self.initial_state();

        if !ignored_kinetics.is_empty() {
            log::debug!("Preset {}: kinetic keys kept for display only: {:?}", self.name, ignored_kinetics);
        }
        if !ignored_state.is_empty() {
            log::debug!("Preset {}: initial-condition keys kept for display only: {:?}", self.name, ignored_state);
        }

        let model = Adm1Model::new(parameters)
            .with_initial_state(initial_state)
            .with_label(self.name.clone());

        if self.description.is_empty() {
            model
        } else {
            model.with_description(self.description.clone())
        }
    }

    /// Check the preset produces a usable network and state
    pub fn validate(&self) -> Result<(), String> {
        let (parameters, _) = self.kinetic_parameters(&KineticParameters::default());
        parameters.validate()?;

        let (state, _) = self.initial_state();
        if let Some((variable, value)) = state.iter().find(|(_, value)| !value.is_finite()) {
            return Err(format!("Initial condition {} is not finite ({})", variable, value));
        }
        Ok(())
    }
}

// =================================================================================================
// Tests
// =================================================================================================
