//! Kinetic parameters of the reaction network
//!
//! # Design
//!
//! `KineticParameters` is an immutable value. The literature defaults are
//! returned by [`KineticParameters::default()`]; a preset never mutates them
//! but produces a new bundle with [`KineticParameters::with_overrides()`].
//!
//! Parameters are addressed externally by their literature symbols
//! (`k_m_su`, `K_S_su`, `Y_su`, `KI_h2_fa`, ...), which is also the key
//! format of the preset document.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Kinetic constants of the uptake processes and the metal sub-network
///
/// Units: rates in d⁻¹ (complexation in m³/mol/d), half-saturation and
/// hydrogen inhibition constants in gCOD/m³, ammonia inhibition in molN/m³,
/// yields dimensionless.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KineticParameters {
    // ==================== Disintegration / hydrolysis ====================
    /// Disintegration rate
    pub k_dis: f64,
    /// Carbohydrate hydrolysis rate
    pub k_hyd_ch: f64,
    /// Protein hydrolysis rate
    pub k_hyd_pr: f64,
    /// Lipid hydrolysis rate
    pub k_hyd_li: f64,

    // ==================== Sugar degraders ====================
    pub k_m_su: f64,
    #[serde(rename = "K_S_su")]
    pub k_s_su: f64,
    #[serde(rename = "Y_su")]
    pub y_su: f64,

    // ==================== Amino acid degraders ====================
    pub k_m_aa: f64,
    #[serde(rename = "K_S_aa")]
    pub k_s_aa: f64,
    #[serde(rename = "Y_aa")]
    pub y_aa: f64,

    // ==================== LCFA degraders ====================
    pub k_m_fa: f64,
    #[serde(rename = "K_S_fa")]
    pub k_s_fa: f64,
    #[serde(rename = "Y_fa")]
    pub y_fa: f64,

    // ==================== Valerate / butyrate degraders ====================
    pub k_m_c4: f64,
    #[serde(rename = "K_S_c4")]
    pub k_s_c4: f64,
    #[serde(rename = "Y_c4")]
    pub y_c4: f64,

    // ==================== Propionate degraders ====================
    pub k_m_pro: f64,
    #[serde(rename = "K_S_pro")]
    pub k_s_pro: f64,
    #[serde(rename = "Y_pro")]
    pub y_pro: f64,

    // ==================== Acetoclastic methanogens ====================
    pub k_m_ac: f64,
    #[serde(rename = "K_S_ac")]
    pub k_s_ac: f64,
    #[serde(rename = "Y_ac")]
    pub y_ac: f64,

    // ==================== Hydrogenotrophic methanogens ====================
    pub k_m_h2: f64,
    #[serde(rename = "K_S_h2")]
    pub k_s_h2: f64,
    #[serde(rename = "Y_h2")]
    pub y_h2: f64,

    // ==================== Inhibition ====================
    /// Hydrogen inhibition of LCFA uptake
    #[serde(rename = "KI_h2_fa")]
    pub ki_h2_fa: f64,
    /// Hydrogen inhibition of C4 uptake
    #[serde(rename = "KI_h2_c4")]
    pub ki_h2_c4: f64,
    /// Hydrogen inhibition of propionate uptake
    #[serde(rename = "KI_h2_pro")]
    pub ki_h2_pro: f64,
    /// Ammonia inhibition of acetate uptake
    #[serde(rename = "KI_nh3")]
    pub ki_nh3: f64,

    // ==================== Metal extension ====================
    /// Forward Fe²⁺ + EDTA complexation rate
    pub k_edta_fe: f64,
    /// Fe-EDTA dissociation rate
    pub k_edta_fe_rev: f64,
    /// FeS precipitation rate
    pub k_precip_fes: f64,
}

/// Number of named kinetic parameters
pub const PARAMETER_COUNT: usize = 32;

/// Parameter symbols, in declaration order
pub const PARAMETER_NAMES: [&str; PARAMETER_COUNT] = [
    "k_dis", "k_hyd_ch", "k_hyd_pr", "k_hyd_li",
    "k_m_su", "K_S_su", "Y_su",
    "k_m_aa", "K_S_aa", "Y_aa",
    "k_m_fa", "K_S_fa", "Y_fa",
    "k_m_c4", "K_S_c4", "Y_c4",
    "k_m_pro", "K_S_pro", "Y_pro",
    "k_m_ac", "K_S_ac", "Y_ac",
    "k_m_h2", "K_S_h2", "Y_h2",
    "KI_h2_fa", "KI_h2_c4", "KI_h2_pro", "KI_nh3",
    "k_edta_fe", "k_edta_fe_rev", "k_precip_fes",
];

impl Default for KineticParameters {
    fn default() -> Self {
        Self {
            k_dis: 0.5,
            k_hyd_ch: 10.0,
            k_hyd_pr: 10.0,
            k_hyd_li: 10.0,

            k_m_su: 30.0,
            k_s_su: 0.5,
            y_su: 0.1,

            k_m_aa: 50.0,
            k_s_aa: 0.3,
            y_aa: 0.08,

            k_m_fa: 6.0,
            k_s_fa: 0.4,
            y_fa: 0.06,

            k_m_c4: 20.0,
            k_s_c4: 0.2,
            y_c4: 0.1,

            k_m_pro: 13.0,
            k_s_pro: 0.1,
            y_pro: 0.08,

            k_m_ac: 8.0,
            k_s_ac: 0.15,
            y_ac: 0.05,

            k_m_h2: 35.0,
            k_s_h2: 7e-6,
            y_h2: 0.06,

            ki_h2_fa: 5e-6,
            ki_h2_c4: 1e-5,
            ki_h2_pro: 3.5e-6,
            ki_nh3: 0.0018,

            k_edta_fe: 1e5,
            k_edta_fe_rev: 0.1,
            k_precip_fes: 0.01,
        }
    }
}

impl KineticParameters {
    /// Mutable access to a parameter by its symbol
    fn slot_mut(&mut self, name: &str) -> Option<&mut f64> {
        let slot = match name {
            "k_dis" => &mut self.k_dis,
            "k_hyd_ch" => &mut self.k_hyd_ch,
            "k_hyd_pr" => &mut self.k_hyd_pr,
            "k_hyd_li" => &mut self.k_hyd_li,
            "k_m_su" => &mut self.k_m_su,
            "K_S_su" => &mut self.k_s_su,
            "Y_su" => &mut self.y_su,
            "k_m_aa" => &mut self.k_m_aa,
            "K_S_aa" => &mut self.k_s_aa,
            "Y_aa" => &mut self.y_aa,
            "k_m_fa" => &mut self.k_m_fa,
            "K_S_fa" => &mut self.k_s_fa,
            "Y_fa" => &mut self.y_fa,
            "k_m_c4" => &mut self.k_m_c4,
            "K_S_c4" => &mut self.k_s_c4,
            "Y_c4" => &mut self.y_c4,
            "k_m_pro" => &mut self.k_m_pro,
            "K_S_pro" => &mut self.k_s_pro,
            "Y_pro" => &mut self.y_pro,
            "k_m_ac" => &mut self.k_m_ac,
            "K_S_ac" => &mut self.k_s_ac,
            "Y_ac" => &mut self.y_ac,
            "k_m_h2" => &mut self.k_m_h2,
            "K_S_h2" => &mut self.k_s_h2,
            "Y_h2" => &mut self.y_h2,
            "KI_h2_fa" => &mut self.ki_h2_fa,
            "KI_h2_c4" => &mut self.ki_h2_c4,
            "KI_h2_pro" => &mut self.ki_h2_pro,
            "KI_nh3" => &mut self.ki_nh3,
            "k_edta_fe" => &mut self.k_edta_fe,
            "k_edta_fe_rev" => &mut self.k_edta_fe_rev,
            "k_precip_fes" => &mut self.k_precip_fes,
            _ => return None,
        };
        Some(slot)
    }

    /// Value of a parameter by its symbol
    pub fn get(&self, name: &str) -> Option<f64> {
        let mut copy = *self;
        copy.slot_mut(name).map(|value| *value)
    }

    /// Copy of `self` with one parameter replaced
    ///
    /// Returns `None` when `name` is not a known symbol.
    pub fn with(&self, name: &str, value: f64) -> Option<Self> {
        let mut merged = *self;
        *merged.slot_mut(name)? = value;
        Some(merged)
    }

    /// `(symbol, value)` pairs in declaration order
    pub fn entries(&self) -> Vec<(&'static str, f64)> {
        PARAMETER_NAMES
            .iter()
            .filter_map(|name| self.get(name).map(|value| (*name, value)))
            .collect()
    }

    /// Merge a group of overrides on top of `self`
    ///
    /// Numeric values under known symbols replace the current value. Keys that
    /// are unknown or not numeric are left out of the merge and returned so the
    /// caller can report them.
    pub fn with_overrides(&self, overrides: &Map<String, Value>) -> (Self, Vec<String>) {
        let mut merged = *self;
        let mut ignored = Vec::new();

        for (key, value) in overrides {
            match (merged.slot_mut(key), value.as_f64()) {
                (Some(slot), Some(number)) => *slot = number,
                _ => ignored.push(key.clone()),
            }
        }

        (merged, ignored)
    }

    /// Check that the constants describe a usable network
    ///
    /// Every value must be finite and non-negative; half-saturation and
    /// inhibition constants must be strictly positive since they appear in
    /// denominators.
    pub fn validate(&self) -> Result<(), String> {
        for (name, value) in self.entries() {
            if !value.is_finite() {
                return Err(format!("Parameter {} is not finite", name));
            }
            if value < 0.0 {
                return Err(format!("Parameter {} must be non-negative, got {}", name, value));
            }
            if (name.starts_with("K_S_") || name.starts_with("KI_")) && value == 0.0 {
                return Err(format!("Parameter {} appears in a denominator and cannot be 0", name));
            }
        }
        Ok(())
    }
}

// =================================================================================================
// Tests
// =================================================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_defaults_are_valid() {
        let parameters = KineticParameters::default();
        assert!(parameters.validate().is_ok());
        assert_eq!(parameters.entries().len(), PARAMETER_COUNT);
    }

    #[test]
    fn test_get_by_symbol() {
        let parameters = KineticParameters::default();
        assert_eq!(parameters.get("k_m_su"), Some(30.0));
        assert_eq!(parameters.get("K_S_h2"), Some(7e-6));
        assert_eq!(parameters.get("KI_nh3"), Some(0.0018));
        assert_eq!(parameters.get("k_edta_fe"), Some(1e5));
        assert_eq!(parameters.get("not_a_parameter"), None);
    }

    #[test]
    fn test_every_name_resolves() {
        let parameters = KineticParameters::default();
        for name in PARAMETER_NAMES {
            assert!(parameters.get(name).is_some(), "{} does not resolve", name);
        }
    }

    #[test]
    fn test_overrides_do_not_touch_defaults() {
        let defaults = KineticParameters::default();
        let overrides = json!({"k_m_su": 35.0, "K_S_su": 0.6, "comment": "x", "k_made_up": 1.0});
        let (merged, ignored) = defaults.with_overrides(overrides.as_object().unwrap());

        assert_eq!(merged.k_m_su, 35.0);
        assert_eq!(merged.k_s_su, 0.6);
        assert_eq!(merged.k_m_aa, defaults.k_m_aa);
        assert_eq!(defaults.k_m_su, 30.0);

        let mut ignored = ignored;
        ignored.sort();
        assert_eq!(ignored, vec!["comment".to_string(), "k_made_up".to_string()]);
    }

    #[test]
    fn test_with_single_value() {
        let parameters = KineticParameters::default().with("Y_c4", 0.06).unwrap();
        assert_eq!(parameters.y_c4, 0.06);
        assert!(KineticParameters::default().with("bogus", 1.0).is_none());
    }

    #[test]
    fn test_validate_rejects_zero_denominator() {
        let parameters = KineticParameters::default().with("KI_h2_c4", 0.0).unwrap();
        assert!(parameters.validate().is_err());

        let parameters = KineticParameters::default().with("k_m_ac", f64::NAN).unwrap();
        assert!(parameters.validate().is_err());

        let parameters = KineticParameters::default().with("k_dis", -1.0).unwrap();
        assert!(parameters.validate().is_err());
    }

    #[test]
    fn test_serde_uses_literature_symbols() {
        let parameters: KineticParameters =
            serde_json::from_value(json!({"K_S_su": 0.8, "k_dis": 0.3})).unwrap();
        assert_eq!(parameters.k_s_su, 0.8);
        assert_eq!(parameters.k_dis, 0.3);
        assert_eq!(parameters.k_m_h2, 35.0);

        let text = serde_json::to_string(&KineticParameters::default()).unwrap();
        assert!(text.contains("\"KI_h2_pro\""));
    }
}
