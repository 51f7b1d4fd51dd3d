//! State variables of the digester
//!
//! The ordering below is fixed for the whole crate: index `i` of every state
//! vector, rate vector and result row refers to `StateVariable::ALL[i]`.
//!
//! | Range  | Group        | Count |
//! |--------|--------------|-------|
//! | 0..12  | Soluble      | 12    |
//! | 12..23 | Particulate  | 11    |
//! | 23..25 | Ionic        | 2     |
//! | 25..29 | Metal        | 4     |

use nalgebra::DVector;
use std::fmt;
use std::ops::{Index, IndexMut};

/// Number of state variables tracked by the model
pub const STATE_DIMENSION: usize = 29;

// =================================================================================================
// State variables (type-safe identifiers)
// =================================================================================================

/// Named state variable
///
/// The discriminant is the index into the state vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StateVariable {
    /// Monosaccharides \[gCOD/m³\]
    SSu = 0,
    /// Amino acids \[gCOD/m³\]
    SAa,
    /// Long chain fatty acids \[gCOD/m³\]
    SFa,
    /// Total valerate \[gCOD/m³\]
    SVa,
    /// Total butyrate \[gCOD/m³\]
    SBu,
    /// Total propionate \[gCOD/m³\]
    SPro,
    /// Total acetate \[gCOD/m³\]
    SAc,
    /// Hydrogen \[gCOD/m³\]
    SH2,
    /// Methane \[gCOD/m³\]
    SCh4,
    /// Inorganic carbon \[molC/m³\]
    SIc,
    /// Inorganic nitrogen \[molN/m³\]
    SIn,
    /// Soluble inerts \[gCOD/m³\]
    SI,

    /// Composite carbohydrates \[gCOD/m³\]
    XCh,
    /// Composite proteins \[gCOD/m³\]
    XPr,
    /// Composite lipids \[gCOD/m³\]
    XLi,
    /// Sugar degraders \[gCOD/m³\]
    XSu,
    /// Amino acid degraders \[gCOD/m³\]
    XAa,
    /// LCFA degraders \[gCOD/m³\]
    XFa,
    /// Valerate and butyrate degraders \[gCOD/m³\]
    XC4,
    /// Propionate degraders \[gCOD/m³\]
    XPro,
    /// Acetate degraders \[gCOD/m³\]
    XAc,
    /// Hydrogen degraders \[gCOD/m³\]
    XH2,
    /// Particulate inerts \[gCOD/m³\]
    XI,

    /// Cations \[eq/m³\]
    SCat,
    /// Anions \[eq/m³\]
    SAn,

    /// Ferrous iron \[mol/m³\]
    SFe2,
    /// EDTA \[mol/m³\]
    SEdta,
    /// Fe-EDTA complex \[mol/m³\]
    SFeEdta,
    /// Iron sulfide precipitate \[mol/m³\]
    XFeS,
}

/// Coarse grouping of state variables
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VariableCategory {
    Soluble,
    Particulate,
    Ionic,
    Metal,
}

impl StateVariable {
    /// Every variable in state-vector order
    pub const ALL: [StateVariable; STATE_DIMENSION] = [
        StateVariable::SSu,
        StateVariable::SAa,
        StateVariable::SFa,
        StateVariable::SVa,
        StateVariable::SBu,
        StateVariable::SPro,
        StateVariable::SAc,
        StateVariable::SH2,
        StateVariable::SCh4,
        StateVariable::SIc,
        StateVariable::SIn,
        StateVariable::SI,
        StateVariable::XCh,
        StateVariable::XPr,
        StateVariable::XLi,
        StateVariable::XSu,
        StateVariable::XAa,
        StateVariable::XFa,
        StateVariable::XC4,
        StateVariable::XPro,
        StateVariable::XAc,
        StateVariable::XH2,
        StateVariable::XI,
        StateVariable::SCat,
        StateVariable::SAn,
        StateVariable::SFe2,
        StateVariable::SEdta,
        StateVariable::SFeEdta,
        StateVariable::XFeS,
    ];

    /// Variable names in state-vector order
    pub const NAMES: [&'static str; STATE_DIMENSION] = [
        "S_su", "S_aa", "S_fa", "S_va", "S_bu", "S_pro", "S_ac", "S_h2", "S_ch4", "S_IC", "S_IN",
        "S_I", "X_ch", "X_pr", "X_li", "X_su", "X_aa", "X_fa", "X_c4", "X_pro", "X_ac", "X_h2",
        "X_I", "S_cat", "S_an", "S_Fe2", "S_EDTA", "S_FeEDTA", "X_FeS",
    ];

    /// Position in the state vector
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Conventional ADM1 symbol (`S_su`, `X_ac`, ...)
    pub fn name(self) -> &'static str {
        Self::NAMES[self.index()]
    }

    /// Look a variable up by its symbol
    pub fn from_name(name: &str) -> Option<Self> {
        Self::NAMES
            .iter()
            .position(|candidate| *candidate == name)
            .map(|index| Self::ALL[index])
    }

    /// Look a variable up by its position
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Group the variable belongs to
    pub fn category(self) -> VariableCategory {
        match self.index() {
            0..=11 => VariableCategory::Soluble,
            12..=22 => VariableCategory::Particulate,
            23..=24 => VariableCategory::Ionic,
            _ => VariableCategory::Metal,
        }
    }

    /// Concentration unit, for display
    pub fn unit(self) -> &'static str {
        match self {
            StateVariable::SIc => "molC/m3",
            StateVariable::SIn => "molN/m3",
            StateVariable::SCat | StateVariable::SAn => "eq/m3",
            v if v.category() == VariableCategory::Metal => "mol/m3",
            _ => "gCOD/m3",
        }
    }
}

impl fmt::Display for StateVariable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// =================================================================================================
// State vector
// =================================================================================================

/// Literature initial concentrations, in state-vector order
pub const DEFAULT_INITIAL_CONDITIONS: [f64; STATE_DIMENSION] = [
    // Soluble
    5.0, 2.0, 0.1, 0.05, 0.05, 0.1, 0.5, 1e-6, 0.1, 0.1, 0.05, 0.1,
    // Particulate
    10.0, 8.0, 6.0, 1.0, 0.8, 0.6, 0.5, 0.4, 0.3, 0.2, 2.0,
    // Ionic
    0.01, 0.01,
    // Metal
    0.01, 0.001, 0.0, 0.0,
];

/// Fixed-length concentration vector
///
/// Always holds exactly [`STATE_DIMENSION`] values; constructors that take
/// arbitrary slices check the length.
#[derive(Debug, Clone, PartialEq)]
pub struct StateVector {
    values: DVector<f64>,
}

impl StateVector {
    /// All concentrations zero
    pub fn zeros() -> Self {
        Self { values: DVector::zeros(STATE_DIMENSION) }
    }

    /// Build from a slice of exactly [`STATE_DIMENSION`] values
    pub fn from_slice(values: &[f64]) -> Result<Self, String> {
        if values.len() != STATE_DIMENSION {
            return Err(format!(
                "State vector needs {} values, got {}",
                STATE_DIMENSION,
                values.len()
            ));
        }
        Ok(Self { values: DVector::from_column_slice(values) })
    }

    /// Wrap an existing vector, checking its length
    pub fn from_vector(values: DVector<f64>) -> Result<Self, String> {
        if values.len() != STATE_DIMENSION {
            return Err(format!(
                "State vector needs {} values, got {}",
                STATE_DIMENSION,
                values.len()
            ));
        }
        Ok(Self { values })
    }

    pub fn get(&self, variable: StateVariable) -> f64 {
        self.values[variable.index()]
    }

    pub fn set(&mut self, variable: StateVariable, value: f64) {
        self.values[variable.index()] = value;
    }

    pub fn as_vector(&self) -> &DVector<f64> {
        &self.values
    }

    pub fn as_slice(&self) -> &[f64] {
        self.values.as_slice()
    }

    /// Iterate `(variable, value)` pairs in state order
    pub fn iter(&self) -> impl Iterator<Item = (StateVariable, f64)> + '_ {
        StateVariable::ALL.iter().map(move |v| (*v, self.values[v.index()]))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl Default for StateVector {
    fn default() -> Self {
        Self { values: DVector::from_column_slice(&DEFAULT_INITIAL_CONDITIONS) }
    }
}

impl Index<StateVariable> for StateVector {
    type Output = f64;

    fn index(&self, variable: StateVariable) -> &f64 {
        &self.values[variable.index()]
    }
}

impl IndexMut<StateVariable> for StateVector {
    fn index_mut(&mut self, variable: StateVariable) -> &mut f64 {
        &mut self.values[variable.index()]
    }
}

impl From<StateVector> for DVector<f64> {
    fn from(state: StateVector) -> Self {
        state.values
    }
}

// =================================================================================================
// Tests
// =================================================================================================
