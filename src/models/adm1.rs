//! ADM1 uptake network with the iron/EDTA extension
//!
//! # Processes
//!
//! Seven substrate uptake processes, each of the form
//!
//! ```text
//! ρ_j = k_m,j · S_j / (K_S,j + S_j) · X_j · I_j
//!
//! dS_j/dt -= ρ_j
//! dX_j/dt += Y_j · ρ_j
//! ```
//!
//! | # | Substrate   | Degrader | Inhibition I_j          |
//! |---|-------------|----------|-------------------------|
//! | 1 | S_su        | X_su     | -                       |
//! | 2 | S_aa        | X_aa     | -                       |
//! | 3 | S_fa        | X_fa     | hydrogen (KI_h2_fa)     |
//! | 4 | S_va + S_bu | X_c4     | hydrogen (KI_h2_c4)     |
//! | 5 | S_pro       | X_pro    | hydrogen (KI_h2_pro)    |
//! | 6 | S_ac        | X_ac     | ammonia on S_IN (KI_nh3)|
//! | 7 | S_h2        | X_h2     | -                       |
//!
//! The C4 uptake is split between valerate and butyrate in proportion to
//! their share of the combined pool.
//!
//! # Metal sub-network
//!
//! ```text
//! ρ_complex = k_edta_fe · [Fe²⁺] · [EDTA] − k_edta_fe_rev · [FeEDTA]
//! ρ_precip  = k_precip_fes · [Fe²⁺]
//! ```
//!
//! Complexation consumes Fe²⁺ and EDTA and produces FeEDTA; precipitation
//! moves Fe²⁺ into FeS. The sulfide partner is not tracked.
//!
//! # Example
//!
//! ```rust
//! use adm1_rs::models::{Adm1Model, KineticParameters};
//! use adm1_rs::physics::{PhysicalModel, StateVariable};
//!
//! let model = Adm1Model::new(KineticParameters::default());
//! let y0 = model.setup_initial_state();
//! let dydt = model.compute_physics(0.0, &y0);
//!
//! // Fresh EDTA binds ferrous iron
//! assert!(dydt[StateVariable::SFeEdta.index()] > 0.0);
//! ```

use crate::models::KineticParameters;
use crate::physics::kinetics::{ammonia_inhibition, hydrogen_inhibition, monod, proportional_split};
use crate::physics::{PhysicalModel, StateVariable, StateVector, STATE_DIMENSION};
use nalgebra::DVector;

use StateVariable::*;

// =================================================================================================
// Process rates
// =================================================================================================

/// Volumetric rates of every process at one state
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ProcessRates {
    /// Monosaccharide uptake
    pub sugar: f64,
    /// Amino acid uptake
    pub amino_acid: f64,
    /// LCFA uptake (hydrogen inhibited)
    pub lcfa: f64,
    /// Combined valerate + butyrate uptake (hydrogen inhibited)
    pub c4: f64,
    /// Propionate uptake (hydrogen inhibited)
    pub propionate: f64,
    /// Acetate uptake (ammonia inhibited)
    pub acetate: f64,
    /// Hydrogen uptake
    pub hydrogen: f64,
    /// Net Fe-EDTA complexation
    pub complexation: f64,
    /// FeS precipitation
    pub precipitation: f64,
}

// =================================================================================================
// Model
// =================================================================================================

/// ADM1 reaction network with metal extension
#[derive(Debug, Clone, PartialEq)]
pub struct Adm1Model {
    parameters: KineticParameters,
    initial_state: StateVector,
    label: String,
    description: Option<String>,
}

impl Default for Adm1Model {
    fn default() -> Self {
        Self::new(KineticParameters::default())
    }
}

impl Adm1Model {
    /// Model with the literature initial concentrations
    pub fn new(parameters: KineticParameters) -> Self {
        Self {
            parameters,
            initial_state: StateVector::default(),
            label: "ADM1".to_string(),
            description: None,
        }
    }

    /// Replace the default initial state
    pub fn with_initial_state(mut self, initial_state: StateVector) -> Self {
        self.initial_state = initial_state;
        self
    }

    /// Label the model, e.g. with the preset it was built from
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn parameters(&self) -> &KineticParameters {
        &self.parameters
    }

    pub fn initial_state(&self) -> &StateVector {
        &self.initial_state
    }

    /// Rates of all processes at `y`
    ///
    /// # Panics
    ///
    /// Panics when `y` holds fewer than [`STATE_DIMENSION`] values.
    pub fn process_rates(&self, y: &[f64]) -> ProcessRates {
        let p = &self.parameters;
        let s = |v: StateVariable| y[v.index()];

        let s_h2 = s(SH2);

        let sugar = monod(s(SSu), p.k_s_su, p.k_m_su, s(XSu));
        let amino_acid = monod(s(SAa), p.k_s_aa, p.k_m_aa, s(XAa));
        let lcfa = monod(s(SFa), p.k_s_fa, p.k_m_fa, s(XFa)) * hydrogen_inhibition(s_h2, p.ki_h2_fa);
        let c4 = monod(s(SVa) + s(SBu), p.k_s_c4, p.k_m_c4, s(XC4))
            * hydrogen_inhibition(s_h2, p.ki_h2_c4);
        let propionate =
            monod(s(SPro), p.k_s_pro, p.k_m_pro, s(XPro)) * hydrogen_inhibition(s_h2, p.ki_h2_pro);
        let acetate = monod(s(SAc), p.k_s_ac, p.k_m_ac, s(XAc)) * ammonia_inhibition(s(SIn), p.ki_nh3);
        let hydrogen = monod(s_h2, p.k_s_h2, p.k_m_h2, s(XH2));

        let complexation = p.k_edta_fe * s(SFe2) * s(SEdta) - p.k_edta_fe_rev * s(SFeEdta);
        let precipitation = p.k_precip_fes * s(SFe2);

        ProcessRates {
            sugar,
            amino_acid,
            lcfa,
            c4,
            propionate,
            acetate,
            hydrogen,
            complexation,
            precipitation,
        }
    }

    /// Accumulate the uptake processes into `dydt`
    fn add_uptake(&self, y: &[f64], rates: &ProcessRates, dydt: &mut [f64]) {
        let p = &self.parameters;

        dydt[SSu.index()] -= rates.sugar;
        dydt[XSu.index()] += p.y_su * rates.sugar;

        dydt[SAa.index()] -= rates.amino_acid;
        dydt[XAa.index()] += p.y_aa * rates.amino_acid;

        dydt[SFa.index()] -= rates.lcfa;
        dydt[XFa.index()] += p.y_fa * rates.lcfa;

        let (valerate, butyrate) = proportional_split(rates.c4, y[SVa.index()], y[SBu.index()]);
        dydt[SVa.index()] -= valerate;
        dydt[SBu.index()] -= butyrate;
        dydt[XC4.index()] += p.y_c4 * rates.c4;

        dydt[SPro.index()] -= rates.propionate;
        dydt[XPro.index()] += p.y_pro * rates.propionate;

        dydt[SAc.index()] -= rates.acetate;
        dydt[XAc.index()] += p.y_ac * rates.acetate;

        dydt[SH2.index()] -= rates.hydrogen;
        dydt[XH2.index()] += p.y_h2 * rates.hydrogen;
    }

    /// Accumulate complexation and precipitation into `dydt`
    fn add_metal(rates: &ProcessRates, dydt: &mut [f64]) {
        dydt[SFe2.index()] -= rates.complexation;
        dydt[SEdta.index()] -= rates.complexation;
        dydt[SFeEdta.index()] += rates.complexation;

        dydt[SFe2.index()] -= rates.precipitation;
        dydt[XFeS.index()] += rates.precipitation;
    }
}

impl PhysicalModel for Adm1Model {
    fn dimension(&self) -> usize {
        STATE_DIMENSION
    }

    fn compute_physics(&self, _t: f64, state: &DVector<f64>) -> DVector<f64> {
        let mut dydt = DVector::zeros(state.len());
        let y = state.as_slice();

        let rates = self.process_rates(y);
        self.add_uptake(y, &rates, dydt.as_mut_slice());
        Self::add_metal(&rates, dydt.as_mut_slice());

        dydt
    }

    fn setup_initial_state(&self) -> DVector<f64> {
        self.initial_state.as_vector().clone()
    }

    fn name(&self) -> &str {
        &self.label
    }

    fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    fn variable_names(&self) -> &[&'static str] {
        &StateVariable::NAMES
    }
}

// =================================================================================================
// Tests
// =================================================================================================
