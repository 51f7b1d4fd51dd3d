//! Rate laws shared by the uptake processes
//!
//! # Monod uptake
//!
//! ```text
//! ρ = k_m · S / (K_S + S) · X
//! ```
//!
//! # Non-competitive inhibition
//!
//! ```text
//! I = 1 / (1 + S_I / K_I)
//! ```
//!
//! `I` equals 1 when the inhibitor is absent and decreases strictly towards 0
//! as the inhibitor concentration grows.

/// Monod uptake rate `k_m · S / (K_S + S) · X`
///
/// # Arguments
///
/// * `substrate` - Substrate concentration S
/// * `half_saturation` - Half-saturation constant K_S
/// * `max_uptake` - Maximum specific uptake rate k_m \[d⁻¹\]
/// * `biomass` - Degrader concentration X
#[inline]
pub fn monod(substrate: f64, half_saturation: f64, max_uptake: f64, biomass: f64) -> f64 {
    max_uptake * substrate / (half_saturation + substrate) * biomass
}

/// Non-competitive inhibition factor `1 / (1 + S_I / K_I)`
///
/// Range is (0, 1] for non-negative `inhibitor`.
#[inline]
pub fn non_competitive_inhibition(inhibitor: f64, inhibition_constant: f64) -> f64 {
    1.0 / (1.0 + inhibitor / inhibition_constant)
}

/// Hydrogen inhibition of LCFA, C4 and propionate uptake
#[inline]
pub fn hydrogen_inhibition(s_h2: f64, ki_h2: f64) -> f64 {
    non_competitive_inhibition(s_h2, ki_h2)
}

/// Free-ammonia inhibition of acetoclastic uptake, against inorganic nitrogen
#[inline]
pub fn ammonia_inhibition(s_in: f64, ki_nh3: f64) -> f64 {
    non_competitive_inhibition(s_in, ki_nh3)
}

/// Divide a lumped rate between two substrates sharing one uptake pool
///
/// Each share is proportional to the substrate's part of the combined
/// concentration. An empty pool yields `(0.0, 0.0)`.
#[inline]
pub fn proportional_split(rate: f64, first: f64, second: f64) -> (f64, f64) {
    let pool = first + second;
    if pool == 0.0 {
        return (0.0, 0.0);
    }
    (rate * first / pool, rate * second / pool)
}

// =================================================================================================
// Tests
// =================================================================================================
