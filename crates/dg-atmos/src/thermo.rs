//! Thermodynamic and surface-layer helper functions.
//!
//! All functions are pure; constants are passed in explicitly.

use crate::error::{AtmosError, AtmosResult};
use dg_core::PhysicalConstants;

/// Gas density (kg/m³) from the ideal-gas law at the reference pressure.
///
/// `molecular_weight` is in g/mol.
pub fn density(
    temperature: f64,
    molecular_weight: f64,
    consts: &PhysicalConstants,
) -> AtmosResult<f64> {
    if !(temperature.is_finite() && temperature > 0.0) {
        return Err(AtmosError::Domain {
            what: format!("temperature must be positive (got {temperature} K)"),
        });
    }
    if !(molecular_weight.is_finite() && molecular_weight > 0.0) {
        return Err(AtmosError::Domain {
            what: format!("molecular weight must be positive (got {molecular_weight} g/mol)"),
        });
    }
    Ok((consts.reference_pressure * molecular_weight * 1e-3)
        / (consts.gas_constant * temperature))
}

/// Friction velocity u* (m/s) from the logarithmic wind profile.
///
/// Requires `ref_height > roughness > 0`.
pub fn friction_velocity(
    ref_wind: f64,
    ref_height: f64,
    roughness: f64,
    consts: &PhysicalConstants,
) -> AtmosResult<f64> {
    if !(roughness.is_finite() && roughness > 0.0) {
        return Err(AtmosError::Domain {
            what: format!("surface roughness must be positive (got {roughness} m)"),
        });
    }
    if !(ref_height.is_finite() && ref_height > roughness) {
        return Err(AtmosError::Domain {
            what: format!(
                "reference height must exceed surface roughness (got z_ref={ref_height} m, z0={roughness} m)"
            ),
        });
    }
    if !(ref_wind.is_finite() && ref_wind > 0.0) {
        return Err(AtmosError::Domain {
            what: format!("reference wind speed must be positive (got {ref_wind} m/s)"),
        });
    }
    Ok(consts.von_karman * ref_wind / (ref_height / roughness).ln())
}

/// Entrainment suppression φ(Ri).
///
/// One for unstable (negative) Richardson numbers; otherwise the empirical
/// polynomial-plus-power-law curve, floored at one so the function is
/// continuous at `Ri = 0`.
///
/// The raw curve starts at 0.88 and only reaches one near `Ri ≈ 1.2`, so on
/// `[0, 1.2]` this returns exactly one rather than the fitted value. Weakly
/// stratified clouds therefore entrain at the neutral rate instead of being
/// enhanced above it.
pub fn entrainment_suppression(richardson: f64) -> f64 {
    if richardson < 0.0 {
        return 1.0;
    }
    let empirical = 0.88 + 0.099 * richardson.powf(1.04) + 1.4e-25 * richardson.powf(5.7);
    empirical.max(1.0)
}

/// Vertical velocity standard deviation σ_w (m/s).
///
/// Negative flux Richardson numbers are treated as zero.
pub fn vertical_velocity_variance(u_star: f64, richardson_flux: f64) -> f64 {
    let ri = richardson_flux.max(0.0);
    u_star * (1.0 + ri.powf(2.0 / 3.0)).sqrt()
}

/// Reduced gravity g' = g (ρ − ρ_air) / ρ_air (m/s²).
pub fn reduced_gravity(rho: f64, rho_air: f64, consts: &PhysicalConstants) -> f64 {
    consts.gravity * (rho - rho_air) / rho_air
}

/// Power-law wind speed at height `z` from a reference measurement.
pub fn wind_at_height(ref_wind: f64, ref_height: f64, z: f64, n: f64) -> f64 {
    ref_wind * (z / ref_height).powf(n)
}
