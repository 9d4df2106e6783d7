//! Secondary-source equilibrium.
//!
//! Converts the physical release geometry into the initial cloud
//! footprint (radius, height) the downwind march starts from.

use crate::engine::HeavyGasInput;
use crate::error::{HeavyGasError, HeavyGasResult};
use core::fmt;
use core::str::FromStr;
use dg_atmos::thermo;
use dg_core::{Area, Length, Volume};

/// Physical release geometry.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SourceConfig {
    /// Instantaneous release of a cloud with known volume and ground area.
    Instantaneous { volume: Volume, area: Area },
    /// Evaporating pool of known diameter.
    Puddle { diameter: Length },
    /// Continuous release; footprint inferred from the flux balance.
    Continuous,
}

/// Release-type tag, as named in scenario inputs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SourceKind {
    Instantaneous,
    Puddle,
    Continuous,
}

impl SourceKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            SourceKind::Instantaneous => "instantaneous",
            SourceKind::Puddle => "puddle",
            SourceKind::Continuous => "continuous",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SourceKind {
    type Err = HeavyGasError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "instantaneous" => Ok(SourceKind::Instantaneous),
            "puddle" => Ok(SourceKind::Puddle),
            "continuous" => Ok(SourceKind::Continuous),
            _ => Err(HeavyGasError::domain(format!(
                "unknown source type '{s}' (expected instantaneous, puddle or continuous)"
            ))),
        }
    }
}

impl SourceConfig {
    pub fn kind(&self) -> SourceKind {
        match self {
            SourceConfig::Instantaneous { .. } => SourceKind::Instantaneous,
            SourceConfig::Puddle { .. } => SourceKind::Puddle,
            SourceConfig::Continuous => SourceKind::Continuous,
        }
    }

    pub fn validate(&self) -> HeavyGasResult<()> {
        let positive = |name: &str, v: f64| {
            if v.is_finite() && v > 0.0 {
                Ok(())
            } else {
                Err(HeavyGasError::domain(format!(
                    "{name} must be positive (got {v})"
                )))
            }
        };
        match self {
            SourceConfig::Instantaneous { volume, area } => {
                positive("instantaneous source volume", volume.value)?;
                positive("instantaneous source area", area.value)
            }
            SourceConfig::Puddle { diameter } => positive("puddle diameter", diameter.value),
            SourceConfig::Continuous => Ok(()),
        }
    }
}

/// Equilibrium initial cloud footprint.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SecondarySource {
    /// Initial cloud radius (m)
    pub radius: f64,
    /// Initial cloud height (m)
    pub height: f64,
    /// Air entrainment flux at the source (kg/(m²·s))
    pub entrainment_flux: f64,
    /// Entrainment flux was negligible and the fallback radius was used
    pub entrainment_fallback: bool,
}

/// Solve for the secondary source of a validated input.
pub fn solve_secondary_source(input: &HeavyGasInput) -> HeavyGasResult<SecondarySource> {
    let consts = &input.constants;
    let floors = &input.floors;
    let gas = &input.gas;
    let met = &input.met;
    let n = input.stability.params().n;
    let q = input.release_rate.value;

    let t_amb = met.ambient_temperature().value;
    let t_rel = gas.release_temperature.value;
    let u_ref = met.wind_speed_ref().value;
    let z_ref = met.wind_ref_height().value;
    let u_star = met.friction_velocity(consts)?;

    let rho_source = thermo::density(t_rel, gas.molecular_weight_gas, consts)?;
    let rho_air = thermo::density(t_amb, gas.molecular_weight_air, consts)?;
    let g_prime = thermo::reduced_gravity(rho_source, rho_air, consts);
    let u_10 = met.wind_at_10m(n);

    let (height, physical_radius) = match input.source {
        SourceConfig::Instantaneous { volume, area } => (
            volume.value / area.value,
            (area.value / core::f64::consts::PI).sqrt(),
        ),
        SourceConfig::Puddle { diameter } => (
            q / (rho_source * u_10 * diameter.value),
            diameter.value / 2.0,
        ),
        SourceConfig::Continuous => (
            ((q * core::f64::consts::PI) / (4.0 * rho_source * u_10)).sqrt(),
            0.0,
        ),
    };
    let height = height.max(floors.height);

    // Bulk and flux Richardson numbers at the source
    let ri_bulk = g_prime * height / u_star.powi(2);
    let excess_cold = ((t_amb - t_rel) / t_rel).max(0.0);
    let ri_flux = consts.gravity
        * excess_cold
        * (height / (u_star * u_ref))
        * (z_ref / height).powf(n);
    let sigma_w = thermo::vertical_velocity_variance(u_star, ri_flux);
    let ratio_sq = if sigma_w > 0.0 {
        (u_star / sigma_w).powi(2)
    } else {
        1.0
    };
    let phi = thermo::entrainment_suppression(ri_bulk * ratio_sq);
    let entrainment_flux = rho_air * consts.von_karman * sigma_w * (1.0 + n) / phi;

    let mut entrainment_fallback = false;
    let radius = match input.source {
        SourceConfig::Instantaneous { .. } => physical_radius,
        SourceConfig::Puddle { .. } | SourceConfig::Continuous => {
            let entrained_radius = if entrainment_flux <= floors.entrainment {
                entrainment_fallback = true;
                tracing::warn!(
                    entrainment_flux,
                    fallback_radius = floors.fallback_radius,
                    "negligible entrainment flux at source, using fallback radius"
                );
                floors.fallback_radius
            } else {
                let area = q / entrainment_flux;
                (area / core::f64::consts::PI).sqrt()
            };
            entrained_radius.max(physical_radius)
        }
    };
    let radius = radius.max(floors.radius);

    let source = SecondarySource {
        radius,
        height,
        entrainment_flux,
        entrainment_fallback,
    };
    if !(radius.is_finite() && height.is_finite()) {
        return Err(HeavyGasError::domain(format!(
            "secondary source is non-finite (radius={radius}, height={height})"
        )));
    }
    tracing::debug!(
        kind = %input.source.kind(),
        radius = source.radius,
        height = source.height,
        entrainment_flux = source.entrainment_flux,
        ri_bulk,
        ri_flux,
        "secondary source"
    );
    Ok(source)
}
