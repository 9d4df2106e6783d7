//! Meteorological snapshot driving one dispersion run.

use crate::error::{AtmosError, AtmosResult};
use crate::thermo;
use dg_core::{Length, PhysicalConstants, Temperature, Velocity};

/// Validated meteorological inputs.
///
/// Construction enforces `wind_speed_ref > 0`, `wind_ref_height > surface_roughness > 0`
/// and a positive ambient temperature.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MeteorologicalInputs {
    wind_speed_ref: Velocity,
    wind_ref_height: Length,
    surface_roughness: Length,
    ambient_temperature: Temperature,
}

impl MeteorologicalInputs {
    pub fn new(
        wind_speed_ref: Velocity,
        wind_ref_height: Length,
        surface_roughness: Length,
        ambient_temperature: Temperature,
    ) -> AtmosResult<Self> {
        let met = Self {
            wind_speed_ref,
            wind_ref_height,
            surface_roughness,
            ambient_temperature,
        };
        met.validate()?;
        Ok(met)
    }

    fn validate(&self) -> AtmosResult<()> {
        let u = self.wind_speed_ref.value;
        let z_ref = self.wind_ref_height.value;
        let z0 = self.surface_roughness.value;
        let t = self.ambient_temperature.value;

        if !(u.is_finite() && u > 0.0) {
            return Err(AtmosError::Domain {
                what: format!("reference wind speed must be positive (got {u} m/s)"),
            });
        }
        if !(z0.is_finite() && z0 > 0.0) {
            return Err(AtmosError::Domain {
                what: format!("surface roughness must be positive (got {z0} m)"),
            });
        }
        if !(z_ref.is_finite() && z_ref > z0) {
            return Err(AtmosError::Domain {
                what: format!(
                    "reference height must exceed surface roughness (got z_ref={z_ref} m, z0={z0} m)"
                ),
            });
        }
        if !(t.is_finite() && t > 0.0) {
            return Err(AtmosError::Domain {
                what: format!("ambient temperature must be positive (got {t} K)"),
            });
        }
        Ok(())
    }

    pub fn wind_speed_ref(&self) -> Velocity {
        self.wind_speed_ref
    }

    pub fn wind_ref_height(&self) -> Length {
        self.wind_ref_height
    }

    pub fn surface_roughness(&self) -> Length {
        self.surface_roughness
    }

    pub fn ambient_temperature(&self) -> Temperature {
        self.ambient_temperature
    }

    /// Friction velocity for this snapshot (m/s).
    pub fn friction_velocity(&self, consts: &PhysicalConstants) -> AtmosResult<f64> {
        thermo::friction_velocity(
            self.wind_speed_ref.value,
            self.wind_ref_height.value,
            self.surface_roughness.value,
            consts,
        )
    }

    /// Power-law wind speed at 10 m (m/s).
    pub fn wind_at_10m(&self, n: f64) -> f64 {
        thermo::wind_at_height(self.wind_speed_ref.value, self.wind_ref_height.value, 10.0, n)
    }
}
