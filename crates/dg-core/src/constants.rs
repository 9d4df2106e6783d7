//! Physical and closure constants shared by the dispersion kernels.
//!
//! Kernels take a `&PhysicalConstants` instead of reading module-level
//! statics so alternate standards can be swapped in per run.

/// Process-wide read-only constant set.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PhysicalConstants {
    /// von Kármán constant (dimensionless)
    pub von_karman: f64,
    /// Gravitational acceleration (m/s²)
    pub gravity: f64,
    /// Universal gas constant (J/(mol·K))
    pub gas_constant: f64,
    /// Reference pressure for the ideal-gas law (Pa)
    pub reference_pressure: f64,
    /// Ground-to-cloud heat transfer coefficient (W/(m²·K))
    pub ground_heat_transfer: f64,
    /// Heat capacity of the cloud mixture (J/(kg·K))
    pub mixture_heat_capacity: f64,
    /// Gravity-spreading entrainment coefficient (dimensionless)
    pub gravity_spreading_coeff: f64,
    /// Length scale dividing the ground heat flux term (m)
    pub heat_flux_length: f64,
}

impl Default for PhysicalConstants {
    fn default() -> Self {
        Self {
            von_karman: 0.41,
            gravity: 9.81,
            gas_constant: 8.314,
            reference_pressure: 101_325.0,
            ground_heat_transfer: 20.0,
            mixture_heat_capacity: 480.0,
            gravity_spreading_coeff: 1.15,
            heat_flux_length: 1.0,
        }
    }
}

impl PhysicalConstants {
    /// Reject constant sets that would put zeros into denominators.
    pub fn validate(&self) -> crate::DgResult<()> {
        use crate::numeric::ensure_positive;
        ensure_positive(self.von_karman, "von_karman")?;
        ensure_positive(self.gravity, "gravity")?;
        ensure_positive(self.gas_constant, "gas_constant")?;
        ensure_positive(self.reference_pressure, "reference_pressure")?;
        crate::numeric::ensure_finite(self.ground_heat_transfer, "ground_heat_transfer")?;
        ensure_positive(self.mixture_heat_capacity, "mixture_heat_capacity")?;
        crate::numeric::ensure_finite(self.gravity_spreading_coeff, "gravity_spreading_coeff")?;
        ensure_positive(self.heat_flux_length, "heat_flux_length")?;
        Ok(())
    }
}
