//! Released-gas properties and air/gas mixing rules.

use crate::error::{HeavyGasError, HeavyGasResult};
use dg_core::{Temperature, k};

/// Properties of the released dense gas.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GasProperties {
    /// Molecular weight of the released gas (g/mol)
    pub molecular_weight_gas: f64,
    /// Molecular weight of ambient air (g/mol)
    pub molecular_weight_air: f64,
    /// Temperature of the gas at release
    pub release_temperature: Temperature,
}

impl Default for GasProperties {
    fn default() -> Self {
        Self {
            molecular_weight_gas: 64.06,
            molecular_weight_air: 28.97,
            release_temperature: k(239.15),
        }
    }
}

impl GasProperties {
    pub fn new(molecular_weight_gas: f64, release_temperature: Temperature) -> Self {
        Self {
            molecular_weight_gas,
            release_temperature,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> HeavyGasResult<()> {
        for (name, v) in [
            ("gas molecular weight", self.molecular_weight_gas),
            ("air molecular weight", self.molecular_weight_air),
            ("release temperature", self.release_temperature.value),
        ] {
            if !(v.is_finite() && v > 0.0) {
                return Err(HeavyGasError::domain(format!(
                    "{name} must be positive (got {v})"
                )));
            }
        }
        Ok(())
    }

    /// Mixture molecular weight from the gas mass fraction (harmonic rule).
    pub fn mixture_molecular_weight(&self, mass_fraction: f64) -> f64 {
        let w = mass_fraction.clamp(0.0, 1.0);
        1.0 / (w / self.molecular_weight_gas + (1.0 - w) / self.molecular_weight_air)
    }

    /// Converts a gas mass concentration at mixture density to ppm by volume.
    pub fn to_ppm(&self, concentration: f64, mixture_density: f64) -> f64 {
        (concentration / mixture_density)
            * (self.molecular_weight_air / self.molecular_weight_gas)
            * 1e6
    }
}

/// Mass fraction of gas in a cloud carrying `flux` kg/s of which `release_rate` is gas.
pub fn mass_fraction(release_rate: f64, flux: f64) -> f64 {
    (release_rate / flux).min(1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn pure_gas_and_pure_air_limits() {
        let g = GasProperties::default();
        assert_relative_eq!(g.mixture_molecular_weight(1.0), 64.06, max_relative = 1e-12);
        assert_relative_eq!(g.mixture_molecular_weight(0.0), 28.97, max_relative = 1e-12);
    }

    #[test]
    fn mixture_weight_between_components() {
        let g = GasProperties::default();
        let mw = g.mixture_molecular_weight(0.5);
        assert!(mw > 28.97 && mw < 64.06);
    }

    #[test]
    fn mass_fraction_is_capped() {
        assert_eq!(mass_fraction(2.0, 1.0), 1.0);
        assert_eq!(mass_fraction(2.0, 8.0), 0.25);
    }

    #[test]
    fn invalid_properties_rejected() {
        let g = GasProperties {
            molecular_weight_gas: 0.0,
            ..Default::default()
        };
        assert!(g.validate().is_err());
        let g = GasProperties::new(70.91, k(-5.0));
        assert!(g.validate().is_err());
    }
}
