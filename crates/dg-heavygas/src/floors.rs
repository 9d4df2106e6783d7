//! Lower bounds keeping cloud geometry away from zero.

/// Floors applied to the secondary source and to the ODE state.
///
/// Every quantity here appears in a denominator somewhere downstream.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ModelFloors {
    /// Minimum secondary-source and vertical scale height (m)
    pub height: f64,
    /// Minimum cloud half-width (m)
    pub half_width: f64,
    /// Minimum secondary-source radius (m)
    pub radius: f64,
    /// Minimum cumulative mass flux (kg/s)
    pub flux: f64,
    /// Minimum cloud temperature (K)
    pub temperature: f64,
    /// Entrainment flux below which the source area is not derived from it (kg/(m²·s))
    pub entrainment: f64,
    /// Radius used when the entrainment flux is negligible (m)
    pub fallback_radius: f64,
}

impl Default for ModelFloors {
    fn default() -> Self {
        Self {
            height: 0.1,
            half_width: 0.1,
            radius: 0.1,
            flux: 1e-6,
            temperature: 1.0,
            entrainment: 1e-6,
            fallback_radius: 50.0,
        }
    }
}

impl ModelFloors {
    pub fn validate(&self) -> crate::HeavyGasResult<()> {
        let fields = [
            ("height floor", self.height),
            ("half-width floor", self.half_width),
            ("radius floor", self.radius),
            ("flux floor", self.flux),
            ("temperature floor", self.temperature),
            ("entrainment floor", self.entrainment),
            ("fallback radius", self.fallback_radius),
        ];
        for (name, v) in fields {
            if !(v.is_finite() && v > 0.0) {
                return Err(crate::HeavyGasError::domain(format!(
                    "{name} must be positive (got {v})"
                )));
            }
        }
        Ok(())
    }
}
