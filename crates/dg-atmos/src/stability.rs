//! Pasquill-Gifford stability classes.

use crate::error::AtmosError;
use core::fmt;
use core::str::FromStr;

/// Empirical coefficients for one stability class.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StabilityClassParams {
    /// Wind-shear (power-law) exponent, 0 < n < 1
    pub n: f64,
    /// Lateral spread coefficients
    pub sy1: f64,
    pub sy2: f64,
    /// Vertical spread coefficients
    pub sz1: f64,
    pub sz2: f64,
    pub sz3: f64,
}

impl StabilityClassParams {
    /// Passive crosswind spread σ_y (m) at downwind distance `x` (m).
    pub fn sigma_y_passive(&self, x: f64) -> f64 {
        self.sy1 * x / (1.0 + self.sy2 * x).sqrt()
    }

    /// dσ_y/dx of [`Self::sigma_y_passive`].
    pub fn d_sigma_y_passive_dx(&self, x: f64) -> f64 {
        let denom = (1.0 + self.sy2 * x).sqrt();
        self.sy1 / denom - (self.sy1 * x * self.sy2) / (2.0 * denom.powi(3))
    }
}

/// Atmospheric stability category, A (very unstable) through F (stable).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StabilityClass {
    A,
    B,
    C,
    D,
    E,
    F,
}

const PARAMS_A: StabilityClassParams = StabilityClassParams {
    n: 0.108,
    sy1: 0.22,
    sy2: 0.0001,
    sz1: 0.20,
    sz2: 0.0,
    sz3: 0.0,
};
const PARAMS_B: StabilityClassParams = StabilityClassParams {
    n: 0.112,
    sy1: 0.16,
    sy2: 0.0001,
    sz1: 0.12,
    sz2: 0.0,
    sz3: 0.0,
};
const PARAMS_C: StabilityClassParams = StabilityClassParams {
    n: 0.120,
    sy1: 0.11,
    sy2: 0.0001,
    sz1: 0.08,
    sz2: 0.0002,
    sz3: -0.5,
};
const PARAMS_D: StabilityClassParams = StabilityClassParams {
    n: 0.142,
    sy1: 0.08,
    sy2: 0.0001,
    sz1: 0.06,
    sz2: 0.0015,
    sz3: -0.5,
};
const PARAMS_E: StabilityClassParams = StabilityClassParams {
    n: 0.203,
    sy1: 0.06,
    sy2: 0.0001,
    sz1: 0.03,
    sz2: 0.0003,
    sz3: -1.0,
};
const PARAMS_F: StabilityClassParams = StabilityClassParams {
    n: 0.253,
    sy1: 0.04,
    sy2: 0.0001,
    sz1: 0.016,
    sz2: 0.0003,
    sz3: -1.0,
};

impl StabilityClass {
    pub const ALL: [StabilityClass; 6] = [
        StabilityClass::A,
        StabilityClass::B,
        StabilityClass::C,
        StabilityClass::D,
        StabilityClass::E,
        StabilityClass::F,
    ];

    /// Coefficient record for this class.
    pub const fn params(self) -> &'static StabilityClassParams {
        match self {
            StabilityClass::A => &PARAMS_A,
            StabilityClass::B => &PARAMS_B,
            StabilityClass::C => &PARAMS_C,
            StabilityClass::D => &PARAMS_D,
            StabilityClass::E => &PARAMS_E,
            StabilityClass::F => &PARAMS_F,
        }
    }

    pub const fn symbol(self) -> char {
        match self {
            StabilityClass::A => 'A',
            StabilityClass::B => 'B',
            StabilityClass::C => 'C',
            StabilityClass::D => 'D',
            StabilityClass::E => 'E',
            StabilityClass::F => 'F',
        }
    }
}

impl fmt::Display for StabilityClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

impl FromStr for StabilityClass {
    type Err = AtmosError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "A" => Ok(StabilityClass::A),
            "B" => Ok(StabilityClass::B),
            "C" => Ok(StabilityClass::C),
            "D" => Ok(StabilityClass::D),
            "E" => Ok(StabilityClass::E),
            "F" => Ok(StabilityClass::F),
            _ => Err(AtmosError::UnknownStabilityClass {
                symbol: s.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn six_classes_with_valid_exponents() {
        assert_eq!(StabilityClass::ALL.len(), 6);
        for class in StabilityClass::ALL {
            let p = class.params();
            assert!(p.n > 0.0 && p.n < 1.0, "class {class}");
        }
    }

    #[test]
    fn shear_exponent_increases_with_stability() {
        let ns: Vec<f64> = StabilityClass::ALL.iter().map(|c| c.params().n).collect();
        assert!(ns.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!("d".parse::<StabilityClass>().unwrap(), StabilityClass::D);
        assert_eq!(" F ".parse::<StabilityClass>().unwrap(), StabilityClass::F);
        for class in StabilityClass::ALL {
            assert_eq!(class.to_string().parse::<StabilityClass>().unwrap(), class);
        }
    }

    #[test]
    fn parse_rejects_unknown() {
        let err = "G".parse::<StabilityClass>().unwrap_err();
        assert!(matches!(err, AtmosError::UnknownStabilityClass { .. }));
        assert!("".parse::<StabilityClass>().is_err());
        assert!("DD".parse::<StabilityClass>().is_err());
    }

    #[test]
    fn passive_spread_derivative_matches_finite_difference() {
        let p = StabilityClass::D.params();
        for x in [1.0, 100.0, 2_500.0, 12_000.0] {
            let h = 1e-3;
            let fd = (p.sigma_y_passive(x + h) - p.sigma_y_passive(x - h)) / (2.0 * h);
            assert_relative_eq!(p.d_sigma_y_passive_dx(x), fd, max_relative = 1e-6);
        }
    }

    #[test]
    fn passive_spread_is_increasing() {
        for class in StabilityClass::ALL {
            let p = class.params();
            for x in [0.0, 10.0, 1_000.0, 12_000.0, 50_000.0] {
                assert!(p.d_sigma_y_passive_dx(x) > 0.0);
            }
        }
    }
}
