//! dg-atmos: atmospheric boundary-layer parameterization for densegas.
//!
//! Provides:
//! - Pasquill-Gifford stability classes and their empirical coefficients
//! - Thermodynamic helpers (ideal-gas density, friction velocity,
//!   entrainment suppression, vertical velocity variance)
//! - Validated meteorological inputs
//!
//! # Example
//!
//! ```
//! use dg_atmos::{MeteorologicalInputs, StabilityClass};
//! use dg_core::{PhysicalConstants, k, m, mps};
//!
//! let met = MeteorologicalInputs::new(mps(5.0), m(3.0), m(0.03), k(298.15)).unwrap();
//! let consts = PhysicalConstants::default();
//! let u_star = met.friction_velocity(&consts).unwrap();
//! assert!(u_star > 0.0);
//!
//! let d: StabilityClass = "D".parse().unwrap();
//! assert_eq!(d.params().n, 0.142);
//! ```

pub mod error;
pub mod meteo;
pub mod stability;
pub mod thermo;

pub use error::{AtmosError, AtmosResult};
pub use meteo::MeteorologicalInputs;
pub use stability::{StabilityClass, StabilityClassParams};
pub use thermo::{
    density, entrainment_suppression, friction_velocity, reduced_gravity,
    vertical_velocity_variance, wind_at_height,
};
