//! dg-heavygas: steady-state heavy-gas plume model.
//!
//! A release is first reduced to a secondary source (initial cloud
//! radius and height), then four coupled quantities are marched
//! downwind:
//! - vertical dispersion scale `sz`
//! - effective half-width `beff`
//! - cloud temperature `tc`
//! - cumulative mass flux `flux`
//!
//! The trajectory is converted to a centerline concentration profile
//! (ppm) and compared against named hazard thresholds.
//!
//! # Example
//!
//! ```no_run
//! use dg_atmos::{MeteorologicalInputs, StabilityClass};
//! use dg_core::{k, kgps, m, mps};
//! use dg_heavygas::{HazardLimits, HeavyGasInput, SourceConfig, assess};
//!
//! let met = MeteorologicalInputs::new(mps(5.0), m(3.0), m(0.03), k(298.15)).unwrap();
//! let input = HeavyGasInput::new(StabilityClass::D, kgps(2.0), SourceConfig::Continuous, met);
//! let limits = HazardLimits::aegl(Some(0.5), Some(2.0), Some(20.0)).unwrap();
//!
//! let out = assess(&input, &limits).unwrap();
//! for (name, zone) in out.zones.iter() {
//!     println!("{name}: {:.0} m", zone.distance_m);
//! }
//! ```

pub mod concentration;
pub mod engine;
pub mod error;
pub mod floors;
pub mod gas;
pub mod hazard;
pub mod plume;
pub mod source;

pub use concentration::{ConcentrationProfile, FootprintGrid, ProfileSample, gaussian_falloff};
pub use engine::{
    Assessment, HeavyGasInput, HeavyGasRun, Trajectory, TrajectorySample, assess, assess_batch,
    run, run_batch,
};
pub use error::{HeavyGasError, HeavyGasResult};
pub use floors::ModelFloors;
pub use gas::{GasProperties, mass_fraction};
pub use hazard::{
    HazardLimits, HazardZone, HazardZoneResult, extract_hazard_zones, merge_zones, parse_ppm,
    parse_threshold,
};
pub use plume::{CloudProperties, DispersionState, PlumeContext, PlumeModel, derivatives};
pub use source::{SecondarySource, SourceConfig, SourceKind, solve_secondary_source};
