//! dg-core: stable foundation for densegas.
//!
//! Contains:
//! - units (uom SI types + constructors)
//! - numeric (Real + tolerances + float helpers + gamma function)
//! - constants (injectable physical constant set)
//! - error (shared error types)

pub mod constants;
pub mod error;
pub mod numeric;
pub mod units;

// Re-exports: nice ergonomics for downstream crates
pub use constants::PhysicalConstants;
pub use error::{DgError, DgResult};
pub use numeric::*;
pub use units::*;
