//! Spatial-march ODE framework for densegas.
//!
//! Provides:
//! - `SpatialModel` trait: the right-hand side of dy/dx = f(x, y)
//! - Fixed-step RK4 integrator
//! - Adaptive Dormand-Prince 5(4) integrator with embedded error estimate
//! - `run_sim` driver with step-count and wall-clock budgets

pub mod error;
pub mod integrator;
pub mod model;
pub mod sim;

// Re-exports for public API
pub use error::{SimError, SimResult};
pub use integrator::{DormandPrince45, Integrator, RK4, StepOutcome};
pub use model::SpatialModel;
pub use sim::{IntegrationOptions, IntegratorType, SimRecord, SimStats, run_sim};
