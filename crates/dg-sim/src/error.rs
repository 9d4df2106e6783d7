//! Error types for spatial integration.

use thiserror::Error;

/// Errors encountered while marching a model downwind.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SimError {
    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    #[error("Non-finite {what} at x = {x}")]
    NonFinite { what: &'static str, x: f64 },

    #[error("Convergence failed at x = {x}: {what}")]
    ConvergenceFailed { what: String, x: f64 },

    #[error("Step budget of {steps} steps exhausted at x = {x}")]
    StepBudget { steps: usize, x: f64 },

    #[error("Wall-clock budget of {limit_s:.3}s exceeded at x = {x}")]
    WallTime { limit_s: f64, x: f64 },

    #[error("Model error: {message}")]
    Model { message: String },
}

pub type SimResult<T> = Result<T, SimError>;

impl From<dg_core::DgError> for SimError {
    fn from(e: dg_core::DgError) -> Self {
        SimError::Model {
            message: e.to_string(),
        }
    }
}
