//! Error types for the heavy-gas engine.

use dg_atmos::AtmosError;
use dg_core::DgError;
use dg_sim::SimError;
use thiserror::Error;

/// Errors surfaced by a heavy-gas run.
///
/// A degenerate (negligible) entrainment flux is not an error; it is
/// handled by the documented fallback radius and flagged on
/// [`crate::SecondarySource`].
#[derive(Error, Debug, Clone, PartialEq)]
pub enum HeavyGasError {
    /// An input violates a physical precondition.
    #[error("Domain error: {what}")]
    Domain { what: String },

    /// The downwind integration could not cover the domain.
    #[error("Solver divergence: {what}")]
    SolverDivergence { what: String },
}

pub type HeavyGasResult<T> = Result<T, HeavyGasError>;

impl HeavyGasError {
    pub(crate) fn domain(what: impl Into<String>) -> Self {
        HeavyGasError::Domain { what: what.into() }
    }
}

impl From<AtmosError> for HeavyGasError {
    fn from(e: AtmosError) -> Self {
        HeavyGasError::Domain {
            what: match e {
                AtmosError::Domain { what } => what,
                other => other.to_string(),
            },
        }
    }
}

impl From<DgError> for HeavyGasError {
    fn from(e: DgError) -> Self {
        HeavyGasError::Domain {
            what: e.to_string(),
        }
    }
}

impl From<SimError> for HeavyGasError {
    fn from(e: SimError) -> Self {
        match e {
            SimError::InvalidArg { what } => HeavyGasError::Domain {
                what: format!("integration options: {what}"),
            },
            other => HeavyGasError::SolverDivergence {
                what: other.to_string(),
            },
        }
    }
}
