//! Atmospheric parameterization errors.

use dg_core::DgError;
use thiserror::Error;

/// Result type for atmospheric helpers.
pub type AtmosResult<T> = Result<T, AtmosError>;

/// Errors raised when an input violates a physical precondition.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AtmosError {
    /// Physical precondition violated (non-positive temperature, log-law ordering, ...).
    #[error("Domain error: {what}")]
    Domain { what: String },

    /// Unrecognized stability class symbol.
    #[error("Unknown stability class '{symbol}' (expected one of A-F)")]
    UnknownStabilityClass { symbol: String },
}

impl From<DgError> for AtmosError {
    fn from(e: DgError) -> Self {
        AtmosError::Domain {
            what: e.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = AtmosError::UnknownStabilityClass { symbol: "G".into() };
        assert!(err.to_string().contains("'G'"));

        let err: AtmosError = DgError::InvalidArg { what: "roughness" }.into();
        assert!(err.to_string().contains("roughness"));
    }
}
