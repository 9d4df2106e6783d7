//! SpatialModel trait for pluggable downwind-marching systems.

use crate::error::SimResult;
use nalgebra::DVector;

/// Trait for models integrated along a spatial coordinate.
///
/// A SpatialModel must implement:
/// - State type (Clone, for snapshots)
/// - Starting position and initial state
/// - RHS computation: dy/dx = f(x, y), pure in `&self`
/// - Vector-space arithmetic on states: add, scale
/// - A flat view of the state for error norms
pub trait SpatialModel {
    /// State type (must be Clone).
    type State: Clone;

    /// Position at which integration starts.
    fn initial_position(&self) -> f64;

    /// State at [`Self::initial_position`].
    fn initial_state(&self) -> Self::State;

    /// Compute dy/dx at `x`.
    fn rhs(&self, x: f64, y: &Self::State) -> SimResult<Self::State>;

    /// Add two states element-wise: result = a + b.
    fn add(&self, a: &Self::State, b: &Self::State) -> Self::State;

    /// Scale a state by a scalar: result = scale * a.
    fn scale(&self, a: &Self::State, scale: f64) -> Self::State;

    /// Flatten a state into its components.
    fn to_vector(&self, y: &Self::State) -> DVector<f64>;

    /// Map an accepted state back onto the admissible set.
    ///
    /// Called once per accepted step. The default is the identity.
    fn project(&self, y: Self::State) -> Self::State {
        y
    }
}
