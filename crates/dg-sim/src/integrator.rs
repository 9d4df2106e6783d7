//! Explicit Runge-Kutta step functions.

use crate::error::SimResult;
use crate::model::SpatialModel;

/// Result of a single trial step.
#[derive(Clone, Debug)]
pub struct StepOutcome<S> {
    /// Proposed state at x + h
    pub y: S,
    /// Local error estimate, if the method carries an embedded pair
    pub error: Option<S>,
    /// Number of rhs evaluations spent
    pub rhs_evals: usize,
}

/// Trait for single-step integrators.
pub trait Integrator {
    /// Order of the error estimator (used for step-size control).
    fn error_order(&self) -> u32;

    /// Advance `y` from `x` by `h`.
    fn step<M: SpatialModel>(
        &self,
        model: &M,
        x: f64,
        y: &M::State,
        h: f64,
    ) -> SimResult<StepOutcome<M::State>>;
}

/// y + h * Σ c_i k_i, skipping zero coefficients.
fn combine<M: SpatialModel>(
    model: &M,
    y: &M::State,
    h: f64,
    terms: &[(f64, &M::State)],
) -> M::State {
    let mut acc = y.clone();
    for (c, k) in terms {
        if *c != 0.0 {
            acc = model.add(&acc, &model.scale(k, h * c));
        }
    }
    acc
}

/// Classical RK4 (Runge-Kutta 4th order) integrator.
#[derive(Clone, Debug)]
pub struct RK4;

impl Integrator for RK4 {
    fn error_order(&self) -> u32 {
        4
    }

    fn step<M: SpatialModel>(
        &self,
        model: &M,
        x: f64,
        y: &M::State,
        h: f64,
    ) -> SimResult<StepOutcome<M::State>> {
        let k1 = model.rhs(x, y)?;

        let y2 = model.add(y, &model.scale(&k1, 0.5 * h));
        let k2 = model.rhs(x + 0.5 * h, &y2)?;

        let y3 = model.add(y, &model.scale(&k2, 0.5 * h));
        let k3 = model.rhs(x + 0.5 * h, &y3)?;

        let y4 = model.add(y, &model.scale(&k3, h));
        let k4 = model.rhs(x + h, &y4)?;

        // Combine: y_new = y + (h/6) * (k1 + 2*k2 + 2*k3 + k4)
        let k_sum = model.add(
            &model.add(&k1, &model.scale(&k2, 2.0)),
            &model.add(&model.scale(&k3, 2.0), &k4),
        );

        Ok(StepOutcome {
            y: model.add(y, &model.scale(&k_sum, h / 6.0)),
            error: None,
            rhs_evals: 4,
        })
    }
}

/// Dormand-Prince 5(4) embedded pair.
///
/// Propagates the 5th-order solution and estimates the local error from
/// the difference to the embedded 4th-order solution.
#[derive(Clone, Debug, Default)]
pub struct DormandPrince45;

const C2: f64 = 1.0 / 5.0;
const C3: f64 = 3.0 / 10.0;
const C4: f64 = 4.0 / 5.0;
const C5: f64 = 8.0 / 9.0;

const A21: f64 = 1.0 / 5.0;
const A31: f64 = 3.0 / 40.0;
const A32: f64 = 9.0 / 40.0;
const A41: f64 = 44.0 / 45.0;
const A42: f64 = -56.0 / 15.0;
const A43: f64 = 32.0 / 9.0;
const A51: f64 = 19372.0 / 6561.0;
const A52: f64 = -25360.0 / 2187.0;
const A53: f64 = 64448.0 / 6561.0;
const A54: f64 = -212.0 / 729.0;
const A61: f64 = 9017.0 / 3168.0;
const A62: f64 = -355.0 / 33.0;
const A63: f64 = 46732.0 / 5247.0;
const A64: f64 = 49.0 / 176.0;
const A65: f64 = -5103.0 / 18656.0;

// 5th-order weights (also row 7 of the tableau)
const B1: f64 = 35.0 / 384.0;
const B3: f64 = 500.0 / 1113.0;
const B4: f64 = 125.0 / 192.0;
const B5: f64 = -2187.0 / 6784.0;
const B6: f64 = 11.0 / 84.0;

// b - b*, difference between 5th- and 4th-order weights
const E1: f64 = 71.0 / 57600.0;
const E3: f64 = -71.0 / 16695.0;
const E4: f64 = 71.0 / 1920.0;
const E5: f64 = -17253.0 / 339200.0;
const E6: f64 = 22.0 / 525.0;
const E7: f64 = -1.0 / 40.0;

impl Integrator for DormandPrince45 {
    fn error_order(&self) -> u32 {
        4
    }

    fn step<M: SpatialModel>(
        &self,
        model: &M,
        x: f64,
        y: &M::State,
        h: f64,
    ) -> SimResult<StepOutcome<M::State>> {
        let k1 = model.rhs(x, y)?;
        let k2 = model.rhs(x + C2 * h, &combine(model, y, h, &[(A21, &k1)]))?;
        let k3 = model.rhs(
            x + C3 * h,
            &combine(model, y, h, &[(A31, &k1), (A32, &k2)]),
        )?;
        let k4 = model.rhs(
            x + C4 * h,
            &combine(model, y, h, &[(A41, &k1), (A42, &k2), (A43, &k3)]),
        )?;
        let k5 = model.rhs(
            x + C5 * h,
            &combine(model, y, h, &[(A51, &k1), (A52, &k2), (A53, &k3), (A54, &k4)]),
        )?;
        let k6 = model.rhs(
            x + h,
            &combine(
                model,
                y,
                h,
                &[(A61, &k1), (A62, &k2), (A63, &k3), (A64, &k4), (A65, &k5)],
            ),
        )?;

        let y_new = combine(
            model,
            y,
            h,
            &[(B1, &k1), (B3, &k3), (B4, &k4), (B5, &k5), (B6, &k6)],
        );
        let k7 = model.rhs(x + h, &y_new)?;

        let zero = model.scale(y, 0.0);
        let error = combine(
            model,
            &zero,
            h,
            &[
                (E1, &k1),
                (E3, &k3),
                (E4, &k4),
                (E5, &k5),
                (E6, &k6),
                (E7, &k7),
            ],
        );

        Ok(StepOutcome {
            y: y_new,
            error: Some(error),
            rhs_evals: 7,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SimResult;
    use nalgebra::DVector;

    /// dy/dx = y
    struct Growth;

    impl SpatialModel for Growth {
        type State = f64;

        fn initial_position(&self) -> f64 {
            0.0
        }
        fn initial_state(&self) -> f64 {
            1.0
        }
        fn rhs(&self, _x: f64, y: &f64) -> SimResult<f64> {
            Ok(*y)
        }
        fn add(&self, a: &f64, b: &f64) -> f64 {
            a + b
        }
        fn scale(&self, a: &f64, s: f64) -> f64 {
            a * s
        }
        fn to_vector(&self, y: &f64) -> DVector<f64> {
            DVector::from_element(1, *y)
        }
    }

    #[test]
    fn rk4_single_step_accuracy() {
        let out = RK4.step(&Growth, 0.0, &1.0, 0.1).unwrap();
        assert!((out.y - 0.1_f64.exp()).abs() < 1e-6);
        assert!(out.error.is_none());
        assert_eq!(out.rhs_evals, 4);
    }

    #[test]
    fn dopri_single_step_accuracy_and_error_estimate() {
        let out = DormandPrince45.step(&Growth, 0.0, &1.0, 0.1).unwrap();
        assert!((out.y - 0.1_f64.exp()).abs() < 1e-8);
        let err = out.error.unwrap();
        assert!(err.abs() < 1e-6);
        assert_eq!(out.rhs_evals, 7);
    }

    #[test]
    fn dopri_weights_are_consistent() {
        // Row sums of the tableau equal the nodes; weights sum to one.
        assert!((A21 - C2).abs() < 1e-15);
        assert!((A31 + A32 - C3).abs() < 1e-15);
        assert!((A41 + A42 + A43 - C4).abs() < 1e-14);
        assert!((A51 + A52 + A53 + A54 - C5).abs() < 1e-13);
        assert!((A61 + A62 + A63 + A64 + A65 - 1.0).abs() < 1e-13);
        assert!((B1 + B3 + B4 + B5 + B6 - 1.0).abs() < 1e-14);
        assert!((E1 + E3 + E4 + E5 + E6 + E7).abs() < 1e-15);
    }
}
