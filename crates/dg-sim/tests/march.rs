//! Integration tests: adaptive and fixed-step marching on analytic problems.

use approx::assert_relative_eq;
use dg_sim::{IntegrationOptions, IntegratorType, SimError, SimResult, SpatialModel, run_sim};
use nalgebra::DVector;
use std::time::Duration;

/// dy/dx = -y / L, y(x0) = 1.
struct Decay {
    x0: f64,
    length: f64,
}

impl SpatialModel for Decay {
    type State = f64;

    fn initial_position(&self) -> f64 {
        self.x0
    }
    fn initial_state(&self) -> f64 {
        1.0
    }
    fn rhs(&self, _x: f64, y: &f64) -> SimResult<f64> {
        Ok(-y / self.length)
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

/// Harmonic oscillator in space: y'' = -y.
struct Oscillator;

impl SpatialModel for Oscillator {
    type State = [f64; 2];

    fn initial_position(&self) -> f64 {
        0.0
    }
    fn initial_state(&self) -> [f64; 2] {
        [1.0, 0.0]
    }
    fn rhs(&self, _x: f64, y: &[f64; 2]) -> SimResult<[f64; 2]> {
        Ok([y[1], -y[0]])
    }
    fn add(&self, a: &[f64; 2], b: &[f64; 2]) -> [f64; 2] {
        [a[0] + b[0], a[1] + b[1]]
    }
    fn scale(&self, a: &[f64; 2], s: f64) -> [f64; 2] {
        [a[0] * s, a[1] * s]
    }
    fn to_vector(&self, y: &[f64; 2]) -> DVector<f64> {
        DVector::from_row_slice(y)
    }
}

/// Produces NaN derivatives past a breakpoint.
struct Poisoned;

impl SpatialModel for Poisoned {
    type State = f64;

    fn initial_position(&self) -> f64 {
        0.0
    }
    fn initial_state(&self) -> f64 {
        1.0
    }
    fn rhs(&self, x: f64, _y: &f64) -> SimResult<f64> {
        Ok(if x > 5.0 { f64::NAN } else { 1.0 })
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

/// Constant slope with a deliberately slow derivative.
struct Sluggish;

impl SpatialModel for Sluggish {
    type State = f64;

    fn initial_position(&self) -> f64 {
        0.0
    }
    fn initial_state(&self) -> f64 {
        0.0
    }
    fn rhs(&self, _x: f64, _y: &f64) -> SimResult<f64> {
        std::thread::sleep(Duration::from_millis(1));
        Ok(1.0)
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

/// Clamps the state to stay non-negative after every accepted step.
struct Floored;

impl SpatialModel for Floored {
    type State = f64;

    fn initial_position(&self) -> f64 {
        0.0
    }
    fn initial_state(&self) -> f64 {
        1.0
    }
    fn rhs(&self, _x: f64, _y: &f64) -> SimResult<f64> {
        Ok(-1.0)
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
    fn project(&self, y: f64) -> f64 {
        y.max(0.1)
    }
}

#[test]
fn adaptive_decay_matches_analytic_solution() {
    let model = Decay {
        x0: 2.0,
        length: 50.0,
    };
    let opts = IntegrationOptions {
        x_end: 500.0,
        ..Default::default()
    };
    let rec = run_sim(&model, &opts).unwrap();

    assert_eq!(rec.x[0], 2.0);
    assert_eq!(*rec.x.last().unwrap(), 500.0);
    assert_eq!(rec.x.len(), rec.y.len());
    for (x, y) in rec.x.iter().zip(&rec.y) {
        let exact = (-(x - 2.0) / 50.0).exp();
        assert_relative_eq!(*y, exact, max_relative = 1e-2, epsilon = 1e-5);
    }
}

#[test]
fn adaptive_respects_max_step_and_is_increasing() {
    let model = Decay {
        x0: 0.0,
        length: 1e6,
    };
    let opts = IntegrationOptions {
        x_end: 1_000.0,
        max_step: 10.0,
        ..Default::default()
    };
    let rec = run_sim(&model, &opts).unwrap();
    // A nearly flat solution would take huge steps without the cap.
    assert!(rec.x.len() >= 100);
    for w in rec.x.windows(2) {
        assert!(w[1] > w[0]);
        assert!(w[1] - w[0] <= 10.0 + 1e-9);
    }
}

#[test]
fn fixed_rk4_oscillator_after_one_period() {
    let opts = IntegrationOptions {
        x_end: 2.0 * std::f64::consts::PI,
        max_step: 0.01,
        integrator: IntegratorType::RK4,
        ..Default::default()
    };
    let rec = run_sim(&Oscillator, &opts).unwrap();
    let last = rec.y.last().unwrap();
    assert_relative_eq!(last[0], 1.0, epsilon = 1e-6);
    assert_relative_eq!(last[1], 0.0, epsilon = 1e-6);
    assert_eq!(*rec.x.last().unwrap(), opts.x_end);
}

#[test]
fn adaptive_oscillator_tight_tolerance() {
    let opts = IntegrationOptions {
        x_end: 10.0,
        max_step: 1.0,
        rtol: 1e-8,
        atol: 1e-10,
        ..Default::default()
    };
    let rec = run_sim(&Oscillator, &opts).unwrap();
    let last = rec.y.last().unwrap();
    assert_relative_eq!(last[0], 10.0_f64.cos(), epsilon = 1e-6);
    assert!(rec.stats.accepted > 0);
}

#[test]
fn non_finite_derivatives_surface_as_failure() {
    let opts = IntegrationOptions {
        x_end: 20.0,
        max_step: 1.0,
        ..Default::default()
    };
    let err = run_sim(&Poisoned, &opts).unwrap_err();
    assert!(matches!(
        err,
        SimError::ConvergenceFailed { .. } | SimError::StepBudget { .. }
    ));
}

#[test]
fn step_budget_is_enforced() {
    let model = Decay {
        x0: 0.0,
        length: 10.0,
    };
    let opts = IntegrationOptions {
        x_end: 1_000.0,
        max_step: 1.0,
        max_steps: 50,
        ..Default::default()
    };
    let err = run_sim(&model, &opts).unwrap_err();
    assert!(matches!(err, SimError::StepBudget { steps: 50, .. }));
}

#[test]
fn projection_applies_to_recorded_states() {
    let opts = IntegrationOptions {
        x_end: 5.0,
        max_step: 0.5,
        ..Default::default()
    };
    let rec = run_sim(&Floored, &opts).unwrap();
    assert!(rec.y.iter().all(|y| *y >= 0.1));
    assert_eq!(*rec.y.last().unwrap(), 0.1);
}

#[test]
fn end_before_start_is_rejected() {
    let model = Decay {
        x0: 100.0,
        length: 10.0,
    };
    let opts = IntegrationOptions {
        x_end: 50.0,
        ..Default::default()
    };
    assert!(matches!(
        run_sim(&model, &opts),
        Err(SimError::InvalidArg { .. })
    ));
}

#[test]
fn runs_are_deterministic() {
    let model = Decay {
        x0: 0.0,
        length: 25.0,
    };
    let opts = IntegrationOptions {
        x_end: 300.0,
        ..Default::default()
    };
    let a = run_sim(&model, &opts).unwrap();
    let b = run_sim(&model, &opts).unwrap();
    assert_eq!(a.x, b.x);
    assert_eq!(a.y, b.y);
    assert_eq!(a.stats, b.stats);
}

#[test]
fn wall_time_budget_stops_the_march() {
    let opts = IntegrationOptions {
        x_end: 10_000.0,
        max_step: 1.0,
        max_wall_time: Some(Duration::from_millis(5)),
        ..Default::default()
    };
    let err = run_sim(&Sluggish, &opts).unwrap_err();
    match err {
        SimError::WallTime { limit_s, x } => {
            assert_relative_eq!(limit_s, 0.005);
            assert!((0.0..10_000.0).contains(&x));
        }
        other => panic!("expected wall-time error, got {other:?}"),
    }
}

#[test]
fn generous_wall_time_does_not_interfere() {
    let model = Decay {
        x0: 0.0,
        length: 25.0,
    };
    let opts = IntegrationOptions {
        x_end: 300.0,
        max_wall_time: Some(Duration::from_secs(60)),
        ..Default::default()
    };
    let rec = run_sim(&model, &opts).unwrap();
    assert_eq!(*rec.x.last().unwrap(), 300.0);
}
