//! Integration driver and result recording.

use crate::error::{SimError, SimResult};
use crate::integrator::{DormandPrince45, Integrator, RK4};
use crate::model::SpatialModel;
use nalgebra::DVector;
use std::time::{Duration, Instant};

/// Integrator selection for a run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum IntegratorType {
    /// Adaptive Dormand-Prince 5(4) (default).
    #[default]
    DormandPrince45,
    /// Classical RK4 at a fixed step of `max_step`.
    RK4,
}

/// Options for integration runs.
#[derive(Clone, Debug)]
pub struct IntegrationOptions {
    /// End of the integration domain
    pub x_end: f64,
    /// Largest step the driver may take
    pub max_step: f64,
    /// Relative tolerance for the adaptive error norm
    pub rtol: f64,
    /// Absolute tolerance for the adaptive error norm
    pub atol: f64,
    /// Maximum number of step attempts (safety limit)
    pub max_steps: usize,
    /// Optional wall-clock budget
    pub max_wall_time: Option<Duration>,
    /// Record every N-th accepted step (decimation)
    pub record_every: usize,
    /// Integrator type (default: DormandPrince45)
    pub integrator: IntegratorType,
}

impl Default for IntegrationOptions {
    fn default() -> Self {
        Self {
            x_end: 12_000.0,
            max_step: 10.0,
            rtol: 1e-3,
            atol: 1e-6,
            max_steps: 200_000,
            max_wall_time: None,
            record_every: 1,
            integrator: IntegratorType::default(),
        }
    }
}

impl IntegrationOptions {
    fn validate(&self) -> SimResult<()> {
        if !(self.max_step.is_finite() && self.max_step > 0.0) {
            return Err(SimError::InvalidArg {
                what: "max_step must be positive",
            });
        }
        if !(self.rtol.is_finite() && self.rtol > 0.0) {
            return Err(SimError::InvalidArg {
                what: "rtol must be positive",
            });
        }
        if !(self.atol.is_finite() && self.atol > 0.0) {
            return Err(SimError::InvalidArg {
                what: "atol must be positive",
            });
        }
        if self.max_steps == 0 {
            return Err(SimError::InvalidArg {
                what: "max_steps must be positive",
            });
        }
        if self.record_every == 0 {
            return Err(SimError::InvalidArg {
                what: "record_every must be positive",
            });
        }
        Ok(())
    }
}

/// Step accounting for a completed run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SimStats {
    pub accepted: usize,
    pub rejected: usize,
    pub rhs_evals: usize,
}

/// Record of integration results.
#[derive(Clone, Debug)]
pub struct SimRecord<S> {
    /// Positions, strictly increasing
    pub x: Vec<f64>,
    /// State snapshots
    pub y: Vec<S>,
    pub stats: SimStats,
}

// Step-size controller constants
const SAFETY: f64 = 0.9;
const MIN_FACTOR: f64 = 0.2;
const MAX_FACTOR: f64 = 10.0;

/// Run one integration from the model's initial position to `opts.x_end`.
///
/// Either the whole domain is covered or an error is returned; partial
/// records are never handed back.
pub fn run_sim<M: SpatialModel>(
    model: &M,
    opts: &IntegrationOptions,
) -> SimResult<SimRecord<M::State>> {
    opts.validate()?;
    let x0 = model.initial_position();
    if !x0.is_finite() {
        return Err(SimError::NonFinite {
            what: "initial position",
            x: x0,
        });
    }
    if !(opts.x_end.is_finite() && opts.x_end > x0) {
        return Err(SimError::InvalidArg {
            what: "x_end must lie beyond the initial position",
        });
    }

    let record = match opts.integrator {
        IntegratorType::DormandPrince45 => run_adaptive(model, &DormandPrince45, opts)?,
        IntegratorType::RK4 => run_fixed(model, &RK4, opts)?,
    };

    tracing::debug!(
        accepted = record.stats.accepted,
        rejected = record.stats.rejected,
        rhs_evals = record.stats.rhs_evals,
        samples = record.x.len(),
        "integration complete"
    );
    Ok(record)
}

struct Budget {
    started: Instant,
    max_wall_time: Option<Duration>,
    max_steps: usize,
}

impl Budget {
    fn check(&self, attempts: usize, x: f64) -> SimResult<()> {
        if attempts >= self.max_steps {
            return Err(SimError::StepBudget {
                steps: self.max_steps,
                x,
            });
        }
        if let Some(limit) = self.max_wall_time {
            if self.started.elapsed() > limit {
                return Err(SimError::WallTime {
                    limit_s: limit.as_secs_f64(),
                    x,
                });
            }
        }
        Ok(())
    }
}

fn check_state<M: SpatialModel>(model: &M, y: &M::State, x: f64) -> SimResult<()> {
    if model.to_vector(y).iter().all(|v| v.is_finite()) {
        Ok(())
    } else {
        Err(SimError::NonFinite { what: "state", x })
    }
}

fn run_fixed<M: SpatialModel, I: Integrator>(
    model: &M,
    integrator: &I,
    opts: &IntegrationOptions,
) -> SimResult<SimRecord<M::State>> {
    let budget = Budget {
        started: Instant::now(),
        max_wall_time: opts.max_wall_time,
        max_steps: opts.max_steps,
    };
    let mut x = model.initial_position();
    let mut y = model.initial_state();
    check_state(model, &y, x)?;

    let mut x_record = vec![x];
    let mut y_record = vec![y.clone()];
    let mut stats = SimStats::default();

    while x < opts.x_end {
        budget.check(stats.accepted, x)?;
        let h = opts.max_step.min(opts.x_end - x);
        let out = integrator.step(model, x, &y, h)?;
        stats.rhs_evals += out.rhs_evals;
        check_state(model, &out.y, x + h)?;

        x = if opts.x_end - x <= opts.max_step {
            opts.x_end
        } else {
            x + h
        };
        y = model.project(out.y);
        stats.accepted += 1;

        if stats.accepted % opts.record_every == 0 || x >= opts.x_end {
            x_record.push(x);
            y_record.push(y.clone());
        }
    }

    Ok(SimRecord {
        x: x_record,
        y: y_record,
        stats,
    })
}

/// Weighted RMS norm used by the step controller.
fn rms_norm(v: &DVector<f64>, scale: &DVector<f64>) -> f64 {
    if v.is_empty() {
        return 0.0;
    }
    let sum: f64 = v
        .iter()
        .zip(scale.iter())
        .map(|(a, s)| (a / s).powi(2))
        .sum();
    (sum / v.len() as f64).sqrt()
}

fn tolerance_scale(
    y: &DVector<f64>,
    other: Option<&DVector<f64>>,
    opts: &IntegrationOptions,
) -> DVector<f64> {
    match other {
        Some(o) => y.zip_map(o, |a, b| opts.atol + opts.rtol * a.abs().max(b.abs())),
        None => y.map(|a| opts.atol + opts.rtol * a.abs()),
    }
}

/// Initial step estimate from the local derivative scale.
fn initial_step<M: SpatialModel>(
    model: &M,
    x0: f64,
    y0: &M::State,
    f0: &M::State,
    order: u32,
    opts: &IntegrationOptions,
) -> SimResult<f64> {
    let y0v = model.to_vector(y0);
    let f0v = model.to_vector(f0);
    let scale = tolerance_scale(&y0v, None, opts);
    let d0 = rms_norm(&y0v, &scale);
    let d1 = rms_norm(&f0v, &scale);
    let h0 = if d0 < 1e-5 || d1 < 1e-5 {
        1e-6
    } else {
        0.01 * d0 / d1
    };
    let span = opts.x_end - x0;
    let h0 = h0.min(span).min(opts.max_step);

    let y1 = model.add(y0, &model.scale(f0, h0));
    let f1 = model.rhs(x0 + h0, &y1)?;
    let d2 = rms_norm(&(model.to_vector(&f1) - &f0v), &scale) / h0;

    let h1 = if d1 <= 1e-15 && d2 <= 1e-15 {
        (h0 * 1e-3).max(1e-6)
    } else {
        (0.01 / d1.max(d2)).powf(1.0 / (order as f64 + 1.0))
    };
    let h = (100.0 * h0).min(h1).min(opts.max_step).min(span);
    if h.is_finite() && h > 0.0 {
        Ok(h)
    } else {
        Err(SimError::NonFinite {
            what: "initial step",
            x: x0,
        })
    }
}

fn run_adaptive<M: SpatialModel, I: Integrator>(
    model: &M,
    integrator: &I,
    opts: &IntegrationOptions,
) -> SimResult<SimRecord<M::State>> {
    let budget = Budget {
        started: Instant::now(),
        max_wall_time: opts.max_wall_time,
        max_steps: opts.max_steps,
    };
    let exponent = -1.0 / (integrator.error_order() as f64 + 1.0);

    let mut x = model.initial_position();
    let mut y = model.initial_state();
    check_state(model, &y, x)?;

    let f0 = model.rhs(x, &y)?;
    check_state(model, &f0, x)?;
    let mut stats = SimStats {
        rhs_evals: 2,
        ..SimStats::default()
    };
    let mut h = initial_step(model, x, &y, &f0, integrator.error_order(), opts)?;

    let mut x_record = vec![x];
    let mut y_record = vec![y.clone()];

    while x < opts.x_end {
        let min_step = 10.0 * f64::EPSILON * x.abs().max(1.0);
        let mut rejected_this_step = false;

        loop {
            budget.check(stats.accepted + stats.rejected, x)?;
            h = h.min(opts.max_step);
            if h < min_step {
                return Err(SimError::ConvergenceFailed {
                    what: format!("step size {h:.3e} fell below minimum {min_step:.3e}"),
                    x,
                });
            }
            let last = x + h >= opts.x_end;
            let h_try = if last { opts.x_end - x } else { h };

            let out = integrator.step(model, x, &y, h_try)?;
            stats.rhs_evals += out.rhs_evals;

            let yv = model.to_vector(&y);
            let y_new_v = model.to_vector(&out.y);
            let err_norm = match &out.error {
                Some(e) => {
                    let scale = tolerance_scale(&yv, Some(&y_new_v), opts);
                    rms_norm(&model.to_vector(e), &scale)
                }
                None => 0.0,
            };

            if !err_norm.is_finite() || !y_new_v.iter().all(|v| v.is_finite()) {
                h *= MIN_FACTOR;
                stats.rejected += 1;
                rejected_this_step = true;
                continue;
            }

            if err_norm < 1.0 {
                let mut factor = if err_norm == 0.0 {
                    MAX_FACTOR
                } else {
                    (SAFETY * err_norm.powf(exponent)).min(MAX_FACTOR)
                };
                if rejected_this_step {
                    factor = factor.min(1.0);
                }
                x = if last { opts.x_end } else { x + h_try };
                y = model.project(out.y);
                stats.accepted += 1;
                h *= factor;
                break;
            }

            h *= (SAFETY * err_norm.powf(exponent)).max(MIN_FACTOR);
            stats.rejected += 1;
            rejected_this_step = true;
        }

        if stats.accepted % opts.record_every == 0 || x >= opts.x_end {
            x_record.push(x);
            y_record.push(y.clone());
        }
    }

    Ok(SimRecord {
        x: x_record,
        y: y_record,
        stats,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn options_defaults() {
        let opts = IntegrationOptions::default();
        assert_eq!(opts.x_end, 12_000.0);
        assert_eq!(opts.max_step, 10.0);
        assert_eq!(opts.rtol, 1e-3);
        assert_eq!(opts.atol, 1e-6);
        assert_eq!(opts.record_every, 1);
        assert_eq!(opts.integrator, IntegratorType::DormandPrince45);
    }

    #[test]
    fn options_invalid() {
        let opts = IntegrationOptions {
            max_step: 0.0,
            ..Default::default()
        };
        assert!(opts.validate().is_err());

        let opts = IntegrationOptions {
            max_steps: 0,
            ..Default::default()
        };
        assert!(opts.validate().is_err());
    }

    #[test]
    fn rms_norm_weighted() {
        let v = DVector::from_vec(vec![1.0, 1.0]);
        let s = DVector::from_vec(vec![1.0, 0.5]);
        let n = rms_norm(&v, &s);
        assert!((n - (5.0_f64 / 2.0).sqrt()).abs() < 1e-12);
    }
}
