//! Centerline and crosswind concentration fields.

use crate::engine::Trajectory;
use crate::error::{HeavyGasError, HeavyGasResult};

/// Concentration at one trajectory sample.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProfileSample {
    /// Downwind distance (m)
    pub x: f64,
    /// Centerline concentration (ppm by volume)
    pub centerline_ppm: f64,
    /// Cloud half-width at this sample (m)
    pub half_width: f64,
}

/// Centerline concentration profile, one entry per trajectory sample.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ConcentrationProfile {
    samples: Vec<ProfileSample>,
}

/// Crosswind concentration grid: `ppm[j][i]` is at `(x[i], y[j])`.
#[derive(Clone, Debug, PartialEq)]
pub struct FootprintGrid {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub ppm: Vec<Vec<f64>>,
}

/// Gaussian crosswind falloff from the centerline value.
///
/// A zero half-width collapses the profile onto the centerline.
pub fn gaussian_falloff(centerline: f64, half_width: f64, y: f64) -> f64 {
    if half_width > 0.0 {
        centerline * (-0.5 * (y / half_width).powi(2)).exp()
    } else if y == 0.0 {
        centerline
    } else {
        0.0
    }
}

impl ConcentrationProfile {
    /// Build a profile from samples already ordered by increasing `x`.
    pub fn from_samples(samples: Vec<ProfileSample>) -> HeavyGasResult<Self> {
        if samples.windows(2).any(|w| w[1].x <= w[0].x) {
            return Err(HeavyGasError::domain(
                "concentration profile must be strictly increasing in x",
            ));
        }
        Ok(Self { samples })
    }

    /// Box-model centerline concentration at every trajectory sample.
    pub fn from_trajectory(trajectory: &Trajectory) -> HeavyGasResult<Self> {
        let ctx = trajectory.context();
        let q = ctx.release_rate;
        let mut samples = Vec::with_capacity(trajectory.len());
        for sample in trajectory.samples() {
            let s = ctx.clamp(&sample.state);
            let cloud = ctx
                .cloud_properties(&s)
                .map_err(|e| HeavyGasError::domain(e.to_string()))?;
            let conc = q / (2.0 * s.beff * cloud.effective_height * cloud.advection_velocity);
            let ppm = ctx.gas.to_ppm(conc, cloud.density);
            if !ppm.is_finite() {
                return Err(HeavyGasError::SolverDivergence {
                    what: format!("non-finite concentration at x = {}", sample.x),
                });
            }
            samples.push(ProfileSample {
                x: sample.x,
                centerline_ppm: ppm,
                half_width: s.beff,
            });
        }
        Ok(Self { samples })
    }

    pub fn samples(&self) -> &[ProfileSample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn x(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.x).collect()
    }

    pub fn centerline_ppm(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.centerline_ppm).collect()
    }

    /// Off-centerline concentration at sample `index`, crosswind offset `y`.
    pub fn lateral(&self, index: usize, y: f64) -> Option<f64> {
        self.samples
            .get(index)
            .map(|s| gaussian_falloff(s.centerline_ppm, s.half_width, y))
    }

    /// Largest centerline concentration and where it occurs.
    pub fn peak(&self) -> Option<ProfileSample> {
        self.samples
            .iter()
            .copied()
            .max_by(|a, b| a.centerline_ppm.total_cmp(&b.centerline_ppm))
    }

    /// Sample the 2-D field on `ny` evenly spaced crosswind offsets in `[-y_max, y_max]`.
    pub fn footprint_grid(&self, y_max: f64, ny: usize) -> HeavyGasResult<FootprintGrid> {
        if !(y_max.is_finite() && y_max > 0.0) {
            return Err(HeavyGasError::domain("footprint y_max must be positive"));
        }
        if ny < 2 {
            return Err(HeavyGasError::domain(
                "footprint needs at least two crosswind points",
            ));
        }
        let dy = 2.0 * y_max / (ny - 1) as f64;
        let y: Vec<f64> = (0..ny).map(|j| -y_max + j as f64 * dy).collect();
        let ppm = y
            .iter()
            .map(|&yj| {
                self.samples
                    .iter()
                    .map(|s| gaussian_falloff(s.centerline_ppm, s.half_width, yj.abs()))
                    .collect()
            })
            .collect();
        Ok(FootprintGrid {
            x: self.x(),
            y,
            ppm,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dg_core::{Tolerances, nearly_equal};

    fn profile() -> ConcentrationProfile {
        ConcentrationProfile::from_samples(vec![
            ProfileSample {
                x: 10.0,
                centerline_ppm: 100.0,
                half_width: 5.0,
            },
            ProfileSample {
                x: 20.0,
                centerline_ppm: 50.0,
                half_width: 0.0,
            },
        ])
        .unwrap()
    }

    #[test]
    fn falloff_at_one_half_width() {
        let c = gaussian_falloff(100.0, 5.0, 5.0);
        assert!(nearly_equal(c, 100.0 * (-0.5_f64).exp(), Tolerances::default()));
        assert_eq!(gaussian_falloff(100.0, 5.0, 0.0), 100.0);
    }

    #[test]
    fn zero_width_is_a_delta() {
        assert_eq!(gaussian_falloff(42.0, 0.0, 0.0), 42.0);
        assert_eq!(gaussian_falloff(42.0, 0.0, 0.1), 0.0);
        let p = profile();
        assert_eq!(p.lateral(1, 0.0), Some(50.0));
        assert_eq!(p.lateral(1, 3.0), Some(0.0));
        assert_eq!(p.lateral(2, 0.0), None);
    }

    #[test]
    fn from_samples_rejects_unordered() {
        let err = ConcentrationProfile::from_samples(vec![
            ProfileSample {
                x: 20.0,
                centerline_ppm: 1.0,
                half_width: 1.0,
            },
            ProfileSample {
                x: 10.0,
                centerline_ppm: 1.0,
                half_width: 1.0,
            },
        ]);
        assert!(err.is_err());
    }

    #[test]
    fn footprint_dimensions_and_symmetry() {
        let p = profile();
        let grid = p.footprint_grid(10.0, 5).unwrap();
        assert_eq!(grid.x, vec![10.0, 20.0]);
        assert_eq!(grid.y, vec![-10.0, -5.0, 0.0, 5.0, 10.0]);
        assert_eq!(grid.ppm.len(), 5);
        assert_eq!(grid.ppm[2], vec![100.0, 50.0]);
        assert_eq!(grid.ppm[0], grid.ppm[4]);
        assert_eq!(grid.ppm[1][0], grid.ppm[3][0]);
        assert!(p.footprint_grid(0.0, 5).is_err());
        assert!(p.footprint_grid(10.0, 1).is_err());
    }

    #[test]
    fn peak_is_max_centerline() {
        let p = profile();
        assert_eq!(p.peak().unwrap().x, 10.0);
        assert!(ConcentrationProfile::default().peak().is_none());
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn falloff_never_exceeds_centerline(
            c in 0.0_f64..1e6,
            w in 0.0_f64..1e4,
            y in -1e4_f64..1e4,
        ) {
            let v = gaussian_falloff(c, w, y);
            prop_assert!(v >= 0.0);
            prop_assert!(v <= c);
        }

        #[test]
        fn falloff_is_symmetric(c in 0.0_f64..1e6, w in 0.01_f64..1e4, y in 0.0_f64..1e4) {
            prop_assert_eq!(gaussian_falloff(c, w, y), gaussian_falloff(c, w, -y));
        }
    }
}
