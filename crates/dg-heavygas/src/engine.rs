//! Engine façade: validate inputs, solve the source, march downwind.

use crate::concentration::ConcentrationProfile;
use crate::error::{HeavyGasError, HeavyGasResult};
use crate::floors::ModelFloors;
use crate::gas::GasProperties;
use crate::hazard::{HazardLimits, HazardZoneResult, extract_hazard_zones};
use crate::plume::{DispersionState, PlumeContext, PlumeModel};
use crate::source::{SecondarySource, SourceConfig, solve_secondary_source};
use dg_atmos::{MeteorologicalInputs, StabilityClass};
use dg_core::{MassRate, PhysicalConstants};
use dg_sim::{IntegrationOptions, SimStats, run_sim};
use rayon::prelude::*;

/// Everything one heavy-gas simulation depends on.
///
/// All fields are plain values; a run never mutates its input.
#[derive(Clone, Debug)]
pub struct HeavyGasInput {
    pub stability: StabilityClass,
    pub release_rate: MassRate,
    pub source: SourceConfig,
    pub met: MeteorologicalInputs,
    pub gas: GasProperties,
    pub constants: PhysicalConstants,
    pub floors: ModelFloors,
    pub integration: IntegrationOptions,
}

impl HeavyGasInput {
    /// Input with default gas properties, constants, floors and integration options.
    pub fn new(
        stability: StabilityClass,
        release_rate: MassRate,
        source: SourceConfig,
        met: MeteorologicalInputs,
    ) -> Self {
        Self {
            stability,
            release_rate,
            source,
            met,
            gas: GasProperties::default(),
            constants: PhysicalConstants::default(),
            floors: ModelFloors::default(),
            integration: IntegrationOptions::default(),
        }
    }

    pub fn with_gas(mut self, gas: GasProperties) -> Self {
        self.gas = gas;
        self
    }

    pub fn with_constants(mut self, constants: PhysicalConstants) -> Self {
        self.constants = constants;
        self
    }

    pub fn with_floors(mut self, floors: ModelFloors) -> Self {
        self.floors = floors;
        self
    }

    pub fn with_integration(mut self, integration: IntegrationOptions) -> Self {
        self.integration = integration;
        self
    }

    /// Check every physical precondition before any integration starts.
    pub fn validate(&self) -> HeavyGasResult<()> {
        let q = self.release_rate.value;
        if !(q.is_finite() && q > 0.0) {
            return Err(HeavyGasError::domain(format!(
                "release rate must be positive (got {q} kg/s)"
            )));
        }
        self.constants.validate()?;
        self.gas.validate()?;
        self.floors.validate()?;
        self.source.validate()?;
        // Log-law precondition; also re-checks inputs built with a custom constant set.
        self.met.friction_velocity(&self.constants)?;
        Ok(())
    }
}

/// One `(x, state)` point of a trajectory.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TrajectorySample {
    pub x: f64,
    pub state: DispersionState,
}

/// Downwind evolution of the cloud, strictly increasing in `x`.
#[derive(Clone, Debug)]
pub struct Trajectory {
    samples: Vec<TrajectorySample>,
    context: PlumeContext,
    stats: SimStats,
}

impl Trajectory {
    pub fn samples(&self) -> &[TrajectorySample] {
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

    pub fn states(&self) -> Vec<DispersionState> {
        self.samples.iter().map(|s| s.state).collect()
    }

    pub fn first(&self) -> Option<&TrajectorySample> {
        self.samples.first()
    }

    pub fn last(&self) -> Option<&TrajectorySample> {
        self.samples.last()
    }

    /// Run-invariant context the trajectory was produced with.
    pub fn context(&self) -> &PlumeContext {
        &self.context
    }

    pub fn stats(&self) -> SimStats {
        self.stats
    }

    /// Centerline concentration at every sample.
    pub fn concentration_profile(&self) -> HeavyGasResult<ConcentrationProfile> {
        ConcentrationProfile::from_trajectory(self)
    }
}

/// Output of [`run`].
#[derive(Clone, Debug)]
pub struct HeavyGasRun {
    pub secondary_source: SecondarySource,
    pub trajectory: Trajectory,
}

/// Run and hazard assessment in one.
#[derive(Clone, Debug)]
pub struct Assessment {
    pub run: HeavyGasRun,
    pub profile: ConcentrationProfile,
    pub zones: HazardZoneResult,
}

/// Integrate the heavy-gas model for one scenario.
pub fn run(input: &HeavyGasInput) -> HeavyGasResult<HeavyGasRun> {
    input.validate()?;

    let ctx = PlumeContext::new(input)?;
    let source = solve_secondary_source(input)?;
    if source.radius >= input.integration.x_end {
        return Err(HeavyGasError::domain(format!(
            "secondary-source radius {:.1} m reaches the far-field cutoff {:.1} m",
            source.radius, input.integration.x_end
        )));
    }

    let model = PlumeModel { ctx, source };
    let record = run_sim(&model, &input.integration)?;

    let samples = record
        .x
        .iter()
        .zip(record.y)
        .map(|(&x, state)| TrajectorySample { x, state })
        .collect::<Vec<_>>();
    check_trajectory(&samples)?;

    tracing::info!(
        stability = %input.stability,
        release_rate = input.release_rate.value,
        samples = samples.len(),
        accepted = record.stats.accepted,
        rejected = record.stats.rejected,
        "heavy-gas run complete"
    );

    Ok(HeavyGasRun {
        secondary_source: source,
        trajectory: Trajectory {
            samples,
            context: ctx,
            stats: record.stats,
        },
    })
}

fn check_trajectory(samples: &[TrajectorySample]) -> HeavyGasResult<()> {
    for (i, s) in samples.iter().enumerate() {
        let st = &s.state;
        if ![s.x, st.sz, st.beff, st.tc, st.flux].iter().all(|v| v.is_finite()) {
            return Err(HeavyGasError::SolverDivergence {
                what: format!("non-finite trajectory sample at index {i} (x = {})", s.x),
            });
        }
    }
    Ok(())
}

/// Run, project to concentrations, and extract hazard zones.
pub fn assess(input: &HeavyGasInput, limits: &HazardLimits) -> HeavyGasResult<Assessment> {
    let run = run(input)?;
    let profile = run.trajectory.concentration_profile()?;
    let zones = extract_hazard_zones(&profile, limits);
    Ok(Assessment {
        run,
        profile,
        zones,
    })
}

/// Run independent scenarios in parallel; results keep input order.
pub fn run_batch(inputs: &[HeavyGasInput]) -> Vec<HeavyGasResult<HeavyGasRun>> {
    inputs.par_iter().map(run).collect()
}

/// Parallel [`assess`] over independent scenarios sharing one limit set.
pub fn assess_batch(
    inputs: &[HeavyGasInput],
    limits: &HazardLimits,
) -> Vec<HeavyGasResult<Assessment>> {
    inputs.par_iter().map(|i| assess(i, limits)).collect()
}
