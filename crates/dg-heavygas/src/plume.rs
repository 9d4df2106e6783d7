//! Downwind dense-cloud ODE system.
//!
//! State: vertical scale `Sz`, effective half-width `Beff`, cloud
//! temperature `Tc` and cumulative mass flux `Flux`, all functions of the
//! downwind distance `x`. [`derivatives`] is the pure right-hand side;
//! [`PlumeModel`] adapts it to the dg-sim integrators.

use crate::engine::HeavyGasInput;
use crate::error::HeavyGasResult;
use crate::floors::ModelFloors;
use crate::gas::{GasProperties, mass_fraction};
use crate::source::SecondarySource;
use dg_atmos::{StabilityClassParams, thermo};
use dg_core::{PhysicalConstants, gamma};
use dg_sim::{SimError, SimResult, SpatialModel};
use nalgebra::DVector;

/// One point of the ODE state vector.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DispersionState {
    /// Vertical scale Sz (m)
    pub sz: f64,
    /// Effective cloud half-width Beff (m)
    pub beff: f64,
    /// Cloud temperature Tc (K)
    pub tc: f64,
    /// Cumulative mass flux through the cloud cross-section (kg/s)
    pub flux: f64,
}

impl DispersionState {
    fn zip(&self, other: &Self, f: impl Fn(f64, f64) -> f64) -> Self {
        Self {
            sz: f(self.sz, other.sz),
            beff: f(self.beff, other.beff),
            tc: f(self.tc, other.tc),
            flux: f(self.flux, other.flux),
        }
    }
}

/// Run-invariant quantities shared by the RHS and the concentration projector.
#[derive(Clone, Copy, Debug)]
pub struct PlumeContext {
    pub stability: StabilityClassParams,
    pub constants: PhysicalConstants,
    pub floors: ModelFloors,
    pub gas: GasProperties,
    /// Gas release rate Q (kg/s)
    pub release_rate: f64,
    pub wind_speed_ref: f64,
    pub wind_ref_height: f64,
    pub ambient_temperature: f64,
    pub friction_velocity: f64,
    pub air_density: f64,
    /// Γ(1/(1+n)) for the wind-profile normalization
    pub gamma_term: f64,
}

/// Mixture and profile properties derived from one (clamped) state.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CloudProperties {
    pub mass_fraction: f64,
    pub molecular_weight: f64,
    pub density: f64,
    /// Effective cloud height Heff (m)
    pub effective_height: f64,
    /// Effective advection velocity U_eff (m/s)
    pub advection_velocity: f64,
}

impl PlumeContext {
    pub fn new(input: &HeavyGasInput) -> HeavyGasResult<Self> {
        let consts = input.constants;
        let stability = *input.stability.params();
        let met = &input.met;
        Ok(Self {
            stability,
            constants: consts,
            floors: input.floors,
            gas: input.gas,
            release_rate: input.release_rate.value,
            wind_speed_ref: met.wind_speed_ref().value,
            wind_ref_height: met.wind_ref_height().value,
            ambient_temperature: met.ambient_temperature().value,
            friction_velocity: met.friction_velocity(&consts)?,
            air_density: thermo::density(
                met.ambient_temperature().value,
                input.gas.molecular_weight_air,
                &consts,
            )?,
            gamma_term: gamma(1.0 / (1.0 + stability.n))?,
        })
    }

    /// Initial ODE state at the secondary source.
    pub fn initial_state(&self, source: &SecondarySource) -> DispersionState {
        let n = self.stability.n;
        DispersionState {
            sz: source.height * (1.0 + n) / self.gamma_term,
            beff: source.radius,
            tc: self.gas.release_temperature.value,
            flux: self.release_rate,
        }
    }

    /// Clamp a state onto the physically admissible set.
    pub fn clamp(&self, s: &DispersionState) -> DispersionState {
        DispersionState {
            sz: s.sz.max(self.floors.height),
            beff: s.beff.max(self.floors.half_width),
            tc: s
                .tc
                .min(self.ambient_temperature)
                .max(self.floors.temperature.min(self.ambient_temperature)),
            flux: s.flux.max(self.floors.flux),
        }
    }

    /// Mixture density and effective profile scales for a clamped state.
    pub fn cloud_properties(&self, s: &DispersionState) -> SimResult<CloudProperties> {
        let n = self.stability.n;
        let w_c = mass_fraction(self.release_rate, s.flux);
        let mw_mix = self.gas.mixture_molecular_weight(w_c);
        let rho_mix = thermo::density(s.tc, mw_mix, &self.constants).map_err(|e| {
            SimError::Model {
                message: e.to_string(),
            }
        })?;
        Ok(CloudProperties {
            mass_fraction: w_c,
            molecular_weight: mw_mix,
            density: rho_mix,
            effective_height: (s.sz / (1.0 + n)) * self.gamma_term,
            advection_velocity: (self.wind_speed_ref / self.gamma_term)
                * (s.sz / self.wind_ref_height).powf(n),
        })
    }
}

/// dState/dx at downwind distance `x`.
pub fn derivatives(
    x: f64,
    state: &DispersionState,
    ctx: &PlumeContext,
) -> SimResult<DispersionState> {
    let s = ctx.clamp(state);
    let c = &ctx.constants;
    let p = &ctx.stability;
    let n = p.n;
    let u_star = ctx.friction_velocity;
    let u_ref = ctx.wind_speed_ref;
    let z_ref = ctx.wind_ref_height;
    let t_amb = ctx.ambient_temperature;

    let cloud = ctx.cloud_properties(&s)?;
    let heff = cloud.effective_height;
    let u_eff = cloud.advection_velocity;

    let g_prime = thermo::reduced_gravity(cloud.density, ctx.air_density, c);
    let ri_bulk = g_prime * heff / u_star.powi(2);
    let excess_cold = ((t_amb - s.tc) / s.tc).max(0.0);
    let ri_flux = c.gravity * excess_cold * (heff / (u_star * u_ref)) * (z_ref / heff).powf(n);
    let sigma_w = thermo::vertical_velocity_variance(u_star, ri_flux);
    let ri_prime = ri_bulk * (u_star / sigma_w).powi(2);
    let phi = thermo::entrainment_suppression(ri_prime.max(0.0));

    // Vertical growth by turbulent entrainment
    let d_sz = ((1.0 + n) / ctx.gamma_term) * c.von_karman * u_star / (u_eff * phi);

    // Lateral growth: gravity slumping while dense, passive diffusion always
    let gravity_term = if g_prime > 0.0 && ri_prime > 1.0 {
        c.gravity_spreading_coeff
            * ctx.gamma_term
            * (z_ref / s.sz).powf(n)
            * (g_prime * heff).sqrt()
            / u_ref
    } else {
        0.0
    };
    let passive_term = (core::f64::consts::PI.sqrt() / 2.0) * p.d_sigma_y_passive_dx(x);
    let d_beff = gravity_term + passive_term;

    // Air entrainment over the cloud width
    let entrainment_rate = ctx.air_density * c.von_karman * sigma_w * (1.0 + n) / phi;
    let d_flux = entrainment_rate * 2.0 * s.beff;

    // Warming by dilution and by ground heat flux
    let deficit = t_amb - s.tc;
    let dilution = (d_flux / s.flux) * deficit;
    let ground_flux = c.ground_heat_transfer * deficit;
    let heating =
        (ground_flux * 2.0 * s.beff / c.heat_flux_length) / (s.flux * c.mixture_heat_capacity);
    let d_tc = dilution + heating;

    Ok(DispersionState {
        sz: d_sz,
        beff: d_beff,
        tc: d_tc,
        flux: d_flux,
    })
}

/// Heavy-gas cloud as a [`SpatialModel`].
#[derive(Clone, Copy, Debug)]
pub struct PlumeModel {
    pub ctx: PlumeContext,
    pub source: SecondarySource,
}

impl SpatialModel for PlumeModel {
    type State = DispersionState;

    fn initial_position(&self) -> f64 {
        self.source.radius
    }

    fn initial_state(&self) -> DispersionState {
        self.ctx.initial_state(&self.source)
    }

    fn rhs(&self, x: f64, y: &DispersionState) -> SimResult<DispersionState> {
        derivatives(x, y, &self.ctx)
    }

    fn add(&self, a: &DispersionState, b: &DispersionState) -> DispersionState {
        a.zip(b, |p, q| p + q)
    }

    fn scale(&self, a: &DispersionState, scale: f64) -> DispersionState {
        a.zip(a, |p, _| p * scale)
    }

    fn to_vector(&self, y: &DispersionState) -> DVector<f64> {
        DVector::from_vec(vec![y.sz, y.beff, y.tc, y.flux])
    }

    fn project(&self, y: DispersionState) -> DispersionState {
        self.ctx.clamp(&y)
    }
}
