//! Conversion from a validated scenario to engine inputs.

use crate::ProjectResult;
use crate::schema::{IntegratorDef, Scenario, SourceDef, SourceKindDef, TierDef};
use crate::validate::{threshold_ppm, wall_time};
use dg_atmos::{MeteorologicalInputs, StabilityClass};
use dg_core::{k, kgps, m, m2, m3, mps};
use dg_heavygas::{GasProperties, HazardLimits, HeavyGasError, HeavyGasInput, SourceConfig};
use dg_sim::{IntegrationOptions, IntegratorType};

/// One engine input per scenario source, tagged with the source id.
pub type SourceInput = (String, HeavyGasInput);

impl Scenario {
    pub fn stability_class(&self) -> ProjectResult<StabilityClass> {
        Ok(self
            .stability
            .parse::<StabilityClass>()
            .map_err(HeavyGasError::from)?)
    }

    pub fn meteorological_inputs(&self) -> ProjectResult<MeteorologicalInputs> {
        let met = &self.meteorology;
        Ok(MeteorologicalInputs::new(
            mps(met.wind_speed_mps),
            m(met.wind_ref_height_m),
            m(met.surface_roughness_m),
            k(met.ambient_temperature_k),
        )
        .map_err(HeavyGasError::from)?)
    }

    pub fn gas_properties(&self) -> GasProperties {
        GasProperties {
            molecular_weight_gas: self.gas.molecular_weight_gas,
            molecular_weight_air: self.gas.molecular_weight_air,
            release_temperature: k(self.gas.release_temperature_k),
        }
    }

    pub fn integration_options(&self) -> ProjectResult<IntegrationOptions> {
        let int = &self.integration;
        let max_wall_time = int
            .max_wall_time_s
            .map(|t| wall_time("integration.max_wall_time_s", t))
            .transpose()?;
        Ok(IntegrationOptions {
            x_end: int.x_end_m,
            max_step: int.max_step_m,
            rtol: int.rtol,
            atol: int.atol,
            max_steps: int.max_steps,
            max_wall_time,
            record_every: int.record_every,
            integrator: match int.integrator {
                IntegratorDef::DormandPrince45 => IntegratorType::DormandPrince45,
                IntegratorDef::Rk4 => IntegratorType::RK4,
            },
        })
    }

    /// Engine input for one source under the scenario's stability class.
    pub fn source_input(&self, source: &SourceDef) -> ProjectResult<HeavyGasInput> {
        self.source_input_with(source, self.stability_class()?)
    }

    /// Engine input for one source under an explicit stability class.
    pub fn source_input_with(
        &self,
        source: &SourceDef,
        stability: StabilityClass,
    ) -> ProjectResult<HeavyGasInput> {
        let config = match source.kind {
            SourceKindDef::Instantaneous { volume_m3, area_m2 } => SourceConfig::Instantaneous {
                volume: m3(volume_m3),
                area: m2(area_m2),
            },
            SourceKindDef::Puddle { diameter_m } => SourceConfig::Puddle {
                diameter: m(diameter_m),
            },
            SourceKindDef::Continuous => SourceConfig::Continuous,
        };
        let mut input = HeavyGasInput::new(
            stability,
            kgps(source.release_rate_kgps),
            config,
            self.meteorological_inputs()?,
        )
        .with_gas(self.gas_properties())
        .with_integration(self.integration_options()?);
        if let Some(consts) = self.constants {
            input = input.with_constants(consts);
        }
        Ok(input)
    }

    /// Engine inputs for every source, in file order.
    pub fn inputs(&self) -> ProjectResult<Vec<SourceInput>> {
        self.sources
            .iter()
            .map(|s| Ok((s.id.clone(), self.source_input(s)?)))
            .collect()
    }

    /// Hazard limits in ppm, resolving unit-suffixed thresholds.
    pub fn hazard_limits(&self) -> ProjectResult<HazardLimits> {
        let mw = self.gas.molecular_weight_gas;
        let tiers = |prefix: &str, t: &Option<TierDef>| -> ProjectResult<HazardLimits> {
            let Some(t) = t else {
                return Ok(HazardLimits::new());
            };
            let mut levels = [None; 3];
            for (i, def) in [&t.level1, &t.level2, &t.level3].into_iter().enumerate() {
                if let Some(def) = def {
                    levels[i] = Some(threshold_ppm(
                        &format!("limits.{prefix}.level{}", i + 1),
                        def,
                        mw,
                    )?);
                }
            }
            Ok(HazardLimits::tiered(&prefix.to_ascii_uppercase(), levels)?)
        };

        let limits = &self.limits;
        let mut out = HazardLimits::new();
        for family in [
            tiers("aegl", &limits.aegl)?,
            tiers("erpg", &limits.erpg)?,
            tiers("pac", &limits.pac)?,
        ] {
            for (name, ppm) in family.iter() {
                out.insert(name, ppm)?;
            }
        }
        if let Some(idlh) = &limits.idlh {
            out.insert("IDLH", threshold_ppm("limits.idlh", idlh, mw)?)?;
        }
        for (name, def) in &limits.custom {
            out.insert(
                name.clone(),
                threshold_ppm(&format!("limits.custom.{name}"), def, mw)?,
            )?;
        }
        Ok(out)
    }
}
