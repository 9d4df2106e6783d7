//! Scenario validation logic.

use crate::schema::{LimitsDef, Scenario, SourceDef, SourceKindDef, ThresholdDef, TierDef};
use dg_atmos::StabilityClass;
use dg_heavygas::parse_threshold;
use std::collections::HashSet;
use std::time::Duration;

#[derive(thiserror::Error, Debug)]
pub enum ValidationError {
    #[error("Duplicate ID: {id} in {context}")]
    DuplicateId { id: String, context: String },

    #[error("Missing section: {what}")]
    Missing { what: String },

    #[error("Invalid value: {field} = {value} ({reason})")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Unsupported version: {version}")]
    UnsupportedVersion { version: u32 },
}

fn positive(field: impl Into<String>, v: f64) -> Result<(), ValidationError> {
    if !v.is_finite() || v <= 0.0 {
        return Err(ValidationError::InvalidValue {
            field: field.into(),
            value: v.to_string(),
            reason: "must be positive and finite".to_string(),
        });
    }
    Ok(())
}

/// Positive and representable as a [`Duration`].
pub(crate) fn wall_time(field: &str, seconds: f64) -> Result<Duration, ValidationError> {
    positive(field, seconds)?;
    Duration::try_from_secs_f64(seconds).map_err(|e| ValidationError::InvalidValue {
        field: field.to_string(),
        value: seconds.to_string(),
        reason: e.to_string(),
    })
}

pub fn validate_scenario(scenario: &Scenario) -> Result<(), ValidationError> {
    if scenario.version > crate::migrate::LATEST_VERSION {
        return Err(ValidationError::UnsupportedVersion {
            version: scenario.version,
        });
    }

    if scenario.stability.parse::<StabilityClass>().is_err() {
        return Err(ValidationError::InvalidValue {
            field: "stability".to_string(),
            value: scenario.stability.clone(),
            reason: "expected a Pasquill-Gifford class A-F".to_string(),
        });
    }

    let met = &scenario.meteorology;
    positive("meteorology.wind_speed_mps", met.wind_speed_mps)?;
    positive("meteorology.surface_roughness_m", met.surface_roughness_m)?;
    positive("meteorology.wind_ref_height_m", met.wind_ref_height_m)?;
    positive("meteorology.ambient_temperature_k", met.ambient_temperature_k)?;
    if met.wind_ref_height_m <= met.surface_roughness_m {
        return Err(ValidationError::InvalidValue {
            field: "meteorology.wind_ref_height_m".to_string(),
            value: met.wind_ref_height_m.to_string(),
            reason: format!(
                "must exceed surface_roughness_m ({})",
                met.surface_roughness_m
            ),
        });
    }

    positive("gas.molecular_weight_gas", scenario.gas.molecular_weight_gas)?;
    positive("gas.molecular_weight_air", scenario.gas.molecular_weight_air)?;
    positive("gas.release_temperature_k", scenario.gas.release_temperature_k)?;

    if let Some(consts) = &scenario.constants {
        consts
            .validate()
            .map_err(|e| ValidationError::InvalidValue {
                field: "constants".to_string(),
                value: String::new(),
                reason: e.to_string(),
            })?;
    }

    let int = &scenario.integration;
    positive("integration.x_end_m", int.x_end_m)?;
    positive("integration.max_step_m", int.max_step_m)?;
    positive("integration.rtol", int.rtol)?;
    positive("integration.atol", int.atol)?;
    if let Some(t) = int.max_wall_time_s {
        wall_time("integration.max_wall_time_s", t)?;
    }
    if int.max_steps == 0 || int.record_every == 0 {
        return Err(ValidationError::InvalidValue {
            field: "integration".to_string(),
            value: format!("max_steps={}, record_every={}", int.max_steps, int.record_every),
            reason: "step counts must be positive".to_string(),
        });
    }

    if scenario.sources.is_empty() {
        return Err(ValidationError::Missing {
            what: "at least one source".to_string(),
        });
    }
    let mut source_ids = HashSet::new();
    for source in &scenario.sources {
        if !source_ids.insert(&source.id) {
            return Err(ValidationError::DuplicateId {
                id: source.id.clone(),
                context: "sources".to_string(),
            });
        }
        validate_source(source)?;
    }

    validate_limits(&scenario.limits, scenario.gas.molecular_weight_gas)
}

fn validate_source(source: &SourceDef) -> Result<(), ValidationError> {
    positive(
        format!("source '{}' release_rate_kgps", source.id),
        source.release_rate_kgps,
    )?;
    match &source.kind {
        SourceKindDef::Instantaneous { volume_m3, area_m2 } => {
            positive(format!("source '{}' volume_m3", source.id), *volume_m3)?;
            positive(format!("source '{}' area_m2", source.id), *area_m2)
        }
        SourceKindDef::Puddle { diameter_m } => {
            positive(format!("source '{}' diameter_m", source.id), *diameter_m)
        }
        SourceKindDef::Continuous => Ok(()),
    }
}

/// Resolve a file threshold to ppm.
pub(crate) fn threshold_ppm(
    field: &str,
    def: &ThresholdDef,
    molecular_weight: f64,
) -> Result<f64, ValidationError> {
    let (ppm, shown) = match def {
        ThresholdDef::Ppm(v) => (Some(*v), v.to_string()),
        ThresholdDef::Text(s) => (parse_threshold(s, molecular_weight), s.clone()),
    };
    match ppm {
        Some(v) if v.is_finite() && v > 0.0 => Ok(v),
        _ => Err(ValidationError::InvalidValue {
            field: field.to_string(),
            value: shown,
            reason: "expected a positive concentration in ppm, mg/m3 or mg/l".to_string(),
        }),
    }
}

fn validate_tiers(prefix: &str, tiers: &TierDef, mw: f64) -> Result<(), ValidationError> {
    for (i, level) in [&tiers.level1, &tiers.level2, &tiers.level3]
        .into_iter()
        .enumerate()
    {
        if let Some(def) = level {
            threshold_ppm(&format!("limits.{prefix}.level{}", i + 1), def, mw)?;
        }
    }
    Ok(())
}

fn validate_limits(limits: &LimitsDef, mw: f64) -> Result<(), ValidationError> {
    for (prefix, tiers) in [("aegl", &limits.aegl), ("erpg", &limits.erpg), ("pac", &limits.pac)] {
        if let Some(tiers) = tiers {
            validate_tiers(prefix, tiers, mw)?;
        }
    }
    if let Some(idlh) = &limits.idlh {
        threshold_ppm("limits.idlh", idlh, mw)?;
    }
    for (name, def) in &limits.custom {
        threshold_ppm(&format!("limits.custom.{name}"), def, mw)?;
    }
    Ok(())
}
