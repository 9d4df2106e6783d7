//! Scenario file schema definitions.

use dg_core::PhysicalConstants;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Scenario {
    pub version: u32,
    pub name: String,
    /// Pasquill-Gifford class, `A`..`F`
    pub stability: String,
    pub meteorology: MeteorologyDef,
    #[serde(default)]
    pub gas: GasDef,
    #[serde(default)]
    pub sources: Vec<SourceDef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub constants: Option<PhysicalConstants>,
    #[serde(default)]
    pub integration: IntegrationDef,
    #[serde(default)]
    pub limits: LimitsDef,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MeteorologyDef {
    pub wind_speed_mps: f64,
    pub wind_ref_height_m: f64,
    pub surface_roughness_m: f64,
    pub ambient_temperature_k: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GasDef {
    #[serde(default = "default_mw_gas")]
    pub molecular_weight_gas: f64,
    #[serde(default = "default_mw_air")]
    pub molecular_weight_air: f64,
    #[serde(default = "default_release_temperature")]
    pub release_temperature_k: f64,
}

fn default_mw_gas() -> f64 {
    64.06
}

fn default_mw_air() -> f64 {
    28.97
}

fn default_release_temperature() -> f64 {
    239.15
}

impl Default for GasDef {
    fn default() -> Self {
        Self {
            molecular_weight_gas: default_mw_gas(),
            molecular_weight_air: default_mw_air(),
            release_temperature_k: default_release_temperature(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SourceDef {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub release_rate_kgps: f64,
    pub kind: SourceKindDef,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SourceKindDef {
    Instantaneous { volume_m3: f64, area_m2: f64 },
    Puddle { diameter_m: f64 },
    Continuous,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum IntegratorDef {
    #[default]
    DormandPrince45,
    Rk4,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IntegrationDef {
    #[serde(default = "default_x_end")]
    pub x_end_m: f64,
    #[serde(default = "default_max_step")]
    pub max_step_m: f64,
    #[serde(default = "default_rtol")]
    pub rtol: f64,
    #[serde(default = "default_atol")]
    pub atol: f64,
    #[serde(default = "default_max_steps")]
    pub max_steps: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_wall_time_s: Option<f64>,
    #[serde(default = "default_record_every")]
    pub record_every: usize,
    #[serde(default)]
    pub integrator: IntegratorDef,
}

fn default_x_end() -> f64 {
    12_000.0
}

fn default_max_step() -> f64 {
    10.0
}

fn default_rtol() -> f64 {
    1e-3
}

fn default_atol() -> f64 {
    1e-6
}

fn default_max_steps() -> usize {
    200_000
}

fn default_record_every() -> usize {
    1
}

impl Default for IntegrationDef {
    fn default() -> Self {
        Self {
            x_end_m: default_x_end(),
            max_step_m: default_max_step(),
            rtol: default_rtol(),
            atol: default_atol(),
            max_steps: default_max_steps(),
            max_wall_time_s: None,
            record_every: default_record_every(),
            integrator: IntegratorDef::default(),
        }
    }
}

/// A threshold as written in the file: a bare ppm number or a unit-suffixed string.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum ThresholdDef {
    Ppm(f64),
    Text(String),
}

/// Three-tier guideline family; absent tiers are skipped.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct TierDef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level1: Option<ThresholdDef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level2: Option<ThresholdDef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level3: Option<ThresholdDef>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct LimitsDef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aegl: Option<TierDef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub erpg: Option<TierDef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pac: Option<TierDef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub idlh: Option<ThresholdDef>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub custom: BTreeMap<String, ThresholdDef>,
}

impl Scenario {
    /// Smallest valid scenario: one continuous source, AEGL tiers for SO₂-like gas.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            version: crate::migrate::LATEST_VERSION,
            name: name.into(),
            stability: "D".to_string(),
            meteorology: MeteorologyDef {
                wind_speed_mps: 5.0,
                wind_ref_height_m: 3.0,
                surface_roughness_m: 0.03,
                ambient_temperature_k: 298.15,
            },
            gas: GasDef::default(),
            sources: vec![SourceDef {
                id: "src1".to_string(),
                name: None,
                release_rate_kgps: 2.0,
                kind: SourceKindDef::Continuous,
            }],
            constants: None,
            integration: IntegrationDef::default(),
            limits: LimitsDef {
                aegl: Some(TierDef {
                    level1: Some(ThresholdDef::Ppm(0.5)),
                    level2: Some(ThresholdDef::Ppm(2.0)),
                    level3: Some(ThresholdDef::Ppm(20.0)),
                }),
                ..LimitsDef::default()
            },
        }
    }
}
