use dg_project::schema::*;
use dg_project::{load, load_json, load_yaml, save_json, save_yaml, validate_scenario};

#[test]
fn roundtrip_yaml_default_scenario() {
    let scenario = Scenario::new("Reference");
    validate_scenario(&scenario).unwrap();

    let path = std::env::temp_dir().join("dg_project_roundtrip_default.yaml");
    save_yaml(&path, &scenario).unwrap();
    let loaded = load_yaml(&path).unwrap();

    assert_eq!(scenario, loaded);
}

#[test]
fn roundtrip_json_all_source_types() {
    let mut scenario = Scenario::new("Every source");
    scenario.sources = vec![
        SourceDef {
            id: "a".to_string(),
            name: Some("Burst".to_string()),
            release_rate_kgps: 3.0,
            kind: SourceKindDef::Instantaneous {
                volume_m3: 100.0,
                area_m2: 50.0,
            },
        },
        SourceDef {
            id: "b".to_string(),
            name: None,
            release_rate_kgps: 1.0,
            kind: SourceKindDef::Puddle { diameter_m: 4.0 },
        },
        SourceDef {
            id: "c".to_string(),
            name: None,
            release_rate_kgps: 0.5,
            kind: SourceKindDef::Continuous,
        },
    ];
    scenario.constants = Some(dg_core::PhysicalConstants::default());
    scenario.integration.integrator = IntegratorDef::Rk4;
    scenario.limits.idlh = Some(ThresholdDef::Text("100 ppm".to_string()));

    let path = std::env::temp_dir().join("dg_project_roundtrip_sources.json");
    save_json(&path, &scenario).unwrap();
    assert_eq!(load_json(&path).unwrap(), scenario);
    assert_eq!(load(&path).unwrap(), scenario);
}

#[test]
fn minimal_yaml_fills_defaults() {
    let yaml = r#"
version: 1
name: minimal
stability: b
meteorology:
  wind_speed_mps: 3.0
  wind_ref_height_m: 10.0
  surface_roughness_m: 0.1
  ambient_temperature_k: 293.15
sources:
  - id: s
    release_rate_kgps: 1
    kind:
      type: continuous
"#;
    let s = dg_project::from_yaml_str(yaml).unwrap();
    assert_eq!(s.gas, GasDef::default());
    assert_eq!(s.integration, IntegrationDef::default());
    assert!(s.constants.is_none());
    assert_eq!(s.stability_class().unwrap(), dg_atmos::StabilityClass::B);
}

#[test]
fn unknown_source_type_fails_to_parse() {
    let yaml = r#"
version: 1
name: jet
stability: D
meteorology:
  wind_speed_mps: 3.0
  wind_ref_height_m: 10.0
  surface_roughness_m: 0.1
  ambient_temperature_k: 293.15
sources:
  - id: s
    release_rate_kgps: 1
    kind:
      type: jet
"#;
    assert!(matches!(
        dg_project::from_yaml_str(yaml),
        Err(dg_project::ProjectError::Yaml(_))
    ));
}

#[test]
fn invalid_meteorology_fails_validation() {
    let mut scenario = Scenario::new("calm");
    scenario.meteorology.wind_speed_mps = 0.0;
    let path = std::env::temp_dir().join("dg_project_invalid_met.yaml");
    assert!(save_yaml(&path, &scenario).is_err());
}
