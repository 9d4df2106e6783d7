use std::path::Path;

#[test]
fn demo_scenarios_load_and_convert() {
    let root = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../demos/scenarios");
    let demos = [("reference_d.yaml", 1), ("multi_source.yaml", 3)];

    for (name, sources) in demos {
        let path = root.join(name);
        let scenario = dg_project::load_yaml(&path)
            .unwrap_or_else(|e| panic!("Failed to load {}: {}", name, e));
        let inputs = scenario
            .inputs()
            .unwrap_or_else(|e| panic!("Failed to convert {}: {}", name, e));
        assert_eq!(inputs.len(), sources, "{name}");
        let limits = scenario.hazard_limits().unwrap();
        assert!(!limits.is_empty(), "{name}");
    }
}

#[test]
fn reference_demo_runs() {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../demos/scenarios/reference_d.yaml");
    let scenario = dg_project::load_yaml(&path).unwrap();
    let limits = scenario.hazard_limits().unwrap();
    assert_eq!(limits.get("IDLH"), Some(100.0));

    let (_, input) = &scenario.inputs().unwrap()[0];
    let out = dg_heavygas::assess(input, &limits).unwrap();
    let d1 = out.zones.distance("AEGL-1").unwrap();
    let d3 = out.zones.distance("AEGL-3").unwrap();
    assert!(d3 < d1);
}
