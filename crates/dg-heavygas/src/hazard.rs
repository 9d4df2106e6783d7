//! Hazard-threshold zones from a concentration profile.
//!
//! A zone reaches the farthest downwind sample at which the centerline
//! concentration meets its threshold. Exceedance sets need not be
//! contiguous; the last index is what counts.

use crate::concentration::ConcentrationProfile;
use crate::error::{HeavyGasError, HeavyGasResult};
use std::collections::BTreeMap;

/// Molar volume of an ideal gas at 25 °C and 1 atm (L/mol).
const MOLAR_VOLUME_25C: f64 = 24.45;

/// Named concentration thresholds (ppm), supplied by the caller.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct HazardLimits {
    limits: BTreeMap<String, f64>,
}

impl HazardLimits {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a named threshold.
    pub fn insert(&mut self, name: impl Into<String>, ppm: f64) -> HeavyGasResult<()> {
        let name = name.into();
        if !(ppm.is_finite() && ppm > 0.0) {
            return Err(HeavyGasError::domain(format!(
                "hazard limit '{name}' must be a positive concentration (got {ppm} ppm)"
            )));
        }
        self.limits.insert(name, ppm);
        Ok(())
    }

    pub fn with(mut self, name: impl Into<String>, ppm: f64) -> HeavyGasResult<Self> {
        self.insert(name, ppm)?;
        Ok(self)
    }

    /// Three-tier family (`{prefix}-1` .. `{prefix}-3`); missing tiers are skipped.
    pub fn tiered(prefix: &str, tiers: [Option<f64>; 3]) -> HeavyGasResult<Self> {
        let mut limits = Self::new();
        for (i, tier) in tiers.iter().enumerate() {
            if let Some(ppm) = tier {
                limits.insert(format!("{prefix}-{}", i + 1), *ppm)?;
            }
        }
        Ok(limits)
    }

    /// Acute Exposure Guideline Levels.
    pub fn aegl(
        aegl1: Option<f64>,
        aegl2: Option<f64>,
        aegl3: Option<f64>,
    ) -> HeavyGasResult<Self> {
        Self::tiered("AEGL", [aegl1, aegl2, aegl3])
    }

    /// Emergency Response Planning Guidelines.
    pub fn erpg(
        erpg1: Option<f64>,
        erpg2: Option<f64>,
        erpg3: Option<f64>,
    ) -> HeavyGasResult<Self> {
        Self::tiered("ERPG", [erpg1, erpg2, erpg3])
    }

    /// Protective Action Criteria.
    pub fn pac(pac1: Option<f64>, pac2: Option<f64>, pac3: Option<f64>) -> HeavyGasResult<Self> {
        Self::tiered("PAC", [pac1, pac2, pac3])
    }

    /// Adds the IDLH level when known.
    pub fn with_idlh(mut self, idlh: Option<f64>) -> HeavyGasResult<Self> {
        if let Some(ppm) = idlh {
            self.insert("IDLH", ppm)?;
        }
        Ok(self)
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.limits.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.limits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.limits.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.limits.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

/// Parse a threshold stored as a bare number or a `ppm`-suffixed string.
pub fn parse_ppm(value: &str) -> Option<f64> {
    let cleaned = value.trim().to_ascii_lowercase();
    let number = cleaned.strip_suffix("ppm").unwrap_or(&cleaned).trim();
    number.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Parse a threshold in ppm, mg/m³ or mg/L, returning ppm by volume.
///
/// Mass-based values are converted at 25 °C and 1 atm using the gas
/// molecular weight (g/mol).
pub fn parse_threshold(value: &str, molecular_weight: f64) -> Option<f64> {
    let cleaned = value.trim().to_ascii_lowercase();
    let mass_units = [("mg/m3", 1.0), ("mg/m³", 1.0), ("mg/l", 1000.0)];
    for (suffix, to_mg_per_m3) in mass_units {
        if let Some(number) = cleaned.strip_suffix(suffix) {
            if !(molecular_weight.is_finite() && molecular_weight > 0.0) {
                return None;
            }
            let mg_m3 = number.trim().parse::<f64>().ok()? * to_mg_per_m3;
            return Some(mg_m3 * MOLAR_VOLUME_25C / molecular_weight).filter(|v| v.is_finite());
        }
    }
    parse_ppm(&cleaned)
}

/// Extent of one hazard zone.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HazardZone {
    pub threshold_ppm: f64,
    /// Farthest downwind distance with concentration ≥ threshold (m); 0 if never reached
    pub distance_m: f64,
    /// Widest crosswind half-extent of the exceedance region (m)
    pub max_half_width_m: f64,
}

/// Zone name → extent.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct HazardZoneResult {
    zones: BTreeMap<String, HazardZone>,
}

impl HazardZoneResult {
    pub fn get(&self, name: &str) -> Option<&HazardZone> {
        self.zones.get(name)
    }

    /// Farthest exceedance distance for `name` (m).
    pub fn distance(&self, name: &str) -> Option<f64> {
        self.zones.get(name).map(|z| z.distance_m)
    }

    pub fn len(&self) -> usize {
        self.zones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &HazardZone)> {
        self.zones.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Zones ordered by decreasing threshold (most severe first).
    pub fn by_severity(&self) -> Vec<(&str, &HazardZone)> {
        let mut zones: Vec<_> = self.iter().collect();
        zones.sort_by(|a, b| b.1.threshold_ppm.total_cmp(&a.1.threshold_ppm));
        zones
    }
}

/// Crosswind half-extent where a Gaussian profile still meets `limit`.
fn exceedance_half_width(centerline: f64, half_width: f64, limit: f64) -> f64 {
    if centerline < limit || half_width <= 0.0 {
        return 0.0;
    }
    half_width * (2.0 * (centerline / limit).ln()).sqrt()
}

/// Farthest-exceedance distance for every named limit.
pub fn extract_hazard_zones(
    profile: &ConcentrationProfile,
    limits: &HazardLimits,
) -> HazardZoneResult {
    let samples = profile.samples();
    let zones = limits
        .iter()
        .map(|(name, limit)| {
            let distance_m = samples
                .iter()
                .rposition(|s| s.centerline_ppm >= limit)
                .map(|i| samples[i].x)
                .unwrap_or(0.0);
            let max_half_width_m = samples
                .iter()
                .map(|s| exceedance_half_width(s.centerline_ppm, s.half_width, limit))
                .fold(0.0, f64::max);
            (
                name.to_string(),
                HazardZone {
                    threshold_ppm: limit,
                    distance_m,
                    max_half_width_m,
                },
            )
        })
        .collect();
    HazardZoneResult { zones }
}

/// Per-zone maxima across independent results (e.g. several sources).
pub fn merge_zones<'a>(
    results: impl IntoIterator<Item = &'a HazardZoneResult>,
) -> HazardZoneResult {
    let mut zones: BTreeMap<String, HazardZone> = BTreeMap::new();
    for result in results {
        for (name, zone) in result.iter() {
            zones
                .entry(name.to_string())
                .and_modify(|z| {
                    z.distance_m = z.distance_m.max(zone.distance_m);
                    z.max_half_width_m = z.max_half_width_m.max(zone.max_half_width_m);
                })
                .or_insert(*zone);
        }
    }
    HazardZoneResult { zones }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::concentration::ProfileSample;
    use dg_core::{Tolerances, nearly_equal};

    fn profile(points: &[(f64, f64)]) -> ConcentrationProfile {
        ConcentrationProfile::from_samples(
            points
                .iter()
                .map(|&(x, c)| ProfileSample {
                    x,
                    centerline_ppm: c,
                    half_width: 10.0,
                })
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn farthest_exceedance_not_first() {
        // Non-contiguous: exceeds, dips, exceeds again, decays.
        let p = profile(&[(1.0, 30.0), (2.0, 5.0), (3.0, 25.0), (4.0, 1.0)]);
        let limits = HazardLimits::new().with("L", 20.0).unwrap();
        let zones = extract_hazard_zones(&p, &limits);
        assert_eq!(zones.distance("L"), Some(3.0));
    }

    #[test]
    fn threshold_is_inclusive() {
        let p = profile(&[(1.0, 30.0), (2.0, 20.0), (3.0, 19.9)]);
        let limits = HazardLimits::new().with("L", 20.0).unwrap();
        assert_eq!(extract_hazard_zones(&p, &limits).distance("L"), Some(2.0));
    }

    #[test]
    fn never_exceeded_is_zero() {
        let p = profile(&[(1.0, 0.3), (2.0, 0.1)]);
        let limits = HazardLimits::aegl(Some(0.5), Some(2.0), Some(20.0)).unwrap();
        let zones = extract_hazard_zones(&p, &limits);
        assert_eq!(zones.len(), 3);
        for (_, z) in zones.iter() {
            assert_eq!(z.distance_m, 0.0);
            assert_eq!(z.max_half_width_m, 0.0);
        }
    }

    #[test]
    fn half_width_of_exceedance_region() {
        let p = profile(&[(1.0, 100.0)]);
        let limits = HazardLimits::new().with("L", 100.0 * (-0.5_f64).exp()).unwrap();
        let z = *extract_hazard_zones(&p, &limits).get("L").unwrap();
        // Gaussian falls to the limit exactly one half-width off axis.
        assert!(nearly_equal(z.max_half_width_m, 10.0, Tolerances::default()));
    }

    #[test]
    fn tiered_families_skip_missing_levels() {
        let l = HazardLimits::erpg(Some(1.0), None, Some(20.0))
            .unwrap()
            .with_idlh(Some(10.0))
            .unwrap();
        assert_eq!(l.len(), 3);
        assert_eq!(l.get("ERPG-1"), Some(1.0));
        assert_eq!(l.get("ERPG-2"), None);
        assert_eq!(l.get("IDLH"), Some(10.0));
        let pac = HazardLimits::pac(None, None, None).unwrap();
        assert!(pac.is_empty());
    }

    #[test]
    fn invalid_limits_rejected() {
        assert!(HazardLimits::new().with("bad", 0.0).is_err());
        assert!(HazardLimits::new().with("bad", f64::NAN).is_err());
        assert!(HazardLimits::aegl(Some(-1.0), None, None).is_err());
    }

    #[test]
    fn ppm_parsing() {
        assert_eq!(parse_ppm("30"), Some(30.0));
        assert_eq!(parse_ppm("30 ppm"), Some(30.0));
        assert_eq!(parse_ppm(" 2.5PPM "), Some(2.5));
        assert_eq!(parse_ppm("n/a"), None);
        assert_eq!(parse_ppm(""), None);
    }

    #[test]
    fn mass_threshold_conversion() {
        // 1 ppm of chlorine is about 2.9 mg/m³ at 25 °C.
        let ppm = parse_threshold("2.9 mg/m3", 70.91).unwrap();
        assert!((ppm - 1.0).abs() < 0.01);
        let ppm = parse_threshold("0.0029 mg/L", 70.91).unwrap();
        assert!((ppm - 1.0).abs() < 0.01);
        assert_eq!(parse_threshold("20 ppm", 70.91), Some(20.0));
        assert_eq!(parse_threshold("2.9 mg/m3", 0.0), None);
    }

    #[test]
    fn merge_takes_per_zone_maximum() {
        let limits = HazardLimits::new().with("L", 10.0).unwrap();
        let a = extract_hazard_zones(&profile(&[(1.0, 50.0), (5.0, 11.0)]), &limits);
        let b = extract_hazard_zones(&profile(&[(1.0, 50.0), (9.0, 12.0)]), &limits);
        let merged = merge_zones([&a, &b]);
        assert_eq!(merged.distance("L"), Some(9.0));
    }

    #[test]
    fn severity_order() {
        let p = profile(&[(1.0, 100.0)]);
        let limits = HazardLimits::aegl(Some(0.5), Some(2.0), Some(20.0)).unwrap();
        let zones = extract_hazard_zones(&p, &limits);
        let names: Vec<&str> = zones.by_severity().into_iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["AEGL-3", "AEGL-2", "AEGL-1"]);
    }
}
