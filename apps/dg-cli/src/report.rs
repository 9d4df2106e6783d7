//! Text and CSV rendering of run results.

use dg_core::METERS_TO_MILES;
use dg_heavygas::{ConcentrationProfile, FootprintGrid, HazardZoneResult, Trajectory};
use std::fmt::Write;

pub fn trajectory_csv(trajectory: &Trajectory) -> String {
    let mut csv = String::from("x_m,sz_m,beff_m,tc_k,flux_kgps\n");
    for s in trajectory.samples() {
        let st = &s.state;
        let _ = writeln!(csv, "{},{},{},{},{}", s.x, st.sz, st.beff, st.tc, st.flux);
    }
    csv
}

pub fn profile_csv(profile: &ConcentrationProfile) -> String {
    let mut csv = String::from("x_m,centerline_ppm,half_width_m\n");
    for s in profile.samples() {
        let _ = writeln!(csv, "{},{},{}", s.x, s.centerline_ppm, s.half_width);
    }
    csv
}

/// Long-format grid: one row per `(x, y)` point.
pub fn footprint_csv(grid: &FootprintGrid) -> String {
    let mut csv = String::from("x_m,y_m,ppm\n");
    for (j, y) in grid.y.iter().enumerate() {
        for (i, x) in grid.x.iter().enumerate() {
            let _ = writeln!(csv, "{},{},{}", x, y, grid.ppm[j][i]);
        }
    }
    csv
}

/// Zone table, most severe threshold first.
pub fn zone_table(zones: &HazardZoneResult) -> String {
    let mut out = format!(
        "  {:<12} {:>10} {:>12} {:>10} {:>14}\n",
        "zone", "ppm", "distance_m", "miles", "half_width_m"
    );
    for (name, zone) in zones.by_severity() {
        let _ = writeln!(
            out,
            "  {:<12} {:>10.3} {:>12.1} {:>10.3} {:>14.1}",
            name,
            zone.threshold_ppm,
            zone.distance_m,
            zone.distance_m * METERS_TO_MILES,
            zone.max_half_width_m
        );
    }
    out
}
