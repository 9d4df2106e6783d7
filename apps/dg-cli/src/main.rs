mod error;
mod report;

use clap::{Parser, Subcommand};
use dg_atmos::StabilityClass;
use dg_heavygas::{HeavyGasInput, assess, assess_batch, merge_zones};
use dg_project::{Scenario, SourceDef};
use error::{CliError, CliResult};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "dg-cli")]
#[command(about = "densegas CLI - heavy-gas dispersion and hazard zones", long_about = None)]
struct Cli {
    /// Log integrator and source details (overrides RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate scenario file syntax and values
    Validate {
        /// Path to the scenario YAML or JSON file
        scenario_path: PathBuf,
    },
    /// Run every source and print hazard-zone distances
    Run {
        /// Path to the scenario YAML or JSON file
        scenario_path: PathBuf,
    },
    /// Run one source under all six stability classes
    Sweep {
        /// Path to the scenario YAML or JSON file
        scenario_path: PathBuf,
        /// Source ID (defaults to the first source)
        #[arg(long)]
        source: Option<String>,
    },
    /// Export the (x, Sz, Beff, Tc, flux) trajectory as CSV
    ExportTrajectory {
        scenario_path: PathBuf,
        #[arg(long)]
        source: Option<String>,
        /// Output CSV file path (optional, defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Export the centerline concentration profile as CSV
    ExportProfile {
        scenario_path: PathBuf,
        #[arg(long)]
        source: Option<String>,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Export the crosswind concentration footprint as CSV
    ExportFootprint {
        scenario_path: PathBuf,
        #[arg(long)]
        source: Option<String>,
        /// Half-extent of the crosswind grid (m)
        #[arg(long, default_value_t = 500.0)]
        y_max: f64,
        /// Number of crosswind grid points
        #[arg(long, default_value_t = 101)]
        ny: usize,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> CliResult<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Validate { scenario_path } => cmd_validate(&scenario_path),
        Commands::Run { scenario_path } => cmd_run(&scenario_path),
        Commands::Sweep {
            scenario_path,
            source,
        } => cmd_sweep(&scenario_path, source.as_deref()),
        Commands::ExportTrajectory {
            scenario_path,
            source,
            output,
        } => cmd_export(&scenario_path, source.as_deref(), output.as_deref(), |input| {
            let run = dg_heavygas::run(input)?;
            Ok(report::trajectory_csv(&run.trajectory))
        }),
        Commands::ExportProfile {
            scenario_path,
            source,
            output,
        } => cmd_export(&scenario_path, source.as_deref(), output.as_deref(), |input| {
            let profile = dg_heavygas::run(input)?.trajectory.concentration_profile()?;
            Ok(report::profile_csv(&profile))
        }),
        Commands::ExportFootprint {
            scenario_path,
            source,
            y_max,
            ny,
            output,
        } => cmd_export(&scenario_path, source.as_deref(), output.as_deref(), |input| {
            let profile = dg_heavygas::run(input)?.trajectory.concentration_profile()?;
            Ok(report::footprint_csv(&profile.footprint_grid(y_max, ny)?))
        }),
    }
}

fn select_source<'a>(scenario: &'a Scenario, id: Option<&str>) -> CliResult<&'a SourceDef> {
    match id {
        Some(id) => scenario
            .sources
            .iter()
            .find(|s| s.id == id)
            .ok_or_else(|| CliError::SourceNotFound(id.to_string())),
        None => scenario
            .sources
            .first()
            .ok_or_else(|| CliError::SourceNotFound("<none>".to_string())),
    }
}

fn cmd_validate(scenario_path: &Path) -> CliResult<()> {
    println!("Validating scenario: {}", scenario_path.display());
    let scenario = dg_project::load(scenario_path)?;
    scenario.inputs()?;
    scenario.hazard_limits()?;
    println!(
        "✓ Scenario is valid ({} sources, stability {})",
        scenario.sources.len(),
        scenario.stability
    );
    Ok(())
}

fn cmd_run(scenario_path: &Path) -> CliResult<()> {
    let scenario = dg_project::load(scenario_path)?;
    let limits = scenario.hazard_limits()?;
    let inputs = scenario.inputs()?;
    println!("Running scenario: {}", scenario.name);

    let started = Instant::now();
    let batch: Vec<HeavyGasInput> = inputs.iter().map(|(_, i)| i.clone()).collect();
    let results = assess_batch(&batch, &limits);

    let mut zones = Vec::with_capacity(results.len());
    for ((id, _), result) in inputs.iter().zip(results) {
        let out = result?;
        let src = &out.run.secondary_source;
        println!("\nSource '{}'", id);
        println!(
            "  secondary source: radius {:.2} m, height {:.3} m{}",
            src.radius,
            src.height,
            if src.entrainment_fallback {
                " (fallback radius)"
            } else {
                ""
            }
        );
        if let Some(peak) = out.profile.peak() {
            println!(
                "  peak centerline: {:.3} ppm at {:.1} m",
                peak.centerline_ppm, peak.x
            );
        }
        print!("{}", report::zone_table(&out.zones));
        let stats = out.run.trajectory.stats();
        tracing::debug!(
            source = %id,
            accepted = stats.accepted,
            rejected = stats.rejected,
            rhs_evals = stats.rhs_evals,
            "integration statistics"
        );
        zones.push(out.zones);
    }

    if zones.len() > 1 {
        println!("\nAll sources (per-zone maximum)");
        print!("{}", report::zone_table(&merge_zones(&zones)));
    }
    println!("\n✓ Completed in {:.3}s", started.elapsed().as_secs_f64());
    Ok(())
}

fn cmd_sweep(scenario_path: &Path, source: Option<&str>) -> CliResult<()> {
    let scenario = dg_project::load(scenario_path)?;
    let limits = scenario.hazard_limits()?;
    let source = select_source(&scenario, source)?;
    let inputs = StabilityClass::ALL
        .iter()
        .map(|&class| scenario.source_input_with(source, class))
        .collect::<Result<Vec<_>, _>>()?;

    println!(
        "Stability sweep for source '{}' ({} kg/s)",
        source.id, source.release_rate_kgps
    );
    for (class, result) in StabilityClass::ALL.iter().zip(assess_batch(&inputs, &limits)) {
        match result {
            Ok(out) => {
                println!("\nClass {}", class);
                print!("{}", report::zone_table(&out.zones));
            }
            Err(e) => println!("\nClass {}: failed: {}", class, e),
        }
    }
    Ok(())
}

fn cmd_export(
    scenario_path: &Path,
    source: Option<&str>,
    output: Option<&Path>,
    render: impl Fn(&HeavyGasInput) -> CliResult<String>,
) -> CliResult<()> {
    let scenario = dg_project::load(scenario_path)?;
    let source = select_source(&scenario, source)?;
    let input = scenario.source_input(source)?;
    let csv = render(&input)?;

    if let Some(path) = output {
        std::fs::write(path, &csv)?;
        println!(
            "✓ Exported {} rows to {}",
            csv.lines().count().saturating_sub(1),
            path.display()
        );
    } else {
        print!("{}", csv);
    }
    Ok(())
}
