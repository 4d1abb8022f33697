//! VNAV profile inspector.
//!
//! Builds the vertical path for a lateral plan scenario and prints the
//! resulting per-leg profile.
//!
//! Usage:
//!   cargo run -p vnav-cli --bin vnav-profile -- --scenario ils-missed
//!   cargo run -p vnav-cli --bin vnav-profile -- --file plan.json --json

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use vnav_cli::{builtin_scenario, render_table, run_scenario, Config, Scenario, BUILTIN_SCENARIOS};

/// VNAV profile inspector
#[derive(Parser, Debug)]
#[command(author, version, about = "Build and print a VNAV vertical profile")]
struct Args {
    /// Built-in scenario to run
    #[arg(long, default_value = "ils-missed")]
    scenario: String,

    /// JSON scenario file (takes precedence over --scenario)
    #[arg(long)]
    file: Option<PathBuf>,

    /// List built-in scenarios and exit
    #[arg(long)]
    list: bool,

    /// Print the profile as JSON instead of a table
    #[arg(long)]
    json: bool,

    /// Emit logs as JSON
    #[arg(long)]
    log_json: bool,

    /// Indicated altitude in feet
    #[arg(long)]
    altitude_ft: Option<f64>,

    /// Activate a vertical direct to this global leg index
    #[arg(long)]
    vertical_direct: Option<usize>,

    /// Distance flown along the active leg in meters
    #[arg(long)]
    along_leg_m: Option<f64>,

    /// Pin a pilot flight path angle on the active constraint
    #[arg(long)]
    fpa: Option<f64>,
}

fn init_tracing(json: bool) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive("vnav_cli=info".parse()?)
        .add_directive("vnav_core=info".parse()?);

    if json {
        tracing_subscriber::registry()
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .with(filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .with(filter)
            .init();
    }
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.log_json)?;

    if args.list {
        for name in BUILTIN_SCENARIOS {
            if let Some(scenario) = builtin_scenario(name) {
                println!("{:<16} {}", name, scenario.description);
            }
        }
        return Ok(());
    }

    let mut scenario = match &args.file {
        Some(path) => Scenario::load(path)?,
        None => builtin_scenario(&args.scenario).ok_or_else(|| {
            anyhow::anyhow!(
                "Unknown scenario '{}' (available: {})",
                args.scenario,
                BUILTIN_SCENARIOS.join(", ")
            )
        })?,
    };

    if args.altitude_ft.is_some() {
        scenario.altitude_ft = args.altitude_ft;
    }
    if args.vertical_direct.is_some() {
        scenario.vertical_direct_leg = args.vertical_direct;
    }
    if args.along_leg_m.is_some() {
        scenario.along_leg_m = args.along_leg_m;
    }
    if args.fpa.is_some() {
        scenario.pilot_fpa_deg = args.fpa;
    }

    let config = Config::from_env().vnav_config(scenario.config.as_ref())?;
    tracing::info!(
        "Running scenario {} (default FPA {:.1}, max {:.1})",
        scenario.name,
        config.default_fpa_deg,
        config.max_fpa_deg
    );

    let report = run_scenario(&scenario, config)?;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", render_table(&report));
    }

    Ok(())
}
