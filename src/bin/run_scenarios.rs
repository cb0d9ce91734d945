//! Run every scenario in a scenarios.csv file
//!
//! Outputs one summary row per scenario for comparison across plans

use std::fs::File;
use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;

use cashflow_planner::params::loader::{load_scenarios_csv, DEFAULT_SCENARIOS_PATH};
use cashflow_planner::{report, ProjectionConfig, Resolution, ScenarioRunner};

#[derive(Parser)]
#[command(name = "run_scenarios", about = "Project every scenario in a CSV file")]
struct Args {
    /// Scenario file
    #[arg(long, default_value = DEFAULT_SCENARIOS_PATH)]
    input: PathBuf,

    /// Summary output file
    #[arg(long, default_value = "scenario_summary.csv")]
    output: PathBuf,

    /// Project monthly points instead of annual ones
    #[arg(long)]
    monthly: bool,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let start = Instant::now();
    println!("Loading scenarios from {}...", args.input.display());
    let scenarios = load_scenarios_csv(&args.input)
        .with_context(|| format!("Failed to load scenarios from {}", args.input.display()))?;
    println!("Loaded {} scenarios in {:?}", scenarios.len(), start.elapsed());

    let config = ProjectionConfig {
        resolution: if args.monthly { Resolution::Monthly } else { Resolution::Annual },
        horizon_years: None,
    };
    let runner = ScenarioRunner::with_config(config);

    let proj_start = Instant::now();
    let results = runner.run_scenarios(&scenarios);
    println!("Projections complete in {:?}", proj_start.elapsed());

    let file = File::create(&args.output)
        .with_context(|| format!("Failed to create {}", args.output.display()))?;
    report::write_summary_csv(&results, file)?;
    println!("Output written to {}", args.output.display());

    println!("\nScenario Summary:");
    println!("{:<28} {:>8} {:>16} {:>16} {:>10}", "Scenario", "Periods", "Final NW", "Min NW", "Return");
    println!("{}", "-".repeat(82));
    for result in &results {
        let s = &result.summary;
        let ret = result
            .effective_annual_return
            .map(|r| format!("{:.2}%", r * 100.0))
            .unwrap_or_else(|| "n/a".to_string());
        println!(
            "{:<28} {:>8} {:>16.2} {:>16.2} {:>10}",
            result.name, s.total_periods, s.final_net_worth, s.min_net_worth, ret
        );
        if let Some(period) = s.shortfall_period {
            println!("  shortfall: invested value negative from period {}", period);
        }
    }

    println!("\nTotal time: {:?}", start.elapsed());
    Ok(())
}
