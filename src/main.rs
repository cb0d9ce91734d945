//! Cashflow Planner CLI
//!
//! Command-line interface for projecting financing plans

use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};

use cashflow_planner::params::loader::{load_parameters_json, validate_parameters, validate_years};
use cashflow_planner::{
    amortized_payment, periodic_income, remaining_balance, report,
    ContributionFrequency, InvestmentTerms, LoanTerms, PhaseTimeline, PlanOutcome, PlanParameters,
    ProjectionConfig, Resolution, ScenarioRunner, Tool, DEFAULT_POINT_COUNT,
};

/// Multi-phase amortization and cash-flow projection
#[derive(Parser)]
#[command(name = "cashflow-planner", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Monthly installment of a fully amortizing loan
    Payment {
        #[arg(long)]
        principal: f64,
        /// Annual rate in percent
        #[arg(long)]
        rate: f64,
        #[arg(long)]
        term_years: f64,
    },
    /// Outstanding principal after some years of repayment
    Balance {
        #[arg(long)]
        principal: f64,
        #[arg(long)]
        rate: f64,
        #[arg(long)]
        term_years: f64,
        #[arg(long)]
        elapsed_years: f64,
    },
    /// Monthly income from an invested sum
    Income {
        #[arg(long)]
        principal: f64,
        /// Annual yield in percent
        #[arg(long = "yield")]
        yield_percent: f64,
    },
    /// Project a parameter set
    Project(ProjectArgs),
    /// Evaluate a planning tool described in a JSON file
    Tool {
        #[arg(long)]
        input: PathBuf,
        #[command(flatten)]
        output: OutputArgs,
    },
}

#[derive(Args)]
struct ProjectArgs {
    /// JSON parameter set; overrides the individual flags
    #[arg(long)]
    input: Option<PathBuf>,

    #[arg(long, default_value_t = 0)]
    accumulation_years: u32,
    #[arg(long, default_value_t = 0)]
    grace_years: u32,
    #[arg(long, default_value_t = 0)]
    interest_only_years: u32,
    /// Defaults to the rest of the loan tenor
    #[arg(long)]
    amortizing_years: Option<u32>,

    #[arg(long, default_value_t = 0.0)]
    loan_principal: f64,
    #[arg(long, default_value_t = 0.0)]
    loan_rate: f64,
    #[arg(long, default_value_t = 0)]
    loan_term_years: u32,

    #[arg(long, default_value_t = 0.0)]
    invested: f64,
    #[arg(long = "yield", default_value_t = 0.0)]
    yield_percent: f64,
    #[arg(long, default_value_t = 0.0)]
    contribution: f64,
    /// Pay contributions once a year instead of monthly
    #[arg(long)]
    annual_contributions: bool,

    #[command(flatten)]
    output: OutputArgs,
}

impl ProjectArgs {
    fn parameters(&self) -> Result<PlanParameters> {
        if let Some(path) = &self.input {
            return load_parameters_json(path)
                .with_context(|| format!("Failed to load parameters from {}", path.display()));
        }

        let loan = LoanTerms::new(self.loan_principal, self.loan_rate, self.loan_term_years);
        let timeline = match self.amortizing_years {
            Some(years) => PhaseTimeline::new(
                self.accumulation_years,
                self.grace_years,
                self.interest_only_years,
                years,
            ),
            None => PhaseTimeline::for_loan_tenor(
                self.accumulation_years,
                self.grace_years,
                self.interest_only_years,
                &loan,
            ),
        };
        let frequency = if self.annual_contributions {
            ContributionFrequency::Annual
        } else {
            ContributionFrequency::Monthly
        };
        let investment = InvestmentTerms::new(self.invested, self.yield_percent)
            .with_contribution(self.contribution, frequency);

        let params = PlanParameters::new(timeline, loan, investment);
        validate_parameters("command line", &params).context("Invalid projection flags")?;
        Ok(params)
    }
}

#[derive(Args)]
struct OutputArgs {
    #[arg(long, value_enum, default_value = "annual")]
    resolution: ResolutionArg,

    /// Project at least this many years
    #[arg(long)]
    horizon_years: Option<u32>,

    /// Approximate number of points after reduction
    #[arg(long, default_value_t = DEFAULT_POINT_COUNT)]
    points: usize,

    /// Emit every period instead of a reduced series
    #[arg(long)]
    dense: bool,

    #[arg(long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Write to a file instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,
}

impl OutputArgs {
    fn runner(&self) -> Result<ScenarioRunner> {
        if let Some(years) = self.horizon_years {
            validate_years("horizon_years", years, "command line")?;
        }
        let resolution = match self.resolution {
            ResolutionArg::Monthly => Resolution::Monthly,
            ResolutionArg::Annual => Resolution::Annual,
        };
        Ok(ScenarioRunner::with_config(ProjectionConfig {
            resolution,
            horizon_years: self.horizon_years,
        }))
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ResolutionArg {
    Monthly,
    Annual,
}

#[derive(Debug, Clone, Copy, PartialEq, ValueEnum)]
enum OutputFormat {
    Json,
    Csv,
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    match cli.command {
        Command::Payment { principal, rate, term_years } => {
            println!("{:.2}", amortized_payment(principal, rate, term_years));
        }
        Command::Balance { principal, rate, term_years, elapsed_years } => {
            println!("{:.2}", remaining_balance(principal, rate, term_years, elapsed_years));
        }
        Command::Income { principal, yield_percent } => {
            println!("{:.2}", periodic_income(principal, yield_percent));
        }
        Command::Project(args) => run_project(&args)?,
        Command::Tool { input, output } => run_tool(&input, &output)?,
    }
    Ok(())
}

fn run_project(args: &ProjectArgs) -> Result<()> {
    let params = args.parameters()?;
    let runner = args.output.runner()?;
    let series = if args.output.dense {
        runner.run(&params)
    } else {
        runner.run_reduced(&params, args.output.points)
    };

    match (args.output.format, &args.output.output) {
        (OutputFormat::Csv, Some(path)) => report::write_series_csv_file(&series, path)?,
        (OutputFormat::Csv, None) => report::write_series_csv(&series, io::stdout().lock())?,
        (OutputFormat::Json, target) => emit(&report::to_json(&series)?, target.as_ref())?,
    }
    Ok(())
}

fn run_tool(input: &Path, output: &OutputArgs) -> Result<()> {
    let file = File::open(input).with_context(|| format!("Failed to open {}", input.display()))?;
    let tool: Tool = serde_json::from_reader(file)
        .with_context(|| format!("Failed to parse tool description in {}", input.display()))?;

    let outcome = output
        .runner()?
        .run_tool(&tool)
        .with_context(|| format!("Invalid tool parameters in {}", input.display()))?;
    let outcome = if output.dense {
        outcome
    } else {
        outcome.reduced(output.points)
    };

    if output.format == OutputFormat::Csv {
        match &outcome {
            PlanOutcome::Combined(series) => {
                return match &output.output {
                    Some(path) => Ok(report::write_series_csv_file(series, path)?),
                    None => Ok(report::write_series_csv(series, io::stdout().lock())?),
                };
            }
            _ => anyhow::bail!("CSV output is only available for combined projections"),
        }
    }

    emit(&report::to_json(&outcome)?, output.output.as_ref())
}

fn emit(text: &str, target: Option<&PathBuf>) -> Result<()> {
    match target {
        Some(path) => fs::write(path, text).with_context(|| format!("Failed to write {}", path.display())),
        None => {
            println!("{}", text);
            Ok(())
        }
    }
}
