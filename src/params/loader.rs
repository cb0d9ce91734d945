//! Load stored parameter sets from scenarios.csv or a JSON file
//!
//! Only raw parameters are stored. Validation of user-entered values happens
//! here, before anything reaches the engine.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use log::{debug, info};
use serde::{Deserialize, Serialize};

use super::{ContributionFrequency, InvestmentTerms, LoanTerms, PlanParameters};
use crate::error::{PlanError, Result};
use crate::schedule::PhaseTimeline;

/// Default location of the scenario file
pub const DEFAULT_SCENARIOS_PATH: &str = "data/scenarios.csv";

/// Longest plan, loan tenor or horizon accepted from user input, in years
pub const MAX_PLAN_YEARS: u32 = 200;

/// A stored parameter set with a display name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedScenario {
    pub name: String,
    pub parameters: PlanParameters,
}

/// Raw CSV row matching the scenarios.csv columns
#[derive(Debug, Deserialize)]
struct CsvRow {
    name: String,
    accumulation_years: Option<u32>,
    grace_years: Option<u32>,
    interest_only_years: Option<u32>,
    /// Empty means "rest of the loan tenor"
    amortizing_years: Option<u32>,
    loan_principal: Option<f64>,
    loan_rate_percent: Option<f64>,
    loan_term_years: Option<u32>,
    invested_principal: Option<f64>,
    yield_percent: Option<f64>,
    contribution: Option<f64>,
    #[serde(default)]
    contribution_frequency: String,
}

impl CsvRow {
    fn into_scenario(self) -> Result<NamedScenario> {
        let frequency = ContributionFrequency::parse(&self.contribution_frequency).ok_or_else(|| {
            PlanError::invalid(
                "contribution_frequency",
                format!("unknown frequency '{}' in scenario '{}'", self.contribution_frequency, self.name),
            )
        })?;

        let loan = LoanTerms::new(
            self.loan_principal.unwrap_or(0.0),
            self.loan_rate_percent.unwrap_or(0.0),
            self.loan_term_years.unwrap_or(0),
        );
        let accumulation = self.accumulation_years.unwrap_or(0);
        let grace = self.grace_years.unwrap_or(0);
        let interest_only = self.interest_only_years.unwrap_or(0);
        let timeline = match self.amortizing_years {
            Some(amortizing) => PhaseTimeline::new(accumulation, grace, interest_only, amortizing),
            None => PhaseTimeline::for_loan_tenor(accumulation, grace, interest_only, &loan),
        };
        let investment = InvestmentTerms::new(
            self.invested_principal.unwrap_or(0.0),
            self.yield_percent.unwrap_or(0.0),
        )
        .with_contribution(self.contribution.unwrap_or(0.0), frequency);

        let scenario = NamedScenario {
            name: self.name,
            parameters: PlanParameters::new(timeline, loan, investment),
        };
        validate(&scenario)?;
        Ok(scenario)
    }
}

/// Reject values the engine would otherwise silently clamp
pub fn validate(scenario: &NamedScenario) -> Result<()> {
    validate_parameters(&scenario.name, &scenario.parameters)
}

/// Check a non-negative finite amount
pub fn validate_amount(field: &str, value: f64, context: &str) -> Result<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(PlanError::invalid(
            field,
            format!("{} in {} must be a non-negative number", value, context),
        ));
    }
    Ok(())
}

/// Check a year count against [`MAX_PLAN_YEARS`]
pub fn validate_years(field: &str, years: u32, context: &str) -> Result<()> {
    if years > MAX_PLAN_YEARS {
        return Err(PlanError::invalid(
            field,
            format!("{} years in {} exceeds the {}-year limit", years, context, MAX_PLAN_YEARS),
        ));
    }
    Ok(())
}

/// Validate a parameter set entered under `name`
pub fn validate_parameters(name: &str, p: &PlanParameters) -> Result<()> {
    let context = format!("scenario '{}'", name);
    let amounts = [
        ("loan_principal", p.loan.principal),
        ("loan_rate_percent", p.loan.annual_rate_percent),
        ("invested_principal", p.investment.principal),
        ("yield_percent", p.investment.annual_yield_percent),
        ("contribution", p.investment.periodic_contribution),
    ];
    for (field, value) in amounts {
        validate_amount(field, value, &context)?;
    }
    validate_years("loan_term_years", p.loan.term_years, &context)?;
    validate_years("timeline", p.timeline.total_years(), &context)?;
    if !p.loan.is_empty() && p.loan.term_years == 0 {
        return Err(PlanError::invalid(
            "loan_term_years",
            format!("{} borrows but has a zero-year term", context),
        ));
    }
    Ok(())
}

/// Read scenarios from any CSV source
pub fn read_scenarios_csv<R: Read>(reader: R) -> Result<Vec<NamedScenario>> {
    let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);

    let mut scenarios = Vec::new();
    for result in reader.deserialize() {
        let row: CsvRow = result?;
        scenarios.push(row.into_scenario()?);
    }
    Ok(scenarios)
}

/// Load scenarios from a CSV file
pub fn load_scenarios_csv(path: &Path) -> Result<Vec<NamedScenario>> {
    let file = File::open(path)?;
    let scenarios = read_scenarios_csv(file)?;
    info!("Loaded {} scenarios from {}", scenarios.len(), path.display());
    Ok(scenarios)
}

/// Load scenarios from the default scenarios.csv
pub fn load_default_scenarios() -> Result<Vec<NamedScenario>> {
    load_scenarios_csv(Path::new(DEFAULT_SCENARIOS_PATH))
}

/// Load scenarios from a JSON array of `{ name, parameters }`
pub fn load_scenarios_json(path: &Path) -> Result<Vec<NamedScenario>> {
    let file = File::open(path)?;
    let scenarios: Vec<NamedScenario> = serde_json::from_reader(file)?;
    for scenario in &scenarios {
        validate(scenario)?;
    }
    debug!("Loaded {} scenarios from {}", scenarios.len(), path.display());
    Ok(scenarios)
}

/// Load a single parameter set stored as JSON
pub fn load_parameters_json(path: &Path) -> Result<PlanParameters> {
    let file = File::open(path)?;
    let parameters: PlanParameters = serde_json::from_reader(file)?;
    validate(&NamedScenario {
        name: path.display().to_string(),
        parameters,
    })?;
    Ok(parameters)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCENARIOS: &str = "\
name,accumulation_years,grace_years,interest_only_years,amortizing_years,loan_principal,loan_rate_percent,loan_term_years,invested_principal,yield_percent,contribution,contribution_frequency
equity release,0,0,5,,1000000,6,30,1000000,7,,
student loan,4,1,0,10,40000,2.5,15,0,6,10000,annual
";

    #[test]
    fn test_read_csv() {
        let scenarios = read_scenarios_csv(SCENARIOS.as_bytes()).unwrap();
        assert_eq!(scenarios.len(), 2);

        let release = &scenarios[0];
        assert_eq!(release.name, "equity release");
        // Amortizing years derived from the tenor: 30 - 5 interest-only
        assert_eq!(release.parameters.timeline, PhaseTimeline::new(0, 0, 5, 25));
        assert_eq!(release.parameters.investment.periodic_contribution, 0.0);

        let student = &scenarios[1];
        assert_eq!(student.parameters.timeline, PhaseTimeline::new(4, 1, 0, 10));
        assert_eq!(
            student.parameters.investment.contribution_frequency,
            ContributionFrequency::Annual
        );
        assert_eq!(student.parameters.investment.periodic_contribution, 10_000.0);
    }

    #[test]
    fn test_rejects_unknown_frequency() {
        let csv = "name,contribution_frequency\nbad,fortnightly\n";
        let err = read_scenarios_csv(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, PlanError::InvalidParameter { ref field, .. } if field == "contribution_frequency"));
    }

    #[test]
    fn test_rejects_negative_amounts() {
        let csv = "name,loan_principal,loan_term_years\nbad,-5,10\n";
        let err = read_scenarios_csv(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, PlanError::InvalidParameter { ref field, .. } if field == "loan_principal"));
    }

    #[test]
    fn test_rejects_loan_without_term() {
        let csv = "name,loan_principal\nbad,5000\n";
        assert!(read_scenarios_csv(csv.as_bytes()).is_err());
    }

    #[test]
    fn test_rejects_overlong_timeline() {
        let csv = "name,accumulation_years,amortizing_years\nbad,150,100\n";
        let err = read_scenarios_csv(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, PlanError::InvalidParameter { ref field, .. } if field == "timeline"));

        let loan = LoanTerms::new(10_000.0, 5.0, u32::MAX);
        let params = PlanParameters::new(PhaseTimeline::new(0, 0, 0, 10), loan, InvestmentTerms::default());
        assert!(validate_parameters("flags", &params).is_err());
        assert!(validate_parameters("flags", &PlanParameters::default()).is_ok());
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = load_scenarios_csv(Path::new("does/not/exist.csv")).unwrap_err();
        assert!(matches!(err, PlanError::Io(_)));
    }
}
