//! Scenario runner shared by interactive views, reports and batch jobs
//!
//! Every caller goes through the same engine configuration, so a report
//! generated from captured parameters is identical to what the live view
//! showed for them.

use log::info;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::params::{NamedScenario, PlanParameters};
use crate::projection::{ProjectionConfig, ProjectionEngine, ProjectionSeries, SeriesSummary};
use crate::reduce::reduce_series;
use crate::tools::{PlanOutcome, Tool};

/// Projection of one named scenario
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioResult {
    pub name: String,
    pub series: ProjectionSeries,
    pub summary: SeriesSummary,
    pub effective_annual_return: Option<f64>,
}

/// Runner holding one projection configuration
///
/// # Example
/// ```ignore
/// let runner = ScenarioRunner::with_config(ProjectionConfig::monthly());
/// let live = runner.run_reduced(&params, 15);
/// let report = runner.run_reduced(&params, 15);
/// assert_eq!(live, report);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ScenarioRunner {
    engine: ProjectionEngine,
}

impl ScenarioRunner {
    /// Create runner with annual points
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: ProjectionConfig) -> Self {
        Self {
            engine: ProjectionEngine::new(config),
        }
    }

    /// Dense projection of one parameter set
    pub fn run(&self, params: &PlanParameters) -> ProjectionSeries {
        self.engine.project(params)
    }

    /// Projection reduced for display; the one path used by views and reports
    pub fn run_reduced(&self, params: &PlanParameters, desired_point_count: usize) -> ProjectionSeries {
        reduce_series(&self.run(params), desired_point_count)
    }

    /// Validate and evaluate a planning tool
    pub fn run_tool(&self, tool: &Tool) -> Result<PlanOutcome> {
        tool.validate()?;
        Ok(tool.evaluate(&self.engine))
    }

    /// Project many parameter sets in parallel; results keep input order
    pub fn run_batch(&self, params: &[PlanParameters]) -> Vec<ProjectionSeries> {
        params.par_iter().map(|p| self.engine.project(p)).collect()
    }

    /// Project named scenarios in parallel with their summaries
    pub fn run_scenarios(&self, scenarios: &[NamedScenario]) -> Vec<ScenarioResult> {
        info!("Running {} scenarios", scenarios.len());
        scenarios
            .par_iter()
            .map(|scenario| {
                let series = self.engine.project(&scenario.parameters);
                ScenarioResult {
                    name: scenario.name.clone(),
                    summary: series.summary(),
                    effective_annual_return: series.effective_annual_return(),
                    series,
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::{ContributionFrequency, InvestmentTerms, LoanTerms};
    use crate::schedule::PhaseTimeline;
    use crate::tools::CarReplacement;

    fn scenario(name: &str, rate: f64) -> NamedScenario {
        NamedScenario {
            name: name.to_string(),
            parameters: PlanParameters::new(
                PhaseTimeline::new(2, 1, 2, 15),
                LoanTerms::new(500_000.0, rate, 18),
                InvestmentTerms::new(500_000.0, 6.5).with_contribution(2_000.0, ContributionFrequency::Monthly),
            ),
        }
    }

    #[test]
    fn test_live_and_report_are_identical() {
        let params = scenario("base", 4.0).parameters;
        let live = ScenarioRunner::with_config(ProjectionConfig::monthly()).run_reduced(&params, 15);
        let report = ScenarioRunner::with_config(ProjectionConfig::monthly()).run_reduced(&params, 15);

        assert_eq!(live, report);
        assert_eq!(
            serde_json::to_string(&live).unwrap(),
            serde_json::to_string(&report).unwrap()
        );
    }

    #[test]
    fn test_batch_matches_sequential() {
        let runner = ScenarioRunner::new();
        let params: Vec<PlanParameters> = [2.0, 4.0, 6.0, 8.0]
            .iter()
            .map(|&rate| scenario("s", rate).parameters)
            .collect();

        let batch = runner.run_batch(&params);
        let sequential: Vec<ProjectionSeries> = params.iter().map(|p| runner.run(p)).collect();
        assert_eq!(batch, sequential);
    }

    #[test]
    fn test_run_tool_validates_first() {
        let runner = ScenarioRunner::new();
        let car = |cycle_years| {
            Tool::CarReplacement(CarReplacement {
                vehicle_price: 30_000.0,
                down_payment: 0.0,
                loan_rate_percent: 5.0,
                term_years: 5,
                cycle_years,
                residual_value_percent: 40.0,
            })
        };
        assert!(matches!(runner.run_tool(&car(4)), Ok(PlanOutcome::Amortization(_))));
        assert!(runner.run_tool(&car(u32::MAX)).is_err());
    }

    #[test]
    fn test_scenarios_keep_order_and_rank() {
        let runner = ScenarioRunner::new();
        let results = runner.run_scenarios(&[scenario("cheap", 2.0), scenario("dear", 8.0)]);
        assert_eq!(results[0].name, "cheap");
        assert_eq!(results[1].name, "dear");

        // A dearer loan leaves less at the end
        assert!(results[0].summary.final_net_worth > results[1].summary.final_net_worth);
    }
}
