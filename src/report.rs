//! Report output: projection series as CSV or JSON

use std::fs::File;
use std::io::Write;
use std::path::Path;

use log::info;
use serde::Serialize;

use crate::error::Result;
use crate::projection::ProjectionSeries;
use crate::scenario::ScenarioResult;

/// Write every point of a series as a CSV row
pub fn write_series_csv<W: Write>(series: &ProjectionSeries, writer: W) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    for point in series.points() {
        wtr.serialize(point)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_series_csv_file(series: &ProjectionSeries, path: &Path) -> Result<()> {
    write_series_csv(series, File::create(path)?)?;
    info!("Wrote {} points to {}", series.len(), path.display());
    Ok(())
}

/// Pretty JSON for any report payload (series, outcome, results)
pub fn to_json<T: Serialize>(value: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

/// Flattened row of the batch summary report
#[derive(Debug, Serialize)]
struct SummaryRow<'a> {
    name: &'a str,
    periods: u32,
    total_outflow: f64,
    total_yield_income: f64,
    total_contributions: f64,
    final_invested_value: f64,
    final_liability: f64,
    final_net_worth: f64,
    min_net_worth: f64,
    shortfall_period: Option<u32>,
    effective_annual_return: Option<f64>,
}

/// One CSV row per scenario with its summary figures
pub fn write_summary_csv<W: Write>(results: &[ScenarioResult], writer: W) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    for result in results {
        let s = &result.summary;
        wtr.serialize(SummaryRow {
            name: &result.name,
            periods: s.total_periods,
            total_outflow: s.total_outflow,
            total_yield_income: s.total_yield_income,
            total_contributions: s.total_contributions,
            final_invested_value: s.final_invested_value,
            final_liability: s.final_liability,
            final_net_worth: s.final_net_worth,
            min_net_worth: s.min_net_worth,
            shortfall_period: s.shortfall_period,
            effective_annual_return: result.effective_annual_return,
        })?;
    }
    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::{InvestmentTerms, LoanTerms, NamedScenario, PlanParameters};
    use crate::projection::project_series;
    use crate::scenario::ScenarioRunner;
    use crate::schedule::PhaseTimeline;

    fn series() -> ProjectionSeries {
        project_series(
            &PhaseTimeline::new(0, 1, 0, 4),
            &LoanTerms::new(100_000.0, 3.0, 5),
            &InvestmentTerms::new(100_000.0, 5.0),
        )
    }

    #[test]
    fn test_series_csv() {
        let mut out = Vec::new();
        write_series_csv(&series(), &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 6);
        assert!(lines[0].starts_with("period_index,phase,invested_value,remaining_liability"));
        assert!(lines[1].starts_with("1,Grace,"));
        assert!(lines[5].starts_with("5,Amortizing,"));
    }

    #[test]
    fn test_series_json() {
        let json = to_json(&series()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["resolution"], "annual");
        assert_eq!(value["opening_liability"], 100_000.0);
        let points = value["points"].as_array().unwrap();
        assert_eq!(points.len(), 5);
        assert_eq!(points[0]["phase"], "Grace");
        assert_eq!(points[4]["remaining_liability"], 0.0);
    }

    #[test]
    fn test_summary_csv() {
        let scenarios = vec![NamedScenario {
            name: "bridge".to_string(),
            parameters: PlanParameters::new(
                PhaseTimeline::new(0, 1, 0, 4),
                LoanTerms::new(100_000.0, 3.0, 5),
                InvestmentTerms::new(100_000.0, 5.0),
            ),
        }];
        let results = ScenarioRunner::new().run_scenarios(&scenarios);

        let mut out = Vec::new();
        write_summary_csv(&results, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let mut lines = text.lines();
        assert!(lines.next().unwrap().starts_with("name,periods,total_outflow"));
        assert!(lines.next().unwrap().starts_with("bridge,5,"));
        assert!(lines.next().is_none());
    }
}
