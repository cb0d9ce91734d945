//! Loan, investment and plan parameter structures

use log::warn;
use serde::{Deserialize, Serialize};

use crate::calculators::{self, non_negative};
use crate::schedule::PhaseTimeline;

/// Terms of the loan financing a plan
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LoanTerms {
    /// Amount borrowed
    pub principal: f64,

    /// Nominal annual rate in percent (6.0 = 6%)
    pub annual_rate_percent: f64,

    /// Contractual tenor in years, covering grace, interest-only and amortizing phases
    pub term_years: u32,
}

impl LoanTerms {
    pub fn new(principal: f64, annual_rate_percent: f64, term_years: u32) -> Self {
        Self {
            principal,
            annual_rate_percent,
            term_years,
        }
    }

    /// A plan without borrowing
    pub fn none() -> Self {
        Self::default()
    }

    pub fn monthly_rate(&self) -> f64 {
        calculators::monthly_rate(self.annual_rate_percent)
    }

    /// Interest due each month while only interest is serviced
    pub fn interest_only_payment(&self) -> f64 {
        calculators::finite_or_zero(non_negative(self.principal) * self.monthly_rate())
    }

    pub fn is_empty(&self) -> bool {
        non_negative(self.principal) == 0.0
    }
}

/// How often accumulation contributions are paid in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContributionFrequency {
    /// Every month of the accumulation phase
    #[default]
    Monthly,
    /// First month of every accumulation year
    Annual,
}

impl ContributionFrequency {
    /// Whether the `month_in_phase`-th accumulation month (1-indexed) receives a contribution
    pub fn is_boundary(&self, month_in_phase: u32) -> bool {
        match self {
            ContributionFrequency::Monthly => month_in_phase >= 1,
            ContributionFrequency::Annual => month_in_phase % 12 == 1,
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "" | "monthly" | "m" => Some(ContributionFrequency::Monthly),
            "annual" | "yearly" | "a" | "y" => Some(ContributionFrequency::Annual),
            _ => None,
        }
    }
}

/// Terms of the invested sum
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct InvestmentTerms {
    /// Balance invested at the start of the projection
    pub principal: f64,

    /// Annual yield in percent
    pub annual_yield_percent: f64,

    /// Amount added on every accumulation contribution boundary
    #[serde(default)]
    pub periodic_contribution: f64,

    #[serde(default)]
    pub contribution_frequency: ContributionFrequency,
}

impl InvestmentTerms {
    pub fn new(principal: f64, annual_yield_percent: f64) -> Self {
        Self {
            principal,
            annual_yield_percent,
            periodic_contribution: 0.0,
            contribution_frequency: ContributionFrequency::Monthly,
        }
    }

    pub fn with_contribution(mut self, amount: f64, frequency: ContributionFrequency) -> Self {
        self.periodic_contribution = amount;
        self.contribution_frequency = frequency;
        self
    }

    pub fn monthly_yield_rate(&self) -> f64 {
        calculators::monthly_rate(self.annual_yield_percent)
    }
}

/// One complete parameter set: everything a projection depends on
///
/// This is the only thing worth persisting; a series is always recomputed
/// from it.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PlanParameters {
    pub timeline: PhaseTimeline,
    pub loan: LoanTerms,
    pub investment: InvestmentTerms,
}

impl PlanParameters {
    pub fn new(timeline: PhaseTimeline, loan: LoanTerms, investment: InvestmentTerms) -> Self {
        Self {
            timeline,
            loan,
            investment,
        }
    }

    /// Copy with every malformed amount or rate clamped to zero
    pub fn sanitized(&self) -> Self {
        Self {
            timeline: self.timeline,
            loan: LoanTerms {
                principal: clamp_field("loan.principal", self.loan.principal),
                annual_rate_percent: clamp_field(
                    "loan.annual_rate_percent",
                    self.loan.annual_rate_percent,
                ),
                term_years: self.loan.term_years,
            },
            investment: InvestmentTerms {
                principal: clamp_field("investment.principal", self.investment.principal),
                annual_yield_percent: clamp_field(
                    "investment.annual_yield_percent",
                    self.investment.annual_yield_percent,
                ),
                periodic_contribution: clamp_field(
                    "investment.periodic_contribution",
                    self.investment.periodic_contribution,
                ),
                contribution_frequency: self.investment.contribution_frequency,
            },
        }
    }
}

fn clamp_field(field: &str, value: f64) -> f64 {
    let clamped = non_negative(value);
    if clamped != value && value != 0.0 {
        warn!("{} = {} is not a non-negative number, using 0", field, value);
    }
    clamped
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_loan_payments() {
        let loan = LoanTerms::new(240_000.0, 6.0, 30);
        assert_relative_eq!(loan.interest_only_payment(), 1_200.0, max_relative = 1e-12);
        assert!(LoanTerms::none().is_empty());
    }

    #[test]
    fn test_contribution_boundaries() {
        let annual = ContributionFrequency::Annual;
        assert!(annual.is_boundary(1));
        assert!(!annual.is_boundary(2));
        assert!(!annual.is_boundary(12));
        assert!(annual.is_boundary(13));

        assert!((1..=24).all(|m| ContributionFrequency::Monthly.is_boundary(m)));
    }

    #[test]
    fn test_parse_frequency() {
        assert_eq!(ContributionFrequency::parse("Annual"), Some(ContributionFrequency::Annual));
        assert_eq!(ContributionFrequency::parse(""), Some(ContributionFrequency::Monthly));
        assert_eq!(ContributionFrequency::parse("weekly"), None);
    }

    #[test]
    fn test_sanitized_clamps_malformed_values() {
        let params = PlanParameters::new(
            PhaseTimeline::new(0, 1, 0, 5),
            LoanTerms::new(-10.0, f64::NAN, 6),
            InvestmentTerms::new(50_000.0, -2.0).with_contribution(f64::INFINITY, ContributionFrequency::Annual),
        );
        let clean = params.sanitized();
        assert_eq!(clean.loan.principal, 0.0);
        assert_eq!(clean.loan.annual_rate_percent, 0.0);
        assert_eq!(clean.investment.principal, 50_000.0);
        assert_eq!(clean.investment.annual_yield_percent, 0.0);
        assert_eq!(clean.investment.periodic_contribution, 0.0);
        assert_eq!(clean.timeline, params.timeline);
    }
}
