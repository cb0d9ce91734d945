//! Planning tools built on the shared projection engine
//!
//! Each tool only decides which parameters it feeds the engine and which
//! shape of result it hands back. Consumers match on [`PlanOutcome`] rather
//! than on the tool that produced it.

use serde::{Deserialize, Serialize};

use crate::calculators::{
    amortization_schedule, periodic_income, principal_for_income, remaining_balance,
    AmortizationRow, AmortizationSummary,
};
use crate::error::Result;
use crate::params::loader::{validate_amount, validate_parameters, validate_years};
use crate::params::{ContributionFrequency, InvestmentTerms, LoanTerms, PlanParameters};
use crate::projection::{ProjectionEngine, ProjectionSeries};
use crate::reduce::{reduce_points, reduce_series, reduction_step};
use crate::schedule::PhaseTimeline;

/// Result of evaluating a tool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PlanOutcome {
    /// Loan repayment only
    Amortization(AmortizationOutcome),
    /// Income from an invested sum only
    Income(IncomeOutcome),
    /// Asset, liability and cash flow together
    Combined(ProjectionSeries),
}

impl PlanOutcome {
    /// Same outcome with every series or schedule reduced for charting
    pub fn reduced(&self, desired_point_count: usize) -> Self {
        match self {
            PlanOutcome::Amortization(outcome) => {
                let step = reduction_step(outcome.schedule.len() as u32, desired_point_count);
                PlanOutcome::Amortization(AmortizationOutcome {
                    schedule: reduce_points(&outcome.schedule, step),
                    ..outcome.clone()
                })
            }
            PlanOutcome::Income(outcome) => PlanOutcome::Income(IncomeOutcome {
                series: reduce_series(&outcome.series, desired_point_count),
                ..outcome.clone()
            }),
            PlanOutcome::Combined(series) => PlanOutcome::Combined(reduce_series(series, desired_point_count)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmortizationOutcome {
    pub loan: LoanTerms,
    pub summary: AmortizationSummary,
    pub schedule: Vec<AmortizationRow>,
    /// Net cost of one ownership cycle, when the tool has one
    pub cycle_cost: Option<CycleCost>,
}

/// Cost of owning a financed asset for one replacement cycle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CycleCost {
    pub cycle_years: u32,
    pub down_payment: f64,
    pub installments_paid: f64,
    /// Loan still owed when the asset is replaced
    pub payoff_at_replacement: f64,
    pub resale_value: f64,
    pub net_cost: f64,
    pub monthly_cost: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncomeOutcome {
    /// Growth of the invested sum up to the income start
    pub series: ProjectionSeries,
    pub invested_at_start: f64,
    pub monthly_income: f64,
    pub target_monthly_income: f64,
    /// Target minus income; positive means a shortfall
    pub monthly_gap: f64,
    /// Invested sum needed to fund the target, `None` at zero yield
    pub required_principal: Option<f64>,
}

/// Borrow against a property and invest the proceeds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RealEstateLeverage {
    pub loan_amount: f64,
    pub loan_rate_percent: f64,
    pub term_years: u32,
    #[serde(default)]
    pub interest_only_years: u32,
    pub investment_yield_percent: f64,
    /// Own money invested alongside the loan proceeds
    #[serde(default)]
    pub own_capital: f64,
}

/// Borrow during study, invest the draws, repay after a grace period
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentLoanArbitrage {
    pub annual_draw: f64,
    pub study_years: u32,
    #[serde(default)]
    pub grace_years: u32,
    pub repayment_years: u32,
    pub loan_rate_percent: f64,
    pub investment_yield_percent: f64,
}

/// Finance a vehicle and replace it every few years
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CarReplacement {
    pub vehicle_price: f64,
    #[serde(default)]
    pub down_payment: f64,
    pub loan_rate_percent: f64,
    pub term_years: u32,
    pub cycle_years: u32,
    /// Resale value at replacement, as a percentage of the price
    #[serde(default)]
    pub residual_value_percent: f64,
}

/// Grow savings to retirement and compare their income to a target
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetirementGap {
    pub current_savings: f64,
    #[serde(default)]
    pub monthly_saving: f64,
    pub years_to_retirement: u32,
    pub investment_yield_percent: f64,
    pub target_monthly_income: f64,
}

/// A planning tool and its parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "tool", rename_all = "snake_case")]
pub enum Tool {
    RealEstateLeverage(RealEstateLeverage),
    StudentLoanArbitrage(StudentLoanArbitrage),
    CarReplacement(CarReplacement),
    RetirementGap(RetirementGap),
    /// Any parameter set projected as-is
    Custom(PlanParameters),
}

impl Tool {
    pub fn name(&self) -> &'static str {
        match self {
            Tool::RealEstateLeverage(_) => "real_estate_leverage",
            Tool::StudentLoanArbitrage(_) => "student_loan_arbitrage",
            Tool::CarReplacement(_) => "car_replacement",
            Tool::RetirementGap(_) => "retirement_gap",
            Tool::Custom(_) => "custom",
        }
    }

    /// Reject tool inputs outside what the engine can meaningfully project
    pub fn validate(&self) -> Result<()> {
        let context = format!("tool '{}'", self.name());
        match self {
            Tool::RealEstateLeverage(t) => {
                validate_amount("loan_amount", t.loan_amount, &context)?;
                validate_amount("own_capital", t.own_capital, &context)?;
            }
            Tool::StudentLoanArbitrage(t) => {
                validate_amount("annual_draw", t.annual_draw, &context)?;
                validate_years("study_years", t.study_years, &context)?;
                validate_years("grace_years", t.grace_years, &context)?;
                validate_years("repayment_years", t.repayment_years, &context)?;
            }
            Tool::CarReplacement(t) => {
                validate_amount("vehicle_price", t.vehicle_price, &context)?;
                validate_amount("down_payment", t.down_payment, &context)?;
                validate_amount("residual_value_percent", t.residual_value_percent, &context)?;
                validate_years("cycle_years", t.cycle_years, &context)?;
            }
            Tool::RetirementGap(t) => {
                validate_amount("current_savings", t.current_savings, &context)?;
                validate_amount("monthly_saving", t.monthly_saving, &context)?;
                validate_amount("target_monthly_income", t.target_monthly_income, &context)?;
            }
            Tool::Custom(_) => {}
        }
        validate_parameters(self.name(), &self.parameters())
    }

    /// Parameter set this tool feeds the engine
    pub fn parameters(&self) -> PlanParameters {
        match self {
            Tool::RealEstateLeverage(t) => {
                let loan = LoanTerms::new(t.loan_amount, t.loan_rate_percent, t.term_years);
                PlanParameters::new(
                    PhaseTimeline::for_loan_tenor(0, 0, t.interest_only_years, &loan),
                    loan,
                    InvestmentTerms::new(t.loan_amount + t.own_capital, t.investment_yield_percent),
                )
            }
            Tool::StudentLoanArbitrage(t) => {
                let borrowed = t.annual_draw * t.study_years as f64;
                let loan = LoanTerms::new(
                    borrowed,
                    t.loan_rate_percent,
                    t.grace_years.saturating_add(t.repayment_years),
                );
                PlanParameters::new(
                    PhaseTimeline::new(t.study_years, t.grace_years, 0, t.repayment_years),
                    loan,
                    InvestmentTerms::new(0.0, t.investment_yield_percent)
                        .with_contribution(t.annual_draw, ContributionFrequency::Annual),
                )
            }
            Tool::CarReplacement(t) => {
                let loan = car_loan(t);
                PlanParameters::new(
                    PhaseTimeline::new(0, 0, 0, t.term_years),
                    loan,
                    InvestmentTerms::default(),
                )
            }
            Tool::RetirementGap(t) => PlanParameters::new(
                PhaseTimeline::new(t.years_to_retirement, 0, 0, 0),
                LoanTerms::none(),
                InvestmentTerms::new(t.current_savings, t.investment_yield_percent)
                    .with_contribution(t.monthly_saving, ContributionFrequency::Monthly),
            ),
            Tool::Custom(params) => *params,
        }
    }

    /// Run the tool through the engine
    pub fn evaluate(&self, engine: &ProjectionEngine) -> PlanOutcome {
        match self {
            Tool::CarReplacement(t) => PlanOutcome::Amortization(car_outcome(t)),
            Tool::RetirementGap(t) => PlanOutcome::Income(retirement_outcome(t, engine.project(&self.parameters()))),
            Tool::RealEstateLeverage(_) | Tool::StudentLoanArbitrage(_) | Tool::Custom(_) => {
                PlanOutcome::Combined(engine.project(&self.parameters()))
            }
        }
    }
}

fn car_loan(t: &CarReplacement) -> LoanTerms {
    let financed = (t.vehicle_price - t.down_payment).max(0.0);
    LoanTerms::new(financed, t.loan_rate_percent, t.term_years)
}

fn car_outcome(t: &CarReplacement) -> AmortizationOutcome {
    let loan = car_loan(t);
    let schedule = amortization_schedule(&loan);
    let summary = AmortizationSummary::from_schedule(&schedule);

    let cycle_cost = (t.cycle_years > 0).then(|| {
        let months_paid = t.cycle_years.saturating_mul(12) as usize;
        let installments_paid: f64 = schedule.iter().take(months_paid).map(|r| r.payment).sum();
        let payoff_at_replacement = remaining_balance(
            loan.principal,
            loan.annual_rate_percent,
            loan.term_years as f64,
            t.cycle_years as f64,
        );
        let resale_value = t.vehicle_price * t.residual_value_percent / 100.0;
        let net_cost = t.down_payment + installments_paid + payoff_at_replacement - resale_value;

        CycleCost {
            cycle_years: t.cycle_years,
            down_payment: t.down_payment,
            installments_paid,
            payoff_at_replacement,
            resale_value,
            net_cost,
            monthly_cost: net_cost / t.cycle_years.saturating_mul(12) as f64,
        }
    });

    AmortizationOutcome {
        loan,
        summary,
        schedule,
        cycle_cost,
    }
}

fn retirement_outcome(t: &RetirementGap, series: ProjectionSeries) -> IncomeOutcome {
    let invested_at_start = series
        .last()
        .map(|p| p.invested_value)
        .unwrap_or(series.opening_invested_value);
    let monthly_income = periodic_income(invested_at_start, t.investment_yield_percent);

    IncomeOutcome {
        series,
        invested_at_start,
        monthly_income,
        target_monthly_income: t.target_monthly_income,
        monthly_gap: t.target_monthly_income - monthly_income,
        required_principal: principal_for_income(t.target_monthly_income, t.investment_yield_percent),
    }
}
