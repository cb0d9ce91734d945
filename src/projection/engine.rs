//! Core projection engine: monthly cash-flow projection across financing phases

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use super::cashflows::{ProjectionPoint, ProjectionSeries};
use super::state::{MonthFlow, PeriodTotals, ProjectionState};
use crate::calculators::amortization::{balance_after_months, installment};
use crate::calculators::{finite_or_zero, yield_on_balance};
use crate::params::{InvestmentTerms, LoanTerms, PlanParameters};
use crate::schedule::{Phase, PhaseTimeline};

/// Granularity of the emitted series
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Resolution {
    /// One point per month
    Monthly,
    /// One point per year: flows summed, balances at year end
    #[default]
    Annual,
}

impl Resolution {
    pub fn months_per_period(&self) -> u32 {
        match self {
            Resolution::Monthly => 1,
            Resolution::Annual => 12,
        }
    }

    pub fn periods_per_year(&self) -> u32 {
        12 / self.months_per_period()
    }
}

/// Configuration for a projection run
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ProjectionConfig {
    /// Granularity of the emitted points
    #[serde(default)]
    pub resolution: Resolution,

    /// Project this many years even if the timeline is shorter;
    /// the extra years fall in the Matured phase
    #[serde(default)]
    pub horizon_years: Option<u32>,
}

impl ProjectionConfig {
    pub fn monthly() -> Self {
        Self {
            resolution: Resolution::Monthly,
            ..Default::default()
        }
    }

    pub fn annual() -> Self {
        Self::default()
    }

    pub fn with_horizon(mut self, years: u32) -> Self {
        self.horizon_years = Some(years);
        self
    }
}

/// Main projection engine
///
/// Stateless apart from its configuration: every call builds a new series
/// from the parameters alone.
#[derive(Debug, Clone, Default)]
pub struct ProjectionEngine {
    config: ProjectionConfig,
}

impl ProjectionEngine {
    pub fn new(config: ProjectionConfig) -> Self {
        Self { config }
    }

    /// Months covered by a run: the timeline span, extended to the horizon
    pub fn total_months(&self, timeline: &PhaseTimeline) -> u32 {
        let horizon = self.config.horizon_years.unwrap_or(0).saturating_mul(12);
        timeline.total_months().max(horizon)
    }

    /// Run projection for a single parameter set
    pub fn project(&self, params: &PlanParameters) -> ProjectionSeries {
        let params = params.sanitized();
        let total_months = self.total_months(&params.timeline);
        let months_per_period = self.config.resolution.months_per_period();

        debug!(
            "Projecting {} months at {:?} resolution ({:?})",
            total_months, self.config.resolution, params.timeline
        );
        check_tenor(&params);

        let schedule = LoanSchedule::new(&params.loan, &params.timeline);
        let mut state = ProjectionState::from_parameters(&params);
        let mut series = ProjectionSeries::new(
            self.config.resolution,
            state.invested_value,
            state.remaining_liability,
        );
        let mut totals = PeriodTotals::default();

        for _month in 1..=total_months {
            // Advance state to next month
            state.advance_month();

            let flow = self.calculate_month(&params, &schedule, &mut state);
            totals.record(&flow);

            if state.month % months_per_period == 0 || state.month == total_months {
                let period_index = state.month.div_ceil(months_per_period);
                series.push(emit_point(period_index, &state, &totals));
                totals = PeriodTotals::default();
            }
        }

        debug!(
            "Projection complete: {} points, final net worth {:.2}",
            series.len(),
            state.net_worth()
        );
        series
    }

    /// Calculate flows for a single month and roll the balances forward
    fn calculate_month(
        &self,
        params: &PlanParameters,
        schedule: &LoanSchedule,
        state: &mut ProjectionState,
    ) -> MonthFlow {
        let position = params.timeline.position(state.month);
        state.phase = position.phase;

        let contribution = accumulation_contribution(&params.investment, position.phase, position.month_in_phase);

        // Income is earned on the start-of-period balance, before this month's contribution
        let yield_income = yield_on_balance(state.invested_value, params.investment.annual_yield_percent);

        let (outflow, liability) = schedule.resolve(position.phase, position.month_in_phase);

        // Never clamped: a negative balance is a shortfall the caller must see
        state.invested_value = finite_or_zero(state.invested_value + yield_income - outflow + contribution);
        state.remaining_liability = liability;
        state.cumulative_cash_flow = finite_or_zero(state.cumulative_cash_flow + yield_income - outflow);

        MonthFlow {
            contribution,
            yield_income,
            outflow,
        }
    }
}

/// Loan figures fixed for the whole run
struct LoanSchedule {
    principal: f64,
    monthly_rate: f64,
    amortizing_months: f64,
    installment: f64,
    interest_only_payment: f64,
}

impl LoanSchedule {
    fn new(loan: &LoanTerms, timeline: &PhaseTimeline) -> Self {
        let monthly_rate = loan.monthly_rate();
        let amortizing_months = timeline.amortizing as f64 * 12.0;
        Self {
            principal: loan.principal,
            monthly_rate,
            amortizing_months,
            // The installment repays the principal over the amortizing phase itself
            installment: if amortizing_months > 0.0 {
                installment(loan.principal, monthly_rate, amortizing_months)
            } else {
                0.0
            },
            interest_only_payment: loan.interest_only_payment(),
        }
    }

    /// Outflow and end-of-month liability for a phase month
    fn resolve(&self, phase: Phase, month_in_phase: u32) -> (f64, f64) {
        match phase {
            Phase::Accumulation | Phase::Matured => (0.0, 0.0),
            Phase::Grace => (0.0, self.principal),
            Phase::InterestOnly => (self.interest_only_payment, self.principal),
            Phase::Amortizing => (
                self.installment,
                balance_after_months(
                    self.principal,
                    self.monthly_rate,
                    self.amortizing_months,
                    month_in_phase as f64,
                ),
            ),
        }
    }
}

fn accumulation_contribution(investment: &InvestmentTerms, phase: Phase, month_in_phase: u32) -> f64 {
    if phase == Phase::Accumulation && investment.contribution_frequency.is_boundary(month_in_phase) {
        investment.periodic_contribution
    } else {
        0.0
    }
}

fn emit_point(period_index: u32, state: &ProjectionState, totals: &PeriodTotals) -> ProjectionPoint {
    let invested_value = finite_or_zero(state.invested_value);
    let remaining_liability = finite_or_zero(state.remaining_liability);
    ProjectionPoint {
        period_index,
        phase: state.phase,
        invested_value,
        remaining_liability,
        net_worth: invested_value - remaining_liability,
        cumulative_cash_flow: finite_or_zero(state.cumulative_cash_flow),
        period_outflow: finite_or_zero(totals.outflow),
        period_yield_income: finite_or_zero(totals.yield_income),
        period_contribution: finite_or_zero(totals.contribution),
    }
}

fn check_tenor(params: &PlanParameters) {
    if params.loan.is_empty() {
        return;
    }
    let timeline = &params.timeline;
    let financed = timeline.total_years().saturating_sub(timeline.accumulation);
    if params.loan.term_years != 0 && financed != params.loan.term_years {
        warn!(
            "Loan tenor is {} years but the timeline finances it over {} years",
            params.loan.term_years, financed
        );
    }
    if timeline.amortizing == 0 && (timeline.grace > 0 || timeline.interest_only > 0) {
        warn!("Timeline has no amortizing phase; the principal is never repaid");
    }
}

/// Project a parameter set with the default configuration (annual points)
pub fn project_series(
    timeline: &PhaseTimeline,
    loan: &LoanTerms,
    investment: &InvestmentTerms,
) -> ProjectionSeries {
    ProjectionEngine::default().project(&PlanParameters::new(*timeline, *loan, *investment))
}
