//! Running balances carried from one projection month to the next

use crate::params::PlanParameters;
use crate::schedule::Phase;

/// State of a plan at a point in time during projection
#[derive(Debug, Clone)]
pub struct ProjectionState {
    /// Current projection month (1-indexed, 0 before the first advance)
    pub month: u32,

    /// Phase active in the current month
    pub phase: Phase,

    /// Invested balance; goes negative once outflows exhaust it
    pub invested_value: f64,

    /// Outstanding loan principal
    pub remaining_liability: f64,

    /// Running sum of yield income minus loan outflow
    pub cumulative_cash_flow: f64,
}

impl ProjectionState {
    /// Initialize state from a parameter set at projection start
    pub fn from_parameters(params: &PlanParameters) -> Self {
        let phase = params.timeline.phase_at(1);
        let remaining_liability = if phase.carries_liability() {
            params.loan.principal
        } else {
            0.0
        };

        Self {
            month: 0,
            phase,
            invested_value: params.investment.principal,
            remaining_liability,
            cumulative_cash_flow: 0.0,
        }
    }

    /// Advance to next month
    pub fn advance_month(&mut self) {
        self.month += 1;
    }

    pub fn net_worth(&self) -> f64 {
        self.invested_value - self.remaining_liability
    }
}

/// Cash movements of a single month
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MonthFlow {
    pub contribution: f64,
    pub yield_income: f64,
    pub outflow: f64,
}

/// Flows accumulated between two emitted points
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PeriodTotals {
    pub contribution: f64,
    pub yield_income: f64,
    pub outflow: f64,
}

impl PeriodTotals {
    pub fn record(&mut self, flow: &MonthFlow) {
        self.contribution += flow.contribution;
        self.yield_income += flow.yield_income;
        self.outflow += flow.outflow;
    }
}
