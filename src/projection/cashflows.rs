//! Projection output structures

use serde::{Deserialize, Serialize};

use super::engine::Resolution;
use super::irr::internal_rate_of_return;
use crate::reduce::Periodic;
use crate::schedule::Phase;

/// A single period of projection output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionPoint {
    /// Month or year number (1-indexed), depending on the series resolution
    pub period_index: u32,

    /// Phase active at the end of the period
    pub phase: Phase,

    // End-of-period balances
    pub invested_value: f64,
    pub remaining_liability: f64,
    pub net_worth: f64,

    /// Running sum of yield income minus loan outflow since the start
    pub cumulative_cash_flow: f64,

    // Flows within the period
    pub period_outflow: f64,
    pub period_yield_income: f64,
    pub period_contribution: f64,
}

impl Periodic for ProjectionPoint {
    fn period_index(&self) -> u32 {
        self.period_index
    }
}

/// Ordered projection output, created fresh for every parameter set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionSeries {
    pub resolution: Resolution,

    /// Invested balance before the first period
    pub opening_invested_value: f64,

    /// Liability before the first period
    pub opening_liability: f64,

    pub points: Vec<ProjectionPoint>,
}

impl ProjectionSeries {
    pub fn new(resolution: Resolution, opening_invested_value: f64, opening_liability: f64) -> Self {
        Self {
            resolution,
            opening_invested_value,
            opening_liability,
            points: Vec::new(),
        }
    }

    pub(crate) fn with_points(&self, points: Vec<ProjectionPoint>) -> Self {
        Self {
            resolution: self.resolution,
            opening_invested_value: self.opening_invested_value,
            opening_liability: self.opening_liability,
            points,
        }
    }

    pub(crate) fn push(&mut self, point: ProjectionPoint) {
        self.points.push(point);
    }

    pub fn points(&self) -> &[ProjectionPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first(&self) -> Option<&ProjectionPoint> {
        self.points.first()
    }

    pub fn last(&self) -> Option<&ProjectionPoint> {
        self.points.last()
    }

    /// Span of the series: the index of its final period
    pub fn total_periods(&self) -> u32 {
        self.points.last().map(|p| p.period_index).unwrap_or(0)
    }

    /// The investor's own capital flows, negative when paid in
    ///
    /// Opening net worth goes in first. Each period then adds contributions,
    /// less any new debt drawn that period, since drawn principal reimburses
    /// what was contributed ahead of it. Terminal net worth comes back in the
    /// final period. Yield and loan service stay inside the balances. Only
    /// meaningful on a dense series.
    pub fn own_capital_flows(&self) -> Vec<f64> {
        let mut flows = Vec::with_capacity(self.points.len() + 1);
        flows.push(-(self.opening_invested_value - self.opening_liability));

        let mut previous_liability = self.opening_liability;
        for point in &self.points {
            let drawn = (point.remaining_liability - previous_liability).max(0.0);
            flows.push(drawn - point.period_contribution);
            previous_liability = point.remaining_liability;
        }
        if let (Some(last), Some(terminal)) = (flows.last_mut(), self.points.last()) {
            *last += terminal.net_worth;
        }
        flows
    }

    /// Annualised IRR of [`own_capital_flows`](Self::own_capital_flows)
    ///
    /// `None` when no own capital is ever at stake, such as a plan funded
    /// entirely by borrowing.
    pub fn effective_annual_return(&self) -> Option<f64> {
        if self.points.is_empty() {
            return None;
        }
        internal_rate_of_return(&self.own_capital_flows(), self.resolution.periods_per_year())
    }

    /// Get summary statistics
    pub fn summary(&self) -> SeriesSummary {
        let total_outflow: f64 = self.points.iter().map(|p| p.period_outflow).sum();
        let total_yield_income: f64 = self.points.iter().map(|p| p.period_yield_income).sum();
        let total_contributions: f64 = self.points.iter().map(|p| p.period_contribution).sum();

        let last = self.points.last();
        let min_net_worth = self
            .points
            .iter()
            .map(|p| p.net_worth)
            .fold(None, |min: Option<f64>, v| Some(min.map_or(v, |m| m.min(v))))
            .unwrap_or(0.0);

        SeriesSummary {
            total_periods: self.points.len() as u32,
            total_outflow,
            total_yield_income,
            total_contributions,
            final_invested_value: last.map(|p| p.invested_value).unwrap_or(self.opening_invested_value),
            final_liability: last.map(|p| p.remaining_liability).unwrap_or(self.opening_liability),
            final_net_worth: last
                .map(|p| p.net_worth)
                .unwrap_or(self.opening_invested_value - self.opening_liability),
            min_net_worth,
            shortfall_period: self
                .points
                .iter()
                .find(|p| p.invested_value < 0.0)
                .map(|p| p.period_index),
        }
    }
}

/// Summary statistics for a projection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesSummary {
    pub total_periods: u32,
    pub total_outflow: f64,
    pub total_yield_income: f64,
    pub total_contributions: f64,
    pub final_invested_value: f64,
    pub final_liability: f64,
    pub final_net_worth: f64,
    pub min_net_worth: f64,
    /// First period whose invested value went negative
    pub shortfall_period: Option<u32>,
}
