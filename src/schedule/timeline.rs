//! Phase timeline and the month-to-phase state machine
//!
//! Phases always run in the fixed order Accumulation, Grace, InterestOnly,
//! Amortizing, Matured. Resolution is a pure function of the month index
//! against cumulative boundaries, so the phase sequence is monotonic and an
//! earlier phase is never re-entered.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::params::LoanTerms;

/// Financing phase active in a given month
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Phase {
    /// Contributions build the invested balance; nothing borrowed yet
    Accumulation,
    /// Liability outstanding, no payment due
    Grace,
    /// Only the monthly interest is paid
    InterestOnly,
    /// Level installments repay the loan
    Amortizing,
    /// Loan repaid; only the investment remains
    Matured,
}

impl Phase {
    /// Phases that make up a timeline, in order (Matured is implicit)
    pub const SCHEDULED: [Phase; 4] = [
        Phase::Accumulation,
        Phase::Grace,
        Phase::InterestOnly,
        Phase::Amortizing,
    ];

    /// Whether the loan principal is outstanding during this phase
    pub fn carries_liability(&self) -> bool {
        matches!(self, Phase::Grace | Phase::InterestOnly | Phase::Amortizing)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Accumulation => "accumulation",
            Phase::Grace => "grace",
            Phase::InterestOnly => "interest_only",
            Phase::Amortizing => "amortizing",
            Phase::Matured => "matured",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Phase resolved for a single month
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhasePosition {
    pub phase: Phase,
    /// Month within the phase (1-indexed)
    pub month_in_phase: u32,
}

/// Lengths of each financing phase, in years
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PhaseTimeline {
    #[serde(default)]
    pub accumulation: u32,
    #[serde(default)]
    pub grace: u32,
    #[serde(default)]
    pub interest_only: u32,
    #[serde(default)]
    pub amortizing: u32,
}

impl PhaseTimeline {
    pub fn new(accumulation: u32, grace: u32, interest_only: u32, amortizing: u32) -> Self {
        Self {
            accumulation,
            grace,
            interest_only,
            amortizing,
        }
    }

    /// Timeline whose amortizing phase fills the rest of the loan tenor
    ///
    /// A loan "over 8 years with a 1-year grace" amortizes over 7 years.
    pub fn for_loan_tenor(
        accumulation: u32,
        grace: u32,
        interest_only: u32,
        loan: &LoanTerms,
    ) -> Self {
        let amortizing = loan
            .term_years
            .saturating_sub(grace)
            .saturating_sub(interest_only);
        Self::new(accumulation, grace, interest_only, amortizing)
    }

    /// Length of a phase in years; Matured is open-ended and reports 0
    pub fn years_in(&self, phase: Phase) -> u32 {
        match phase {
            Phase::Accumulation => self.accumulation,
            Phase::Grace => self.grace,
            Phase::InterestOnly => self.interest_only,
            Phase::Amortizing => self.amortizing,
            Phase::Matured => 0,
        }
    }

    /// Total span in years
    pub fn total_years(&self) -> u32 {
        Phase::SCHEDULED
            .iter()
            .fold(0u32, |acc, &phase| acc.saturating_add(self.years_in(phase)))
    }

    pub fn total_months(&self) -> u32 {
        self.total_years().saturating_mul(12)
    }

    /// Months elapsed before `phase` starts
    pub fn start_month(&self, phase: Phase) -> u32 {
        let years = Phase::SCHEDULED
            .iter()
            .take_while(|&&p| p < phase)
            .fold(0u32, |acc, &p| acc.saturating_add(self.years_in(p)));
        years.saturating_mul(12)
    }

    /// Phases with at least one period, in order, with their lengths in years
    pub fn active_phases(&self) -> impl Iterator<Item = (Phase, u32)> + '_ {
        Phase::SCHEDULED
            .into_iter()
            .map(move |phase| (phase, self.years_in(phase)))
            .filter(|&(_, years)| years > 0)
    }

    /// Resolve the phase of a projection month (1-indexed; 0 is treated as 1)
    pub fn position(&self, month: u32) -> PhasePosition {
        let month = month.max(1);
        let mut boundary = 0u32;

        for (phase, years) in self.active_phases() {
            let start = boundary;
            boundary = boundary.saturating_add(years.saturating_mul(12));
            if month <= boundary {
                return PhasePosition {
                    phase,
                    month_in_phase: month - start,
                };
            }
        }

        PhasePosition {
            phase: Phase::Matured,
            month_in_phase: month - boundary,
        }
    }

    pub fn phase_at(&self, month: u32) -> Phase {
        self.position(month).phase
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_boundaries() {
        let timeline = PhaseTimeline::new(2, 1, 1, 3);
        assert_eq!(timeline.total_years(), 7);
        assert_eq!(timeline.total_months(), 84);

        assert_eq!(timeline.phase_at(1), Phase::Accumulation);
        assert_eq!(timeline.phase_at(24), Phase::Accumulation);
        assert_eq!(timeline.phase_at(25), Phase::Grace);
        assert_eq!(timeline.phase_at(36), Phase::Grace);
        assert_eq!(timeline.phase_at(37), Phase::InterestOnly);
        assert_eq!(timeline.phase_at(49), Phase::Amortizing);
        assert_eq!(timeline.phase_at(84), Phase::Amortizing);
        assert_eq!(timeline.phase_at(85), Phase::Matured);

        assert_eq!(
            timeline.position(50),
            PhasePosition { phase: Phase::Amortizing, month_in_phase: 2 }
        );
        assert_eq!(timeline.start_month(Phase::Amortizing), 48);
        assert_eq!(timeline.start_month(Phase::Matured), 84);
    }

    #[test]
    fn test_zero_length_phases_are_skipped() {
        let timeline = PhaseTimeline::new(0, 1, 0, 7);
        let seen: Vec<Phase> = (1..=timeline.total_months())
            .map(|m| timeline.phase_at(m))
            .collect();
        assert!(!seen.contains(&Phase::Accumulation));
        assert!(!seen.contains(&Phase::InterestOnly));
        assert_eq!(seen.iter().filter(|&&p| p == Phase::Grace).count(), 12);
        assert_eq!(seen.iter().filter(|&&p| p == Phase::Amortizing).count(), 84);
    }

    #[test]
    fn test_phases_never_reenter() {
        let timeline = PhaseTimeline::new(3, 2, 4, 10);
        let phases: Vec<Phase> = (1..=timeline.total_months() + 24)
            .map(|m| timeline.phase_at(m))
            .collect();
        assert!(phases.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(phases.last(), Some(&Phase::Matured));
    }

    #[test]
    fn test_empty_timeline_is_matured() {
        let timeline = PhaseTimeline::default();
        assert_eq!(timeline.total_months(), 0);
        assert_eq!(timeline.phase_at(1), Phase::Matured);
        assert_eq!(timeline.active_phases().count(), 0);
    }

    #[test]
    fn test_for_loan_tenor() {
        let loan = LoanTerms::new(400_000.0, 0.0, 8);
        assert_eq!(
            PhaseTimeline::for_loan_tenor(0, 1, 0, &loan),
            PhaseTimeline::new(0, 1, 0, 7)
        );
        // Grace longer than the tenor leaves nothing to amortize
        assert_eq!(PhaseTimeline::for_loan_tenor(0, 5, 5, &loan).amortizing, 0);
    }
}
