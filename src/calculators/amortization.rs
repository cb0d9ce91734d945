//! Level-payment amortization with monthly compounding
//!
//! Balances are always taken from the closed form for the exact number of
//! elapsed months, so long schedules never accumulate subtraction drift.

use serde::{Deserialize, Serialize};

use super::{finite_or_zero, monthly_rate, non_negative, MONTHS_PER_YEAR};
use crate::params::LoanTerms;
use crate::reduce::Periodic;

/// Fixed monthly installment that amortizes `principal` to zero over `term_years`
///
/// p = P·r·(1+r)ⁿ / ((1+r)ⁿ − 1) with r = rate/100/12 and n = term·12.
/// A zero rate falls back to straight-line P/n, a zero term divides by one
/// month, and any non-finite result becomes 0.
pub fn amortized_payment(principal: f64, annual_rate_percent: f64, term_years: f64) -> f64 {
    let n = term_months(term_years);
    installment(non_negative(principal), monthly_rate(annual_rate_percent), n)
}

/// Outstanding principal after `elapsed_years` of a `term_years` loan
///
/// Fractional years are allowed (elapsed months / 12). The result is clamped
/// to zero and is exactly zero once the full term has elapsed.
pub fn remaining_balance(
    principal: f64,
    annual_rate_percent: f64,
    term_years: f64,
    elapsed_years: f64,
) -> f64 {
    let n = term_months(term_years);
    let p = non_negative(elapsed_years) * MONTHS_PER_YEAR;
    balance_after_months(non_negative(principal), monthly_rate(annual_rate_percent), n, p)
}

/// Term in months, with a zero term falling back to a single month
fn term_months(term_years: f64) -> f64 {
    let n = non_negative(term_years) * MONTHS_PER_YEAR;
    if n > 0.0 {
        n
    } else {
        1.0
    }
}

/// Schedule length in whole months, using the same one-month floor as [`term_months`]
pub(crate) fn schedule_months(term_years: u32) -> u32 {
    term_years.saturating_mul(12).max(1)
}

/// (1+r)^k − 1, accurate even when r is too small for 1+r to differ from 1
fn growth_minus_one(r: f64, k: f64) -> f64 {
    (k * r.ln_1p()).exp_m1()
}

/// Installment for a monthly rate `r` over `n` months
///
/// Falls back to straight-line P/n when compounding vanishes, and to the
/// interest-only limit P·r when it overflows.
pub(crate) fn installment(principal: f64, r: f64, n: f64) -> f64 {
    let g = growth_minus_one(r, n);
    let payment = if r <= 0.0 || g.is_nan() || g <= 0.0 {
        principal / n
    } else if g.is_infinite() {
        principal * r
    } else {
        principal * r * (g + 1.0) / g
    };
    finite_or_zero(payment)
}

/// Closed-form balance after `p` of `n` months at monthly rate `r`
pub(crate) fn balance_after_months(principal: f64, r: f64, n: f64, p: f64) -> f64 {
    if p <= 0.0 {
        return principal;
    }
    if p >= n {
        return 0.0;
    }

    let g_n = growth_minus_one(r, n);
    let balance = if r <= 0.0 || g_n.is_nan() || g_n <= 0.0 {
        principal * (1.0 - p / n)
    } else if g_n.is_infinite() {
        principal
    } else {
        principal * (g_n - growth_minus_one(r, p)) / g_n
    };
    finite_or_zero(balance).max(0.0)
}

/// One month of an amortization schedule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmortizationRow {
    /// Payment number (1-indexed)
    pub month: u32,
    pub beginning_balance: f64,
    pub payment: f64,
    /// Interest accrued on the beginning balance
    pub interest: f64,
    /// Principal repaid by this payment (payment − interest)
    pub principal: f64,
    /// Closed-form balance after this payment
    pub ending_balance: f64,
}

impl Periodic for AmortizationRow {
    fn period_index(&self) -> u32 {
        self.month
    }
}

/// Full monthly schedule for a loan
pub fn amortization_schedule(loan: &LoanTerms) -> Vec<AmortizationRow> {
    let principal = non_negative(loan.principal);
    let r = loan.monthly_rate();
    let months = schedule_months(loan.term_years);
    let n = months as f64;
    let payment = installment(principal, r, n);

    (1..=months)
        .map(|month| {
            let beginning_balance = balance_after_months(principal, r, n, (month - 1) as f64);
            let interest = finite_or_zero(beginning_balance * r);
            AmortizationRow {
                month,
                beginning_balance,
                payment,
                interest,
                principal: payment - interest,
                ending_balance: balance_after_months(principal, r, n, month as f64),
            }
        })
        .collect()
}

/// Totals over an amortization schedule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmortizationSummary {
    pub installment: f64,
    pub term_months: u32,
    pub total_paid: f64,
    pub total_interest: f64,
    pub total_principal: f64,
}

impl AmortizationSummary {
    pub fn from_schedule(schedule: &[AmortizationRow]) -> Self {
        Self {
            installment: schedule.first().map(|r| r.payment).unwrap_or(0.0),
            term_months: schedule.len() as u32,
            total_paid: schedule.iter().map(|r| r.payment).sum(),
            total_interest: schedule.iter().map(|r| r.interest).sum(),
            total_principal: schedule.iter().map(|r| r.principal).sum(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    #[test]
    fn test_thirty_year_mortgage_payment() {
        let payment = amortized_payment(1_000_000.0, 6.0, 30.0);
        assert_abs_diff_eq!(payment, 5_995.51, epsilon = 0.01);
    }

    #[test]
    fn test_zero_rate_is_straight_line() {
        for &(principal, years) in &[(120_000.0, 10.0), (400_000.0, 7.0), (1.0, 1.0)] {
            let payment = amortized_payment(principal, 0.0, years);
            assert_relative_eq!(payment, principal / (years * 12.0), max_relative = 1e-12);
        }
    }

    #[test]
    fn test_degenerate_inputs_never_nan() {
        // Zero term divides by a single month
        assert_relative_eq!(amortized_payment(1_200.0, 0.0, 0.0), 1_200.0);
        assert!(amortized_payment(1_200.0, 5.0, 0.0).is_finite());

        assert_eq!(amortized_payment(f64::NAN, 5.0, 10.0), 0.0);
        assert_eq!(amortized_payment(-50_000.0, 5.0, 10.0), 0.0);
        assert!(amortized_payment(1e300, 1e300, 1e300).is_finite());
        assert!(remaining_balance(1e300, 1e300, 1e300, 3.0).is_finite());

        // Compounding overflows: payment tends to interest only, balance stays put
        let r = 1e6 / 100.0 / 12.0;
        assert_relative_eq!(amortized_payment(1_000.0, 1e6, 30.0), 1_000.0 * r, max_relative = 1e-12);
        assert_eq!(remaining_balance(1_000.0, 1e6, 30.0, 10.0), 1_000.0);
    }

    #[test]
    fn test_vanishing_rate_falls_back_to_straight_line() {
        // 1 + 1e-15 rounds to 1 in the naive closed form
        assert_relative_eq!(amortized_payment(120_000.0, 1e-15, 10.0), 1_000.0, max_relative = 1e-9);
        assert_relative_eq!(remaining_balance(120_000.0, 1e-15, 10.0, 5.0), 60_000.0, max_relative = 1e-9);
        assert_relative_eq!(amortized_payment(120_000.0, 1e-300, 10.0), 1_000.0, max_relative = 1e-9);
        assert_relative_eq!(remaining_balance(120_000.0, 1e-300, 10.0, 5.0), 60_000.0, max_relative = 1e-9);
    }

    #[test]
    fn test_balance_endpoints() {
        for &rate in &[0.0, 0.5, 3.25, 6.0, 18.0] {
            for &years in &[1.0, 7.0, 30.0] {
                assert_eq!(remaining_balance(250_000.0, rate, years, 0.0), 250_000.0);
                assert_eq!(remaining_balance(250_000.0, rate, years, years), 0.0);
                // Elapsed past maturity stays at zero
                assert_eq!(remaining_balance(250_000.0, rate, years, years + 2.0), 0.0);
            }
        }
    }

    #[test]
    fn test_zero_rate_balance_is_linear() {
        let balance = remaining_balance(400_000.0, 0.0, 8.0, 2.0);
        assert_relative_eq!(balance, 300_000.0, max_relative = 1e-12);
    }

    #[test]
    fn test_balance_matches_schedule_walk() {
        let loan = LoanTerms::new(300_000.0, 4.5, 15);
        let schedule = amortization_schedule(&loan);
        let mid = &schedule[59];
        assert_relative_eq!(
            mid.ending_balance,
            remaining_balance(300_000.0, 4.5, 15.0, 5.0),
            max_relative = 1e-12
        );
    }

    #[test]
    fn test_principal_portions_repay_loan() {
        let loan = LoanTerms::new(1_000_000.0, 6.0, 30);
        let schedule = amortization_schedule(&loan);
        assert_eq!(schedule.len(), 360);

        let repaid: f64 = schedule.iter().map(|r| r.payment - r.interest).sum();
        assert_relative_eq!(repaid, 1_000_000.0, max_relative = 1e-9);

        let last = schedule.last().unwrap();
        assert_eq!(last.ending_balance, 0.0);
        assert_abs_diff_eq!(last.beginning_balance, last.principal, epsilon = 1e-6);
    }

    #[test]
    fn test_zero_term_schedule_matches_payment() {
        let loan = LoanTerms::new(12_000.0, 0.0, 0);
        let schedule = amortization_schedule(&loan);
        assert_eq!(schedule.len(), 1);
        assert_eq!(schedule[0].payment, amortized_payment(12_000.0, 0.0, 0.0));
        assert_eq!(schedule[0].ending_balance, 0.0);

        let summary = AmortizationSummary::from_schedule(&schedule);
        assert_relative_eq!(summary.total_principal, 12_000.0);
    }

    #[test]
    fn test_summary_totals() {
        let loan = LoanTerms::new(24_000.0, 0.0, 2);
        let summary = AmortizationSummary::from_schedule(&amortization_schedule(&loan));
        assert_eq!(summary.term_months, 24);
        assert_relative_eq!(summary.installment, 1_000.0);
        assert_relative_eq!(summary.total_paid, 24_000.0, max_relative = 1e-12);
        assert_eq!(summary.total_interest, 0.0);
    }
}
