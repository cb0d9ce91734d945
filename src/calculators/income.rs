//! Monthly income earned by an invested balance

use super::{finite_or_zero, monthly_rate, non_negative};

/// Monthly income from `principal` at an annual yield: P·(yield/100)/12
pub fn periodic_income(principal: f64, annual_yield_percent: f64) -> f64 {
    finite_or_zero(non_negative(principal) * monthly_rate(annual_yield_percent))
}

/// Signed monthly yield on a running balance
///
/// Unlike [`periodic_income`] the balance is not clamped: a projection whose
/// invested value has gone negative keeps compounding the shortfall at the
/// same rate.
pub fn yield_on_balance(balance: f64, annual_yield_percent: f64) -> f64 {
    finite_or_zero(finite_or_zero(balance) * monthly_rate(annual_yield_percent))
}

/// Invested principal needed to earn `monthly_income` at an annual yield
///
/// Returns `None` when the yield is zero and no principal can produce income.
pub fn principal_for_income(monthly_income: f64, annual_yield_percent: f64) -> Option<f64> {
    let r = monthly_rate(annual_yield_percent);
    if r == 0.0 {
        return None;
    }
    let principal = non_negative(monthly_income) / r;
    principal.is_finite().then_some(principal)
}
