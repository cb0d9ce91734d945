//! Closed-form loan and yield calculators shared by every planning tool

pub mod amortization;
pub mod income;

pub use amortization::{
    amortized_payment, amortization_schedule, remaining_balance, AmortizationRow,
    AmortizationSummary,
};
pub use income::{periodic_income, principal_for_income, yield_on_balance};

/// Months in a year; every calculator compounds monthly
pub const MONTHS_PER_YEAR: f64 = 12.0;

/// Replace NaN or infinity with 0
pub fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

/// Clamp a malformed amount or rate (negative, NaN, infinite) to 0
pub fn non_negative(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}

/// Convert an annual percentage (6.0 = 6%) to a monthly decimal rate
pub fn monthly_rate(annual_rate_percent: f64) -> f64 {
    non_negative(annual_rate_percent) / 100.0 / MONTHS_PER_YEAR
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guards() {
        assert_eq!(finite_or_zero(f64::NAN), 0.0);
        assert_eq!(finite_or_zero(f64::INFINITY), 0.0);
        assert_eq!(finite_or_zero(-3.5), -3.5);

        assert_eq!(non_negative(-1.0), 0.0);
        assert_eq!(non_negative(f64::NAN), 0.0);
        assert_eq!(non_negative(2.0), 2.0);
    }

    #[test]
    fn test_monthly_rate() {
        assert!((monthly_rate(6.0) - 0.005).abs() < 1e-15);
        assert_eq!(monthly_rate(-6.0), 0.0);
    }
}
