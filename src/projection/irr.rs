//! Internal rate of return over a projection's cash flows
//!
//! Newton-Raphson on the periodic rate, falling back to bisection when the
//! derivative vanishes or the iteration fails to settle.

const TOLERANCE: f64 = 1e-10;
const MAX_ITERATIONS: usize = 1000;

/// Periodic rates are searched within (-99%, 1000%]
const MIN_PERIODIC_RATE: f64 = -0.99;
const MAX_PERIODIC_RATE: f64 = 10.0;

/// Annualised IRR of evenly spaced cash flows (negative = paid in)
///
/// Returns `None` for an empty series, a series without a sign change, or
/// when no root exists in the searched range. All-zero flows yield 0.
pub fn internal_rate_of_return(cashflows: &[f64], periods_per_year: u32) -> Option<f64> {
    if cashflows.is_empty() {
        return None;
    }
    if cashflows.iter().all(|cf| cf.abs() < TOLERANCE) {
        return Some(0.0);
    }

    let paid_in = cashflows.iter().any(|&cf| cf < -TOLERANCE);
    let paid_out = cashflows.iter().any(|&cf| cf > TOLERANCE);
    if !(paid_in && paid_out) {
        return None;
    }

    let periods_per_year = periods_per_year.max(1);
    let mut rate = 0.05 / periods_per_year as f64;

    for _ in 0..MAX_ITERATIONS {
        let (npv, slope) = npv_with_slope(cashflows, rate);
        if slope.abs() < 1e-20 {
            break;
        }

        let next = (rate - npv / slope).clamp(MIN_PERIODIC_RATE, MAX_PERIODIC_RATE);
        if (next - rate).abs() < TOLERANCE {
            // Pinned to a search bound is not a root
            if next <= MIN_PERIODIC_RATE || next >= MAX_PERIODIC_RATE {
                break;
            }
            return annualise(next, periods_per_year);
        }
        rate = next;
    }

    bisect(cashflows).and_then(|rate| annualise(rate, periods_per_year))
}

fn annualise(periodic_rate: f64, periods_per_year: u32) -> Option<f64> {
    let annual = (1.0 + periodic_rate).powi(periods_per_year as i32) - 1.0;
    annual.is_finite().then_some(annual)
}

/// NPV at a periodic rate and its derivative with respect to the rate
fn npv_with_slope(cashflows: &[f64], rate: f64) -> (f64, f64) {
    cashflows
        .iter()
        .enumerate()
        .fold((0.0, 0.0), |(npv, slope), (t, &cf)| {
            let discount = (1.0 + rate).powi(t as i32);
            (npv + cf / discount, slope - t as f64 * cf / (discount * (1.0 + rate)))
        })
}

fn npv(cashflows: &[f64], rate: f64) -> f64 {
    npv_with_slope(cashflows, rate).0
}

fn bisect(cashflows: &[f64]) -> Option<f64> {
    let mut low = MIN_PERIODIC_RATE;
    let mut high = MAX_PERIODIC_RATE;
    let mut npv_low = npv(cashflows, low);

    if npv_low * npv(cashflows, high) > 0.0 {
        return None;
    }

    for _ in 0..MAX_ITERATIONS {
        let mid = (low + high) / 2.0;
        let npv_mid = npv(cashflows, mid);

        if npv_mid.abs() < TOLERANCE || (high - low) / 2.0 < TOLERANCE {
            return Some(mid);
        }

        if npv_mid * npv_low < 0.0 {
            high = mid;
        } else {
            low = mid;
            npv_low = npv_mid;
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_year_monthly() {
        // 1,000 in, 1,100 back after twelve months
        let mut cashflows = vec![-1000.0];
        cashflows.extend(vec![0.0; 11]);
        cashflows.push(1100.0);

        let irr = internal_rate_of_return(&cashflows, 12).unwrap();
        assert!((irr - 0.10).abs() < 0.001, "Expected ~10% IRR, got {}", irr);
    }

    #[test]
    fn test_level_installments() {
        // Borrow 10,000 and repay 12 × 888.49: a 12% nominal loan
        let mut cashflows = vec![10_000.0];
        cashflows.extend(vec![-888.49; 12]);

        let irr = internal_rate_of_return(&cashflows, 12).unwrap();
        let nominal = ((1.0 + irr).powf(1.0 / 12.0) - 1.0) * 12.0;
        assert!((nominal - 0.12).abs() < 1e-4, "got {}", nominal);
    }

    #[test]
    fn test_no_sign_change() {
        assert_eq!(internal_rate_of_return(&[100.0, 50.0], 1), None);
        assert_eq!(internal_rate_of_return(&[], 12), None);
        assert_eq!(internal_rate_of_return(&[0.0, 0.0], 12), Some(0.0));
    }

    #[test]
    fn test_no_root_in_range() {
        // Losing almost everything: the root lies below -99% per period
        assert_eq!(internal_rate_of_return(&[-1000.0, 1.0], 1), None);
        assert_eq!(internal_rate_of_return(&[-1000.0, 1.0], 12), None);
    }
}
