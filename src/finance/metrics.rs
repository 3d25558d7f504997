//! Investment metrics over a yearly net cash-flow series.
//!
//! `flows[0]` is the year-0 outlay (negative), `flows[y]` the net cash flow
//! of operating year `y`.

const IRR_LOW: f64 = -0.99;
const IRR_HIGH: f64 = 10.0;
const IRR_TOLERANCE: f64 = 1e-9;
const IRR_MAX_ITERATIONS: usize = 200;

/// Net present value at `rate`, year 0 undiscounted
pub fn npv(rate: f64, flows: &[f64]) -> f64 {
    flows
        .iter()
        .enumerate()
        .map(|(year, flow)| flow / (1.0 + rate).powi(year as i32))
        .sum()
}

/// Internal rate of return by bisection.
///
/// `None` when NPV does not change sign over the search bracket,
/// e.g. a project that never earns back its investment.
pub fn irr(flows: &[f64]) -> Option<f64> {
    let mut low = IRR_LOW;
    let mut high = IRR_HIGH;
    let mut npv_low = npv(low, flows);
    let npv_high = npv(high, flows);

    if !npv_low.is_finite() || !npv_high.is_finite() || npv_low * npv_high > 0.0 {
        return None;
    }

    for _ in 0..IRR_MAX_ITERATIONS {
        let mid = (low + high) / 2.0;
        let npv_mid = npv(mid, flows);

        if npv_mid.abs() < IRR_TOLERANCE || (high - low) / 2.0 < IRR_TOLERANCE {
            return Some(mid);
        }

        if npv_low * npv_mid < 0.0 {
            high = mid;
        } else {
            low = mid;
            npv_low = npv_mid;
        }
    }

    Some((low + high) / 2.0)
}

/// Fractional year at which the cumulative cash flow turns non-negative,
/// interpolating linearly inside the crossing year
pub fn payback_period(flows: &[f64]) -> Option<f64> {
    let mut cumulative = 0.0;
    for (year, flow) in flows.iter().enumerate() {
        let previous = cumulative;
        cumulative += flow;
        if cumulative >= 0.0 {
            if year == 0 || *flow <= 0.0 {
                return Some(year as f64);
            }
            return Some((year - 1) as f64 + (-previous) / flow);
        }
    }
    None
}

/// Lifetime net gain relative to the investment
pub fn roi(flows: &[f64], total_investment: f64) -> Option<f64> {
    if total_investment <= 0.0 {
        return None;
    }
    let net: f64 = flows.iter().sum();
    Some(net / total_investment)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_npv_known_value() {
        // -100 + 60/1.1 + 60/1.21
        let flows = [-100.0, 60.0, 60.0];
        assert_relative_eq!(npv(0.1, &flows), 4.132_231_404_958_68, epsilon = 1e-9);
        assert_relative_eq!(npv(0.0, &flows), 20.0);
    }

    #[test]
    fn test_irr_two_year_project() {
        // -100 + 60/(1+r) + 60/(1+r)^2 = 0  =>  r ≈ 0.130662
        let flows = [-100.0, 60.0, 60.0];
        let rate = irr(&flows).unwrap();
        assert_relative_eq!(rate, 0.130_662_386, epsilon = 1e-6);
        assert_relative_eq!(npv(rate, &flows), 0.0, epsilon = 1e-6);
    }

    #[test]
    fn test_irr_none_without_sign_change() {
        assert!(irr(&[-100.0, -5.0, -5.0]).is_none());
    }

    #[test]
    fn test_payback_interpolates() {
        let flows = [-100.0, 40.0, 40.0, 40.0];
        assert_relative_eq!(payback_period(&flows).unwrap(), 2.5);
        assert!(payback_period(&[-100.0, 10.0, 10.0]).is_none());
        assert_eq!(payback_period(&[0.0, 10.0]), Some(0.0));
    }

    #[test]
    fn test_roi() {
        assert_relative_eq!(roi(&[-100.0, 60.0, 60.0], 100.0).unwrap(), 0.2);
        assert!(roi(&[0.0], 0.0).is_none());
    }
}
