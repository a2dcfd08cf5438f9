/// Compound `principal` at `rate` per year for `years` years.
///
/// The dashboard uses this one formula for the user's property and for every
/// listing so the two figures stay comparable.
pub fn project(principal: f64, rate: f64, years: u32) -> f64 {
    let exponent = i32::try_from(years).unwrap_or(i32::MAX);
    principal * (1.0 + rate).powi(exponent)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_years_returns_principal() {
        for principal in [0.0, 1.0, 489.76, 5000.0] {
            for rate in [-1.0, -0.5, 0.0, 0.09, 0.2] {
                assert_eq!(project(principal, rate, 0), principal);
            }
        }
    }

    #[test]
    fn dashboard_default_projection() {
        let projected = project(489.76, 0.09, 5);
        assert!(
            (projected - 753.56).abs() < 0.01,
            "expected ~753.56, got {projected}"
        );
    }

    #[test]
    fn positive_rate_grows_every_year() {
        let mut previous = project(100.0, 0.05, 0);
        for years in 1..=50 {
            let next = project(100.0, 0.05, years);
            assert!(next > previous, "year {years} did not grow");
            previous = next;
        }
    }

    #[test]
    fn total_loss_rate_wipes_out_value() {
        assert_eq!(project(250.0, -1.0, 3), 0.0);
    }
}
