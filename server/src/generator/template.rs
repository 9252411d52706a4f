/// Relative demand for an hour of the day in `[0, 1]`: a daytime base with a
/// sharp morning commute peak and a broader evening one.
pub fn hourly_demand(hour: u8) -> f64 {
    let h = f64::from(hour);
    let morning = (-(h - 8.0).powi(2) / 4.0).exp();
    let evening = 0.85 * (-(h - 17.0).powi(2) / 6.0).exp();
    let base = if (6..=21).contains(&hour) { 0.25 } else { 0.05 };
    (base + morning + evening).min(1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn demand_peaks_at_rush_hours() {
        assert_eq!(hourly_demand(8), 1.0);
        assert!(hourly_demand(17) > hourly_demand(13));
        assert!(hourly_demand(3) < 0.1);
    }

    #[test]
    fn demand_stays_in_unit_range() {
        for hour in 0..24 {
            let demand = hourly_demand(hour);
            assert!((0.0..=1.0).contains(&demand), "hour {hour}: {demand}");
        }
    }
}
