pub struct StatsHelper;

impl StatsHelper {
    /// Largest value, never below `floor`.
    pub fn max_with_floor<I: IntoIterator<Item = u64>>(values: I, floor: u64) -> u64 {
        values.into_iter().fold(floor, u64::max)
    }

    /// Adds `percent` headroom and rounds up, in integer arithmetic so the
    /// ceiling is exact for every input.
    pub fn with_headroom(value: u64, percent: u64) -> u64 {
        value.saturating_mul(100 + percent).div_ceil(100)
    }

    /// `value / ceiling` clamped to `[0, 1]`; a zero ceiling maps to 0.
    pub fn normalize(value: u64, ceiling: u64) -> f32 {
        if ceiling == 0 {
            return 0.0;
        }
        (value as f64 / ceiling as f64).clamp(0.0, 1.0) as f32
    }
}
