use crate::math::stats::StatsHelper;
use crate::prelude::TimeMode;
use crate::records::{StationKey, StationRecord};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Floors and headroom for the color scale ceiling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScaleConfig {
    pub whole_day_floor: u64,
    pub hourly_floor: u64,
    pub hourly_headroom_percent: u64,
}

impl Default for ScaleConfig {
    fn default() -> Self {
        Self {
            whole_day_floor: 20_000,
            hourly_floor: 2_000,
            hourly_headroom_percent: 10,
        }
    }
}

/// Numeric range used to normalize color and intensity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScaleRange {
    pub min: u64,
    pub max: u64,
}

impl ScaleRange {
    pub fn normalize(&self, count: u64) -> f32 {
        StatsHelper::normalize(count.saturating_sub(self.min), self.max.saturating_sub(self.min))
    }
}

/// Computes the scale for the type-filtered records of the whole dataset.
///
/// The selected hour is intentionally not an input: scrubbing through hours
/// must keep the same ceiling.
pub fn compute_scale(
    records: &[StationRecord],
    mode: TimeMode,
    config: &ScaleConfig,
) -> ScaleRange {
    let max = match mode {
        TimeMode::WholeDay => {
            let mut totals: HashMap<StationKey<'_>, u64> = HashMap::new();
            for record in records {
                let total = totals.entry(record.key()).or_insert(0);
                *total = total.saturating_add(record.count);
            }
            StatsHelper::max_with_floor(totals.into_values(), config.whole_day_floor)
        }
        TimeMode::Hourly => {
            // Per-station hourly peaks collapse to the busiest single record.
            let peak = StatsHelper::max_with_floor(
                records.iter().map(|record| record.count),
                config.hourly_floor,
            );
            StatsHelper::with_headroom(peak, config.hourly_headroom_percent)
        }
    };
    ScaleRange { min: 0, max }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::TransportType;

    fn busy_station() -> Vec<StationRecord> {
        let mut records: Vec<_> = (0..24)
            .map(|hour| {
                StationRecord::new("Centrum", 52.23, 21.01, TransportType::Metro, hour, 1_500)
            })
            .collect();
        records.push(StationRecord::new("Centrum", 52.23, 21.01, TransportType::Tram, 8, 4_000));
        records
    }

    #[test]
    fn whole_day_ceiling_is_busiest_station_total() {
        let scale = compute_scale(&busy_station(), TimeMode::WholeDay, &ScaleConfig::default());
        assert_eq!(scale, ScaleRange { min: 0, max: 36_000 });
    }

    #[test]
    fn whole_day_ceiling_is_floored() {
        let records = vec![StationRecord::new("A", 1.0, 1.0, TransportType::Bus, 8, 120)];
        let scale = compute_scale(&records, TimeMode::WholeDay, &ScaleConfig::default());
        assert_eq!(scale.max, 20_000);
    }

    #[test]
    fn hourly_ceiling_uses_peak_hour_with_headroom() {
        let scale = compute_scale(&busy_station(), TimeMode::Hourly, &ScaleConfig::default());
        assert_eq!(scale.max, 4_400);
    }

    #[test]
    fn hourly_ceiling_floor_also_receives_headroom() {
        let scale = compute_scale(&[], TimeMode::Hourly, &ScaleConfig::default());
        assert_eq!(scale, ScaleRange { min: 0, max: 2_200 });
    }

    #[test]
    fn custom_config_is_honored() {
        let config = ScaleConfig {
            whole_day_floor: 0,
            hourly_floor: 0,
            hourly_headroom_percent: 50,
        };
        let records = vec![
            StationRecord::new("A", 1.0, 1.0, TransportType::Bus, 8, 50),
            StationRecord::new("A", 1.0, 1.0, TransportType::Bus, 9, 70),
        ];
        assert_eq!(compute_scale(&records, TimeMode::WholeDay, &config).max, 120);
        assert_eq!(compute_scale(&records, TimeMode::Hourly, &config).max, 105);
    }

    #[test]
    fn scale_range_normalizes_counts() {
        let scale = ScaleRange { min: 0, max: 200 };
        assert_eq!(scale.normalize(50), 0.25);
        assert_eq!(scale.normalize(400), 1.0);
    }
}
