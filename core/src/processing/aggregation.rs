use crate::prelude::{
    HourSelection, ProcessingStage, StageInput, StageMetadata, StageOutput, TimeMode,
};
use crate::records::{render_order, StationKey, StationRecord};
use crate::telemetry::log::LogManager;
use std::collections::HashMap;

/// Collapses every station's hourly records into one record whose count is
/// the day total. Output is sorted with [`render_order`].
pub fn aggregate_whole_day(records: &[StationRecord]) -> Vec<StationRecord> {
    let mut slots: HashMap<StationKey<'_>, usize> = HashMap::with_capacity(records.len());
    let mut totals: Vec<StationRecord> = Vec::new();

    for record in records {
        match slots.get(&record.key()) {
            Some(&slot) => {
                totals[slot].count = totals[slot].count.saturating_add(record.count);
            }
            None => {
                slots.insert(record.key(), totals.len());
                totals.push(record.clone());
            }
        }
    }

    totals.sort_by(render_order);
    totals
}

/// Records of the selected hour, unmerged. `All` and out-of-range hours
/// select nothing.
pub fn select_hour(records: &[StationRecord], hour: HourSelection) -> Vec<StationRecord> {
    match hour.hour() {
        Some(hour) => records
            .iter()
            .filter(|record| record.hour == hour)
            .cloned()
            .collect(),
        None => Vec::new(),
    }
}

/// Mode-dependent aggregation stage.
pub struct AggregationStage {
    mode: TimeMode,
    hour: HourSelection,
    logger: LogManager,
}

impl AggregationStage {
    pub fn new(mode: TimeMode, hour: HourSelection) -> Self {
        Self {
            mode,
            hour,
            logger: LogManager::new("aggregation"),
        }
    }
}

impl ProcessingStage for AggregationStage {
    fn name(&self) -> &'static str {
        "aggregation"
    }

    fn execute(&self, input: StageInput) -> StageOutput {
        let input_len = input.records.len();
        let (records, note) = match self.mode {
            TimeMode::WholeDay => {
                let records = aggregate_whole_day(&input.records);
                let note = format!(
                    "whole day: {} stations from {} records",
                    records.len(),
                    input_len
                );
                (records, note)
            }
            TimeMode::Hourly => {
                let records = select_hour(&input.records, self.hour);
                let note = format!("hour {}: {} records", self.hour, records.len());
                (records, note)
            }
        };
        self.logger.trace_stage(&note);

        StageOutput {
            records,
            metadata: StageMetadata {
                input_len,
                notes: vec![note],
            },
        }
    }
}
