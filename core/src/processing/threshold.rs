use crate::prelude::{ProcessingStage, StageInput, StageMetadata, StageOutput, TimeMode};
use crate::records::StationRecord;
use crate::telemetry::log::LogManager;
use serde::{Deserialize, Serialize};

/// Displayable count bounds. `max` mirrors the current scale ceiling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThresholdRange {
    pub min: u64,
    pub max: u64,
}

/// Keeps records with `count >= min_count`, preserving order.
pub fn filter_by_threshold(mut records: Vec<StationRecord>, min_count: u64) -> Vec<StationRecord> {
    records.retain(|record| record.count >= min_count);
    records
}

/// Threshold stage. In hourly mode the set is first stable-sorted by count,
/// busiest first, which fixes the marker stacking order.
pub struct ThresholdStage {
    min_count: u64,
    mode: TimeMode,
    logger: LogManager,
}

impl ThresholdStage {
    pub fn new(min_count: u64, mode: TimeMode) -> Self {
        Self {
            min_count,
            mode,
            logger: LogManager::new("threshold"),
        }
    }
}

impl ProcessingStage for ThresholdStage {
    fn name(&self) -> &'static str {
        "threshold"
    }

    fn execute(&self, input: StageInput) -> StageOutput {
        let input_len = input.records.len();
        let mut records = input.records;
        if self.mode == TimeMode::Hourly {
            records.sort_by(|a, b| b.count.cmp(&a.count));
        }
        let records = filter_by_threshold(records, self.min_count);

        let note = format!(
            "min {}: kept {} of {}",
            self.min_count,
            records.len(),
            input_len
        );
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
