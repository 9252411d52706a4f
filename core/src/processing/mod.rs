pub mod aggregation;
pub mod scale;
pub mod threshold;
pub mod type_filter;

pub use aggregation::{aggregate_whole_day, select_hour, AggregationStage};
pub use scale::{compute_scale, ScaleConfig, ScaleRange};
pub use threshold::{filter_by_threshold, ThresholdRange, ThresholdStage};
pub use type_filter::filter_by_type;

use crate::prelude::{FilterState, ProcessingStage, StageInput};
use crate::records::StationRecord;
use crate::telemetry::log::LogManager;

/// Result of one full pipeline pass.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineOutput {
    pub records: Vec<StationRecord>,
    pub scale: ScaleRange,
    pub notes: Vec<String>,
}

/// Type filter, then aggregation and threshold stages; the scale is computed
/// from the type-filtered set in parallel.
#[derive(Debug, Clone)]
pub struct Pipeline {
    scale_config: ScaleConfig,
    logger: LogManager,
}

impl Pipeline {
    pub fn new(scale_config: ScaleConfig) -> Self {
        Self {
            scale_config,
            logger: LogManager::new("pipeline"),
        }
    }

    /// Scale only, for callers that need the ceiling without rendering.
    pub fn scale(&self, records: &[StationRecord], filters: &FilterState) -> ScaleRange {
        let typed = filter_by_type(records, &filters.line_types);
        compute_scale(&typed, filters.time_mode, &self.scale_config)
    }

    pub fn run(
        &self,
        records: &[StationRecord],
        filters: &FilterState,
        min_count: u64,
    ) -> PipelineOutput {
        let typed = filter_by_type(records, &filters.line_types);
        let scale = compute_scale(&typed, filters.time_mode, &self.scale_config);

        let aggregation = AggregationStage::new(filters.time_mode, filters.hour);
        let threshold = ThresholdStage::new(min_count, filters.time_mode);
        let stages: [&dyn ProcessingStage; 2] = [&aggregation, &threshold];

        let mut notes = vec![format!(
            "type filter: kept {} of {}",
            typed.len(),
            records.len()
        )];
        let mut input = StageInput { records: typed };
        for stage in stages {
            let output = stage.execute(input);
            let name = stage.name();
            notes.extend(
                output
                    .metadata
                    .notes
                    .into_iter()
                    .map(|note| format!("{name}: {note}")),
            );
            input = StageInput {
                records: output.records,
            };
        }

        self.logger.trace_stage(&format!(
            "{} render records, scale {}..{}",
            input.records.len(),
            scale.min,
            scale.max
        ));

        PipelineOutput {
            records: input.records,
            scale,
            notes,
        }
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new(ScaleConfig::default())
    }
}
