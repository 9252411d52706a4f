use crate::records::{StationRecord, TransportType};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Aggregation mode selected by the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TimeMode {
    #[default]
    WholeDay,
    Hourly,
}

/// Hour selector value. `All` is the sentinel used outside hourly mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum HourSelection {
    #[default]
    All,
    Hour(u32),
}

impl HourSelection {
    /// Parses slider or query input. Anything that is not a non-negative
    /// integer maps to `All`, which matches no hour.
    pub fn parse(input: &str) -> Self {
        input
            .trim()
            .parse::<u32>()
            .map(HourSelection::Hour)
            .unwrap_or(HourSelection::All)
    }

    /// The selected hour if it lies in 0-23.
    pub fn hour(self) -> Option<u8> {
        match self {
            HourSelection::Hour(hour) if hour <= 23 => u8::try_from(hour).ok(),
            _ => None,
        }
    }
}

impl fmt::Display for HourSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HourSelection::All => f.write_str("all"),
            HourSelection::Hour(hour) => write!(f, "{hour}"),
        }
    }
}

/// User-controlled filter inputs to the pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterState {
    pub line_types: BTreeSet<TransportType>,
    pub time_mode: TimeMode,
    pub hour: HourSelection,
}

impl FilterState {
    pub fn new(line_types: impl IntoIterator<Item = TransportType>) -> Self {
        Self {
            line_types: line_types.into_iter().collect(),
            time_mode: TimeMode::WholeDay,
            hour: HourSelection::All,
        }
    }
}

impl Default for FilterState {
    fn default() -> Self {
        Self::new(TransportType::ALL)
    }
}

/// Input payload for a record stage.
#[derive(Debug, Clone, Default)]
pub struct StageInput {
    pub records: Vec<StationRecord>,
}

/// Output produced by each stage.
#[derive(Debug, Clone, Default)]
pub struct StageOutput {
    pub records: Vec<StationRecord>,
    pub metadata: StageMetadata,
}

/// Bookkeeping used for chaining stages and telemetry.
#[derive(Debug, Clone, Default)]
pub struct StageMetadata {
    pub input_len: usize,
    pub notes: Vec<String>,
}

/// A pure transformation over a record set. Stages never fail: every input
/// has a well-defined (possibly empty) output.
pub trait ProcessingStage {
    fn name(&self) -> &'static str;
    fn execute(&self, input: StageInput) -> StageOutput;
}
