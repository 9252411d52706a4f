use crate::generator::profile::build_dataset;
use crate::workflow::config::WorkflowConfig;
use anyhow::Context;
use log::info;
use ridercore::processing::{Pipeline, ScaleRange};
use ridercore::view_state::default_hour;
use ridercore::{FilterState, HourSelection, RecordStore, StationRecord, TimeMode, TransportType};
use serde::Serialize;
use std::fs::File;
use std::io::BufReader;

const BUSIEST_LISTED: usize = 5;

/// Dataset-wide summary produced by an offline run.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct WorkflowResult {
    pub record_count: usize,
    pub station_count: usize,
    pub stations_per_type: Vec<(TransportType, usize)>,
    pub whole_day_scale: ScaleRange,
    pub hourly_scale: ScaleRange,
    pub default_hour: u8,
    pub busiest: Vec<StationRecord>,
}

impl WorkflowResult {
    pub fn report_line(&self) -> String {
        format!(
            "records={} stations={} whole_day_max={} hourly_max={} default_hour={}\n",
            self.record_count,
            self.station_count,
            self.whole_day_scale.max,
            self.hourly_scale.max,
            self.default_hour
        )
    }
}

#[derive(Clone)]
pub struct Runner {
    config: WorkflowConfig,
}

impl Runner {
    pub fn new(config: WorkflowConfig) -> Self {
        Self { config }
    }

    /// Reads the configured dataset, or synthesizes one when none is set.
    pub fn load_store(&self) -> anyhow::Result<RecordStore> {
        match &self.config.dataset {
            Some(path) => {
                let file = File::open(path)
                    .with_context(|| format!("opening dataset {}", path.display()))?;
                let store = RecordStore::from_reader(BufReader::new(file))
                    .with_context(|| format!("loading dataset {}", path.display()))?;
                info!("loaded {} records from {}", store.len(), path.display());
                Ok(store)
            }
            None => {
                let records =
                    build_dataset(&self.config.generator).context("synthesizing dataset")?;
                let store = RecordStore::from_records(records)
                    .context("validating synthesized dataset")?;
                info!(
                    "synthesized {} records for {} stations (seed {})",
                    store.len(),
                    self.config.generator.stations,
                    self.config.generator.seed
                );
                Ok(store)
            }
        }
    }

    pub fn execute(&self, store: &RecordStore) -> WorkflowResult {
        let session = &self.config.session;
        let pipeline = Pipeline::new(session.scale);
        let records = store.records();

        let whole_day_filters = FilterState::new(TransportType::ALL);
        let whole_day = pipeline.run(records, &whole_day_filters, 0);

        let hourly_filters = FilterState {
            time_mode: TimeMode::Hourly,
            ..whole_day_filters
        };
        let hourly_scale = pipeline.scale(records, &hourly_filters);

        let stations_per_type = TransportType::ALL
            .into_iter()
            .map(|transport| {
                let count = whole_day
                    .records
                    .iter()
                    .filter(|record| record.transport == transport)
                    .count();
                (transport, count)
            })
            .collect();

        WorkflowResult {
            record_count: store.len(),
            station_count: whole_day.records.len(),
            stations_per_type,
            whole_day_scale: whole_day.scale,
            hourly_scale,
            default_hour: default_hour(records, session.fallback_hour),
            busiest: whole_day.records.into_iter().take(BUSIEST_LISTED).collect(),
        }
    }

    /// Busiest stations for one hour, in render order. A selection outside
    /// 0-23 lists nothing.
    pub fn busiest_at(&self, store: &RecordStore, hour: HourSelection) -> Vec<StationRecord> {
        let filters = FilterState {
            time_mode: TimeMode::Hourly,
            hour,
            ..FilterState::new(TransportType::ALL)
        };
        Pipeline::new(self.config.session.scale)
            .run(store.records(), &filters, 0)
            .records
            .into_iter()
            .take(BUSIEST_LISTED)
            .collect()
    }
}
