use crate::prelude::{FilterState, HourSelection, TimeMode};
use crate::processing::{Pipeline, ScaleConfig, ScaleRange, ThresholdRange};
use crate::records::{LoadError, LoadResult, RecordStore, StationRecord, TransportType};
use crate::telemetry::{LogManager, MetricsRecorder, MetricsSnapshot};
use crate::view_state::{CameraDelta, CameraOutcome, CameraState, ViewStateReconciler};
use serde::{Deserialize, Serialize};

/// Last valid hour of the day.
pub const LAST_HOUR: u8 = 23;

/// Base-map styles handed to the rendering boundary at construction time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapStyle {
    pub light: String,
    pub dark: String,
}

impl Default for MapStyle {
    fn default() -> Self {
        Self {
            light: "carto-positron".into(),
            dark: "carto-darkmatter".into(),
        }
    }
}

/// Everything a session needs besides the records themselves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub scale: ScaleConfig,
    pub initial_camera: CameraState,
    pub line_types: Vec<TransportType>,
    pub fallback_hour: u8,
    pub map_style: MapStyle,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            scale: ScaleConfig::default(),
            initial_camera: CameraState::default(),
            line_types: TransportType::ALL.to_vec(),
            fallback_hour: 12,
            map_style: MapStyle::default(),
        }
    }
}

/// Everything the rendering boundary needs for one draw.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderFrame {
    pub records: Vec<StationRecord>,
    pub scale: ScaleRange,
    pub threshold: ThresholdRange,
    pub filters: FilterState,
    pub camera: CameraState,
}

impl RenderFrame {
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// One user's view of the dataset: the write-once store, the reconciler that
/// owns all mutable view state, and the pipeline that derives each frame.
pub struct Session {
    store: RecordStore,
    reconciler: ViewStateReconciler,
    pipeline: Pipeline,
    fallback_hour: u8,
    metrics: MetricsRecorder,
    logger: LogManager,
}

impl Session {
    pub fn new(config: &SessionConfig) -> Self {
        Self::with_store(RecordStore::empty(), config)
    }

    pub fn with_store(store: RecordStore, config: &SessionConfig) -> Self {
        let logger = LogManager::new("session");
        let fallback_hour = if config.fallback_hour > LAST_HOUR {
            logger.warn(&format!(
                "fallback hour {} is not an hour of the day; using {LAST_HOUR}",
                config.fallback_hour
            ));
            LAST_HOUR
        } else {
            config.fallback_hour
        };
        let filters = FilterState::new(config.line_types.iter().copied());
        Self {
            store,
            reconciler: ViewStateReconciler::new(filters, config.initial_camera.clone()),
            pipeline: Pipeline::new(config.scale),
            fallback_hour,
            metrics: MetricsRecorder::new(),
            logger,
        }
    }

    /// Populates the store from a JSON array. Fails without touching the store
    /// when the payload is malformed or the store is already populated.
    pub fn load_json(&mut self, contents: &str) -> LoadResult<usize> {
        if !self.store.is_empty() {
            return Err(LoadError::AlreadyLoaded);
        }
        match RecordStore::from_json_str(contents) {
            Ok(store) => {
                self.logger
                    .record(&format!("loaded {} ridership records", store.len()));
                self.store = store;
                self.reconciler.mark_data_changed();
                self.clamp_threshold();
                Ok(self.store.len())
            }
            Err(err) => {
                self.metrics.record_load_failure();
                self.logger.warn(&format!("dataset load failed: {err}"));
                Err(err)
            }
        }
    }

    pub fn store(&self) -> &RecordStore {
        &self.store
    }

    pub fn filters(&self) -> &FilterState {
        self.reconciler.filters()
    }

    pub fn camera(&self) -> &CameraState {
        self.reconciler.camera()
    }

    pub fn threshold_min(&self) -> u64 {
        self.reconciler.threshold_min()
    }

    pub fn is_filter_update_pending(&self) -> bool {
        self.reconciler.is_filter_update_pending()
    }

    pub fn fallback_hour(&self) -> u8 {
        self.fallback_hour
    }

    pub fn set_line_types(&mut self, types: impl IntoIterator<Item = TransportType>) {
        self.reconciler.set_line_types(types);
        self.clamp_threshold();
    }

    pub fn toggle_line_type(&mut self, transport: TransportType, enabled: bool) {
        self.reconciler.toggle_line_type(transport, enabled);
        self.clamp_threshold();
    }

    pub fn set_time_mode(&mut self, mode: TimeMode) {
        self.reconciler
            .set_time_mode(mode, self.store.records(), self.fallback_hour);
        self.clamp_threshold();
    }

    pub fn set_hour(&mut self, hour: HourSelection) {
        self.reconciler.set_hour(hour);
    }

    pub fn set_min_threshold(&mut self, min: u64) {
        let ceiling = self.scale().max;
        self.reconciler.set_min_threshold(min, ceiling);
    }

    pub fn on_camera_changed(&mut self, delta: &CameraDelta) -> CameraOutcome {
        let outcome = self.reconciler.on_camera_changed(delta);
        match outcome {
            CameraOutcome::Applied => self.metrics.record_camera_applied(),
            CameraOutcome::Discarded => self.metrics.record_camera_discarded(),
            CameraOutcome::Ignored => {}
        }
        outcome
    }

    /// Keeps the threshold minimum inside a ceiling that a type, mode or
    /// data change may have lowered.
    fn clamp_threshold(&mut self) {
        let ceiling = self.scale().max;
        self.reconciler.clamp_threshold(ceiling);
    }

    pub fn scale(&self) -> ScaleRange {
        self.pipeline.scale(self.store.records(), self.reconciler.filters())
    }

    /// Runs the full pipeline against the current view state.
    pub fn frame(&self) -> RenderFrame {
        let filters = self.reconciler.filters().clone();
        let min = self.reconciler.threshold_min();
        let output = self.pipeline.run(self.store.records(), &filters, min);
        self.metrics.record_pipeline_run();

        RenderFrame {
            records: output.records,
            threshold: ThresholdRange {
                min,
                max: output.scale.max,
            },
            scale: output.scale,
            filters,
            camera: self.reconciler.camera().clone(),
        }
    }

    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }
}
