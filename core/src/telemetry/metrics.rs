use std::sync::Mutex;

/// Session counters. Interior mutability lets read-only paths such as frame
/// rendering still count their runs.
pub struct MetricsRecorder {
    inner: Mutex<MetricsSnapshot>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub pipeline_runs: usize,
    pub load_failures: usize,
    pub camera_applied: usize,
    pub camera_discarded: usize,
}

impl MetricsRecorder {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(MetricsSnapshot::default()),
        }
    }

    pub fn record_pipeline_run(&self) {
        self.update(|metrics| metrics.pipeline_runs += 1);
    }

    pub fn record_load_failure(&self) {
        self.update(|metrics| metrics.load_failures += 1);
    }

    pub fn record_camera_applied(&self) {
        self.update(|metrics| metrics.camera_applied += 1);
    }

    pub fn record_camera_discarded(&self) {
        self.update(|metrics| metrics.camera_discarded += 1);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        self.inner
            .lock()
            .map(|metrics| *metrics)
            .unwrap_or_default()
    }

    fn update(&self, apply: impl FnOnce(&mut MetricsSnapshot)) {
        if let Ok(mut metrics) = self.inner.lock() {
            apply(&mut metrics);
        }
    }
}

impl Default for MetricsRecorder {
    fn default() -> Self {
        Self::new()
    }
}
