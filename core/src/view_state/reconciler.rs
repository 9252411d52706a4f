use crate::prelude::{FilterState, HourSelection, TimeMode};
use crate::records::{StationRecord, TransportType};
use crate::telemetry::log::LogManager;
use crate::view_state::camera::{CameraDelta, CameraState};

/// What the reconciler did with a camera report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CameraOutcome {
    /// Genuine navigation, merged into the persisted camera.
    Applied,
    /// Relayout noise following a filter change.
    Discarded,
    /// Nothing pending and nothing to merge.
    Ignored,
}

/// Owns the filter state, threshold minimum and camera, and decides whether a
/// camera report is user navigation or fallout from a filter change.
///
/// The single pending flag is only sound because every event is handled to
/// completion on one thread before the next one arrives.
#[derive(Debug, Clone)]
pub struct ViewStateReconciler {
    pending_filter_update: bool,
    filters: FilterState,
    threshold_min: u64,
    camera: CameraState,
    logger: LogManager,
}

impl ViewStateReconciler {
    pub fn new(filters: FilterState, camera: CameraState) -> Self {
        Self {
            pending_filter_update: false,
            filters,
            threshold_min: 0,
            camera,
            logger: LogManager::new("view-state"),
        }
    }

    pub fn filters(&self) -> &FilterState {
        &self.filters
    }

    pub fn threshold_min(&self) -> u64 {
        self.threshold_min
    }

    pub fn camera(&self) -> &CameraState {
        &self.camera
    }

    pub fn is_filter_update_pending(&self) -> bool {
        self.pending_filter_update
    }

    pub fn set_line_types(&mut self, types: impl IntoIterator<Item = TransportType>) {
        self.begin_filter_update();
        self.filters.line_types = types.into_iter().collect();
    }

    pub fn toggle_line_type(&mut self, transport: TransportType, enabled: bool) {
        self.begin_filter_update();
        if enabled {
            self.filters.line_types.insert(transport);
        } else {
            self.filters.line_types.remove(&transport);
        }
    }

    /// Entering hourly mode selects [`default_hour`]; leaving it resets the
    /// selector to `All`.
    pub fn set_time_mode(&mut self, mode: TimeMode, records: &[StationRecord], fallback_hour: u8) {
        self.begin_filter_update();
        self.filters.time_mode = mode;
        self.filters.hour = match mode {
            TimeMode::Hourly => {
                HourSelection::Hour(u32::from(default_hour(records, fallback_hour)))
            }
            TimeMode::WholeDay => HourSelection::All,
        };
    }

    pub fn set_hour(&mut self, hour: HourSelection) {
        self.begin_filter_update();
        self.filters.hour = hour;
    }

    /// Stores `min` clamped to the current scale ceiling.
    pub fn set_min_threshold(&mut self, min: u64, ceiling: u64) {
        self.begin_filter_update();
        self.threshold_min = min.min(ceiling);
    }

    /// Pulls the stored minimum back under a ceiling that just moved. Part of
    /// whatever update moved the ceiling, so the pending flag is untouched.
    pub fn clamp_threshold(&mut self, ceiling: u64) {
        if self.threshold_min > ceiling {
            self.logger.trace_stage(&format!(
                "threshold {} clamped to new ceiling {ceiling}",
                self.threshold_min
            ));
            self.threshold_min = ceiling;
        }
    }

    /// A newly loaded dataset makes the widget relayout just like a filter
    /// change does; that relayout must not move the camera either.
    pub fn mark_data_changed(&mut self) {
        self.begin_filter_update();
    }

    /// Handles one camera report from the rendering widget. The pending flag
    /// is cleared whatever the outcome.
    pub fn on_camera_changed(&mut self, delta: &CameraDelta) -> CameraOutcome {
        if std::mem::take(&mut self.pending_filter_update) {
            self.logger
                .trace_stage(&format!("discarding relayout after filter change: {delta:?}"));
            return CameraOutcome::Discarded;
        }
        if delta.is_empty() {
            return CameraOutcome::Ignored;
        }
        self.camera.merge(delta);
        CameraOutcome::Applied
    }

    fn begin_filter_update(&mut self) {
        self.pending_filter_update = true;
    }
}

/// Hour holding the most records; ties go to the lowest hour. An empty
/// dataset yields `fallback`.
pub fn default_hour(records: &[StationRecord], fallback: u8) -> u8 {
    let mut per_hour = [0usize; 24];
    for record in records {
        if let Some(slot) = per_hour.get_mut(usize::from(record.hour)) {
            *slot += 1;
        }
    }

    let mut best: Option<(u8, usize)> = None;
    for (hour, &count) in (0u8..).zip(per_hour.iter()) {
        if count > 0 && best.map_or(true, |(_, best_count)| count > best_count) {
            best = Some((hour, count));
        }
    }
    best.map(|(hour, _)| hour).unwrap_or(fallback)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reconciler() -> ViewStateReconciler {
        ViewStateReconciler::new(FilterState::default(), CameraState::default())
    }

    fn records_at(hours: &[u8]) -> Vec<StationRecord> {
        hours
            .iter()
            .map(|&hour| StationRecord::new("S", 52.0, 21.0, TransportType::Bus, hour, 1))
            .collect()
    }

    #[test]
    fn filter_change_preserves_camera() {
        let mut state = reconciler();
        let before = state.camera().clone();

        state.toggle_line_type(TransportType::Tram, false);
        let outcome = state.on_camera_changed(&CameraDelta::center(50.0, 19.0).with_zoom(5.0));

        assert_eq!(outcome, CameraOutcome::Discarded);
        assert_eq!(state.camera(), &before);
        assert!(!state.is_filter_update_pending());
    }

    #[test]
    fn user_navigation_updates_camera() {
        let mut state = reconciler();
        let outcome = state.on_camera_changed(&CameraDelta::center(52.3, 21.1).with_zoom(14.0));

        assert_eq!(outcome, CameraOutcome::Applied);
        assert_eq!(state.camera().center_lat, 52.3);
        assert_eq!(state.camera().center_lon, 21.1);
        assert_eq!(state.camera().zoom, 14.0);
    }

    #[test]
    fn only_the_first_report_after_a_filter_change_is_discarded() {
        let mut state = reconciler();
        state.set_hour(HourSelection::Hour(7));
        assert_eq!(state.on_camera_changed(&CameraDelta::zoom(3.0)), CameraOutcome::Discarded);
        assert_eq!(state.on_camera_changed(&CameraDelta::zoom(12.5)), CameraOutcome::Applied);
        assert_eq!(state.camera().zoom, 12.5);
    }

    #[test]
    fn empty_report_without_pending_change_is_ignored() {
        let mut state = reconciler();
        assert_eq!(state.on_camera_changed(&CameraDelta::default()), CameraOutcome::Ignored);
    }

    #[test]
    fn every_filter_edit_sets_the_pending_flag() {
        let records = records_at(&[8]);
        let edits: Vec<Box<dyn Fn(&mut ViewStateReconciler)>> = vec![
            Box::new(|s: &mut ViewStateReconciler| s.set_line_types([TransportType::Bus])),
            Box::new(|s: &mut ViewStateReconciler| s.toggle_line_type(TransportType::Metro, true)),
            Box::new(move |s: &mut ViewStateReconciler| {
                s.set_time_mode(TimeMode::Hourly, &records, 12)
            }),
            Box::new(|s: &mut ViewStateReconciler| s.set_hour(HourSelection::Hour(3))),
            Box::new(|s: &mut ViewStateReconciler| s.set_min_threshold(10, 100)),
        ];
        for edit in edits {
            let mut state = reconciler();
            edit(&mut state);
            assert!(state.is_filter_update_pending());
        }
    }

    #[test]
    fn entering_hourly_picks_busiest_hour_and_leaving_resets() {
        let mut state = reconciler();
        let records = records_at(&[7, 8, 8, 9, 9, 9]);

        state.set_time_mode(TimeMode::Hourly, &records, 12);
        assert_eq!(state.filters().hour, HourSelection::Hour(9));

        state.set_time_mode(TimeMode::WholeDay, &records, 12);
        assert_eq!(state.filters().hour, HourSelection::All);
    }

    #[test]
    fn default_hour_ties_go_to_lowest_hour() {
        assert_eq!(default_hour(&records_at(&[17, 6, 17, 6]), 12), 6);
    }

    #[test]
    fn default_hour_falls_back_on_empty_dataset() {
        assert_eq!(default_hour(&[], 12), 12);
    }

    #[test]
    fn data_change_discards_the_following_relayout() {
        let mut state = reconciler();
        let before = state.camera().clone();
        state.mark_data_changed();
        assert_eq!(
            state.on_camera_changed(&CameraDelta::center(52.25, 21.15).with_zoom(9.7)),
            CameraOutcome::Discarded
        );
        assert_eq!(state.camera(), &before);
    }

    #[test]
    fn clamping_to_a_lower_ceiling_leaves_the_flag_alone() {
        let mut state = reconciler();
        state.set_min_threshold(15_000, 20_000);
        state.on_camera_changed(&CameraDelta::default());

        state.clamp_threshold(2_200);
        assert_eq!(state.threshold_min(), 2_200);
        assert!(!state.is_filter_update_pending());

        state.clamp_threshold(30_000);
        assert_eq!(state.threshold_min(), 2_200);
    }

    #[test]
    fn threshold_is_clamped_to_ceiling() {
        let mut state = reconciler();
        state.set_min_threshold(50_000, 20_000);
        assert_eq!(state.threshold_min(), 20_000);
    }
}
