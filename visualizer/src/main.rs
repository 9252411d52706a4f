use heatmap::HeatMap;
use iced::{
    widget::{button, canvas::Canvas, column, row, slider, text, Button, Column, Container, Row},
    Alignment, Element, Length, Size, Task, Theme,
};
use log::{debug, warn};
use ridercore::view_state::{CameraDelta, CameraOutcome};
use ridercore::{
    HourSelection, RenderFrame, Session, SessionConfig, TimeMode, TransportType,
};

mod heatmap;

const DEFAULT_SERVER: &str = "http://127.0.0.1:9000";
const SERVER_ENV: &str = "RIDERSHIP_SERVER";
const RELAYOUT_SIZE: Size = Size::new(1024.0, 768.0);
const HISTORY_LIMIT: usize = 20;

fn main() -> iced::Result {
    env_logger::init();
    iced::application(Viewer::boot, Viewer::update, Viewer::view)
        .title(application_title)
        .theme(application_theme)
        .run()
}

fn application_title(_: &Viewer) -> String {
    "Transit Ridership Heat-Map".into()
}

fn application_theme(state: &Viewer) -> Theme {
    match state.theme_mode {
        ThemeMode::System => <Theme as iced::theme::Base>::default(iced::theme::Mode::None),
        ThemeMode::Light => Theme::Light,
        ThemeMode::Dark => Theme::Dark,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ThemeMode {
    System,
    Light,
    Dark,
}

impl ThemeMode {
    const ALL: [ThemeMode; 3] = [ThemeMode::System, ThemeMode::Light, ThemeMode::Dark];

    fn label(self) -> &'static str {
        match self {
            ThemeMode::System => "System",
            ThemeMode::Light => "Light",
            ThemeMode::Dark => "Dark",
        }
    }
}

/// Readiness of the map widget; it needs the server's config before it can draw.
#[derive(Debug, Clone, PartialEq)]
enum MapStatus {
    Initializing,
    Ready,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq)]
enum DataStatus {
    Loading,
    Loaded(usize),
    Failed(String),
}

struct Viewer {
    server: String,
    config: SessionConfig,
    session: Session,
    frame: RenderFrame,
    map: MapStatus,
    data: DataStatus,
    theme_mode: ThemeMode,
    history: Vec<String>,
}

#[derive(Debug, Clone)]
enum Message {
    ConfigFetched(Result<SessionConfig, String>),
    DatasetFetched(Result<String, String>),
    RetryMap,
    RetryDataset,
    LineTypeToggled(TransportType, bool),
    TimeModeSelected(TimeMode),
    HourChanged(u8),
    ThresholdChanged(f64),
    CameraChanged(CameraDelta),
    ThemeSelected(ThemeMode),
}

impl Viewer {
    fn boot() -> (Self, Task<Message>) {
        let server = std::env::var(SERVER_ENV).unwrap_or_else(|_| DEFAULT_SERVER.into());
        let task = Task::perform(fetch_config(server.clone()), Message::ConfigFetched);
        (Viewer::new(server), task)
    }

    fn new(server: String) -> Self {
        let config = SessionConfig::default();
        let session = Session::new(&config);
        let frame = session.frame();
        Viewer {
            server,
            config,
            session,
            frame,
            map: MapStatus::Initializing,
            data: DataStatus::Loading,
            theme_mode: ThemeMode::System,
            history: Vec::new(),
        }
    }

    fn update(state: &mut Self, message: Message) -> Task<Message> {
        match message {
            Message::ConfigFetched(Ok(config)) => {
                state.session = Session::new(&config);
                state.config = config;
                state.map = MapStatus::Ready;
                state.data = DataStatus::Loading;
                state.refresh();
                state.push_history("Map initialized".into());
                Task::perform(fetch_dataset(state.server.clone()), Message::DatasetFetched)
            }
            Message::ConfigFetched(Err(err)) => {
                warn!("map initialization failed: {err}");
                state.map = MapStatus::Failed(err);
                Task::none()
            }
            Message::RetryMap => {
                state.map = MapStatus::Initializing;
                Task::perform(fetch_config(state.server.clone()), Message::ConfigFetched)
            }
            Message::DatasetFetched(Ok(contents)) => match state.session.load_json(&contents) {
                Ok(count) => {
                    state.data = DataStatus::Loaded(count);
                    state.data_changed();
                    state.push_history(format!("Dataset loaded: {count} records"));
                    Task::none()
                }
                Err(err) => {
                    state.data = DataStatus::Failed(err.to_string());
                    Task::none()
                }
            },
            Message::DatasetFetched(Err(err)) => {
                warn!("dataset fetch failed: {err}");
                state.data = DataStatus::Failed(err);
                Task::none()
            }
            Message::RetryDataset => {
                state.data = DataStatus::Loading;
                Task::perform(fetch_dataset(state.server.clone()), Message::DatasetFetched)
            }
            Message::LineTypeToggled(transport, enabled) => {
                state.session.toggle_line_type(transport, enabled);
                state.data_changed();
                Task::none()
            }
            Message::TimeModeSelected(mode) => {
                state.session.set_time_mode(mode);
                state.data_changed();
                Task::none()
            }
            Message::HourChanged(hour) => {
                state
                    .session
                    .set_hour(HourSelection::Hour(u32::from(hour)));
                state.data_changed();
                Task::none()
            }
            Message::ThresholdChanged(value) => {
                state.session.set_min_threshold(value.max(0.0).round() as u64);
                state.data_changed();
                Task::none()
            }
            Message::CameraChanged(delta) => {
                match state.session.on_camera_changed(&delta) {
                    CameraOutcome::Applied => state.frame.camera = state.session.camera().clone(),
                    CameraOutcome::Discarded => debug!("camera report after data change ignored"),
                    CameraOutcome::Ignored => {}
                }
                Task::none()
            }
            Message::ThemeSelected(mode) => {
                state.theme_mode = mode;
                Task::none()
            }
        }
    }

    fn view(state: &Self) -> Element<'_, Message> {
        if state.map != MapStatus::Ready {
            return state.view_not_ready();
        }

        let layout = row![state.view_controls(), state.view_map()]
            .spacing(16)
            .align_y(Alignment::Start)
            .padding(16);

        Container::new(layout)
            .width(Length::Fill)
            .height(Length::Fill)
            .into()
    }

    fn view_not_ready(&self) -> Element<'_, Message> {
        let content = match &self.map {
            MapStatus::Failed(err) => column![
                text("Map Error").size(26),
                text(format!("Error: {err}")).size(14),
                text("Check that the ridership server is running and reachable.").size(14),
                button("Retry Loading Map")
                    .on_press(Message::RetryMap)
                    .padding(10),
            ],
            _ => column![
                text("Initializing Map...").size(26),
                text("Please wait while the map loads.").size(14),
            ],
        }
        .spacing(10)
        .align_x(Alignment::Center);

        Container::new(content)
            .width(Length::Fill)
            .height(Length::Fill)
            .center_x(Length::Fill)
            .center_y(Length::Fill)
            .into()
    }

    fn view_controls(&self) -> Element<'_, Message> {
        let filters = &self.frame.filters;

        let mode_row = row![
            toggle_button(
                "Whole Day",
                filters.time_mode == TimeMode::WholeDay,
                Message::TimeModeSelected(TimeMode::WholeDay),
            ),
            toggle_button(
                "Hourly",
                filters.time_mode == TimeMode::Hourly,
                Message::TimeModeSelected(TimeMode::Hourly),
            ),
        ]
        .spacing(6);

        let type_row = TransportType::ALL
            .into_iter()
            .fold(Row::new().spacing(6), |row, transport| {
                let active = filters.line_types.contains(&transport);
                row.push(toggle_button(
                    transport.line_type(),
                    active,
                    Message::LineTypeToggled(transport, !active),
                ))
            });

        let mut controls = Column::new()
            .spacing(10)
            .width(Length::Fixed(320.0))
            .push(text("Time").size(18))
            .push(mode_row)
            .push(text("Lines").size(18))
            .push(type_row);

        if filters.time_mode == TimeMode::Hourly {
            let hour = filters.hour.hour().unwrap_or(self.session.fallback_hour());
            controls = controls
                .push(text(format!("Hour: {hour}:00")).size(16))
                .push(slider(0..=23u8, hour, Message::HourChanged));
        }

        let threshold = self.frame.threshold;
        let max = threshold.max as f64;
        controls = controls
            .push(text(format!("Min: {}", threshold.min)).size(16))
            .push(
                slider(0.0..=max, threshold.min as f64, Message::ThresholdChanged)
                    .step(max / 100.0),
            );

        let theme_row = ThemeMode::ALL
            .into_iter()
            .fold(Row::new().spacing(6), |row, mode| {
                row.push(toggle_button(
                    mode.label(),
                    self.theme_mode == mode,
                    Message::ThemeSelected(mode),
                ))
            });
        controls = controls.push(text("Theme").size(18)).push(theme_row);

        controls = controls.push(text(self.status_line()).size(12));
        if let DataStatus::Failed(err) = &self.data {
            controls = controls
                .push(text(format!("Data error: {err}")).size(12))
                .push(
                    button("Retry Loading Data")
                        .on_press(Message::RetryDataset)
                        .padding(8),
                );
        } else if self.frame.is_empty() {
            controls = controls.push(text("No data for this selection").size(12));
        }

        let history = self
            .history
            .iter()
            .rev()
            .fold(Column::new().spacing(2), |col, entry| {
                col.push(text(entry.clone()).size(11))
            });
        controls.push(history).into()
    }

    fn view_map(&self) -> Element<'_, Message> {
        Canvas::new(HeatMap::new(
            &self.frame.records,
            self.frame.scale,
            &self.frame.camera,
        ))
        .width(Length::Fill)
        .height(Length::Fill)
        .into()
    }

    fn status_line(&self) -> String {
        let style = match self.theme_mode {
            ThemeMode::Dark => &self.config.map_style.dark,
            _ => &self.config.map_style.light,
        };
        format!(
            "Data points: {} | Stations: {} | Map initialized: Yes | Style: {}",
            self.session.store().len(),
            self.frame.records.len(),
            style
        )
    }

    fn refresh(&mut self) {
        self.frame = self.session.frame();
    }

    /// Re-runs the pipeline after a filter or data change and hands the
    /// widget's relayout straight back to the session within the same update,
    /// so each change is paired with its own relayout report.
    fn data_changed(&mut self) {
        self.refresh();
        let delta = heatmap::relayout(&self.frame.records, RELAYOUT_SIZE);
        let outcome = self.session.on_camera_changed(&delta);
        debug!("widget relayout {outcome:?}");
    }

    fn push_history(&mut self, entry: String) {
        self.history.push(entry);
        if self.history.len() > HISTORY_LIMIT {
            self.history.remove(0);
        }
    }
}

fn toggle_button(label: &str, active: bool, message: Message) -> Button<'_, Message> {
    let base = button(text(label).size(14)).padding([6, 12]).on_press(message);
    if active {
        base.style(button::primary)
    } else {
        base.style(button::secondary)
    }
}

async fn fetch_config(server: String) -> Result<SessionConfig, String> {
    let response = reqwest::get(format!("{server}/config"))
        .await
        .map_err(|e| e.to_string())?;
    if !response.status().is_success() {
        return Err(format!("HTTP error! status: {}", response.status()));
    }
    response
        .json::<SessionConfig>()
        .await
        .map_err(|e| e.to_string())
}

async fn fetch_dataset(server: String) -> Result<String, String> {
    let response = reqwest::get(format!("{server}/aggregated_data.json"))
        .await
        .map_err(|e| e.to_string())?;
    if !response.status().is_success() {
        return Err(format!("HTTP error! status: {}", response.status()));
    }
    response.text().await.map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ridercore::view_state::CameraState;

    const DATASET: &str = r#"[
        {"name":"A","lat":52.1,"lon":21.0,"type":"Autobus","hour":8,"count":50},
        {"name":"A","lat":52.1,"lon":21.0,"type":"Autobus","hour":9,"count":70},
        {"name":"B","lat":52.2,"lon":21.1,"type":"Tramwaj","hour":9,"count":300}
    ]"#;

    fn ready() -> Viewer {
        let mut viewer = Viewer::new(DEFAULT_SERVER.into());
        let _ = Viewer::update(&mut viewer, Message::ConfigFetched(Ok(SessionConfig::default())));
        let _ = Viewer::update(&mut viewer, Message::DatasetFetched(Ok(DATASET.into())));
        viewer
    }

    #[test]
    fn loading_the_dataset_keeps_the_initial_camera() {
        let viewer = ready();
        assert_eq!(viewer.data, DataStatus::Loaded(3));
        assert_eq!(viewer.frame.records.len(), 2);
        assert_eq!(viewer.frame.camera, CameraState::default());
        assert_eq!(viewer.session.metrics().camera_discarded, 1);
    }

    #[test]
    fn quick_slider_moves_keep_the_camera() {
        let mut viewer = ready();
        let _ = Viewer::update(&mut viewer, Message::ThresholdChanged(10.0));
        let _ = Viewer::update(&mut viewer, Message::ThresholdChanged(20.0));
        let _ = Viewer::update(&mut viewer, Message::HourChanged(9));

        assert_eq!(viewer.frame.camera, CameraState::default());
        assert_eq!(viewer.frame.threshold.min, 20);
        assert!(!viewer.session.is_filter_update_pending());
    }

    #[test]
    fn gestures_after_a_filter_change_still_move_the_camera() {
        let mut viewer = ready();
        let _ = Viewer::update(&mut viewer, Message::TimeModeSelected(TimeMode::Hourly));
        let _ = Viewer::update(&mut viewer, Message::CameraChanged(CameraDelta::zoom(14.0)));
        assert_eq!(viewer.frame.camera.zoom, 14.0);
        assert_eq!(viewer.session.metrics().camera_applied, 1);
    }
}
