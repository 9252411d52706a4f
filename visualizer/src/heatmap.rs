use crate::Message;
use iced::widget::canvas::{self, Event, Frame, Geometry, Path, Stroke};
use iced::{mouse, Color, Pixels, Point, Rectangle, Renderer, Size, Theme};
use ridercore::math::{GeoBounds, HeatGrid};
use ridercore::processing::ScaleRange;
use ridercore::view_state::{CameraDelta, CameraState};
use ridercore::StationRecord;
use std::f64::consts::PI;

const TILE_SIZE: f64 = 256.0;
const MAX_LATITUDE: f64 = 85.051_128_78;
const MIN_ZOOM: f64 = 3.0;
const MAX_ZOOM: f64 = 17.0;
const ZOOM_PER_LINE: f64 = 0.5;
const PIXELS_PER_LINE: f32 = 60.0;
const GRID_CELLS: usize = 48;
const FIT_MARGIN: f64 = 0.9;
const HOVER_RADIUS: f32 = 14.0;
const LEGEND_TICK: u64 = 5_000;
const LEGEND_MAX_TICKS: u64 = 8;
const LEGEND_BAR_WIDTH: f32 = 12.0;
const LEGEND_STEPS: usize = 40;

const VIRIDIS: [(f32, f32, f32); 5] = [
    (0.267, 0.005, 0.329),
    (0.229, 0.322, 0.546),
    (0.128, 0.567, 0.551),
    (0.369, 0.789, 0.383),
    (0.993, 0.906, 0.144),
];

fn world_size(zoom: f64) -> f64 {
    TILE_SIZE * 2f64.powf(zoom)
}

/// Web Mercator world pixel for a coordinate at `zoom`.
fn project(lat: f64, lon: f64, zoom: f64) -> (f64, f64) {
    let size = world_size(zoom);
    let lat = lat.clamp(-MAX_LATITUDE, MAX_LATITUDE).to_radians();
    let x = (lon + 180.0) / 360.0 * size;
    let y = (1.0 - (lat.tan() + 1.0 / lat.cos()).ln() / PI) / 2.0 * size;
    (x, y)
}

fn unproject(x: f64, y: f64, zoom: f64) -> (f64, f64) {
    let size = world_size(zoom);
    let lon = x / size * 360.0 - 180.0;
    let n = PI - 2.0 * PI * y / size;
    (n.sinh().atan().to_degrees(), lon)
}

/// Screen mapping for one camera and canvas size.
struct Viewport {
    center: (f64, f64),
    zoom: f64,
    size: Size,
}

impl Viewport {
    fn new(camera: &CameraState, size: Size) -> Self {
        Self {
            center: project(camera.center_lat, camera.center_lon, camera.zoom),
            zoom: camera.zoom,
            size,
        }
    }

    fn to_screen(&self, lat: f64, lon: f64) -> Point {
        let (x, y) = project(lat, lon, self.zoom);
        Point::new(
            (x - self.center.0 + f64::from(self.size.width) / 2.0) as f32,
            (y - self.center.1 + f64::from(self.size.height) / 2.0) as f32,
        )
    }

    fn from_screen(&self, point: Point) -> (f64, f64) {
        let x = self.center.0 + f64::from(point.x) - f64::from(self.size.width) / 2.0;
        let y = self.center.1 + f64::from(point.y) - f64::from(self.size.height) / 2.0;
        unproject(x, y, self.zoom)
    }

    fn visible_bounds(&self) -> GeoBounds {
        let (max_lat, min_lon) = self.from_screen(Point::ORIGIN);
        let (min_lat, max_lon) = self.from_screen(Point::new(self.size.width, self.size.height));
        GeoBounds {
            min_lat,
            max_lat,
            min_lon,
            max_lon,
        }
    }
}

/// Camera the widget settles on after a data change: centered on the render
/// set and zoomed to fit it. An empty set reports an empty relayout.
pub fn relayout(records: &[StationRecord], size: Size) -> CameraDelta {
    let Some(bounds) = GeoBounds::around(records) else {
        return CameraDelta::default();
    };
    let (center_lat, center_lon) = bounds.center();
    let (west, north) = project(bounds.max_lat, bounds.min_lon, 0.0);
    let (east, south) = project(bounds.min_lat, bounds.max_lon, 0.0);
    let fit_x = (f64::from(size.width) * FIT_MARGIN / (east - west)).log2();
    let fit_y = (f64::from(size.height) * FIT_MARGIN / (south - north)).log2();
    let zoom = fit_x.min(fit_y).clamp(MIN_ZOOM, MAX_ZOOM);
    CameraDelta::center(center_lat, center_lon).with_zoom(zoom)
}

/// Viridis-like color ramp over `[0, 1]`.
pub fn ramp(t: f32, alpha: f32) -> Color {
    let t = t.clamp(0.0, 1.0) * (VIRIDIS.len() - 1) as f32;
    let index = (t.floor() as usize).min(VIRIDIS.len() - 2);
    let frac = t - index as f32;
    let (r0, g0, b0) = VIRIDIS[index];
    let (r1, g1, b1) = VIRIDIS[index + 1];
    Color::from_rgba(
        r0 + (r1 - r0) * frac,
        g0 + (g1 - g0) * frac,
        b0 + (b1 - b0) * frac,
        alpha,
    )
}

/// Closest marker to `point` within `radius` pixels. Earlier records win
/// exact ties, so the busier of two stacked stations is reported.
fn nearest_marker<'a>(
    records: &'a [StationRecord],
    viewport: &Viewport,
    point: Point,
    radius: f32,
) -> Option<&'a StationRecord> {
    records
        .iter()
        .map(|record| (record, viewport.to_screen(record.lat, record.lon).distance(point)))
        .filter(|(_, distance)| *distance <= radius)
        .fold(None, |best: Option<(&StationRecord, f32)>, candidate| match best {
            Some((_, best_distance)) if best_distance <= candidate.1 => best,
            _ => Some(candidate),
        })
        .map(|(record, _)| record)
}

fn tooltip_lines(record: &StationRecord) -> [String; 3] {
    [
        format!("Station: {}", record.name),
        format!("Passengers: {}", record.count),
        format!("Transport: {}", record.transport),
    ]
}

/// Colorbar ticks from 0 to `max`, every 5000 unless that would crowd the bar.
fn legend_ticks(max: u64) -> Vec<u64> {
    let mut step = LEGEND_TICK;
    while max / step > LEGEND_MAX_TICKS {
        step *= 2;
    }
    let mut ticks: Vec<u64> = (0..max).step_by(step as usize).collect();
    ticks.push(max);
    ticks
}

#[derive(Default)]
pub struct Interaction {
    drag_origin: Option<Point>,
    hover: Option<Point>,
}

/// Heat-map canvas over the current render frame.
pub struct HeatMap {
    records: Vec<StationRecord>,
    scale: ScaleRange,
    camera: CameraState,
}

impl HeatMap {
    pub fn new(records: &[StationRecord], scale: ScaleRange, camera: &CameraState) -> Self {
        Self {
            records: records.to_vec(),
            scale,
            camera: camera.clone(),
        }
    }
}

impl HeatMap {
    /// Fixed-range colorbar on the right edge, labelled 0 to the scale ceiling.
    fn draw_legend(&self, frame: &mut Frame, size: Size, ink: Color) {
        let height = size.height * 0.6;
        let top = (size.height - height) / 2.0;
        let left = size.width - LEGEND_BAR_WIDTH - 64.0;
        let step = height / LEGEND_STEPS as f32;
        for index in 0..LEGEND_STEPS {
            let t = 1.0 - (index as f32 + 0.5) / LEGEND_STEPS as f32;
            frame.fill_rectangle(
                Point::new(left, top + index as f32 * step),
                Size::new(LEGEND_BAR_WIDTH, step + 0.5),
                ramp(t, 0.9),
            );
        }

        frame.fill_text(canvas::Text {
            content: "Passenger Count".into(),
            position: Point::new(left - 24.0, top - 22.0),
            color: ink,
            size: Pixels(13.0),
            ..canvas::Text::default()
        });
        let max = self.scale.max.max(1);
        for tick in legend_ticks(self.scale.max) {
            let y = top + height * (1.0 - tick as f32 / max as f32);
            frame.fill_text(canvas::Text {
                content: tick.to_string(),
                position: Point::new(left + LEGEND_BAR_WIDTH + 6.0, y - 6.0),
                color: ink,
                size: Pixels(11.0),
                ..canvas::Text::default()
            });
        }
    }

    fn draw_tooltip(
        &self,
        frame: &mut Frame,
        record: &StationRecord,
        anchor: Point,
        is_dark: bool,
        ink: Color,
    ) {
        let (fill, border) = if is_dark {
            (Color::from_rgba(0.12, 0.12, 0.12, 0.9), Color::from_rgb(0.33, 0.33, 0.33))
        } else {
            (Color::from_rgba(0.94, 0.94, 0.94, 0.9), Color::from_rgb(0.8, 0.8, 0.8))
        };
        frame.stroke(
            &Path::circle(anchor, 3.0 + 9.0 * self.scale.normalize(record.count) + 2.0),
            Stroke::default().with_color(ink).with_width(1.5),
        );

        let lines = tooltip_lines(record);
        let longest = lines.iter().map(|line| line.chars().count()).max().unwrap_or(0);
        let size = Size::new(longest as f32 * 7.0 + 16.0, lines.len() as f32 * 16.0 + 10.0);
        let origin = Point::new(anchor.x + 12.0, anchor.y - size.height - 6.0);
        let card = Path::rectangle(origin, size);
        frame.fill(&card, fill);
        frame.stroke(&card, Stroke::default().with_color(border).with_width(1.0));
        for (row, line) in lines.into_iter().enumerate() {
            frame.fill_text(canvas::Text {
                content: line,
                position: Point::new(origin.x + 8.0, origin.y + 5.0 + row as f32 * 16.0),
                color: ink,
                size: Pixels(12.0),
                ..canvas::Text::default()
            });
        }
    }
}

impl canvas::Program<Message> for HeatMap {
    type State = Interaction;

    fn update(
        &self,
        state: &mut Self::State,
        event: &Event,
        bounds: Rectangle,
        cursor: mouse::Cursor,
    ) -> Option<canvas::Action<Message>> {
        let Event::Mouse(mouse_event) = event else {
            return None;
        };
        match mouse_event {
            mouse::Event::ButtonPressed(mouse::Button::Left) => {
                state.drag_origin = Some(cursor.position_in(bounds)?);
                Some(canvas::Action::capture())
            }
            mouse::Event::ButtonReleased(mouse::Button::Left) => {
                state.drag_origin.take().map(|_| canvas::Action::capture())
            }
            mouse::Event::CursorMoved { .. } if state.drag_origin.is_none() => {
                let hover = cursor.position_in(bounds);
                if hover == state.hover {
                    return None;
                }
                state.hover = hover;
                Some(canvas::Action::request_redraw())
            }
            mouse::Event::CursorLeft => state
                .hover
                .take()
                .map(|_| canvas::Action::request_redraw()),
            mouse::Event::CursorMoved { .. } => {
                let origin = state.drag_origin?;
                let position = cursor.position_in(bounds)?;
                state.hover = None;
                state.drag_origin = Some(position);

                let viewport = Viewport::new(&self.camera, bounds.size());
                let middle = Point::new(bounds.width / 2.0, bounds.height / 2.0);
                let target = middle - (position - origin);
                let (lat, lon) = viewport.from_screen(target);
                Some(
                    canvas::Action::publish(Message::CameraChanged(CameraDelta::center(lat, lon)))
                        .and_capture(),
                )
            }
            mouse::Event::WheelScrolled { delta } => {
                cursor.position_in(bounds)?;
                let lines = match delta {
                    mouse::ScrollDelta::Lines { y, .. } => *y,
                    mouse::ScrollDelta::Pixels { y, .. } => *y / PIXELS_PER_LINE,
                };
                let zoom = (self.camera.zoom + f64::from(lines) * ZOOM_PER_LINE)
                    .clamp(MIN_ZOOM, MAX_ZOOM);
                Some(
                    canvas::Action::publish(Message::CameraChanged(CameraDelta::zoom(zoom)))
                        .and_capture(),
                )
            }
            _ => None,
        }
    }

    fn draw(
        &self,
        state: &Self::State,
        renderer: &Renderer,
        theme: &Theme,
        bounds: Rectangle,
        _cursor: mouse::Cursor,
    ) -> Vec<Geometry> {
        let mut frame = Frame::new(renderer, bounds.size());
        let is_dark = theme.extended_palette().is_dark;
        let background = if is_dark {
            Color::from_rgb(0.07, 0.07, 0.09)
        } else {
            Color::from_rgb(0.93, 0.93, 0.91)
        };
        frame.fill_rectangle(Point::ORIGIN, bounds.size(), background);

        let viewport = Viewport::new(&self.camera, bounds.size());
        let mut grid = HeatGrid::new(viewport.visible_bounds(), GRID_CELLS, GRID_CELLS);
        grid.accumulate(&self.records, self.scale.max);
        let (rows, cols) = grid.dim();
        let cell = Size::new(bounds.width / cols as f32, bounds.height / rows as f32);
        for (row, col, weight) in grid.occupied() {
            let origin = Point::new(col as f32 * cell.width, row as f32 * cell.height);
            frame.fill_rectangle(origin, cell, ramp(weight, 0.35));
        }

        // Busiest stations come first in the frame; draw them last.
        for record in self.records.iter().rev() {
            let point = viewport.to_screen(record.lat, record.lon);
            let visible = (0.0..=bounds.width).contains(&point.x)
                && (0.0..=bounds.height).contains(&point.y);
            if !visible {
                continue;
            }
            let intensity = self.scale.normalize(record.count);
            let marker = Path::circle(point, 3.0 + 9.0 * intensity);
            frame.fill(&marker, ramp(intensity, 0.8));
        }

        let ink = if is_dark {
            Color::from_rgb(0.93, 0.93, 0.93)
        } else {
            Color::from_rgb(0.2, 0.2, 0.2)
        };
        self.draw_legend(&mut frame, bounds.size(), ink);
        if let Some(cursor) = state.hover {
            if let Some(record) = nearest_marker(&self.records, &viewport, cursor, HOVER_RADIUS) {
                let anchor = viewport.to_screen(record.lat, record.lon);
                self.draw_tooltip(&mut frame, record, anchor, is_dark, ink);
            }
        }

        vec![frame.into_geometry()]
    }

    fn mouse_interaction(
        &self,
        state: &Self::State,
        bounds: Rectangle,
        cursor: mouse::Cursor,
    ) -> mouse::Interaction {
        if state.drag_origin.is_some() {
            mouse::Interaction::Grabbing
        } else if cursor.is_over(bounds) {
            mouse::Interaction::Grab
        } else {
            mouse::Interaction::default()
        }
    }
}
