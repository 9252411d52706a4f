use crate::math::stats::StatsHelper;
use crate::records::StationRecord;
use ndarray::Array2;

/// Axis-aligned lat/lon box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoBounds {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

impl GeoBounds {
    /// Smallest box containing every record, or `None` for an empty set.
    pub fn around(records: &[StationRecord]) -> Option<Self> {
        let first = records.first()?;
        let seed = Self {
            min_lat: first.lat,
            max_lat: first.lat,
            min_lon: first.lon,
            max_lon: first.lon,
        };
        Some(records.iter().skip(1).fold(seed, |bounds, record| Self {
            min_lat: bounds.min_lat.min(record.lat),
            max_lat: bounds.max_lat.max(record.lat),
            min_lon: bounds.min_lon.min(record.lon),
            max_lon: bounds.max_lon.max(record.lon),
        }))
    }

    pub fn center(&self) -> (f64, f64) {
        (
            (self.min_lat + self.max_lat) / 2.0,
            (self.min_lon + self.max_lon) / 2.0,
        )
    }

    pub fn contains(&self, lat: f64, lon: f64) -> bool {
        (self.min_lat..=self.max_lat).contains(&lat) && (self.min_lon..=self.max_lon).contains(&lon)
    }
}

/// Density raster of a render-ready set. Row 0 is the northern edge.
#[derive(Debug, Clone)]
pub struct HeatGrid {
    bounds: GeoBounds,
    cells: Array2<f32>,
}

impl HeatGrid {
    pub fn new(bounds: GeoBounds, rows: usize, cols: usize) -> Self {
        Self {
            bounds,
            cells: Array2::zeros((rows.max(1), cols.max(1))),
        }
    }

    /// Adds each record's `count / ceiling` weight to the cell it falls in.
    /// Records outside the bounds are skipped.
    pub fn accumulate(&mut self, records: &[StationRecord], ceiling: u64) {
        for record in records {
            if let Some((row, col)) = self.cell_of(record.lat, record.lon) {
                self.cells[[row, col]] += StatsHelper::normalize(record.count, ceiling);
            }
        }
    }

    pub fn cell_of(&self, lat: f64, lon: f64) -> Option<(usize, usize)> {
        if !self.bounds.contains(lat, lon) {
            return None;
        }
        let (rows, cols) = self.cells.dim();
        let lat_span = self.bounds.max_lat - self.bounds.min_lat;
        let lon_span = self.bounds.max_lon - self.bounds.min_lon;
        let row_frac = if lat_span > 0.0 {
            (self.bounds.max_lat - lat) / lat_span
        } else {
            0.0
        };
        let col_frac = if lon_span > 0.0 {
            (lon - self.bounds.min_lon) / lon_span
        } else {
            0.0
        };
        let row = ((row_frac * rows as f64) as usize).min(rows - 1);
        let col = ((col_frac * cols as f64) as usize).min(cols - 1);
        Some((row, col))
    }

    pub fn bounds(&self) -> GeoBounds {
        self.bounds
    }

    pub fn dim(&self) -> (usize, usize) {
        self.cells.dim()
    }

    pub fn value(&self, row: usize, col: usize) -> f32 {
        self.cells.get([row, col]).copied().unwrap_or(0.0)
    }

    pub fn peak(&self) -> f32 {
        self.cells.iter().copied().fold(0.0, f32::max)
    }

    /// Non-empty cells as `(row, col, weight)`.
    pub fn occupied(&self) -> impl Iterator<Item = (usize, usize, f32)> + '_ {
        self.cells
            .indexed_iter()
            .filter(|(_, weight)| **weight > 0.0)
            .map(|((row, col), weight)| (row, col, *weight))
    }
}
