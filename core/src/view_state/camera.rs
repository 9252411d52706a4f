use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Persisted map camera. `viewport` carries widget-specific numeric fields
/// (bearing, pitch, ...) that the core stores without interpreting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CameraState {
    pub center_lat: f64,
    pub center_lon: f64,
    pub zoom: f64,
    #[serde(default)]
    pub viewport: BTreeMap<String, f64>,
}

impl CameraState {
    pub fn new(center_lat: f64, center_lon: f64, zoom: f64) -> Self {
        Self {
            center_lat,
            center_lon,
            zoom,
            viewport: BTreeMap::new(),
        }
    }

    /// Overwrites every field the delta carries.
    pub fn merge(&mut self, delta: &CameraDelta) {
        if let Some(lat) = delta.center_lat {
            self.center_lat = lat;
        }
        if let Some(lon) = delta.center_lon {
            self.center_lon = lon;
        }
        if let Some(zoom) = delta.zoom {
            self.zoom = zoom;
        }
        for (field, value) in &delta.viewport {
            self.viewport.insert(field.clone(), *value);
        }
    }
}

impl Default for CameraState {
    fn default() -> Self {
        Self::new(52.237049, 21.017532, 11.0)
    }
}

/// Partial camera update reported by the rendering widget.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CameraDelta {
    pub center_lat: Option<f64>,
    pub center_lon: Option<f64>,
    pub zoom: Option<f64>,
    #[serde(default)]
    pub viewport: BTreeMap<String, f64>,
}

impl CameraDelta {
    pub fn center(lat: f64, lon: f64) -> Self {
        Self {
            center_lat: Some(lat),
            center_lon: Some(lon),
            ..Default::default()
        }
    }

    pub fn zoom(zoom: f64) -> Self {
        Self {
            zoom: Some(zoom),
            ..Default::default()
        }
    }

    pub fn with_zoom(mut self, zoom: f64) -> Self {
        self.zoom = Some(zoom);
        self
    }

    pub fn with_viewport_field(mut self, field: impl Into<String>, value: f64) -> Self {
        self.viewport.insert(field.into(), value);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.center_lat.is_none()
            && self.center_lon.is_none()
            && self.zoom.is_none()
            && self.viewport.is_empty()
    }
}
