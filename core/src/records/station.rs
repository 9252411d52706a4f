use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Transport categories, serialized with the labels used by the source dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TransportType {
    #[serde(rename = "Autobus")]
    Bus,
    #[serde(rename = "Tramwaj")]
    Tram,
    #[serde(rename = "Metro")]
    Metro,
}

impl TransportType {
    pub const ALL: [TransportType; 3] = [
        TransportType::Bus,
        TransportType::Tram,
        TransportType::Metro,
    ];

    /// Short user-facing category name.
    pub fn line_type(self) -> &'static str {
        match self {
            TransportType::Bus => "bus",
            TransportType::Tram => "tram",
            TransportType::Metro => "metro",
        }
    }
}

impl fmt::Display for TransportType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TransportType::Bus => "Bus",
            TransportType::Tram => "Tram",
            TransportType::Metro => "Metro",
        };
        f.write_str(label)
    }
}

/// One station's ridership for one hour of the day, exactly as loaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StationRecord {
    pub name: String,
    pub lat: f64,
    pub lon: f64,
    #[serde(rename = "type")]
    pub transport: TransportType,
    pub hour: u8,
    pub count: u64,
}

impl StationRecord {
    pub fn new(
        name: impl Into<String>,
        lat: f64,
        lon: f64,
        transport: TransportType,
        hour: u8,
        count: u64,
    ) -> Self {
        Self {
            name: name.into(),
            lat,
            lon,
            transport,
            hour,
            count,
        }
    }

    pub fn key(&self) -> StationKey<'_> {
        StationKey::new(&self.name, self.lat, self.lon, self.transport)
    }
}

/// Identity of one physical stop for one transport mode.
///
/// Coordinates are compared by bit pattern so the key can be hashed; `-0.0`
/// is folded into `0.0` first so both spellings of the origin group together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StationKey<'a> {
    pub name: &'a str,
    lat_bits: u64,
    lon_bits: u64,
    pub transport: TransportType,
}

impl<'a> StationKey<'a> {
    pub fn new(name: &'a str, lat: f64, lon: f64, transport: TransportType) -> Self {
        Self {
            name,
            lat_bits: normalize_zero(lat).to_bits(),
            lon_bits: normalize_zero(lon).to_bits(),
            transport,
        }
    }
}

fn normalize_zero(value: f64) -> f64 {
    if value == 0.0 {
        0.0
    } else {
        value
    }
}

/// Render order shared by every derived record set: busiest first, then a
/// total tie-break on the station identity.
pub fn render_order(a: &StationRecord, b: &StationRecord) -> Ordering {
    b.count
        .cmp(&a.count)
        .then_with(|| a.name.cmp(&b.name))
        .then_with(|| a.transport.cmp(&b.transport))
        .then_with(|| a.lat.total_cmp(&b.lat))
        .then_with(|| a.lon.total_cmp(&b.lon))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transport_type_uses_source_labels_on_the_wire() {
        let record = StationRecord::new("Centrum", 52.23, 21.01, TransportType::Metro, 8, 120);
        let json = serde_json::to_string(&record).unwrap();
        assert!(json.contains("\"type\":\"Metro\""));

        let parsed: StationRecord = serde_json::from_str(
            r#"{"name":"Rondo","lat":52.2,"lon":21.0,"type":"Tramwaj","hour":7,"count":40}"#,
        )
        .unwrap();
        assert_eq!(parsed.transport, TransportType::Tram);
        assert_eq!(parsed.transport.line_type(), "tram");
    }

    #[test]
    fn key_distinguishes_transport_modes_sharing_a_stop() {
        let tram = StationRecord::new("Centrum", 52.23, 21.01, TransportType::Tram, 8, 10);
        let metro = StationRecord::new("Centrum", 52.23, 21.01, TransportType::Metro, 8, 10);
        assert_ne!(tram.key(), metro.key());
    }

    #[test]
    fn key_ignores_hour_and_count() {
        let morning = StationRecord::new("A", 52.0, 21.0, TransportType::Bus, 8, 50);
        let evening = StationRecord::new("A", 52.0, 21.0, TransportType::Bus, 18, 70);
        assert_eq!(morning.key(), evening.key());
    }

    #[test]
    fn key_folds_negative_zero() {
        assert_eq!(
            StationKey::new("Origin", 0.0, -0.0, TransportType::Bus),
            StationKey::new("Origin", -0.0, 0.0, TransportType::Bus)
        );
    }

    #[test]
    fn render_order_is_count_descending_then_name() {
        let mut records = vec![
            StationRecord::new("B", 1.0, 1.0, TransportType::Bus, 0, 10),
            StationRecord::new("A", 1.0, 1.0, TransportType::Bus, 0, 10),
            StationRecord::new("C", 1.0, 1.0, TransportType::Bus, 0, 30),
        ];
        records.sort_by(render_order);
        let names: Vec<_> = records.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["C", "A", "B"]);
    }
}
