use crate::records::station::StationRecord;
use std::io::Read;
use std::sync::Arc;

/// Errors raised at the dataset input boundary.
#[derive(thiserror::Error, Debug)]
pub enum LoadError {
    #[error("malformed dataset: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("record {index} is invalid: {reason}")]
    InvalidRecord { index: usize, reason: String },
    #[error("record store is already populated")]
    AlreadyLoaded,
}

pub type LoadResult<T> = Result<T, LoadError>;

/// Write-once collection of the session's raw ridership records.
///
/// Cloning is cheap; every clone shares the same backing slice.
#[derive(Debug, Clone, Default)]
pub struct RecordStore {
    records: Arc<[StationRecord]>,
}

impl RecordStore {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Validates every record; a single bad record rejects the whole set.
    pub fn from_records(records: Vec<StationRecord>) -> LoadResult<Self> {
        for (index, record) in records.iter().enumerate() {
            validate(record).map_err(|reason| LoadError::InvalidRecord { index, reason })?;
        }
        Ok(Self {
            records: records.into(),
        })
    }

    pub fn from_json_str(contents: &str) -> LoadResult<Self> {
        let records: Vec<StationRecord> = serde_json::from_str(contents)?;
        Self::from_records(records)
    }

    pub fn from_reader<R: Read>(reader: R) -> LoadResult<Self> {
        let records: Vec<StationRecord> = serde_json::from_reader(reader)?;
        Self::from_records(records)
    }

    pub fn records(&self) -> &[StationRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

fn validate(record: &StationRecord) -> Result<(), String> {
    if record.hour > 23 {
        return Err(format!("hour {} outside 0-23", record.hour));
    }
    if !record.lat.is_finite() || !record.lon.is_finite() {
        return Err("non-finite coordinate".into());
    }
    if !(-90.0..=90.0).contains(&record.lat) || !(-180.0..=180.0).contains(&record.lon) {
        return Err(format!(
            "coordinate ({}, {}) outside the globe",
            record.lat, record.lon
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::station::TransportType;

    const SAMPLE: &str = r#"[
        {"name":"A","lat":52.1,"lon":21.0,"type":"Autobus","hour":8,"count":50},
        {"name":"A","lat":52.1,"lon":21.0,"type":"Autobus","hour":9,"count":70}
    ]"#;

    #[test]
    fn store_loads_well_formed_array() {
        let store = RecordStore::from_json_str(SAMPLE).unwrap();
        assert_eq!(store.len(), 2);
        assert_eq!(store.records()[1].count, 70);
        assert_eq!(store.records()[0].transport, TransportType::Bus);
    }

    #[test]
    fn store_rejects_non_array_payload() {
        let err = RecordStore::from_json_str(r#"{"name":"A"}"#).unwrap_err();
        assert!(matches!(err, LoadError::Malformed(_)));
    }

    #[test]
    fn store_rejects_unknown_transport_label() {
        let err = RecordStore::from_json_str(
            r#"[{"name":"A","lat":1.0,"lon":1.0,"type":"Ferry","hour":1,"count":1}]"#,
        )
        .unwrap_err();
        assert!(matches!(err, LoadError::Malformed(_)));
    }

    #[test]
    fn store_rejects_negative_and_fractional_counts() {
        for count in ["-1", "2.5"] {
            let payload = format!(
                r#"[{{"name":"A","lat":1.0,"lon":1.0,"type":"Metro","hour":1,"count":{count}}}]"#
            );
            assert!(RecordStore::from_json_str(&payload).is_err(), "count {count}");
        }
    }

    #[test]
    fn store_rejects_hour_out_of_domain() {
        let err = RecordStore::from_json_str(
            r#"[{"name":"A","lat":1.0,"lon":1.0,"type":"Metro","hour":24,"count":1}]"#,
        )
        .unwrap_err();
        match err {
            LoadError::InvalidRecord { index, reason } => {
                assert_eq!(index, 0);
                assert!(reason.contains("24"));
            }
            other => panic!("unexpected error {other}"),
        }
    }

    #[test]
    fn store_from_reader_matches_from_str() {
        let store = RecordStore::from_reader(SAMPLE.as_bytes()).unwrap();
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn clones_share_records() {
        let store = RecordStore::from_json_str(SAMPLE).unwrap();
        let clone = store.clone();
        assert!(std::ptr::eq(store.records(), clone.records()));
    }
}
