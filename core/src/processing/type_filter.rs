use crate::records::{StationRecord, TransportType};
use std::collections::BTreeSet;

/// Records whose transport type is active. An empty active set selects nothing.
pub fn filter_by_type(
    records: &[StationRecord],
    active: &BTreeSet<TransportType>,
) -> Vec<StationRecord> {
    if active.is_empty() {
        return Vec::new();
    }
    records
        .iter()
        .filter(|record| active.contains(&record.transport))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<StationRecord> {
        vec![
            StationRecord::new("A", 52.0, 21.0, TransportType::Bus, 8, 50),
            StationRecord::new("B", 52.1, 21.1, TransportType::Tram, 8, 20),
            StationRecord::new("C", 52.2, 21.2, TransportType::Metro, 9, 300),
        ]
    }

    #[test]
    fn empty_active_set_yields_nothing() {
        assert!(filter_by_type(&sample(), &BTreeSet::new()).is_empty());
    }

    #[test]
    fn all_types_yield_the_input() {
        let records = sample();
        let active: BTreeSet<_> = TransportType::ALL.into_iter().collect();
        assert_eq!(filter_by_type(&records, &active), records);
    }

    #[test]
    fn subset_keeps_input_order() {
        let active: BTreeSet<_> = [TransportType::Metro, TransportType::Bus].into_iter().collect();
        let names: Vec<_> = filter_by_type(&sample(), &active)
            .into_iter()
            .map(|r| r.name)
            .collect();
        assert_eq!(names, vec!["A", "C"]);
    }
}
