//! Counts by state and by charger category.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use crate::model::{ChargerType, Metadata, SourceMeta, Station};

/// Bucket for stations without a state.
pub const UNKNOWN_STATE: &str = "Unknown";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
/// Counts over a list of stations.
pub struct Summary {
    /// Number of stations.
    pub total_stations: usize,
    /// Stations per state.
    pub by_state: BTreeMap<String, usize>,
    /// Stations per charger category.
    pub by_type: BTreeMap<ChargerType, usize>,
}

/// Count stations by state and by charger category.
///
/// Both maps sum to `total_stations`. Keys are ordered, so the result does not
/// depend on the order of `stations`.
#[must_use]
pub fn summarize(stations: &[Station]) -> Summary {
    let mut summary = Summary {
        total_stations: stations.len(),
        ..Summary::default()
    };

    for station in stations {
        let state = station.state.trim();
        let state = if state.is_empty() { UNKNOWN_STATE } else { state };
        *summary.by_state.entry(state.to_owned()).or_insert(0) += 1;
        *summary.by_type.entry(station.charger_type()).or_insert(0) += 1;
    }

    summary
}

impl Metadata {
    /// Compute metadata for `stations` produced by `source`.
    #[must_use]
    pub fn compute(stations: &[Station], source: &SourceMeta, last_updated: DateTime<Utc>) -> Self {
        let Summary {
            total_stations,
            by_state,
            by_type,
        } = summarize(stations);

        Self {
            last_updated,
            source: source.name.clone(),
            source_url: source.url.clone(),
            total_stations,
            by_state,
            by_type,
            connector_types: source.connector_types.clone(),
        }
    }

    /// Same labels and timestamp, counts taken from `stations`.
    pub(crate) fn recounted(&self, stations: &[Station]) -> Self {
        let Summary {
            total_stations,
            by_state,
            by_type,
        } = summarize(stations);

        Self {
            total_stations,
            by_state,
            by_type,
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::model::{SourceId, StationCollection};

    fn station(id: &str, connector: &str, state: &str) -> Station {
        let mut station = Station::new(id, vec![connector.to_owned()]);
        station.state = state.to_owned();
        station
    }

    fn source() -> SourceMeta {
        SourceMeta {
            id: SourceId("test".to_owned()),
            name: "Test Source".to_owned(),
            url: None,
            connector_types: BTreeMap::new(),
        }
    }

    #[test]
    fn counts_by_state_and_type() {
        let stations = vec![
            station("1", "NEMA515", "MA"),
            station("2", "J1772", "MA"),
            station("3", "NEMA1450", "CT"),
        ];

        let summary = summarize(&stations);

        assert_eq!(summary.total_stations, 3);
        assert_eq!(
            summary.by_type,
            BTreeMap::from([(ChargerType::Nema, 2), (ChargerType::J1772, 1)])
        );
        assert_eq!(
            summary.by_state,
            BTreeMap::from([("MA".to_owned(), 2), ("CT".to_owned(), 1)])
        );
    }

    #[test]
    fn empty_state_counts_as_unknown() {
        let stations = vec![station("1", "J1772", ""), station("2", "J1772", "  ")];
        let summary = summarize(&stations);
        assert_eq!(summary.by_state.get(UNKNOWN_STATE), Some(&2));
    }

    #[test]
    fn buckets_partition_the_collection() {
        let stations: Vec<Station> = ["NEMA515", "J1772", "TESLA", "CHADEMO", "NEMA520"]
            .iter()
            .zip(["VT", "", "NH", "VT", "ME"])
            .enumerate()
            .map(|(index, (connector, state))| station(&index.to_string(), connector, state))
            .collect();

        let summary = summarize(&stations);

        assert_eq!(summary.by_state.values().sum::<usize>(), summary.total_stations);
        assert_eq!(summary.by_type.values().sum::<usize>(), summary.total_stations);
    }

    #[test]
    fn order_does_not_change_result() {
        let mut stations = vec![
            station("1", "NEMA515", "RI"),
            station("2", "J1772", "MA"),
            station("3", "CCS", "RI"),
        ];
        let forward = summarize(&stations);
        stations.reverse();
        assert_eq!(summarize(&stations), forward);
    }

    #[test]
    fn empty_collection_has_zero_aggregates() {
        let when = Utc.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).single().expect("timestamp");
        let collection = StationCollection::new(Vec::new(), &source(), when);
        let value = serde_json::to_value(&collection).expect("serialize");

        assert_eq!(value["stations"], serde_json::json!([]));
        assert_eq!(value["metadata"]["totalStations"], 0);
        assert_eq!(value["metadata"]["byState"], serde_json::json!({}));
        assert_eq!(value["metadata"]["byType"], serde_json::json!({}));
        assert_eq!(value["metadata"]["source"], "Test Source");
        assert!(value["metadata"].get("sourceUrl").is_none());
        assert!(
            value["metadata"]["lastUpdated"]
                .as_str()
                .is_some_and(|stamp| stamp.starts_with("2026-01-02T03:04:05"))
        );
    }
}
