//! Relevance filter for e-bikes and other low-power vehicles.

use serde::{Deserialize, Serialize};

use crate::model::Station;

/// Connector families usable with an e-bike charger or a simple adapter.
pub const DEFAULT_RELEVANT_PREFIXES: [&str; 2] = ["NEMA", "J1772"];

/// Keeps stations offering at least one connector from an allow-list of prefixes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RelevanceFilter {
    /// Connector-family prefixes considered relevant.
    pub prefixes: Vec<String>,
}

impl Default for RelevanceFilter {
    fn default() -> Self {
        Self::new(DEFAULT_RELEVANT_PREFIXES)
    }
}

impl RelevanceFilter {
    /// Build a filter from a list of prefixes.
    #[must_use]
    pub fn new<I, S>(prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            prefixes: prefixes.into_iter().map(Into::into).collect(),
        }
    }

    /// Whether a single connector identifier belongs to a relevant family.
    #[must_use]
    pub fn matches_connector(&self, connector: &str) -> bool {
        self.prefixes
            .iter()
            .any(|prefix| connector.starts_with(prefix.as_str()))
    }

    /// Whether the station has at least one relevant connector.
    #[must_use]
    pub fn is_relevant(&self, station: &Station) -> bool {
        station
            .connectors()
            .iter()
            .any(|connector| self.matches_connector(connector))
    }

    /// Relevant stations, in their original order.
    #[must_use]
    pub fn apply(&self, stations: &[Station]) -> Vec<Station> {
        stations
            .iter()
            .filter(|station| self.is_relevant(station))
            .cloned()
            .collect()
    }
}
