//! Domain data structures for sources, raw records, and canonical stations.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::classify::classify;
use crate::relevance::RelevanceFilter;

/// Built-in upstream sources supported by the application.
pub enum Sources {
    /// NREL Alternative Fuel Data Center API.
    Nrel,
    /// `PlugShare` crowd-sourced directory export.
    PlugShare,
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
/// Identifier for an upstream source known to plugmap.
pub struct SourceId(pub String);

impl fmt::Display for Sources {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        let slug = match self {
            Sources::Nrel => "nrel",
            Sources::PlugShare => "plugshare",
        };
        write!(formatter, "{slug}")
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(&self.0)
    }
}

impl From<Sources> for SourceId {
    fn from(source: Sources) -> Self {
        SourceId(source.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// Metadata describing an upstream source.
pub struct SourceMeta {
    /// Unique identifier.
    pub id: SourceId,
    /// Label written to the `source` field of persisted metadata.
    pub name: String,
    /// Public landing page for the data, if any.
    pub url: Option<String>,
    /// Source connector codes and their labels, for sources that use codes.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub connector_types: BTreeMap<String, String>,
}

/// One upstream record exactly as the source delivered it.
///
/// Field names and value types differ per source. The accessors treat a
/// missing key, an explicit `null`, and a value of the wrong JSON type the
/// same way: as absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawStationRecord(pub Map<String, Value>);

impl RawStationRecord {
    /// Wrap a JSON value, returning `None` unless it is an object.
    #[must_use]
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(fields) => Some(Self(fields)),
            _ => None,
        }
    }

    /// Raw value of a field, skipping explicit nulls.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field).filter(|value| !value.is_null())
    }

    /// Text value of a field. Numbers are rendered as text so numeric ids survive.
    #[must_use]
    pub fn text(&self, field: &str) -> Option<String> {
        match self.get(field)? {
            Value::String(text) => Some(text.clone()),
            Value::Number(number) => Some(number.to_string()),
            _ => None,
        }
    }

    /// Numeric value of a field.
    #[must_use]
    pub fn number(&self, field: &str) -> Option<f64> {
        self.get(field)?.as_f64()
    }

    /// Integer value of a field.
    #[must_use]
    pub fn integer(&self, field: &str) -> Option<i64> {
        self.get(field)?.as_i64()
    }

    /// Non-negative count of a field.
    #[must_use]
    pub fn count(&self, field: &str) -> Option<u32> {
        self.get(field)?
            .as_u64()
            .and_then(|count| u32::try_from(count).ok())
    }

    /// List of text values. A bare string is treated as a one-element list.
    #[must_use]
    pub fn text_list(&self, field: &str) -> Option<Vec<String>> {
        match self.get(field)? {
            Value::Array(items) => Some(
                items
                    .iter()
                    .filter_map(|item| match item {
                        Value::String(text) => Some(text.clone()),
                        Value::Number(number) => Some(number.to_string()),
                        _ => None,
                    })
                    .collect(),
            ),
            Value::String(text) => Some(vec![text.clone()]),
            _ => None,
        }
    }
}

impl From<Map<String, Value>> for RawStationRecord {
    fn from(fields: Map<String, Value>) -> Self {
        Self(fields)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
/// Coarse charger category used for display and filtering.
pub enum ChargerType {
    /// Household-style NEMA outlet.
    #[serde(rename = "NEMA")]
    Nema,
    /// SAE J1772 level 2 plug.
    #[serde(rename = "J1772")]
    J1772,
    /// Anything else, including stations without connector data.
    Other,
}

impl ChargerType {
    /// All categories in classification order.
    pub const ALL: [ChargerType; 3] = [ChargerType::Nema, ChargerType::J1772, ChargerType::Other];

    /// Display glyph shown on the map.
    #[must_use]
    pub const fn icon(self) -> &'static str {
        match self {
            ChargerType::Nema => "🔌",
            ChargerType::J1772 => "⚡",
            ChargerType::Other => "🔋",
        }
    }

    /// Label used in persisted documents.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            ChargerType::Nema => "NEMA",
            ChargerType::J1772 => "J1772",
            ChargerType::Other => "Other",
        }
    }
}

impl fmt::Display for ChargerType {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// Number of charging ports by power level.
pub struct PortCounts {
    /// Level 1 (120 V) ports.
    pub level1_count: u32,
    /// Level 2 (240 V) ports.
    pub level2_count: u32,
    /// DC fast-charging ports.
    pub dc_fast_count: u32,
}

/// Canonical charging station shared by every source.
///
/// The connector list, charger type, and icon are kept private so the category
/// always matches the connectors; use [`Station::set_connectors`] to change them.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Station {
    /// Identifier, unique within the source.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Street address.
    pub address: String,
    /// City.
    pub city: String,
    /// State or region code.
    pub state: String,
    /// Postal code.
    pub zip: String,
    /// Latitude as reported upstream.
    pub lat: Option<f64>,
    /// Longitude as reported upstream.
    pub lng: Option<f64>,
    /// Contact phone number.
    pub phone: String,
    /// Access days and hours.
    pub hours: String,
    /// Pricing description.
    pub pricing: String,
    /// Charging network name.
    pub network: String,
    connectors: Vec<String>,
    charger_type: ChargerType,
    icon: &'static str,
    /// Port counts, flattened into the station object when serialized.
    #[serde(flatten)]
    pub counts: PortCounts,
    /// Kind of facility hosting the station.
    pub facility_type: String,
    /// Date the source last confirmed the station.
    pub last_confirmed: String,
}

impl Station {
    /// Create a station with empty descriptive fields, classified from `connectors`.
    #[must_use]
    pub fn new(id: impl Into<String>, connectors: Vec<String>) -> Self {
        let mut station = Self {
            id: id.into(),
            name: String::new(),
            address: String::new(),
            city: String::new(),
            state: String::new(),
            zip: String::new(),
            lat: None,
            lng: None,
            phone: String::new(),
            hours: String::new(),
            pricing: String::new(),
            network: String::new(),
            connectors: Vec::new(),
            charger_type: ChargerType::Other,
            icon: ChargerType::Other.icon(),
            counts: PortCounts::default(),
            facility_type: String::new(),
            last_confirmed: String::new(),
        };
        station.set_connectors(connectors);
        station
    }

    /// Replace the connector list and reclassify.
    ///
    /// Duplicate identifiers are dropped, keeping the first occurrence.
    pub fn set_connectors(&mut self, connectors: Vec<String>) {
        let mut unique: Vec<String> = Vec::with_capacity(connectors.len());
        for connector in connectors {
            if !unique.contains(&connector) {
                unique.push(connector);
            }
        }
        self.charger_type = classify(&unique);
        self.icon = self.charger_type.icon();
        self.connectors = unique;
    }

    /// Connector identifiers in source order.
    #[must_use]
    pub fn connectors(&self) -> &[String] {
        &self.connectors
    }

    /// Derived charger category.
    #[must_use]
    pub fn charger_type(&self) -> ChargerType {
        self.charger_type
    }

    /// Display glyph for the charger category.
    #[must_use]
    pub fn icon(&self) -> &'static str {
        self.icon
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
/// Summary attached to every persisted collection.
pub struct Metadata {
    /// Time of the pipeline run.
    pub last_updated: DateTime<Utc>,
    /// Source label.
    pub source: String,
    /// Source landing page.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,
    /// Number of stations in the collection.
    pub total_stations: usize,
    /// Station count per state; empty states are counted under `"Unknown"`.
    pub by_state: BTreeMap<String, usize>,
    /// Station count per charger category.
    pub by_type: BTreeMap<ChargerType, usize>,
    /// Connector code table of the source, when it has one.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub connector_types: BTreeMap<String, String>,
}

/// Ordered stations from one source together with their derived metadata.
///
/// Serializes to the `{ "stations": [...], "metadata": {...} }` document consumed
/// by the map front-end.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StationCollection {
    stations: Vec<Station>,
    metadata: Metadata,
}

impl StationCollection {
    /// Build a collection and compute its metadata.
    #[must_use]
    pub fn new(stations: Vec<Station>, source: &SourceMeta, last_updated: DateTime<Utc>) -> Self {
        let metadata = Metadata::compute(&stations, source, last_updated);
        Self { stations, metadata }
    }

    /// Stations in pipeline order.
    #[must_use]
    pub fn stations(&self) -> &[Station] {
        &self.stations
    }

    /// Metadata computed from the current stations.
    #[must_use]
    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    /// Number of stations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.stations.len()
    }

    /// Whether the collection has no stations.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stations.is_empty()
    }

    /// New collection holding only the relevant stations, with fresh metadata.
    #[must_use]
    pub fn filtered(&self, filter: &RelevanceFilter) -> Self {
        let stations = filter.apply(&self.stations);
        let metadata = self.metadata.recounted(&stations);
        Self { stations, metadata }
    }
}
