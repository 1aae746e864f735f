//! Provider implementation for `PlugShare` directory exports.
//!
//! `PlugShare` has no open API, so the port reads a JSON export of its
//! directory pages from disk, or a small bundled sample when no export is
//! configured. Connector codes are translated into the NREL vocabulary so
//! classification and filtering behave the same for both sources.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, warn};

use plugmap_core::{
    model::{RawStationRecord, SourceId, SourceMeta, Sources},
    normalize::{FieldDefaults, StationDraft},
    plugin::SourcePlugin,
    ports::{Normalizer, PortError, StationPort},
    region::GeoScope,
};

const SAMPLE_EXPORT: &str = include_str!("../data/sample_stations.json");

/// A known `PlugShare` connector code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectorCode {
    /// Numeric `connectorId` used by `PlugShare`.
    pub code: i64,
    /// Equivalent NREL connector identifier.
    pub canonical: &'static str,
    /// `PlugShare`'s display label.
    pub label: &'static str,
}

/// `PlugShare` connector codes relevant to e-bikes, with their NREL equivalents.
pub const CONNECTOR_CODES: [ConnectorCode; 3] = [
    ConnectorCode {
        code: 1,
        canonical: "NEMA515",
        label: "NEMA 5-15 (Wall Outlet)",
    },
    ConnectorCode {
        code: 2,
        canonical: "J1772",
        label: "J1772",
    },
    ConnectorCode {
        code: 6,
        canonical: "NEMA1450",
        label: "NEMA 14-50",
    },
];

/// Where the export is read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportLocation {
    /// JSON file on disk.
    File(PathBuf),
    /// Sample dataset compiled into the binary.
    Bundled,
}

/// Station ingest from a `PlugShare` directory export.
pub struct PlugShareExportPort {
    location: ExportLocation,
    meta: SourceMeta,
}

impl PlugShareExportPort {
    /// Create a port reading from `location`.
    #[must_use]
    pub fn new(location: ExportLocation) -> Self {
        Self {
            location,
            meta: source_meta(),
        }
    }

    /// Create a port serving the bundled sample dataset.
    #[must_use]
    pub fn bundled() -> Self {
        Self::new(ExportLocation::Bundled)
    }
}

#[async_trait]
impl StationPort for PlugShareExportPort {
    fn source(&self) -> &SourceMeta {
        &self.meta
    }

    async fn fetch(&self, scope: &GeoScope) -> Result<Vec<RawStationRecord>, PortError> {
        let text = match &self.location {
            ExportLocation::File(path) => {
                debug!(path = %path.display(), "reading PlugShare export");
                tokio::fs::read_to_string(path).await?
            }
            ExportLocation::Bundled => {
                warn!("no PlugShare export configured, using bundled sample stations");
                SAMPLE_EXPORT.to_owned()
            }
        };

        let records = parse_export(&text)?;
        let total = records.len();

        let kept: Vec<RawStationRecord> = records
            .into_iter()
            .filter(|raw| is_public(raw) && in_scope(raw, scope))
            .collect();

        debug!(total, kept = kept.len(), "PlugShare export filtered to scope");
        Ok(kept)
    }
}

/// Maps `PlugShare` export objects onto the canonical schema.
pub struct PlugShareNormalizer {
    meta: SourceMeta,
}

impl PlugShareNormalizer {
    /// Create a normalizer for `PlugShare` records.
    #[must_use]
    pub fn new() -> Self {
        Self {
            meta: source_meta(),
        }
    }
}

impl Default for PlugShareNormalizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Normalizer for PlugShareNormalizer {
    fn source(&self) -> &SourceMeta {
        &self.meta
    }

    fn defaults(&self) -> FieldDefaults {
        FieldDefaults::default()
    }

    fn draft(&self, raw: &RawStationRecord) -> StationDraft {
        // The export has no city, zip, phone, facility type, or port counts.
        StationDraft {
            id: raw.text("id"),
            name: raw.text("name"),
            address: raw.text("address"),
            state: raw.text("state"),
            lat: raw.number("lat"),
            lng: raw.number("lng"),
            hours: raw.text("hours"),
            pricing: raw.text("cost"),
            network: raw.text("network"),
            connectors: canonical_connectors(raw),
            ..StationDraft::default()
        }
    }
}

/// Build the plugin bundle for the `PlugShare` provider.
///
/// Without an export path the bundled sample dataset is used.
#[must_use]
pub fn plugin(export_path: Option<PathBuf>) -> SourcePlugin {
    let location = export_path.map_or(ExportLocation::Bundled, ExportLocation::File);

    SourcePlugin {
        meta: source_meta(),
        station_port: Arc::new(PlugShareExportPort::new(location)),
        normalizer: Arc::new(PlugShareNormalizer::new()),
    }
}

fn source_meta() -> SourceMeta {
    SourceMeta {
        id: SourceId::from(Sources::PlugShare),
        name: String::from("PlugShare"),
        url: Some(String::from("https://www.plugshare.com/")),
        connector_types: CONNECTOR_CODES
            .iter()
            .map(|known| (known.code.to_string(), known.label.to_owned()))
            .collect(),
    }
}

/// Connector identifiers for a record, in the NREL vocabulary.
///
/// A known numeric `connectorId` wins. Otherwise the `connectorType` label is
/// translated when it is a known label and kept verbatim when it is not. An
/// unknown code without a label becomes `PLUGSHARE_<code>`.
#[must_use]
pub fn canonical_connectors(raw: &RawStationRecord) -> Vec<String> {
    let label = raw
        .text("connectorType")
        .map(|text| text.trim().to_owned())
        .filter(|text| !text.is_empty());

    if let Some(code) = raw.integer("connectorId") {
        if let Some(known) = CONNECTOR_CODES.iter().find(|known| known.code == code) {
            return vec![known.canonical.to_owned()];
        }
        warn!(code, "unknown PlugShare connector code");
        let fallback =
            label.map_or_else(|| format!("PLUGSHARE_{code}"), |text| canonical_label(&text));
        return vec![fallback];
    }

    label.map(|text| vec![canonical_label(&text)]).unwrap_or_default()
}

fn canonical_label(label: &str) -> String {
    CONNECTOR_CODES
        .iter()
        .find(|known| known.label.eq_ignore_ascii_case(label))
        .map_or_else(|| label.to_owned(), |known| known.canonical.to_owned())
}

/// Parse an export: either a JSON array of station objects or an object with a
/// `stations` array. Non-object entries are skipped.
///
/// # Errors
///
/// Returns [`PortError::Payload`] if the text is not JSON, or
/// [`PortError::Config`] if it has neither shape.
pub fn parse_export(text: &str) -> Result<Vec<RawStationRecord>, PortError> {
    let document: Value = serde_json::from_str(text)?;

    let items = match document {
        Value::Array(items) => items,
        Value::Object(mut fields) => match fields.remove("stations") {
            Some(Value::Array(items)) => items,
            _ => {
                return Err(PortError::Config(
                    "PlugShare export object has no `stations` array".into(),
                ));
            }
        },
        _ => {
            return Err(PortError::Config(
                "PlugShare export must be an array or an object".into(),
            ));
        }
    };

    Ok(items
        .into_iter()
        .filter_map(RawStationRecord::from_value)
        .collect())
}

fn is_public(raw: &RawStationRecord) -> bool {
    raw.text("access")
        .is_none_or(|access| access.trim().eq_ignore_ascii_case("public"))
}

fn in_scope(raw: &RawStationRecord, scope: &GeoScope) -> bool {
    let state = raw.text("state");
    let (lat, lng) = (raw.number("lat"), raw.number("lng"));

    let no_state = state.as_deref().is_none_or(|code| code.trim().is_empty());
    if no_state && (lat.is_none() || lng.is_none()) {
        debug!(id = ?raw.text("id"), "PlugShare record has no location, keeping it");
    }

    scope.includes(state.as_deref(), lat, lng)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use chrono::Utc;
    use plugmap_core::aggregate::{UNKNOWN_STATE, summarize};
    use plugmap_core::model::{ChargerType, StationCollection};
    use plugmap_core::relevance::RelevanceFilter;
    use plugmap_core::service::normalize_all;
    use serde_json::json;

    use super::*;

    fn record(value: Value) -> RawStationRecord {
        RawStationRecord::from_value(value).expect("object")
    }

    #[test]
    fn numeric_codes_map_to_nrel_identifiers() {
        for (code, expected) in [(1, "NEMA515"), (2, "J1772"), (6, "NEMA1450")] {
            let raw = record(json!({ "connectorId": code, "connectorType": "ignored" }));
            assert_eq!(canonical_connectors(&raw), [expected]);
        }
    }

    #[test]
    fn labels_are_translated_when_no_code() {
        let raw = record(json!({ "connectorType": "NEMA 14-50" }));
        assert_eq!(canonical_connectors(&raw), ["NEMA1450"]);

        let raw = record(json!({ "connectorType": "CCS/SAE" }));
        assert_eq!(canonical_connectors(&raw), ["CCS/SAE"]);
    }

    #[test]
    fn unknown_code_without_label_is_namespaced() {
        let raw = record(json!({ "connectorId": 13 }));
        assert_eq!(canonical_connectors(&raw), ["PLUGSHARE_13"]);
    }

    #[test]
    fn no_connector_data_gives_empty_list() {
        assert!(canonical_connectors(&record(json!({}))).is_empty());
    }

    #[test]
    fn normalizes_sample_record() {
        let raw = record(json!({
            "id": "sample-2",
            "name": "Boston Common Garage",
            "address": "0 Charles St, Boston, MA",
            "lat": 42.3551,
            "lng": -71.0657,
            "state": "MA",
            "connectorType": "J1772",
            "connectorId": 2,
            "hours": "24/7",
            "cost": "$2/hour",
            "network": "EVgo"
        }));

        let station = PlugShareNormalizer::new().normalize(&raw, 0);

        assert_eq!(station.id, "sample-2");
        assert_eq!(station.address, "0 Charles St, Boston, MA");
        assert_eq!(station.city, "");
        assert_eq!(station.pricing, "$2/hour");
        assert_eq!(station.network, "EVgo");
        assert_eq!(station.charger_type(), ChargerType::J1772);
        assert_eq!(station.counts.level2_count, 0);
    }

    #[test]
    fn wall_outlet_code_is_nema() {
        let station =
            PlugShareNormalizer::new().normalize(&record(json!({ "connectorId": 1 })), 5);
        assert_eq!(station.id, "plugshare-5");
        assert_eq!(station.charger_type(), ChargerType::Nema);
        assert_eq!(station.name, "Unknown");
        assert_eq!(station.network, "Unknown");
    }

    #[test]
    fn persisted_metadata_lists_connector_codes() {
        let station = PlugShareNormalizer::new().normalize(&record(json!({ "id": "x" })), 0);
        let collection = StationCollection::new(vec![station], &source_meta(), Utc::now());
        let filtered = collection.filtered(&RelevanceFilter::default());

        for document in [&collection, &filtered] {
            let value = serde_json::to_value(document).expect("serialize");
            assert_eq!(
                value["metadata"]["connectorTypes"],
                json!({ "1": "NEMA 5-15 (Wall Outlet)", "2": "J1772", "6": "NEMA 14-50" })
            );
        }
    }

    #[test]
    fn export_accepts_both_shapes() {
        assert_eq!(parse_export(r#"[{"id": "a"}, 3]"#).expect("array").len(), 1);
        assert_eq!(
            parse_export(r#"{"stations": [{"id": "a"}, {"id": "b"}], "metadata": {}}"#)
                .expect("object")
                .len(),
            2
        );
        assert!(matches!(
            parse_export(r#"{"items": []}"#),
            Err(PortError::Config(_))
        ));
        assert!(matches!(parse_export("not json"), Err(PortError::Payload(_))));
    }

    #[tokio::test]
    async fn bundled_sample_respects_scope() {
        let port = PlugShareExportPort::bundled();

        let everything = port.fetch(&GeoScope::default()).await.expect("fetch");
        assert_eq!(everything.len(), 3);

        let maine = port.fetch(&GeoScope::new(["ME"])).await.expect("fetch");
        let ids: Vec<String> = maine.iter().filter_map(|raw| raw.text("id")).collect();
        assert_eq!(ids, ["sample-1"]);
    }

    fn write_export(value: &Value) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        write!(file, "{value}").expect("write export");
        file
    }

    #[tokio::test]
    async fn file_export_drops_private_and_out_of_scope_records() {
        let file = write_export(&json!([
            { "id": "a", "state": "VT", "access": "Public" },
            { "id": "b", "state": "VT", "access": "Private" },
            { "id": "c", "state": "NY" },
            { "id": "d", "lat": 44.26, "lng": -72.58 },
            { "id": "e" }
        ]));

        let port = PlugShareExportPort::new(ExportLocation::File(file.path().to_path_buf()));
        let records = port.fetch(&GeoScope::new(["VT"])).await.expect("fetch");
        let ids: Vec<String> = records.iter().filter_map(|raw| raw.text("id")).collect();

        assert_eq!(ids, ["a", "d", "e"]);
    }

    #[tokio::test]
    async fn unlocatable_records_survive_into_unknown_bucket() {
        let file = write_export(&json!([
            { "id": "keep", "state": "MA", "connectorId": 2 },
            { "id": "nolocation", "connectorId": 1 }
        ]));

        let port = PlugShareExportPort::new(ExportLocation::File(file.path().to_path_buf()));
        let records = port.fetch(&GeoScope::default()).await.expect("fetch");
        let stations = normalize_all(&PlugShareNormalizer::new(), &records);
        let ids: Vec<&str> = stations.iter().map(|station| station.id.as_str()).collect();
        assert_eq!(ids, ["keep", "nolocation"]);

        let summary = summarize(&stations);
        assert_eq!(summary.by_state.get("MA"), Some(&1));
        assert_eq!(summary.by_state.get(UNKNOWN_STATE), Some(&1));
    }

    #[tokio::test]
    async fn missing_export_file_is_an_io_error() {
        let port = PlugShareExportPort::new(ExportLocation::File(PathBuf::from(
            "/nonexistent/plugshare.json",
        )));
        assert!(matches!(
            port.fetch(&GeoScope::default()).await,
            Err(PortError::Io(_))
        ));
    }
}
