//! Provider implementation for the NREL Alternative Fuel Data Center API.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::debug;

use plugmap_core::{
    model::{RawStationRecord, SourceId, SourceMeta, Sources},
    normalize::{FieldDefaults, StationDraft},
    plugin::SourcePlugin,
    ports::{Normalizer, PortError, StationPort},
    region::GeoScope,
};

/// Production endpoint of the station API.
pub const BASE_URL: &str = "https://developer.nrel.gov/api/alt-fuel-stations/v1.json";

/// Shared key accepted by NREL for light, rate-limited use.
pub const DEMO_KEY: &str = "DEMO_KEY";

/// Response from the station endpoint.
#[derive(Debug, Deserialize)]
struct StationsResponse {
    #[serde(default)]
    total_results: Option<u64>,
    #[serde(default)]
    fuel_stations: Vec<Map<String, Value>>,
}

/// Station ingest for the NREL API.
pub struct NrelStationPort {
    client: Client,
    api_key: String,
    base_url: String,
    meta: SourceMeta,
}

impl NrelStationPort {
    /// Create a new port bound to the given HTTP client and API key.
    #[must_use]
    pub fn new(client: Client, api_key: impl Into<String>) -> Self {
        Self {
            client,
            api_key: api_key.into(),
            base_url: BASE_URL.to_owned(),
            meta: source_meta(),
        }
    }

    /// Point the port at a different endpoint, e.g. a mirror or a test server.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[async_trait]
impl StationPort for NrelStationPort {
    fn source(&self) -> &SourceMeta {
        &self.meta
    }

    async fn fetch(&self, scope: &GeoScope) -> Result<Vec<RawStationRecord>, PortError> {
        let states = scope.query_value();

        // Existing, public, electric stations only; `limit=all` disables paging.
        let req = self.client.get(&self.base_url).query(&[
            ("api_key", self.api_key.as_str()),
            ("status", "E"),
            ("fuel_type", "ELEC"),
            ("state", states.as_str()),
            ("access", "public"),
            ("limit", "all"),
        ]);

        let response = fetch_json::<StationsResponse>(req).await?;

        debug!(
            total_results = ?response.total_results,
            received = response.fuel_stations.len(),
            "NREL response decoded"
        );

        Ok(response
            .fuel_stations
            .into_iter()
            .map(RawStationRecord::from)
            .collect())
    }
}

/// Maps NREL station objects onto the canonical schema.
pub struct NrelNormalizer {
    meta: SourceMeta,
}

impl NrelNormalizer {
    /// Create a normalizer for NREL records.
    #[must_use]
    pub fn new() -> Self {
        Self {
            meta: source_meta(),
        }
    }
}

impl Default for NrelNormalizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Normalizer for NrelNormalizer {
    fn source(&self) -> &SourceMeta {
        &self.meta
    }

    fn defaults(&self) -> FieldDefaults {
        FieldDefaults {
            network: "Non-Networked",
            ..FieldDefaults::default()
        }
    }

    fn draft(&self, raw: &RawStationRecord) -> StationDraft {
        StationDraft {
            id: raw.text("id"),
            name: raw.text("station_name"),
            address: raw.text("street_address"),
            city: raw.text("city"),
            state: raw.text("state"),
            zip: raw.text("zip"),
            lat: raw.number("latitude"),
            lng: raw.number("longitude"),
            phone: raw.text("station_phone"),
            hours: raw.text("access_days_time"),
            pricing: raw.text("ev_pricing"),
            network: raw.text("ev_network"),
            // NREL already uses the canonical vocabulary (NEMA515, J1772, CHADEMO, ...).
            connectors: raw.text_list("ev_connector_types").unwrap_or_default(),
            level1_count: raw.count("ev_level1_evse_num"),
            level2_count: raw.count("ev_level2_evse_num"),
            dc_fast_count: raw.count("ev_dc_fast_num"),
            facility_type: raw.text("facility_type"),
            last_confirmed: raw.text("date_last_confirmed"),
        }
    }
}

/// Build the plugin bundle for the NREL provider.
#[must_use]
pub fn plugin(client: Client, api_key: impl Into<String>) -> SourcePlugin {
    plugin_with_port(NrelStationPort::new(client, api_key))
}

/// Build the plugin bundle around a preconfigured port.
#[must_use]
pub fn plugin_with_port(port: NrelStationPort) -> SourcePlugin {
    SourcePlugin {
        meta: source_meta(),
        station_port: Arc::new(port),
        normalizer: Arc::new(NrelNormalizer::new()),
    }
}

fn source_meta() -> SourceMeta {
    SourceMeta {
        id: SourceId::from(Sources::Nrel),
        name: String::from("NREL Alternative Fuel Data Center"),
        url: Some(String::from("https://afdc.energy.gov/stations/")),
        connector_types: BTreeMap::new(),
    }
}

// Small helper to fetch and decode JSON, keeping the body of failed responses.
async fn fetch_json<T: DeserializeOwned>(req: RequestBuilder) -> Result<T, PortError> {
    let response = req.send().await.map_err(PortError::from)?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(PortError::UpstreamStatus {
            status: status.as_u16(),
            body,
        });
    }

    let bytes = response.bytes().await.map_err(PortError::from)?;
    serde_json::from_slice(&bytes).map_err(PortError::from)
}

#[cfg(test)]
mod tests {
    use plugmap_core::model::ChargerType;
    use serde_json::json;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    use super::*;

    /// Serve a single canned HTTP response on a local port and return its URL.
    async fn serve_once(status_line: &'static str, body: String) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("local addr");

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.expect("accept");
            let mut request: Vec<u8> = Vec::new();
            let mut buf = [0_u8; 1024];
            while !request.windows(4).any(|window| window == b"\r\n\r\n") {
                let read = socket.read(&mut buf).await.expect("read request");
                if read == 0 {
                    break;
                }
                request.extend_from_slice(buf.get(..read).expect("in bounds"));
            }
            let response = format!(
                "HTTP/1.1 {status_line}\r\n\
                 content-type: application/json\r\n\
                 content-length: {}\r\n\
                 connection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.expect("write response");
            socket.shutdown().await.expect("shutdown");
        });

        format!("http://{addr}/api/alt-fuel-stations/v1.json")
    }

    fn port_for(url: String) -> NrelStationPort {
        let client = Client::builder().no_proxy().build().expect("client");
        NrelStationPort::new(client, "test-key").with_base_url(url)
    }

    fn normalize(value: Value) -> plugmap_core::model::Station {
        let raw = RawStationRecord::from_value(value).expect("object");
        NrelNormalizer::new().normalize(&raw, 0)
    }

    #[test]
    fn j1772_station_with_sparse_fields() {
        let station = normalize(json!({
            "id": "s1",
            "ev_connector_types": ["J1772"],
            "state": "MA",
        }));

        assert_eq!(station.id, "s1");
        assert_eq!(station.charger_type(), ChargerType::J1772);
        assert_eq!(station.icon(), "⚡");
        assert_eq!(station.state, "MA");
        assert_eq!(station.lat, None);
        assert_eq!(station.lng, None);
        assert_eq!(station.network, "Non-Networked");
        assert_eq!(station.name, "Unknown");
        assert_eq!(station.pricing, "Unknown");
        assert_eq!(station.address, "");
        assert_eq!(station.counts.level1_count, 0);
    }

    #[test]
    fn nema_wins_over_j1772() {
        let station = normalize(json!({
            "id": "s2",
            "ev_connector_types": ["NEMA515", "J1772"],
        }));
        assert_eq!(station.charger_type(), ChargerType::Nema);
        assert_eq!(station.icon(), "🔌");
    }

    #[test]
    fn full_record_maps_every_field() {
        let station = normalize(json!({
            "id": 152_087,
            "station_name": "Burlington Town Center",
            "street_address": "1 Church St",
            "city": "Burlington",
            "state": "VT",
            "zip": "05401",
            "latitude": 44.4759,
            "longitude": -73.2121,
            "station_phone": "802-555-0100",
            "access_days_time": "24 hours daily",
            "ev_pricing": "Free",
            "ev_network": "ChargePoint Network",
            "ev_connector_types": ["J1772", "CHADEMO"],
            "ev_level1_evse_num": null,
            "ev_level2_evse_num": 4,
            "ev_dc_fast_num": 1,
            "facility_type": "PARKING_GARAGE",
            "date_last_confirmed": "2026-09-30",
        }));

        assert_eq!(station.id, "152087");
        assert_eq!(station.name, "Burlington Town Center");
        assert_eq!(station.city, "Burlington");
        assert_eq!(station.zip, "05401");
        assert_eq!(station.lat, Some(44.4759));
        assert_eq!(station.phone, "802-555-0100");
        assert_eq!(station.hours, "24 hours daily");
        assert_eq!(station.pricing, "Free");
        assert_eq!(station.network, "ChargePoint Network");
        assert_eq!(station.connectors(), ["J1772", "CHADEMO"]);
        assert_eq!(station.counts.level1_count, 0);
        assert_eq!(station.counts.level2_count, 4);
        assert_eq!(station.counts.dc_fast_count, 1);
        assert_eq!(station.facility_type, "PARKING_GARAGE");
        assert_eq!(station.last_confirmed, "2026-09-30");
    }

    #[test]
    fn record_without_any_field_still_normalizes() {
        let raw = RawStationRecord::default();
        let station = NrelNormalizer::new().normalize(&raw, 12);

        assert_eq!(station.id, "nrel-12");
        assert_eq!(station.charger_type(), ChargerType::Other);
        assert_eq!(station.network, "Non-Networked");
    }

    #[test]
    fn malformed_coordinates_pass_through() {
        let station = normalize(json!({ "id": 1, "latitude": 123.0, "longitude": "west" }));
        assert_eq!(station.lat, Some(123.0));
        assert_eq!(station.lng, None);
    }

    #[tokio::test]
    async fn unavailable_upstream_keeps_status_and_body() {
        let url = serve_once("503 Service Unavailable", "maintenance".to_owned()).await;

        let err = port_for(url)
            .fetch(&GeoScope::default())
            .await
            .expect_err("503 must fail");

        assert!(err.is_upstream_unavailable());
        match err {
            PortError::UpstreamStatus { status, body } => {
                assert_eq!(status, 503);
                assert_eq!(body, "maintenance");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn successful_response_yields_station_objects() {
        let body = json!({
            "total_results": 2,
            "fuel_stations": [
                { "id": 1, "state": "MA", "ev_connector_types": ["J1772"] },
                { "id": 2, "state": "VT", "ev_connector_types": ["NEMA515"] },
            ],
        })
        .to_string();
        let url = serve_once("200 OK", body).await;

        let records = port_for(url)
            .fetch(&GeoScope::default())
            .await
            .expect("fetch");

        let ids: Vec<String> = records.iter().filter_map(|raw| raw.text("id")).collect();
        assert_eq!(ids, ["1", "2"]);
    }

    #[tokio::test]
    async fn undecodable_body_is_a_payload_error() {
        let url = serve_once("200 OK", "<html>oops</html>".to_owned()).await;

        let result = port_for(url).fetch(&GeoScope::default()).await;

        assert!(matches!(result, Err(PortError::Payload(_))));
    }

    #[test]
    fn response_tolerates_missing_station_list() {
        let response: StationsResponse =
            serde_json::from_value(json!({ "total_results": 0 })).expect("decode");
        assert!(response.fuel_stations.is_empty());
        assert_eq!(response.total_results, Some(0));
    }
}
