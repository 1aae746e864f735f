//! Typed intermediate produced by every source normalizer.
//!
//! A normalizer only copies fields out of its raw record into a
//! [`StationDraft`]. Filling in defaults happens in one place,
//! [`StationDraft::finish`], so every source follows the same rules.

use crate::model::{PortCounts, Station};

/// Per-source fallbacks for categorical display fields.
///
/// Free-text fields without an entry here (address, city, state, zip, phone,
/// last-confirmed date) always default to the empty string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDefaults {
    /// Station name.
    pub name: &'static str,
    /// Charging network.
    pub network: &'static str,
    /// Pricing description.
    pub pricing: &'static str,
    /// Access hours.
    pub hours: &'static str,
    /// Facility type.
    pub facility_type: &'static str,
}

impl Default for FieldDefaults {
    fn default() -> Self {
        Self {
            name: "Unknown",
            network: "Unknown",
            pricing: "Unknown",
            hours: "",
            facility_type: "",
        }
    }
}

/// Station fields as found upstream; `None` means absent or unusable.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StationDraft {
    /// Source identifier.
    pub id: Option<String>,
    /// Display name.
    pub name: Option<String>,
    /// Street address.
    pub address: Option<String>,
    /// City.
    pub city: Option<String>,
    /// State code.
    pub state: Option<String>,
    /// Postal code.
    pub zip: Option<String>,
    /// Latitude.
    pub lat: Option<f64>,
    /// Longitude.
    pub lng: Option<f64>,
    /// Phone number.
    pub phone: Option<String>,
    /// Access hours.
    pub hours: Option<String>,
    /// Pricing description.
    pub pricing: Option<String>,
    /// Charging network.
    pub network: Option<String>,
    /// Connector identifiers, already in the canonical vocabulary.
    pub connectors: Vec<String>,
    /// Level 1 port count.
    pub level1_count: Option<u32>,
    /// Level 2 port count.
    pub level2_count: Option<u32>,
    /// DC fast port count.
    pub dc_fast_count: Option<u32>,
    /// Facility type.
    pub facility_type: Option<String>,
    /// Date last confirmed.
    pub last_confirmed: Option<String>,
}

impl StationDraft {
    /// Apply defaults and classify, producing the canonical station.
    ///
    /// `fallback_id` is only called when the draft has no usable id.
    #[must_use]
    pub fn finish(self, defaults: &FieldDefaults, fallback_id: impl FnOnce() -> String) -> Station {
        let id = self
            .id
            .filter(|id| !id.trim().is_empty())
            .unwrap_or_else(fallback_id);

        let mut station = Station::new(id, self.connectors);
        station.name = or_default(self.name, defaults.name);
        station.address = self.address.unwrap_or_default();
        station.city = self.city.unwrap_or_default();
        station.state = self.state.unwrap_or_default();
        station.zip = self.zip.unwrap_or_default();
        station.lat = self.lat;
        station.lng = self.lng;
        station.phone = self.phone.unwrap_or_default();
        station.hours = or_default(self.hours, defaults.hours);
        station.pricing = or_default(self.pricing, defaults.pricing);
        station.network = or_default(self.network, defaults.network);
        station.counts = PortCounts {
            level1_count: self.level1_count.unwrap_or(0),
            level2_count: self.level2_count.unwrap_or(0),
            dc_fast_count: self.dc_fast_count.unwrap_or(0),
        };
        station.facility_type = or_default(self.facility_type, defaults.facility_type);
        station.last_confirmed = self.last_confirmed.unwrap_or_default();
        station
    }
}

fn or_default(value: Option<String>, default: &str) -> String {
    value.unwrap_or_else(|| default.to_owned())
}
