//! Geographic scope of an ingest run.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq)]
/// Axis-aligned latitude/longitude box.
pub struct BoundingBox {
    /// South-west corner latitude.
    pub sw_lat: f64,
    /// South-west corner longitude.
    pub sw_lng: f64,
    /// North-east corner latitude.
    pub ne_lat: f64,
    /// North-east corner longitude.
    pub ne_lng: f64,
}

impl BoundingBox {
    /// Whether the point lies inside the box, edges included.
    #[must_use]
    pub fn contains(&self, lat: f64, lng: f64) -> bool {
        (self.sw_lat..=self.ne_lat).contains(&lat) && (self.sw_lng..=self.ne_lng).contains(&lng)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
/// A state known to plugmap with its approximate extent.
pub struct StateRegion {
    /// Two-letter postal code.
    pub code: &'static str,
    /// Full name.
    pub name: &'static str,
    /// Approximate bounding box.
    pub bounds: BoundingBox,
}

/// New England states, the default ingest scope.
pub const NEW_ENGLAND: [StateRegion; 6] = [
    StateRegion {
        code: "CT",
        name: "Connecticut",
        bounds: BoundingBox {
            sw_lat: 40.95,
            sw_lng: -73.73,
            ne_lat: 42.05,
            ne_lng: -71.78,
        },
    },
    StateRegion {
        code: "MA",
        name: "Massachusetts",
        bounds: BoundingBox {
            sw_lat: 41.24,
            sw_lng: -73.50,
            ne_lat: 42.89,
            ne_lng: -69.93,
        },
    },
    StateRegion {
        code: "ME",
        name: "Maine",
        bounds: BoundingBox {
            sw_lat: 42.97,
            sw_lng: -71.08,
            ne_lat: 47.46,
            ne_lng: -66.93,
        },
    },
    StateRegion {
        code: "NH",
        name: "New Hampshire",
        bounds: BoundingBox {
            sw_lat: 42.70,
            sw_lng: -72.56,
            ne_lat: 45.31,
            ne_lng: -70.70,
        },
    },
    StateRegion {
        code: "RI",
        name: "Rhode Island",
        bounds: BoundingBox {
            sw_lat: 41.15,
            sw_lng: -71.86,
            ne_lat: 42.02,
            ne_lng: -71.12,
        },
    },
    StateRegion {
        code: "VT",
        name: "Vermont",
        bounds: BoundingBox {
            sw_lat: 42.73,
            sw_lng: -73.44,
            ne_lat: 45.02,
            ne_lng: -71.46,
        },
    },
];

/// Look up a known state by postal code, ignoring case.
#[must_use]
pub fn state_region(code: &str) -> Option<&'static StateRegion> {
    NEW_ENGLAND
        .iter()
        .find(|region| region.code.eq_ignore_ascii_case(code.trim()))
}

/// States an ingest run is restricted to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeoScope {
    /// Postal codes of the states in scope.
    pub states: Vec<String>,
}

impl Default for GeoScope {
    fn default() -> Self {
        Self::new(NEW_ENGLAND.iter().map(|region| region.code))
    }
}

impl GeoScope {
    /// Build a scope from state codes, normalized to upper case.
    #[must_use]
    pub fn new<I, S>(states: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            states: states
                .into_iter()
                .map(|state| state.as_ref().trim().to_uppercase())
                .filter(|state| !state.is_empty())
                .collect(),
        }
    }

    /// Check if the scope has no states.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Comma-separated state list for upstream query strings.
    #[must_use]
    pub fn query_value(&self) -> String {
        self.states.join(",")
    }

    /// Whether the state code is in scope.
    #[must_use]
    pub fn includes_state(&self, state: &str) -> bool {
        let state = state.trim();
        self.states
            .iter()
            .any(|candidate| candidate.eq_ignore_ascii_case(state))
    }

    /// Whether the point falls inside a known state in scope.
    ///
    /// States without a bounding box never match.
    #[must_use]
    pub fn contains_point(&self, lat: f64, lng: f64) -> bool {
        self.states
            .iter()
            .filter_map(|state| state_region(state))
            .any(|region| region.bounds.contains(lat, lng))
    }

    /// Scope test for a record: by state when it has one, otherwise by coordinates.
    ///
    /// A record with neither cannot be placed and is kept.
    #[must_use]
    pub fn includes(&self, state: Option<&str>, lat: Option<f64>, lng: Option<f64>) -> bool {
        match (state.map(str::trim).filter(|code| !code.is_empty()), lat, lng) {
            (Some(code), _, _) => self.includes_state(code),
            (None, Some(point_lat), Some(point_lng)) => self.contains_point(point_lat, point_lng),
            _ => true,
        }
    }
}
