//! Charger categorization.
//!
//! Categories are assigned by walking [`CLASSIFICATION_RULES`] in order and
//! taking the first rule whose predicate matches. A station with a NEMA outlet
//! is therefore `NEMA` even when it also offers J1772.

use crate::model::ChargerType;

/// Prefix shared by every NEMA outlet identifier (`NEMA515`, `NEMA520`, `NEMA1450`, ...).
pub const NEMA_PREFIX: &str = "NEMA";

/// Identifier of the SAE J1772 connector.
pub const J1772_CONNECTOR: &str = "J1772";

/// A predicate over a connector list paired with the category it assigns.
#[derive(Debug, Clone, Copy)]
pub struct ClassificationRule {
    /// Category assigned when the predicate matches.
    pub charger_type: ChargerType,
    /// Predicate over the station's connector identifiers.
    pub matches: fn(&[String]) -> bool,
}

/// Rules in precedence order. Stations matching none are [`ChargerType::Other`].
pub const CLASSIFICATION_RULES: [ClassificationRule; 2] = [
    ClassificationRule {
        charger_type: ChargerType::Nema,
        matches: has_nema_outlet,
    },
    ClassificationRule {
        charger_type: ChargerType::J1772,
        matches: has_j1772,
    },
];

/// Derive the charger category for a connector list.
#[must_use]
pub fn classify(connectors: &[String]) -> ChargerType {
    CLASSIFICATION_RULES
        .iter()
        .find(|rule| (rule.matches)(connectors))
        .map_or(ChargerType::Other, |rule| rule.charger_type)
}

fn has_nema_outlet(connectors: &[String]) -> bool {
    connectors
        .iter()
        .any(|connector| connector.starts_with(NEMA_PREFIX))
}

fn has_j1772(connectors: &[String]) -> bool {
    connectors.iter().any(|connector| connector == J1772_CONNECTOR)
}
