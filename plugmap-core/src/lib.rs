//! Core types and pipeline wiring for the plugmap charging-station aggregator.

/// Summary statistics computed over a station collection.
pub mod aggregate;
/// Ordered rules deriving a charger category from connector identifiers.
pub mod classify;
/// Settings consumed by the pipeline.
pub mod config;
/// Domain models shared by all sources.
pub mod model;
/// Typed intermediate and default application for normalizers.
pub mod normalize;
/// Registry and helpers for plugging source-specific providers into the pipeline.
pub mod plugin;
/// Traits describing the provider interfaces.
pub mod ports;
/// Geographic scope and state bounding boxes.
pub mod region;
/// Connector allow-list used to select stations for low-power vehicles.
pub mod relevance;
/// High-level pipeline facade used by clients.
pub mod service;

pub use aggregate::*;
pub use classify::*;
pub use config::*;
pub use model::*;
pub use normalize::*;
pub use plugin::*;
pub use ports::*;
pub use region::*;
pub use relevance::*;
pub use service::*;
