//! Traits describing source capabilities and the shared error type.

use async_trait::async_trait;
use reqwest::Error as ReqwestError;
use serde_json::Error as JsonError;

use crate::model::{RawStationRecord, SourceMeta, Station};
use crate::normalize::{FieldDefaults, StationDraft};
use crate::region::GeoScope;

#[derive(thiserror::Error, Debug)]
/// Errors that can occur while running the pipeline.
pub enum PortError {
    /// Network layer failed before a response arrived.
    #[error("Network error: {0}")]
    Network(#[from] ReqwestError),
    /// Upstream answered with a non-success status.
    #[error("Upstream returned status {status}: {body}")]
    UpstreamStatus {
        /// HTTP status code.
        status: u16,
        /// Response body, for diagnostics.
        body: String,
    },
    /// Upstream payload could not be decoded.
    #[error("Payload error: {0}")]
    Payload(#[from] JsonError),
    /// Local file access failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// No plugin is registered for the source.
    #[error("Unsupported source")]
    UnsupportedSource,
    /// Configuration is unusable.
    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl PortError {
    /// Whether the error means the upstream source could not be reached or refused
    /// the request.
    #[must_use]
    pub fn is_upstream_unavailable(&self) -> bool {
        matches!(self, Self::Network(_) | Self::UpstreamStatus { .. })
    }
}

#[async_trait]
/// Trait for source-specific ingest backends.
pub trait StationPort: Send + Sync {
    /// Metadata describing the source handled by this port.
    fn source(&self) -> &SourceMeta;

    /// Fetch every raw station record within the scope.
    ///
    /// # Errors
    ///
    /// Returns a [`PortError`] when the source cannot be read.
    async fn fetch(&self, scope: &GeoScope) -> Result<Vec<RawStationRecord>, PortError>;
}

/// Trait mapping one source's raw records into canonical stations.
pub trait Normalizer: Send + Sync {
    /// Metadata describing the source handled by this normalizer.
    fn source(&self) -> &SourceMeta;

    /// Fallbacks for display fields the source leaves out.
    fn defaults(&self) -> FieldDefaults;

    /// Copy the fields of a raw record into the typed intermediate.
    fn draft(&self, raw: &RawStationRecord) -> StationDraft;

    /// Normalize the record at `position` of an ingest batch.
    ///
    /// Records without an id are named `<source>-<position>`.
    fn normalize(&self, raw: &RawStationRecord, position: usize) -> Station {
        self.draft(raw)
            .finish(&self.defaults(), || format!("{}-{position}", self.source().id))
    }
}
