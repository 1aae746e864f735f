//! High-level pipeline facade combining all sources.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::config::PipelineConfig;
use crate::model::{RawStationRecord, SourceId, Station, StationCollection};
use crate::plugin::{SourcePlugin, SourceRegistry};
use crate::ports::{Normalizer, PortError};

/// Output of one pipeline run for a single source.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineRun {
    /// Every normalized station.
    pub all: StationCollection,
    /// Stations passing the relevance filter.
    pub relevant: StationCollection,
}

/// Public entry point for running the ingest → normalize → filter → aggregate pipeline.
pub struct StationPipeline {
    registry: Arc<SourceRegistry>,
    config: PipelineConfig,
}

impl StationPipeline {
    /// Create a pipeline bound to the provided registry and settings.
    #[must_use]
    pub fn new(registry: Arc<SourceRegistry>, config: PipelineConfig) -> Self {
        Self { registry, config }
    }

    /// List all available sources and their display names.
    #[must_use]
    pub fn sources(&self) -> Vec<(SourceId, String)> {
        self.registry
            .sources()
            .into_iter()
            .map(|meta| (meta.id, meta.name))
            .collect()
    }

    /// Fetch, normalize, filter, and summarize one source.
    ///
    /// Nothing is returned unless every step succeeds, so callers never see a
    /// partial result.
    ///
    /// # Errors
    ///
    /// Returns a [`PortError`] if the source is unsupported, the settings are
    /// invalid, or the ingest port fails.
    pub async fn run(&self, source: &SourceId) -> Result<PipelineRun, PortError> {
        self.config.validate()?;
        let plugin = self.registry.plugin(source)?;

        info!(
            source = %source,
            states = %self.config.scope.query_value(),
            "fetching station records"
        );
        let records = plugin.station_port.fetch(&self.config.scope).await?;
        info!(source = %source, records = records.len(), "fetched station records");

        Ok(self.process(plugin, &records, Utc::now()))
    }

    /// Run the pure part of the pipeline over already-fetched records.
    #[must_use]
    pub fn process(
        &self,
        plugin: &SourcePlugin,
        records: &[RawStationRecord],
        last_updated: DateTime<Utc>,
    ) -> PipelineRun {
        let stations = normalize_all(plugin.normalizer.as_ref(), records);
        let all = StationCollection::new(stations, &plugin.meta, last_updated);
        let relevant = all.filtered(&self.config.relevance);

        info!(
            source = %plugin.meta.id,
            total = all.len(),
            relevant = relevant.len(),
            "processed stations"
        );

        PipelineRun { all, relevant }
    }
}

/// Normalize a batch of raw records, preserving their order.
#[must_use]
pub fn normalize_all(normalizer: &dyn Normalizer, records: &[RawStationRecord]) -> Vec<Station> {
    let stations: Vec<Station> = records
        .iter()
        .enumerate()
        .map(|(position, raw)| normalizer.normalize(raw, position))
        .collect();
    debug!(
        source = %normalizer.source().id,
        stations = stations.len(),
        "normalized records"
    );
    stations
}
