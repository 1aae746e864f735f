//! Registry for all source plugins and their ports.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::model::{SourceId, SourceMeta};
use crate::ports::{Normalizer, PortError, StationPort};

/// Ingest port and normalizer implementing a single source.
pub struct SourcePlugin {
    /// Static metadata describing the source.
    pub meta: SourceMeta,
    /// Implementation for fetching raw records.
    pub station_port: Arc<dyn StationPort>,
    /// Implementation for mapping raw records to stations.
    pub normalizer: Arc<dyn Normalizer>,
}

/// Registry that resolves plugins by source identifier.
pub struct SourceRegistry {
    plugins: BTreeMap<SourceId, SourcePlugin>,
}

impl SourceRegistry {
    /// Build a registry from the provided plugin list.
    #[must_use]
    pub fn new(plugins: Vec<SourcePlugin>) -> Self {
        let plugins_map = plugins
            .into_iter()
            .map(|plugin| (plugin.meta.id.clone(), plugin))
            .collect();
        Self {
            plugins: plugins_map,
        }
    }

    /// Return metadata for all registered sources, ordered by id.
    #[must_use]
    pub fn sources(&self) -> Vec<SourceMeta> {
        self.sources_iter().cloned().collect()
    }

    /// Iterator over source metadata.
    pub fn sources_iter(&self) -> impl Iterator<Item = &SourceMeta> {
        self.plugins.values().map(|plugin| &plugin.meta)
    }

    /// Look up the plugin for the given source.
    ///
    /// # Errors
    ///
    /// Returns [`PortError::UnsupportedSource`] when no plugin is registered.
    pub fn plugin(&self, source: &SourceId) -> Result<&SourcePlugin, PortError> {
        self.plugins.get(source).ok_or(PortError::UnsupportedSource)
    }
}
