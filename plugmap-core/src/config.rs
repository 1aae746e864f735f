//! Pipeline settings: ingest scope and relevance allow-list.

use serde::{Deserialize, Serialize};

use crate::ports::PortError;
use crate::region::GeoScope;
use crate::relevance::RelevanceFilter;

/// The only settings that influence the pipeline's output.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// States the ingest ports are restricted to.
    pub scope: GeoScope,
    /// Connector families kept by the relevance filter.
    pub relevance: RelevanceFilter,
}

impl PipelineConfig {
    /// Reject settings that would make a run meaningless.
    ///
    /// # Errors
    ///
    /// Returns [`PortError::Config`] when the scope has no states or an
    /// allow-list prefix is blank (a blank prefix would match every connector).
    pub fn validate(&self) -> Result<(), PortError> {
        if self.scope.is_empty() {
            return Err(PortError::Config("scope must list at least one state".into()));
        }
        if self
            .relevance
            .prefixes
            .iter()
            .any(|prefix| prefix.trim().is_empty())
        {
            return Err(PortError::Config("relevance prefixes must not be blank".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(PipelineConfig::default().validate().is_ok());
    }

    #[test]
    fn empty_scope_is_rejected() {
        let config = PipelineConfig {
            scope: GeoScope::new(Vec::<String>::new()),
            ..PipelineConfig::default()
        };
        assert!(matches!(config.validate(), Err(PortError::Config(_))));
    }

    #[test]
    fn blank_prefix_is_rejected() {
        let config = PipelineConfig {
            relevance: RelevanceFilter::new(["NEMA", " "]),
            ..PipelineConfig::default()
        };
        assert!(matches!(config.validate(), Err(PortError::Config(_))));
    }
}
