//! Settings file loading and command-line overrides.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use plugmap_core::{config::PipelineConfig, region::GeoScope};
use plugmap_provider_nrel::{BASE_URL, DEMO_KEY};
use serde::Deserialize;
use tracing::debug;

use crate::args::{FetchArgs, GpxArgs};

/// Settings file looked up in the working directory when `--config` is not given.
pub(crate) const DEFAULT_SETTINGS_FILE: &str = "plugmap.toml";

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub(crate) struct Settings {
    #[serde(flatten)]
    pub pipeline: PipelineConfig,
    pub nrel: NrelSettings,
    pub plugshare: PlugShareSettings,
    pub output: OutputSettings,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub(crate) struct NrelSettings {
    pub api_key: Option<String>,
    pub base_url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub(crate) struct PlugShareSettings {
    pub export_path: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub(crate) struct OutputSettings {
    pub data_dir: PathBuf,
    pub gpx_dir: PathBuf,
    pub trails: PathBuf,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            gpx_dir: PathBuf::from("gpx"),
            trails: PathBuf::from("data/trails.json"),
        }
    }
}

impl Settings {
    /// Load settings from `path`, or from `plugmap.toml` when it exists, or defaults.
    pub(crate) fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(explicit) => explicit.to_path_buf(),
            None => {
                let fallback = PathBuf::from(DEFAULT_SETTINGS_FILE);
                if !fallback.exists() {
                    debug!("no settings file, using defaults");
                    return Ok(Self::default());
                }
                fallback
            }
        };

        let text = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read settings from {}", path.display()))?;
        let settings = Self::from_toml(&text)
            .with_context(|| format!("Invalid settings in {}", path.display()))?;

        debug!(path = %path.display(), "settings loaded");
        Ok(settings)
    }

    pub(crate) fn from_toml(text: &str) -> Result<Self> {
        let mut settings: Self = toml::from_str(text)?;
        settings.pipeline.scope = GeoScope::new(&settings.pipeline.scope.states);
        Ok(settings)
    }

    /// Apply `fetch` flags on top of the file settings.
    pub(crate) fn apply_fetch_args(&mut self, args: &FetchArgs) {
        if !args.states.is_empty() {
            self.pipeline.scope = GeoScope::new(&args.states);
        }
        if let Some(dir) = &args.data_dir {
            self.output.data_dir.clone_from(dir);
        }
        if let Some(key) = &args.api_key {
            self.nrel.api_key = Some(key.clone());
        }
        if let Some(path) = &args.plugshare_export {
            self.plugshare.export_path = Some(path.clone());
        }
    }

    /// Apply `gpx` flags on top of the file settings.
    pub(crate) fn apply_gpx_args(&mut self, args: &GpxArgs) {
        if let Some(trails) = &args.trails {
            self.output.trails.clone_from(trails);
        }
        if let Some(dir) = &args.out_dir {
            self.output.gpx_dir.clone_from(dir);
        }
    }

    pub(crate) fn nrel_api_key(&self) -> &str {
        self.nrel.api_key.as_deref().unwrap_or(DEMO_KEY)
    }

    pub(crate) fn nrel_base_url(&self) -> &str {
        self.nrel.base_url.as_deref().unwrap_or(BASE_URL)
    }
}
