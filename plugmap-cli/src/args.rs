//! Command-line arguments.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use plugmap_core::model::{SourceId, Sources};

/// Build charging-station datasets and trail GPX files for the map site.
#[derive(Debug, Clone, Parser)]
#[command(name = "plugmap", version)]
pub(crate) struct Args {
    /// Settings file; `plugmap.toml` is used when present
    #[arg(short, long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Log level used when `RUST_LOG` is not set
    #[arg(long, global = true, default_value = "info", value_name = "LEVEL")]
    pub log_level: String,

    /// Compact log output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub(crate) enum Command {
    /// Fetch, normalize, and write station datasets for one source
    Fetch(FetchArgs),
    /// Generate one GPX waypoint file per trail
    Gpx(GpxArgs),
    /// List the registered station sources
    Sources,
}

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct FetchArgs {
    /// Source to fetch from
    #[arg(short, long, value_enum, default_value_t = SourceArg::Nrel)]
    pub source: SourceArg,

    /// Directory the station documents are written to
    #[arg(long, value_name = "PATH")]
    pub data_dir: Option<PathBuf>,

    /// Comma-separated state codes overriding the configured scope
    #[arg(long, value_delimiter = ',', value_name = "LIST")]
    pub states: Vec<String>,

    /// NREL API key
    #[arg(long, env = "NREL_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// `PlugShare` directory export to read instead of the bundled sample
    #[arg(long, value_name = "PATH")]
    pub plugshare_export: Option<PathBuf>,
}

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct GpxArgs {
    /// Trails document to read and update
    #[arg(long, value_name = "PATH")]
    pub trails: Option<PathBuf>,

    /// Directory the GPX files are written to
    #[arg(long, value_name = "PATH")]
    pub out_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum SourceArg {
    Nrel,
    Plugshare,
}

impl SourceArg {
    pub(crate) fn source_id(self) -> SourceId {
        match self {
            SourceArg::Nrel => SourceId::from(Sources::Nrel),
            SourceArg::Plugshare => SourceId::from(Sources::PlugShare),
        }
    }

    /// Base name of the documents written for this source.
    pub(crate) fn file_stem(self) -> &'static str {
        match self {
            SourceArg::Nrel => "charging_stations",
            SourceArg::Plugshare => "plugshare_stations",
        }
    }
}
