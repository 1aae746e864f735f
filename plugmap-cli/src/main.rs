//! Command-line runner that writes station datasets and trail GPX files for the map site.

mod args;
mod gpx;
mod logging;
mod persist;
mod settings;

use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use plugmap_core::{
    model::{ChargerType, StationCollection},
    plugin::SourceRegistry,
    ports::PortError,
    service::StationPipeline,
};
use plugmap_provider_nrel::{self as nrel, NrelStationPort};
use plugmap_provider_plugshare as plugshare;
use reqwest::Client;
use tracing::{error, info};

use crate::args::{Args, Command, FetchArgs};
use crate::persist::Artifact;
use crate::settings::Settings;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    logging::init(&args.log_level, args.quiet)?;

    let mut settings = Settings::load(args.config.as_deref())?;

    match &args.command {
        Command::Fetch(fetch_args) => {
            settings.apply_fetch_args(fetch_args);
            fetch(&settings, fetch_args).await
        }
        Command::Gpx(gpx_args) => {
            settings.apply_gpx_args(gpx_args);
            generate_gpx(&settings)
        }
        Command::Sources => list_sources(&settings),
    }
}

fn build_pipeline(settings: &Settings) -> Result<StationPipeline> {
    let client = Client::builder()
        .user_agent("plugmap/0.1")
        .build()
        .context("Failed to build HTTP client")?;

    let nrel_port = NrelStationPort::new(client, settings.nrel_api_key())
        .with_base_url(settings.nrel_base_url());
    let plugins = vec![
        nrel::plugin_with_port(nrel_port),
        plugshare::plugin(settings.plugshare.export_path.clone()),
    ];

    let registry = Arc::new(SourceRegistry::new(plugins));
    Ok(StationPipeline::new(registry, settings.pipeline.clone()))
}

async fn fetch(settings: &Settings, args: &FetchArgs) -> Result<()> {
    let pipeline = build_pipeline(settings)?;
    let source = args.source.source_id();

    let run = match pipeline.run(&source).await {
        Ok(run) => run,
        Err(err) => {
            if let PortError::UpstreamStatus { status, .. } = &err {
                error!(source = %source, status, "upstream rejected the request");
            }
            if err.is_upstream_unavailable() {
                error!(source = %source, "source unavailable, existing files left untouched");
            }
            return Err(err).with_context(|| format!("Pipeline run for {source} failed"));
        }
    };

    let stem = args.source.file_stem();
    let data_dir = &settings.output.data_dir;
    let all_path = data_dir.join(format!("{stem}_all.json"));
    let relevant_path = data_dir.join(format!("{stem}.json"));

    persist::write_all(&[
        Artifact::json(&all_path, &run.all)?,
        Artifact::json(&relevant_path, &run.relevant)?,
    ])?;

    log_summary("all", &run.all);
    log_summary("relevant", &run.relevant);
    info!(
        all = %all_path.display(),
        relevant = %relevant_path.display(),
        "station documents written"
    );
    Ok(())
}

fn log_summary(label: &str, collection: &StationCollection) {
    let metadata = collection.metadata();
    info!(
        collection = label,
        total = metadata.total_stations,
        "station summary"
    );
    for (state, count) in &metadata.by_state {
        info!(collection = label, state = %state, count, "stations by state");
    }
    for charger_type in ChargerType::ALL {
        let count = metadata.by_type.get(&charger_type).copied().unwrap_or(0);
        info!(
            collection = label,
            charger_type = %charger_type,
            icon = charger_type.icon(),
            count,
            "stations by type"
        );
    }
}

fn generate_gpx(settings: &Settings) -> Result<()> {
    let generated = gpx::generate(&settings.output.trails, &settings.output.gpx_dir, Utc::now())?;
    info!(count = generated.files.len(), "GPX generation finished");
    Ok(())
}

#[expect(
    clippy::print_stdout,
    reason = "the source listing is the command's output"
)]
fn list_sources(settings: &Settings) -> Result<()> {
    let pipeline = build_pipeline(settings)?;
    for (id, name) in pipeline.sources() {
        println!("{id}\t{name}");
    }
    Ok(())
}
