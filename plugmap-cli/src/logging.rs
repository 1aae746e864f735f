//! Tracing subscriber setup.

use std::io;

use anyhow::{Context, Result};
use tracing::debug;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

const CRATES: [&str; 4] = [
    "plugmap_cli",
    "plugmap_core",
    "plugmap_provider_nrel",
    "plugmap_provider_plugshare",
];

/// Install the global subscriber. `RUST_LOG` wins over `level`.
pub(crate) fn init(level: &str, quiet: bool) -> Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(directives(level))
            .with_context(|| format!("Invalid log level {level:?}"))?,
    };

    let registry = tracing_subscriber::registry().with(filter);
    let installed = if quiet {
        registry
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_writer(io::stderr)
                    .compact(),
            )
            .try_init()
    } else {
        registry
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_timer(fmt::time::uptime())
                    .with_writer(io::stderr),
            )
            .try_init()
    };
    installed.context("Failed to install log subscriber")?;

    debug!(level, "logging initialized");
    Ok(())
}

fn directives(level: &str) -> String {
    CRATES
        .iter()
        .map(|krate| format!("{krate}={level}"))
        .collect::<Vec<_>>()
        .join(",")
}
