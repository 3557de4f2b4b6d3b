//! Herald Harness - exercises herald publishers under subscription churn.
//!
//! Two payload models are published from one thread while another keeps
//! disposing and replacing subscribers. The run ends with both publishers
//! disposed and a summary logged.

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

use anyhow::{Context, Result};
use clap::Parser;
use herald_config::HarnessConfig;
use herald_events::PublisherFactory;
use tracing::{debug, info};

mod cli;
mod config_bridge;
mod models;
mod run;

use cli::Cli;

fn main() -> Result<()> {
    let cli = Cli::parse();

    let resolved = HarnessConfig::load(cli.config.as_deref()).context("failed to load config")?;
    let mut config = resolved.config;
    cli.apply(&mut config);
    config.validate().context("invalid command-line flags")?;

    let log_config = config_bridge::to_log_config(&config);
    if let Err(e) = herald_telemetry::setup_logging(&log_config) {
        eprintln!("Failed to initialize logging: {e}");
    }

    debug!(
        config_file = ?resolved.loaded_file,
        env_overrides = ?resolved.env_overrides,
        "Configuration resolved"
    );

    let factory = PublisherFactory::new();
    let summary = run::run(&config.harness, &factory)?;

    info!(
        publishes = summary.publishes,
        replacements = summary.replacements,
        deliveries = summary.deliveries,
        handled = summary.handled,
        faults = summary.faults,
        elapsed_ms = summary.elapsed.as_millis(),
        "Run complete"
    );

    Ok(())
}
