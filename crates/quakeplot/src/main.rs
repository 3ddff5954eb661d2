//! quakeplot - renders the USGS earthquake feed as four charts

use anyhow::{bail, Context, Result};
use clap::Parser;
use quake_common::init_logging;
use quakeplot::{config_source, load_config, run, Args};
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = load_config(&args).context("Failed to load configuration")?;
    init_logging(config.logging.to_setup()).context("Failed to initialize logging")?;

    info!("Starting quakeplot");
    match config_source(&args) {
        Some(path) => info!("Loaded configuration from {}", path.display()),
        None => info!("No configuration file found, using defaults"),
    }

    let report = run(&config).await?;

    for outcome in &report.outcomes {
        match &outcome.result {
            Ok(output) => {
                for path in &output.paths {
                    info!("{}: {}", outcome.region, path.display());
                }
            }
            Err(e) => error!("{}: {}", outcome.region, e),
        }
    }

    if report.all_failed() {
        bail!("No chart could be rendered");
    }

    info!(
        "Done: {} of {} charts rendered",
        report.succeeded(),
        report.outcomes.len()
    );
    Ok(())
}
