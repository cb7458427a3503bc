use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;

mod aggregator;
mod catalog_client;
mod config;
mod error;
mod pipeline;
mod report;

use crate::catalog_client::CatalogClient;
use crate::config::Settings;
use crate::pipeline::Pipeline;
use crate::report::Outcome;

/// Average cubic weight of one product category in a paginated catalog.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Directory holding default.toml and an optional local.toml
    #[arg(long, default_value = "config")]
    config_dir: PathBuf,
    /// Catalog API base URL
    #[arg(long)]
    base_url: Option<String>,
    /// Endpoint of the first catalog page
    #[arg(long)]
    start_endpoint: Option<String>,
    /// Product category to average (exact, case-sensitive match)
    #[arg(long)]
    category: Option<String>,
    /// Conversion factor in kg per cubic metre
    #[arg(long)]
    conversion_factor: Option<f64>,
}

impl Cli {
    fn apply_overrides(&self, settings: &mut Settings) {
        if let Some(base_url) = &self.base_url {
            settings.api.base_url = base_url.clone();
        }
        if let Some(start_endpoint) = &self.start_endpoint {
            settings.api.start_endpoint = start_endpoint.clone();
        }
        if let Some(category) = &self.category {
            settings.catalog.target_category = category.clone();
        }
        if let Some(factor) = self.conversion_factor {
            settings.catalog.conversion_factor = factor;
        }
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    env_logger::init();
    let cli = Cli::parse();

    let mut settings = Settings::load(&cli.config_dir)
        .with_context(|| format!("Failed to load settings from {}", cli.config_dir.display()))?;
    cli.apply_overrides(&mut settings);
    settings.validate().context("Invalid settings")?;

    log::info!(
        "Averaging cubic weight of '{}' from {}{}",
        settings.catalog.target_category,
        settings.api.base_url,
        settings.api.start_endpoint
    );

    let client = CatalogClient::new(&settings.api).context("Failed to build HTTP client")?;
    let product_name = settings.catalog.target_category.clone();
    let mut pipeline = Pipeline::new(client, settings.api.start_endpoint.clone(), settings.catalog);

    let result = tokio::select! {
        result = pipeline.run() => result,
        _ = tokio::signal::ctrl_c() => {
            log::warn!("Interrupted, abandoning run");
            return Ok(ExitCode::from(130));
        }
    };
    log::debug!(
        "Pipeline {:?}: {} page(s) fetched, {} item(s) accepted",
        pipeline.state(),
        pipeline.pages_fetched(),
        pipeline.accepted()
    );

    match result {
        Ok(average) => {
            match report::outcome(&average, &product_name) {
                Outcome::Result(weight) => println!("{}", weight),
                Outcome::Notice(message) => eprintln!("{}", message),
            }
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            eprintln!("{}", e.notification());
            Ok(ExitCode::FAILURE)
        }
    }
}
