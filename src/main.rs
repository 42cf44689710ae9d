mod app;
mod config;
mod db;
mod domain;
mod fingerprint;
mod freshness;
mod infrastructure;
mod notify;
mod relevance;
mod sources;
mod tasks;

use anyhow::Result;
use infrastructure::{directories, logging, shutdown};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let config = config::load_config()?;
    let paths = directories::ensure_directories(&config.directories)?;
    logging::init_tracing(&config, &paths)?;

    let shutdown = shutdown::Shutdown::new();
    shutdown.install_signal_handlers();

    let app = app::JobSniperApp::initialize(config, paths, shutdown.clone()).await?;
    app.run().await
}
