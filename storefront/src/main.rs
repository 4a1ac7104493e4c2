//! Terminal storefront client

use clap::Parser;
use color_eyre::Result;
use std::io::read_to_string;
use tracing::info;

use crate::client::Client;
use crate::config::{Config, LogFormat};
use crate::opt::Opt;
use crate::service::{Gate, expiry};
use crate::storage::Storage;

mod client;
mod command;
mod config;
mod model;
mod opt;
mod service;
mod storage;

/// Initializes tracing collection
///
/// Logs go to stderr, stdout is reserved for the views.
fn setup_tracing(config: config::Logging) {
    use tracing_error::ErrorLayer;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::{EnvFilter, fmt};

    let fmt_layer = match config.format {
        LogFormat::Pretty => fmt::layer().pretty().with_writer(std::io::stderr).boxed(),
        LogFormat::Compact => fmt::layer().compact().with_writer(std::io::stderr).boxed(),
    };

    let filter_layer =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    let filter_layer = config
        .filters
        .into_iter()
        .fold(filter_layer, |layer, filter| layer.add_directive(filter));

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .with(ErrorLayer::default())
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let Opt {
        config: mut config_file,
        command,
    } = Opt::parse();

    let config = read_to_string(&mut config_file)?;
    let config: Config = toml::from_str(&config)?;

    setup_tracing(config.logging);
    color_eyre::install()?;

    info!(
        config = ?config_file.path().path(),
        backend = %config.api.base_url,
        "Tracing initialized, starting the storefront"
    );

    let storage = Storage::with_config(config.storage).await?;
    let client = Client::new(&config.api)?;
    let gate = Gate::new(client, storage);

    let watcher = expiry::spawn(gate.store().clone());
    let restored = gate.start().await;
    info!(?restored, "Session loaded");

    let result = command::run(command, &gate, restored).await;

    watcher.abort();
    result
}
