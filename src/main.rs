//! snips - standalone snippet server
//!
//! Runs the snippet and tag API on its own, outside a notebook server,
//! reading the same config directory and honouring the same token.

use clap::Parser;
use color_eyre::Result;
use color_eyre::eyre::eyre;
use snips::cli::Args;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let args = Args::parse();
    init_tracing(args.log_json)?;

    let config = args.into_config()?;
    snips::server::run(config)
        .await
        .map_err(|e| eyre!("{e:#}"))
}

fn init_tracing(json: bool) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    let result = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    result.map_err(|e| eyre!("failed to install tracing subscriber: {e}"))
}
