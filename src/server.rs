use anyhow::{Context, Result};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

use crate::app::AppState;
use crate::cli::ServerConfig;
use crate::models::FileStore;
use crate::router::{build_router, mount_path};

/// Binds the configured address and serves until Ctrl-C
pub async fn run(config: ServerConfig) -> Result<()> {
    let store = FileStore::new(&config.config_dir);
    info!(path = %store.root().display(), "storing snippets");

    let state = AppState::new(Arc::new(store))
        .with_serialized_writes(config.serialize_writes)
        .with_token(config.token.clone());
    let app = build_router(state.clone(), &config.base_url);

    let listener = TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("failed to bind HTTP on {}", config.bind))?;
    let addr = listener.local_addr().context("failed to read bound address")?;
    info!(
        %addr,
        mount = %mount_path(&config.base_url),
        serialize_writes = state.serializes_writes(),
        token_required = state.token().is_some(),
        "snips HTTP API ready"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("shutting down");
    }
}
