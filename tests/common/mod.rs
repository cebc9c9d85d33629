#![allow(dead_code)]

use snips::{AppState, FileStore, build_router, mount_path};
use std::sync::Arc;
use tempfile::TempDir;
use tokio::net::TcpListener;

/// A server bound to an ephemeral port over a temp config directory
pub struct TestServer {
    pub url: String,
    pub store: FileStore,
    pub client: reqwest::Client,
    _dir: TempDir,
}

impl TestServer {
    pub async fn start() -> Self {
        Self::start_with(|state| state, "/").await
    }

    pub async fn start_with(configure: impl FnOnce(AppState) -> AppState, base_url: &str) -> Self {
        let dir = TempDir::new().unwrap();
        Self::start_in(dir, configure, base_url).await
    }

    pub async fn start_in(
        dir: TempDir,
        configure: impl FnOnce(AppState) -> AppState,
        base_url: &str,
    ) -> Self {
        let store = FileStore::new(dir.path());
        let state = configure(AppState::new(Arc::new(store.clone())));
        let app = build_router(state, base_url);

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            url: format!("http://{addr}{}", mount_path(base_url)),
            store,
            client: reqwest::Client::new(),
            _dir: dir,
        }
    }

    pub fn at(&self, path: &str) -> String {
        format!("{}{}", self.url, path)
    }
}
