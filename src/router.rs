use axum::Router;
use axum::extract::Request;
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::{get, post};
use tracing::debug;

use crate::app::AppState;
use crate::handlers::{auth, snippets, tags};

/// Path segment the routes are mounted under, below the host's base URL
pub const EXTENSION_PATH: &str = "jupyterlab-snips";

/// Joins the host base URL and the extension path into the mount point,
/// e.g. `/` becomes `/jupyterlab-snips` and `/lab/` becomes
/// `/lab/jupyterlab-snips`.
pub fn mount_path(base_url: &str) -> String {
    let base = base_url.trim_matches('/');
    if base.is_empty() {
        format!("/{EXTENSION_PATH}")
    } else {
        format!("/{base}/{EXTENSION_PATH}")
    }
}

/// Route table, relative to the mount point. Tag routes are registered
/// ahead of the snippet routes.
pub fn api_routes(state: AppState) -> Router {
    Router::new()
        .route("/tags", get(tags::list).post(tags::replace))
        .route("/tags/{id}", get(tags::get))
        .route(
            "/snippets",
            get(snippets::list)
                .post(snippets::create)
                .put(snippets::update_without_id)
                .delete(snippets::delete_without_id),
        )
        .route(
            "/snippets/",
            get(snippets::list)
                .post(snippets::create)
                .put(snippets::update_without_id)
                .delete(snippets::delete_without_id),
        )
        .route(
            "/snippets/{id}",
            get(snippets::get)
                .post(snippets::create_at)
                .put(snippets::update)
                .delete(snippets::delete),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_session,
        ))
        .route_layer(middleware::from_fn(trace_request))
        .with_state(state)
}

/// Full application router with the API nested under `base_url`
pub fn build_router(state: AppState, base_url: &str) -> Router {
    Router::new().nest(&mount_path(base_url), api_routes(state))
}

async fn trace_request(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let response = next.run(request).await;
    debug!(%method, %path, status = response.status().as_u16(), "request handled");
    response
}
