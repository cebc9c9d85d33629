//! Host session check.
//!
//! The host normally authenticates requests before they reach the snippet
//! routes. This gate reproduces its token check: a request passes when it
//! carries the configured token as `Authorization: token <t>` (or `Bearer`)
//! or as a `?token=<t>` query parameter. Without a configured token every
//! request passes.

use axum::extract::{Query, Request, State};
use axum::http::header::AUTHORIZATION;
use axum::middleware::Next;
use axum::response::Response;
use std::collections::HashMap;
use tracing::warn;

use crate::app::AppState;
use crate::errors::ApiError;

pub async fn require_session(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let Some(expected) = state.token() else {
        return Ok(next.run(request).await);
    };

    if presented_token(&request).as_deref() == Some(expected) {
        Ok(next.run(request).await)
    } else {
        warn!(method = %request.method(), path = %request.uri().path(), "rejected request without a valid token");
        Err(ApiError::Forbidden)
    }
}

fn presented_token(request: &Request) -> Option<String> {
    let from_header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split_once(' '))
        .filter(|(scheme, _)| scheme.eq_ignore_ascii_case("token") || scheme.eq_ignore_ascii_case("bearer"))
        .map(|(_, token)| token.trim().to_string());

    from_header.or_else(|| {
        Query::<HashMap<String, String>>::try_from_uri(request.uri())
            .ok()
            .and_then(|Query(mut params)| params.remove("token"))
    })
}
