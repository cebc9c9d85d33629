use axum::Json;
use axum::body::Bytes;
use axum::extract::{Path, State};
use serde_json::Value;
use tracing::info;

use crate::app::AppState;
use crate::errors::{ApiError, ApiResult};
use crate::handlers::{StatusResponse, parse_body};
use crate::models::{Document, TagList};

async fn load_tags(state: &AppState) -> TagList {
    TagList::from_document(state.store().load(Document::Tags).await)
}

/// `GET /tags`
pub async fn list(State(state): State<AppState>) -> Json<Value> {
    Json(load_tags(&state).await.to_document())
}

/// `GET /tags/{id}`: a membership check on the tag value itself
pub async fn get(State(state): State<AppState>, Path(tag): Path<String>) -> ApiResult<Json<String>> {
    if load_tags(&state).await.contains(&tag) {
        Ok(Json(tag))
    } else {
        Err(ApiError::NotFound(format!("tag {tag} not found")))
    }
}

/// `POST /tags`: the body is the complete new list
pub async fn replace(State(state): State<AppState>, body: Bytes) -> ApiResult<Json<StatusResponse>> {
    let tags = TagList::parse(parse_body(&body)?)
        .map_err(|e| ApiError::BadRequest(format!("tags must be an array of strings: {e}")))?;

    let _guard = state.write_guard(Document::Tags).await;
    state.store().save(Document::Tags, &tags.to_document()).await?;

    info!(count = tags.as_slice().len(), "tags replaced");
    Ok(Json(StatusResponse::success()))
}
