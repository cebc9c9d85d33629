use axum::Json;
use axum::body::Bytes;
use axum::extract::{Path, State};
use serde_json::Value;
use tracing::{debug, info};

use crate::app::AppState;
use crate::errors::{ApiError, ApiResult};
use crate::handlers::{StatusResponse, parse_body, require_id};
use crate::models::{Document, Snippet, SnippetCollection, now_millis};

async fn load_collection(state: &AppState) -> SnippetCollection {
    SnippetCollection::from_document(state.store().load(Document::Snippets).await)
}

async fn save_collection(state: &AppState, collection: &SnippetCollection) -> ApiResult<()> {
    state
        .store()
        .save(Document::Snippets, &collection.to_document())
        .await?;
    Ok(())
}

/// `GET /snippets`
pub async fn list(State(state): State<AppState>) -> Json<Value> {
    Json(load_collection(&state).await.to_document())
}

/// `GET /snippets/{id}`
pub async fn get(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Json<Value>> {
    let collection = load_collection(&state).await;
    collection
        .find(&id)
        .map(|snippet| Json(snippet.clone().into_value()))
        .ok_or_else(|| ApiError::NotFound(format!("snippet {id} not found")))
}

/// `POST /snippets`
///
/// Stamps `id`, `createdAt` and `updatedAt` where the body leaves them out,
/// appends the snippet and returns it as stored.
pub async fn create(State(state): State<AppState>, body: Bytes) -> ApiResult<Json<Value>> {
    let mut snippet = Snippet::from_value(parse_body(&body)?)
        .ok_or_else(|| ApiError::BadRequest("snippet must be a JSON object".to_string()))?;
    snippet.stamp_defaults(now_millis());

    let _guard = state.write_guard(Document::Snippets).await;
    let mut collection = load_collection(&state).await;

    let id = snippet.id().unwrap_or_default().to_string();
    if collection.contains(&id) {
        return Err(ApiError::Conflict(format!("snippet {id} already exists")));
    }

    collection.push(snippet.clone());
    save_collection(&state, &collection).await?;

    info!(%id, total = collection.len(), "snippet created");
    Ok(Json(snippet.into_value()))
}

/// `POST /snippets/{id}`: the path id plays no part in creation
pub async fn create_at(
    State(state): State<AppState>,
    Path(_id): Path<String>,
    body: Bytes,
) -> ApiResult<Json<Value>> {
    create(State(state), body).await
}

/// `PUT /snippets/{id}`
///
/// Shallow-merges the body into the matching snippet. An unknown id is not an
/// error: the collection is saved back unchanged and success is reported.
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Bytes,
) -> ApiResult<Json<StatusResponse>> {
    let id = require_id(&id)?;
    let patch = match parse_body(&body)? {
        Value::Object(fields) => fields,
        _ => return Err(ApiError::BadRequest("update must be a JSON object".to_string())),
    };

    let _guard = state.write_guard(Document::Snippets).await;
    let mut collection = load_collection(&state).await;

    if collection.update(id, patch) {
        info!(%id, "snippet updated");
    } else {
        debug!(%id, "update for unknown snippet ignored");
    }
    save_collection(&state, &collection).await?;

    Ok(Json(StatusResponse::success()))
}

/// `PUT /snippets`: there is no snippet to update without an id
pub async fn update_without_id() -> ApiError {
    ApiError::BadRequest("snippet id is required".to_string())
}

/// `DELETE /snippets/{id}`; deleting an unknown id succeeds
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<StatusResponse>> {
    let id = require_id(&id)?;

    let _guard = state.write_guard(Document::Snippets).await;
    let mut collection = load_collection(&state).await;

    let removed = collection.remove(id);
    save_collection(&state, &collection).await?;

    info!(%id, removed, "snippet deleted");
    Ok(Json(StatusResponse::success()))
}

/// `DELETE /snippets`
pub async fn delete_without_id() -> ApiError {
    ApiError::BadRequest("snippet id is required".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DocumentStore, MemoryStore, StoreError};
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Arc;

    /// Yields right after reading, so concurrent handlers all load before
    /// any of them saves
    struct YieldingStore(MemoryStore);

    #[async_trait]
    impl DocumentStore for YieldingStore {
        async fn load(&self, document: Document) -> Value {
            let value = self.0.load(document).await;
            tokio::task::yield_now().await;
            value
        }

        async fn save(&self, document: Document, value: &Value) -> Result<(), StoreError> {
            self.0.save(document, value).await
        }
    }

    async fn create_two_concurrently(state: AppState) -> Value {
        let (first, second) = tokio::join!(
            create(State(state.clone()), body(json!({"id": "first"}))),
            create(State(state.clone()), body(json!({"id": "second"}))),
        );
        first.unwrap();
        second.unwrap();

        let Json(all) = list(State(state)).await;
        all
    }

    fn state_with(store: Arc<MemoryStore>) -> AppState {
        AppState::new(store)
    }

    fn body(value: Value) -> Bytes {
        Bytes::from(value.to_string())
    }

    async fn create_ok(state: &AppState, value: Value) -> Value {
        let Json(created) = create(State(state.clone()), body(value)).await.unwrap();
        created
    }

    #[tokio::test]
    async fn create_then_get_round_trips() {
        let store = Arc::new(MemoryStore::new());
        let state = state_with(store.clone());

        let created = create_ok(&state, json!({"title": "x", "code": "print(1)"})).await;
        let id = created["id"].as_str().unwrap().to_string();
        assert!(created["createdAt"].is_i64());
        assert_eq!(created["createdAt"], created["updatedAt"]);

        let Json(fetched) = get(State(state.clone()), Path(id)).await.unwrap();
        assert_eq!(fetched, created);
        assert_eq!(store.get(Document::Snippets), Some(json!([created])));
    }

    #[tokio::test]
    async fn create_appends_in_order() {
        let state = state_with(Arc::new(MemoryStore::new()));
        for title in ["one", "two", "three"] {
            create_ok(&state, json!({ "title": title })).await;
        }

        let Json(all) = list(State(state)).await;
        let titles: Vec<_> = all
            .as_array()
            .unwrap()
            .iter()
            .map(|s| s["title"].as_str().unwrap())
            .collect();
        assert_eq!(titles, ["one", "two", "three"]);
    }

    #[tokio::test]
    async fn create_rejects_non_objects_and_duplicate_ids() {
        let store = Arc::new(MemoryStore::new());
        let state = state_with(store.clone());

        let err = create(State(state.clone()), body(json!(["x"]))).await.unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(_)));

        create_ok(&state, json!({"id": "fixed"})).await;
        let err = create(State(state.clone()), body(json!({"id": "fixed", "title": "again"})))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Conflict(_)));
        assert_eq!(store.load(Document::Snippets).await.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn get_unknown_is_not_found() {
        let state = state_with(Arc::new(MemoryStore::new()));
        let err = get(State(state), Path("nope".into())).await.unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
    }

    #[tokio::test]
    async fn update_merges_over_existing_fields() {
        let state = state_with(Arc::new(MemoryStore::new()));
        let created = create_ok(&state, json!({"id": "a", "title": "old", "code": "1"})).await;

        let Json(status) = update(
            State(state.clone()),
            Path("a".into()),
            body(json!({"title": "new", "updatedAt": 99, "id": "hijack"})),
        )
        .await
        .unwrap();
        assert_eq!(status, StatusResponse::success());

        let Json(fetched) = get(State(state), Path("a".into())).await.unwrap();
        assert_eq!(fetched["id"], "a");
        assert_eq!(fetched["title"], "new");
        assert_eq!(fetched["code"], "1");
        assert_eq!(fetched["updatedAt"], 99);
        assert_eq!(fetched["createdAt"], created["createdAt"]);
    }

    #[tokio::test]
    async fn update_of_unknown_id_is_a_successful_no_op() {
        let store = Arc::new(MemoryStore::new());
        let state = state_with(store.clone());
        create_ok(&state, json!({"id": "a"})).await;
        let before = store.get(Document::Snippets);

        let result = update(
            State(state),
            Path("does-not-exist".into()),
            body(json!({"title": "t"})),
        )
        .await;
        assert!(result.is_ok());
        assert_eq!(store.get(Document::Snippets), before);
    }

    #[tokio::test]
    async fn update_and_delete_require_an_id() {
        let state = state_with(Arc::new(MemoryStore::new()));

        let err = update(State(state.clone()), Path(String::new()), body(json!({})))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(_)));

        let err = delete(State(state), Path(String::new())).await.unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(_)));

        assert!(matches!(update_without_id().await, ApiError::BadRequest(_)));
        assert!(matches!(delete_without_id().await, ApiError::BadRequest(_)));
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let store = Arc::new(MemoryStore::new());
        let state = state_with(store.clone());
        create_ok(&state, json!({"id": "a"})).await;
        create_ok(&state, json!({"id": "b"})).await;

        assert!(delete(State(state.clone()), Path("a".into())).await.is_ok());
        let after_first = store.get(Document::Snippets);
        assert!(delete(State(state.clone()), Path("a".into())).await.is_ok());

        assert_eq!(store.get(Document::Snippets), after_first);
        let Json(all) = list(State(state)).await;
        assert_eq!(all.as_array().unwrap().len(), 1);
        assert_eq!(all[0]["id"], "b");
    }

    #[tokio::test]
    async fn corrupt_shape_lists_as_empty() {
        let store = Arc::new(MemoryStore::new().with_document(Document::Snippets, json!({"not": "a list"})));
        let Json(all) = list(State(state_with(store))).await;
        assert_eq!(all, json!([]));
    }

    #[tokio::test]
    async fn interleaved_creates_lose_a_write_without_serialization() {
        let state = AppState::new(Arc::new(YieldingStore(MemoryStore::new())));

        let all = create_two_concurrently(state).await;
        assert_eq!(all.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn serialized_creates_keep_both_writes() {
        let state = AppState::new(Arc::new(YieldingStore(MemoryStore::new())))
            .with_serialized_writes(true);

        let all = create_two_concurrently(state).await;
        let ids: Vec<_> = all
            .as_array()
            .unwrap()
            .iter()
            .map(|s| s["id"].as_str().unwrap())
            .collect();
        assert_eq!(ids.len(), 2);
        assert!(ids.contains(&"first") && ids.contains(&"second"));
    }
}
