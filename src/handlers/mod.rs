//! HTTP request handlers
//!
//! Each handler loads its document through the injected store, applies the
//! query or mutation in memory and, for mutations, saves the whole document
//! back before responding.
//!
//! # Module Organization
//!
//! - **`snippets`**: list/get/create/update/delete over the snippet collection
//! - **`tags`**: list/get/replace over the flat tag list
//! - **`auth`**: the host session check applied to every route

pub mod auth;
pub mod snippets;
pub mod tags;

use serde::Serialize;
use serde_json::Value;

use crate::errors::ApiError;

/// Body of successful mutations that return no record
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusResponse {
    pub status: &'static str,
}

impl StatusResponse {
    pub fn success() -> Self {
        Self { status: "success" }
    }
}

/// Parses a request body as JSON, rejecting empty bodies
pub(crate) fn parse_body(body: &[u8]) -> Result<Value, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(ApiError::BadRequest("request body is empty".to_string()));
    }
    serde_json::from_slice(body)
        .map_err(|e| ApiError::BadRequest(format!("request body is not valid JSON: {e}")))
}

/// Rejects the empty id that a bare collection path carries
pub(crate) fn require_id(id: &str) -> Result<&str, ApiError> {
    if id.is_empty() {
        return Err(ApiError::BadRequest("snippet id is required".to_string()));
    }
    Ok(id)
}
