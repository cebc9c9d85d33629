//! snips - notebook snippet store
//!
//! Persists user-authored code snippets and a flat tag list as two JSON
//! documents under the notebook server's config directory, and serves them
//! through a small REST-style JSON API for the editor front-end.
//!
//! - `models`: the document store and the snippet/tag views over it
//! - `handlers`: the snippet, tag and session-check request handlers
//! - `router`: the route table and its mount point
//! - `server`, `cli`: the standalone server and its configuration

pub mod app;
pub mod cli;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod router;
pub mod server;

pub use app::AppState;
pub use errors::{ApiError, ApiResult};
pub use models::{Document, DocumentStore, FileStore, MemoryStore, StoreError};
pub use router::{api_routes, build_router, mount_path};
