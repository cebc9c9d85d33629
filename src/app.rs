//! Shared application state handed to every request handler.

use std::sync::Arc;
use tokio::sync::{Mutex, MutexGuard};

use crate::models::{Document, DocumentStore};

/// One lock per document, held from load to save by mutating handlers
#[derive(Debug, Default)]
struct DocumentLocks {
    snippets: Mutex<()>,
    tags: Mutex<()>,
}

impl DocumentLocks {
    fn get(&self, document: Document) -> &Mutex<()> {
        match document {
            Document::Snippets => &self.snippets,
            Document::Tags => &self.tags,
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    store: Arc<dyn DocumentStore>,
    locks: Option<Arc<DocumentLocks>>,
    token: Option<Arc<str>>,
}

impl AppState {
    /// State with no write serialization and no token check
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            store,
            locks: None,
            token: None,
        }
    }

    /// When enabled, load-modify-save sequences on the same document no
    /// longer interleave, so concurrent mutations cannot lose each other.
    pub fn with_serialized_writes(mut self, enabled: bool) -> Self {
        self.locks = enabled.then(|| Arc::new(DocumentLocks::default()));
        self
    }

    /// Requires requests to present `token`. Empty tokens disable the check.
    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token.filter(|t| !t.is_empty()).map(Arc::from);
        self
    }

    pub fn store(&self) -> &dyn DocumentStore {
        self.store.as_ref()
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn serializes_writes(&self) -> bool {
        self.locks.is_some()
    }

    /// Acquires the document's write lock when serialization is enabled.
    /// Hold the guard until the document has been saved.
    pub async fn write_guard(&self, document: Document) -> Option<MutexGuard<'_, ()>> {
        match &self.locks {
            Some(locks) => Some(locks.get(document).lock().await),
            None => None,
        }
    }
}
