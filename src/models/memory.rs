use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::models::storage::{Document, DocumentStore, StoreError, empty_document};

/// In-memory document store, for tests and for embedding without a disk
#[derive(Debug, Default)]
pub struct MemoryStore {
    documents: Mutex<HashMap<Document, Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a document with a raw value, whatever its shape
    pub fn with_document(self, document: Document, value: Value) -> Self {
        self.documents().insert(document, value);
        self
    }

    /// Returns the stored value without the load-time defaulting
    pub fn get(&self, document: Document) -> Option<Value> {
        self.documents().get(&document).cloned()
    }

    fn documents(&self) -> MutexGuard<'_, HashMap<Document, Value>> {
        self.documents.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn load(&self, document: Document) -> Value {
        self.documents()
            .entry(document)
            .or_insert_with(empty_document)
            .clone()
    }

    async fn save(&self, document: Document, value: &Value) -> Result<(), StoreError> {
        self.documents().insert(document, value.clone());
        Ok(())
    }
}
