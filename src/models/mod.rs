pub mod memory;
pub mod snippet;
pub mod storage;
pub mod tags;

pub use memory::MemoryStore;
pub use snippet::{Snippet, SnippetCollection, now_millis};
pub use storage::{Document, DocumentStore, FileStore, StoreError};
pub use tags::TagList;
