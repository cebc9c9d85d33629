use async_trait::async_trait;
use serde_json::Value;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, error, warn};
use uuid::Uuid;

/// Name of the directory, inside the config directory, that holds the documents
pub const STORE_DIR_NAME: &str = "snippets";

/// The logical documents the store knows about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Document {
    Snippets,
    Tags,
}

impl Document {
    pub fn name(&self) -> &'static str {
        match self {
            Document::Snippets => "snippets",
            Document::Tags => "tags",
        }
    }

    pub fn file_name(&self) -> String {
        format!("{}.json", self.name())
    }
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("could not write {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("could not serialize {document} document: {source}")]
    Serialize {
        document: Document,
        #[source]
        source: serde_json::Error,
    },
}

/// The value every document starts out as
pub fn empty_document() -> Value {
    Value::Array(Vec::new())
}

/// Whole-document persistence. Handlers only ever go through `load` and
/// `save`; each call reads or rewrites the complete document.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Returns the stored document, or an empty array when it is missing,
    /// unreadable or not valid JSON. Never fails.
    async fn load(&self, document: Document) -> Value;

    /// Replaces the stored document with `value`.
    async fn save(&self, document: Document, value: &Value) -> Result<(), StoreError>;
}

/// Document store backed by `<config-dir>/snippets/<name>.json`
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn new(config_dir: impl AsRef<Path>) -> Self {
        Self {
            root: config_dir.as_ref().join(STORE_DIR_NAME),
        }
    }

    /// `~/.jupyter`, used when no config directory is given
    pub fn default_config_dir() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".jupyter"))
    }

    /// Get the directory holding the documents
    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn document_path(&self, document: Document) -> PathBuf {
        self.root.join(document.file_name())
    }

    async fn ensure_root(&self) -> Result<(), StoreError> {
        fs::create_dir_all(&self.root)
            .await
            .map_err(|source| StoreError::Io {
                path: self.root.clone(),
                source,
            })
    }

    /// Writes an empty document only when no file exists yet. Never replaces
    /// an existing document, so a first read cannot clobber a concurrent save.
    async fn create_if_missing(&self, document: Document) -> Result<bool, StoreError> {
        self.ensure_root().await?;

        let path = self.document_path(document);
        let mut file = match fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
        {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => return Ok(false),
            Err(source) => return Err(StoreError::Io { path, source }),
        };

        let content = empty_document().to_string();
        let written = async {
            file.write_all(content.as_bytes()).await?;
            file.flush().await
        };
        written
            .await
            .map_err(|source| StoreError::Io { path, source })?;
        Ok(true)
    }

    async fn write_atomically(&self, path: &Path, temp_path: &Path, content: &str) -> io::Result<()> {
        let mut file = fs::File::create(temp_path).await?;
        file.write_all(content.as_bytes()).await?;
        file.sync_all().await?;
        drop(file);

        fs::rename(temp_path, path).await
    }
}

#[async_trait]
impl DocumentStore for FileStore {
    async fn load(&self, document: Document) -> Value {
        let path = self.document_path(document);

        let content = match fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                match self.create_if_missing(document).await {
                    Ok(true) => debug!(%document, path = %path.display(), "created empty document"),
                    Ok(false) => {}
                    Err(e) => warn!(%document, error = %e, "could not create empty document"),
                }
                return empty_document();
            }
            Err(e) => {
                error!(%document, path = %path.display(), error = %e, "could not read document, treating it as empty");
                return empty_document();
            }
        };

        if content.trim().is_empty() {
            // Freshly created by a concurrent first load
            return empty_document();
        }

        match serde_json::from_str(&content) {
            Ok(value) => value,
            Err(e) => {
                warn!(%document, path = %path.display(), error = %e, "document is not valid JSON, treating it as empty");
                empty_document()
            }
        }
    }

    async fn save(&self, document: Document, value: &Value) -> Result<(), StoreError> {
        self.ensure_root().await?;

        let content = serde_json::to_string_pretty(value)
            .map_err(|source| StoreError::Serialize { document, source })?;

        let path = self.document_path(document);
        // Unique per call so concurrent saves never share a temp file
        let temp_path = self
            .root
            .join(format!("{}.tmp.{}", document.file_name(), Uuid::new_v4().simple()));

        if let Err(source) = self.write_atomically(&path, &temp_path, &content).await {
            let _ = fs::remove_file(&temp_path).await;
            error!(%document, path = %path.display(), error = %source, "could not save document");
            return Err(StoreError::Io { path, source });
        }

        debug!(%document, bytes = content.len(), "document saved");
        Ok(())
    }
}
