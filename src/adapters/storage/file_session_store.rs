//! File-based Session Store Adapter
//!
//! Keeps every key in one JSON document on disk, each value stored as
//! JSON text. Writes go to a sibling temp file that is renamed into
//! place, so a crash leaves either the old or the new document.

use async_trait::async_trait;
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::sync::Mutex;
use tracing::warn;

use super::in_memory_session_store::{decode, encode};
use crate::ports::{SessionStore, SessionStoreError};

type Document = BTreeMap<String, String>;

/// File-based key/value store
#[derive(Debug)]
pub struct FileSessionStore {
    path: PathBuf,
    // Serializes read-modify-write cycles within this process.
    lock: Mutex<()>,
}

impl FileSessionStore {
    /// Create a store backed by `path`. The file is created on first write.
    ///
    /// # Example
    /// ```ignore
    /// let store = FileSessionStore::new("./data/session.json");
    /// ```
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the document; a missing file is an empty document.
    async fn read_document(&self) -> Result<Document, SessionStoreError> {
        let text = match fs::read_to_string(&self.path).await {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Document::new()),
            Err(e) => return Err(SessionStoreError::Io(e.to_string())),
        };
        serde_json::from_str(&text).map_err(|e| {
            SessionStoreError::malformed(self.path.display().to_string(), e.to_string())
        })
    }

    /// Reads the document for rewriting; an unreadable one is replaced by
    /// an empty document. The flag is true when the file was discarded and
    /// must be rewritten.
    async fn read_for_update(&self) -> Result<(Document, bool), SessionStoreError> {
        match self.read_document().await {
            Ok(document) => Ok((document, false)),
            Err(SessionStoreError::MalformedPersistedState { reason, .. }) => {
                warn!(path = %self.path.display(), %reason, "Discarding unreadable store file");
                Ok((Document::new(), true))
            }
            Err(e) => Err(e),
        }
    }

    async fn write_document(&self, document: &Document) -> Result<(), SessionStoreError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| SessionStoreError::Io(e.to_string()))?;
        }
        let text = serde_json::to_string_pretty(document)
            .map_err(|e| SessionStoreError::Serialization(e.to_string()))?;

        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, text)
            .await
            .map_err(|e| SessionStoreError::Io(e.to_string()))?;
        fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| SessionStoreError::Io(e.to_string()))
    }
}

#[async_trait]
impl SessionStore for FileSessionStore {
    async fn get(&self, key: &str) -> Result<Option<JsonValue>, SessionStoreError> {
        let _guard = self.lock.lock().await;
        let document = self.read_document().await?;
        document.get(key).map(|raw| decode(key, raw)).transpose()
    }

    async fn set(&self, key: &str, value: JsonValue) -> Result<(), SessionStoreError> {
        let raw = encode(&value)?;
        let _guard = self.lock.lock().await;
        let (mut document, _) = self.read_for_update().await?;
        document.insert(key.to_string(), raw);
        self.write_document(&document).await
    }

    async fn remove(&self, key: &str) -> Result<(), SessionStoreError> {
        let _guard = self.lock.lock().await;
        let (mut document, discarded) = self.read_for_update().await?;
        if document.remove(key).is_some() || discarded {
            self.write_document(&document).await?;
        }
        Ok(())
    }
}
