//! In-Memory Session Store Adapter
//!
//! Holds values as raw JSON text, the same way the file and Redis stores
//! do, so corrupt records behave identically across backends.

use async_trait::async_trait;
use serde_json::Value as JsonValue;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::ports::{SessionStore, SessionStoreError};

/// In-memory key/value store
#[derive(Debug, Clone, Default)]
pub struct InMemorySessionStore {
    values: Arc<RwLock<HashMap<String, String>>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores raw text under `key` without validating it.
    pub async fn insert_raw(&self, key: impl Into<String>, raw: impl Into<String>) {
        self.values.write().await.insert(key.into(), raw.into());
    }

    /// The raw text stored under `key`.
    pub async fn raw(&self, key: &str) -> Option<String> {
        self.values.read().await.get(key).cloned()
    }

    pub async fn len(&self) -> usize {
        self.values.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.values.read().await.is_empty()
    }

    pub async fn clear(&self) {
        self.values.write().await.clear();
    }
}

/// Parses stored text, naming the key on failure.
pub(super) fn decode(key: &str, raw: &str) -> Result<JsonValue, SessionStoreError> {
    serde_json::from_str(raw).map_err(|e| SessionStoreError::malformed(key, e.to_string()))
}

pub(super) fn encode(value: &JsonValue) -> Result<String, SessionStoreError> {
    serde_json::to_string(value).map_err(|e| SessionStoreError::Serialization(e.to_string()))
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn get(&self, key: &str) -> Result<Option<JsonValue>, SessionStoreError> {
        let values = self.values.read().await;
        values.get(key).map(|raw| decode(key, raw)).transpose()
    }

    async fn set(&self, key: &str, value: JsonValue) -> Result<(), SessionStoreError> {
        let raw = encode(&value)?;
        self.values.write().await.insert(key.to_string(), raw);
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), SessionStoreError> {
        self.values.write().await.remove(key);
        Ok(())
    }
}
