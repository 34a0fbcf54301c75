//! SessionStore port - Key/value persistence for finished assessments.
//!
//! Values are JSON documents so any backend able to hold a string can
//! serve as a store. Only finalized profiles are written through this port.

use async_trait::async_trait;
use serde_json::Value as JsonValue;

use crate::domain::foundation::{DomainError, ErrorCode};

/// Errors that can occur during session store operations
#[derive(Debug, thiserror::Error)]
pub enum SessionStoreError {
    #[error("Malformed persisted state at '{key}': {reason}")]
    MalformedPersistedState { key: String, reason: String },

    #[error("Failed to serialize value: {0}")]
    Serialization(String),

    #[error("IO error: {0}")]
    Io(String),

    #[error("Store backend error: {0}")]
    Backend(String),
}

impl SessionStoreError {
    pub fn malformed(key: impl Into<String>, reason: impl Into<String>) -> Self {
        SessionStoreError::MalformedPersistedState {
            key: key.into(),
            reason: reason.into(),
        }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            SessionStoreError::MalformedPersistedState { .. } => ErrorCode::MalformedPersistedState,
            _ => ErrorCode::StorageError,
        }
    }
}

impl From<SessionStoreError> for DomainError {
    fn from(err: SessionStoreError) -> Self {
        DomainError::new(err.code(), err.to_string())
    }
}

/// Port for reading and writing persisted session values
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Read a value.
    ///
    /// Returns `Ok(None)` when the key is absent. A stored value that is not
    /// valid JSON is reported as `MalformedPersistedState`.
    async fn get(&self, key: &str) -> Result<Option<JsonValue>, SessionStoreError>;

    /// Write a value, replacing any previous one.
    async fn set(&self, key: &str, value: JsonValue) -> Result<(), SessionStoreError>;

    /// Remove a value. Removing an absent key is not an error.
    async fn remove(&self, key: &str) -> Result<(), SessionStoreError>;
}
