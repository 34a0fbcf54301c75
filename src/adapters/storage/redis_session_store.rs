//! Redis-backed session store for shared deployments.
//!
//! Each key maps to a Redis string holding JSON text.

use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::AsyncCommands;
use serde_json::Value as JsonValue;

use super::in_memory_session_store::{decode, encode};
use crate::config::RedisConfig;
use crate::ports::{SessionStore, SessionStoreError};

#[derive(Clone)]
pub struct RedisSessionStore {
    conn: MultiplexedConnection,
}

impl RedisSessionStore {
    pub fn new(conn: MultiplexedConnection) -> Self {
        Self { conn }
    }

    /// Opens a multiplexed connection, bounded by the configured timeout.
    pub async fn connect(config: &RedisConfig) -> Result<Self, SessionStoreError> {
        let client = redis::Client::open(config.url.as_str()).map_err(backend)?;
        let conn = tokio::time::timeout(config.timeout(), client.get_multiplexed_tokio_connection())
            .await
            .map_err(|_| {
                SessionStoreError::Backend(format!(
                    "connection timed out after {}s",
                    config.timeout_secs
                ))
            })?
            .map_err(backend)?;
        Ok(Self::new(conn))
    }
}

fn backend(e: redis::RedisError) -> SessionStoreError {
    SessionStoreError::Backend(e.to_string())
}

#[async_trait]
impl SessionStore for RedisSessionStore {
    async fn get(&self, key: &str) -> Result<Option<JsonValue>, SessionStoreError> {
        let mut conn = self.conn.clone();
        let raw: Option<String> = conn.get(key).await.map_err(backend)?;
        raw.map(|raw| decode(key, &raw)).transpose()
    }

    async fn set(&self, key: &str, value: JsonValue) -> Result<(), SessionStoreError> {
        let raw = encode(&value)?;
        let mut conn = self.conn.clone();
        conn.set::<_, _, ()>(key, raw).await.map_err(backend)
    }

    async fn remove(&self, key: &str) -> Result<(), SessionStoreError> {
        let mut conn = self.conn.clone();
        conn.del::<_, ()>(key).await.map_err(backend)
    }
}
