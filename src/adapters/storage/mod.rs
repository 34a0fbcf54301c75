//! Storage Adapters
//!
//! Implementations of the SessionStore port.
//!
//! - **InMemorySessionStore** - Process-local (testing/development)
//! - **FileSessionStore** - One JSON document on disk
//! - **RedisSessionStore** - Redis strings, shared across processes
//!
//! ```ignore
//! let store: Arc<dyn SessionStore> = match config.storage.backend {
//!     StorageBackend::File => Arc::new(FileSessionStore::new(&config.storage.file_path)),
//!     _ => Arc::new(InMemorySessionStore::new()),
//! };
//! ```

mod file_session_store;
mod in_memory_session_store;
mod redis_session_store;

pub use file_session_store::FileSessionStore;
pub use in_memory_session_store::InMemorySessionStore;
pub use redis_session_store::RedisSessionStore;
