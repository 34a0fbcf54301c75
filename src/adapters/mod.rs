//! Adapters - Implementations of port interfaces.
//!
//! - `events` - In-process event bus
//! - `storage` - Session stores (in-memory, file, Redis)
//! - `random` - Random sources (thread, seeded, scripted)

pub mod events;
pub mod random;
pub mod storage;

pub use events::InMemoryEventBus;
pub use random::{SeededRandomSource, SequenceRandomSource, ThreadRandomSource};
pub use storage::{FileSessionStore, InMemorySessionStore, RedisSessionStore};
