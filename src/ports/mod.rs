//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! ## Event Ports
//!
//! - `EventPublisher` - Port for publishing domain events
//! - `EventSubscriber` - Port for subscribing to domain events
//! - `EventHandler` - Handler that processes incoming events
//!
//! ## Persistence
//!
//! - `SessionStore` - Key/value storage for finalized profiles
//!
//! ## Randomness
//!
//! - `RandomSource` - Uniform floats for coherence jitter

mod event_publisher;
mod event_subscriber;
mod random_source;
mod session_store;

pub use event_publisher::EventPublisher;
pub use event_subscriber::{EventHandler, EventSubscriber};
pub use random_source::RandomSource;
pub use session_store::{SessionStore, SessionStoreError};
