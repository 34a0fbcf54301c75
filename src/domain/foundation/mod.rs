//! Foundation module - Shared domain primitives.
//!
//! Contains value objects, identifiers, enums, event plumbing and error
//! types that form the vocabulary of the classification engine.

mod errors;
mod events;
mod ids;
mod state_machine;
mod timestamp;
mod trauma_type;

pub use errors::{DomainError, ErrorCode, ValidationError};
pub use events::{
    DomainEvent, EventEnvelope, EventId, EventMetadata, SerializableDomainEvent,
};
pub use ids::SessionId;
pub use state_machine::StateMachine;
pub use timestamp::Timestamp;
pub use trauma_type::{TraumaType, TRAUMA_TYPE_COUNT};
