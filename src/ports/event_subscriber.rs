//! EventSubscriber port - Interface for reacting to assessment events.
//!
//! Host code feeds responses in on the `vector:response` topic and listens
//! for `vector:processed`, `assessment:finalized` and `coherence:finalized`.

use async_trait::async_trait;
use std::sync::Arc;

use crate::domain::foundation::{DomainError, EventEnvelope};

/// Handler for processing domain events.
///
/// # Example
///
/// ```ignore
/// struct ProfileRenderer;
///
/// #[async_trait]
/// impl EventHandler for ProfileRenderer {
///     async fn handle(&self, event: EventEnvelope) -> Result<(), DomainError> {
///         let finalized: AssessmentFinalized = event.payload_as()?;
///         // Render the profile...
///         Ok(())
///     }
///
///     fn name(&self) -> &'static str {
///         "ProfileRenderer"
///     }
/// }
/// ```
#[async_trait]
pub trait EventHandler: Send + Sync {
    /// Process an event.
    async fn handle(&self, event: EventEnvelope) -> Result<(), DomainError>;

    /// Handler name for logging.
    fn name(&self) -> &'static str;
}

/// Port for subscribing to domain events.
pub trait EventSubscriber: Send + Sync {
    /// Subscribe handler to a specific event type.
    fn subscribe(&self, event_type: &str, handler: Arc<dyn EventHandler>);
}
