//! VectorResponseHandler - feeds `vector:response` events into the phase machine.
//!
//! Subscribes to `vector:response`. Each event carries a batch of responses
//! for one vector; once every item of the active module is answered (or the
//! batch is marked complete) the vector is completed and the sequence moves on.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

use crate::domain::foundation::{DomainError, ErrorCode, EventEnvelope};
use crate::domain::sequence::{SequencePhaseMachine, VectorResponseBatch};
use crate::ports::EventHandler;

pub struct VectorResponseHandler {
    machine: Arc<Mutex<SequencePhaseMachine>>,
}

impl VectorResponseHandler {
    pub fn new(machine: Arc<Mutex<SequencePhaseMachine>>) -> Self {
        Self { machine }
    }
}

#[async_trait]
impl EventHandler for VectorResponseHandler {
    async fn handle(&self, event: EventEnvelope) -> Result<(), DomainError> {
        let batch: VectorResponseBatch = event.payload_as().map_err(|e| {
            DomainError::new(
                ErrorCode::InvalidFormat,
                format!("Malformed vector:response payload: {}", e),
            )
        })?;

        let mut machine = self.machine.lock().await;

        if machine.is_finalized() || machine.active_vector() != Some(batch.vector) {
            debug!(
                event_id = %event.event_id,
                vector = %batch.vector,
                phase = %machine.phase(),
                "Ignoring responses for inactive vector"
            );
            return Ok(());
        }

        let received = batch.responses.len();
        machine.collect_batch(batch.vector, batch.responses)?;

        let answered_all = machine
            .module(batch.vector)
            .map(|m| m.is_complete())
            .unwrap_or(false);

        debug!(
            event_id = %event.event_id,
            correlation_id = ?event.metadata.correlation_id,
            vector = %batch.vector,
            received,
            answered_all,
            "Collected vector responses"
        );

        if answered_all || batch.complete {
            machine.notify_vector_complete(batch.vector).await?;
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "VectorResponseHandler"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{InMemoryEventBus, InMemorySessionStore, SequenceRandomSource};
    use crate::domain::sequence::{SequencePhase, VECTOR_RESPONSE};
    use crate::domain::vector::{
        AssessmentItem, ItemOption, TraumaWeight, VectorKind, VectorModule, VectorResponse,
    };
    use crate::domain::foundation::TraumaType;
    use crate::ports::{EventPublisher, EventSubscriber};
    use serde_json::json;

    fn module(kind: VectorKind, items: &[&str]) -> VectorModule {
        VectorModule::new(
            kind,
            items
                .iter()
                .map(|id| {
                    AssessmentItem::new(
                        *id,
                        vec![
                            ItemOption::single("frag", TraumaType::Fragmentation),
                            ItemOption::neutral("pass"),
                        ],
                    )
                })
                .collect(),
        )
        .unwrap()
    }

    async fn setup(modules: Vec<VectorModule>) -> (Arc<InMemoryEventBus>, Arc<Mutex<SequencePhaseMachine>>) {
        let bus = Arc::new(InMemoryEventBus::new());
        let mut machine = SequencePhaseMachine::new(
            Arc::new(InMemorySessionStore::new()),
            bus.clone(),
            Arc::new(SequenceRandomSource::constant(0.05)),
        );
        for m in modules {
            machine.register_module(m);
        }
        machine.start().await.unwrap();
        let machine = Arc::new(Mutex::new(machine));
        bus.subscribe(VECTOR_RESPONSE, Arc::new(VectorResponseHandler::new(machine.clone())));
        (bus, machine)
    }

    fn response_event(payload: serde_json::Value) -> EventEnvelope {
        EventEnvelope::new(VECTOR_RESPONSE, "host", "Host", payload)
    }

    fn frag(item: &str) -> VectorResponse {
        VectorResponse::new(item, "frag", vec![TraumaWeight::full(TraumaType::Fragmentation)])
    }

    #[tokio::test]
    async fn complete_batch_advances_phase() {
        let (bus, machine) = setup(vec![
            module(VectorKind::Visual, &["v1", "v2"]),
            module(VectorKind::Narrative, &["n1"]),
        ])
        .await;

        bus.publish(response_event(json!({
            "vector": "visual",
            "responses": [frag("v1"), frag("v2")]
        })))
        .await
        .unwrap();

        assert_eq!(machine.lock().await.phase(), SequencePhase::Resonance);
        assert_eq!(bus.events_of_type("vector:processed").len(), 1);
    }

    #[tokio::test]
    async fn partial_batches_accumulate() {
        let (bus, machine) = setup(vec![
            module(VectorKind::Visual, &["v1", "v2"]),
            module(VectorKind::Narrative, &["n1"]),
        ])
        .await;

        bus.publish(response_event(json!({"vector": "visual", "responses": [frag("v1")]})))
            .await
            .unwrap();
        assert_eq!(machine.lock().await.phase(), SequencePhase::Recognition);

        bus.publish(response_event(json!({"vector": "visual", "responses": [frag("v2")]})))
            .await
            .unwrap();
        assert_eq!(machine.lock().await.phase(), SequencePhase::Resonance);
    }

    #[tokio::test]
    async fn responses_for_inactive_vector_are_ignored() {
        let (bus, machine) = setup(vec![
            module(VectorKind::Visual, &["v1"]),
            module(VectorKind::Temporal, &["t1"]),
        ])
        .await;

        bus.publish(response_event(json!({"vector": "temporal", "responses": [frag("t1")]})))
            .await
            .unwrap();

        let machine = machine.lock().await;
        assert_eq!(machine.phase(), SequencePhase::Recognition);
        assert!(machine.module(VectorKind::Temporal).unwrap().responses().is_empty());
    }

    #[tokio::test]
    async fn empty_complete_batch_finishes_vector_with_no_responses() {
        let (bus, machine) = setup(vec![module(VectorKind::Visual, &["v1"])]).await;

        bus.publish(response_event(json!({"vector": "visual", "complete": true})))
            .await
            .unwrap();

        let machine = machine.lock().await;
        assert!(machine.is_finalized());
        assert!(bus.has_event("assessment:finalized"));
        assert!(bus.has_event("coherence:finalized"));
    }

    #[tokio::test]
    async fn malformed_payload_is_reported() {
        let (bus, _machine) = setup(vec![module(VectorKind::Visual, &["v1"])]).await;

        let err = bus
            .publish(response_event(json!({"vector": "smell"})))
            .await
            .unwrap_err();

        assert!(err.message.contains("VectorResponseHandler"));
    }

    #[tokio::test]
    async fn unknown_item_is_reported() {
        let (bus, machine) = setup(vec![module(VectorKind::Visual, &["v1"])]).await;

        let result = bus
            .publish(response_event(json!({
                "vector": "visual",
                "responses": [{"itemId": "nope", "optionId": "frag"}]
            })))
            .await;

        assert!(result.is_err());
        assert_eq!(machine.lock().await.phase(), SequencePhase::Recognition);
    }
}
