//! Response scripts - canned answers replayed as `vector:response` events.
//!
//! ```yaml
//! steps:
//!   - vector: visual
//!     answers:
//!       - { item: visual.empty_room, option: shattered_mirror }
//!   - vector: narrative
//!     complete: true
//! ```

use serde::Deserialize;
use thiserror::Error;

use crate::domain::foundation::{DomainError, EventEnvelope, EventId};
use crate::domain::sequence::{VectorResponseBatch, VECTOR_RESPONSE};
use crate::domain::vector::{catalog, VectorError, VectorKind, VectorResponse};
use crate::ports::EventPublisher;

#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("Failed to parse script: {0}")]
    Parse(String),

    #[error(transparent)]
    Vector(#[from] VectorError),
}

#[derive(Debug, Clone, Deserialize)]
pub struct AssessmentScript {
    #[serde(default)]
    pub steps: Vec<ScriptStep>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScriptStep {
    pub vector: VectorKind,
    #[serde(default)]
    pub answers: Vec<ScriptAnswer>,
    /// Complete the vector after these answers even if items remain.
    #[serde(default)]
    pub complete: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScriptAnswer {
    pub item: String,
    pub option: String,
}

impl AssessmentScript {
    /// Parses YAML, which also accepts JSON.
    pub fn from_yaml(text: &str) -> Result<Self, ScriptError> {
        serde_yaml::from_str(text).map_err(|e| ScriptError::Parse(e.to_string()))
    }

    /// Resolves every answer against the built-in catalog.
    pub fn batches(&self) -> Result<Vec<VectorResponseBatch>, ScriptError> {
        self.steps.iter().map(ScriptStep::batch).collect()
    }

    /// Publishes each batch on `vector:response`, in order.
    pub async fn play(&self, publisher: &dyn EventPublisher) -> Result<(), DomainError> {
        let run_id = EventId::new().to_string();
        let batches = self
            .batches()
            .map_err(|e| DomainError::validation("script", e.to_string()))?;
        for batch in batches {
            let payload = serde_json::to_value(&batch).map_err(|e| {
                DomainError::validation("script", format!("unserializable batch: {}", e))
            })?;
            let envelope =
                EventEnvelope::new(VECTOR_RESPONSE, "script", "AssessmentScript", payload)
                    .with_correlation_id(run_id.clone());
            publisher.publish(envelope).await?;
        }
        Ok(())
    }
}

impl ScriptStep {
    fn batch(&self) -> Result<VectorResponseBatch, ScriptError> {
        let module = catalog::module_for(self.vector)?;
        let responses = self
            .answers
            .iter()
            .map(|answer| {
                let item = module
                    .items()
                    .iter()
                    .find(|i| i.id == answer.item)
                    .ok_or_else(|| VectorError::UnknownItem {
                        vector: self.vector,
                        item_id: answer.item.clone(),
                    })?;
                let option = item.option(&answer.option).ok_or_else(|| {
                    VectorError::UnknownOption {
                        vector: self.vector,
                        item_id: answer.item.clone(),
                        option_id: answer.option.clone(),
                    }
                })?;
                Ok(VectorResponse::new(
                    &answer.item,
                    &answer.option,
                    option.affinities.clone(),
                ))
            })
            .collect::<Result<Vec<_>, VectorError>>()?;

        Ok(VectorResponseBatch {
            vector: self.vector,
            responses,
            complete: self.complete,
        })
    }
}
