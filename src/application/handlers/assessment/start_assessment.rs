//! StartAssessmentHandler - resumes a finished assessment or starts a new one.

use serde_json::Value as JsonValue;
use std::sync::Arc;
use tracing::{info, warn};

use crate::domain::sequence::{
    PersistedProfile, PhaseOutcome, ProfileKeys, SequenceError, SequencePhaseMachine,
};
use crate::domain::vector::{catalog, VectorKind};
use crate::ports::{EventPublisher, RandomSource, SessionStore, SessionStoreError};

/// Command to begin an assessment.
#[derive(Debug, Clone)]
pub struct StartAssessmentCommand {
    /// Vectors whose built-in modules are registered on a fresh start.
    pub vectors: Vec<VectorKind>,
}

impl Default for StartAssessmentCommand {
    fn default() -> Self {
        Self {
            vectors: VectorKind::all().to_vec(),
        }
    }
}

/// Result of starting an assessment.
#[derive(Debug)]
pub enum StartAssessmentResult {
    /// A complete profile was already stored; no phases run.
    Resumed(PersistedProfile),
    /// A new session was started.
    Started {
        machine: SequencePhaseMachine,
        outcome: PhaseOutcome,
    },
}

/// Handler for starting or resuming assessments.
pub struct StartAssessmentHandler {
    store: Arc<dyn SessionStore>,
    publisher: Arc<dyn EventPublisher>,
    random: Arc<dyn RandomSource>,
    keys: ProfileKeys,
}

impl StartAssessmentHandler {
    pub fn new(
        store: Arc<dyn SessionStore>,
        publisher: Arc<dyn EventPublisher>,
        random: Arc<dyn RandomSource>,
        keys: ProfileKeys,
    ) -> Self {
        Self {
            store,
            publisher,
            random,
            keys,
        }
    }

    pub async fn handle(
        &self,
        cmd: StartAssessmentCommand,
    ) -> Result<StartAssessmentResult, SequenceError> {
        // 1. Resume when a complete record exists
        match self.load_profile().await {
            Ok(Some(profile)) => {
                info!(
                    primary_trauma = %profile.primary_trauma,
                    coherence_baseline = profile.coherence_baseline,
                    "Resuming finalized assessment"
                );
                return Ok(StartAssessmentResult::Resumed(profile));
            }
            Ok(None) => {}
            Err(SessionStoreError::MalformedPersistedState { key, reason }) => {
                warn!(%key, %reason, "Discarding malformed persisted assessment");
                self.discard().await?;
            }
            Err(e) => return Err(e.into()),
        }

        // 2. Fresh session with the requested modules
        let mut machine = SequencePhaseMachine::new(
            self.store.clone(),
            self.publisher.clone(),
            self.random.clone(),
        )
        .with_keys(self.keys.clone());
        for kind in &cmd.vectors {
            machine.register_module(catalog::module_for(*kind)?);
        }

        info!(
            session_id = %machine.session().id(),
            modules = cmd.vectors.len(),
            "Starting assessment"
        );
        let outcome = machine.start().await?;

        Ok(StartAssessmentResult::Started { machine, outcome })
    }

    /// Reads the stored profile.
    ///
    /// Returns `Ok(None)` unless the `initiated` flag is `true`; values
    /// written without the flag belong to an interrupted finalization.
    pub async fn load_profile(&self) -> Result<Option<PersistedProfile>, SessionStoreError> {
        match self.store.get(&self.keys.initiated).await? {
            None | Some(JsonValue::Bool(false)) => Ok(None),
            Some(JsonValue::Bool(true)) => {
                let primary = self.store.get(&self.keys.primary_trauma).await?;
                let affinities = self.store.get(&self.keys.trauma_affinities).await?;
                let baseline = self.store.get(&self.keys.coherence_baseline).await?;
                PersistedProfile::from_stored(&self.keys, primary, affinities, baseline).map(Some)
            }
            Some(other) => Err(SessionStoreError::malformed(
                &self.keys.initiated,
                format!("expected a boolean, found {}", other),
            )),
        }
    }

    /// Removes every persisted key.
    pub async fn discard(&self) -> Result<(), SessionStoreError> {
        for key in self.keys.all() {
            self.store.remove(key).await?;
        }
        Ok(())
    }
}
