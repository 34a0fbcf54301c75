//! SequencePhaseMachine - drives one assessment through its four phases.
//!
//! Each phase activates the module for its vector. When that module
//! reports completion the result is folded into aggregation and coherence,
//! a `vector:processed` event is published and the next phase activates.
//! A phase without a registered module completes immediately with a
//! neutral fallback result. After the last phase the profile is persisted
//! and the two finalized events are published exactly once.

use serde_json::Value as JsonValue;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::domain::affinity::AffinityDistribution;
use crate::domain::aggregation::{AggregationEngine, AggregationError};
use crate::domain::coherence::{CoherenceCalibrator, CoherenceDescriptor};
use crate::domain::foundation::{
    EventId, SerializableDomainEvent, Timestamp, TraumaType,
};
use crate::domain::vector::{VectorError, VectorKind, VectorModule, VectorResponse, VectorResult};
use crate::ports::{EventPublisher, RandomSource, SessionStore};

use super::{
    AssessmentFinalized, AssessmentSession, CoherenceFinalized, PersistedProfile, ProfileKeys,
    SequenceError, SequencePhase, VectorProcessed,
};

/// What a phase-driving call led to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PhaseOutcome {
    /// The notification did not concern the active vector.
    Ignored,
    /// The given phase is active and waiting for responses.
    Active(SequencePhase),
    /// Every phase completed and the profile is persisted.
    Finalized(PersistedProfile),
}

pub struct SequencePhaseMachine {
    session: AssessmentSession,
    modules: HashMap<VectorKind, VectorModule>,
    aggregation: AggregationEngine,
    calibrator: CoherenceCalibrator,
    store: Arc<dyn SessionStore>,
    publisher: Arc<dyn EventPublisher>,
    random: Arc<dyn RandomSource>,
    keys: ProfileKeys,
}

impl SequencePhaseMachine {
    /// A fresh session with no modules registered.
    pub fn new(
        store: Arc<dyn SessionStore>,
        publisher: Arc<dyn EventPublisher>,
        random: Arc<dyn RandomSource>,
    ) -> Self {
        Self {
            session: AssessmentSession::new(),
            modules: HashMap::new(),
            aggregation: AggregationEngine::new(),
            calibrator: CoherenceCalibrator::new(),
            store,
            publisher,
            random,
            keys: ProfileKeys::default(),
        }
    }

    /// Resumes from a snapshot taken with [`snapshot`](Self::snapshot).
    ///
    /// Aggregation and coherence are rebuilt by replaying the recorded
    /// results. Modules must be registered again before `start`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidSnapshot` for an inconsistent snapshot.
    pub fn from_session(
        session: AssessmentSession,
        store: Arc<dyn SessionStore>,
        publisher: Arc<dyn EventPublisher>,
        random: Arc<dyn RandomSource>,
    ) -> Result<Self, SequenceError> {
        session.validate()?;
        let aggregation = AggregationEngine::replay(session.results())
            .map_err(|e| SequenceError::InvalidSnapshot(e.to_string()))?;
        let calibrator = CoherenceCalibrator::replay(session.results());

        info!(
            session_id = %session.id(),
            phase = %session.phase(),
            completed = session.results().len(),
            "Resuming assessment session"
        );

        Ok(Self {
            session,
            modules: HashMap::new(),
            aggregation,
            calibrator,
            store,
            publisher,
            random,
            keys: ProfileKeys::default(),
        })
    }

    /// Overrides the storage keys.
    pub fn with_keys(mut self, keys: ProfileKeys) -> Self {
        self.keys = keys;
        self
    }

    /// Registers a module, builder style.
    pub fn with_module(mut self, module: VectorModule) -> Self {
        self.register_module(module);
        self
    }

    /// Registers the built-in catalog for every vector.
    pub fn with_standard_modules(mut self) -> Result<Self, VectorError> {
        for module in crate::domain::vector::catalog::standard_modules()? {
            self.register_module(module);
        }
        Ok(self)
    }

    /// Registers a module, returning the one it replaces.
    pub fn register_module(&mut self, module: VectorModule) -> Option<VectorModule> {
        self.modules.insert(module.kind(), module)
    }

    // ════════════════════════════════════════════════════════════════════
    // Accessors
    // ════════════════════════════════════════════════════════════════════

    pub fn session(&self) -> &AssessmentSession {
        &self.session
    }

    /// A serializable copy of the session state.
    pub fn snapshot(&self) -> AssessmentSession {
        self.session.clone()
    }

    pub fn phase(&self) -> SequencePhase {
        self.session.phase()
    }

    pub fn active_vector(&self) -> Option<VectorKind> {
        self.session.active_vector()
    }

    pub fn module(&self, vector: VectorKind) -> Option<&VectorModule> {
        self.modules.get(&vector)
    }

    pub fn keys(&self) -> &ProfileKeys {
        &self.keys
    }

    pub fn is_finalized(&self) -> bool {
        self.session.is_finalized()
    }

    pub fn profile(&self) -> Option<&PersistedProfile> {
        self.session.profile()
    }

    /// The aggregate distribution over the vectors completed so far.
    pub fn distribution(&self) -> AffinityDistribution {
        self.aggregation.distribution()
    }

    /// The dominant category so far, without a default.
    pub fn primary_type(&self) -> Result<TraumaType, AggregationError> {
        self.aggregation.primary_type()
    }

    /// Coherence over the vectors completed so far, with fresh jitter.
    pub fn coherence(&self) -> CoherenceDescriptor {
        self.calibrator.descriptor(self.random.as_ref())
    }

    // ════════════════════════════════════════════════════════════════════
    // Response collection
    // ════════════════════════════════════════════════════════════════════

    /// Records a response for the active vector.
    pub fn collect(
        &mut self,
        vector: VectorKind,
        response: VectorResponse,
    ) -> Result<(), SequenceError> {
        self.active_module_mut(vector)?.collect(response)?;
        Ok(())
    }

    /// Records a catalog answer for the active vector.
    pub fn answer(
        &mut self,
        vector: VectorKind,
        item_id: &str,
        option_id: &str,
    ) -> Result<(), SequenceError> {
        self.active_module_mut(vector)?.answer(item_id, option_id)?;
        Ok(())
    }

    /// Records a batch of responses for the active vector.
    pub fn collect_batch(
        &mut self,
        vector: VectorKind,
        responses: Vec<VectorResponse>,
    ) -> Result<(), SequenceError> {
        self.active_module_mut(vector)?
            .collect_batch(vector, responses)?;
        Ok(())
    }

    fn active_module_mut(&mut self, vector: VectorKind) -> Result<&mut VectorModule, SequenceError> {
        if self.session.is_finalized() {
            return Err(SequenceError::AlreadyFinalized);
        }
        let expected = self.session.active_vector();
        if expected != Some(vector) {
            return Err(SequenceError::VectorNotActive {
                expected,
                actual: vector,
            });
        }
        self.modules
            .get_mut(&vector)
            .ok_or(SequenceError::MissingModule(vector))
    }

    // ════════════════════════════════════════════════════════════════════
    // Phase driving
    // ════════════════════════════════════════════════════════════════════

    /// Activates the current phase.
    ///
    /// Phases without a module complete with a fallback result; if none
    /// remain the session finalizes. Calling `start` again is harmless.
    pub async fn start(&mut self) -> Result<PhaseOutcome, SequenceError> {
        debug!(session_id = %self.session.id(), phase = %self.phase(), "Starting assessment");
        self.settle().await
    }

    /// Completes the active phase from its module's responses.
    ///
    /// A notification for any other vector is ignored.
    ///
    /// # Errors
    ///
    /// Returns `IncompleteAssessment` when the module has some but not all
    /// items answered; the phase stays active.
    pub async fn notify_vector_complete(
        &mut self,
        vector: VectorKind,
    ) -> Result<PhaseOutcome, SequenceError> {
        if self.session.active_vector() != Some(vector) {
            debug!(
                session_id = %self.session.id(),
                vector = %vector,
                phase = %self.phase(),
                "Ignoring completion for inactive vector"
            );
            return Ok(PhaseOutcome::Ignored);
        }

        let result = self
            .modules
            .get(&vector)
            .ok_or(SequenceError::MissingModule(vector))?
            .finalize()?;

        self.record(result).await?;
        self.settle().await
    }

    /// Completes the active phase with a fallback result.
    pub async fn skip_current_phase(&mut self) -> Result<PhaseOutcome, SequenceError> {
        let vector = self
            .session
            .active_vector()
            .ok_or(SequenceError::AlreadyFinalized)?;
        info!(session_id = %self.session.id(), vector = %vector, "Skipping phase");
        self.record(VectorResult::fallback(vector)).await?;
        self.settle().await
    }

    /// Persists the profile and publishes the finalized events.
    ///
    /// Idempotent: once finalized, returns the stored profile without
    /// writing or publishing again.
    ///
    /// # Errors
    ///
    /// Returns `NotReady` before every phase has completed.
    pub async fn finalize(&mut self) -> Result<PersistedProfile, SequenceError> {
        if let Some(profile) = self.session.profile() {
            debug!(session_id = %self.session.id(), "Assessment already finalized");
            return Ok(*profile);
        }
        if self.phase() != SequencePhase::Finalized {
            return Err(SequenceError::NotReady(self.phase()));
        }

        let coherence = self.calibrator.descriptor(self.random.as_ref());
        let profile = PersistedProfile {
            primary_trauma: self.aggregation.primary_type_or_default(),
            trauma_affinities: self.aggregation.distribution(),
            coherence_baseline: coherence.baseline,
        };

        for (key, value) in profile.entries(&self.keys)? {
            self.store.set(&key, value).await?;
        }
        // Marks the record complete; readers ignore values without it.
        self.store
            .set(&self.keys.initiated, JsonValue::Bool(true))
            .await?;

        self.session.complete(profile, coherence);

        info!(
            session_id = %self.session.id(),
            primary_trauma = %profile.primary_trauma,
            coherence_baseline = profile.coherence_baseline,
            weight_sum = self.aggregation.weight_sum(),
            "Assessment finalized"
        );

        let session_id = self.session.id();
        let timestamp = Timestamp::now();
        let events = vec![
            AssessmentFinalized {
                event_id: EventId::new(),
                session_id,
                trauma_affinities: profile.trauma_affinities,
                primary_trauma: profile.primary_trauma,
                timestamp,
            }
            .to_envelope()
            .map_err(SequenceError::Publish)?,
            CoherenceFinalized {
                event_id: EventId::new(),
                session_id,
                coherence_baseline: coherence.baseline,
                response_patterns: coherence.patterns(),
                timestamp,
            }
            .to_envelope()
            .map_err(SequenceError::Publish)?,
        ];
        self.publisher
            .publish_all(events)
            .await
            .map_err(SequenceError::Publish)?;

        Ok(profile)
    }

    /// Folds a result into aggregation and coherence, then advances.
    ///
    /// The new state is staged and only committed once `vector:processed`
    /// has been published; a failed publish leaves the phase active so the
    /// same completion can be retried.
    async fn record(&mut self, result: VectorResult) -> Result<(), SequenceError> {
        let expected = self.session.active_vector();
        if expected != Some(result.vector()) {
            return Err(SequenceError::VectorNotActive {
                expected,
                actual: result.vector(),
            });
        }

        let mut aggregation = self.aggregation.clone();
        aggregation.accept(&result)?;
        let mut calibrator = self.calibrator.clone();
        calibrator.observe(&result);
        let mut session = self.session.clone();
        let next = session.record(result.clone(), aggregation.distribution())?;

        let event = VectorProcessed {
            event_id: EventId::new(),
            session_id: session.id(),
            vector: result.vector(),
            weight: result.weight(),
            processed: *result.distribution(),
            timestamp: Timestamp::now(),
        };
        let envelope = event.to_envelope().map_err(SequenceError::Publish)?;
        self.publisher
            .publish(envelope)
            .await
            .map_err(SequenceError::Publish)?;

        self.aggregation = aggregation;
        self.calibrator = calibrator;
        self.session = session;

        info!(
            session_id = %self.session.id(),
            vector = %result.vector(),
            weight = result.weight(),
            fallback = result.is_fallback(),
            responses = result.raw_responses().len(),
            next_phase = %next,
            "Vector processed"
        );
        Ok(())
    }

    /// Advances past phases without modules until one can take input.
    async fn settle(&mut self) -> Result<PhaseOutcome, SequenceError> {
        loop {
            match self.session.active_vector() {
                None => return self.finalize().await.map(PhaseOutcome::Finalized),
                Some(vector) if self.modules.contains_key(&vector) => {
                    debug!(
                        session_id = %self.session.id(),
                        phase = %self.phase(),
                        vector = %vector,
                        "Phase activated"
                    );
                    return Ok(PhaseOutcome::Active(self.phase()));
                }
                Some(vector) => {
                    let err = SequenceError::MissingModule(vector);
                    warn!(
                        session_id = %self.session.id(),
                        phase = %self.phase(),
                        "{}; completing phase with a neutral result",
                        err
                    );
                    self.record(VectorResult::fallback(vector)).await?;
                }
            }
        }
    }
}

impl std::fmt::Debug for SequencePhaseMachine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SequencePhaseMachine")
            .field("session", &self.session)
            .field("modules", &self.modules.keys().collect::<Vec<_>>())
            .field("keys", &self.keys)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{DomainError, ErrorCode, EventEnvelope};
    use crate::domain::vector::{AssessmentItem, ItemOption};
    use crate::ports::SessionStoreError;
    use async_trait::async_trait;
    use std::sync::Mutex;

    // ─────────────────────────────────────────────────────────────────────
    // Mock implementations
    // ─────────────────────────────────────────────────────────────────────

    #[derive(Default)]
    struct MockStore {
        values: Mutex<HashMap<String, JsonValue>>,
        writes: Mutex<Vec<String>>,
    }

    impl MockStore {
        fn writes(&self) -> Vec<String> {
            self.writes.lock().unwrap().clone()
        }

        fn value(&self, key: &str) -> Option<JsonValue> {
            self.values.lock().unwrap().get(key).cloned()
        }
    }

    #[async_trait]
    impl SessionStore for MockStore {
        async fn get(&self, key: &str) -> Result<Option<JsonValue>, SessionStoreError> {
            Ok(self.value(key))
        }

        async fn set(&self, key: &str, value: JsonValue) -> Result<(), SessionStoreError> {
            self.writes.lock().unwrap().push(key.to_string());
            self.values.lock().unwrap().insert(key.to_string(), value);
            Ok(())
        }

        async fn remove(&self, key: &str) -> Result<(), SessionStoreError> {
            self.values.lock().unwrap().remove(key);
            Ok(())
        }
    }

    #[derive(Default)]
    struct MockPublisher {
        events: Mutex<Vec<EventEnvelope>>,
        fail: bool,
        failures_left: Mutex<usize>,
    }

    impl MockPublisher {
        fn failing() -> Self {
            Self {
                fail: true,
                ..Self::default()
            }
        }

        /// Fails the first `count` publishes, then delivers.
        fn failing_first(count: usize) -> Self {
            Self {
                failures_left: Mutex::new(count),
                ..Self::default()
            }
        }

        fn types(&self) -> Vec<String> {
            self.events
                .lock()
                .unwrap()
                .iter()
                .map(|e| e.event_type.clone())
                .collect()
        }

        fn of_type(&self, event_type: &str) -> Vec<EventEnvelope> {
            self.events
                .lock()
                .unwrap()
                .iter()
                .filter(|e| e.event_type == event_type)
                .cloned()
                .collect()
        }
    }

    #[async_trait]
    impl EventPublisher for MockPublisher {
        async fn publish(&self, event: EventEnvelope) -> Result<(), DomainError> {
            if self.fail {
                return Err(DomainError::new(ErrorCode::PublishFailed, "bus down"));
            }
            {
                let mut left = self.failures_left.lock().unwrap();
                if *left > 0 {
                    *left -= 1;
                    return Err(DomainError::new(ErrorCode::PublishFailed, "bus hiccup"));
                }
            }
            self.events.lock().unwrap().push(event);
            Ok(())
        }

        async fn publish_all(&self, events: Vec<EventEnvelope>) -> Result<(), DomainError> {
            for event in events {
                self.publish(event).await?;
            }
            Ok(())
        }
    }

    struct FixedRandom(f64);

    impl RandomSource for FixedRandom {
        fn next_float(&self, _min: f64, _max: f64) -> f64 {
            self.0
        }
    }

    // ─────────────────────────────────────────────────────────────────────
    // Helpers
    // ─────────────────────────────────────────────────────────────────────

    struct Harness {
        store: Arc<MockStore>,
        publisher: Arc<MockPublisher>,
    }

    impl Harness {
        fn new() -> Self {
            Self {
                store: Arc::new(MockStore::default()),
                publisher: Arc::new(MockPublisher::default()),
            }
        }

        fn machine(&self) -> SequencePhaseMachine {
            SequencePhaseMachine::new(
                self.store.clone(),
                self.publisher.clone(),
                Arc::new(FixedRandom(0.05)),
            )
            .with_keys(ProfileKeys::with_prefix("test"))
        }
    }

    /// One item, one option per trauma type plus a neutral option.
    fn single_item_module(kind: VectorKind) -> VectorModule {
        let mut options: Vec<ItemOption> = TraumaType::all()
            .iter()
            .map(|t| ItemOption::single(t.as_str(), *t))
            .collect();
        options.push(ItemOption::neutral("none"));
        VectorModule::new(
            kind,
            vec![AssessmentItem {
                id: "only".to_string(),
                options,
            }],
        )
        .unwrap()
    }

    fn two_item_module(kind: VectorKind) -> VectorModule {
        let item = |id: &str| AssessmentItem {
            id: id.to_string(),
            options: vec![ItemOption::single("a", TraumaType::Abandonment)],
        };
        VectorModule::new(kind, vec![item("first"), item("second")]).unwrap()
    }

    async fn complete_with(
        machine: &mut SequencePhaseMachine,
        vector: VectorKind,
        trauma: TraumaType,
    ) -> PhaseOutcome {
        machine.answer(vector, "only", trauma.as_str()).unwrap();
        machine.notify_vector_complete(vector).await.unwrap()
    }

    // ─────────────────────────────────────────────────────────────────────
    // Tests
    // ─────────────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn start_activates_first_phase_with_module() {
        let harness = Harness::new();
        let mut machine = harness.machine().with_module(single_item_module(VectorKind::Visual));

        let outcome = machine.start().await.unwrap();

        assert_eq!(outcome, PhaseOutcome::Active(SequencePhase::Recognition));
        assert_eq!(machine.active_vector(), Some(VectorKind::Visual));
        assert!(harness.publisher.types().is_empty());
    }

    #[tokio::test]
    async fn full_run_persists_profile_and_publishes_events_in_order() {
        let harness = Harness::new();
        let mut machine = harness.machine();
        for kind in VectorKind::all() {
            machine.register_module(single_item_module(*kind));
        }
        machine.start().await.unwrap();

        complete_with(&mut machine, VectorKind::Visual, TraumaType::Fragmentation).await;
        complete_with(&mut machine, VectorKind::Narrative, TraumaType::Fragmentation).await;
        complete_with(&mut machine, VectorKind::Interactive, TraumaType::Recursion).await;
        let outcome =
            complete_with(&mut machine, VectorKind::Temporal, TraumaType::Recursion).await;

        let PhaseOutcome::Finalized(profile) = outcome else {
            panic!("expected finalization, got {:?}", outcome);
        };
        assert_eq!(profile.primary_trauma, TraumaType::Fragmentation);
        assert!((profile.trauma_affinities.get(TraumaType::Fragmentation) - 0.6).abs() < 1e-9);
        assert!((profile.trauma_affinities.get(TraumaType::Recursion) - 0.4).abs() < 1e-9);
        assert!((0.35..=0.85).contains(&profile.coherence_baseline));

        assert_eq!(
            harness.publisher.types(),
            vec![
                "vector:processed",
                "vector:processed",
                "vector:processed",
                "vector:processed",
                "assessment:finalized",
                "coherence:finalized",
            ]
        );
        assert_eq!(
            harness.store.value("test:primary_trauma"),
            Some(serde_json::json!("fragmentation"))
        );
        assert!(machine.is_finalized());
        assert_eq!(machine.phase(), SequencePhase::Finalized);
    }

    #[tokio::test]
    async fn initiated_flag_is_written_last() {
        let harness = Harness::new();
        let mut machine = harness.machine();
        machine.start().await.unwrap();

        let writes = harness.store.writes();
        assert_eq!(writes.len(), 4);
        assert_eq!(writes.last().map(String::as_str), Some("test:initiated"));
        assert_eq!(
            harness.store.value("test:initiated"),
            Some(JsonValue::Bool(true))
        );
    }

    #[tokio::test]
    async fn missing_modules_fall_back_and_only_collected_weight_counts() {
        let harness = Harness::new();
        let mut machine = harness
            .machine()
            .with_module(single_item_module(VectorKind::Visual))
            .with_module(single_item_module(VectorKind::Interactive));
        machine.start().await.unwrap();

        // Narrative is missing, so completing Visual jumps to Interactive.
        let outcome =
            complete_with(&mut machine, VectorKind::Visual, TraumaType::Fragmentation).await;
        assert_eq!(outcome, PhaseOutcome::Active(SequencePhase::Recursion));
        assert!(machine.session().result(VectorKind::Narrative).unwrap().is_fallback());

        let outcome =
            complete_with(&mut machine, VectorKind::Interactive, TraumaType::Recursion).await;
        let PhaseOutcome::Finalized(profile) = outcome else {
            panic!("expected finalization");
        };

        // 0.4 / 0.7 and 0.3 / 0.7
        let affinities = profile.trauma_affinities;
        assert!((affinities.get(TraumaType::Fragmentation) - 0.4 / 0.7).abs() < 1e-9);
        assert!((affinities.get(TraumaType::Recursion) - 0.3 / 0.7).abs() < 1e-9);
        assert_eq!(profile.primary_trauma, TraumaType::Fragmentation);
        assert_eq!(harness.publisher.of_type("vector:processed").len(), 4);
    }

    #[tokio::test]
    async fn no_modules_finalizes_with_default_category() {
        let harness = Harness::new();
        let mut machine = harness.machine();

        let outcome = machine.start().await.unwrap();

        let PhaseOutcome::Finalized(profile) = outcome else {
            panic!("expected finalization");
        };
        assert_eq!(profile.primary_trauma, TraumaType::Abandonment);
        assert!(profile.trauma_affinities.is_zero());
        assert_eq!(harness.publisher.of_type("assessment:finalized").len(), 1);
    }

    #[tokio::test]
    async fn zero_response_vectors_count_toward_divisor() {
        let harness = Harness::new();
        let mut machine = harness
            .machine()
            .with_module(single_item_module(VectorKind::Visual))
            .with_module(single_item_module(VectorKind::Narrative));
        machine.start().await.unwrap();

        complete_with(&mut machine, VectorKind::Visual, TraumaType::Surveillance).await;
        let outcome = machine
            .notify_vector_complete(VectorKind::Narrative)
            .await
            .unwrap();

        let PhaseOutcome::Finalized(profile) = outcome else {
            panic!("expected finalization");
        };
        // 0.4 / (0.4 + 0.2); the diluted total stays below one.
        let surveillance = profile.trauma_affinities.get(TraumaType::Surveillance);
        assert!((surveillance - 0.4 / 0.6).abs() < 1e-9);
        assert!(profile.trauma_affinities.total() < 1.0);
    }

    #[tokio::test]
    async fn completion_for_inactive_vector_is_ignored() {
        let harness = Harness::new();
        let mut machine = harness
            .machine()
            .with_module(single_item_module(VectorKind::Visual))
            .with_module(single_item_module(VectorKind::Temporal));
        machine.start().await.unwrap();

        let outcome = machine
            .notify_vector_complete(VectorKind::Temporal)
            .await
            .unwrap();

        assert_eq!(outcome, PhaseOutcome::Ignored);
        assert_eq!(machine.phase(), SequencePhase::Recognition);
        assert!(harness.publisher.types().is_empty());
    }

    #[tokio::test]
    async fn responses_for_inactive_vector_are_rejected() {
        let harness = Harness::new();
        let mut machine = harness
            .machine()
            .with_module(single_item_module(VectorKind::Visual))
            .with_module(single_item_module(VectorKind::Narrative));
        machine.start().await.unwrap();

        let err = machine
            .answer(VectorKind::Narrative, "only", "recursion")
            .unwrap_err();

        assert!(matches!(
            err,
            SequenceError::VectorNotActive {
                expected: Some(VectorKind::Visual),
                actual: VectorKind::Narrative
            }
        ));
        assert!(machine.module(VectorKind::Narrative).unwrap().responses().is_empty());
    }

    #[tokio::test]
    async fn incomplete_vector_keeps_phase_active() {
        let harness = Harness::new();
        let mut machine = harness.machine().with_module(two_item_module(VectorKind::Visual));
        machine.start().await.unwrap();
        machine.answer(VectorKind::Visual, "first", "a").unwrap();

        let err = machine
            .notify_vector_complete(VectorKind::Visual)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            SequenceError::Vector(VectorError::IncompleteAssessment { .. })
        ));
        assert_eq!(machine.phase(), SequencePhase::Recognition);

        machine.answer(VectorKind::Visual, "second", "a").unwrap();
        let outcome = machine
            .notify_vector_complete(VectorKind::Visual)
            .await
            .unwrap();
        assert!(matches!(outcome, PhaseOutcome::Finalized(_)));
    }

    #[tokio::test]
    async fn finalize_is_idempotent() {
        let harness = Harness::new();
        let mut machine = harness.machine();
        let first = machine.start().await.unwrap();

        let again = machine.finalize().await.unwrap();
        let restarted = machine.start().await.unwrap();

        assert_eq!(first, PhaseOutcome::Finalized(again));
        assert_eq!(restarted, PhaseOutcome::Finalized(again));
        assert_eq!(harness.store.writes().len(), 4);
        assert_eq!(harness.publisher.of_type("assessment:finalized").len(), 1);
        assert_eq!(harness.publisher.of_type("coherence:finalized").len(), 1);
    }

    #[tokio::test]
    async fn finalize_before_last_phase_is_rejected() {
        let harness = Harness::new();
        let mut machine = harness.machine().with_module(single_item_module(VectorKind::Visual));
        machine.start().await.unwrap();

        let err = machine.finalize().await.unwrap_err();

        assert!(matches!(err, SequenceError::NotReady(SequencePhase::Recognition)));
        assert!(harness.store.writes().is_empty());
    }

    #[tokio::test]
    async fn collecting_after_finalize_is_rejected() {
        let harness = Harness::new();
        let mut machine = harness.machine();
        machine.start().await.unwrap();

        let err = machine
            .answer(VectorKind::Visual, "only", "recursion")
            .unwrap_err();

        assert!(matches!(err, SequenceError::AlreadyFinalized));
    }

    #[tokio::test]
    async fn skip_current_phase_records_fallback() {
        let harness = Harness::new();
        let mut machine = harness
            .machine()
            .with_module(single_item_module(VectorKind::Visual))
            .with_module(single_item_module(VectorKind::Narrative));
        machine.start().await.unwrap();

        let outcome = machine.skip_current_phase().await.unwrap();

        assert_eq!(outcome, PhaseOutcome::Active(SequencePhase::Resonance));
        assert!(machine.session().result(VectorKind::Visual).unwrap().is_fallback());
        assert!(machine.distribution().is_zero());
    }

    #[tokio::test]
    async fn vector_processed_carries_vector_distribution() {
        let harness = Harness::new();
        let mut machine = harness.machine().with_module(single_item_module(VectorKind::Visual));
        machine.start().await.unwrap();
        complete_with(&mut machine, VectorKind::Visual, TraumaType::Dissolution).await;

        let processed = harness.publisher.of_type("vector:processed");
        let first: VectorProcessed = processed[0].payload_as().unwrap();
        assert_eq!(first.vector, VectorKind::Visual);
        assert_eq!(first.weight, 0.4);
        assert_eq!(first.processed.get(TraumaType::Dissolution), 1.0);
        assert_eq!(processed[0].aggregate_id, machine.session().id().to_string());
    }

    #[tokio::test]
    async fn resumed_session_matches_uninterrupted_run() {
        let modules = || {
            VectorKind::all()
                .iter()
                .map(|k| single_item_module(*k))
                .collect::<Vec<_>>()
        };
        let picks = [
            (VectorKind::Visual, TraumaType::Displacement),
            (VectorKind::Narrative, TraumaType::Surveillance),
            (VectorKind::Interactive, TraumaType::Displacement),
            (VectorKind::Temporal, TraumaType::Abandonment),
        ];

        let straight = Harness::new();
        let mut machine = straight.machine();
        modules().into_iter().for_each(|m| {
            machine.register_module(m);
        });
        machine.start().await.unwrap();
        let mut expected = None;
        for (vector, trauma) in picks {
            if let PhaseOutcome::Finalized(p) = complete_with(&mut machine, vector, trauma).await {
                expected = Some(p);
            }
        }

        let interrupted = Harness::new();
        let mut first = interrupted.machine();
        modules().into_iter().for_each(|m| {
            first.register_module(m);
        });
        first.start().await.unwrap();
        for (vector, trauma) in &picks[..2] {
            complete_with(&mut first, *vector, *trauma).await;
        }
        let snapshot = serde_json::to_string(&first.snapshot()).unwrap();
        drop(first);

        let mut resumed = SequencePhaseMachine::from_session(
            serde_json::from_str(&snapshot).unwrap(),
            interrupted.store.clone(),
            interrupted.publisher.clone(),
            Arc::new(FixedRandom(0.05)),
        )
        .unwrap()
        .with_keys(ProfileKeys::with_prefix("test"));
        modules().into_iter().for_each(|m| {
            resumed.register_module(m);
        });
        assert_eq!(
            resumed.start().await.unwrap(),
            PhaseOutcome::Active(SequencePhase::Recursion)
        );
        let mut actual = None;
        for (vector, trauma) in &picks[2..] {
            if let PhaseOutcome::Finalized(p) = complete_with(&mut resumed, *vector, *trauma).await
            {
                actual = Some(p);
            }
        }

        assert!(expected.is_some());
        assert_eq!(actual, expected);
    }

    #[tokio::test]
    async fn publish_failure_is_reported() {
        let store = Arc::new(MockStore::default());
        let mut machine = SequencePhaseMachine::new(
            store,
            Arc::new(MockPublisher::failing()),
            Arc::new(FixedRandom(0.05)),
        )
        .with_module(single_item_module(VectorKind::Visual));
        machine.start().await.unwrap();
        machine.answer(VectorKind::Visual, "only", "recursion").unwrap();

        let err = machine
            .notify_vector_complete(VectorKind::Visual)
            .await
            .unwrap_err();

        assert!(matches!(err, SequenceError::Publish(_)));
        assert_eq!(err.code(), ErrorCode::PublishFailed);
    }

    #[tokio::test]
    async fn failed_processed_publish_leaves_phase_retryable() {
        let publisher = Arc::new(MockPublisher::failing_first(1));
        let mut machine = SequencePhaseMachine::new(
            Arc::new(MockStore::default()),
            publisher.clone(),
            Arc::new(FixedRandom(0.05)),
        )
        .with_module(single_item_module(VectorKind::Visual))
        .with_module(single_item_module(VectorKind::Interactive));
        machine.start().await.unwrap();
        machine.answer(VectorKind::Visual, "only", "recursion").unwrap();

        let err = machine
            .notify_vector_complete(VectorKind::Visual)
            .await
            .unwrap_err();
        assert!(matches!(err, SequenceError::Publish(_)));
        assert_eq!(machine.phase(), SequencePhase::Recognition);
        assert!(machine.session().results().is_empty());
        assert!(machine.distribution().is_zero());

        let outcome = machine
            .notify_vector_complete(VectorKind::Visual)
            .await
            .unwrap();

        // Narrative has no module, so the retry also settles past it.
        assert_eq!(outcome, PhaseOutcome::Active(SequencePhase::Recursion));
        assert_eq!(machine.session().results().len(), 2);
        assert_eq!(machine.distribution().get(TraumaType::Recursion), 1.0);
        assert_eq!(publisher.of_type("vector:processed").len(), 2);
    }

    #[tokio::test]
    async fn failed_fallback_publish_is_retried_by_start() {
        let publisher = Arc::new(MockPublisher::failing_first(1));
        let mut machine = SequencePhaseMachine::new(
            Arc::new(MockStore::default()),
            publisher.clone(),
            Arc::new(FixedRandom(0.05)),
        )
        .with_module(single_item_module(VectorKind::Narrative));

        assert!(machine.start().await.is_err());
        assert_eq!(machine.phase(), SequencePhase::Recognition);

        let outcome = machine.start().await.unwrap();
        assert_eq!(outcome, PhaseOutcome::Active(SequencePhase::Resonance));
        assert_eq!(publisher.of_type("vector:processed").len(), 1);
    }

    #[test]
    fn tampered_snapshot_weight_is_rejected_on_resume() {
        let mut session = AssessmentSession::new();
        session
            .record(
                VectorResult::fallback(VectorKind::Visual),
                AffinityDistribution::ZERO,
            )
            .unwrap();
        let mut json = serde_json::to_value(&session).unwrap();
        json["results"][0]["weight"] = serde_json::json!(40.0);
        let tampered: AssessmentSession = serde_json::from_value(json).unwrap();

        let err = SequencePhaseMachine::from_session(
            tampered,
            Arc::new(MockStore::default()),
            Arc::new(MockPublisher::default()),
            Arc::new(FixedRandom(0.05)),
        )
        .unwrap_err();
        assert!(matches!(err, SequenceError::InvalidSnapshot(_)));
    }
}
