//! AssessmentSession - the serializable state of one assessment run.

use serde::{Deserialize, Serialize};

use crate::domain::affinity::AffinityDistribution;
use crate::domain::coherence::CoherenceDescriptor;
use crate::domain::foundation::{SessionId, StateMachine, Timestamp};
use crate::domain::vector::{VectorKind, VectorResult};

use super::{PersistedProfile, SequenceError, SequencePhase};

/// One assessment from its first phase to its persisted profile.
///
/// Results are kept in completion order, which is phase order. The
/// accumulated affinities are the aggregate after the latest result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentSession {
    id: SessionId,
    phase: SequencePhase,
    results: Vec<VectorResult>,
    affinities: AffinityDistribution,
    profile: Option<PersistedProfile>,
    coherence: Option<CoherenceDescriptor>,
    started_at: Timestamp,
    finalized_at: Option<Timestamp>,
}

impl AssessmentSession {
    pub fn new() -> Self {
        Self {
            id: SessionId::new(),
            phase: SequencePhase::Recognition,
            results: Vec::new(),
            affinities: AffinityDistribution::ZERO,
            profile: None,
            coherence: None,
            started_at: Timestamp::now(),
            finalized_at: None,
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn phase(&self) -> SequencePhase {
        self.phase
    }

    /// The vector of the active phase; `None` once all phases completed.
    pub fn active_vector(&self) -> Option<VectorKind> {
        self.phase.vector()
    }

    pub fn results(&self) -> &[VectorResult] {
        &self.results
    }

    /// The result for `vector`, present only once that phase completed.
    pub fn result(&self, vector: VectorKind) -> Option<&VectorResult> {
        self.results.iter().find(|r| r.vector() == vector)
    }

    pub fn affinities(&self) -> &AffinityDistribution {
        &self.affinities
    }

    pub fn profile(&self) -> Option<&PersistedProfile> {
        self.profile.as_ref()
    }

    pub fn coherence(&self) -> Option<&CoherenceDescriptor> {
        self.coherence.as_ref()
    }

    pub fn is_finalized(&self) -> bool {
        self.profile.is_some()
    }

    pub fn started_at(&self) -> Timestamp {
        self.started_at
    }

    pub fn finalized_at(&self) -> Option<Timestamp> {
        self.finalized_at
    }

    /// Stores the result of the active phase and advances to the next one.
    pub(crate) fn record(
        &mut self,
        result: VectorResult,
        affinities: AffinityDistribution,
    ) -> Result<SequencePhase, SequenceError> {
        let expected = self.phase.vector();
        if expected != Some(result.vector()) {
            return Err(SequenceError::VectorNotActive {
                expected,
                actual: result.vector(),
            });
        }
        let next = self
            .phase
            .next()
            .ok_or(SequenceError::AlreadyFinalized)?;
        self.phase = self.phase.transition_to(next)?;
        self.results.push(result);
        self.affinities = affinities;
        Ok(self.phase)
    }

    pub(crate) fn complete(&mut self, profile: PersistedProfile, coherence: CoherenceDescriptor) {
        self.affinities = profile.trauma_affinities;
        self.profile = Some(profile);
        self.coherence = Some(coherence);
        self.finalized_at = Some(Timestamp::now());
    }

    /// Checks that a deserialized snapshot is internally consistent.
    ///
    /// # Errors
    ///
    /// Returns `InvalidSnapshot` when results are out of phase order, the
    /// phase disagrees with the number of results, a result carries a
    /// weight other than its vector's, a fallback result carries mass or
    /// responses, or a profile exists before the last phase completed.
    pub fn validate(&self) -> Result<(), SequenceError> {
        if self.phase.index() != self.results.len() {
            return Err(SequenceError::InvalidSnapshot(format!(
                "phase {} with {} results",
                self.phase,
                self.results.len()
            )));
        }
        for (phase, result) in SequencePhase::all().iter().zip(&self.results) {
            if phase.vector() != Some(result.vector()) {
                return Err(SequenceError::InvalidSnapshot(format!(
                    "{} result recorded for the {} phase",
                    result.vector(),
                    phase
                )));
            }
            if (result.weight() - result.vector().weight()).abs() > WEIGHT_TOLERANCE {
                return Err(SequenceError::InvalidSnapshot(format!(
                    "{} result weighted {} instead of {}",
                    result.vector(),
                    result.weight(),
                    result.vector().weight()
                )));
            }
            if result.is_fallback()
                && (!result.distribution().is_zero() || !result.raw_responses().is_empty())
            {
                return Err(SequenceError::InvalidSnapshot(format!(
                    "fallback {} result carries responses",
                    result.vector()
                )));
            }
        }
        if self.profile.is_some() && self.phase != SequencePhase::Finalized {
            return Err(SequenceError::InvalidSnapshot(format!(
                "profile present during the {} phase",
                self.phase
            )));
        }
        Ok(())
    }
}

/// Slack for weights that passed through JSON text.
const WEIGHT_TOLERANCE: f64 = 1e-12;

impl Default for AssessmentSession {
    fn default() -> Self {
        Self::new()
    }
}
