//! Events published while an assessment runs.
//!
//! Payloads serialize in camelCase. Event and session ids travel on the
//! envelope only.

use serde::{Deserialize, Serialize};

use crate::domain::affinity::AffinityDistribution;
use crate::domain::coherence::ResponsePatterns;
use crate::domain::foundation::{EventId, SessionId, Timestamp, TraumaType};
use crate::domain::vector::{VectorKind, VectorResponse};

/// Inbound topic carrying a batch of responses for one vector.
pub const VECTOR_RESPONSE: &str = "vector:response";
/// Published once per completed vector.
pub const VECTOR_PROCESSED: &str = "vector:processed";
/// Published once with the final affinities.
pub const ASSESSMENT_FINALIZED: &str = "assessment:finalized";
/// Published once with the coherence baseline.
pub const COHERENCE_FINALIZED: &str = "coherence:finalized";

const AGGREGATE_TYPE: &str = "AssessmentSession";

/// Inbound payload on `vector:response`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VectorResponseBatch {
    pub vector: VectorKind,
    #[serde(default)]
    pub responses: Vec<VectorResponse>,
    /// Completes the vector even if items remain unanswered.
    #[serde(default)]
    pub complete: bool,
}

/// A vector finished and its result was folded into the aggregate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VectorProcessed {
    #[serde(skip)]
    pub event_id: EventId,
    #[serde(skip)]
    pub session_id: SessionId,
    pub vector: VectorKind,
    pub weight: f64,
    /// Distribution of the vector alone.
    pub processed: AffinityDistribution,
    pub timestamp: Timestamp,
}

crate::domain_event!(
    VectorProcessed,
    event_type = VECTOR_PROCESSED,
    aggregate_id = session_id,
    aggregate_type = AGGREGATE_TYPE,
    occurred_at = timestamp,
    event_id = event_id
);

/// The aggregate affinities and primary category were persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentFinalized {
    #[serde(skip)]
    pub event_id: EventId,
    #[serde(skip)]
    pub session_id: SessionId,
    pub trauma_affinities: AffinityDistribution,
    pub primary_trauma: TraumaType,
    pub timestamp: Timestamp,
}

crate::domain_event!(
    AssessmentFinalized,
    event_type = ASSESSMENT_FINALIZED,
    aggregate_id = session_id,
    aggregate_type = AGGREGATE_TYPE,
    occurred_at = timestamp,
    event_id = event_id
);

/// The coherence baseline was persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoherenceFinalized {
    #[serde(skip)]
    pub event_id: EventId,
    #[serde(skip)]
    pub session_id: SessionId,
    pub coherence_baseline: f64,
    pub response_patterns: ResponsePatterns,
    pub timestamp: Timestamp,
}

crate::domain_event!(
    CoherenceFinalized,
    event_type = COHERENCE_FINALIZED,
    aggregate_id = session_id,
    aggregate_type = AGGREGATE_TYPE,
    occurred_at = timestamp,
    event_id = event_id
);
