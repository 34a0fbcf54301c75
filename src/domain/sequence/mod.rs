//! Sequence module - the four-phase assessment lifecycle.
//!
//! Recognition (visual), Resonance (narrative), Recursion (interactive) and
//! Integration (temporal) run strictly in order, then the session is
//! finalized and its profile persisted.

mod errors;
mod events;
mod machine;
mod phase;
mod profile;
mod session;

pub use errors::SequenceError;
pub use events::{
    AssessmentFinalized, CoherenceFinalized, VectorProcessed, VectorResponseBatch,
    ASSESSMENT_FINALIZED, COHERENCE_FINALIZED, VECTOR_PROCESSED, VECTOR_RESPONSE,
};
pub use machine::{PhaseOutcome, SequencePhaseMachine};
pub use phase::SequencePhase;
pub use profile::{PersistedProfile, ProfileKeys};
pub use session::AssessmentSession;
