//! SequencePhase - the strictly linear assessment phases.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::{StateMachine, ValidationError};
use crate::domain::vector::VectorKind;

/// Ordered phases; `Finalized` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SequencePhase {
    Recognition,
    Resonance,
    Recursion,
    Integration,
    Finalized,
}

impl SequencePhase {
    /// Returns all phases in order.
    pub fn all() -> &'static [SequencePhase] {
        &[
            SequencePhase::Recognition,
            SequencePhase::Resonance,
            SequencePhase::Recursion,
            SequencePhase::Integration,
            SequencePhase::Finalized,
        ]
    }

    /// The vector assessed in this phase; `None` once finalized.
    pub fn vector(&self) -> Option<VectorKind> {
        match self {
            SequencePhase::Recognition => Some(VectorKind::Visual),
            SequencePhase::Resonance => Some(VectorKind::Narrative),
            SequencePhase::Recursion => Some(VectorKind::Interactive),
            SequencePhase::Integration => Some(VectorKind::Temporal),
            SequencePhase::Finalized => None,
        }
    }

    /// The phase bound to a vector.
    pub fn for_vector(vector: VectorKind) -> SequencePhase {
        match vector {
            VectorKind::Visual => SequencePhase::Recognition,
            VectorKind::Narrative => SequencePhase::Resonance,
            VectorKind::Interactive => SequencePhase::Recursion,
            VectorKind::Temporal => SequencePhase::Integration,
        }
    }

    /// 0-based phase index.
    pub fn index(&self) -> usize {
        match self {
            SequencePhase::Recognition => 0,
            SequencePhase::Resonance => 1,
            SequencePhase::Recursion => 2,
            SequencePhase::Integration => 3,
            SequencePhase::Finalized => 4,
        }
    }

    /// Phase for a persisted index.
    pub fn from_index(index: usize) -> Result<SequencePhase, ValidationError> {
        Self::all().get(index).copied().ok_or_else(|| {
            ValidationError::out_of_range("phase_index", 0.0, 4.0, index as f64)
        })
    }

    /// The following phase, if any.
    pub fn next(&self) -> Option<SequencePhase> {
        Self::all().get(self.index() + 1).copied()
    }
}

impl StateMachine for SequencePhase {
    fn can_transition_to(&self, target: &Self) -> bool {
        self.next() == Some(*target)
    }

    fn valid_transitions(&self) -> Vec<Self> {
        self.next().into_iter().collect()
    }
}

impl fmt::Display for SequencePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SequencePhase::Recognition => "recognition",
            SequencePhase::Resonance => "resonance",
            SequencePhase::Recursion => "recursion",
            SequencePhase::Integration => "integration",
            SequencePhase::Finalized => "finalized",
        };
        write!(f, "{}", name)
    }
}
