//! VectorResult - the immutable output of one finalized vector.

use serde::{Deserialize, Serialize};

use crate::domain::affinity::AffinityDistribution;

use super::{VectorKind, VectorResponse};

/// How a result came to exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultOrigin {
    /// Finalized from a registered module (possibly with zero responses).
    Collected,
    /// Synthesized by the phase machine because no module was available.
    Fallback,
}

/// Produced once per vector; immutable after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VectorResult {
    vector: VectorKind,
    weight: f64,
    distribution: AffinityDistribution,
    raw_responses: Vec<VectorResponse>,
    origin: ResultOrigin,
}

impl VectorResult {
    pub(crate) fn collected(
        vector: VectorKind,
        distribution: AffinityDistribution,
        raw_responses: Vec<VectorResponse>,
    ) -> Self {
        Self {
            vector,
            weight: vector.weight(),
            distribution,
            raw_responses,
            origin: ResultOrigin::Collected,
        }
    }

    /// Neutral stand-in for a phase whose module is unavailable.
    ///
    /// All-zero distribution; the declared weight is kept unchanged.
    pub fn fallback(vector: VectorKind) -> Self {
        Self {
            vector,
            weight: vector.weight(),
            distribution: AffinityDistribution::ZERO,
            raw_responses: Vec::new(),
            origin: ResultOrigin::Fallback,
        }
    }

    pub fn vector(&self) -> VectorKind {
        self.vector
    }

    pub fn weight(&self) -> f64 {
        self.weight
    }

    pub fn distribution(&self) -> &AffinityDistribution {
        &self.distribution
    }

    pub fn raw_responses(&self) -> &[VectorResponse] {
        &self.raw_responses
    }

    pub fn origin(&self) -> ResultOrigin {
        self.origin
    }

    pub fn is_fallback(&self) -> bool {
        self.origin == ResultOrigin::Fallback
    }
}

#[cfg(test)]
impl VectorResult {
    /// Builds a collected result straight from a distribution.
    pub fn test_fixture(vector: VectorKind, distribution: AffinityDistribution) -> Self {
        Self::collected(vector, distribution, Vec::new())
    }
}
