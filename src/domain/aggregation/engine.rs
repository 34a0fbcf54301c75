//! AggregationEngine - weighted combination of per-vector distributions.

use thiserror::Error;
use tracing::warn;

use crate::domain::affinity::{AffinityDistribution, AffinityNormalizer, AffinityTally};
use crate::domain::foundation::{DomainError, ErrorCode, TraumaType};
use crate::domain::vector::{VectorKind, VectorResult};

/// Category reported when no vector contributed any mass.
///
/// The first type in enumeration order, matching the tie-break rule.
pub const DEFAULT_TRAUMA_TYPE: TraumaType = TraumaType::Abandonment;

/// Errors raised by the aggregation engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AggregationError {
    /// `primary_type()` requested while the accumulated mass is zero.
    #[error("No vector has contributed any affinity mass")]
    InsufficientData,

    #[error("Vector {0} was already accepted")]
    DuplicateVector(VectorKind),
}

impl From<AggregationError> for DomainError {
    fn from(err: AggregationError) -> Self {
        let code = match err {
            AggregationError::InsufficientData => ErrorCode::InsufficientData,
            AggregationError::DuplicateVector(_) => ErrorCode::DuplicateVector,
        };
        DomainError::new(code, err.to_string())
    }
}

/// Accumulates weighted distributions from whichever vectors complete.
///
/// The divisor is the weight-sum of collected vectors actually accepted,
/// not the theoretical 1.0. Fallback results are recorded but add neither
/// mass nor weight.
#[derive(Debug, Clone, Default)]
pub struct AggregationEngine {
    accumulator: AffinityTally,
    weight_sum: f64,
    accepted: Vec<VectorKind>,
}

impl AggregationEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds an engine from results alone.
    pub fn replay<'a>(
        results: impl IntoIterator<Item = &'a VectorResult>,
    ) -> Result<Self, AggregationError> {
        let mut engine = Self::new();
        for result in results {
            engine.accept(result)?;
        }
        Ok(engine)
    }

    /// Adds `distribution * weight` to the accumulator.
    pub fn accept(&mut self, result: &VectorResult) -> Result<(), AggregationError> {
        if self.accepted.contains(&result.vector()) {
            return Err(AggregationError::DuplicateVector(result.vector()));
        }
        self.accepted.push(result.vector());

        if result.is_fallback() {
            return Ok(());
        }
        self.accumulator
            .add_scaled(result.distribution(), result.weight());
        self.weight_sum += result.weight();
        Ok(())
    }

    /// Accumulator divided by the accepted weight-sum.
    ///
    /// # Edge Cases
    /// - Nothing accepted (weight-sum 0): all-zero distribution
    pub fn distribution(&self) -> AffinityDistribution {
        AffinityNormalizer::scale_by(&self.accumulator, self.weight_sum)
    }

    /// Arg-max of `distribution()`, ties broken by enumeration order.
    ///
    /// # Errors
    ///
    /// Returns `InsufficientData` when no accepted vector carried mass.
    pub fn primary_type(&self) -> Result<TraumaType, AggregationError> {
        self.distribution()
            .dominant()
            .ok_or(AggregationError::InsufficientData)
    }

    /// `primary_type()` with the documented default applied and logged.
    pub fn primary_type_or_default(&self) -> TraumaType {
        match self.primary_type() {
            Ok(trauma) => trauma,
            Err(err) => {
                warn!(
                    accepted = self.accepted.len(),
                    default = %DEFAULT_TRAUMA_TYPE,
                    "{}; applying default trauma type",
                    err
                );
                DEFAULT_TRAUMA_TYPE
            }
        }
    }

    /// Sum of the weights of accepted collected vectors.
    pub fn weight_sum(&self) -> f64 {
        self.weight_sum
    }

    /// Vectors accepted so far, in acceptance order.
    pub fn accepted(&self) -> &[VectorKind] {
        &self.accepted
    }
}
