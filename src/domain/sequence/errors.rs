//! Sequence-specific error types.

use thiserror::Error;

use crate::domain::aggregation::AggregationError;
use crate::domain::foundation::{DomainError, ErrorCode, ValidationError};
use crate::domain::vector::{VectorError, VectorKind};
use crate::ports::SessionStoreError;

use super::SequencePhase;

/// Errors raised while driving an assessment through its phases.
#[derive(Debug, Error)]
pub enum SequenceError {
    /// No module is registered for the vector of the active phase.
    #[error("No module registered for the {0} vector")]
    MissingModule(VectorKind),

    /// Input addressed to a vector other than the active one.
    #[error("Vector {actual} is not active (active: {})", expected.map(|v| v.to_string()).unwrap_or_else(|| "none".to_string()))]
    VectorNotActive {
        expected: Option<VectorKind>,
        actual: VectorKind,
    },

    #[error("Assessment session is already finalized")]
    AlreadyFinalized,

    #[error("Cannot finalize during the {0} phase")]
    NotReady(SequencePhase),

    #[error("Invalid session snapshot: {0}")]
    InvalidSnapshot(String),

    #[error(transparent)]
    Transition(#[from] ValidationError),

    #[error(transparent)]
    Vector(#[from] VectorError),

    #[error(transparent)]
    Aggregation(#[from] AggregationError),

    #[error(transparent)]
    Store(#[from] SessionStoreError),

    #[error("Failed to publish event: {0}")]
    Publish(DomainError),
}

impl SequenceError {
    pub fn code(&self) -> ErrorCode {
        match self {
            SequenceError::MissingModule(_) => ErrorCode::MissingModule,
            SequenceError::VectorNotActive { .. } => ErrorCode::VectorNotActive,
            SequenceError::AlreadyFinalized => ErrorCode::SessionFinalized,
            SequenceError::NotReady(_) | SequenceError::Transition(_) => {
                ErrorCode::InvalidStateTransition
            }
            SequenceError::InvalidSnapshot(_) => ErrorCode::MalformedPersistedState,
            SequenceError::Vector(err) => err.code(),
            SequenceError::Aggregation(AggregationError::InsufficientData) => {
                ErrorCode::InsufficientData
            }
            SequenceError::Aggregation(AggregationError::DuplicateVector(_)) => {
                ErrorCode::DuplicateVector
            }
            SequenceError::Store(err) => err.code(),
            SequenceError::Publish(_) => ErrorCode::PublishFailed,
        }
    }
}

impl From<SequenceError> for DomainError {
    fn from(err: SequenceError) -> Self {
        DomainError::new(err.code(), err.to_string())
    }
}
