//! Vector-specific error types.

use thiserror::Error;

use crate::domain::foundation::{DomainError, ErrorCode};

use super::VectorKind;

/// Errors raised by a vector module.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum VectorError {
    /// `finalize()` was called before every item was answered.
    #[error("{vector} assessment incomplete: {answered} of {required} items answered")]
    IncompleteAssessment {
        vector: VectorKind,
        answered: usize,
        required: usize,
    },

    #[error("{vector} has no item '{item_id}'")]
    UnknownItem { vector: VectorKind, item_id: String },

    #[error("{vector} item '{item_id}' has no option '{option_id}'")]
    UnknownOption {
        vector: VectorKind,
        item_id: String,
        option_id: String,
    },

    #[error("Invalid weight {weight} on item '{item_id}'")]
    InvalidWeight { item_id: String, weight: f64 },

    #[error("Invalid {vector} catalog: {reason}")]
    InvalidCatalog { vector: VectorKind, reason: String },

    #[error("Responses for {actual} delivered to the {expected} module")]
    VectorMismatch {
        expected: VectorKind,
        actual: VectorKind,
    },
}

impl VectorError {
    pub fn invalid_catalog(vector: VectorKind, reason: impl Into<String>) -> Self {
        VectorError::InvalidCatalog {
            vector,
            reason: reason.into(),
        }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            VectorError::IncompleteAssessment { .. } => ErrorCode::IncompleteAssessment,
            VectorError::UnknownItem { .. } | VectorError::UnknownOption { .. } => {
                ErrorCode::UnknownItem
            }
            VectorError::InvalidWeight { .. } => ErrorCode::OutOfRange,
            VectorError::InvalidCatalog { .. } => ErrorCode::ValidationFailed,
            VectorError::VectorMismatch { .. } => ErrorCode::VectorNotActive,
        }
    }

    /// True when the caller can recover by supplying more responses.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, VectorError::IncompleteAssessment { .. })
    }
}

impl From<VectorError> for DomainError {
    fn from(err: VectorError) -> Self {
        DomainError::new(err.code(), err.to_string())
    }
}
