//! Application handlers.
//!
//! Command and event handlers that orchestrate domain operations.

pub mod assessment;

pub use assessment::{
    StartAssessmentCommand, StartAssessmentHandler, StartAssessmentResult, VectorResponseHandler,
};
