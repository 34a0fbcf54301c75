//! Application layer - Commands and Handlers.
//!
//! This layer orchestrates domain operations and coordinates between ports.

pub mod handlers;
pub mod script;

pub use handlers::{
    StartAssessmentCommand, StartAssessmentHandler, StartAssessmentResult, VectorResponseHandler,
};
pub use script::{AssessmentScript, ScriptError};
