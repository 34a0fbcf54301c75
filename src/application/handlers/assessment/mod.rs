//! Assessment handlers.

mod start_assessment;
mod vector_response_handler;

pub use start_assessment::{StartAssessmentCommand, StartAssessmentHandler, StartAssessmentResult};
pub use vector_response_handler::VectorResponseHandler;
