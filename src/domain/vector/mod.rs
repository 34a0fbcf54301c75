//! Vector module - the four assessment channels.
//!
//! Each vector owns a fixed ordered item list, collects one response per
//! item, and hands over an immutable `VectorResult` when finalized.

pub mod catalog;
mod errors;
mod kind;
mod module;
mod response;
mod result;

pub use errors::VectorError;
pub use kind::VectorKind;
pub use module::VectorModule;
pub use response::{AssessmentItem, ItemOption, TraumaWeight, VectorResponse};
pub use result::{ResultOrigin, VectorResult};
