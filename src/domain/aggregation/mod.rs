//! Aggregation module - cross-vector weighted combination.

mod engine;

pub use engine::{AggregationEngine, AggregationError, DEFAULT_TRAUMA_TYPE};
