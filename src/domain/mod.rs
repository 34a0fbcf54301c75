//! Domain layer containing the assessment logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (trauma types, IDs, errors, events)
//! - `affinity` - Affinity distributions and normalization
//! - `vector` - The four assessment vectors and their item catalogs
//! - `aggregation` - Weighted combination of per-vector results
//! - `coherence` - Coherence baseline calibration
//! - `sequence` - Phase lifecycle, session state and finalization

pub mod affinity;
pub mod aggregation;
pub mod coherence;
pub mod foundation;
pub mod sequence;
pub mod vector;
