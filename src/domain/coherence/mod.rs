//! Coherence module - calibrates a bounded coherence baseline from the
//! shape of the per-vector distributions.

mod calibrator;

pub use calibrator::{
    combine, CoherenceCalibrator, CoherenceDescriptor, ResponsePatterns, BASELINE_MAX,
    BASELINE_MIN, DEFAULT_CONSISTENCY, ENGAGEMENT_FLOOR, FOCUS_FLOOR, JITTER_MAX, JITTER_MIN,
    SELECTED_THRESHOLD, STRONG_THRESHOLD,
};
