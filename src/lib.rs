//! Trauma Engine - four-vector trauma classification
//!
//! An assessment runs through four phases, each collecting responses on one
//! vector (visual, narrative, interactive, temporal). Per-vector affinity
//! distributions are combined by declared weight into a primary trauma
//! category and a bounded coherence baseline, which are persisted once.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
