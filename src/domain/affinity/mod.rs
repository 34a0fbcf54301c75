//! Affinity module - distributions over trauma types and their normalization.
//!
//! # Components
//!
//! - `AffinityDistribution` - validated sum-to-one (or all-zero) mapping
//! - `AffinityTally` - raw per-type accumulator
//! - `AffinityNormalizer` - divide-by-total rule shared by all vectors
//!
//! All functions are pure; no ports are involved.

mod distribution;
mod normalizer;

pub use distribution::{AffinityDistribution, LOAD_TOLERANCE, SUM_TOLERANCE};
pub use normalizer::{AffinityNormalizer, AffinityTally};
