//! AffinityNormalizer - turns raw per-type tallies into distributions.

use crate::domain::foundation::{TraumaType, TRAUMA_TYPE_COUNT};

use super::AffinityDistribution;

/// Raw, unnormalized per-type sums.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AffinityTally {
    sums: [f64; TRAUMA_TYPE_COUNT],
}

impl AffinityTally {
    /// Creates an empty tally.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `weight` to the running sum for `trauma`.
    ///
    /// Non-finite or negative weights are ignored; callers validate input
    /// before it reaches the tally. Sums saturate at `f64::MAX`.
    pub fn add(&mut self, trauma: TraumaType, weight: f64) {
        if weight.is_finite() && weight > 0.0 {
            let sum = &mut self.sums[trauma.index()];
            *sum = (*sum + weight).min(f64::MAX);
        }
    }

    /// Adds `dist * scale` for every type.
    pub fn add_scaled(&mut self, dist: &AffinityDistribution, scale: f64) {
        for (trauma, value) in dist.iter() {
            self.add(trauma, value * scale);
        }
    }

    /// Returns the raw sum for a trauma type.
    pub fn get(&self, trauma: TraumaType) -> f64 {
        self.sums[trauma.index()]
    }

    /// Sum of all raw sums.
    pub fn total(&self) -> f64 {
        self.sums.iter().sum()
    }

    /// Largest per-type sum.
    pub fn max(&self) -> f64 {
        self.sums.iter().copied().fold(0.0, f64::max)
    }
}

/// Stateless normalization rules shared by every vector and the aggregator.
pub struct AffinityNormalizer;

impl AffinityNormalizer {
    /// Divide-by-total normalization.
    ///
    /// Sums are scaled by the largest sum first, so the total stays finite
    /// even when the raw sums are near `f64::MAX`.
    ///
    /// # Edge Cases
    /// - Empty tally (max is 0): returns the all-zero distribution
    pub fn normalize(tally: &AffinityTally) -> AffinityDistribution {
        let max = tally.max();
        if max == 0.0 {
            return AffinityDistribution::ZERO;
        }
        let mut values = [0.0; TRAUMA_TYPE_COUNT];
        for trauma in TraumaType::all() {
            values[trauma.index()] = tally.get(*trauma) / max;
        }
        let total: f64 = values.iter().sum();
        for value in values.iter_mut() {
            *value /= total;
        }
        AffinityDistribution::from_normalized(values)
    }

    /// Divides every sum by a caller-supplied divisor without renormalizing.
    ///
    /// Used by aggregation, where the divisor is the accepted weight-sum.
    /// A zero divisor yields the all-zero distribution.
    pub fn scale_by(tally: &AffinityTally, divisor: f64) -> AffinityDistribution {
        if divisor == 0.0 || tally.max() == 0.0 {
            return AffinityDistribution::ZERO;
        }
        let mut values = [0.0; TRAUMA_TYPE_COUNT];
        for trauma in TraumaType::all() {
            values[trauma.index()] = tally.get(*trauma) / divisor;
        }
        AffinityDistribution::from_normalized(values)
    }
}
