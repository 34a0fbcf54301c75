//! AffinityDistribution - a probability-like score over trauma types.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::domain::foundation::{TraumaType, ValidationError, TRAUMA_TYPE_COUNT};

/// Tolerance for the sum-to-one invariant on computed distributions.
pub const SUM_TOLERANCE: f64 = 1e-9;

/// Looser tolerance accepted when reading a distribution from storage or
/// an external payload.
pub const LOAD_TOLERANCE: f64 = 1e-6;

/// Mapping from every `TraumaType` to a non-negative value.
///
/// Invariant: either every value is zero, or the values sum to 1.0.
/// An aggregate over several vectors may sum to less than 1.0 when a
/// completed vector carried no mass (it still counts toward the divisor);
/// it never sums to more. Construct through
/// [`AffinityNormalizer`](super::AffinityNormalizer) or the validated
/// `TryFrom` conversion.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(
    into = "BTreeMap<TraumaType, f64>",
    try_from = "BTreeMap<TraumaType, f64>"
)]
pub struct AffinityDistribution {
    values: [f64; TRAUMA_TYPE_COUNT],
}

impl AffinityDistribution {
    /// The all-zero distribution ("no data").
    pub const ZERO: AffinityDistribution = AffinityDistribution {
        values: [0.0; TRAUMA_TYPE_COUNT],
    };

    /// Wraps values already known to satisfy the invariant.
    pub(crate) fn from_normalized(values: [f64; TRAUMA_TYPE_COUNT]) -> Self {
        Self { values }
    }

    /// A distribution with all mass on a single type.
    pub fn concentrated(trauma: TraumaType) -> Self {
        let mut values = [0.0; TRAUMA_TYPE_COUNT];
        values[trauma.index()] = 1.0;
        Self { values }
    }

    /// Returns the value for a trauma type.
    pub fn get(&self, trauma: TraumaType) -> f64 {
        self.values[trauma.index()]
    }

    /// Returns the sum of all values.
    pub fn total(&self) -> f64 {
        self.values.iter().sum()
    }

    /// Returns true when every value is zero.
    pub fn is_zero(&self) -> bool {
        self.values.iter().all(|v| *v == 0.0)
    }

    /// Iterates `(type, value)` pairs in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = (TraumaType, f64)> + '_ {
        TraumaType::all().iter().map(move |t| (*t, self.values[t.index()]))
    }

    /// Types whose value is strictly greater than `threshold`.
    pub fn types_above(&self, threshold: f64) -> Vec<TraumaType> {
        self.iter()
            .filter(|(_, v)| *v > threshold)
            .map(|(t, _)| t)
            .collect()
    }

    /// Arg-max with ties broken by enumeration order; `None` when zero.
    pub fn dominant(&self) -> Option<TraumaType> {
        if self.is_zero() {
            return None;
        }
        let mut best = TraumaType::Abandonment;
        for (trauma, value) in self.iter() {
            // strict comparison keeps the earliest type on ties
            if value > self.get(best) {
                best = trauma;
            }
        }
        Some(best)
    }

    /// Checks the distribution invariant within `tolerance`.
    ///
    /// Accepts a total of zero or any total in `(0, 1 + tolerance]`.
    pub fn validate(values: &[f64; TRAUMA_TYPE_COUNT], tolerance: f64) -> Result<(), ValidationError> {
        for (trauma, value) in TraumaType::all().iter().zip(values.iter()) {
            if !value.is_finite() || *value < 0.0 {
                return Err(ValidationError::out_of_range(
                    trauma.as_str(),
                    0.0,
                    1.0,
                    *value,
                ));
            }
        }
        let sum: f64 = values.iter().sum();
        if sum > 1.0 + tolerance {
            return Err(ValidationError::invalid_format(
                "affinity_distribution",
                format!("values must not sum past 1, got {}", sum),
            ));
        }
        Ok(())
    }
}

impl Default for AffinityDistribution {
    fn default() -> Self {
        Self::ZERO
    }
}

impl From<AffinityDistribution> for BTreeMap<TraumaType, f64> {
    fn from(dist: AffinityDistribution) -> Self {
        dist.iter().collect()
    }
}

impl TryFrom<BTreeMap<TraumaType, f64>> for AffinityDistribution {
    type Error = ValidationError;

    /// Missing types read as zero.
    fn try_from(map: BTreeMap<TraumaType, f64>) -> Result<Self, Self::Error> {
        let mut values = [0.0; TRAUMA_TYPE_COUNT];
        for (trauma, value) in map {
            values[trauma.index()] = value;
        }
        Self::validate(&values, LOAD_TOLERANCE)?;
        Ok(Self { values })
    }
}

impl fmt::Display for AffinityDistribution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .iter()
            .filter(|(_, v)| *v > 0.0)
            .map(|(t, v)| format!("{}={:.3}", t, v))
            .collect();
        if parts.is_empty() {
            write!(f, "{{}}")
        } else {
            write!(f, "{{{}}}", parts.join(", "))
        }
    }
}
