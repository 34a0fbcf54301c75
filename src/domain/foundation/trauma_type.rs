//! TraumaType enum representing the six fixed classification categories.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::ValidationError;

/// The six trauma categories, in canonical enumeration order.
///
/// The declaration order is significant: it is the tie-break order for
/// arg-max selection and the derived `Ord` follows it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TraumaType {
    Abandonment,
    Fragmentation,
    Surveillance,
    Recursion,
    Displacement,
    Dissolution,
}

/// Number of trauma categories.
pub const TRAUMA_TYPE_COUNT: usize = 6;

impl TraumaType {
    /// Returns all trauma types in canonical order.
    pub fn all() -> &'static [TraumaType; TRAUMA_TYPE_COUNT] {
        &[
            TraumaType::Abandonment,
            TraumaType::Fragmentation,
            TraumaType::Surveillance,
            TraumaType::Recursion,
            TraumaType::Displacement,
            TraumaType::Dissolution,
        ]
    }

    /// Returns the 0-based index of this type in the canonical order.
    pub fn index(&self) -> usize {
        match self {
            TraumaType::Abandonment => 0,
            TraumaType::Fragmentation => 1,
            TraumaType::Surveillance => 2,
            TraumaType::Recursion => 3,
            TraumaType::Displacement => 4,
            TraumaType::Dissolution => 5,
        }
    }

    /// Returns the stable lowercase key used in payloads and storage.
    pub fn as_str(&self) -> &'static str {
        match self {
            TraumaType::Abandonment => "abandonment",
            TraumaType::Fragmentation => "fragmentation",
            TraumaType::Surveillance => "surveillance",
            TraumaType::Recursion => "recursion",
            TraumaType::Displacement => "displacement",
            TraumaType::Dissolution => "dissolution",
        }
    }
}

impl fmt::Display for TraumaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for TraumaType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TraumaType::all()
            .iter()
            .find(|t| t.as_str() == s)
            .copied()
            .ok_or_else(|| ValidationError::invalid_format("trauma_type", format!("unknown '{}'", s)))
    }
}
