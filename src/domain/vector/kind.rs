//! VectorKind enum representing the four assessment channels.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::ValidationError;

/// One of the four independent assessment channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VectorKind {
    Visual,
    Narrative,
    Interactive,
    Temporal,
}

impl VectorKind {
    /// Returns all vectors in phase order.
    pub fn all() -> &'static [VectorKind] {
        &[
            VectorKind::Visual,
            VectorKind::Narrative,
            VectorKind::Interactive,
            VectorKind::Temporal,
        ]
    }

    /// Fixed importance weight. The four weights sum to 1.0.
    pub fn weight(&self) -> f64 {
        match self {
            VectorKind::Visual => 0.4,
            VectorKind::Interactive => 0.3,
            VectorKind::Narrative => 0.2,
            VectorKind::Temporal => 0.1,
        }
    }

    /// Returns the topic-level name (e.g. "visual").
    pub fn as_str(&self) -> &'static str {
        match self {
            VectorKind::Visual => "visual",
            VectorKind::Narrative => "narrative",
            VectorKind::Interactive => "interactive",
            VectorKind::Temporal => "temporal",
        }
    }
}

impl fmt::Display for VectorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for VectorKind {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        VectorKind::all()
            .iter()
            .find(|k| k.as_str().eq_ignore_ascii_case(s))
            .copied()
            .ok_or_else(|| ValidationError::invalid_format("vector", format!("unknown '{}'", s)))
    }
}
