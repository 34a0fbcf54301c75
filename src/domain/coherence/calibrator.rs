//! CoherenceCalibrator - focus, consistency and engagement sub-scores
//! combined into a bounded coherence baseline.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::domain::foundation::TRAUMA_TYPE_COUNT;
use crate::domain::vector::VectorResult;
use crate::ports::RandomSource;

/// A type counts as "selected" in a vector above this value.
pub const SELECTED_THRESHOLD: f64 = 0.1;
/// A type counts as strongly present above this value.
pub const STRONG_THRESHOLD: f64 = 0.3;
/// Focus floor per vector.
pub const FOCUS_FLOOR: f64 = 0.2;
/// Engagement floor.
pub const ENGAGEMENT_FLOOR: f64 = 0.3;
/// Consistency reported when fewer than two vectors were observed.
pub const DEFAULT_CONSISTENCY: f64 = 0.5;

pub const BASELINE_FLOOR: f64 = 0.4;
pub const BASELINE_SPAN: f64 = 0.4;
pub const JITTER_MIN: f64 = 0.05;
pub const JITTER_MAX: f64 = 0.10;
pub const BASELINE_MIN: f64 = 0.35;
pub const BASELINE_MAX: f64 = 0.85;

/// The three sub-scores.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponsePatterns {
    pub focus_score: f64,
    pub consistency_score: f64,
    pub engagement_score: f64,
}

impl ResponsePatterns {
    /// `0.4*focus + 0.4*consistency + 0.2*engagement`.
    pub fn weighted(&self) -> f64 {
        0.4 * self.focus_score + 0.4 * self.consistency_score + 0.2 * self.engagement_score
    }
}

/// Derived coherence values; recomputed on request.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoherenceDescriptor {
    pub baseline: f64,
    pub focus_score: f64,
    pub consistency_score: f64,
    pub engagement_score: f64,
}

impl CoherenceDescriptor {
    pub fn patterns(&self) -> ResponsePatterns {
        ResponsePatterns {
            focus_score: self.focus_score,
            consistency_score: self.consistency_score,
            engagement_score: self.engagement_score,
        }
    }
}

/// Consumes the same per-vector results as aggregation, in any order.
#[derive(Debug, Clone, Default)]
pub struct CoherenceCalibrator {
    observed: Vec<VectorResult>,
}

impl CoherenceCalibrator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds a calibrator from results alone.
    pub fn replay<'a>(results: impl IntoIterator<Item = &'a VectorResult>) -> Self {
        let mut calibrator = Self::new();
        for result in results {
            calibrator.observe(result);
        }
        calibrator
    }

    /// Records one completed vector.
    ///
    /// Fallback results carry no user responses and are skipped; a second
    /// result for an already observed vector is ignored.
    pub fn observe(&mut self, result: &VectorResult) {
        if result.is_fallback() {
            debug!(vector = %result.vector(), "Skipping fallback result for coherence");
            return;
        }
        if self.observed.iter().any(|r| r.vector() == result.vector()) {
            warn!(vector = %result.vector(), "Vector already observed; ignoring");
            return;
        }
        self.observed.push(result.clone());
    }

    pub fn observed_count(&self) -> usize {
        self.observed.len()
    }

    /// Average per-vector focus, each floored at `FOCUS_FLOOR`.
    pub fn focus_score(&self) -> f64 {
        if self.observed.is_empty() {
            return FOCUS_FLOOR;
        }
        let sum: f64 = self
            .observed
            .iter()
            .map(|r| {
                let selected = r.distribution().types_above(SELECTED_THRESHOLD).len();
                (1.0 - selected as f64 / TRAUMA_TYPE_COUNT as f64).max(FOCUS_FLOOR)
            })
            .sum();
        sum / self.observed.len() as f64
    }

    /// Average pairwise agreement on strongly present types.
    pub fn consistency_score(&self) -> f64 {
        if self.observed.len() < 2 {
            return DEFAULT_CONSISTENCY;
        }

        let mut total = 0.0;
        let mut pairs = 0usize;
        for (i, a) in self.observed.iter().enumerate() {
            for b in &self.observed[i + 1..] {
                total += pair_consistency(a, b);
                pairs += 1;
            }
        }
        total / pairs as f64
    }

    /// Average of all non-zero values, floored at `ENGAGEMENT_FLOOR`.
    pub fn engagement_score(&self) -> f64 {
        let values: Vec<f64> = self
            .observed
            .iter()
            .flat_map(|r| r.distribution().iter().map(|(_, v)| v))
            .filter(|v| *v > 0.0)
            .collect();
        if values.is_empty() {
            return ENGAGEMENT_FLOOR;
        }
        let mean = values.iter().sum::<f64>() / values.len() as f64;
        mean.max(ENGAGEMENT_FLOOR)
    }

    pub fn patterns(&self) -> ResponsePatterns {
        ResponsePatterns {
            focus_score: self.focus_score(),
            consistency_score: self.consistency_score(),
            engagement_score: self.engagement_score(),
        }
    }

    /// Combines sub-scores with a jitter drawn from `random`.
    pub fn descriptor(&self, random: &dyn RandomSource) -> CoherenceDescriptor {
        let patterns = self.patterns();
        let jitter = random.next_float(JITTER_MIN, JITTER_MAX);
        let baseline = combine(&patterns, jitter);

        debug!(
            observed = self.observed.len(),
            focus = patterns.focus_score,
            consistency = patterns.consistency_score,
            engagement = patterns.engagement_score,
            baseline,
            "Computed coherence descriptor"
        );

        CoherenceDescriptor {
            baseline,
            focus_score: patterns.focus_score,
            consistency_score: patterns.consistency_score,
            engagement_score: patterns.engagement_score,
        }
    }
}

/// `0.4 + 0.4 * weighted + jitter`, clamped to `[0.35, 0.85]`.
pub fn combine(patterns: &ResponsePatterns, jitter: f64) -> f64 {
    let jitter = if jitter.is_finite() {
        jitter.clamp(JITTER_MIN, JITTER_MAX)
    } else {
        JITTER_MIN
    };
    let raw = BASELINE_FLOOR + BASELINE_SPAN * patterns.weighted() + jitter;
    if raw.is_nan() {
        return BASELINE_MIN;
    }
    raw.clamp(BASELINE_MIN, BASELINE_MAX)
}

fn pair_consistency(a: &VectorResult, b: &VectorResult) -> f64 {
    let (da, db) = (a.distribution(), b.distribution());
    let mut candidates = 0usize;
    let mut matches = 0usize;
    for (trauma, va) in da.iter() {
        let vb = db.get(trauma);
        let in_union = va > SELECTED_THRESHOLD || vb > SELECTED_THRESHOLD;
        if !in_union {
            continue;
        }
        let strong_a = va > STRONG_THRESHOLD;
        let strong_b = vb > STRONG_THRESHOLD;
        if strong_a || strong_b {
            candidates += 1;
        }
        if strong_a && strong_b {
            matches += 1;
        }
    }
    if candidates == 0 {
        0.0
    } else {
        matches as f64 / candidates as f64
    }
}
