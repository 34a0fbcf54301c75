//! Narrative vector catalog.
//!
//! Story-fragment items; every option resolves to exactly one trauma type.

use crate::domain::foundation::TraumaType::*;
use crate::domain::vector::{AssessmentItem, ItemOption, VectorError, VectorKind, VectorModule};

/// The fixed, ordered narrative item list.
pub fn items() -> Vec<AssessmentItem> {
    vec![
        AssessmentItem::new(
            "narrative.last_message",
            vec![
                ItemOption::single("unanswered", Abandonment),
                ItemOption::single("half_deleted", Fragmentation),
                ItemOption::single("read_receipt", Surveillance),
                ItemOption::single("sent_again", Recursion),
            ],
        ),
        AssessmentItem::new(
            "narrative.waking",
            vec![
                ItemOption::single("strange_room", Displacement),
                ItemOption::single("same_morning", Recursion),
                ItemOption::single("no_reflection", Dissolution),
                ItemOption::single("missing_hours", Fragmentation),
            ],
        ),
        AssessmentItem::new(
            "narrative.home",
            vec![
                ItemOption::single("moved_away", Displacement),
                ItemOption::single("left_behind", Abandonment),
                ItemOption::single("walls_listen", Surveillance),
                ItemOption::single("never_was", Dissolution),
            ],
        ),
        AssessmentItem::new(
            "narrative.memory",
            vec![
                ItemOption::single("shards", Fragmentation),
                ItemOption::single("rerun", Recursion),
                ItemOption::single("fog", Dissolution),
                ItemOption::neutral("refuse"),
            ],
        ),
        AssessmentItem::new(
            "narrative.stranger",
            vec![
                ItemOption::single("walks_away", Abandonment),
                ItemOption::single("takes_notes", Surveillance),
                ItemOption::single("wears_your_face", Fragmentation),
                ItemOption::single("speaks_foreign", Displacement),
            ],
        ),
    ]
}

/// Builds the narrative module.
pub fn module() -> Result<VectorModule, VectorError> {
    VectorModule::new(VectorKind::Narrative, items())
}
