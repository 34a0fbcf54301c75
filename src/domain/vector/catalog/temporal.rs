//! Temporal vector catalog.
//!
//! Items about the perception of elapsed time.

use crate::domain::foundation::TraumaType::*;
use crate::domain::vector::{AssessmentItem, ItemOption, VectorError, VectorKind, VectorModule};

/// The fixed, ordered temporal item list.
pub fn items() -> Vec<AssessmentItem> {
    vec![
        AssessmentItem::new(
            "temporal.lost_time",
            vec![
                ItemOption::single("hours_vanish", Dissolution),
                ItemOption::single("day_repeats", Recursion),
                ItemOption::single("gaps_between", Fragmentation),
            ],
        ),
        AssessmentItem::new(
            "temporal.waiting",
            vec![
                ItemOption::single("nobody_comes", Abandonment),
                ItemOption::single("being_timed", Surveillance),
                ItemOption::single("wrong_timezone", Displacement),
            ],
        ),
        AssessmentItem::new(
            "temporal.anniversary",
            vec![
                ItemOption::single("forgotten", Abandonment),
                ItemOption::single("relived", Recursion),
                ItemOption::single("misplaced", Displacement),
                ItemOption::neutral("no_anniversary"),
            ],
        ),
    ]
}

/// Builds the temporal module.
pub fn module() -> Result<VectorModule, VectorError> {
    VectorModule::new(VectorKind::Temporal, items())
}
