//! Interactive vector catalog.
//!
//! Behavioral items: how the user reacts to interface disturbances.
//! Options resolve to one trauma type; a few deliberately attach nothing.

use crate::domain::foundation::TraumaType::*;
use crate::domain::vector::{AssessmentItem, ItemOption, VectorError, VectorKind, VectorModule};

/// The fixed, ordered interactive item list.
pub fn items() -> Vec<AssessmentItem> {
    vec![
        AssessmentItem::new(
            "interactive.cursor_lag",
            vec![
                ItemOption::single("wait_it_out", Abandonment),
                ItemOption::single("click_repeatedly", Recursion),
                ItemOption::single("check_for_watchers", Surveillance),
                ItemOption::neutral("ignore"),
            ],
        ),
        AssessmentItem::new(
            "interactive.button_moves",
            vec![
                ItemOption::single("chase_it", Recursion),
                ItemOption::single("give_up", Abandonment),
                ItemOption::single("look_elsewhere", Displacement),
            ],
        ),
        AssessmentItem::new(
            "interactive.text_scrambles",
            vec![
                ItemOption::single("piece_together", Fragmentation),
                ItemOption::single("let_it_blur", Dissolution),
                ItemOption::single("screenshot_it", Surveillance),
            ],
        ),
        AssessmentItem::new(
            "interactive.window_closes",
            vec![
                ItemOption::single("reopen", Recursion),
                ItemOption::single("move_on", Displacement),
                ItemOption::single("feel_erased", Dissolution),
                ItemOption::single("feel_left", Abandonment),
            ],
        ),
    ]
}

/// Builds the interactive module.
pub fn module() -> Result<VectorModule, VectorError> {
    VectorModule::new(VectorKind::Interactive, items())
}
