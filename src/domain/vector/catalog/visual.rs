//! Visual vector catalog.
//!
//! Image-choice items. Each option carries fractional affinities to one or
//! more trauma types rather than a single discrete count.

use crate::domain::foundation::TraumaType::{self, *};
use crate::domain::vector::{
    AssessmentItem, ItemOption, TraumaWeight, VectorError, VectorKind, VectorModule,
};

fn blend(id: &str, parts: &[(TraumaType, f64)]) -> ItemOption {
    ItemOption::new(
        id,
        parts
            .iter()
            .map(|(trauma, weight)| TraumaWeight::new(*trauma, *weight))
            .collect(),
    )
}

/// The fixed, ordered visual item list.
pub fn items() -> Vec<AssessmentItem> {
    vec![
        AssessmentItem::new(
            "visual.empty_room",
            vec![
                blend("door_ajar", &[(Abandonment, 0.7), (Displacement, 0.3)]),
                blend("shattered_mirror", &[(Fragmentation, 0.8), (Dissolution, 0.2)]),
                blend("window_with_eyes", &[(Surveillance, 0.9), (Abandonment, 0.1)]),
                blend("corridor_loop", &[(Recursion, 0.6), (Displacement, 0.4)]),
            ],
        ),
        AssessmentItem::new(
            "visual.static_portrait",
            vec![
                blend("face_fading", &[(Dissolution, 0.7), (Abandonment, 0.3)]),
                blend("face_split", &[(Fragmentation, 0.7), (Recursion, 0.3)]),
                blend("face_watching", &[(Surveillance, 1.0)]),
                blend("face_elsewhere", &[(Displacement, 0.8), (Dissolution, 0.2)]),
            ],
        ),
        AssessmentItem::new(
            "visual.glitched_landscape",
            vec![
                blend("horizon_tiled", &[(Recursion, 0.8), (Fragmentation, 0.2)]),
                blend("road_vanishing", &[(Abandonment, 0.5), (Dissolution, 0.5)]),
                blend("camera_grid", &[(Surveillance, 0.7), (Recursion, 0.3)]),
                blend("wrong_city", &[(Displacement, 1.0)]),
            ],
        ),
        AssessmentItem::new(
            "visual.color_field",
            vec![
                blend("grey_wash", &[(Dissolution, 0.6), (Abandonment, 0.4)]),
                blend("split_spectrum", &[(Fragmentation, 0.6), (Displacement, 0.4)]),
                blend("infrared", &[(Surveillance, 0.6), (Fragmentation, 0.4)]),
                ItemOption::neutral("no_preference"),
            ],
        ),
    ]
}

/// Builds the visual module.
pub fn module() -> Result<VectorModule, VectorError> {
    VectorModule::new(VectorKind::Visual, items())
}
