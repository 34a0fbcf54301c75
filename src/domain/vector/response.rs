//! Response and catalog value types shared by every vector.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::TraumaType;

/// One trauma-type attachment on an option.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TraumaWeight {
    pub trauma_type: TraumaType,
    pub weight: f64,
}

impl TraumaWeight {
    pub fn new(trauma_type: TraumaType, weight: f64) -> Self {
        Self { trauma_type, weight }
    }

    /// Full (1.0) attachment to a single type.
    pub fn full(trauma_type: TraumaType) -> Self {
        Self::new(trauma_type, 1.0)
    }

    pub(crate) fn is_valid(&self) -> bool {
        self.weight.is_finite() && self.weight >= 0.0
    }
}

/// One answer to one assessment item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VectorResponse {
    pub item_id: String,
    pub option_id: String,
    /// Attachments carried by the chosen option. May be empty.
    #[serde(default)]
    pub affinities: Vec<TraumaWeight>,
}

impl VectorResponse {
    pub fn new(
        item_id: impl Into<String>,
        option_id: impl Into<String>,
        affinities: Vec<TraumaWeight>,
    ) -> Self {
        Self {
            item_id: item_id.into(),
            option_id: option_id.into(),
            affinities,
        }
    }
}

/// A selectable option on an assessment item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemOption {
    pub id: String,
    #[serde(default)]
    pub affinities: Vec<TraumaWeight>,
}

impl ItemOption {
    pub fn new(id: impl Into<String>, affinities: Vec<TraumaWeight>) -> Self {
        Self {
            id: id.into(),
            affinities,
        }
    }

    /// Option attached wholly to one type.
    pub fn single(id: impl Into<String>, trauma: TraumaType) -> Self {
        Self::new(id, vec![TraumaWeight::full(trauma)])
    }

    /// Option with no attachments.
    pub fn neutral(id: impl Into<String>) -> Self {
        Self::new(id, Vec::new())
    }
}

/// A fixed assessment item and its options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssessmentItem {
    pub id: String,
    pub options: Vec<ItemOption>,
}

impl AssessmentItem {
    pub fn new(id: impl Into<String>, options: Vec<ItemOption>) -> Self {
        Self {
            id: id.into(),
            options,
        }
    }

    pub fn option(&self, option_id: &str) -> Option<&ItemOption> {
        self.options.iter().find(|o| o.id == option_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn response_uses_camel_case_payload_keys() {
        let response = VectorResponse::new(
            "v1",
            "a",
            vec![TraumaWeight::new(TraumaType::Fragmentation, 0.7)],
        );
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["itemId"], "v1");
        assert_eq!(value["optionId"], "a");
        assert_eq!(value["affinities"][0]["traumaType"], "fragmentation");
    }

    #[test]
    fn response_without_affinities_deserializes_empty() {
        let response: VectorResponse =
            serde_json::from_value(json!({"itemId": "n1", "optionId": "skip"})).unwrap();
        assert!(response.affinities.is_empty());
    }

    #[test]
    fn trauma_weight_rejects_negative_and_nan() {
        assert!(TraumaWeight::new(TraumaType::Abandonment, 0.0).is_valid());
        assert!(!TraumaWeight::new(TraumaType::Abandonment, -0.1).is_valid());
        assert!(!TraumaWeight::new(TraumaType::Abandonment, f64::NAN).is_valid());
    }

    #[test]
    fn item_finds_option_by_id() {
        let item = AssessmentItem::new(
            "t1",
            vec![
                ItemOption::single("loop", TraumaType::Recursion),
                ItemOption::neutral("none"),
            ],
        );
        assert!(item.option("loop").is_some());
        assert!(item.option("none").unwrap().affinities.is_empty());
        assert!(item.option("missing").is_none());
    }
}
