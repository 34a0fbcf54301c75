//! PersistedProfile and the storage keys it is written under.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::domain::affinity::AffinityDistribution;
use crate::domain::foundation::TraumaType;
use crate::ports::SessionStoreError;

/// The externally visible result of one completed session.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedProfile {
    pub primary_trauma: TraumaType,
    pub trauma_affinities: AffinityDistribution,
    pub coherence_baseline: f64,
}

impl PersistedProfile {
    /// Rebuilds a profile from the three stored values.
    ///
    /// # Errors
    ///
    /// Returns `MalformedPersistedState` naming the first key that is
    /// missing, does not parse, or violates its invariant.
    pub fn from_stored(
        keys: &ProfileKeys,
        primary: Option<JsonValue>,
        affinities: Option<JsonValue>,
        baseline: Option<JsonValue>,
    ) -> Result<Self, SessionStoreError> {
        let primary_trauma: TraumaType = parse_key(&keys.primary_trauma, primary)?;
        let trauma_affinities: AffinityDistribution =
            parse_key(&keys.trauma_affinities, affinities)?;
        let coherence_baseline: f64 = parse_key(&keys.coherence_baseline, baseline)?;

        if !(0.0..=1.0).contains(&coherence_baseline) {
            return Err(SessionStoreError::malformed(
                &keys.coherence_baseline,
                format!("baseline {} outside [0, 1]", coherence_baseline),
            ));
        }

        Ok(Self {
            primary_trauma,
            trauma_affinities,
            coherence_baseline,
        })
    }

    /// The value entries to write, in write order. The `initiated` flag is
    /// not included; it is written last by the caller.
    pub fn entries(&self, keys: &ProfileKeys) -> Result<Vec<(String, JsonValue)>, SessionStoreError> {
        Ok(vec![
            (keys.primary_trauma.clone(), to_json(&self.primary_trauma)?),
            (keys.trauma_affinities.clone(), to_json(&self.trauma_affinities)?),
            (keys.coherence_baseline.clone(), to_json(&self.coherence_baseline)?),
        ])
    }
}

/// Key names for the persisted session values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileKeys {
    pub primary_trauma: String,
    pub trauma_affinities: String,
    pub coherence_baseline: String,
    pub initiated: String,
}

impl ProfileKeys {
    /// Keys namespaced as `<prefix>:<name>`.
    pub fn with_prefix(prefix: &str) -> Self {
        Self {
            primary_trauma: format!("{}:primary_trauma", prefix),
            trauma_affinities: format!("{}:trauma_affinities", prefix),
            coherence_baseline: format!("{}:coherence_baseline", prefix),
            initiated: format!("{}:initiated", prefix),
        }
    }

    /// All four keys.
    pub fn all(&self) -> [&str; 4] {
        [
            &self.primary_trauma,
            &self.trauma_affinities,
            &self.coherence_baseline,
            &self.initiated,
        ]
    }
}

impl Default for ProfileKeys {
    fn default() -> Self {
        Self::with_prefix("trauma_engine")
    }
}

fn parse_key<T: for<'de> Deserialize<'de>>(
    key: &str,
    value: Option<JsonValue>,
) -> Result<T, SessionStoreError> {
    let value = value.ok_or_else(|| SessionStoreError::malformed(key, "missing"))?;
    serde_json::from_value(value).map_err(|e| SessionStoreError::malformed(key, e.to_string()))
}

fn to_json<T: Serialize>(value: &T) -> Result<JsonValue, SessionStoreError> {
    serde_json::to_value(value).map_err(|e| SessionStoreError::Serialization(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn keys() -> ProfileKeys {
        ProfileKeys::with_prefix("test")
    }

    #[test]
    fn keys_are_namespaced() {
        let keys = keys();
        assert_eq!(keys.primary_trauma, "test:primary_trauma");
        assert_eq!(keys.initiated, "test:initiated");
        assert_eq!(keys.all().len(), 4);
    }

    #[test]
    fn from_stored_parses_valid_values() {
        let profile = PersistedProfile::from_stored(
            &keys(),
            Some(json!("fragmentation")),
            Some(json!({"fragmentation": 0.8, "recursion": 0.2})),
            Some(json!(0.62)),
        )
        .unwrap();
        assert_eq!(profile.primary_trauma, TraumaType::Fragmentation);
        assert_eq!(profile.coherence_baseline, 0.62);
    }

    #[test]
    fn from_stored_rejects_missing_value() {
        let err = PersistedProfile::from_stored(&keys(), Some(json!("recursion")), None, Some(json!(0.5)))
            .unwrap_err();
        assert!(matches!(err, SessionStoreError::MalformedPersistedState { ref key, .. } if key == "test:trauma_affinities"));
    }

    #[test]
    fn from_stored_rejects_invalid_distribution() {
        let err = PersistedProfile::from_stored(
            &keys(),
            Some(json!("recursion")),
            Some(json!({"recursion": 3.0})),
            Some(json!(0.5)),
        )
        .unwrap_err();
        assert!(matches!(err, SessionStoreError::MalformedPersistedState { .. }));
    }

    #[test]
    fn from_stored_rejects_unknown_trauma() {
        let err = PersistedProfile::from_stored(
            &keys(),
            Some(json!("melancholy")),
            Some(json!({})),
            Some(json!(0.5)),
        )
        .unwrap_err();
        assert!(matches!(err, SessionStoreError::MalformedPersistedState { .. }));
    }

    #[test]
    fn from_stored_rejects_out_of_range_baseline() {
        let err = PersistedProfile::from_stored(
            &keys(),
            Some(json!("recursion")),
            Some(json!({"recursion": 1.0})),
            Some(json!(1.7)),
        )
        .unwrap_err();
        assert!(matches!(err, SessionStoreError::MalformedPersistedState { .. }));
    }

    #[test]
    fn entries_roundtrip_through_from_stored() {
        let profile = PersistedProfile {
            primary_trauma: TraumaType::Surveillance,
            trauma_affinities: AffinityDistribution::concentrated(TraumaType::Surveillance),
            coherence_baseline: 0.71,
        };
        let mut entries = profile.entries(&keys()).unwrap().into_iter().map(|(_, v)| v);
        let restored = PersistedProfile::from_stored(
            &keys(),
            entries.next(),
            entries.next(),
            entries.next(),
        )
        .unwrap();
        assert_eq!(restored, profile);
    }
}
