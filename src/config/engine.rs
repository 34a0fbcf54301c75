//! Engine configuration

use serde::Deserialize;
use std::str::FromStr;

use crate::domain::sequence::ProfileKeys;
use crate::domain::vector::VectorKind;

use super::error::ValidationError;

/// Assessment engine configuration
#[derive(Debug, Clone, Deserialize)]
pub struct EngineConfig {
    /// Namespace for persisted keys
    #[serde(default = "default_key_prefix")]
    pub key_prefix: String,

    /// Seed for reproducible coherence jitter
    #[serde(default)]
    pub seed: Option<u64>,

    /// Comma-separated vectors whose built-in modules are registered
    #[serde(default = "default_vectors")]
    pub vectors: String,
}

impl EngineConfig {
    pub fn profile_keys(&self) -> ProfileKeys {
        ProfileKeys::with_prefix(&self.key_prefix)
    }

    /// The configured vectors, in listed order, without duplicates.
    pub fn enabled_vectors(&self) -> Result<Vec<VectorKind>, ValidationError> {
        let mut enabled = Vec::new();
        for name in self.vectors.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            let kind = VectorKind::from_str(name)
                .map_err(|_| ValidationError::UnknownVector(name.to_string()))?;
            if !enabled.contains(&kind) {
                enabled.push(kind);
            }
        }
        Ok(enabled)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.key_prefix.trim().is_empty() {
            return Err(ValidationError::MissingRequired("ENGINE__KEY_PREFIX"));
        }
        self.enabled_vectors()?;
        Ok(())
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            key_prefix: default_key_prefix(),
            seed: None,
            vectors: default_vectors(),
        }
    }
}

fn default_key_prefix() -> String {
    "trauma_engine".to_string()
}

fn default_vectors() -> String {
    "visual,narrative,interactive,temporal".to_string()
}
