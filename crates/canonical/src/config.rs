//! Configuration surface for the canonicalizer.

use serde::{Deserialize, Serialize};

use crate::error::CanonicalError;

/// Controls which cosmetic details canonicalization erases.
///
/// Any change to canonicalization behavior must bump `version`: the version
/// participates in the form digest, so forms produced by different behavior
/// never compare equal by accident.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CanonicalConfig {
    /// Configuration schema version. Must be >= 1.
    pub version: u32,
    /// Attribute names stripped before comparison. Matching is exact and
    /// case-sensitive; html5ever lowercases attribute names at parse time.
    pub volatile_attrs: Vec<String>,
}

impl CanonicalConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the volatile attribute set.
    pub fn with_volatile_attrs<I, S>(mut self, attrs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.volatile_attrs = attrs.into_iter().map(Into::into).collect();
        self
    }

    pub fn is_volatile(&self, attr_name: &str) -> bool {
        self.volatile_attrs.iter().any(|a| a == attr_name)
    }

    pub fn validate(&self) -> Result<(), CanonicalError> {
        if self.version == 0 {
            return Err(CanonicalError::InvalidConfig(
                "config version must be >= 1".into(),
            ));
        }
        Ok(())
    }
}

impl Default for CanonicalConfig {
    fn default() -> Self {
        Self {
            version: 1,
            volatile_attrs: vec!["class".to_string(), "id".to_string()],
        }
    }
}
