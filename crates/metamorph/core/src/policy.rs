use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::ConfigError;

/// Per-family strictness knobs.
///
/// A policy is attached to a family when its root is defined and is read only
/// while new variants of that family are being validated. Changing it never
/// re-checks variants that were already accepted.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Policy {
    /// Enforce single ancestry, no stray fields and no chaining (default: true)
    pub strict: bool,
    /// An untyped root parameter accepts a typed variant parameter (default: false)
    pub allow_mixed_typing: bool,
    /// Variants may override the initializer (default: false)
    pub allow_init: bool,
    /// Private keys keep their literal declaring class instead of the family root (default: false)
    pub private_members: bool,
    /// Variants may themselves be subclassed under `strict` (default: false)
    pub allow_chaining: bool,
    /// Deepest allowed variant; direct children of the root sit at depth 1
    pub max_chain_depth: Option<usize>,
}

impl Default for Policy {
    fn default() -> Self {
        Self {
            strict: true,
            allow_mixed_typing: false,
            allow_init: false,
            private_members: false,
            allow_chaining: false,
            max_chain_depth: None,
        }
    }
}

impl Policy {
    /// Policy that skips the ancestry and state checks.
    pub fn relaxed() -> Self {
        Self {
            strict: false,
            ..Self::default()
        }
    }

    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn with_mixed_typing(mut self, allow: bool) -> Self {
        self.allow_mixed_typing = allow;
        self
    }

    pub fn with_init(mut self, allow: bool) -> Self {
        self.allow_init = allow;
        self
    }

    pub fn with_private_members(mut self, enabled: bool) -> Self {
        self.private_members = enabled;
        self
    }

    pub fn with_chaining(mut self, allow: bool) -> Self {
        self.allow_chaining = allow;
        self
    }

    pub fn with_max_chain_depth(mut self, depth: usize) -> Self {
        self.max_chain_depth = Some(depth);
        self
    }

    /// Whether a variant may be derived from another variant.
    pub fn permits_chaining(&self) -> bool {
        !self.strict || self.allow_chaining
    }

    /// Parse a policy from TOML. Missing keys take their defaults.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    /// Load a policy file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }
}
