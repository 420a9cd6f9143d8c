//! Strict naming convention for property matching.

use serde::{Deserialize, Serialize};

/// Suffixes that mark source-only and target-only property names.
///
/// With the convention applied, a source property `nameForm` feeds a target
/// property `name`, and a source property `name` feeds a target property
/// `nameResult`. The reverse directions never match.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StrictMappingProperties {
    strict_source_suffix: String,
    strict_target_suffix: String,
    apply_strict_mapping_convention: bool,
}

impl Default for StrictMappingProperties {
    fn default() -> Self {
        Self::new("Form", "Result", true)
    }
}

impl StrictMappingProperties {
    pub fn new(
        strict_source_suffix: impl Into<String>,
        strict_target_suffix: impl Into<String>,
        apply_strict_mapping_convention: bool,
    ) -> Self {
        Self {
            strict_source_suffix: strict_source_suffix.into(),
            strict_target_suffix: strict_target_suffix.into(),
            apply_strict_mapping_convention,
        }
    }

    pub fn strict_source_suffix(&self) -> &str {
        &self.strict_source_suffix
    }

    pub fn strict_target_suffix(&self) -> &str {
        &self.strict_target_suffix
    }

    pub fn is_apply_strict_mapping_convention(&self) -> bool {
        self.apply_strict_mapping_convention
    }

    pub fn set_strict_source_suffix(&mut self, suffix: impl Into<String>) {
        self.strict_source_suffix = suffix.into();
    }

    pub fn set_strict_target_suffix(&mut self, suffix: impl Into<String>) {
        self.strict_target_suffix = suffix.into();
    }

    pub fn set_apply_strict_mapping_convention(&mut self, apply: bool) {
        self.apply_strict_mapping_convention = apply;
    }

    /// `nameForm` → `Some("name")` when the convention applies.
    pub fn strip_source_suffix<'a>(&self, name: &'a str) -> Option<&'a str> {
        self.strip(name, &self.strict_source_suffix)
    }

    /// `nameResult` → `Some("name")` when the convention applies.
    pub fn strip_target_suffix<'a>(&self, name: &'a str) -> Option<&'a str> {
        self.strip(name, &self.strict_target_suffix)
    }

    fn strip<'a>(&self, name: &'a str, suffix: &str) -> Option<&'a str> {
        if !self.apply_strict_mapping_convention || suffix.is_empty() {
            return None;
        }
        name.strip_suffix(suffix).filter(|stem| !stem.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_suffixes() {
        let strict = StrictMappingProperties::default();
        assert_eq!(strict.strip_source_suffix("nameForm"), Some("name"));
        assert_eq!(strict.strip_source_suffix("name"), None);
        assert_eq!(strict.strip_source_suffix("Form"), None);
        assert_eq!(strict.strip_target_suffix("nameResult"), Some("name"));
        assert_eq!(strict.strip_target_suffix("nameForm"), None);
    }

    #[test]
    fn test_convention_disabled() {
        let strict = StrictMappingProperties::new("Form", "Result", false);
        assert_eq!(strict.strip_source_suffix("nameForm"), None);
        assert_eq!(strict.strip_target_suffix("nameResult"), None);
    }
}
