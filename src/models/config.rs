//! File-based engine settings for beanmap.
//!
//! All I^R (resolvable ignorance) about mapping conventions is parameterized here.
//! The user resolves these unknowns at startup via a TOML file.

use crate::configuration::{NullPolicy, StrictMappingProperties};
use crate::object::TypeSchema;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Top-level settings for a beanmap engine.
///
/// I^R resolved: conventions and the type universe are explicit.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EngineSettings {
    /// Mapping conventions
    #[serde(default)]
    pub mapping: MappingSettings,

    /// Type schemas for the bundled schema registry
    #[serde(default)]
    pub types: Vec<TypeSchema>,
}

/// Mapping conventions shared by every call made through one engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MappingSettings {
    /// Suffix marking a source-only property name (e.g. `nameForm` → `name`)
    #[serde(default = "default_strict_source_suffix")]
    pub strict_source_suffix: String,

    /// Suffix marking a target-only property name (e.g. `name` → `nameResult`)
    #[serde(default = "default_strict_target_suffix")]
    pub strict_target_suffix: String,

    /// Whether suffix stripping takes part in property matching
    #[serde(default = "default_true")]
    pub apply_strict_mapping_convention: bool,

    /// What happens when a source property is null
    #[serde(default)]
    pub null_policy: NullPolicy,

    /// Whether after-clear flushers may run at all
    #[serde(default)]
    pub flush_enabled: bool,

    /// Whether a top-level call may pick a converter over property mapping
    #[serde(default)]
    pub converter_choosable: bool,

    /// Register the built-in scalar converters
    #[serde(default = "default_true")]
    pub default_converters: bool,

    /// Only types whose name starts with one of these prefixes are mapped as beans
    #[serde(default)]
    pub package_prefixes: Vec<String>,

    /// Pairs whose every source property must find a target
    #[serde(default)]
    pub strict_source_pairs: Vec<BeanPairSpec>,

    /// Pairs whose every target property must find a source
    #[serde(default)]
    pub strict_target_pairs: Vec<BeanPairSpec>,
}

fn default_strict_source_suffix() -> String {
    "Form".to_string()
}

fn default_strict_target_suffix() -> String {
    "Result".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for MappingSettings {
    fn default() -> Self {
        Self {
            strict_source_suffix: default_strict_source_suffix(),
            strict_target_suffix: default_strict_target_suffix(),
            apply_strict_mapping_convention: default_true(),
            null_policy: NullPolicy::default(),
            flush_enabled: false,
            converter_choosable: false,
            default_converters: default_true(),
            package_prefixes: Vec::new(),
            strict_source_pairs: Vec::new(),
            strict_target_pairs: Vec::new(),
        }
    }
}

impl MappingSettings {
    pub fn strict_mapping_properties(&self) -> StrictMappingProperties {
        StrictMappingProperties::new(
            self.strict_source_suffix.clone(),
            self.strict_target_suffix.clone(),
            self.apply_strict_mapping_convention,
        )
    }
}

/// A (source type, target type) pair by name.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BeanPairSpec {
    pub source: String,
    pub target: String,
}

impl EngineSettings {
    /// Load settings from a TOML file.
    ///
    /// B_i(file exists) → Result
    /// B_i(file is valid TOML) → Result
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
            path: path.to_owned(),
            source: e,
        })?;

        let settings: Self = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_owned(),
            source: e,
        })?;
        settings.validate()?;
        Ok(settings)
    }

    /// Check that type names are unique and strict pairs reference declared types.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut seen = HashSet::new();
        for schema in &self.types {
            if !seen.insert(schema.name.as_str()) {
                return Err(ConfigError::InvalidSchema(format!(
                    "type '{}' declared twice",
                    schema.name
                )));
            }
        }

        let pairs = self
            .mapping
            .strict_source_pairs
            .iter()
            .chain(self.mapping.strict_target_pairs.iter());
        for pair in pairs {
            for name in [&pair.source, &pair.target] {
                if !seen.contains(name.as_str()) {
                    return Err(ConfigError::InvalidSchema(format!(
                        "strict pair references undeclared type '{name}'"
                    )));
                }
            }
        }
        Ok(())
    }
}

/// Settings errors.
///
/// Epistemic origin:
/// - B_i falsified: File not found, parse error
/// - I^B materialized: Schemas that contradict each other
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read settings file {path}: {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse settings file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Invalid type schema: {0}")]
    InvalidSchema(String),
}
