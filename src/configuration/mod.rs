//! Engine-wide and per-call mapping configuration.
//!
//! Epistemic foundation:
//! - K_i: The core configuration is shared and frozen once the engine is built
//! - K_i: An override configuration is owned by exactly one mapping call
//! - B_i: A setter may not apply to the role it is called on → ConfigurationError

mod core_config;
mod overrides;
mod strict;

pub use core_config::{BeanPair, CoreConfiguration};
pub use overrides::OverrideConfiguration;
pub use strict::StrictMappingProperties;

use serde::{Deserialize, Serialize};

/// How an existing target collection is treated.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CollectionUsage {
    /// Empty the existing collection, then repopulate it (default)
    #[default]
    Clear,
    /// Keep existing elements; add or merge mapped elements
    Reuse,
    /// Ignore the existing collection and build a new one
    Construct,
}

/// What a null source property does to the target.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum NullPolicy {
    /// Clear the target property (default)
    #[default]
    Propagate,
    /// Leave the target property untouched
    Skip,
}
