//! Error types for beanmap.
//!
//! Epistemic taxonomy:
//! - B_i falsified: The caller asked for something the configuration forbids
//! - I^B materialized: A type pair turned out to be unmappable at copy time
//! - K_i violated: The object model disagrees with itself (bugs)

use crate::models::TypeRef;
use thiserror::Error;

/// Top-level error type for beanmap.
#[derive(Debug, Error)]
pub enum MapperError {
    // ═══════════════════════════════════════════════════════════════════
    // B_i FALSIFIED — Belief proven wrong (caller errors)
    // ═══════════════════════════════════════════════════════════════════

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Settings error: {0}")]
    Settings(#[from] super::ConfigError),

    #[error(
        "Strict mapping requirements violated for {source_type} -> {target_type}: unmatched properties {missing:?}"
    )]
    StrictMappingRequirements {
        source_type: TypeRef,
        target_type: TypeRef,
        missing: Vec<String>,
    },

    // ═══════════════════════════════════════════════════════════════════
    // I^B MATERIALIZED — Type pair unmappable once values are observed
    // ═══════════════════════════════════════════════════════════════════

    #[error("Cannot convert property '{property}' from {source_type} to {target_type}")]
    UnresolvableConversion {
        property: String,
        source_type: TypeRef,
        target_type: TypeRef,
    },

    #[error("Conversion from {source_type} to {target_type} failed: {message}")]
    ConversionFailed {
        source_type: TypeRef,
        target_type: TypeRef,
        message: String,
    },

    #[error("No collection handler registered for {0}")]
    UnsupportedCollection(TypeRef),

    #[error("Cannot instantiate {ty}: {reason}")]
    Instantiation { ty: TypeRef, reason: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // ═══════════════════════════════════════════════════════════════════
    // K_i VIOLATED — Invariant broken (bug, should not happen)
    // ═══════════════════════════════════════════════════════════════════

    #[error("Unknown property '{property}' on {ty}")]
    UnknownProperty { ty: TypeRef, property: String },
}

impl MapperError {
    /// Create a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    /// Create an instantiation error.
    pub fn instantiation(ty: &TypeRef, reason: impl Into<String>) -> Self {
        Self::Instantiation {
            ty: ty.clone(),
            reason: reason.into(),
        }
    }

    /// Create a conversion failure for a converter that rejected its input.
    pub fn conversion(source_type: &TypeRef, target_type: &TypeRef, message: impl Into<String>) -> Self {
        Self::ConversionFailed {
            source_type: source_type.clone(),
            target_type: target_type.clone(),
            message: message.into(),
        }
    }

    /// Check if this error was caused by the calling configuration rather than the data.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::Configuration(_) | Self::Settings(_) | Self::StrictMappingRequirements { .. }
        )
    }
}

/// Result type alias for beanmap.
pub type Result<T> = std::result::Result<T, MapperError>;
