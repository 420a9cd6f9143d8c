//! Cache key of a bean match.

use crate::configuration::StrictMappingProperties;
use crate::models::TypeRef;
use std::fmt;

/// Identity of a cached match.
///
/// K_i: Immutable once created; two equal pairs always share one match.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypePair {
    pub source: TypeRef,
    pub target: TypeRef,
    pub downsize_source: Option<Vec<String>>,
    pub downsize_target: Option<Vec<String>>,
    pub strict: StrictMappingProperties,
}

impl TypePair {
    pub fn new(source: TypeRef, target: TypeRef, strict: StrictMappingProperties) -> Self {
        Self {
            source,
            target,
            downsize_source: None,
            downsize_target: None,
            strict,
        }
    }

    pub fn with_downsize(
        mut self,
        downsize_source: Option<Vec<String>>,
        downsize_target: Option<Vec<String>>,
    ) -> Self {
        self.downsize_source = downsize_source.filter(|f| !f.is_empty());
        self.downsize_target = downsize_target.filter(|f| !f.is_empty());
        self
    }
}

impl fmt::Display for TypePair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.source, self.target)
    }
}
