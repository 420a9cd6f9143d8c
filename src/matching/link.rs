//! Property correspondences of a type pair.

use crate::matching::{PropertyContext, SecuredCheck, TypePair};
use crate::models::{TypeRef, Value};

/// How a link's declared types relate, as seen when the match was built.
///
/// Copy time re-decides on the runtime value type, so this is descriptive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkKind {
    /// Source type is assignable to the target type
    Assignable,
    /// A registered converter handles the declared pair
    Converter,
    /// Both sides are beans; mapped recursively at copy time
    Nested,
    /// Target is a collection; elements go through a collection handler
    Collection,
    /// Nothing known works; copying a non-null value fails
    Unresolved,
}

/// One source property feeding one target property.
#[derive(Debug, Clone)]
pub struct PropertyLink {
    pub source_property: String,
    pub target_property: String,
    pub source_type: TypeRef,
    pub target_type: TypeRef,
    pub kind: LinkKind,
    /// Element type of the target collection, if any
    pub element_type: Option<TypeRef>,
    pub(crate) checks: Vec<SecuredCheck>,
}

impl PropertyLink {
    /// Evaluate every attached check; all must allow.
    pub fn is_allowed(&self, source: &Value, parent: Option<&Value>) -> bool {
        self.checks.iter().all(|check| {
            let context = PropertyContext {
                source,
                property: &self.source_property,
            };
            check.is_allowed(&context, parent)
        })
    }

    pub fn is_secured(&self) -> bool {
        !self.checks.is_empty()
    }

    /// Names of the attached checks.
    pub fn check_names(&self) -> impl Iterator<Item = &str> {
        self.checks.iter().map(SecuredCheck::name)
    }
}

/// All links of a type pair, ordered by the target type's property order.
#[derive(Debug)]
pub struct BeanMatch {
    pair: TypePair,
    links: Vec<PropertyLink>,
}

impl BeanMatch {
    pub(crate) fn new(pair: TypePair, links: Vec<PropertyLink>) -> Self {
        Self { pair, links }
    }

    pub fn pair(&self) -> &TypePair {
        &self.pair
    }

    pub fn links(&self) -> &[PropertyLink] {
        &self.links
    }

    /// Link writing the named target property.
    pub fn link_to(&self, target_property: &str) -> Option<&PropertyLink> {
        self.links
            .iter()
            .find(|l| l.target_property == target_property)
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }
}
