//! Generation and caching of projection types.

use crate::configuration::StrictMappingProperties;
use crate::models::TypeRef;
use crate::object::{ModelView, PropertyDescriptor};
use dashmap::DashMap;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use tracing::{debug, warn};

/// Cache key of a projection.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProjectionKey {
    pub base: TypeRef,
    pub fields: BTreeSet<String>,
    pub strict: StrictMappingProperties,
}

/// A generated type exposing a subset of a base type's properties.
///
/// Equality and hashing only look at the key, so two projections generated
/// for the same key compare equal even before the store deduplicates them.
#[derive(Debug)]
pub struct Projection {
    key: ProjectionKey,
    properties: Vec<PropertyDescriptor>,
}

impl Projection {
    pub fn base(&self) -> &TypeRef {
        &self.key.base
    }

    /// Requested field paths (may include names the base does not have).
    pub fn fields(&self) -> &BTreeSet<String> {
        &self.key.fields
    }

    pub fn strict(&self) -> &StrictMappingProperties {
        &self.key.strict
    }

    /// Projected properties in base declaration order.
    pub fn properties(&self) -> &[PropertyDescriptor] {
        &self.properties
    }
}

impl PartialEq for Projection {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl Eq for Projection {}

impl Hash for Projection {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key.hash(state);
    }
}

impl fmt::Display for Projection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fields: Vec<&str> = self.key.fields.iter().map(String::as_str).collect();
        write!(f, "{}$Dyn[{}]", self.key.base, fields.join(","))
    }
}

/// Store of generated projection types.
///
/// Thread-safe: generation happens outside the map and the first published
/// projection for a key is the one every caller receives.
#[derive(Debug, Default)]
pub struct ClassStore {
    generated: DashMap<ProjectionKey, TypeRef>,
}

impl ClassStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the projection of `base` onto `fields`, generating it on first use.
    ///
    /// Dotted paths (`address.street`) narrow nested bean properties, and the
    /// element type of bean collections, to a nested projection.
    pub fn get_or_create_generated_class(
        &self,
        view: &ModelView<'_>,
        base: &TypeRef,
        fields: &[String],
        strict: &StrictMappingProperties,
    ) -> TypeRef {
        let key = ProjectionKey {
            base: base.clone(),
            fields: fields.iter().cloned().collect(),
            strict: strict.clone(),
        };

        if let Some(existing) = self.generated.get(&key) {
            return existing.value().clone();
        }

        let properties = self.project(view, base, &key.fields, strict);
        debug!(
            base = %base,
            requested = key.fields.len(),
            projected = properties.len(),
            "Generated projection type"
        );
        let generated = TypeRef::Projection(Arc::new(Projection {
            key: key.clone(),
            properties,
        }));

        self.generated.entry(key).or_insert(generated).value().clone()
    }

    fn project(
        &self,
        view: &ModelView<'_>,
        base: &TypeRef,
        fields: &BTreeSet<String>,
        strict: &StrictMappingProperties,
    ) -> Vec<PropertyDescriptor> {
        // head → nested paths; an empty list means the whole property
        let mut wanted: BTreeMap<&str, Vec<String>> = BTreeMap::new();
        let mut whole: BTreeSet<&str> = BTreeSet::new();
        for field in fields {
            match field.split_once('.') {
                Some((head, rest)) => wanted.entry(head).or_default().push(rest.to_string()),
                None => {
                    whole.insert(field.as_str());
                    wanted.entry(field.as_str()).or_default();
                }
            }
        }

        let base_properties = view.properties(base);
        for name in wanted.keys() {
            if !base_properties.iter().any(|p| p.name == *name) {
                warn!(base = %base, field = *name, "Dropping unknown field from projection");
            }
        }

        base_properties
            .into_iter()
            .filter_map(|property| {
                let nested = wanted.get(property.name.as_str())?;
                let mut projected = PropertyDescriptor {
                    readable: true,
                    writable: true,
                    ..property
                };

                if !whole.contains(projected.name.as_str()) && !nested.is_empty() {
                    if view.is_bean(&projected.ty) {
                        projected.ty =
                            self.get_or_create_generated_class(view, &projected.ty, nested, strict);
                    } else if let Some(element) = projected
                        .element_type
                        .as_ref()
                        .filter(|e| view.is_bean(e))
                    {
                        let element =
                            self.get_or_create_generated_class(view, element, nested, strict);
                        projected.element_type = Some(element);
                    }
                }
                Some(projected)
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.generated.len()
    }

    pub fn is_empty(&self) -> bool {
        self.generated.is_empty()
    }

    pub fn clear(&self) {
        self.generated.clear();
    }
}
